//! CSV export of per-turn traces
//!
//! One row per player per turn, so a plotting tool can pivot on `player` to draw
//! facility and utility curves and on `iteration` for the potential.

use std::{fs::File, io::Write, path::Path};

use serde::Serialize;

use crate::{Result, pipeline::RunSummary};

/// A single row of the trace CSV
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRecord {
    pub run: usize,
    pub iteration: usize,
    pub mover: usize,
    pub moved: bool,
    pub potential: f64,
    pub player: usize,
    pub facility: usize,
    pub utility: f64,
}

/// Exporter for trace CSV files
pub struct TraceCsvExporter;

impl TraceCsvExporter {
    /// Flatten runs into CSV rows.
    pub fn records<'a>(runs: impl IntoIterator<Item = &'a RunSummary>) -> Vec<TraceRecord> {
        runs.into_iter()
            .flat_map(|summary| {
                summary.trace.iter().flat_map(move |entry| {
                    entry
                        .players
                        .iter()
                        .enumerate()
                        .map(move |(player, state)| TraceRecord {
                            run: summary.run,
                            iteration: entry.iteration,
                            mover: entry.player.value(),
                            moved: entry.moved,
                            potential: entry.potential,
                            player,
                            facility: state.facility,
                            utility: state.utility,
                        })
                })
            })
            .collect()
    }

    /// Write rows for `runs` to any writer.
    pub fn write<'a, W: Write>(
        writer: W,
        runs: impl IntoIterator<Item = &'a RunSummary>,
    ) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for record in Self::records(runs) {
            csv.serialize(record)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write rows for `runs` to `path`.
    pub fn export<'a, P: AsRef<Path>>(
        path: P,
        runs: impl IntoIterator<Item = &'a RunSummary>,
    ) -> Result<()> {
        let file = File::create(path)?;
        Self::write(file, runs)
    }
}
