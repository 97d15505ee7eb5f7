//! Save and load simulation reports as JSON or MessagePack

use std::{
    fmt,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, pipeline::SimulationReport};

/// On-disk encoding of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    #[default]
    Json,
    MsgPack,
}

impl SummaryFormat {
    /// Guess the format from a file extension (`.msgpack`/`.mpk`, anything else is JSON).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("msgpack") || ext.eq_ignore_ascii_case("mpk") => {
                SummaryFormat::MsgPack
            }
            _ => SummaryFormat::Json,
        }
    }
}

impl FromStr for SummaryFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(SummaryFormat::Json),
            "msgpack" | "mpk" => Ok(SummaryFormat::MsgPack),
            other => Err(Error::configuration(format!(
                "unknown summary format '{other}' (expected 'json' or 'msgpack')"
            ))),
        }
    }
}

impl fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryFormat::Json => write!(f, "json"),
            SummaryFormat::MsgPack => write!(f, "msgpack"),
        }
    }
}

/// Write `report` to `path`.
pub fn save_report<P: AsRef<Path>>(
    report: &SimulationReport,
    path: P,
    format: SummaryFormat,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create {}", path.display()),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    match format {
        SummaryFormat::Json => serde_json::to_writer_pretty(&mut writer, report)?,
        SummaryFormat::MsgPack => rmp_serde::encode::write_named(&mut writer, report)?,
    }
    Ok(())
}

/// Read a report previously written by [`save_report`].
pub fn load_report<P: AsRef<Path>>(path: P, format: SummaryFormat) -> Result<SimulationReport> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Io {
        operation: format!("open {}", path.display()),
        source,
    })?;
    let reader = BufReader::new(file);
    let report = match format {
        SummaryFormat::Json => serde_json::from_reader(reader)?,
        SummaryFormat::MsgPack => rmp_serde::decode::from_read(reader)?,
    };
    Ok(report)
}
