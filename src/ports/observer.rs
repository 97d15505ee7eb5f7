//! Observer port - abstraction for watching simulations as they run
//!
//! This port defines the interface for observing best-response dynamics,
//! allowing composable data collection without coupling the driver loop to
//! specific output formats or metrics.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    Result,
    dynamics::{BrdEngine, TraceEntry},
    pipeline::RunSummary,
};

/// Observer trait for monitoring simulations
///
/// Observers can be composed to collect different kinds of data:
/// - Progress bars for user feedback
/// - JSONL export of every turn
/// - Move and convergence metrics
///
/// # Event Sequence
///
/// 1. `on_simulations_start(total_runs, max_iterations)` - Once at the beginning
/// 2. For each run:
///    - `on_run_start(run, engine)` - After players are placed
///    - `on_turn(run, entry)` - After every best-response turn
///    - `on_run_end(run, summary)`
/// 3. `on_simulations_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use flg::{dynamics::TraceEntry, ports::Observer};
///
/// struct MoveCounter {
///     moves: usize,
/// }
///
/// impl Observer for MoveCounter {
///     fn on_turn(&mut self, _run: usize, entry: &TraceEntry) -> flg::Result<()> {
///         if entry.moved {
///             self.moves += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called once before the first run.
    fn on_simulations_start(&mut self, _total_runs: usize, _max_iterations: usize) -> Result<()> {
        Ok(())
    }

    /// Called when a run starts, with the freshly initialized engine.
    fn on_run_start(&mut self, _run: usize, _engine: &BrdEngine) -> Result<()> {
        Ok(())
    }

    /// Called after each best-response turn.
    fn on_turn(&mut self, _run: usize, _entry: &TraceEntry) -> Result<()> {
        Ok(())
    }

    /// Called when a run converges or hits the iteration cap.
    fn on_run_end(&mut self, _run: usize, _summary: &RunSummary) -> Result<()> {
        Ok(())
    }

    /// Called once after the last run. Use this to flush files or print summaries.
    fn on_simulations_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Shared observers, so a caller can keep a handle and read results back after
/// the simulation has taken ownership of the box.
impl<O: Observer> Observer for Arc<Mutex<O>> {
    fn on_simulations_start(&mut self, total_runs: usize, max_iterations: usize) -> Result<()> {
        lock(self).on_simulations_start(total_runs, max_iterations)
    }

    fn on_run_start(&mut self, run: usize, engine: &BrdEngine) -> Result<()> {
        lock(self).on_run_start(run, engine)
    }

    fn on_turn(&mut self, run: usize, entry: &TraceEntry) -> Result<()> {
        lock(self).on_turn(run, entry)
    }

    fn on_run_end(&mut self, run: usize, summary: &RunSummary) -> Result<()> {
        lock(self).on_run_end(run, summary)
    }

    fn on_simulations_end(&mut self) -> Result<()> {
        lock(self).on_simulations_end()
    }
}

fn lock<O>(shared: &Mutex<O>) -> MutexGuard<'_, O> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
