//! Export of run results for external analysis and plotting

pub mod summary;
pub mod trace_csv;

pub use summary::{SummaryFormat, load_report, save_report};
pub use trace_csv::{TraceCsvExporter, TraceRecord};
