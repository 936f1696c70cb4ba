//! Match sheet loading and result export
//!
//! These sit at the edge of the rating core: the loader hands it ordered
//! match records and the exporter serializes what a run produced.

pub mod exporter;
pub mod loader;

pub use exporter::{write_rows, ExportSummary, ResultExporter};
pub use loader::{parse_timestamp, MatchLoader};
