//! `ct-output`: report writers for commercial traffic analysis results.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                                  |
//! |-----------|---------|----------------------------------------------------------------|
//! | *(none)*  | CSV     | `{run_id}.link_volume.csv`, `{run_id}.relations.csv`, ...      |
//! | `sqlite`  | SQLite  | `{run_id}.analysis.db`                                         |
//! | `parquet` | Parquet | `{run_id}.link_volume.parquet`, `{run_id}.relations.parquet`, ... |
//!
//! Reports are built once from [`ct_analysis::AnalysisResults`] as plain
//! tables in [`report`]; every backend implements [`ReportWriter`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use ct_output::{ChargingRanges, CsvReportWriter, write_all};
//!
//! let mut writer = CsvReportWriter::new(Path::new("./output"), "run1")?;
//! write_all(&mut writer, &engine.results(), &ChargingRanges::default())?;
//! ```

pub mod csv;
pub mod error;
pub mod report;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use self::csv::CsvReportWriter;
pub use error::{OutputError, OutputResult};
pub use report::{
    ChargingRanges, DistanceShares, LINK_VOLUME_CLASS_COLUMNS, LinkVolumeReport, LinkVolumeRow,
    RelationReport, RelationRow, VehicleDistanceRow,
};
pub use writer::{PER_MODE, PER_TYPE, ReportWriter, write_all};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteReportWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetReportWriter;
