//! Error types for ct-output.

use thiserror::Error;

/// Errors that can occur when writing analysis reports.
#[derive(Debug, Error)]
pub enum OutputError {
    /// A vehicle type has no entry in the charging-range table.
    #[error("vehicle type {0:?} has no depot-charging range")]
    UnknownVehicleType(String),

    #[error("report I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV report write failed: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite report write failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "parquet")]
    #[error("Arrow batch construction failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[cfg(feature = "parquet")]
    #[error("Parquet report write failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
