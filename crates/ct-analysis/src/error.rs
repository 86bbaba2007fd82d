use thiserror::Error;

use ct_attributes::AttributeError;
use ct_core::PersonId;
use ct_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis configuration error: {0}")]
    Config(String),

    /// Unknown person or a missing/non-numeric attribute.
    #[error("attribute lookup failed: {0}")]
    Attribute(#[from] AttributeError),

    /// Vehicle or link id absent from the registries.  The event stream does
    /// not belong to the loaded network.
    #[error("registry lookup failed: {0}")]
    Lookup(#[from] SpatialError),

    #[error("person {person} ({subpopulation}): unexpected activity type {activity:?}, expected \"service\"")]
    UnexpectedActivity {
        person:        PersonId,
        subpopulation: String,
        activity:      String,
    },

    #[error("person {person}: subpopulation {subpopulation:?} is not recognized")]
    UnknownSubpopulation { person: PersonId, subpopulation: String },

    /// Trip ordinal or relation index no longer fits in `u32`.
    #[error("person {person}: relation counter overflow")]
    RelationOverflow { person: PersonId },

    #[error("event log line {line}: {reason}")]
    EventParse { line: u64, reason: String },

    #[error("event log CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
