use thiserror::Error;

use ct_core::PersonId;

#[derive(Debug, Error)]
pub enum AttributeError {
    /// A data row has a different number of fields than the header.
    /// `line` is 1-based and counts the header.
    #[error("attribute file line {line}: expected {expected} fields, got {got}")]
    MalformedRow { line: u64, expected: usize, got: usize },

    #[error("attribute table configuration error: {0}")]
    Config(String),

    #[error("person {0} not found in attribute table")]
    PersonNotFound(PersonId),

    #[error("person {person} has no attribute {attribute:?}")]
    MissingAttribute { person: PersonId, attribute: String },

    #[error("person {person}: attribute {attribute:?} = {value:?} is not a number")]
    InvalidNumber { person: PersonId, attribute: String, value: String },

    #[error("attribute CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AttributeResult<T> = Result<T, AttributeError>;
