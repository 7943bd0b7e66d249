use crate::dimension::ExperienceDimension;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("College not found: {0}")]
    CollegeNotFound(u32),

    #[error("Insufficient cost data for college {0}")]
    InsufficientCostData(u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Malformed client input, rejected before any matching or planning runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("Missing dimension: {0}")]
    MissingDimension(ExperienceDimension),

    #[error("Value for {dimension} must be between {min} and {max}, got {value}")]
    OutOfRange {
        dimension: ExperienceDimension,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Value for {0} is not a finite number")]
    NotFinite(ExperienceDimension),

    #[error("top_n must be between 1 and {max}, got {actual}")]
    InvalidTopN { actual: usize, max: usize },

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
