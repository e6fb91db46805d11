// src/error.rs

/// Errors raised while preparing a simulation run.
///
/// The day loop itself never fails: once a run is constructed every
/// numerical edge case is clamped or epsilon-guarded instead.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("unknown category tag: {0}")]
    UnknownCategory(String),

    #[error("unknown ordering mode: {0}")]
    UnknownMode(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("demand series is empty")]
    EmptyDemand,

    #[error("forecast has {actual} days but demand has {expected}")]
    ForecastLengthMismatch { expected: usize, actual: usize },

    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
