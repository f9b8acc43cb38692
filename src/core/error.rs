use super::period::Period;
use thiserror::Error;

/// Failures that stop an invocation before the report is composed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required remote value (price, FX rate or monthly series) could not be obtained.
    #[error("data unavailable for {what}: {reason}")]
    DataUnavailable { what: String, reason: String },

    /// A refreshed monthly value could not be written to the store.
    #[error("failed to persist monthly value for {period}: {source}")]
    Persistence {
        period: Period,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn unavailable(what: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::DataUnavailable {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

/// A single recipient that could not be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    pub recipient: String,
    pub reason: String,
}
