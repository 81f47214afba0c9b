use thiserror::Error;
use uuid::Uuid;

pub type EngineResult<T> = Result<T, EngineError>;

/// Error type that captures common ledger engine failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Precondition failed: {0}")]
    Precondition(String),
    #[error("Bulk write stopped after {completed} of {total}: {source}")]
    PartialFailure {
        completed: usize,
        total: usize,
        #[source]
        source: Box<EngineError>,
    },
    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),
    #[error("Card not found: {0}")]
    CardNotFound(Uuid),
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Goal not found: {0}")]
    GoalNotFound(Uuid),
    #[error("Series not found: {0}")]
    SeriesNotFound(Uuid),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl EngineError {
    /// Wraps a member-write failure with the progress achieved before it.
    pub fn partial(completed: usize, total: usize, source: EngineError) -> Self {
        EngineError::PartialFailure {
            completed,
            total,
            source: Box::new(source),
        }
    }
}
