use crate::permission::Action;
use core_library::LibraryError;
use provider_universer::UniverserError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error(transparent)]
    Remote(#[from] UniverserError),

    #[error("Storage error: {0}")]
    Storage(#[from] LibraryError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("User {user_id} is not allowed to {action} document {document_id}")]
    Forbidden {
        user_id: String,
        document_id: i64,
        action: Action,
    },

    #[error("Exchange task {task_id} timed out after {attempts} polls")]
    TimedOut { task_id: String, attempts: u32 },

    #[error("Invalid task state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid poll policy: {0}")]
    InvalidPolicy(String),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Coarse failure classes reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No response from the remote service
    Transport,
    /// Non-200 status, rejection code, malformed body or failed task
    RemoteRejection,
    /// The remote call succeeded but returned an empty identifier
    EmptyResult,
    NotFound,
    Forbidden,
    /// The poll bound was reached before the task finished
    TimedOut,
    /// Local persistence failure
    Storage,
    /// Misuse of the task state machine or policy
    Internal,
}

impl ExchangeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExchangeError::Remote(e) if e.is_transport() => FailureKind::Transport,
            ExchangeError::Remote(e) if e.is_empty_result() => FailureKind::EmptyResult,
            ExchangeError::Remote(_) => FailureKind::RemoteRejection,
            ExchangeError::Storage(_) => FailureKind::Storage,
            ExchangeError::NotFound { .. } => FailureKind::NotFound,
            ExchangeError::Forbidden { .. } => FailureKind::Forbidden,
            ExchangeError::TimedOut { .. } => FailureKind::TimedOut,
            ExchangeError::InvalidStateTransition { .. } | ExchangeError::InvalidPolicy(_) => {
                FailureKind::Internal
            }
        }
    }
}
