use core_exchange::{ExchangeError, FailureKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Runtime(#[from] core_runtime::error::Error),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

impl CoreError {
    /// Failure class of an import, export or catalogue operation
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            CoreError::Exchange(e) => Some(e.kind()),
            CoreError::Library(_) => Some(FailureKind::Storage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
