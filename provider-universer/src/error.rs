//! Error types for the Universer provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Universer exchange errors
#[derive(Error, Debug)]
pub enum UniverserError {
    /// The service answered with a status other than 200
    #[error("Universer API error (status {status_code}): {message}")]
    HttpStatus { status_code: u16, message: String },

    /// The envelope carried a code other than the success code, or was
    /// missing where one is required
    #[error("Universer rejected the request (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// The task reported a status that is neither `pending` nor `done`
    #[error("Exchange task {task_id} failed with status '{status}'")]
    TaskFailed { task_id: String, status: String },

    /// The call succeeded but the identifier it should return was empty
    #[error("{operation} returned an empty {field}")]
    EmptyResult {
        operation: &'static str,
        field: &'static str,
    },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// A signed URL could not be resolved against the service host
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Universer operations
pub type Result<T> = std::result::Result<T, UniverserError>;

impl UniverserError {
    /// No response was obtained at all (connect, timeout, body read)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            UniverserError::BridgeError(BridgeError::Transport(_))
                | UniverserError::BridgeError(BridgeError::Io(_))
        )
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, UniverserError::EmptyResult { .. })
    }
}
