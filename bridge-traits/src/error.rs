use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// The request never produced a response (connect, timeout, TLS, body read)
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
