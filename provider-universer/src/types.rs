//! Universer API request and response types
//!
//! Every response carries the envelope `{"error":{"code","message"}, ...}`
//! next to its payload. [`Reply::from_slice`] decodes both in one pass.

use core_runtime::logging::redact_if_sensitive;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, UniverserError};

/// Envelope code reporting success
pub const SUCCESS_CODE: i64 = 1;

/// Code reported for a response that has no envelope at all
pub const MISSING_ENVELOPE_CODE: i64 = 0;

/// `outputType` sent with every import
pub const IMPORT_OUTPUT_TYPE: i64 = 1;

/// Opaque session credential, forwarded verbatim as the `Cookie` header
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(cookie: impl Into<String>) -> Self {
        Self(cookie.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential")
            .field(&redact_if_sensitive("credential", &self.0))
            .finish()
    }
}

impl From<String> for Credential {
    fn from(cookie: String) -> Self {
        Self(cookie)
    }
}

impl From<&str> for Credential {
    fn from(cookie: &str) -> Self {
        Self(cookie.to_string())
    }
}

/// Which side of the exchange a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeDirection {
    Import,
    Export,
}

impl fmt::Display for ExchangeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeDirection::Import => f.write_str("import"),
            ExchangeDirection::Export => f.write_str("export"),
        }
    }
}

/// Outcome of a single task poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPoll {
    Pending,
    /// Unit id for imports, file id for exports
    Done(String),
}

/// `error` block of the envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBlock {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    error: Option<ErrorBlock>,
    #[serde(flatten)]
    payload: T,
}

/// Decoded response: either the payload or the remote rejection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Ok(T),
    Err { code: i64, message: String },
}

impl<T: DeserializeOwned> Reply<T> {
    /// Decode a body whose envelope is mandatory. A missing envelope is a
    /// rejection with [`MISSING_ENVELOPE_CODE`].
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let envelope = Self::parse(body)?;
        Ok(match envelope.error {
            Some(block) => Self::from_block(block, envelope.payload),
            None => Reply::Err {
                code: MISSING_ENVELOPE_CODE,
                message: "response is missing the error envelope".to_string(),
            },
        })
    }

    /// Decode a body whose envelope may be omitted; absence means success.
    pub fn from_slice_lenient(body: &[u8]) -> Result<Self> {
        let envelope = Self::parse(body)?;
        Ok(match envelope.error {
            Some(block) => Self::from_block(block, envelope.payload),
            None => Reply::Ok(envelope.payload),
        })
    }

    fn parse(body: &[u8]) -> Result<Envelope<T>> {
        serde_json::from_slice(body).map_err(|e| UniverserError::ParseError(e.to_string()))
    }

    fn from_block(block: ErrorBlock, payload: T) -> Self {
        if block.code == SUCCESS_CODE {
            Reply::Ok(payload)
        } else {
            Reply::Err {
                code: block.code,
                message: block.message,
            }
        }
    }
}

impl<T> Reply<T> {
    pub fn into_result(self) -> Result<T> {
        match self {
            Reply::Ok(payload) => Ok(payload),
            Reply::Err { code, message } => Err(UniverserError::Rejected { code, message }),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Serialize)]
pub struct CreateUnitRequest<'a> {
    pub name: &'a str,
    pub creator: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ImportRequest<'a> {
    #[serde(rename = "fileID")]
    pub file_id: &'a str,
    #[serde(rename = "outputType")]
    pub output_type: i64,
}

#[derive(Debug, Serialize)]
pub struct ExportRequest<'a> {
    #[serde(rename = "unitID")]
    pub unit_id: &'a str,
    #[serde(rename = "type")]
    pub kind: i64,
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
pub struct UnitCreated {
    #[serde(rename = "unitID", default)]
    pub unit_id: String,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FileUploaded {
    #[serde(rename = "FileId", default)]
    pub file_id: String,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TaskStarted {
    #[serde(rename = "taskID", default)]
    pub task_id: String,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ImportOutcome {
    #[serde(rename = "unitID", default)]
    pub unit_id: String,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ExportOutcome {
    #[serde(rename = "fileID", default)]
    pub file_id: String,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TaskStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub import: ImportOutcome,
    #[serde(default)]
    pub export: ExportOutcome,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SignedUrl {
    #[serde(default)]
    pub url: String,
}
