//! # Document Exchange
//!
//! Orchestrates conversions between local files and collaborative documents
//! hosted by the Universer service.
//!
//! ## Overview
//!
//! - [`ImportOrchestrator`]: upload a file, convert it and register the
//!   resulting document with its owner
//! - [`ExportOrchestrator`]: convert a document back to a file and stream it
//! - [`DocumentService`]: create, list, share and remove documents
//! - [`PermissionGate`]: role checks for delete and join
//! - [`task`]: the bounded poll state machine shared by both directions

pub mod documents;
pub mod error;
pub mod export;
pub mod import;
pub mod permission;
pub mod task;

pub use documents::{DocumentService, EditorHosts};
pub use error::{ExchangeError, FailureKind, Result};
pub use export::{ExportOrchestrator, ExportedFile};
pub use import::{ImportOrchestrator, ImportRequest};
pub use permission::{permits, Action, PermissionGate};
pub use task::{poll_until_done, ExchangeTask, PollPolicy, TaskState};
