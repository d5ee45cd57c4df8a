//! # Universer Provider
//!
//! Implements the [`ExchangeClient`] trait for the Universer
//! document-processing service.
//!
//! ## Overview
//!
//! This module provides:
//! - Unit creation and multipart file upload
//! - Import/export task submission and single-shot task polling
//! - Signed-URL resolution and streaming download of exported files
//! - One-pass decoding of the `{"error":{"code","message"}}` envelope
//!
//! Calls never retry. The caller's session cookie is forwarded verbatim as
//! the `Cookie` header and is redacted from logs.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{ExchangeClient, UniverserConnector};
pub use error::{Result, UniverserError};
pub use types::{Credential, ExchangeDirection, Reply, TaskPoll};
