//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the document gateway:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the logging conventions and the validated configuration
//! shared by the exchange client, the stores and the facade.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
