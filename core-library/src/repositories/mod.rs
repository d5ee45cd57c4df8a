//! # Repository Pattern Implementation
//!
//! This module provides repository traits and implementations for data access.
//!
//! ## Architecture
//!
//! - Traits define the interface for each repository
//! - SQLite implementations use sqlx for async database access
//! - Lookups return `Option`/`Vec` on miss; only storage failures are errors
//!
//! ## Available Repositories
//!
//! - `FileRepository` - Documents keyed by local id and Universer unit id
//! - `CollaboratorRepository` - Per-document user roles with upsert semantics

pub mod collaborator;
pub mod file;

pub use collaborator::{CollaboratorRepository, SqliteCollaboratorRepository};
pub use file::{FileRepository, SqliteFileRepository};
