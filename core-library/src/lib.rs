//! # Document Library Module
//!
//! Owns the gateway's document database and provides repository patterns
//! for data access.
//!
//! ## Overview
//!
//! This module manages:
//! - SQLite database schema and migrations
//! - Document and collaborator models, plus the document kind enumeration
//! - The leveled role model used by the permission gate
//! - Repository traits with SQLite implementations

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod role;

pub use error::{LibraryError, Result};
pub use models::{Collaborator, Document, DocumentKind, NewCollaborator, NewDocument};
pub use role::Role;
