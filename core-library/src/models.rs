//! Domain models for the document gateway
//!
//! This module contains the document and collaborator records with validation
//! and database mapping, plus the closed document kind enumeration.

use crate::role::{self, Role};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

// =============================================================================
// Document Kind
// =============================================================================

/// Code reported for a kind name outside the enumeration
pub const UNKNOWN_KIND_CODE: i64 = 0;

/// Name reported for a kind code outside the enumeration
pub const UNKNOWN_KIND_NAME: &str = "unknown";

/// Kind of a document unit on the Universer service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Doc,
    Sheet,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Doc, DocumentKind::Sheet];

    pub fn code(self) -> i64 {
        match self {
            DocumentKind::Doc => 1,
            DocumentKind::Sheet => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Doc => "doc",
            DocumentKind::Sheet => "sheet",
        }
    }

    /// File extension used when exporting, including the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Doc => ".docx",
            DocumentKind::Sheet => ".xlsx",
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind name to code; unknown names map to [`UNKNOWN_KIND_CODE`].
pub fn kind_code(name: &str) -> i64 {
    DocumentKind::from_name(name)
        .map(DocumentKind::code)
        .unwrap_or(UNKNOWN_KIND_CODE)
}

/// Kind code to name; unknown codes map to [`UNKNOWN_KIND_NAME`].
pub fn kind_name(code: i64) -> &'static str {
    DocumentKind::from_code(code)
        .map(DocumentKind::as_str)
        .unwrap_or(UNKNOWN_KIND_NAME)
}

/// Display name registered for an imported file: everything before the
/// first `.`, or the whole name when that prefix is empty.
pub fn display_name(file_name: &str) -> &str {
    match file_name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

// =============================================================================
// Document
// =============================================================================

/// A document registered with the gateway
///
/// The remote unit id is unique and immutable, and the kind never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Store-assigned identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Universer unit id
    pub unit_id: String,
    /// Kind code, see [`DocumentKind`]
    pub unit_type: i64,
    /// Timestamps (unix seconds)
    pub created_at: i64,
    pub updated_at: i64,
}

impl Document {
    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_code(self.unit_type)
    }

    pub fn kind_name(&self) -> &'static str {
        kind_name(self.unit_type)
    }

    /// File name handed out on export. Unknown kinds get no extension.
    pub fn export_file_name(&self) -> String {
        match self.kind() {
            Some(kind) => format!("{}{}", self.name, kind.extension()),
            None => self.name.clone(),
        }
    }
}

/// Fields required to register a new document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub name: String,
    pub unit_id: String,
    pub unit_type: i64,
}

impl NewDocument {
    pub fn new(name: impl Into<String>, unit_id: impl Into<String>, unit_type: i64) -> Self {
        Self {
            name: name.into(),
            unit_id: unit_id.into(),
            unit_type,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Document name cannot be empty".to_string());
        }

        if self.unit_id.trim().is_empty() {
            return Err("Document unit id cannot be empty".to_string());
        }

        Ok(())
    }
}

// =============================================================================
// Collaborator
// =============================================================================

/// Role of one user on one document
///
/// At most one row exists per (file_id, user_id). The role is kept as the
/// stored text so that unknown values degrade to the absent level instead
/// of failing the read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Collaborator {
    pub id: i64,
    pub file_id: i64,
    pub user_id: String,
    pub role: String,
}

impl Collaborator {
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    pub fn level(&self) -> u8 {
        role::level(&self.role)
    }
}

/// Collaborator assignment to insert or upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollaborator {
    pub file_id: i64,
    pub user_id: String,
    pub role: Role,
}

impl NewCollaborator {
    pub fn new(file_id: i64, user_id: impl Into<String>, role: Role) -> Self {
        Self {
            file_id,
            user_id: user_id.into(),
            role,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.user_id.trim().is_empty() {
            return Err("Collaborator user id cannot be empty".to_string());
        }

        Ok(())
    }
}
