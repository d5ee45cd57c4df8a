//! Leveled collaborator roles
//!
//! Roles are totally ordered `owner > editor > reader`. Stored role text is
//! not trusted: anything that does not parse maps to [`ABSENT_LEVEL`], which
//! never satisfies a real role.

use crate::error::LibraryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Level of a missing or unrecognised role
pub const ABSENT_LEVEL: u8 = 0;

/// Collaborator role on a document
///
/// Variants are declared lowest first so the derived ordering matches
/// [`Role::level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reader,
    Editor,
    Owner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Owner, Role::Editor, Role::Reader];

    pub fn level(self) -> u8 {
        match self {
            Role::Owner => 3,
            Role::Editor => 2,
            Role::Reader => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Editor => "editor",
            Role::Reader => "reader",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "editor" => Ok(Role::Editor),
            "reader" => Ok(Role::Reader),
            other => Err(LibraryError::InvalidInput {
                field: "role".to_string(),
                message: format!("unknown role '{}'", other),
            }),
        }
    }
}

/// Level of stored role text. Unknown text is [`ABSENT_LEVEL`].
pub fn level(role: &str) -> u8 {
    role.parse::<Role>()
        .map(Role::level)
        .unwrap_or(ABSENT_LEVEL)
}

/// Whether stored role text grants at least `required`.
pub fn satisfies(actual: &str, required: Role) -> bool {
    level(actual) >= required.level()
}
