use core_library::repositories::CollaboratorRepository;
use core_library::role::{self, Role};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Actions guarded by the permission gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Delete,
    Join,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Delete => "delete",
            Action::Join => "join",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a stored role string allows `action`.
///
/// Delete matches the owner role exactly. Join accepts any role at or above
/// editor.
pub fn permits(role: &str, action: Action) -> bool {
    match action {
        Action::Delete => role == Role::Owner.as_str(),
        Action::Join => role::satisfies(role, Role::Editor),
    }
}

/// Answers whether a user may perform an action on a document
#[derive(Clone)]
pub struct PermissionGate {
    collaborators: Arc<dyn CollaboratorRepository>,
}

impl PermissionGate {
    pub fn new(collaborators: Arc<dyn CollaboratorRepository>) -> Self {
        Self { collaborators }
    }

    /// Users with no collaborator row are denied. Lookup failures deny.
    pub async fn check_permission(&self, document_id: i64, user_id: &str, action: Action) -> bool {
        match self.collaborators.get(document_id, user_id).await {
            Ok(Some(collaborator)) => permits(&collaborator.role, action),
            Ok(None) => false,
            Err(e) => {
                warn!(
                    document_id,
                    user_id,
                    action = %action,
                    error = %e,
                    "Permission lookup failed, denying"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_requires_owner() {
        assert!(permits("owner", Action::Delete));
        assert!(!permits("editor", Action::Delete));
        assert!(!permits("reader", Action::Delete));
        assert!(!permits("Owner", Action::Delete));
    }

    #[test]
    fn test_join_requires_editor_or_above() {
        assert!(permits("owner", Action::Join));
        assert!(permits("editor", Action::Join));
        assert!(!permits("reader", Action::Join));
        assert!(!permits("", Action::Join));
        assert!(!permits("admin", Action::Join));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Delete.to_string(), "delete");
        assert_eq!(Action::Join.to_string(), "join");
    }
}
