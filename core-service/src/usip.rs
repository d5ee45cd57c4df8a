//! # USIP Directory
//!
//! User, token and membership lookups answered to the Universer service
//! when it asks the host about identities and unit collaborators.
//!
//! [`Directory`] is an injected table. [`Directory::demo`] seeds the
//! three-user fixture used by the standalone demo.

use core_library::Role;
use serde::Serialize;
use std::collections::HashMap;

/// Subject type reported for every collaborator
pub const SUBJECT_TYPE_USER: &str = "user";

/// A user as reported to the Universer service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsipUser {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub name: String,
    pub avatar: String,
}

impl UsipUser {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

/// Membership of one user in one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub unit_id: String,
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub avatar: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl Subject {
    fn from_user(user: &UsipUser) -> Self {
        Self {
            id: user.user_id.clone(),
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            kind: SUBJECT_TYPE_USER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSubject {
    pub role: String,
    pub subject: Subject,
}

impl UnitSubject {
    pub fn new(role: impl Into<String>, user: &UsipUser) -> Self {
        Self {
            role: role.into(),
            subject: Subject::from_user(user),
        }
    }
}

/// Collaborators of one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitCollaborators {
    #[serde(rename = "unitID")]
    pub unit_id: String,
    pub subjects: Vec<UnitSubject>,
}

/// Source of user profiles
pub trait UserDirectory: Send + Sync {
    fn user(&self, user_id: &str) -> Option<UsipUser>;
}

#[derive(Debug, Clone, Default)]
pub struct Directory {
    tokens: HashMap<String, String>,
    users: Vec<UsipUser>,
    members: Vec<Member>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alice, Bob and Charlie with `token:1..3`, sharing `unit1` and `unit2`
    pub fn demo() -> Self {
        Self::new()
            .with_token("token:1", "1")
            .with_token("token:2", "2")
            .with_token("token:3", "3")
            .with_user(UsipUser::new("1", "Alice", "https://example.com/alice.jpg"))
            .with_user(UsipUser::new("2", "Bob", "https://example.com/bob.jpg"))
            .with_user(UsipUser::new(
                "3",
                "Charlie",
                "https://example.com/charlie.jpg",
            ))
            .with_member("unit1", "1", Role::Owner)
            .with_member("unit1", "2", Role::Editor)
            .with_member("unit2", "2", Role::Owner)
            .with_member("unit2", "3", Role::Reader)
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }

    pub fn with_user(mut self, user: UsipUser) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_member(
        mut self,
        unit_id: impl Into<String>,
        user_id: impl Into<String>,
        role: Role,
    ) -> Self {
        self.members.push(Member {
            unit_id: unit_id.into(),
            user_id: user_id.into(),
            role,
        });
        self
    }

    /// User id behind an `x-authorization` token
    pub fn verify_token(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }

    pub fn user(&self, user_id: &str) -> Option<&UsipUser> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    /// Known users among `user_ids`, in request order
    pub fn users(&self, user_ids: &[String]) -> Vec<&UsipUser> {
        user_ids.iter().filter_map(|id| self.user(id)).collect()
    }

    pub fn role(&self, unit_id: &str, user_id: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.unit_id == unit_id && m.user_id == user_id)
    }

    pub fn members(&self, unit_id: &str) -> Vec<&Member> {
        self.members.iter().filter(|m| m.unit_id == unit_id).collect()
    }

    /// One entry per requested unit. Members without a profile are skipped.
    pub fn collaborators(&self, unit_ids: &[String]) -> Vec<UnitCollaborators> {
        unit_ids
            .iter()
            .map(|unit_id| UnitCollaborators {
                unit_id: unit_id.clone(),
                subjects: self
                    .members(unit_id)
                    .into_iter()
                    .filter_map(|m| {
                        self.user(&m.user_id)
                            .map(|user| UnitSubject::new(m.role.as_str(), user))
                    })
                    .collect(),
            })
            .collect()
    }
}

impl UserDirectory for Directory {
    fn user(&self, user_id: &str) -> Option<UsipUser> {
        Directory::user(self, user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verify_token() {
        let directory = Directory::demo();

        assert_eq!(directory.verify_token("token:2"), Some("2"));
        assert_eq!(directory.verify_token("token:9"), None);
        assert_eq!(directory.verify_token(""), None);
    }

    #[test]
    fn test_user_lookup() {
        let directory = Directory::demo();

        assert_eq!(directory.user("3").map(|u| u.name.as_str()), Some("Charlie"));
        assert!(directory.user("4").is_none());

        let ids = vec!["2".to_string(), "4".to_string(), "1".to_string()];
        let names: Vec<&str> = directory.users(&ids).iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Alice"]);
    }

    #[test]
    fn test_role_and_members() {
        let directory = Directory::demo();

        assert_eq!(directory.role("unit1", "2").map(|m| m.role), Some(Role::Editor));
        assert!(directory.role("unit1", "3").is_none());
        assert_eq!(directory.members("unit2").len(), 2);
        assert!(directory.members("unit3").is_empty());
    }

    #[test]
    fn test_collaborators_wire_shape() {
        let directory = Directory::demo();
        let result = directory.collaborators(&["unit2".to_string(), "unit9".to_string()]);

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!([
                {
                    "unitID": "unit2",
                    "subjects": [
                        {
                            "role": "owner",
                            "subject": {
                                "id": "2",
                                "name": "Bob",
                                "avatar": "https://example.com/bob.jpg",
                                "type": "user"
                            }
                        },
                        {
                            "role": "reader",
                            "subject": {
                                "id": "3",
                                "name": "Charlie",
                                "avatar": "https://example.com/charlie.jpg",
                                "type": "user"
                            }
                        }
                    ]
                },
                { "unitID": "unit9", "subjects": [] }
            ])
        );
    }

    #[test]
    fn test_user_serializes_user_id() {
        let user = UsipUser::new("1", "Alice", "https://example.com/alice.jpg");
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({"userID": "1", "name": "Alice", "avatar": "https://example.com/alice.jpg"})
        );
    }
}
