use serde::{Deserialize, Serialize};

/// The logged-in user. Only the username is kept; passwords are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

impl User {
    /// Local presence check only: both fields must be non-empty.
    /// There is no credential verification behind this gate.
    pub fn from_credentials(username: &str, password: &str) -> Option<Self> {
        if username.is_empty() || password.is_empty() {
            return None;
        }
        Some(Self {
            username: username.to_string(),
        })
    }
}
