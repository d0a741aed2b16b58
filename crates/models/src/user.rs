use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::Record;

pub const DEFAULT_ROLE: &str = "user";

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

/// Stored account. `password` holds the hash, never plaintext.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl NewUser {
    pub fn with_default_role(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self { email: email.into(), password_hash: password_hash.into(), role: default_role() }
    }
}

impl Record for User {
    type Draft = NewUser;
    type Patch = UserPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: NewUser) -> Self {
        User {
            id,
            email: draft.email,
            password: draft.password_hash,
            role: draft.role,
            created_at: Utc::now(),
        }
    }

    fn merge(self, patch: UserPatch) -> Self {
        User {
            email: patch.email.unwrap_or(self.email),
            password: patch.password.unwrap_or(self.password),
            role: patch.role.unwrap_or(self.role),
            ..self
        }
    }
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(())
        }
        _ => Err(errors::ModelError::Validation("invalid email".into())),
    }
}
