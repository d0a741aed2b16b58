use async_trait::async_trait;
use models::{NewUser, User};

use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
///
/// Implementations return the stored [`User`] including its password hash;
/// the service strips it before anything leaves the auth module.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// First user whose email matches exactly (case-sensitive).
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
    /// Persist a new user. Fails with [`AuthError::Conflict`] when the
    /// repository enforces unique emails and the address is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    pub struct MockAuthRepository {
        users: Mutex<Vec<User>>,
        unique_email: bool,
    }

    impl Default for MockAuthRepository {
        fn default() -> Self {
            Self { users: Mutex::new(Vec::new()), unique_email: true }
        }
    }

    impl MockAuthRepository {
        pub fn allowing_duplicate_emails() -> Self {
            Self { unique_email: false, ..Self::default() }
        }

        pub fn len(&self) -> usize {
            self.users.lock().map(|u| u.len()).unwrap_or_default()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().unwrap_or_else(|p| p.into_inner());
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn create_user(&self, user: NewUser) -> Result<User, AuthError> {
            let mut users = self.users.lock().unwrap_or_else(|p| p.into_inner());
            if self.unique_email && users.iter().any(|u| u.email == user.email) {
                return Err(AuthError::Conflict);
            }
            let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
            let created = User {
                id,
                email: user.email,
                password: user.password_hash,
                role: user.role,
                created_at: Utc::now(),
            };
            users.push(created.clone());
            Ok(created)
        }
    }
}
