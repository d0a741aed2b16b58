use async_trait::async_trait;
use models::{NewUser, User};

use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::storage::{Collection, RecordStore};

pub const COLLECTION: &str = "users";

/// `users.json`-backed repository.
#[derive(Clone)]
pub struct FileAuthRepository {
    users: Collection<User>,
}

impl FileAuthRepository {
    /// With `unique_email` the check runs inside the collection lock, so two
    /// concurrent registrations of one address cannot both succeed.
    pub fn new(store: &RecordStore, unique_email: bool) -> Self {
        let users = store.collection::<User>(COLLECTION);
        let users = if unique_email {
            users.with_unique_key(|u: &User| u.email.clone())
        } else {
            users
        };
        Self { users }
    }

    pub fn collection(&self) -> &Collection<User> {
        &self.users
    }
}

#[async_trait]
impl AuthRepository for FileAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users.find_first(|u| u.email == email).await?)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AuthError> {
        Ok(self.users.create(user).await?)
    }
}
