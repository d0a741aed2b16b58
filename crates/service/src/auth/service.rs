use std::sync::Arc;

use models::{errors::ModelError, user::validate_email, NewUser};
use tracing::{info, instrument, warn};

use super::domain::{AuthSession, AuthUser, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::password;
use super::repository::AuthRepository;
use super::token::TokenIssuer;
use crate::metrics::LOGIN_FAILURES_TOTAL;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub min_password_len: usize,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self { jwt_secret: "dev-secret".into(), token_ttl_secs: 3600, min_password_len: 8 }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("min_password_len", &self.min_password_len)
            .finish()
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    tokens: TokenIssuer,
    min_password_len: usize,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, settings: AuthSettings) -> Self {
        Self {
            repo,
            tokens: TokenIssuer::new(settings.jwt_secret, settings.token_ttl_secs),
            min_password_len: settings.min_password_len,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a new user with a hashed password and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::repository::mock::MockAuthRepository;
    /// use service::auth::service::{AuthService, AuthSettings};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthSettings::default());
    /// let input =
    ///     RegisterInput { email: "user@example.com".into(), password: "Secret123".into() };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.email, "user@example.com");
    /// assert_eq!(session.user.role, "user");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        let email = input.email.trim().to_string();
        validate_email(&email).map_err(|ModelError::Validation(msg)| AuthError::Validation(msg))?;
        if input.password.chars().count() < self.min_password_len {
            return Err(AuthError::Validation(format!(
                "password too short (>={})",
                self.min_password_len
            )));
        }

        let hash = hash_blocking(input.password).await?;
        let user = self.repo.create_user(NewUser::with_default_role(email, hash)).await?;
        info!(user_id = user.id, email = %user.email, "user_registered");

        let user = AuthUser::from(user);
        let token = self.tokens.issue(&user.email, Some(&user.role))?;
        Ok(AuthSession { user, token })
    }

    /// Check an email/password pair against the stored users.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`]. The returned user carries no hash.
    ///
    /// # Examples
    /// ```
    /// use service::auth::repository::mock::MockAuthRepository;
    /// use service::auth::service::{AuthService, AuthSettings};
    /// use service::auth::{domain::RegisterInput, errors::AuthError};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthSettings::default());
    /// let input = RegisterInput { email: "a@b.com".into(), password: "Passw0rd".into() };
    /// tokio_test::block_on(svc.register(input)).unwrap();
    /// let user = tokio_test::block_on(svc.authenticate("a@b.com", "Passw0rd")).unwrap();
    /// assert_eq!(user.email, "a@b.com");
    /// let wrong = tokio_test::block_on(svc.authenticate("a@b.com", "wrong"));
    /// assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    /// ```
    #[instrument(skip(self, email, password), fields(email = %email))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let Some(user) = self.repo.find_user_by_email(email).await? else {
            return Err(self.reject("unknown email"));
        };
        let candidate = password.to_string();
        let stored = user.password.clone();
        let ok = tokio::task::spawn_blocking(move || password::verify_password(&candidate, &stored))
            .await
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        if !ok {
            return Err(self.reject("password mismatch"));
        }
        Ok(AuthUser::from(user))
    }

    /// Authenticate and issue a token.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.authenticate(&input.email, &input.password).await?;
        let token = self.tokens.issue(&user.email, Some(&user.role))?;
        info!(user_id = user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    fn reject(&self, reason: &'static str) -> AuthError {
        LOGIN_FAILURES_TOTAL.inc();
        warn!(reason, "login rejected");
        AuthError::InvalidCredentials
    }
}

async fn hash_blocking(plaintext: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_password(&plaintext))
        .await
        .map_err(|e| AuthError::HashError(e.to_string()))?
}
