use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use tracing::warn;

use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repo::FileAuthRepository;
use service::auth::AuthService;
use service::file::{BookStore, CategoryStore};

use crate::errors::JsonApiError;
use crate::extract::ApiJson;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<FileAuthRepository>>,
    pub books: Arc<BookStore>,
    pub categories: Arc<CategoryStore>,
}

#[derive(Serialize)]
pub struct TokenOutput {
    pub token: String,
}

#[utoipa::path(
    post, path = "/auth/register", tag = "auth",
    request_body = crate::openapi::RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = crate::openapi::TokenResponse),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn register(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): ApiJson<RegisterInput>,
) -> Result<Json<TokenOutput>, JsonApiError> {
    let session = state.auth.register(input).await?;
    Ok(Json(TokenOutput { token: session.token }))
}

#[utoipa::path(
    post, path = "/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (
            status = 200,
            description = "Logged in; also sets the auth_token cookie",
            body = crate::openapi::TokenResponse
        ),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    WithRejection(Json(input), _): ApiJson<LoginInput>,
) -> Result<(CookieJar, Json<TokenOutput>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(TokenOutput { token: session.token })))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

fn is_public(method: &Method, path: &str) -> bool {
    method == Method::OPTIONS
        || path == "/health"
        || path == "/metrics"
        || path.starts_with("/auth/")
}

/// Global middleware: every non-public route needs `Authorization: Bearer <token>`
/// or the `auth_token` cookie. Missing token is 400, invalid or expired is 401.
/// Verified claims are attached to the request extensions.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    if is_public(req.method(), &path) {
        return Ok(next.run(req).await);
    }

    let header_value = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = match header_value {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) => t.trim().to_string(),
            None => {
                warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "Invalid token", None));
            }
        },
        None => CookieJar::from_headers(req.headers())
            .get(AUTH_COOKIE)
            .map(|c| c.value().to_string())
            .unwrap_or_default(),
    };
    if token.is_empty() {
        warn!(path = %path, "missing Authorization header and auth_token cookie");
        return Err(JsonApiError::new(StatusCode::BAD_REQUEST, "Missing token", None));
    }

    match state.auth.tokens().verify(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(path = %path, err = %e, "token validation failed");
            Err(JsonApiError::new(StatusCode::UNAUTHORIZED, "Invalid token", Some(e.to_string())))
        }
    }
}
