//! OpenAPI document served at `/api-docs/openapi.json`. The schemas mirror the
//! wire shapes; the record types themselves stay free of doc attributes.

use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(ToSchema)]
pub struct BookDoc {
    pub id: u64,
    pub categoryid: u64,
    pub title: String,
    pub author: String,
    /// Price as text, e.g. `"12.50"`.
    pub price: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

#[derive(ToSchema)]
pub struct BookInputDoc {
    /// Required on create.
    pub categoryid: Option<u64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<String>,
}

#[derive(ToSchema)]
pub struct BookListDoc {
    pub books: Vec<BookDoc>,
}

#[derive(ToSchema)]
pub struct BookOutputDoc {
    pub book: BookDoc,
}

#[derive(ToSchema)]
pub struct BookMessageDoc {
    pub message: String,
    pub book: BookDoc,
}

#[derive(ToSchema)]
pub struct CategoryDoc {
    pub id: u64,
    pub name: String,
}

#[derive(ToSchema)]
pub struct CategoryInputDoc {
    pub name: Option<String>,
}

#[derive(ToSchema)]
pub struct CategoryListDoc {
    pub categories: Vec<CategoryDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::books::list,
        crate::routes::books::get,
        crate::routes::books::create,
        crate::routes::books::update,
        crate::routes::books::delete,
        crate::routes::categories::list,
        crate::routes::categories::get,
        crate::routes::categories::create,
        crate::routes::categories::update,
        crate::routes::categories::delete,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            TokenResponse,
            BookDoc,
            BookInputDoc,
            BookListDoc,
            BookOutputDoc,
            BookMessageDoc,
            CategoryDoc,
            CategoryInputDoc,
            CategoryListDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "books"),
        (name = "categories")
    )
)]
pub struct ApiDoc;
