use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use common::types::MessageResponse;
use models::{Book, BookInput, BookPatch};
use serde::Serialize;
use service::auth::token::Claims;
use tracing::info;

use crate::extract::{ApiJson, ApiPath};
use crate::{errors::JsonApiError, routes::auth::ServerState};

const NOT_FOUND: &str = "Book not found";

#[derive(Serialize)]
pub struct BookList {
    pub books: Vec<Book>,
}

#[derive(Serialize)]
pub struct BookOutput {
    pub book: Book,
}

#[derive(Serialize)]
pub struct BookMessage {
    pub message: String,
    pub book: Book,
}

fn map_err(e: service::errors::ServiceError) -> JsonApiError {
    JsonApiError::from_service(e, NOT_FOUND)
}

#[utoipa::path(
    get, path = "/books", tag = "books",
    responses((status = 200, description = "All books", body = crate::openapi::BookListDoc))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<BookList>, JsonApiError> {
    let books = state.books.list().await.map_err(map_err)?;
    Ok(Json(BookList { books }))
}

#[utoipa::path(
    get, path = "/books/{id}", tag = "books",
    params(("id" = u64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book", body = crate::openapi::BookOutputDoc),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): ApiPath<u64>,
) -> Result<Json<BookOutput>, JsonApiError> {
    let book = state.books.get(id).await.map_err(map_err)?;
    Ok(Json(BookOutput { book }))
}

#[utoipa::path(
    post, path = "/books", tag = "books",
    request_body = crate::openapi::BookInputDoc,
    responses(
        (
            status = 201,
            description = "Book created successfully",
            body = crate::openapi::BookMessageDoc
        ),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(input), _): ApiJson<BookInput>,
) -> Result<(StatusCode, Json<BookMessage>), JsonApiError> {
    let book = state.books.create(input).await.map_err(map_err)?;
    info!(id = book.id, by = %claims.sub, "book_created");
    Ok((
        StatusCode::CREATED,
        Json(BookMessage { message: "Book created successfully".into(), book }),
    ))
}

#[utoipa::path(
    put, path = "/books/{id}", tag = "books",
    params(("id" = u64, Path, description = "Book id")),
    request_body = crate::openapi::BookInputDoc,
    responses(
        (
            status = 200,
            description = "Book updated successfully",
            body = crate::openapi::BookMessageDoc
        ),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): ApiPath<u64>,
    WithRejection(Json(patch), _): ApiJson<BookPatch>,
) -> Result<Json<BookMessage>, JsonApiError> {
    let book = state.books.update(id, patch).await.map_err(map_err)?;
    Ok(Json(BookMessage { message: "Book updated successfully".into(), book }))
}

#[utoipa::path(
    delete, path = "/books/{id}", tag = "books",
    params(("id" = u64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted successfully"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): ApiPath<u64>,
) -> Result<Json<MessageResponse>, JsonApiError> {
    state.books.delete(id).await.map_err(map_err)?;
    Ok(Json(MessageResponse::new("Book deleted successfully")))
}
