use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use common::types::MessageResponse;
use models::{Category, CategoryInput, CategoryPatch};
use serde::Serialize;

use crate::extract::{ApiJson, ApiPath};
use crate::{errors::JsonApiError, routes::auth::ServerState};

const NOT_FOUND: &str = "Category not found";

#[derive(Serialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
}

#[derive(Serialize)]
pub struct CategoryOutput {
    pub category: Category,
}

#[derive(Serialize)]
pub struct CategoryMessage {
    pub message: String,
    pub category: Category,
}

fn map_err(e: service::errors::ServiceError) -> JsonApiError {
    JsonApiError::from_service(e, NOT_FOUND)
}

#[utoipa::path(
    get, path = "/categories", tag = "categories",
    responses(
        (status = 200, description = "All categories", body = crate::openapi::CategoryListDoc)
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<CategoryList>, JsonApiError> {
    let categories = state.categories.list().await.map_err(map_err)?;
    Ok(Json(CategoryList { categories }))
}

#[utoipa::path(
    get, path = "/categories/{id}", tag = "categories",
    params(("id" = u64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): ApiPath<u64>,
) -> Result<Json<CategoryOutput>, JsonApiError> {
    let category = state.categories.get(id).await.map_err(map_err)?;
    Ok(Json(CategoryOutput { category }))
}

#[utoipa::path(
    post, path = "/categories", tag = "categories",
    request_body = crate::openapi::CategoryInputDoc,
    responses(
        (status = 201, description = "Category created successfully"),
        (status = 400, description = "Validation Error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<CategoryMessage>), JsonApiError> {
    let category = state.categories.create(input).await.map_err(map_err)?;
    Ok((
        StatusCode::CREATED,
        Json(CategoryMessage { message: "Category created successfully".into(), category }),
    ))
}

#[utoipa::path(
    put, path = "/categories/{id}", tag = "categories",
    params(("id" = u64, Path, description = "Category id")),
    request_body = crate::openapi::CategoryInputDoc,
    responses(
        (status = 200, description = "Category updated successfully"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): ApiPath<u64>,
    WithRejection(Json(patch), _): ApiJson<CategoryPatch>,
) -> Result<Json<CategoryMessage>, JsonApiError> {
    let category = state.categories.update(id, patch).await.map_err(map_err)?;
    Ok(Json(CategoryMessage { message: "Category updated successfully".into(), category }))
}

#[utoipa::path(
    delete, path = "/categories/{id}", tag = "categories",
    params(("id" = u64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted successfully"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): ApiPath<u64>,
) -> Result<Json<MessageResponse>, JsonApiError> {
    state.categories.delete(id).await.map_err(map_err)?;
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
