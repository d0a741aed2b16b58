//! Extractors whose rejections render as [`JsonApiError`] bodies instead of
//! axum's plain-text defaults.

use axum::extract::Path;
use axum::Json;
use axum_extra::extract::WithRejection;

use crate::errors::JsonApiError;

pub type ApiJson<T> = WithRejection<Json<T>, JsonApiError>;
pub type ApiPath<T> = WithRejection<Path<T>, JsonApiError>;
