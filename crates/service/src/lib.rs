//! Service layer for the bookshelf backend.
//! - `storage`: the JSON-file record store (per-collection locks, atomic writes).
//! - `file`: book and category stores on top of it.
//! - `auth`: registration, authentication and token issuance.
//!
//! Nothing here knows about HTTP; the server crate maps the error types to
//! status codes.

pub mod auth;
pub mod errors;
pub mod file;
pub mod metrics;
pub mod runtime;
pub mod storage;
