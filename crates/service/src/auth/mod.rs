//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration and login live in [`service::AuthService`]; persistence is behind
//! [`repository::AuthRepository`] with a file-backed implementation in
//! [`repo::file`]. Password hashing and token issuance are thin wrappers over
//! `argon2` and `jsonwebtoken`.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repo;
pub mod repository;
pub mod service;
pub mod token;

pub use service::AuthService;
