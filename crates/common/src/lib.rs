//! Shared plumbing for the bookshelf binaries and crates: logging setup,
//! startup environment checks and a few wire types.

pub mod env;
pub mod types;
pub mod utils;
