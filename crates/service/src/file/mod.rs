//! Collection-specific stores built on [`crate::storage::Collection`].

pub mod books;
pub mod categories;

pub use books::BookStore;
pub use categories::CategoryStore;
