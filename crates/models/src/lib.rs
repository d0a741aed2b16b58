//! Record types persisted by the bookshelf store.
//!
//! Every collection file holds a JSON array of one of these records. The
//! [`Record`] trait is the contract the generic store relies on: a numeric id,
//! construction from a draft once the store has picked that id, and a
//! field-wise merge for partial updates.

use serde::{de::DeserializeOwned, Serialize};

pub mod book;
pub mod category;
pub mod errors;
pub mod user;

pub use book::{Book, BookInput, BookPatch, NewBook};
pub use category::{Category, CategoryInput, CategoryPatch, NewCategory};
pub use user::{NewUser, User, UserPatch};

/// A schema-conforming object stored in a collection file.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Validated creation input; the store assigns the id.
    type Draft: Send;
    /// Partial update. Fields left as `None` keep the stored value.
    type Patch: Send;

    fn id(&self) -> u64;

    fn from_draft(id: u64, draft: Self::Draft) -> Self;

    /// Overrides every field present in `patch`. Never touches the id.
    fn merge(self, patch: Self::Patch) -> Self;
}

#[cfg(test)]
mod tests;
