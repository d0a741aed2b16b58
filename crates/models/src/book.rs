use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::Record;

fn default_price() -> String {
    "0".to_string()
}

/// A book in the catalog. `price` stays textual, the way clients send it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    /// Category id; not checked against the categories collection.
    pub categoryid: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_price")]
    pub price: String,
    pub created_at: DateTime<Utc>,
}

/// Create request body. Everything but `categoryid` falls back to a default.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BookInput {
    pub categoryid: Option<u64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewBook {
    pub categoryid: u64,
    pub title: String,
    pub author: String,
    pub price: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BookPatch {
    pub categoryid: Option<u64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<String>,
}

impl BookInput {
    pub fn into_new(self) -> Result<NewBook, ModelError> {
        let categoryid = self
            .categoryid
            .ok_or_else(|| ModelError::Validation("categoryid is required".into()))?;
        Ok(NewBook {
            categoryid,
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            price: self.price.filter(|p| !p.is_empty()).unwrap_or_else(default_price),
        })
    }
}

impl Record for Book {
    type Draft = NewBook;
    type Patch = BookPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: NewBook) -> Self {
        Book {
            id,
            categoryid: draft.categoryid,
            title: draft.title,
            author: draft.author,
            price: draft.price,
            created_at: Utc::now(),
        }
    }

    fn merge(self, patch: BookPatch) -> Self {
        Book {
            categoryid: patch.categoryid.unwrap_or(self.categoryid),
            title: patch.title.unwrap_or(self.title),
            author: patch.author.unwrap_or(self.author),
            price: patch.price.unwrap_or(self.price),
            ..self
        }
    }
}
