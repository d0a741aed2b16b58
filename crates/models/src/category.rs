use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::Record;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
}

impl CategoryInput {
    pub fn into_new(self) -> Result<NewCategory, ModelError> {
        let name = self.name.map(|n| n.trim().to_string()).unwrap_or_default();
        if name.is_empty() {
            return Err(ModelError::Validation("name required".into()));
        }
        Ok(NewCategory { name })
    }
}

impl CategoryPatch {
    pub fn validate(&self) -> Result<(), ModelError> {
        match &self.name {
            Some(n) if n.trim().is_empty() => {
                Err(ModelError::Validation("name must not be blank".into()))
            }
            _ => Ok(()),
        }
    }
}

impl Record for Category {
    type Draft = NewCategory;
    type Patch = CategoryPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: NewCategory) -> Self {
        Category { id, name: draft.name }
    }

    fn merge(self, patch: CategoryPatch) -> Self {
        Category { name: patch.name.unwrap_or(self.name), ..self }
    }
}
