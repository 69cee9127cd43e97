//! Category record.

use super::ModelValidationError;
use serde::{Deserialize, Serialize};

/// Storage-generated category identifier.
pub type CategoryId = i64;

/// Named, audited grouping of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Assigned on first save, immutable afterwards.
    pub id: Option<CategoryId>,
    pub name: String,
    /// Epoch milliseconds of the insert.
    pub created_date: Option<i64>,
    /// Epoch milliseconds of the latest insert or update.
    pub last_modified_date: Option<i64>,
}

impl Category {
    /// Creates an unsaved category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            created_date: None,
            last_modified_date: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::BlankName { entity: "category" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Category;
    use crate::model::ModelValidationError;

    #[test]
    fn new_category_is_unsaved_and_unaudited() {
        let category = Category::new("LAPTOP");
        assert!(category.is_new());
        assert!(category.created_date.is_none());
        assert!(category.last_modified_date.is_none());
    }

    #[test]
    fn blank_name_fails_validation() {
        assert_eq!(
            Category::new("  ").validate(),
            Err(ModelValidationError::BlankName { entity: "category" })
        );
    }
}
