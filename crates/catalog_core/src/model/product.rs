//! Product record.

use super::category::{Category, CategoryId};
use super::ModelValidationError;
use serde::{Deserialize, Serialize};

/// Storage-generated product identifier.
pub type ProductId = i64;

/// Named, priced item that belongs to exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Option<ProductId>,
    pub name: String,
    /// Amount in the smallest currency unit.
    pub price: i64,
    /// Must reference an existing category whenever the product is saved.
    pub category_id: CategoryId,
}

impl Product {
    /// Creates an unsaved product inside `category_id`.
    pub fn new(name: impl Into<String>, price: i64, category_id: CategoryId) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
            category_id,
        }
    }

    /// Creates an unsaved product inside a persisted `category`.
    ///
    /// Returns `None` when `category` has no id yet.
    pub fn in_category(name: impl Into<String>, price: i64, category: &Category) -> Option<Self> {
        category.id.map(|id| Self::new(name, price, id))
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::BlankName { entity: "product" });
        }
        if self.price < 0 {
            return Err(ModelValidationError::NegativePrice(self.price));
        }
        Ok(())
    }
}
