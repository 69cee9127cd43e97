//! Catalog domain model.
//!
//! # Responsibility
//! - Define the `Category` and `Product` records stored by repositories.
//! - Validate caller-controlled fields before they reach SQL.
//!
//! # Invariants
//! - `id == None` means "not persisted yet"; repositories assign ids.
//! - Audit timestamps are owned by the persistence layer.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod category;
pub mod product;

/// Field-level validation failure for catalog records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// `name` is empty or whitespace only.
    BlankName { entity: &'static str },
    /// `price` is below zero.
    NegativePrice(i64),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName { entity } => write!(f, "{entity} name must not be blank"),
            Self::NegativePrice(price) => write!(f, "price must not be negative, got {price}"),
        }
    }
}

impl Error for ModelValidationError {}
