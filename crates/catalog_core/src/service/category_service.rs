//! Category use-case service.
//!
//! # Invariants
//! - Batch creation is all-or-nothing.
//! - Renames keep id and `created_date`; only name and
//!   `last_modified_date` change.

use super::error::ServiceError;
use crate::model::category::{Category, CategoryId};
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::transaction::run_in_transaction;
use log::info;
use rusqlite::Connection;

/// Transactional category use-cases over one connection.
pub struct CategoryService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> CategoryService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts one category per name in a single transaction.
    ///
    /// A blank name or storage failure anywhere in `names` discards every
    /// insert made by this call. An empty `names` is rejected as
    /// `InvalidInput`.
    pub fn create_categories<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<Category>, ServiceError> {
        if names.is_empty() {
            return Err(ServiceError::InvalidInput(
                "at least one category name is required".to_string(),
            ));
        }
        let created = run_in_transaction(self.conn, |conn| {
            let repo = SqliteCategoryRepository::try_new(conn)?;
            let mut created = Vec::with_capacity(names.len());
            for name in names {
                created.push(repo.save(&Category::new(name.as_ref()))?);
            }
            Ok::<_, ServiceError>(created)
        })?;
        info!(
            "event=categories_create module=service status=ok count={}",
            created.len()
        );
        Ok(created)
    }

    /// Loads, renames and re-saves one category.
    pub fn rename(&self, id: CategoryId, name: &str) -> Result<Category, ServiceError> {
        run_in_transaction(self.conn, |conn| {
            let repo = SqliteCategoryRepository::try_new(conn)?;
            let mut category = repo
                .find_by_id(id)?
                .ok_or(ServiceError::CategoryNotFound(id))?;
            category.name = name.to_string();
            Ok(repo.save(&category)?)
        })
    }

    /// Returns the first category named exactly `name`, inserting it first
    /// when none exists.
    pub fn find_or_create(&self, name: &str) -> Result<Category, ServiceError> {
        run_in_transaction(self.conn, |conn| {
            let repo = SqliteCategoryRepository::try_new(conn)?;
            if let Some(existing) = repo.find_first_by_name_equals(name)? {
                return Ok(existing);
            }
            Ok(repo.save(&Category::new(name))?)
        })
    }
}
