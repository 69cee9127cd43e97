//! Core data access for the product catalog.
//! Categories and products live in SQLite; this crate owns the schema,
//! the repositories over it and the transaction boundary around them.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod transaction;

pub use config::{CatalogConfig, ConfigError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::category::{Category, CategoryId};
pub use model::product::{Product, ProductId};
pub use model::ModelValidationError;
pub use query::example::{CategoryExample, ExampleMatcher, MatchMode, NullHandling, StringMatcher};
pub use query::page::{Page, PageRequest, Slice};
pub use query::sort::{Direction, Order, Sort, SortField};
pub use query::QueryError;
pub use repo::category_repo::{CategoryField, CategoryRepository, SqliteCategoryRepository};
pub use repo::product_repo::{
    ProductField, ProductRepository, ProductStream, SqliteProductRepository,
};
pub use repo::{RepoError, RepoResult};
pub use service::category_service::CategoryService;
pub use service::error::ServiceError;
pub use service::product_service::ProductService;
pub use transaction::{is_transaction_active, run_in_transaction};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
