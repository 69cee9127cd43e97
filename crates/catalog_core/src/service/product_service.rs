//! Product use-case service.
//!
//! # Invariants
//! - Products are only created under a category that exists in the same
//!   transaction.
//! - Bulk statements and cursors always run inside a transaction opened
//!   (or joined) here.

use super::error::ServiceError;
use crate::model::category::{Category, CategoryId};
use crate::model::product::{Product, ProductId};
use crate::query::page::PageRequest;
use crate::repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
use crate::repo::product_repo::{ProductField, ProductRepository, SqliteProductRepository};
use crate::transaction::run_in_transaction;
use log::info;
use rusqlite::Connection;

/// Transactional product use-cases over one connection.
pub struct ProductService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ProductService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Creates a product under an existing category.
    pub fn create_product(
        &self,
        category_id: CategoryId,
        name: &str,
        price: i64,
    ) -> Result<Product, ServiceError> {
        run_in_transaction(self.conn, |conn| {
            let categories = SqliteCategoryRepository::try_new(conn)?;
            if !categories.exists_by_id(category_id)? {
                return Err(ServiceError::CategoryNotFound(category_id));
            }
            let products = SqliteProductRepository::try_new(conn)?;
            Ok(products.save(&Product::new(name, price, category_id))?)
        })
    }

    /// Deletes products named `name` one by one; returns the count.
    pub fn delete_by_name(&self, name: &str) -> Result<usize, ServiceError> {
        let deleted = run_in_transaction(self.conn, |conn| {
            let products = SqliteProductRepository::try_new(conn)?;
            Ok::<_, ServiceError>(products.delete_by_name(name)?)
        })?;
        info!("event=products_delete module=service status=ok deleted={deleted}");
        Ok(deleted)
    }

    /// Deletes products named `name` with one bulk statement.
    pub fn bulk_delete_by_name(&self, name: &str) -> Result<usize, ServiceError> {
        run_in_transaction(self.conn, |conn| {
            let products = SqliteProductRepository::try_new(conn)?;
            Ok(products.delete_product_using_name(name)?)
        })
    }

    /// Sets the price of product `id` to zero and returns the stored row.
    pub fn zero_price(&self, id: ProductId) -> Result<Product, ServiceError> {
        run_in_transaction(self.conn, |conn| {
            let products = SqliteProductRepository::try_new(conn)?;
            if products.update_product_price_to_zero(id)? == 0 {
                return Err(ServiceError::ProductNotFound(id));
            }
            products
                .find_by_id(id)?
                .ok_or(ServiceError::ProductNotFound(id))
        })
    }

    /// Walks every slice of `category` with `slice_size` items per slice and
    /// returns the content of each slice in order.
    pub fn collect_category_slices(
        &self,
        category: &Category,
        slice_size: u32,
    ) -> Result<Vec<Vec<Product>>, ServiceError> {
        let products = SqliteProductRepository::try_new(self.conn)?;
        let mut request = Some(PageRequest::<ProductField>::of(0, slice_size)?);
        let mut slices = Vec::new();
        while let Some(current) = request {
            let slice = products.find_all_by_category(category, &current)?;
            request = slice.next_page_request();
            if slice.has_content() {
                slices.push(slice.into_content());
            }
        }
        Ok(slices)
    }

    /// Streams the products of `category` and renders `"id : name"` lines.
    pub fn category_listing(&self, category: &Category) -> Result<Vec<String>, ServiceError> {
        run_in_transaction(self.conn, |conn| {
            let products = SqliteProductRepository::try_new(conn)?;
            let lines = products.stream_all_by_category(category, |stream| {
                stream
                    .map(|product| {
                        product.map(|product| {
                            format!("{} : {}", product.id.unwrap_or_default(), product.name)
                        })
                    })
                    .collect()
            })?;
            Ok(lines)
        })
    }
}
