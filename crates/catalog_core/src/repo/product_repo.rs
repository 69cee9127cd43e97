//! Product repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Upsert products while the storage enforces the category reference.
//! - Provide category-scoped lookups, counts, paging, slicing and cursors.
//! - Own the predefined queries and bulk modifying statements.
//!
//! # Invariants
//! - A product save with a dangling `category_id` fails with
//!   `ConstraintViolation` and writes nothing.
//! - `delete_by_name`, bulk statements and cursors run only inside an open
//!   transaction (`TransactionRequired` otherwise).
//! - Page totals come from a separate count query; slices never count.

use super::{
    count_from_db, ensure_connection_ready, require_transaction, RepoError, RepoResult,
};
use crate::model::category::{Category, CategoryId};
use crate::model::product::{Product, ProductId};
use crate::query::page::{Page, PageRequest, Slice};
use crate::query::sort::{Sort, SortField};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Rows};

const PRODUCT_SELECT_SQL: &str = "SELECT
    p.id AS id,
    p.name AS name,
    p.price AS price,
    p.category_id AS category_id
FROM products p";

const PRODUCT_BY_CATEGORY_NAME_SQL: &str =
    " INNER JOIN categories c ON c.id = p.category_id WHERE c.name = ?";

/// Predefined lookup of products by exact name.
const SEARCH_BY_NAME_SQL: &str = " WHERE p.name = ?";

/// Predefined pattern search and its count query.
const SEARCH_BY_PATTERN_SQL: &str = " WHERE p.name LIKE ?";
const SEARCH_BY_PATTERN_COUNT_SQL: &str = "SELECT COUNT(*) FROM products p WHERE p.name LIKE ?1;";

const PRODUCT_TABLE: (&str, &[&str]) = ("products", &["id", "name", "price", "category_id"]);
const CATEGORY_JOIN_TABLE: (&str, &[&str]) = ("categories", &["id", "name"]);

/// Sortable product columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Id,
    Name,
    Price,
    CategoryId,
}

impl SortField for ProductField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "p.id",
            Self::Name => "p.name",
            Self::Price => "p.price",
            Self::CategoryId => "p.category_id",
        }
    }

    fn primary_key() -> Self {
        Self::Id
    }

    fn from_property(property: &str) -> Option<Self> {
        match property {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "price" => Some(Self::Price),
            "categoryId" | "category_id" => Some(Self::CategoryId),
            _ => None,
        }
    }
}

/// Forward-only cursor over products, valid only inside the scope that
/// opened it.
///
/// Iteration stops after the first error.
pub struct ProductStream<'stmt> {
    rows: Rows<'stmt>,
    finished: bool,
}

impl Iterator for ProductStream<'_> {
    type Item = RepoResult<Product>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let next = match self.rows.next() {
            Ok(Some(row)) => Some(parse_product_row(row)),
            Ok(None) => None,
            Err(err) => Some(Err(err.into())),
        };
        if !matches!(next, Some(Ok(_))) {
            self.finished = true;
        }
        next
    }
}

/// Repository interface for products.
pub trait ProductRepository {
    /// Inserts when `id` is `None`, otherwise updates the existing row.
    fn save(&self, product: &Product) -> RepoResult<Product>;
    fn find_by_id(&self, id: ProductId) -> RepoResult<Option<Product>>;
    fn find_all(&self, sort: &Sort<ProductField>) -> RepoResult<Vec<Product>>;
    fn count(&self) -> RepoResult<u64>;
    /// Products whose category has exactly `name`.
    fn find_all_by_category_name(
        &self,
        name: &str,
        sort: &Sort<ProductField>,
    ) -> RepoResult<Vec<Product>>;
    fn find_page_by_category_name(
        &self,
        name: &str,
        request: &PageRequest<ProductField>,
    ) -> RepoResult<Page<Product, ProductField>>;
    fn count_by_category_name(&self, name: &str) -> RepoResult<u64>;
    fn count_by_name(&self, name: &str) -> RepoResult<u64>;
    fn exists_by_name(&self, name: &str) -> RepoResult<bool>;
    /// Deletes every product named `name` row by row and returns how many
    /// were removed. Requires a transaction.
    fn delete_by_name(&self, name: &str) -> RepoResult<usize>;
    /// Predefined exact-name query, paged without totals.
    fn search_product_using_name(
        &self,
        name: &str,
        request: &PageRequest<ProductField>,
    ) -> RepoResult<Vec<Product>>;
    /// Predefined `LIKE` query with a separate count query.
    fn search_product(
        &self,
        pattern: &str,
        request: &PageRequest<ProductField>,
    ) -> RepoResult<Page<Product, ProductField>>;
    /// Single bulk `DELETE`. Requires a transaction.
    fn delete_product_using_name(&self, name: &str) -> RepoResult<usize>;
    /// Single bulk `UPDATE` setting the price to zero. Requires a transaction.
    fn update_product_price_to_zero(&self, id: ProductId) -> RepoResult<usize>;
    /// Opens a cursor over the products of `category` in id order and hands
    /// it to `consume`; the cursor is released when `consume` returns.
    /// Requires a transaction.
    fn stream_all_by_category<T, C>(&self, category: &Category, consume: C) -> RepoResult<T>
    where
        C: FnOnce(ProductStream<'_>) -> RepoResult<T>;
    /// Products of `category` as a slice (no count query).
    fn find_all_by_category(
        &self,
        category: &Category,
        request: &PageRequest<ProductField>,
    ) -> RepoResult<Slice<Product, ProductField>>;
}

/// SQLite-backed product repository.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    /// Builds a repository on a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[PRODUCT_TABLE, CATEGORY_JOIN_TABLE])?;
        Ok(Self { conn })
    }

    fn query(&self, sql: &str, binds: Vec<Value>) -> RepoResult<Vec<Product>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }
        Ok(products)
    }

    fn query_count(&self, sql: &str, value: &str, what: &str) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(sql, [value], |row| row.get(0))?;
        count_from_db(count, what)
    }

    fn insert(&self, product: &Product) -> RepoResult<ProductId> {
        self.conn.execute(
            "INSERT INTO products (name, price, category_id) VALUES (?1, ?2, ?3);",
            params![product.name.as_str(), product.price, product.category_id],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(
            "event=product_insert module=repo status=ok id={id} category_id={}",
            product.category_id
        );
        Ok(id)
    }

    fn update(&self, id: ProductId, product: &Product) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE products
             SET
                name = ?2,
                price = ?3,
                category_id = ?4
             WHERE id = ?1;",
            params![id, product.name.as_str(), product.price, product.category_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "product",
                id,
            });
        }
        debug!("event=product_update module=repo status=ok id={id}");
        Ok(())
    }

    fn paged_query(
        &self,
        filter_sql: &str,
        value: &str,
        request: &PageRequest<ProductField>,
        limit: u64,
    ) -> RepoResult<Vec<Product>> {
        let mut sql = format!(
            "{PRODUCT_SELECT_SQL}{filter_sql}{}",
            request.sort().to_order_by_sql()
        );
        let mut binds = vec![Value::Text(value.to_string())];
        request.push_limit_offset(&mut sql, &mut binds, limit);
        self.query(&sql, binds)
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn save(&self, product: &Product) -> RepoResult<Product> {
        product.validate()?;

        let id = match product.id {
            Some(id) => {
                self.update(id, product)?;
                id
            }
            None => self.insert(product)?,
        };

        self.find_by_id(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("product {id} missing after save")))
    }

    fn find_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let mut found = self.query(
            &format!("{PRODUCT_SELECT_SQL} WHERE p.id = ?"),
            vec![Value::Integer(id)],
        )?;
        Ok(found.pop())
    }

    fn find_all(&self, sort: &Sort<ProductField>) -> RepoResult<Vec<Product>> {
        self.query(
            &format!("{PRODUCT_SELECT_SQL}{}", sort.to_order_by_sql()),
            Vec::new(),
        )
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products;", [], |row| row.get(0))?;
        count_from_db(count, "product count")
    }

    fn find_all_by_category_name(
        &self,
        name: &str,
        sort: &Sort<ProductField>,
    ) -> RepoResult<Vec<Product>> {
        self.query(
            &format!(
                "{PRODUCT_SELECT_SQL}{PRODUCT_BY_CATEGORY_NAME_SQL}{}",
                sort.to_order_by_sql()
            ),
            vec![Value::Text(name.to_string())],
        )
    }

    fn find_page_by_category_name(
        &self,
        name: &str,
        request: &PageRequest<ProductField>,
    ) -> RepoResult<Page<Product, ProductField>> {
        let content = self.paged_query(
            PRODUCT_BY_CATEGORY_NAME_SQL,
            name,
            request,
            u64::from(request.size()),
        )?;
        let total = self.count_by_category_name(name)?;
        Ok(Page::new(content, request.clone(), total))
    }

    fn count_by_category_name(&self, name: &str) -> RepoResult<u64> {
        self.query_count(
            "SELECT COUNT(*)
             FROM products p
             INNER JOIN categories c ON c.id = p.category_id
             WHERE c.name = ?1;",
            name,
            "product count by category name",
        )
    }

    fn count_by_name(&self, name: &str) -> RepoResult<u64> {
        self.query_count(
            "SELECT COUNT(*) FROM products WHERE name = ?1;",
            name,
            "product count by name",
        )
    }

    fn exists_by_name(&self, name: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM products WHERE name = ?1);",
            [name],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn delete_by_name(&self, name: &str) -> RepoResult<usize> {
        require_transaction(self.conn, "delete_by_name")?;

        let ids: Vec<ProductId> = self
            .query(
                &format!("{PRODUCT_SELECT_SQL} WHERE p.name = ? ORDER BY p.id ASC"),
                vec![Value::Text(name.to_string())],
            )?
            .into_iter()
            .filter_map(|product| product.id)
            .collect();

        let mut deleted = 0;
        for id in ids {
            deleted += self
                .conn
                .execute("DELETE FROM products WHERE id = ?1;", [id])?;
        }
        debug!("event=product_delete_by_name module=repo status=ok deleted={deleted}");
        Ok(deleted)
    }

    fn search_product_using_name(
        &self,
        name: &str,
        request: &PageRequest<ProductField>,
    ) -> RepoResult<Vec<Product>> {
        self.paged_query(SEARCH_BY_NAME_SQL, name, request, u64::from(request.size()))
    }

    fn search_product(
        &self,
        pattern: &str,
        request: &PageRequest<ProductField>,
    ) -> RepoResult<Page<Product, ProductField>> {
        let content = self.paged_query(
            SEARCH_BY_PATTERN_SQL,
            pattern,
            request,
            u64::from(request.size()),
        )?;
        let total = self.query_count(
            SEARCH_BY_PATTERN_COUNT_SQL,
            pattern,
            "product search count",
        )?;
        Ok(Page::new(content, request.clone(), total))
    }

    fn delete_product_using_name(&self, name: &str) -> RepoResult<usize> {
        require_transaction(self.conn, "delete_product_using_name")?;
        let deleted = self
            .conn
            .execute("DELETE FROM products WHERE name = ?1;", [name])?;
        debug!("event=product_bulk_delete module=repo status=ok deleted={deleted}");
        Ok(deleted)
    }

    fn update_product_price_to_zero(&self, id: ProductId) -> RepoResult<usize> {
        require_transaction(self.conn, "update_product_price_to_zero")?;
        let updated = self
            .conn
            .execute("UPDATE products SET price = 0 WHERE id = ?1;", [id])?;
        debug!("event=product_bulk_update module=repo status=ok id={id} updated={updated}");
        Ok(updated)
    }

    fn stream_all_by_category<T, C>(&self, category: &Category, consume: C) -> RepoResult<T>
    where
        C: FnOnce(ProductStream<'_>) -> RepoResult<T>,
    {
        require_transaction(self.conn, "stream_all_by_category")?;
        let category_id = saved_category_id(category)?;

        let mut stmt = self.conn.prepare(&format!(
            "{PRODUCT_SELECT_SQL} WHERE p.category_id = ?1 ORDER BY p.id ASC"
        ))?;
        let rows = stmt.query([category_id])?;
        debug!("event=product_stream module=repo status=start category_id={category_id}");
        let result = consume(ProductStream {
            rows,
            finished: false,
        });
        debug!("event=product_stream module=repo status=closed category_id={category_id}");
        result
    }

    fn find_all_by_category(
        &self,
        category: &Category,
        request: &PageRequest<ProductField>,
    ) -> RepoResult<Slice<Product, ProductField>> {
        let category_id = saved_category_id(category)?;
        let mut sql = format!(
            "{PRODUCT_SELECT_SQL} WHERE p.category_id = ?{}",
            request.sort().to_order_by_sql()
        );
        let mut binds = vec![Value::Integer(category_id)];
        request.push_limit_offset(&mut sql, &mut binds, u64::from(request.size()) + 1);
        let rows = self.query(&sql, binds)?;
        Ok(Slice::from_lookahead(rows, request.clone()))
    }
}

fn saved_category_id(category: &Category) -> RepoResult<CategoryId> {
    category.id.ok_or(RepoError::UnsavedEntity("category"))
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let product = Product {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        price: row.get("price")?,
        category_id: row.get("category_id")?,
    };
    product.validate().map_err(|err| {
        RepoError::InvalidData(format!("products row {:?}: {err}", product.id))
    })?;
    Ok(product)
}
