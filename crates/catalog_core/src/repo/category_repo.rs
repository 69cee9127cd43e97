//! Category repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Upsert categories by identity and maintain audit timestamps.
//! - Provide name-based lookups and query-by-example.
//!
//! # Invariants
//! - `created_date` is written once on insert; `last_modified_date` is
//!   refreshed on every save.
//! - `find_all_by_name_like` is case-sensitive (`case_sensitive_like=ON`).
//! - Unsorted listings come back in id order.

use super::{count_from_db, ensure_connection_ready, RepoError, RepoResult};
use crate::model::category::{Category, CategoryId};
use crate::query::example::{CategoryExample, ExampleMatcher};
use crate::query::sort::{Sort, SortField};
use crate::query::{escape_like, LIKE_ESCAPE};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    c.id AS id,
    c.name AS name,
    c.created_date AS created_date,
    c.last_modified_date AS last_modified_date
FROM categories c";

const CATEGORY_TABLE: (&str, &[&str]) = (
    "categories",
    &["id", "name", "created_date", "last_modified_date"],
);

/// Sortable category columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Id,
    Name,
    CreatedDate,
    LastModifiedDate,
}

impl SortField for CategoryField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "c.id",
            Self::Name => "c.name",
            Self::CreatedDate => "c.created_date",
            Self::LastModifiedDate => "c.last_modified_date",
        }
    }

    fn primary_key() -> Self {
        Self::Id
    }

    fn from_property(property: &str) -> Option<Self> {
        match property {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "createdDate" | "created_date" => Some(Self::CreatedDate),
            "lastModifiedDate" | "last_modified_date" => Some(Self::LastModifiedDate),
            _ => None,
        }
    }
}

/// Repository interface for categories.
pub trait CategoryRepository {
    /// Inserts when `id` is `None`, otherwise updates the existing row.
    ///
    /// Returns the stored state, including generated id and audit fields.
    fn save(&self, category: &Category) -> RepoResult<Category>;
    fn find_by_id(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    fn find_all(&self, sort: &Sort<CategoryField>) -> RepoResult<Vec<Category>>;
    fn count(&self) -> RepoResult<u64>;
    fn exists_by_id(&self, id: CategoryId) -> RepoResult<bool>;
    /// Deletes one category; fails while products still reference it.
    fn delete_by_id(&self, id: CategoryId) -> RepoResult<usize>;
    /// Exact name match; lowest id wins when several rows share the name.
    fn find_first_by_name_equals(&self, name: &str) -> RepoResult<Option<Category>>;
    /// SQL `LIKE` with caller-supplied wildcards.
    fn find_all_by_name_like(&self, pattern: &str) -> RepoResult<Vec<Category>>;
    /// Single category whose name contains `name` literally.
    ///
    /// `AmbiguousResult` when more than one row matches.
    fn find_by_name_contains(&self, name: &str) -> RepoResult<Option<Category>>;
    fn find_all_by_example(
        &self,
        example: &CategoryExample,
        matcher: &ExampleMatcher,
    ) -> RepoResult<Vec<Category>>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Builds a repository on a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[CATEGORY_TABLE])?;
        Ok(Self { conn })
    }

    fn query(&self, sql: &str, binds: Vec<Value>) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn insert(&self, category: &Category) -> RepoResult<CategoryId> {
        self.conn.execute(
            "INSERT INTO categories (name, created_date, last_modified_date)
             VALUES (?1, (strftime('%s', 'now') * 1000), (strftime('%s', 'now') * 1000));",
            [category.name.as_str()],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("event=category_insert module=repo status=ok id={id}");
        Ok(id)
    }

    fn update(&self, id: CategoryId, category: &Category) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE categories
             SET
                name = ?2,
                last_modified_date = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, category.name.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "category",
                id,
            });
        }
        debug!("event=category_update module=repo status=ok id={id}");
        Ok(())
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn save(&self, category: &Category) -> RepoResult<Category> {
        category.validate()?;

        let id = match category.id {
            Some(id) => {
                self.update(id, category)?;
                id
            }
            None => self.insert(category)?,
        };

        self.find_by_id(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("category {id} missing after save")))
    }

    fn find_by_id(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let mut found = self.query(
            &format!("{CATEGORY_SELECT_SQL} WHERE c.id = ?"),
            vec![Value::Integer(id)],
        )?;
        Ok(found.pop())
    }

    fn find_all(&self, sort: &Sort<CategoryField>) -> RepoResult<Vec<Category>> {
        self.query(
            &format!("{CATEGORY_SELECT_SQL}{}", sort.to_order_by_sql()),
            Vec::new(),
        )
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM categories;", [], |row| row.get(0))?;
        count_from_db(count, "category count")
    }

    fn exists_by_id(&self, id: CategoryId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn delete_by_id(&self, id: CategoryId) -> RepoResult<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1;", [id])?;
        debug!("event=category_delete module=repo status=ok id={id} deleted={deleted}");
        Ok(deleted)
    }

    fn find_first_by_name_equals(&self, name: &str) -> RepoResult<Option<Category>> {
        let mut found = self.query(
            &format!("{CATEGORY_SELECT_SQL} WHERE c.name = ? ORDER BY c.id ASC LIMIT 1"),
            vec![Value::Text(name.to_string())],
        )?;
        Ok(found.pop())
    }

    fn find_all_by_name_like(&self, pattern: &str) -> RepoResult<Vec<Category>> {
        self.query(
            &format!("{CATEGORY_SELECT_SQL} WHERE c.name LIKE ? ORDER BY c.id ASC"),
            vec![Value::Text(pattern.to_string())],
        )
    }

    fn find_by_name_contains(&self, name: &str) -> RepoResult<Option<Category>> {
        let mut found = self.query(
            &format!(
                "{CATEGORY_SELECT_SQL} WHERE c.name LIKE ? ESCAPE '{LIKE_ESCAPE}' \
                 ORDER BY c.id ASC LIMIT 2"
            ),
            vec![Value::Text(format!("%{}%", escape_like(name)))],
        )?;
        if found.len() > 1 {
            return Err(RepoError::AmbiguousResult { entity: "category" });
        }
        Ok(found.pop())
    }

    fn find_all_by_example(
        &self,
        example: &CategoryExample,
        matcher: &ExampleMatcher,
    ) -> RepoResult<Vec<Category>> {
        let (where_sql, binds) = example.to_where_sql(matcher);
        self.query(
            &format!("{CATEGORY_SELECT_SQL}{where_sql} ORDER BY c.id ASC"),
            binds,
        )
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let category = Category {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        created_date: Some(row.get("created_date")?),
        last_modified_date: Some(row.get("last_modified_date")?),
    };
    category.validate().map_err(|err| {
        RepoError::InvalidData(format!("categories row {:?}: {err}", category.id))
    })?;
    Ok(category)
}
