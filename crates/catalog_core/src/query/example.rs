//! Query-by-example for categories.
//!
//! A probe is a partially filled category; the matcher decides how unset
//! fields and text comparisons are treated.

use super::{escape_like, LIKE_ESCAPE};
use crate::model::category::{Category, CategoryId};
use rusqlite::types::Value;

/// Whether all or any of the probe predicates must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    All,
    Any,
}

/// Treatment of probe fields left as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullHandling {
    /// Unset fields do not constrain the result.
    #[default]
    Ignore,
    /// Unset fields only match `NULL` columns.
    Include,
}

/// How text fields of the probe are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringMatcher {
    #[default]
    Exact,
    Starting,
    Ending,
    Containing,
}

/// Matching options for a [`CategoryExample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExampleMatcher {
    pub match_mode: MatchMode,
    pub null_handling: NullHandling,
    pub ignore_case: bool,
    pub string_matcher: StringMatcher,
}

impl ExampleMatcher {
    /// All predicates must hold; unset fields ignored; exact, case-sensitive.
    pub fn matching() -> Self {
        Self::default()
    }

    /// Any predicate may hold.
    pub fn matching_any() -> Self {
        Self {
            match_mode: MatchMode::Any,
            ..Self::default()
        }
    }

    pub fn with_ignore_null_values(mut self) -> Self {
        self.null_handling = NullHandling::Ignore;
        self
    }

    pub fn with_include_null_values(mut self) -> Self {
        self.null_handling = NullHandling::Include;
        self
    }

    pub fn with_ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn with_string_matcher(mut self, string_matcher: StringMatcher) -> Self {
        self.string_matcher = string_matcher;
        self
    }
}

/// Partially filled category used as a query template.
///
/// Audit timestamps are never part of the probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryExample {
    pub id: Option<CategoryId>,
    pub name: Option<String>,
}

impl CategoryExample {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Builds a probe from the identity and name of `category`.
    pub fn of(category: &Category) -> Self {
        Self {
            id: category.id,
            name: Some(category.name.clone()),
        }
    }

    /// Renders the `WHERE` clause (with leading space) for alias `c`.
    ///
    /// Returns an empty clause when the probe constrains nothing.
    pub(crate) fn to_where_sql(&self, matcher: &ExampleMatcher) -> (String, Vec<Value>) {
        let mut predicates: Vec<String> = Vec::new();
        let mut binds: Vec<Value> = Vec::new();

        match self.id {
            Some(id) => {
                predicates.push("c.id = ?".to_string());
                binds.push(Value::Integer(id));
            }
            None if matcher.null_handling == NullHandling::Include => {
                predicates.push("c.id IS NULL".to_string());
            }
            None => {}
        }

        match self.name.as_deref() {
            Some(name) => {
                let (predicate, value) = text_predicate("c.name", name, matcher);
                predicates.push(predicate);
                binds.push(value);
            }
            None if matcher.null_handling == NullHandling::Include => {
                predicates.push("c.name IS NULL".to_string());
            }
            None => {}
        }

        if predicates.is_empty() {
            return (String::new(), binds);
        }

        let joiner = match matcher.match_mode {
            MatchMode::All => " AND ",
            MatchMode::Any => " OR ",
        };
        (format!(" WHERE ({})", predicates.join(joiner)), binds)
    }
}

fn text_predicate(column: &str, value: &str, matcher: &ExampleMatcher) -> (String, Value) {
    let (lhs, rhs) = if matcher.ignore_case {
        (format!("LOWER({column})"), "LOWER(?)")
    } else {
        (column.to_string(), "?")
    };

    let pattern = match matcher.string_matcher {
        StringMatcher::Exact => return (format!("{lhs} = {rhs}"), Value::Text(value.to_string())),
        StringMatcher::Starting => format!("{}%", escape_like(value)),
        StringMatcher::Ending => format!("%{}", escape_like(value)),
        StringMatcher::Containing => format!("%{}%", escape_like(value)),
    };
    (
        format!("{lhs} LIKE {rhs} ESCAPE '{LIKE_ESCAPE}'"),
        Value::Text(pattern),
    )
}

#[cfg(test)]
mod tests {
    use super::{CategoryExample, ExampleMatcher, StringMatcher};
    use rusqlite::types::Value;

    #[test]
    fn ignored_nulls_only_constrain_set_fields() {
        let (sql, binds) =
            CategoryExample::with_name("LAPTOP").to_where_sql(&ExampleMatcher::matching());
        assert_eq!(sql, " WHERE (c.name = ?)");
        assert_eq!(binds, vec![Value::Text("LAPTOP".to_string())]);
    }

    #[test]
    fn included_nulls_require_null_columns() {
        let matcher = ExampleMatcher::matching().with_include_null_values();
        let (sql, _) = CategoryExample::with_name("LAPTOP").to_where_sql(&matcher);
        assert_eq!(sql, " WHERE (c.id IS NULL AND c.name = ?)");
    }

    #[test]
    fn ignore_case_containing_lowers_both_sides_and_escapes() {
        let matcher = ExampleMatcher::matching_any()
            .with_ignore_case()
            .with_string_matcher(StringMatcher::Containing);
        let probe = CategoryExample {
            id: Some(3),
            name: Some("50%".to_string()),
        };
        let (sql, binds) = probe.to_where_sql(&matcher);
        assert_eq!(
            sql,
            " WHERE (c.id = ? OR LOWER(c.name) LIKE LOWER(?) ESCAPE '\\')"
        );
        assert_eq!(
            binds,
            vec![Value::Integer(3), Value::Text("%50\\%%".to_string())]
        );
    }

    #[test]
    fn empty_probe_matches_everything() {
        let (sql, binds) = CategoryExample::default().to_where_sql(&ExampleMatcher::matching());
        assert!(sql.is_empty());
        assert!(binds.is_empty());
    }
}
