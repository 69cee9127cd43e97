//! Ordering over enumerated entity columns.

use super::QueryError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

static SORT_ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*(?:,\s*([A-Za-z]+)\s*)?$")
        .expect("valid sort item regex")
});

/// A sortable column of one entity.
///
/// Implementors map each variant to a fully qualified SQL column
/// (`alias.column`) that is safe to interpolate.
pub trait SortField: Copy + Debug + PartialEq {
    /// Qualified SQL column, e.g. `p.price`.
    fn column(self) -> &'static str;
    /// Primary key column of the entity, used as the final tiebreaker.
    fn primary_key() -> Self;
    /// Resolves a property name (`id`, `name`, `createdDate`, ...).
    fn from_property(property: &str) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order<F: SortField> {
    pub field: F,
    pub direction: Direction,
}

impl<F: SortField> Order<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

/// Ordered list of sort orders; empty means unsorted.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort<F: SortField> {
    orders: Vec<Order<F>>,
}

impl<F: SortField> Default for Sort<F> {
    fn default() -> Self {
        Self::unsorted()
    }
}

impl<F: SortField> Sort<F> {
    pub fn unsorted() -> Self {
        Self { orders: Vec::new() }
    }

    pub fn by(order: Order<F>) -> Self {
        Self {
            orders: vec![order],
        }
    }

    /// Appends `order` after the existing orders.
    pub fn and(mut self, order: Order<F>) -> Self {
        self.orders.push(order);
        self
    }

    pub fn orders(&self) -> &[Order<F>] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    /// Parses `property[,asc|desc]` items separated by `;`.
    ///
    /// An empty or blank expression yields [`Sort::unsorted`].
    pub fn parse(expression: &str) -> Result<Self, QueryError> {
        let mut sort = Self::unsorted();
        for item in expression.split(';').filter(|item| !item.trim().is_empty()) {
            let caps = SORT_ITEM_RE
                .captures(item)
                .ok_or_else(|| QueryError::InvalidSort(format!("malformed item `{item}`")))?;
            let property = &caps[1];
            let field = F::from_property(property)
                .ok_or_else(|| QueryError::InvalidSort(format!("unknown property `{property}`")))?;
            let direction = match caps.get(2) {
                Some(raw) => Direction::parse(raw.as_str()).ok_or_else(|| {
                    QueryError::InvalidSort(format!("unknown direction `{}`", raw.as_str()))
                })?,
                None => Direction::Asc,
            };
            sort = sort.and(Order { field, direction });
        }
        Ok(sort)
    }

    /// Renders ` ORDER BY ...` including the primary-key tiebreaker.
    pub fn to_order_by_sql(&self) -> String {
        let primary_key = F::primary_key();
        let mut terms: Vec<String> = self
            .orders
            .iter()
            .map(|order| format!("{} {}", order.field.column(), order.direction.as_sql()))
            .collect();
        if !self.orders.iter().any(|order| order.field == primary_key) {
            terms.push(format!("{} ASC", primary_key.column()));
        }
        format!(" ORDER BY {}", terms.join(", "))
    }
}
