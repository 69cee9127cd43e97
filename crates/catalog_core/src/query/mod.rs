//! Typed query primitives shared by repositories.
//!
//! # Responsibility
//! - Describe ordering (`Sort`), paging (`PageRequest`, `Page`, `Slice`) and
//!   partial-template matching (`CategoryExample`, `ExampleMatcher`).
//! - Render those descriptions into SQL fragments plus bind values.
//!
//! # Invariants
//! - Only enumerated column names are ever interpolated into SQL; every
//!   caller-provided value travels as a bind parameter.
//! - Rendered `ORDER BY` clauses always end with a primary-key tiebreaker.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod example;
pub mod page;
pub mod sort;

/// Escape character used by every `LIKE ... ESCAPE` clause we render.
pub const LIKE_ESCAPE: char = '\\';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Page size must be at least one.
    InvalidPageSize(u32),
    /// Sort expression could not be parsed.
    InvalidSort(String),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPageSize(size) => write!(f, "page size must be positive, got {size}"),
            Self::InvalidSort(message) => write!(f, "invalid sort: {message}"),
        }
    }
}

impl Error for QueryError {}

/// Escapes `%`, `_` and the escape character so `value` matches literally
/// inside a `LIKE ... ESCAPE '\'` pattern.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '%' || ch == '_' || ch == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_protects_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("LAPTOP"), "LAPTOP");
    }
}
