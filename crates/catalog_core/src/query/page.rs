//! Page requests and the two paged result shapes.
//!
//! `Page` carries totals computed from a separate count query. `Slice`
//! never counts; it fetches one extra row to learn whether a next page
//! exists.

use super::sort::{Sort, SortField};
use super::QueryError;
use rusqlite::types::Value;
use serde::Serialize;

/// Zero-based page index, positive page size and ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<F: SortField> {
    page: u32,
    size: u32,
    sort: Sort<F>,
}

impl<F: SortField> PageRequest<F> {
    /// Unsorted request for page `page` of `size` items.
    pub fn of(page: u32, size: u32) -> Result<Self, QueryError> {
        Self::of_sorted(page, size, Sort::unsorted())
    }

    pub fn of_sorted(page: u32, size: u32, sort: Sort<F>) -> Result<Self, QueryError> {
        if size == 0 {
            return Err(QueryError::InvalidPageSize(size));
        }
        Ok(Self { page, size, sort })
    }

    pub fn with_sort(mut self, sort: Sort<F>) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort<F> {
        &self.sort
    }

    /// Number of rows skipped before this page: `page * size`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
            sort: self.sort.clone(),
        }
    }

    pub fn previous_or_first(&self) -> Self {
        Self {
            page: self.page.saturating_sub(1),
            size: self.size,
            sort: self.sort.clone(),
        }
    }

    /// Appends ` LIMIT ? OFFSET ?` for `limit` rows at this page's offset.
    pub(crate) fn push_limit_offset(&self, sql: &mut String, binds: &mut Vec<Value>, limit: u64) {
        sql.push_str(" LIMIT ? OFFSET ?");
        binds.push(Value::Integer(clamp_i64(limit)));
        binds.push(Value::Integer(clamp_i64(self.offset())));
    }
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// One page of results plus totals from a count query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T, F: SortField> {
    content: Vec<T>,
    number: u32,
    size: u32,
    total_elements: u64,
    total_pages: u64,
    #[serde(skip)]
    request: PageRequest<F>,
}

impl<T, F: SortField> Page<T, F> {
    pub fn new(content: Vec<T>, request: PageRequest<F>, total_elements: u64) -> Self {
        let size = u64::from(request.size());
        Self {
            number: request.page(),
            size: request.size(),
            total_pages: total_elements.div_ceil(size),
            total_elements,
            content,
            request,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// `ceil(total_elements / size)`.
    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn is_first(&self) -> bool {
        !self.has_previous()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn next_page_request(&self) -> Option<PageRequest<F>> {
        self.has_next().then(|| self.request.next())
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U, F> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            request: self.request,
        }
    }
}

/// One page of results that only knows whether another page follows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice<T, F: SortField> {
    content: Vec<T>,
    number: u32,
    size: u32,
    has_next: bool,
    #[serde(skip)]
    request: PageRequest<F>,
}

impl<T, F: SortField> Slice<T, F> {
    /// Builds a slice from up to `size + 1` fetched rows; the extra row only
    /// signals that a next page exists and is dropped.
    pub fn from_lookahead(mut rows: Vec<T>, request: PageRequest<F>) -> Self {
        let size = request.size() as usize;
        let has_next = rows.len() > size;
        rows.truncate(size);
        Self {
            content: rows,
            number: request.page(),
            size: request.size(),
            has_next,
            request,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn next_page_request(&self) -> Option<PageRequest<F>> {
        self.has_next.then(|| self.request.next())
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, PageRequest, Slice};
    use crate::query::sort::{Order, Sort, SortField};
    use crate::query::QueryError;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Id;

    impl SortField for Id {
        fn column(self) -> &'static str {
            "t.id"
        }

        fn primary_key() -> Self {
            Id
        }

        fn from_property(property: &str) -> Option<Self> {
            (property == "id").then_some(Id)
        }
    }

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(
            PageRequest::<Id>::of(0, 0).unwrap_err(),
            QueryError::InvalidPageSize(0)
        );
    }

    #[test]
    fn offset_is_page_times_size() {
        let request = PageRequest::<Id>::of(3, 25).unwrap();
        assert_eq!(request.offset(), 75);
        assert_eq!(request.next().offset(), 100);
        assert_eq!(request.previous_or_first().page(), 2);
        assert_eq!(PageRequest::<Id>::of(0, 5).unwrap().previous_or_first().page(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let request = PageRequest::<Id>::of(0, 2).unwrap();
        assert_eq!(Page::new(vec![1, 2], request.clone(), 5).total_pages(), 3);
        assert_eq!(Page::new(vec![1, 2], request.clone(), 4).total_pages(), 2);
        assert_eq!(Page::<i32, Id>::new(vec![], request, 0).total_pages(), 0);
    }

    #[test]
    fn page_navigation_flags_follow_totals() {
        let sort = Sort::by(Order::desc(Id));
        let first = Page::new(vec!["a"], PageRequest::of_sorted(0, 1, sort).unwrap(), 2);
        assert!(first.is_first());
        assert!(first.has_next());
        let next = first.next_page_request().unwrap();
        assert_eq!(next.page(), 1);
        assert_eq!(next.sort(), first.next_page_request().unwrap().sort());

        let last = Page::new(vec!["b"], next, 2);
        assert!(last.is_last());
        assert!(last.has_previous());
        assert!(last.next_page_request().is_none());
    }

    #[test]
    fn slice_drops_lookahead_row() {
        let request = PageRequest::<Id>::of(0, 2).unwrap();
        let slice = Slice::from_lookahead(vec![1, 2, 3], request.clone());
        assert_eq!(slice.content(), &[1, 2]);
        assert!(slice.has_next());
        assert_eq!(slice.next_page_request().unwrap().page(), 1);

        let tail = Slice::from_lookahead(vec![3], request.next());
        assert!(!tail.has_next());
        assert!(tail.next_page_request().is_none());
    }

    #[test]
    fn page_map_preserves_metadata() {
        let page = Page::new(vec![1, 2], PageRequest::<Id>::of(1, 2).unwrap(), 6);
        let mapped = page.map(|value| value * 10);
        assert_eq!(mapped.content(), &[10, 20]);
        assert_eq!(mapped.number(), 1);
        assert_eq!(mapped.total_elements(), 6);
    }
}
