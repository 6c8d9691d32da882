//! Pagination utilities for entry listings

use serde::Serialize;

/// Entries per page in `GET /api/entries`
pub const ENTRIES_PAGE_SIZE: i64 = 20;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// One page of results plus its position
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total_items: i64) -> Self {
        Self {
            items,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages: pagination.total_pages,
            total_items,
        }
    }
}

/// Calculate pagination metadata, clamping the page into [1, total_pages]
///
/// ```
/// use jrnl_server::pagination::calculate_pagination;
///
/// // 45 entries at 20/page = 3 pages (20 + 20 + 5)
/// let p = calculate_pagination(45, 2, 20);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 20);
///
/// // Out-of-bounds page gets clamped
/// let p = calculate_pagination(45, 99, 20);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 40);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64, page_size: i64) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = (total_results + page_size - 1) / page_size;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        page_size,
        total_pages,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(45, 2, ENTRIES_PAGE_SIZE);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 20);
    }

    #[test]
    fn test_pagination_out_of_bounds_low() {
        let p = calculate_pagination(45, 0, ENTRIES_PAGE_SIZE);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset, 0);

        let p = calculate_pagination(45, -3, ENTRIES_PAGE_SIZE);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 1, ENTRIES_PAGE_SIZE);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_exact_page_boundary() {
        let p = calculate_pagination(40, 2, ENTRIES_PAGE_SIZE);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 20);
    }
}
