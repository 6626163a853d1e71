//! Page request resolution and page arithmetic

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use utoipa::IntoParams;

use crate::config::PaginationConfig;

/// `page` / `per_page` query parameters
#[serde_as]
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number (1-based, default: 1)
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub page: Option<i64>,
    /// Items per page (default: 30, capped at `pagination.max_per_page`, 100 by default)
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub per_page: Option<i64>,
}

/// Resolved, always-valid page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Apply defaults: missing or non-positive `per_page` falls back to the
    /// configured default, oversized values are clamped, `page` starts at 1.
    pub fn resolve(page: Option<i64>, per_page: Option<i64>, settings: &PaginationConfig) -> Self {
        let per_page = match per_page {
            Some(n) if n > 0 => n.min(settings.max_per_page.max(1)),
            _ => settings.default_per_page,
        };
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            per_page,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// One page of results with the total row count
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
        }
    }

    /// Last page number; an empty result still has page 1
    pub fn last_page(&self) -> i64 {
        ((self.total + self.per_page - 1) / self.per_page).max(1)
    }

    /// 1-based position of the first item on this page
    pub fn from(&self) -> Option<i64> {
        (!self.items.is_empty()).then(|| (self.page - 1) * self.per_page + 1)
    }

    /// 1-based position of the last item on this page
    pub fn to(&self) -> Option<i64> {
        self.from().map(|from| from + self.items.len() as i64 - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;

    fn settings() -> PaginationConfig {
        PaginationConfig::default()
    }

    #[test]
    fn test_per_page_defaults_to_thirty() {
        assert_eq!(PageRequest::resolve(None, None, &settings()).per_page, 30);
        assert_eq!(PageRequest::resolve(None, Some(0), &settings()).per_page, 30);
        assert_eq!(PageRequest::resolve(None, Some(-4), &settings()).per_page, 30);
        assert_eq!(PageRequest::resolve(None, Some(10), &settings()).per_page, 10);
    }

    #[test]
    fn test_per_page_is_clamped() {
        assert_eq!(PageRequest::resolve(None, Some(5000), &settings()).per_page, 100);
    }

    #[test]
    fn test_page_starts_at_one() {
        let request = PageRequest::resolve(Some(0), None, &settings());
        assert_eq!(request.page, 1);
        assert_eq!(request.offset(), 0);
        assert_eq!(PageRequest::resolve(Some(3), Some(10), &settings()).offset(), 20);
    }

    #[test]
    fn test_forty_five_rows_split_in_two_pages() {
        let first = Page::new(vec![0; 30], 45, PageRequest { page: 1, per_page: 30 });
        assert_eq!(first.last_page(), 2);
        assert_eq!((first.from(), first.to()), (Some(1), Some(30)));

        let second = Page::new(vec![0; 15], 45, PageRequest { page: 2, per_page: 30 });
        assert_eq!(second.last_page(), 2);
        assert_eq!((second.from(), second.to()), (Some(31), Some(45)));
    }

    #[test]
    fn test_empty_page() {
        let page: Page<i32> = Page::new(vec![], 0, PageRequest { page: 1, per_page: 30 });
        assert_eq!(page.last_page(), 1);
        assert_eq!(page.from(), None);
        assert_eq!(page.to(), None);
    }

    #[test]
    fn test_empty_per_page_query_is_none() {
        let uri = "/api/v1/equipment?per_page=&page=2".parse().unwrap();
        let Query(query) = Query::<PageQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.per_page, None);
        assert_eq!(query.page, Some(2));
    }
}
