use serde::{Deserialize, Serialize};

use crate::{
    config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    error::AppError,
};

/// Raw `?page=&limit=` query string.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl TryFrom<PageQuery> for Pagination {
    type Error = AppError;

    fn try_from(query: PageQuery) -> Result<Self, Self::Error> {
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(AppError::InvalidInput("page must be at least 1".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(Self { page, limit })
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub total_pages: i64,
    pub current_page: u32,
    pub limit: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageMeta {
    pub fn new(pagination: Pagination, total: i64) -> Self {
        let limit = pagination.limit as i64;
        let total_pages = (total + limit - 1) / limit;

        Self {
            total,
            total_pages,
            current_page: pagination.page,
            limit: pagination.limit,
            has_next_page: (pagination.page as i64) < total_pages,
            has_prev_page: pagination.page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_query_is_empty() {
        let p = Pagination::try_from(PageQuery::default()).unwrap();
        assert_eq!(p, Pagination { page: 1, limit: DEFAULT_PAGE_SIZE });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn rejects_zero_page_and_oversized_limit() {
        let zero_page = PageQuery { page: Some(0), limit: None };
        assert!(matches!(Pagination::try_from(zero_page), Err(AppError::InvalidInput(_))));

        let huge = PageQuery { page: Some(1), limit: Some(MAX_PAGE_SIZE + 1) };
        assert!(matches!(Pagination::try_from(huge), Err(AppError::InvalidInput(_))));

        let zero_limit = PageQuery { page: Some(1), limit: Some(0) };
        assert!(matches!(Pagination::try_from(zero_limit), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn meta_reports_neighbouring_pages() {
        let p = Pagination { page: 2, limit: 10 };
        assert_eq!(p.offset(), 10);

        let meta = PageMeta::new(p, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next_page);
        assert!(meta.has_prev_page);

        let last = PageMeta::new(Pagination { page: 3, limit: 10 }, 25);
        assert!(!last.has_next_page);

        let empty = PageMeta::new(Pagination { page: 1, limit: 10 }, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
        assert!(!empty.has_prev_page);
    }
}
