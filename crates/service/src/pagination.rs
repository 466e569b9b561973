//! Pagination utilities for service layer
//!
//! `page` is 1-based on the wire; `normalize` converts it to the 0-based
//! index SeaORM's paginator expects.
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Pagination parameters
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub per_page: u64,
}

impl Pagination {
    pub const MAX_PER_PAGE: u64 = 100;

    /// Clamp to sane defaults and return `(page_index, per_page)`
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, Self::MAX_PER_PAGE);
        (page - 1, per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 10 } }
}

/// One page of results plus the totals clients need to walk the rest.
#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, per_page: u64) -> Self {
        let pages = if per_page == 0 { 0 } else { total.div_ceil(per_page) };
        Self { items, total, page, per_page, pages }
    }

    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page { items, total: self.total, page: self.page, per_page: self.per_page, pages: self.pages }
    }
}

/// Run `select` through SeaORM's paginator.
pub async fn fetch_page<C, E>(db: &C, select: Select<E>, opts: Pagination) -> Result<Page<E::Model>, ServiceError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    let (page_idx, per_page) = opts.normalize();
    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(items, total, page_idx + 1, per_page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 10);
    }

    #[test]
    fn pages_round_up() {
        let p = Page::new(vec![1, 2, 3], 21, 1, 10);
        assert_eq!(p.pages, 3);
        assert_eq!(Page::<i32>::new(vec![], 0, 1, 10).pages, 0);
    }
}
