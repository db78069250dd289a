//! Catalog access behind a trait, so the listing can move from the seed
//! array to a paginated backend without touching callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;
use crate::filter::{filter_jobs, Criteria};
use crate::model::JobPosting;
use crate::sample::sample_jobs;
use crate::sort::{sort_jobs, SortOrder};

pub const DEFAULT_PER_PAGE: u32 = 12;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based.
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Clamps `per_page` into `1..=MAX_PER_PAGE`; rejects page 0.
    pub fn new(page: u32, per_page: u32) -> Result<Self, CatalogError> {
        if page == 0 {
            return Err(CatalogError::InvalidPage);
        }
        Ok(PageRequest {
            page,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        })
    }

    fn offset(&self) -> usize {
        (self.page as usize - 1) * self.per_page as usize
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page as usize) as u32
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub criteria: Criteria,
    pub sort: Option<SortOrder>,
    pub page: PageRequest,
}

#[async_trait]
pub trait JobCatalog: Send + Sync {
    async fn list_jobs(
        &self,
        query: &CatalogQuery,
        now: DateTime<Utc>,
    ) -> Result<Page<JobPosting>, CatalogError>;

    async fn get_job(&self, id: u32) -> Result<Option<JobPosting>, CatalogError>;
}

/// Filters a fixed in-memory list on every call.
pub struct InMemoryCatalog {
    jobs: Vec<JobPosting>,
}

impl InMemoryCatalog {
    pub fn new(jobs: Vec<JobPosting>) -> Self {
        InMemoryCatalog { jobs }
    }

    /// The seed postings, dated relative to `now`.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        InMemoryCatalog::new(sample_jobs(now))
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }
}

#[async_trait]
impl JobCatalog for InMemoryCatalog {
    async fn list_jobs(
        &self,
        query: &CatalogQuery,
        now: DateTime<Utc>,
    ) -> Result<Page<JobPosting>, CatalogError> {
        query.criteria.validate()?;

        let mut visible = filter_jobs(&self.jobs, &query.criteria, now);
        if let Some(order) = query.sort {
            sort_jobs(&mut visible, order);
        }

        let total = visible.len();
        let items = visible
            .into_iter()
            .skip(query.page.offset())
            .take(query.page.per_page as usize)
            .cloned()
            .collect::<Vec<_>>();

        debug!(
            "Catalog query matched {total} of {} jobs, returning {}",
            self.jobs.len(),
            items.len()
        );

        Ok(Page {
            items,
            total,
            page: query.page.page,
            per_page: query.page.per_page,
        })
    }

    async fn get_job(&self, id: u32) -> Result<Option<JobPosting>, CatalogError> {
        Ok(self.jobs.iter().find(|j| j.id == id).cloned())
    }
}
