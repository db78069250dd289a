//! Job catalog for the BrickHole marketplace: the listing model, the filter
//! and sort pipeline, and a repository trait for serving pages of results.

pub mod error;
pub mod filter;
pub mod model;
pub mod repository;
pub mod sample;
pub mod session;
pub mod sort;

pub use error::CatalogError;
pub use filter::{filter_jobs, matches, CategorySelection, Criteria, DatePosted, FilterSpec, PriceRange};
pub use model::{ExperienceLevel, JobPosting, JobType, Urgency, ALL_CATEGORIES, CATEGORIES};
pub use repository::{CatalogQuery, InMemoryCatalog, JobCatalog, Page, PageRequest};
pub use session::{Debouncer, FilterSession};
pub use sort::{sort_jobs, SortOrder};
