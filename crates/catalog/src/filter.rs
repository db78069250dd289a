//! The listing filter: a conjunction of nine predicates evaluated over the
//! whole catalog on every change of the criteria.
//!
//! Filtering is stable. The output is always a subsequence of the input, in
//! input order; sorting is a separate, optional step (see [`crate::sort`]).

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::{ExperienceLevel, JobPosting, JobType, Urgency, ALL_CATEGORIES};

/// Upper end of the distance slider.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;
/// Bounds of the hourly-rate slider.
pub const DEFAULT_PRICE_RANGE: PriceRange = PriceRange {
    min: 5.0,
    max: 100.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DatePosted {
    #[default]
    #[serde(rename = "")]
    Any,
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "week")]
    LastWeek,
    #[serde(rename = "month")]
    LastMonth,
}

impl DatePosted {
    /// How far back a posting may be; `None` for "any time".
    pub fn window(&self) -> Option<Duration> {
        match self {
            DatePosted::Any => None,
            DatePosted::Last24Hours => Some(Duration::hours(24)),
            DatePosted::LastWeek => Some(Duration::days(7)),
            DatePosted::LastMonth => Some(Duration::days(30)),
        }
    }
}

impl FromStr for DatePosted {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" => Ok(DatePosted::Any),
            "24h" => Ok(DatePosted::Last24Hours),
            "week" => Ok(DatePosted::LastWeek),
            "month" => Ok(DatePosted::LastMonth),
            _ => Err(CatalogError::UnknownValue {
                field: "date_posted",
                value: s.to_string(),
            }),
        }
    }
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        DEFAULT_PRICE_RANGE
    }
}

/// The filter panel state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub categories: BTreeSet<String>,
    pub location: String,
    pub distance_km: f64,
    pub price_range: PriceRange,
    pub urgency: BTreeSet<Urgency>,
    pub date_posted: DatePosted,
    pub job_type: BTreeSet<JobType>,
    pub experience_level: BTreeSet<ExperienceLevel>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec {
            categories: BTreeSet::new(),
            location: String::new(),
            distance_km: DEFAULT_MAX_DISTANCE_KM,
            price_range: DEFAULT_PRICE_RANGE,
            urgency: BTreeSet::new(),
            date_posted: DatePosted::Any,
            job_type: BTreeSet::new(),
            experience_level: BTreeSet::new(),
        }
    }
}

impl FilterSpec {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.distance_km.is_nan() || self.distance_km < 0.0 {
            return Err(CatalogError::NegativeBound {
                field: "distance_km",
            });
        }
        let PriceRange { min, max } = self.price_range;
        if min.is_nan() || min < 0.0 {
            return Err(CatalogError::NegativeBound { field: "min_price" });
        }
        if max.is_nan() || max < 0.0 {
            return Err(CatalogError::NegativeBound { field: "max_price" });
        }
        if min > max {
            return Err(CatalogError::InvertedPriceRange { min, max });
        }
        Ok(())
    }
}

/// The category pill selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategorySelection {
    #[default]
    All,
    Only(String),
}

impl From<String> for CategorySelection {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ALL_CATEGORIES {
            CategorySelection::All
        } else {
            CategorySelection::Only(trimmed.to_string())
        }
    }
}

impl From<&str> for CategorySelection {
    fn from(value: &str) -> Self {
        CategorySelection::from(value.to_string())
    }
}

impl From<CategorySelection> for String {
    fn from(value: CategorySelection) -> Self {
        match value {
            CategorySelection::All => ALL_CATEGORIES.to_string(),
            CategorySelection::Only(name) => name,
        }
    }
}

/// Everything that decides which jobs are visible.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Criteria {
    pub search_query: String,
    pub selected_category: CategorySelection,
    pub filters: FilterSpec,
}

impl Criteria {
    pub fn validate(&self) -> Result<(), CatalogError> {
        self.filters.validate()
    }
}

/// Criteria with the case folding done once, reused across the catalog.
struct Matcher<'c> {
    criteria: &'c Criteria,
    query: String,
    location: String,
    now: DateTime<Utc>,
}

impl<'c> Matcher<'c> {
    fn new(criteria: &'c Criteria, now: DateTime<Utc>) -> Self {
        Matcher {
            criteria,
            query: criteria.search_query.to_lowercase(),
            location: criteria.filters.location.trim().to_lowercase(),
            now,
        }
    }

    fn matches(&self, job: &JobPosting) -> bool {
        self.search(job)
            && self.category(job)
            && self.location(job)
            && self.distance(job)
            && self.price(job)
            && self.urgency(job)
            && self.date_posted(job)
            && self.job_type(job)
            && self.experience_level(job)
    }

    fn search(&self, job: &JobPosting) -> bool {
        if self.query.is_empty() {
            return true;
        }
        [&job.title, &job.description, &job.category, &job.location]
            .iter()
            .any(|field| field.to_lowercase().contains(&self.query))
    }

    fn category(&self, job: &JobPosting) -> bool {
        match &self.criteria.selected_category {
            CategorySelection::Only(name) => job.category == *name,
            CategorySelection::All => {
                let panel = &self.criteria.filters.categories;
                panel.is_empty() || panel.contains(&job.category)
            }
        }
    }

    fn location(&self, job: &JobPosting) -> bool {
        self.location.is_empty() || job.location.to_lowercase().contains(&self.location)
    }

    fn distance(&self, job: &JobPosting) -> bool {
        job.distance_km <= self.criteria.filters.distance_km
    }

    fn price(&self, job: &JobPosting) -> bool {
        job.rate_value
            .is_some_and(|rate| self.criteria.filters.price_range.contains(rate))
    }

    fn urgency(&self, job: &JobPosting) -> bool {
        let wanted = &self.criteria.filters.urgency;
        wanted.is_empty() || wanted.contains(&job.urgency)
    }

    fn date_posted(&self, job: &JobPosting) -> bool {
        match self.criteria.filters.date_posted.window() {
            None => true,
            Some(window) => job.posted_at >= self.now - window,
        }
    }

    fn job_type(&self, job: &JobPosting) -> bool {
        let wanted = &self.criteria.filters.job_type;
        wanted.is_empty() || wanted.contains(&job.job_type)
    }

    fn experience_level(&self, job: &JobPosting) -> bool {
        let wanted = &self.criteria.filters.experience_level;
        wanted.is_empty() || wanted.contains(&job.experience_level)
    }
}

/// Returns true when `job` passes every predicate of `criteria` at `now`.
pub fn matches(job: &JobPosting, criteria: &Criteria, now: DateTime<Utc>) -> bool {
    Matcher::new(criteria, now).matches(job)
}

/// Returns the visible jobs, in catalog order.
pub fn filter_jobs<'a>(
    jobs: &'a [JobPosting],
    criteria: &Criteria,
    now: DateTime<Utc>,
) -> Vec<&'a JobPosting> {
    let matcher = Matcher::new(criteria, now);
    jobs.iter().filter(|job| matcher.matches(job)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_jobs;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap()
    }

    fn titles(jobs: &[&JobPosting]) -> Vec<String> {
        jobs.iter().map(|j| j.title.clone()).collect()
    }

    fn is_subsequence(visible: &[&JobPosting], all: &[JobPosting]) -> bool {
        let mut it = all.iter();
        visible.iter().all(|v| it.any(|a| a.id == v.id))
    }

    #[test]
    fn test_default_criteria_is_identity() {
        let jobs = sample_jobs(now());
        let visible = filter_jobs(&jobs, &Criteria::default(), now());
        assert_eq!(visible.len(), jobs.len());
        assert!(visible.iter().zip(jobs.iter()).all(|(v, j)| v.id == j.id));
    }

    #[test]
    fn test_selected_category_plumbing_yields_two() {
        let jobs = sample_jobs(now());
        let criteria = Criteria {
            selected_category: CategorySelection::from("Plumbing"),
            ..Criteria::default()
        };
        let visible = filter_jobs(&jobs, &criteria, now());
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|j| j.category == "Plumbing"));
    }

    #[test]
    fn test_selected_category_overrides_panel_set() {
        let jobs = sample_jobs(now());
        let mut criteria = Criteria {
            selected_category: CategorySelection::from("Plumbing"),
            ..Criteria::default()
        };
        criteria.filters.categories.insert("Electrical".to_string());
        let visible = filter_jobs(&jobs, &criteria, now());
        assert!(visible.iter().all(|j| j.category == "Plumbing"));
    }

    #[test]
    fn test_panel_categories_match_any_member() {
        let jobs = sample_jobs(now());
        let mut criteria = Criteria::default();
        criteria.filters.categories.insert("Plumbing".to_string());
        criteria.filters.categories.insert("Cleaning".to_string());
        let visible = filter_jobs(&jobs, &criteria, now());
        assert_eq!(visible.len(), 3);
        assert!(visible
            .iter()
            .all(|j| j.category == "Plumbing" || j.category == "Cleaning"));
    }

    #[test]
    fn test_all_categories_label_is_no_constraint() {
        let jobs = sample_jobs(now());
        let criteria = Criteria {
            selected_category: CategorySelection::from(ALL_CATEGORIES),
            ..Criteria::default()
        };
        assert_eq!(filter_jobs(&jobs, &criteria, now()).len(), jobs.len());
    }

    #[test]
    fn test_exact_price_range_selects_single_job() {
        let jobs = sample_jobs(now());
        let mut criteria = Criteria::default();
        criteria.filters.price_range = PriceRange {
            min: 40.0,
            max: 40.0,
        };
        let visible = filter_jobs(&jobs, &criteria, now());
        assert_eq!(titles(&visible), vec!["Plumbing Repair - Leaking Faucet"]);
    }

    #[test]
    fn test_unparsable_rate_fails_price_predicate() {
        let mut jobs = sample_jobs(now());
        jobs[0].rate = "Negotiable".to_string();
        jobs[0].rate_value = None;
        let visible = filter_jobs(&jobs, &Criteria::default(), now());
        assert_eq!(visible.len(), jobs.len() - 1);
        assert!(visible.iter().all(|j| j.id != jobs[0].id));
    }

    #[test]
    fn test_last_24h_excludes_older_postings() {
        let jobs = sample_jobs(now());
        let mut criteria = Criteria::default();
        criteria.filters.date_posted = DatePosted::Last24Hours;
        let visible = filter_jobs(&jobs, &criteria, now());
        assert!(!visible.is_empty());
        assert!(visible
            .iter()
            .all(|j| j.posted_at >= now() - Duration::hours(24)));
        let excluded = jobs
            .iter()
            .filter(|j| j.posted_at < now() - Duration::hours(24))
            .count();
        assert_eq!(visible.len() + excluded, jobs.len());
    }

    #[test]
    fn test_date_window_boundary_is_inclusive() {
        let mut jobs = sample_jobs(now());
        jobs.truncate(1);
        jobs[0].posted_at = now() - Duration::days(7);
        let mut criteria = Criteria::default();
        criteria.filters.date_posted = DatePosted::LastWeek;
        assert_eq!(filter_jobs(&jobs, &criteria, now()).len(), 1);

        jobs[0].posted_at = now() - Duration::days(7) - Duration::seconds(1);
        assert!(filter_jobs(&jobs, &criteria, now()).is_empty());
    }

    #[test]
    fn test_distance_bound_is_inclusive() {
        let jobs = sample_jobs(now());
        let target = &jobs[2];
        let mut criteria = Criteria::default();
        criteria.filters.distance_km = target.distance_km;
        let visible = filter_jobs(&jobs, &criteria, now());
        assert!(visible.iter().any(|j| j.id == target.id));
        assert!(visible.iter().all(|j| j.distance_km <= target.distance_km));
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let jobs = sample_jobs(now());
        for query in ["FAUCET", "plumbing", "gueliz"] {
            let criteria = Criteria {
                search_query: query.to_string(),
                ..Criteria::default()
            };
            let visible = filter_jobs(&jobs, &criteria, now());
            assert!(!visible.is_empty(), "query {query} matched nothing");
            let needle = query.to_lowercase();
            assert!(visible.iter().all(|j| {
                j.title.to_lowercase().contains(&needle)
                    || j.description.to_lowercase().contains(&needle)
                    || j.category.to_lowercase().contains(&needle)
                    || j.location.to_lowercase().contains(&needle)
            }));
        }
    }

    #[test]
    fn test_only_an_empty_query_disables_search() {
        let jobs = sample_jobs(now());
        let whitespace = Criteria {
            search_query: "\t".to_string(),
            ..Criteria::default()
        };
        assert!(filter_jobs(&jobs, &whitespace, now()).is_empty());

        let empty = Criteria::default();
        assert_eq!(filter_jobs(&jobs, &empty, now()).len(), jobs.len());
    }

    #[test]
    fn test_location_substring_filter() {
        let jobs = sample_jobs(now());
        let mut criteria = Criteria::default();
        criteria.filters.location = "casablanca".to_string();
        let visible = filter_jobs(&jobs, &criteria, now());
        assert!(!visible.is_empty());
        assert!(visible
            .iter()
            .all(|j| j.location.to_lowercase().contains("casablanca")));
    }

    #[test]
    fn test_set_filters_require_membership() {
        let jobs = sample_jobs(now());
        let mut criteria = Criteria::default();
        criteria.filters.urgency.insert(Urgency::Urgent);
        criteria.filters.job_type.insert(JobType::OneTime);
        criteria.filters.experience_level.insert(ExperienceLevel::Entry);
        let visible = filter_jobs(&jobs, &criteria, now());
        assert!(!visible.is_empty());
        assert!(visible.iter().all(|j| j.urgency == Urgency::Urgent
            && j.job_type == JobType::OneTime
            && j.experience_level == ExperienceLevel::Entry));
    }

    #[test]
    fn test_visible_jobs_satisfy_every_predicate() {
        let jobs = sample_jobs(now());
        let mut criteria = Criteria {
            search_query: "a".to_string(),
            ..Criteria::default()
        };
        criteria.filters.distance_km = 20.0;
        criteria.filters.price_range = PriceRange {
            min: 20.0,
            max: 60.0,
        };
        criteria.filters.date_posted = DatePosted::LastMonth;
        let visible = filter_jobs(&jobs, &criteria, now());
        for job in &visible {
            assert!(matches(job, &criteria, now()));
            assert!(job.distance_km <= 20.0);
            let rate = job.rate_value.unwrap();
            assert!((20.0..=60.0).contains(&rate));
            assert!(job.posted_at >= now() - Duration::days(30));
        }
        let rejected = jobs
            .iter()
            .filter(|j| !visible.iter().any(|v| v.id == j.id));
        for job in rejected {
            assert!(!matches(job, &criteria, now()));
        }
    }

    #[test]
    fn test_filter_is_idempotent_and_order_preserving() {
        let jobs = sample_jobs(now());
        let mut criteria = Criteria::default();
        criteria.filters.urgency.insert(Urgency::Normal);
        criteria.filters.urgency.insert(Urgency::High);
        let first = filter_jobs(&jobs, &criteria, now());
        let second = filter_jobs(&jobs, &criteria, now());
        assert_eq!(titles(&first), titles(&second));
        assert!(is_subsequence(&first, &jobs));
    }

    #[test]
    fn test_inverted_price_range_is_rejected() {
        let mut spec = FilterSpec::default();
        spec.price_range = PriceRange {
            min: 80.0,
            max: 10.0,
        };
        assert_eq!(
            spec.validate(),
            Err(CatalogError::InvertedPriceRange {
                min: 80.0,
                max: 10.0
            })
        );
    }

    #[test]
    fn test_negative_distance_is_rejected() {
        let spec = FilterSpec {
            distance_km: -1.0,
            ..FilterSpec::default()
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_date_posted_parses_ui_values() {
        assert_eq!("".parse::<DatePosted>().unwrap(), DatePosted::Any);
        assert_eq!("24h".parse::<DatePosted>().unwrap(), DatePosted::Last24Hours);
        assert_eq!("week".parse::<DatePosted>().unwrap(), DatePosted::LastWeek);
        assert_eq!("month".parse::<DatePosted>().unwrap(), DatePosted::LastMonth);
        assert!("year".parse::<DatePosted>().is_err());
    }

    #[test]
    fn test_criteria_deserializes_with_defaults() {
        let criteria: Criteria =
            serde_json::from_str(r#"{"selected_category": "All Categories"}"#).unwrap();
        assert_eq!(criteria, Criteria::default());
        let criteria: Criteria = serde_json::from_str(
            r#"{"filters": {"date_posted": "24h", "urgency": ["Urgent"]}}"#,
        )
        .unwrap();
        assert_eq!(criteria.filters.date_posted, DatePosted::Last24Hours);
        assert!(criteria.filters.urgency.contains(&Urgency::Urgent));
        assert_eq!(criteria.filters.distance_km, DEFAULT_MAX_DISTANCE_KM);
    }
}
