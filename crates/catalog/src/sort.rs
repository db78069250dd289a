use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::JobPosting;

/// "Sort by" options of the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    Newest,
    Oldest,
    PriceHigh,
    PriceLow,
}

impl FromStr for SortOrder {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "price-high" => Ok(SortOrder::PriceHigh),
            "price-low" => Ok(SortOrder::PriceLow),
            _ => Err(CatalogError::UnknownValue {
                field: "sort",
                value: s.to_string(),
            }),
        }
    }
}

/// Jobs without a rate go last in both price orders.
fn by_rate(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort; ties keep catalog order.
pub fn sort_jobs(jobs: &mut [&JobPosting], order: SortOrder) {
    match order {
        SortOrder::Newest => jobs.sort_by(|a, b| b.posted_at.cmp(&a.posted_at)),
        SortOrder::Oldest => jobs.sort_by(|a, b| a.posted_at.cmp(&b.posted_at)),
        SortOrder::PriceHigh => jobs.sort_by(|a, b| by_rate(a.rate_value, b.rate_value, true)),
        SortOrder::PriceLow => jobs.sort_by(|a, b| by_rate(a.rate_value, b.rate_value, false)),
    }
}
