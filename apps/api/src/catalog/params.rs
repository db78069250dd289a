//! Query-string form of the listing criteria.
//!
//! Multi-valued filters are comma separated:
//! `?urgency=high,urgent&job_type=recurring`.

use std::collections::BTreeSet;
use std::str::FromStr;

use brickhole_catalog::repository::DEFAULT_PER_PAGE;
use brickhole_catalog::{
    CatalogError, CatalogQuery, CategorySelection, Criteria, DatePosted, FilterSpec, PageRequest,
    PriceRange, SortOrder,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    pub search: Option<String>,
    /// The category pill.
    pub category: Option<String>,
    /// The category checkboxes of the filter panel.
    pub categories: Option<String>,
    pub location: Option<String>,
    pub distance: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub urgency: Option<String>,
    pub date_posted: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_set<T>(raw: Option<&str>) -> Result<BTreeSet<T>, CatalogError>
where
    T: FromStr<Err = CatalogError> + Ord,
{
    split_list(raw).map(|s| s.parse::<T>()).collect()
}

impl CatalogParams {
    /// Missing parameters take the filter panel's defaults.
    pub fn into_query(self) -> Result<CatalogQuery, CatalogError> {
        let defaults = FilterSpec::default();

        let filters = FilterSpec {
            categories: split_list(self.categories.as_deref())
                .map(str::to_string)
                .collect(),
            location: self.location.unwrap_or_default(),
            distance_km: self.distance.unwrap_or(defaults.distance_km),
            price_range: PriceRange {
                min: self.min_price.unwrap_or(defaults.price_range.min),
                max: self.max_price.unwrap_or(defaults.price_range.max),
            },
            urgency: parse_set(self.urgency.as_deref())?,
            date_posted: match self.date_posted.as_deref() {
                Some(raw) => raw.parse()?,
                None => DatePosted::Any,
            },
            job_type: parse_set(self.job_type.as_deref())?,
            experience_level: parse_set(self.experience_level.as_deref())?,
        };

        let criteria = Criteria {
            search_query: self.search.unwrap_or_default(),
            selected_category: CategorySelection::from(self.category.unwrap_or_default()),
            filters,
        };
        criteria.validate()?;

        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<SortOrder>()?),
        };

        Ok(CatalogQuery {
            criteria,
            sort,
            page: PageRequest::new(
                self.page.unwrap_or(1),
                self.per_page.unwrap_or(DEFAULT_PER_PAGE),
            )?,
        })
    }
}
