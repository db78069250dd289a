use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Pill label meaning "no concrete category selected".
pub const ALL_CATEGORIES: &str = "All Categories";

/// Category pills shown above the listing, in display order.
pub const CATEGORIES: &[(&str, &str)] = &[
    ("Plumbing", "🔧"),
    ("Electrical", "⚡"),
    ("Carpentry", "🔨"),
    ("Painting", "🎨"),
    ("Cleaning", "🧹"),
    ("Gardening", "🌱"),
    ("Moving", "📦"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "One-time")]
    OneTime,
    Recurring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "Entry Level", alias = "Entry")]
    Entry,
    Intermediate,
    Expert,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Normal => "Normal",
            Urgency::High => "High",
            Urgency::Urgent => "Urgent",
        }
    }
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::OneTime => "One-time",
            JobType::Recurring => "Recurring",
        }
    }
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry Level",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Expert => "Expert",
        }
    }
}

impl FromStr for Urgency {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Urgency::Normal),
            "high" => Ok(Urgency::High),
            "urgent" => Ok(Urgency::Urgent),
            _ => Err(CatalogError::UnknownValue {
                field: "urgency",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for JobType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one-time" | "one_time" | "onetime" => Ok(JobType::OneTime),
            "recurring" => Ok(JobType::Recurring),
            _ => Err(CatalogError::UnknownValue {
                field: "job_type",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" | "entry level" | "entry-level" => Ok(ExperienceLevel::Entry),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "expert" => Ok(ExperienceLevel::Expert),
            _ => Err(CatalogError::UnknownValue {
                field: "experience_level",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job as shown on the marketplace listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: u32,
    pub title: String,
    pub category: String,
    pub location: String,
    /// Display text, e.g. `€40/hr`.
    pub rate: String,
    /// Numeric rate used by the price filter. `None` when `rate` has no number in it.
    pub rate_value: Option<f64>,
    pub description: String,
    pub posted_by: String,
    pub posted_at: DateTime<Utc>,
    pub urgency: Urgency,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub distance_km: f64,
    pub rating: f32,
    pub reviews: u32,
}

/// Extracts the first number of a display rate (`€40/hr` → 40, `$80 - $120` → 80).
pub fn parse_rate_value(rate: &str) -> Option<f64> {
    let start = rate.find(|c: char| c.is_ascii_digit())?;
    let digits: String = rate[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    digits.trim_end_matches('.').parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate_value_hourly() {
        assert_eq!(parse_rate_value("€40/hr"), Some(40.0));
    }

    #[test]
    fn test_parse_rate_value_takes_lower_bound_of_range() {
        assert_eq!(parse_rate_value("$80 - $120"), Some(80.0));
    }

    #[test]
    fn test_parse_rate_value_decimal_and_thousands() {
        assert_eq!(parse_rate_value("€1,250.50 flat"), Some(1250.5));
    }

    #[test]
    fn test_parse_rate_value_without_digits_is_none() {
        assert_eq!(parse_rate_value("Negotiable"), None);
        assert_eq!(parse_rate_value(""), None);
    }

    #[test]
    fn test_enum_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&JobType::OneTime).unwrap();
        assert_eq!(json, "\"One-time\"");
        let level: ExperienceLevel = serde_json::from_str("\"Entry\"").unwrap();
        assert_eq!(level, ExperienceLevel::Entry);
        assert_eq!(
            serde_json::to_string(&ExperienceLevel::Entry).unwrap(),
            "\"Entry Level\""
        );
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("URGENT".parse::<Urgency>().unwrap(), Urgency::Urgent);
        assert_eq!("one-time".parse::<JobType>().unwrap(), JobType::OneTime);
        assert_eq!(
            "Entry Level".parse::<ExperienceLevel>().unwrap(),
            ExperienceLevel::Entry
        );
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "asap".parse::<Urgency>().unwrap_err();
        assert!(err.to_string().contains("asap"));
    }
}
