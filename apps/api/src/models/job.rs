use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub description: String,
    pub location: String,
    pub address: String,
    pub date: String,
    pub time_preference: String,
    pub urgency: String,
    pub budget: i32,
    pub contact_preference: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ImageRow {
    pub id: i64,
    pub path: String,
    pub job_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobWithImages {
    #[serde(flatten)]
    pub job: JobRow,
    pub images: Vec<ImageRow>,
}

/// A validated job posting form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub category: String,
    pub description: String,
    pub location: String,
    pub address: String,
    pub date: String,
    pub time_preference: String,
    pub urgency: String,
    pub budget: i32,
    pub contact_preference: String,
}
