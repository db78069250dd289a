use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::job::{ImageRow, JobRow, JobWithImages, NewJob};

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// All jobs, oldest first, each with its images.
    async fn list_with_images(&self) -> Result<Vec<JobWithImages>, AppError>;

    async fn find_with_images(&self, id: i64) -> Result<Option<JobWithImages>, AppError>;

    /// Inserts the job and, when given, one image row pointing at `image_path`.
    async fn create(
        &self,
        job: &NewJob,
        user_id: i64,
        image_path: Option<&str>,
    ) -> Result<JobWithImages, AppError>;
}

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        PgJobRepository { pool }
    }

    async fn images_for(&self, job_ids: &[i64]) -> Result<HashMap<i64, Vec<ImageRow>>, AppError> {
        let rows = sqlx::query_as::<_, ImageRow>(
            "SELECT * FROM images WHERE job_id = ANY($1) ORDER BY id",
        )
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_job: HashMap<i64, Vec<ImageRow>> = HashMap::new();
        for row in rows {
            by_job.entry(row.job_id).or_default().push(row);
        }
        Ok(by_job)
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn list_with_images(&self) -> Result<Vec<JobWithImages>, AppError> {
        let jobs = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let ids: Vec<i64> = jobs.iter().map(|j| j.id).collect();
        let mut images = self.images_for(&ids).await?;

        Ok(jobs
            .into_iter()
            .map(|job| JobWithImages {
                images: images.remove(&job.id).unwrap_or_default(),
                job,
            })
            .collect())
    }

    async fn find_with_images(&self, id: i64) -> Result<Option<JobWithImages>, AppError> {
        let Some(job) = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let images = self.images_for(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(Some(JobWithImages { job, images }))
    }

    async fn create(
        &self,
        job: &NewJob,
        user_id: i64,
        image_path: Option<&str>,
    ) -> Result<JobWithImages, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO jobs
                (title, category, description, location, address, date,
                 time_preference, urgency, budget, contact_preference, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&job.title)
        .bind(&job.category)
        .bind(&job.description)
        .bind(&job.location)
        .bind(&job.address)
        .bind(&job.date)
        .bind(&job.time_preference)
        .bind(&job.urgency)
        .bind(job.budget)
        .bind(&job.contact_preference)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut images = Vec::new();
        if let Some(path) = image_path {
            let image = sqlx::query_as::<_, ImageRow>(
                "INSERT INTO images (path, job_id) VALUES ($1, $2) RETURNING *",
            )
            .bind(path)
            .bind(row.id)
            .fetch_one(&mut *tx)
            .await?;
            images.push(image);
        }

        tx.commit().await?;
        info!("Created job {} for user {user_id} with {} image(s)", row.id, images.len());

        Ok(JobWithImages { job: row, images })
    }
}
