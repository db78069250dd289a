//! Axum route handlers for posted jobs.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::session::AuthUser;
use crate::errors::AppError;
use crate::jobs::form::{JobForm, PHOTO_FIELD};
use crate::jobs::storage::accept_photo;
use crate::models::job::JobWithImages;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobWithImages>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job: JobWithImages,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<JobListResponse>, AppError> {
    let jobs = state.jobs.list_with_images().await?;
    Ok(Json(JobListResponse { jobs }))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<JobResponse>, AppError> {
    let job = state
        .jobs
        .find_with_images(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(JobResponse { job }))
}

/// POST /api/jobs
///
/// Multipart form with the job fields and an optional `photos` file. The photo
/// is stored before the rows are written and removed again if the insert fails.
pub async fn handle_add_job(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<Json<JobResponse>, AppError> {
    let form = JobForm::from_multipart(multipart).await?;
    let new_job = form.to_new_job()?;

    let photo = match form.photo {
        Some(file) => Some(
            accept_photo(&file.file_name, file.bytes, state.config.max_upload_bytes)
                .map_err(|rejection| AppError::field(PHOTO_FIELD, rejection.message()))?,
        ),
        None => None,
    };

    if let Some(photo) = &photo {
        state
            .images
            .put(&photo.path, photo.bytes.clone(), photo.content_type)
            .await?;
    }
    let image_path = photo.as_ref().map(|p| p.path.as_str());

    let job = match state.jobs.create(&new_job, user.id, image_path).await {
        Ok(job) => job,
        Err(e) => {
            if let Some(path) = image_path {
                if let Err(cleanup) = state.images.delete(path).await {
                    warn!("Failed to remove orphaned photo {path}: {cleanup}");
                }
            }
            return Err(e);
        }
    };

    info!("User {} posted job {}", user.id, job.job.id);
    Ok(Json(JobResponse { job }))
}
