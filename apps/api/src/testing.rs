//! In-memory stand-ins for the Postgres repositories, for handler tests.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use brickhole_catalog::InMemoryCatalog;
use chrono::Utc;

use crate::auth::tokens::TokenRepository;
use crate::auth::users::{UserRepository, EMAIL_TAKEN};
use crate::config::Config;
use crate::errors::AppError;
use crate::jobs::repository::JobRepository;
use crate::jobs::storage::LocalImageStore;
use crate::models::job::{ImageRow, JobRow, JobWithImages, NewJob};
use crate::models::token::AccessTokenRow;
use crate::models::user::{NewUser, User};
use crate::state::AppState;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tokens: Vec<AccessTokenRow>,
    jobs: Vec<JobRow>,
    images: Vec<ImageRow>,
}

impl Tables {
    fn with_images(&self, job: &JobRow) -> JobWithImages {
        JobWithImages {
            job: job.clone(),
            images: self
                .images
                .iter()
                .filter(|i| i.job_id == job.id)
                .cloned()
                .collect(),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// Makes every job insert fail, as a lost database connection would.
    pub fail_job_inserts: AtomicBool,
}

impl MemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn token_hashes(&self) -> Vec<String> {
        self.tables().tokens.iter().map(|t| t.token_hash.clone()).collect()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables();
        if tables
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::field("email", EMAIL_TAKEN));
        }
        let now = Utc::now();
        let row = User {
            id: tables.users.len() as i64 + 1,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn create(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<AccessTokenRow, AppError> {
        let mut tables = self.tables();
        let row = AccessTokenRow {
            id: tables.tokens.len() as i64 + 1,
            user_id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            last_used_at: None,
            created_at: Utc::now(),
        };
        tables.tokens.push(row.clone());
        Ok(row)
    }

    async fn find(&self, id: i64) -> Result<Option<AccessTokenRow>, AppError> {
        Ok(self.tables().tokens.iter().find(|t| t.id == id).cloned())
    }

    async fn touch(&self, id: i64) -> Result<(), AppError> {
        if let Some(token) = self.tables().tokens.iter_mut().find(|t| t.id == id) {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn list_with_images(&self) -> Result<Vec<JobWithImages>, AppError> {
        let tables = self.tables();
        Ok(tables.jobs.iter().map(|j| tables.with_images(j)).collect())
    }

    async fn find_with_images(&self, id: i64) -> Result<Option<JobWithImages>, AppError> {
        let tables = self.tables();
        Ok(tables
            .jobs
            .iter()
            .find(|j| j.id == id)
            .map(|j| tables.with_images(j)))
    }

    async fn create(
        &self,
        job: &NewJob,
        user_id: i64,
        image_path: Option<&str>,
    ) -> Result<JobWithImages, AppError> {
        if self.fail_job_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("job insert failed")));
        }
        let mut tables = self.tables();
        let now = Utc::now();
        let row = JobRow {
            id: tables.jobs.len() as i64 + 1,
            title: job.title.clone(),
            category: job.category.clone(),
            description: job.description.clone(),
            location: job.location.clone(),
            address: job.address.clone(),
            date: job.date.clone(),
            time_preference: job.time_preference.clone(),
            urgency: job.urgency.clone(),
            budget: job.budget,
            contact_preference: job.contact_preference.clone(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        if let Some(path) = image_path {
            let image = ImageRow {
                id: tables.images.len() as i64 + 1,
                path: path.to_string(),
                job_id: row.id,
                created_at: now,
                updated_at: now,
            };
            tables.images.push(image);
        }
        tables.jobs.push(row.clone());
        Ok(tables.with_images(&row))
    }
}

/// State over a fresh [`MemoryStore`], storing photos under `root`.
pub fn test_state(root: &Path) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let state = AppState {
        users: store.clone(),
        tokens: store.clone(),
        jobs: store.clone(),
        images: Arc::new(LocalImageStore::new(root)),
        catalog: Arc::new(InMemoryCatalog::seeded(Utc::now())),
        config: Config::for_tests(root.to_path_buf()),
    };
    (state, store)
}
