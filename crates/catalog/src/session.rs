//! Stateful filter panel: the mutations a listing view applies to its
//! criteria, with the free-text location field debounced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::CatalogError;
use crate::filter::{filter_jobs, CategorySelection, Criteria, DatePosted, PriceRange};
use crate::model::{ExperienceLevel, JobPosting, JobType, Urgency};

/// Quiet period after the last keystroke before the location filter applies.
pub const LOCATION_DEBOUNCE: Duration = Duration::from_millis(500);

/// The published value plus a generation bumped by every immediate write.
/// Both are only touched under the watch lock.
struct Shared<T> {
    value: watch::Sender<T>,
    generation: AtomicU64,
}

impl<T: PartialEq> Shared<T> {
    /// Publishes a debounced value unless an immediate write superseded it.
    fn publish(&self, value: T, generation: u64) {
        self.value.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation || *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    fn replace(&self, value: T) {
        self.value.send_if_modified(|current| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}

/// Publishes the last pushed value once no new value arrived for `delay`.
///
/// Each push inside the window cancels the pending publish and restarts the
/// timer. Dropping the debouncer discards any pending value.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<(T, u64)>,
    shared: Arc<Shared<T>>,
    task: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Fails with [`CatalogError::NoRuntime`] outside a tokio runtime.
    pub fn spawn(initial: T, delay: Duration) -> Result<Self, CatalogError> {
        let handle = Handle::try_current().map_err(|_| CatalogError::NoRuntime)?;
        let (input, mut rx) = mpsc::unbounded_channel::<(T, u64)>();
        let (value, _) = watch::channel(initial);
        let shared = Arc::new(Shared {
            value,
            generation: AtomicU64::new(0),
        });

        let worker = Arc::clone(&shared);
        let task = handle.spawn(async move {
            let mut pending: Option<(T, u64)> = None;
            loop {
                let next = match pending.take() {
                    None => rx.recv().await,
                    Some((value, generation)) => {
                        tokio::select! {
                            next = rx.recv() => next,
                            _ = tokio::time::sleep(delay) => {
                                worker.publish(value, generation);
                                continue;
                            }
                        }
                    }
                };
                match next {
                    Some(entry) => pending = Some(entry),
                    None => break,
                }
            }
        });

        Ok(Debouncer {
            input,
            shared,
            task,
        })
    }

    pub fn push(&self, value: T) {
        let generation = self.shared.generation.load(Ordering::SeqCst);
        if self.input.send((value, generation)).is_err() {
            debug!("Debouncer task has stopped, dropping pushed value");
        }
    }

    /// Publishes `value` before returning, cancelling anything pending.
    pub fn set_now(&self, value: T) {
        self.shared.replace(value);
    }

    pub fn current(&self) -> T {
        self.shared.value.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.shared.value.subscribe()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Filter panel state for one viewer.
pub struct FilterSession {
    criteria: Criteria,
    location: Debouncer<String>,
}

impl FilterSession {
    /// Fails with [`CatalogError::NoRuntime`] outside a tokio runtime.
    pub fn new() -> Result<Self, CatalogError> {
        FilterSession::with_debounce(LOCATION_DEBOUNCE)
    }

    pub fn with_debounce(delay: Duration) -> Result<Self, CatalogError> {
        Ok(FilterSession {
            criteria: Criteria::default(),
            location: Debouncer::spawn(String::new(), delay)?,
        })
    }

    /// The effective criteria, with the last settled location text.
    pub fn criteria(&self) -> Criteria {
        let mut criteria = self.criteria.clone();
        criteria.filters.location = self.location.current();
        criteria
    }

    pub fn visible<'a>(&self, jobs: &'a [JobPosting], now: DateTime<Utc>) -> Vec<&'a JobPosting> {
        filter_jobs(jobs, &self.criteria(), now)
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.criteria.search_query = query.into();
    }

    /// Pill selection. A concrete pill clears the panel's category checkboxes.
    pub fn select_category(&mut self, name: &str) {
        let selection = CategorySelection::from(name);
        if selection != CategorySelection::All {
            self.criteria.filters.categories.clear();
        }
        self.criteria.selected_category = selection;
    }

    /// Panel checkbox. Checking a category releases the pill selection.
    pub fn toggle_category(&mut self, name: &str, checked: bool) {
        if checked {
            self.criteria.selected_category = CategorySelection::All;
            self.criteria.filters.categories.insert(name.to_string());
        } else {
            self.criteria.filters.categories.remove(name);
        }
    }

    /// Keystroke in the location box; applied after the debounce window.
    pub fn set_location_input(&self, text: impl Into<String>) {
        self.location.push(text.into());
    }

    pub fn set_distance(&mut self, km: f64) {
        self.criteria.filters.distance_km = km;
    }

    pub fn set_price_range(&mut self, range: PriceRange) {
        self.criteria.filters.price_range = range;
    }

    pub fn toggle_urgency(&mut self, urgency: Urgency, checked: bool) {
        toggle(&mut self.criteria.filters.urgency, urgency, checked);
    }

    pub fn set_date_posted(&mut self, date_posted: DatePosted) {
        self.criteria.filters.date_posted = date_posted;
    }

    pub fn toggle_job_type(&mut self, job_type: JobType, checked: bool) {
        toggle(&mut self.criteria.filters.job_type, job_type, checked);
    }

    pub fn toggle_experience_level(&mut self, level: ExperienceLevel, checked: bool) {
        toggle(&mut self.criteria.filters.experience_level, level, checked);
    }

    /// "Reset All": every field back to default, location included, before returning.
    pub fn reset(&mut self) {
        self.criteria = Criteria::default();
        self.location.set_now(String::new());
    }
}

fn toggle<T: Ord>(set: &mut std::collections::BTreeSet<T>, value: T, checked: bool) {
    if checked {
        set.insert(value);
    } else {
        set.remove(&value);
    }
}
