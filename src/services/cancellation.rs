//! Cancellation registry for import jobs
//!
//! Provides cooperative cancellation and RAII-based automatic cleanup via
//! `JobGuard`.

use std::collections::HashMap;
use std::sync::Arc;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Global registry of running import jobs
pub static IMPORT_JOBS: Lazy<CancellationRegistry> = Lazy::new(CancellationRegistry::default);

/// Internal entry tracking a job's cancellation token and what it is working on
struct JobEntry {
    token: CancellationToken,
    label: String,
}

/// RAII guard that automatically removes the job from the registry when dropped.
/// Must be kept alive for the duration of job processing.
pub struct JobGuard {
    job_id: Uuid,
    token: CancellationToken,
    registry: CancellationRegistry,
}

impl JobGuard {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Token to check between units of work
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.job_id);
    }
}

/// Thread-safe registry of active jobs and their cancellation tokens.
#[derive(Clone, Default)]
pub struct CancellationRegistry {
    jobs: Arc<Mutex<HashMap<Uuid, JobEntry>>>,
}

impl CancellationRegistry {
    /// Register a new job. Returns a `JobGuard` that must be held in scope
    /// during processing; dropping it removes the job from the registry.
    pub fn register(&self, label: impl Into<String>) -> JobGuard {
        let job_id = Uuid::new_v4();
        let token = CancellationToken::new();
        self.jobs.lock().insert(job_id, JobEntry {
            token: token.clone(),
            label: label.into(),
        });
        JobGuard {
            job_id,
            token,
            registry: self.clone(),
        }
    }

    /// Cancel every registered job, returning the id and label of each one
    pub fn cancel_all(&self) -> Vec<(Uuid, String)> {
        self.jobs
            .lock()
            .iter()
            .map(|(id, entry)| {
                entry.token.cancel();
                (*id, entry.label.clone())
            })
            .collect()
    }

    fn remove(&self, job_id: &Uuid) {
        self.jobs.lock().remove(job_id);
    }

    /// Check if a job is currently registered (for testing)
    #[cfg(test)]
    fn contains(&self, job_id: &Uuid) -> bool {
        self.jobs.lock().contains_key(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: create a fresh registry for each test (avoids global state interference)
    fn new_registry() -> CancellationRegistry {
        CancellationRegistry::default()
    }

    #[test]
    fn test_registered_job_starts_uncancelled() {
        let reg = new_registry();
        let guard = reg.register("deliveries.csv");

        assert!(reg.contains(&guard.job_id()));
        assert!(!guard.token().is_cancelled());
    }

    #[test]
    fn test_cancel_all_signals_every_job_and_names_it() {
        let reg = new_registry();
        let first = reg.register("a.csv");
        let second = reg.register("b.csv");

        let mut cancelled = reg.cancel_all();
        cancelled.sort_by(|a, b| a.1.cmp(&b.1));

        assert_eq!(
            cancelled,
            vec![
                (first.job_id(), "a.csv".to_string()),
                (second.job_id(), "b.csv".to_string()),
            ]
        );
        assert!(first.token().is_cancelled());
        assert!(second.token().is_cancelled());
    }

    #[test]
    fn test_cancel_all_on_empty_registry() {
        assert!(new_registry().cancel_all().is_empty());
    }

    #[test]
    fn test_guard_drop_removes_from_registry() {
        let reg = new_registry();
        let job_id = {
            let guard = reg.register("deliveries.csv");
            assert!(reg.contains(&guard.job_id()));
            guard.job_id()
        }; // guard dropped here

        assert!(!reg.contains(&job_id));
        assert!(reg.cancel_all().is_empty());
    }

    #[test]
    fn test_finished_job_is_not_cancelled_later() {
        let reg = new_registry();
        let finished = reg.register("old.csv");
        let token = finished.token().clone();
        drop(finished);

        let running = reg.register("new.csv");
        let cancelled = reg.cancel_all();

        assert_eq!(cancelled, vec![(running.job_id(), "new.csv".to_string())]);
        assert!(!token.is_cancelled());
    }
}
