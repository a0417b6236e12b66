//! Shared state of merge runs executed in the background.
//!
//! `POST /api/merge/start` registers a job and returns its id right away;
//! the run itself happens on a blocking worker and records its final
//! `JobStatus` here, where `GET /api/merge/status/{job_id}` reads it.
//!
//! Only one merge runs at a time: a run holds the guard returned by
//! [`JobsState::try_begin_run`] until it finishes.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

/// Held for the whole duration of a merge run.
pub type RunGuard = OwnedMutexGuard<()>;

/// Clonable handle to the status of every job, injected as `web::Data`.
#[derive(Clone, Default)]
pub struct JobsState {
    jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
    active_run: Arc<Mutex<()>>,
}

impl JobsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new job as `Pending` and returns its id.
    pub async fn register(&self) -> String {
        let job_id = Uuid::new_v4().to_string();
        self.jobs
            .write()
            .await
            .insert(job_id.clone(), JobStatus::Pending);
        job_id
    }

    pub async fn update(&self, job_id: &str, status: JobStatus) {
        self.jobs.write().await.insert(job_id.to_string(), status);
    }

    /// Current status of a job. A finished job is reported once and then
    /// forgotten.
    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        let mut jobs = self.jobs.write().await;
        let finished = matches!(
            jobs.get(job_id)?,
            JobStatus::Completed(_) | JobStatus::Failed(_)
        );
        if finished {
            jobs.remove(job_id)
        } else {
            jobs.get(job_id).cloned()
        }
    }

    /// Claims the single run slot, or `None` while another run holds it.
    pub fn try_begin_run(&self) -> Option<RunGuard> {
        self.active_run.clone().try_lock_owned().ok()
    }
}
