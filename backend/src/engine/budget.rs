use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancellation token with an optional deadline for one merge run.
///
/// Clones share the same cancellation flag, so a handle kept by the caller
/// can stop a run that is in progress. Rows are checked before they start;
/// a row already being processed runs to completion.
#[derive(Debug, Clone, Default)]
pub struct RunBudget {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl RunBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_time_limit(limit: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(limit),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_exhausted(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
