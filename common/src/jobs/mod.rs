use crate::model::merge::MergeReport;
use serde::{Deserialize, Serialize};

/// Lifecycle of a merge run scheduled in the background.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    Completed(MergeReport),
    Failed(String),
}
