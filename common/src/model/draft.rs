use serde::{Deserialize, Serialize};

/// An email draft as offered to the user when picking the message to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSummary {
    pub id: String,
    pub subject: String,
}
