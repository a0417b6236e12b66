use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to a single merge row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowStatus {
    /// The merged document was emailed.
    Success,
    /// The merged document was exported and stored as a PDF.
    SavedAsPdf,
    /// The row failed. Contains the reason.
    Error(String),
}

impl RowStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, RowStatus::Error(_))
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Success => write!(f, "Success"),
            RowStatus::SavedAsPdf => write!(f, "Saved as PDF"),
            RowStatus::Error(reason) => write!(f, "Error: {reason}"),
        }
    }
}

/// The outcome of processing one populated row of the sheet.
///
/// Rows are independent units of work, so an outcome never refers to
/// any other row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowOutcome {
    /// Sheet row number of the record (the header occupies row 1).
    pub row: usize,
    pub status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl RowOutcome {
    pub fn sent(row: usize, recipient: impl Into<String>) -> Self {
        Self {
            row,
            status: RowStatus::Success,
            email_sent_to: Some(recipient.into()),
            file_name: None,
        }
    }

    pub fn saved(row: usize, file_name: impl Into<String>) -> Self {
        Self {
            row,
            status: RowStatus::SavedAsPdf,
            email_sent_to: None,
            file_name: Some(file_name.into()),
        }
    }

    pub fn failed(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            status: RowStatus::Error(reason.into()),
            email_sent_to: None,
            file_name: None,
        }
    }
}

/// The result of a merge run as returned to the caller.
///
/// A rejected request carries a `message` and no rows; a completed run
/// carries one outcome per populated row, in sheet order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub success: bool,
    #[serde(default)]
    pub rows: Vec<RowOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MergeReport {
    pub fn completed(rows: Vec<RowOutcome>) -> Self {
        Self {
            success: true,
            rows,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            rows: Vec::new(),
            message: Some(message.into()),
        }
    }

    /// Number of rows that ended in an error.
    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|r| r.status.is_error()).count()
    }
}
