use serde::{Deserialize, Serialize};

/// What to do with each merged document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeAction {
    /// Send the document as a PDF attachment of a per-row email.
    Email,
    /// Export the document to PDF and store it next to the working copy.
    Save,
}

/// Options collected from the user for one merge run.
///
/// The request is taken as entered: links are not yet resolved to
/// identifiers and column labels are still spreadsheet letters. The
/// backend validates it before touching any row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeRequest {
    pub action: Option<MergeAction>,
    /// Link to the template document.
    pub template_link: String,
    /// Link to the destination folder.
    pub folder_link: String,
    pub email_draft_id: Option<String>,
    pub test_mode: bool,
    pub test_email: Option<String>,
    /// Column letter holding the recipient address.
    pub email_field: Option<String>,
    pub cc_field: Option<String>,
    pub bcc_field: Option<String>,
    /// Column letter holding comma-separated attachment links.
    pub attachments_field: Option<String>,
    /// File name pattern, e.g. `Invoice {{Number}} - {{today's date}}`.
    pub filename_format: String,
}
