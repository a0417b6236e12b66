//! Capability interfaces consumed by the merge engine.
//!
//! The engine never talks to a spreadsheet, a drive or a mail server
//! directly. It is handed implementations of these traits; see
//! `crate::backends` for the local ones.

use super::context::FieldMap;
use super::error::BackendError;

/// Header row plus data rows, each row positionally aligned to the headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Reference to a document in the drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRef {
    pub id: String,
    pub name: String,
}

/// Handle of a file created in the drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub id: String,
    pub name: String,
}

/// A file fetched from the drive by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// An email draft used as the per-row message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub id: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A fully rendered message ready to be handed to the mail backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub cc: String,
    pub bcc: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<Attachment>,
}

pub trait SheetSource {
    fn read_sheet(&self) -> Result<SheetData, BackendError>;
}

pub trait DocumentBackend {
    fn document_exists(&self, document_id: &str) -> Result<bool, BackendError>;

    /// Copies the template into `folder_id` under `name`.
    fn duplicate_template(
        &self,
        template_id: &str,
        folder_id: &str,
        name: &str,
    ) -> Result<DocRef, BackendError>;

    /// Replaces `{{name}}` with the field value for every field in the body.
    fn replace_body_text(&self, document: &DocRef, fields: &FieldMap) -> Result<(), BackendError>;

    /// Renders the document to PDF.
    fn export_as_fixed_layout(&self, document: &DocRef) -> Result<Vec<u8>, BackendError>;

    /// Moves a working copy to the trash.
    fn discard(&self, document: &DocRef) -> Result<(), BackendError>;
}

pub trait FileStorage {
    fn folder_exists(&self, folder_id: &str) -> Result<bool, BackendError>;

    /// Returns `None` when the storage accepted the call but produced no file.
    fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<Option<FileRef>, BackendError>;

    fn fetch_file(&self, file_id: &str) -> Result<Option<StoredFile>, BackendError>;
}

pub trait MailBackend {
    fn list_drafts(&self) -> Result<Vec<Draft>, BackendError>;

    fn send_email(&self, email: &OutgoingEmail) -> Result<(), BackendError>;
}

pub trait Clock {
    /// The current date as `YYYY-MM-DD` in the configured time zone.
    fn today(&self) -> String;
}
