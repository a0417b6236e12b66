//! In-memory fakes of the capability backends.

#![allow(dead_code)]

use common::requests::{MergeAction, MergeRequest};
use docmerge::engine::context::FieldMap;
use docmerge::engine::placeholder::substitute_fields;
use docmerge::engine::ports::{
    Clock, DocRef, DocumentBackend, Draft, FileRef, FileStorage, MailBackend, OutgoingEmail,
    SheetData, SheetSource, StoredFile,
};
use docmerge::engine::{BackendError, Backends, FixedQuota, MergeEngine, MergeOptions};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub const TEMPLATE_ID: &str = "TEMPLATE_0123456789";
pub const FOLDER_ID: &str = "FOLDER_0123456789";
pub const DRAFT_ID: &str = "r-draft-1";
pub const TODAY: &str = "2024-05-01";

pub fn template_link() -> String {
    format!("https://docs.google.com/document/d/{TEMPLATE_ID}/edit")
}

pub fn folder_link() -> String {
    format!("https://drive.google.com/drive/folders/{FOLDER_ID}")
}

pub fn save_request(filename_format: &str) -> MergeRequest {
    MergeRequest {
        action: Some(MergeAction::Save),
        template_link: template_link(),
        folder_link: folder_link(),
        filename_format: filename_format.to_string(),
        ..MergeRequest::default()
    }
}

pub fn email_request(filename_format: &str, email_field: &str) -> MergeRequest {
    MergeRequest {
        action: Some(MergeAction::Email),
        email_draft_id: Some(DRAFT_ID.to_string()),
        email_field: Some(email_field.to_string()),
        ..save_request(filename_format)
    }
}

pub fn sheet(headers: &[&str], rows: &[&[&str]]) -> SheetData {
    SheetData {
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows: rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    }
}

pub struct FakeSheet(pub SheetData);

impl SheetSource for FakeSheet {
    fn read_sheet(&self) -> Result<SheetData, BackendError> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedFile {
    pub folder_id: String,
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct FakeDrive {
    pub templates: HashMap<String, String>,
    pub folders: Vec<String>,
    pub stored: HashMap<String, StoredFile>,
    /// Working copies by id: (name, text).
    pub copies: RefCell<HashMap<String, (String, String)>>,
    pub copy_order: RefCell<Vec<String>>,
    pub created: RefCell<Vec<CreatedFile>>,
    pub discarded: RefCell<Vec<String>>,
    /// Duplicating under this name fails.
    pub fail_duplicate_named: Option<String>,
    /// `create_file` reports success without a file.
    pub create_yields_nothing: bool,
    next_id: Cell<usize>,
}

impl FakeDrive {
    pub fn with_template(text: &str) -> Self {
        let mut drive = Self::default();
        drive.templates.insert(TEMPLATE_ID.to_string(), text.to_string());
        drive.folders.push(FOLDER_ID.to_string());
        drive
    }

    pub fn store(&mut self, id: &str, name: &str, bytes: &[u8]) {
        self.stored.insert(
            id.to_string(),
            StoredFile {
                id: id.to_string(),
                name: name.to_string(),
                content_type: "application/octet-stream".to_string(),
                bytes: bytes.to_vec(),
            },
        );
    }

    pub fn copy_text(&self, name: &str) -> Option<String> {
        self.copies
            .borrow()
            .values()
            .find(|(n, _)| n == name)
            .map(|(_, text)| text.clone())
    }

    pub fn copy_names(&self) -> Vec<String> {
        let copies = self.copies.borrow();
        self.copy_order
            .borrow()
            .iter()
            .map(|id| copies[id].0.clone())
            .collect()
    }
}

impl DocumentBackend for FakeDrive {
    fn document_exists(&self, document_id: &str) -> Result<bool, BackendError> {
        Ok(self.templates.contains_key(document_id))
    }

    fn duplicate_template(
        &self,
        template_id: &str,
        folder_id: &str,
        name: &str,
    ) -> Result<DocRef, BackendError> {
        if self.fail_duplicate_named.as_deref() == Some(name) {
            return Err(BackendError::Message(format!("copy of {name} rejected")));
        }
        let text = self
            .templates
            .get(template_id)
            .ok_or_else(|| BackendError::NotFound(template_id.to_string()))?;
        assert!(self.folders.iter().any(|f| f == folder_id));
        let id = format!("copy-{}", self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.copies
            .borrow_mut()
            .insert(id.clone(), (name.to_string(), text.clone()));
        self.copy_order.borrow_mut().push(id.clone());
        Ok(DocRef {
            id,
            name: name.to_string(),
        })
    }

    fn replace_body_text(&self, document: &DocRef, fields: &FieldMap) -> Result<(), BackendError> {
        let mut copies = self.copies.borrow_mut();
        let entry = copies
            .get_mut(&document.id)
            .ok_or_else(|| BackendError::NotFound(document.id.clone()))?;
        entry.1 = substitute_fields(&entry.1, fields);
        Ok(())
    }

    fn export_as_fixed_layout(&self, document: &DocRef) -> Result<Vec<u8>, BackendError> {
        let copies = self.copies.borrow();
        let (_, text) = copies
            .get(&document.id)
            .ok_or_else(|| BackendError::NotFound(document.id.clone()))?;
        Ok(format!("%PDF {text}").into_bytes())
    }

    fn discard(&self, document: &DocRef) -> Result<(), BackendError> {
        self.discarded.borrow_mut().push(document.id.clone());
        Ok(())
    }
}

impl FileStorage for FakeDrive {
    fn folder_exists(&self, folder_id: &str) -> Result<bool, BackendError> {
        Ok(self.folders.iter().any(|f| f == folder_id))
    }

    fn create_file(
        &self,
        folder_id: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<Option<FileRef>, BackendError> {
        if self.create_yields_nothing {
            return Ok(None);
        }
        let mut created = self.created.borrow_mut();
        created.push(CreatedFile {
            folder_id: folder_id.to_string(),
            name: name.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(Some(FileRef {
            id: format!("file-{}", created.len()),
            name: name.to_string(),
        }))
    }

    fn fetch_file(&self, file_id: &str) -> Result<Option<StoredFile>, BackendError> {
        Ok(self.stored.get(file_id).cloned())
    }
}

#[derive(Default)]
pub struct FakeMail {
    pub drafts: Vec<Draft>,
    pub sent: RefCell<Vec<OutgoingEmail>>,
}

impl FakeMail {
    pub fn with_draft(subject: &str, body: &str) -> Self {
        Self {
            drafts: vec![Draft {
                id: DRAFT_ID.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            }],
            sent: RefCell::default(),
        }
    }
}

impl MailBackend for FakeMail {
    fn list_drafts(&self) -> Result<Vec<Draft>, BackendError> {
        Ok(self.drafts.clone())
    }

    fn send_email(&self, email: &OutgoingEmail) -> Result<(), BackendError> {
        self.sent.borrow_mut().push(email.clone());
        Ok(())
    }
}

pub struct FixedClock;

impl Clock for FixedClock {
    fn today(&self) -> String {
        TODAY.to_string()
    }
}

pub struct Fixture {
    pub sheet: FakeSheet,
    pub drive: FakeDrive,
    pub mail: FakeMail,
    pub quota: FixedQuota,
    pub options: MergeOptions,
}

impl Fixture {
    pub fn new(sheet: SheetData, drive: FakeDrive, mail: FakeMail) -> Self {
        Self {
            sheet: FakeSheet(sheet),
            drive,
            mail,
            quota: FixedQuota::default(),
            options: MergeOptions::default(),
        }
    }

    pub fn engine(&self) -> MergeEngine<'_> {
        MergeEngine::new(
            Backends {
                sheet: &self.sheet,
                documents: &self.drive,
                files: &self.drive,
                mail: &self.mail,
                quota: &self.quota,
                clock: &FixedClock,
            },
            self.options.clone(),
        )
    }
}
