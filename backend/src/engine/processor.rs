//! # Row Merge Processor
//!
//! Turns one populated row into one outcome:
//!
//! 1. render the file name pattern against the row and sanitize it;
//! 2. duplicate the template into the destination folder under that name;
//! 3. replace every `{{header}}` in the copy's body;
//! 4. email the copy as a PDF attachment, or store its PDF export.
//!
//! Any failure along the way becomes an error outcome for this row only.

use super::context::RowContext;
use super::coordinator::Backends;
use super::error::{BackendError, RowError};
use super::identifiers::extract_file_id;
use super::placeholder::{render_fields, sanitize_file_name, substitute_fields};
use super::ports::{Attachment, DocRef, Draft, OutgoingEmail};
use common::model::merge::RowOutcome;
use common::requests::MergeAction;
use log::{debug, info, warn};

/// A validated merge request with every link and column resolved.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub action: MergeAction,
    pub template_id: String,
    pub folder_id: String,
    pub filename_format: String,
    /// Present for the email action.
    pub draft: Option<Draft>,
    /// Recipient override for the first processed row.
    pub test_email: Option<String>,
    pub email_column: Option<usize>,
    pub cc_column: Option<usize>,
    pub bcc_column: Option<usize>,
    pub attachments_column: Option<usize>,
    pub retain_working_copies: bool,
}

struct Recipients {
    to: String,
    cc: String,
    bcc: String,
}

pub struct RowProcessor<'a> {
    plan: &'a MergePlan,
    backends: &'a Backends<'a>,
    today: &'a str,
}

impl<'a> RowProcessor<'a> {
    pub fn new(plan: &'a MergePlan, backends: &'a Backends<'a>, today: &'a str) -> Self {
        Self {
            plan,
            backends,
            today,
        }
    }

    /// Processes a row. `first` marks the first row of the run, which is
    /// the one redirected to the test address in test mode.
    pub fn process(&self, row: &RowContext, first: bool) -> RowOutcome {
        match self.try_process(row, first) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Error in Row {}: {}", row.row_number, e);
                RowOutcome::failed(row.row_number, e.to_string())
            }
        }
    }

    fn try_process(&self, row: &RowContext, first: bool) -> Result<RowOutcome, RowError> {
        let rendered = render_fields(&self.plan.filename_format, &row.fields, self.today)?;
        let file_name = sanitize_file_name(&rendered);
        info!("Processing Row {}: Filename - {}.pdf", row.row_number, file_name);

        let documents = self.backends.documents;
        let copy =
            documents.duplicate_template(&self.plan.template_id, &self.plan.folder_id, &file_name)?;

        let result = self.fill_and_dispatch(row, &copy, &file_name, first);

        if !self.plan.retain_working_copies {
            if let Err(e) = documents.discard(&copy) {
                warn!("Could not discard working copy {} for Row {}: {}", copy.id, row.row_number, e);
            }
        }
        result
    }

    fn fill_and_dispatch(
        &self,
        row: &RowContext,
        copy: &DocRef,
        file_name: &str,
        first: bool,
    ) -> Result<RowOutcome, RowError> {
        self.backends.documents.replace_body_text(copy, &row.fields)?;
        info!("Completed placeholder replacement for Row {}", row.row_number);

        match self.plan.action {
            MergeAction::Email => self.send(row, copy, file_name, first),
            MergeAction::Save => self.save(row, copy, file_name),
        }
    }

    fn recipients(&self, row: &RowContext, first: bool) -> Recipients {
        if first {
            if let Some(test_email) = &self.plan.test_email {
                return Recipients {
                    to: test_email.trim().to_string(),
                    cc: String::new(),
                    bcc: String::new(),
                };
            }
        }
        let cell = |column: Option<usize>| column.map(|i| row.cell(i)).unwrap_or("").to_string();
        Recipients {
            to: cell(self.plan.email_column),
            cc: cell(self.plan.cc_column),
            bcc: cell(self.plan.bcc_column),
        }
    }

    fn send(
        &self,
        row: &RowContext,
        copy: &DocRef,
        file_name: &str,
        first: bool,
    ) -> Result<RowOutcome, RowError> {
        let recipients = self.recipients(row, first);
        if recipients.to.is_empty() {
            info!("Missing email address for Row {}", row.row_number);
            return Err(RowError::MissingRecipient);
        }

        let draft = self
            .plan
            .draft
            .as_ref()
            .ok_or_else(|| BackendError::NotFound("email draft".to_string()))?;
        let subject = substitute_fields(&draft.subject, &row.fields);
        let html_body = substitute_fields(&draft.body, &row.fields);

        let mut attachments = self.linked_attachments(row);
        let pdf = self.backends.documents.export_as_fixed_layout(copy)?;
        attachments.push(Attachment {
            file_name: format!("{file_name}.pdf"),
            content_type: "application/pdf".to_string(),
            bytes: pdf,
        });

        self.backends.mail.send_email(&OutgoingEmail {
            to: recipients.to.clone(),
            cc: recipients.cc,
            bcc: recipients.bcc,
            subject,
            html_body,
            attachments,
        })?;
        info!("Email sent to {} for Row {}", recipients.to, row.row_number);

        Ok(RowOutcome::sent(row.row_number, recipients.to))
    }

    /// Files linked from the attachments column. Links that do not resolve
    /// to a stored file are skipped.
    fn linked_attachments(&self, row: &RowContext) -> Vec<Attachment> {
        let Some(column) = self.plan.attachments_column else {
            return Vec::new();
        };
        let mut attachments = Vec::new();
        for link in row.cell(column).split(',').map(str::trim).filter(|l| !l.is_empty()) {
            let Some(file_id) = extract_file_id(link) else {
                debug!("Row {}: no file id in attachment link {}", row.row_number, link);
                continue;
            };
            match self.backends.files.fetch_file(file_id) {
                Ok(Some(file)) => attachments.push(Attachment {
                    file_name: file.name,
                    content_type: file.content_type,
                    bytes: file.bytes,
                }),
                Ok(None) => debug!("Row {}: attachment {} not found", row.row_number, file_id),
                Err(e) => warn!("Row {}: attachment {} skipped: {}", row.row_number, file_id, e),
            }
        }
        attachments
    }

    fn save(&self, row: &RowContext, copy: &DocRef, name: &str) -> Result<RowOutcome, RowError> {
        info!("Exporting PDF for Row {}", row.row_number);
        let pdf = self.backends.documents.export_as_fixed_layout(copy)?;
        info!("PDF size for Row {}: {} bytes", row.row_number, pdf.len());

        let file_name = format!("{name}.pdf");
        match self
            .backends
            .files
            .create_file(&self.plan.folder_id, &file_name, &pdf)?
        {
            Some(file) if !file.id.is_empty() => {
                info!(
                    "Successfully saved PDF: {} (ID: {}) for Row {}",
                    file.name, file.id, row.row_number
                );
                Ok(RowOutcome::saved(row.row_number, file_name))
            }
            _ => {
                warn!("Failed to save PDF for Row {}", row.row_number);
                Err(RowError::ExportFailure)
            }
        }
    }
}
