//! # Batch Coordinator
//!
//! Entry points used by the UI layer: draft and header listing, the count
//! of processable rows, and the merge run itself.
//!
//! A run moves through `Validating`, then either `Rejected` (a single
//! message, no row touched) or `Processing`, which always ends `Completed`
//! with one outcome per populated row in sheet order. A failing row never
//! stops the batch.

use super::budget::RunBudget;
use super::columns::{column_letter_to_index, resolve_optional_column};
use super::context::{is_populated, RowContext};
use super::error::{BackendError, MergeError, RowError};
use super::identifiers::{extract_document_id, extract_folder_id};
use super::ports::{Clock, DocumentBackend, FileStorage, MailBackend, SheetData, SheetSource};
use super::processor::{MergePlan, RowProcessor};
use super::quota::{ensure_capacity, QuotaPolicy};
use common::model::draft::DraftSummary;
use common::model::merge::{MergeReport, RowOutcome};
use common::requests::{MergeAction, MergeRequest};
use log::{debug, error, info};

/// The capability implementations a merge runs against.
#[derive(Clone, Copy)]
pub struct Backends<'a> {
    pub sheet: &'a dyn SheetSource,
    pub documents: &'a dyn DocumentBackend,
    pub files: &'a dyn FileStorage,
    pub mail: &'a dyn MailBackend,
    pub quota: &'a dyn QuotaPolicy,
    pub clock: &'a dyn Clock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Keep each row's working copy in the destination folder after the
    /// row is processed. When false the copy is trashed.
    pub retain_working_copies: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            retain_working_copies: true,
        }
    }
}

pub struct MergeEngine<'a> {
    backends: Backends<'a>,
    options: MergeOptions,
}

impl<'a> MergeEngine<'a> {
    pub fn new(backends: Backends<'a>, options: MergeOptions) -> Self {
        Self { backends, options }
    }

    pub fn list_draft_subjects(&self) -> Result<Vec<DraftSummary>, BackendError> {
        Ok(self
            .backends
            .mail
            .list_drafts()?
            .into_iter()
            .map(|d| DraftSummary {
                id: d.id,
                subject: d.subject,
            })
            .collect())
    }

    pub fn list_sheet_headers(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.backends.sheet.read_sheet()?.headers)
    }

    /// Number of data rows with at least one non-blank cell.
    pub fn count_processable_rows(&self) -> Result<usize, BackendError> {
        let sheet = self.backends.sheet.read_sheet()?;
        Ok(populated_count(&sheet))
    }

    /// Runs a merge. Never fails: a rejected request is reported through
    /// `MergeReport::success`.
    pub fn run_merge(&self, request: &MergeRequest, budget: &RunBudget) -> MergeReport {
        match self.prepare(request) {
            Ok((plan, sheet)) => {
                let report = MergeReport::completed(self.process_rows(&plan, &sheet, budget));
                info!(
                    "Merge completed: {} rows, {} errors",
                    report.rows.len(),
                    report.error_count()
                );
                report
            }
            Err(e) => {
                error!("General Error: {}", e);
                MergeReport::rejected(e.to_string())
            }
        }
    }

    /// Validates the request against the sheet and the backends and
    /// resolves it into a plan.
    fn prepare(&self, request: &MergeRequest) -> Result<(MergePlan, SheetData), MergeError> {
        debug!("Validating merge request");
        let template_id = extract_document_id(&request.template_link)
            .ok_or_else(|| MergeError::validation("Invalid Template Document URL."))?;
        let folder_id = extract_folder_id(&request.folder_link)
            .ok_or_else(|| MergeError::validation("Invalid Destination Folder URL."))?;

        let action = match request.action {
            Some(action) if !request.filename_format.trim().is_empty() => action,
            _ => return Err(MergeError::validation("Please provide all required fields.")),
        };

        let draft_id = non_blank(request.email_draft_id.as_deref());
        if action == MergeAction::Email && draft_id.is_none() {
            return Err(MergeError::validation("Please select an email draft."));
        }

        let test_email = non_blank(request.test_email.as_deref());
        if request.test_mode && test_email.is_none() {
            return Err(MergeError::validation("Please provide a test email address."));
        }

        let sheet = self.backends.sheet.read_sheet()?;

        let email_column = match action {
            MergeAction::Email => {
                let label = request.email_field.as_deref().unwrap_or("").trim();
                match column_letter_to_index(label) {
                    Some(index) if index < sheet.headers.len() => Some(index),
                    _ => {
                        return Err(MergeError::Validation(format!(
                            "Email column \"{label}\" is out of range."
                        )))
                    }
                }
            }
            MergeAction::Save => None,
        };

        if !self.backends.documents.document_exists(template_id)? {
            return Err(MergeError::validation(
                "Template document not found. Please check the Template URL.",
            ));
        }
        if !self.backends.files.folder_exists(folder_id)? {
            return Err(MergeError::validation(
                "Destination folder not found. Please check the Folder URL.",
            ));
        }

        let draft = match (action, draft_id) {
            (MergeAction::Email, Some(id)) => Some(
                self.backends
                    .mail
                    .list_drafts()?
                    .into_iter()
                    .find(|d| d.id == id)
                    .ok_or_else(|| MergeError::validation("Selected email draft not found."))?,
            ),
            _ => None,
        };

        if action == MergeAction::Email && !request.test_mode {
            ensure_capacity(self.backends.quota, populated_count(&sheet))?;
        }

        let plan = MergePlan {
            action,
            template_id: template_id.to_string(),
            folder_id: folder_id.to_string(),
            filename_format: request.filename_format.clone(),
            draft,
            test_email: if request.test_mode {
                test_email.map(str::to_string)
            } else {
                None
            },
            email_column,
            cc_column: resolve_optional_column(request.cc_field.as_deref()),
            bcc_column: resolve_optional_column(request.bcc_field.as_deref()),
            attachments_column: resolve_optional_column(request.attachments_field.as_deref()),
            retain_working_copies: self.options.retain_working_copies,
        };
        Ok((plan, sheet))
    }

    fn process_rows(
        &self,
        plan: &MergePlan,
        sheet: &SheetData,
        budget: &RunBudget,
    ) -> Vec<RowOutcome> {
        let today = self.backends.clock.today();
        let processor = RowProcessor::new(plan, &self.backends, &today);
        let mut outcomes = Vec::new();
        let mut first = true;

        for (index, cells) in sheet.rows.iter().enumerate() {
            if !is_populated(cells) {
                continue;
            }
            let row = RowContext::new(&sheet.headers, cells, index + 2);
            if budget.is_exhausted() {
                outcomes.push(RowOutcome::failed(
                    row.row_number,
                    RowError::Cancelled.to_string(),
                ));
                continue;
            }
            outcomes.push(processor.process(&row, first));
            first = false;
        }
        outcomes
    }
}

fn populated_count(sheet: &SheetData) -> usize {
    sheet.rows.iter().filter(|r| is_populated(r)).count()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
