//! Local bindings of the capability interfaces used by the merge engine.
//!
//! - `sheet`: a CSV file as the active sheet.
//! - `drive`: a SQLite-cataloged folder/file store, templates included.
//! - `pdf`: genpdf rendering of merged documents.
//! - `mailbox`: drafts and an outbox in SQLite.
//! - `clock`: the date used by `{{today's date}}`.
//!
//! [`LocalWorkspace`] wires them together from the settings.

pub mod clock;
pub mod drive;
pub mod mailbox;
pub mod pdf;
pub mod sheet;

use crate::config::Settings;
use crate::engine::{Backends, BackendError, FixedQuota, MergeEngine, MergeOptions};
use clock::SystemClock;
use drive::LocalDrive;
use mailbox::Mailbox;
use pdf::GenPdfRenderer;
use sheet::CsvSheet;

impl From<rusqlite::Error> for BackendError {
    fn from(e: rusqlite::Error) -> Self {
        BackendError::Storage(e.to_string())
    }
}

impl From<csv::Error> for BackendError {
    fn from(e: csv::Error) -> Self {
        BackendError::Message(format!("could not read sheet: {e}"))
    }
}

/// All local backends of one merge run.
pub struct LocalWorkspace {
    pub sheet: CsvSheet,
    pub drive: LocalDrive,
    pub mailbox: Mailbox,
    pub quota: FixedQuota,
    pub clock: SystemClock,
    pub options: MergeOptions,
}

impl LocalWorkspace {
    pub fn open(settings: &Settings) -> Result<Self, BackendError> {
        std::fs::create_dir_all(&settings.data_dir)?;
        Ok(Self {
            sheet: CsvSheet::new(&settings.sheet_path),
            drive: LocalDrive::open(
                settings.drive_dir(),
                Box::new(GenPdfRenderer::new(&settings.fonts_dir)),
            )?,
            mailbox: Mailbox::open(settings.mailbox_path())?,
            quota: FixedQuota(settings.email_quota),
            clock: SystemClock::new(settings.utc_offset),
            options: settings.merge_options(),
        })
    }

    pub fn engine(&self) -> MergeEngine<'_> {
        MergeEngine::new(
            Backends {
                sheet: &self.sheet,
                documents: &self.drive,
                files: &self.drive,
                mail: &self.mailbox,
                quota: &self.quota,
                clock: &self.clock,
            },
            self.options.clone(),
        )
    }
}
