//! # Merge Engine
//!
//! The per-row merge core. Given a sheet of rows, a template document and a
//! destination folder, it produces one populated document per populated row
//! and either emails it (as a PDF attachment) or stores its PDF export.
//!
//! ## Components (leaf first)
//!
//! - `identifiers`: pulls resource ids out of document, folder and file links.
//! - `columns`: turns spreadsheet column letters into zero-based indices.
//! - `placeholder`: tokenizes and renders `{{field}}` templates, sanitizes file names.
//! - `quota`: the email capacity policy consulted before a batch send.
//! - `processor`: merges and dispatches a single row, folding failures into a `RowOutcome`.
//! - `coordinator`: validates the request and drives the processor over every row.
//!
//! Everything that talks to the outside world goes through the capability
//! traits in `ports`; concrete bindings live in `crate::backends`.

pub mod budget;
pub mod columns;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod identifiers;
pub mod placeholder;
pub mod ports;
pub mod processor;
pub mod quota;

pub use budget::RunBudget;
pub use context::{FieldMap, RowContext};
pub use coordinator::{Backends, MergeEngine, MergeOptions};
pub use error::{BackendError, MergeError, RowError};
pub use placeholder::UnresolvedPlaceholder;
pub use quota::{FixedQuota, QuotaPolicy};
