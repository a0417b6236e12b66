//! # Merge Service Module
//!
//! HTTP entry points used by the merge wizard. Each handler opens the local
//! workspace on a blocking worker and calls the matching engine operation.
//!
//! ## Registered routes (under `/api/merge`)
//!
//! *   **`GET /drafts`**: `[{id, subject}]` of the available email drafts.
//! *   **`GET /headers`**: the header row of the active sheet.
//! *   **`GET /rows`**: `{ "rows": n }`, the number of populated data rows.
//! *   **`POST /start`**: schedules a merge run in the background and returns
//!     `{ "job_id": ... }`.
//! *   **`GET /status/{job_id}`**: the `JobStatus` of a scheduled run.
//! *   **`POST /run`**: runs a merge and answers with its `MergeReport`.

mod lookup;
mod start;
mod status;

use crate::backends::LocalWorkspace;
use crate::config::Settings;
use crate::engine::MergeEngine;
use actix_web::web;

const API_PATH: &str = "/api/merge";

/// Configures and returns the Actix `Scope` for all merge-related routes.
pub fn configure_routes() -> actix_web::Scope {
    web::scope(API_PATH)
        .route("/drafts", web::get().to(lookup::drafts))
        .route("/headers", web::get().to(lookup::headers))
        .route("/rows", web::get().to(lookup::rows))
        .route("/start", web::post().to(start::process))
        .route("/status/{job_id}", web::get().to(status::process))
        .route("/run", web::post().to(start::run))
}

/// Opens the workspace described by `settings` on a blocking worker and
/// applies `op` to its engine.
pub(crate) async fn with_engine<T, F>(settings: web::Data<Settings>, op: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&MergeEngine<'_>, &Settings) -> Result<T, String> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(move || {
        let settings = settings.get_ref();
        let workspace = LocalWorkspace::open(settings).map_err(|e| e.to_string())?;
        let engine = workspace.engine();
        op(&engine, settings)
    });
    match handle.await {
        Ok(result) => result,
        Err(e) => Err(format!("Task join error: {}", e)),
    }
}
