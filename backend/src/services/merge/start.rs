//! # Merge Run Service
//!
//! `POST /api/merge/start` and `POST /api/merge/run`.
//!
//! Both take the `MergeRequest` collected by the wizard. `start` registers a
//! job, answers with its id, and lets the run finish in the background;
//! `run` waits for the run and answers with the `MergeReport`.
//!
//! The merge itself is synchronous (rows are processed one after another
//! against blocking backends), so it always executes on the blocking pool
//! via `tokio::task::spawn_blocking`. A rejected request is still a
//! successful run from the job's point of view: its report carries
//! `success: false` and the reason.
//!
//! Only one merge runs at a time against the workspace. While a run is in
//! progress both endpoints answer `409 Conflict`.

use super::with_engine;
use crate::config::Settings;
use crate::job_controller::state::{JobsState, RunGuard};
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::model::merge::MergeReport;
use common::requests::MergeRequest;
use log::{error, info, warn};

const RUN_IN_PROGRESS: &str = "A merge is already running. Please wait for it to finish.";

/// Handler for `POST /api/merge/start`.
pub(crate) async fn process(
    state: web::Data<JobsState>,
    settings: web::Data<Settings>,
    payload: web::Json<MergeRequest>,
) -> impl Responder {
    let Some(guard) = state.try_begin_run() else {
        warn!("Rejected merge job: another run is in progress");
        return HttpResponse::Conflict().body(RUN_IN_PROGRESS);
    };
    let job_id = schedule_merge_job(state, settings, payload.into_inner(), guard).await;
    HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id }))
}

/// Handler for `POST /api/merge/run`.
pub(crate) async fn run(
    state: web::Data<JobsState>,
    settings: web::Data<Settings>,
    payload: web::Json<MergeRequest>,
) -> impl Responder {
    let Some(_guard) = state.try_begin_run() else {
        warn!("Rejected merge run: another run is in progress");
        return HttpResponse::Conflict().body(RUN_IN_PROGRESS);
    };
    match run_merge(settings, payload.into_inner()).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn run_merge(settings: web::Data<Settings>, request: MergeRequest) -> Result<MergeReport, String> {
    with_engine(settings, move |engine, settings| {
        Ok(engine.run_merge(&request, &settings.run_budget()))
    })
    .await
}

/// Registers the job as `Pending`, then runs it on a spawned task that
/// records `Running` and finally `Completed` or `Failed`. The run slot is
/// released once the final status is recorded.
async fn schedule_merge_job(
    state: web::Data<JobsState>,
    settings: web::Data<Settings>,
    request: MergeRequest,
    guard: RunGuard,
) -> String {
    let job_id = state.register().await;
    let jobs = state.get_ref().clone();
    let id = job_id.clone();

    tokio::spawn(async move {
        jobs.update(&id, JobStatus::Running).await;
        let status = match run_merge(settings, request).await {
            Ok(report) => {
                info!("Merge job {} finished (success: {})", id, report.success);
                JobStatus::Completed(report)
            }
            Err(e) => {
                error!("Merge job {} failed: {}", id, e);
                JobStatus::Failed(e)
            }
        };
        jobs.update(&id, status).await;
        drop(guard);
    });

    job_id
}
