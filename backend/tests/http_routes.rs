use actix_web::{test, web, App};
use common::jobs::JobStatus;
use common::model::draft::DraftSummary;
use common::model::merge::MergeReport;
use common::requests::{MergeAction, MergeRequest};
use docmerge::backends::mailbox::Mailbox;
use docmerge::config::Settings;
use docmerge::job_controller::state::JobsState;
use docmerge::services;
use std::fs;
use std::time::Duration;

fn settings(dir: &tempfile::TempDir) -> Settings {
    let sheet_path = dir.path().join("sheet.csv");
    fs::write(&sheet_path, "Name,Email\nAda,ada@example.com\n,\nBo,bo@example.com\n").unwrap();
    Settings {
        sheet_path,
        data_dir: dir.path().join("data"),
        fonts_dir: dir.path().join("fonts"),
        ..Settings::default()
    }
}

macro_rules! app {
    ($settings:expr, $jobs:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($settings))
                .app_data(web::Data::new($jobs))
                .service(services::merge::configure_routes()),
        )
        .await
    };
}

#[actix_web::test]
async fn lookups_read_the_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(&dir);
    fs::create_dir_all(&settings.data_dir).unwrap();
    Mailbox::open(settings.mailbox_path())
        .unwrap()
        .save_draft("Welcome {{Name}}", "<p>Hi</p>")
        .unwrap();
    let app = app!(settings, JobsState::new());

    let headers: Vec<String> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/merge/headers").to_request()).await;
    assert_eq!(headers, vec!["Name", "Email"]);

    let rows: serde_json::Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/merge/rows").to_request()).await;
    assert_eq!(rows["rows"], 2);

    let drafts: Vec<DraftSummary> =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/merge/drafts").to_request()).await;
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].subject, "Welcome {{Name}}");
}

#[actix_web::test]
async fn run_returns_a_rejected_report_for_bad_links() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(settings(&dir), JobsState::new());

    let request = MergeRequest {
        action: Some(MergeAction::Save),
        template_link: "not a link".into(),
        folder_link: "https://drive.local/drive/folders/abc".into(),
        filename_format: "{{Name}}".into(),
        ..MergeRequest::default()
    };
    let report: MergeReport = test::call_and_read_body_json(
        &app,
        test::TestRequest::post().uri("/api/merge/run").set_json(&request).to_request(),
    )
    .await;

    assert!(!report.success);
    assert_eq!(report.message.as_deref(), Some("Invalid Template Document URL."));
}

#[actix_web::test]
async fn started_job_reports_its_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(settings(&dir), JobsState::new());

    let request = MergeRequest {
        action: Some(MergeAction::Save),
        template_link: "https://docs.local/document/d/unknown/edit".into(),
        folder_link: "https://drive.local/drive/folders/unknown".into(),
        filename_format: "{{Name}}".into(),
        ..MergeRequest::default()
    };
    let started: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post().uri("/api/merge/start").set_json(&request).to_request(),
    )
    .await;
    let job_id = started["job_id"].as_str().unwrap().to_string();

    let mut report = None;
    for _ in 0..200 {
        let status: JobStatus = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/merge/status/{job_id}"))
                .to_request(),
        )
        .await;
        if let JobStatus::Completed(r) = status {
            report = Some(r);
            break;
        }
        actix_web::rt::time::sleep(Duration::from_millis(10)).await;
    }

    let report = report.expect("job should complete");
    assert!(!report.success);
    assert_eq!(
        report.message.as_deref(),
        Some("Template document not found. Please check the Template URL.")
    );
}

#[actix_web::test]
async fn unknown_job_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(settings(&dir), JobsState::new());

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/merge/status/nope").to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn a_second_run_is_refused_while_one_is_active() {
    let dir = tempfile::tempdir().unwrap();
    let jobs = JobsState::new();
    let app = app!(settings(&dir), jobs.clone());
    let request = MergeRequest {
        action: Some(MergeAction::Save),
        template_link: "not a link".into(),
        folder_link: "https://drive.local/drive/folders/abc".into(),
        filename_format: "{{Name}}".into(),
        ..MergeRequest::default()
    };

    let active = jobs.try_begin_run().expect("no run yet");
    for uri in ["/api/merge/run", "/api/merge/start"] {
        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri(uri).set_json(&request).to_request(),
        )
        .await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT, "{uri}");
    }

    drop(active);
    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/merge/run").set_json(&request).to_request(),
    )
    .await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn finished_job_releases_the_run_slot() {
    let dir = tempfile::tempdir().unwrap();
    let jobs = JobsState::new();
    let app = app!(settings(&dir), jobs.clone());
    let request = MergeRequest {
        action: Some(MergeAction::Save),
        template_link: "not a link".into(),
        filename_format: "{{Name}}".into(),
        ..MergeRequest::default()
    };

    let started: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post().uri("/api/merge/start").set_json(&request).to_request(),
    )
    .await;
    assert!(started["job_id"].is_string());

    let mut released = false;
    for _ in 0..200 {
        if let Some(guard) = jobs.try_begin_run() {
            drop(guard);
            released = true;
            break;
        }
        actix_web::rt::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(released, "run slot should be free once the job ends");
}
