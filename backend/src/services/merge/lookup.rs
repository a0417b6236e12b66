use super::with_engine;
use crate::config::Settings;
use actix_web::{web, HttpResponse, Responder};

pub(crate) async fn drafts(settings: web::Data<Settings>) -> impl Responder {
    match with_engine(settings, |engine, _| {
        engine.list_draft_subjects().map_err(|e| e.to_string())
    })
    .await
    {
        Ok(drafts) => HttpResponse::Ok().json(drafts),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Could not list drafts: {}", e)),
    }
}

pub(crate) async fn headers(settings: web::Data<Settings>) -> impl Responder {
    match with_engine(settings, |engine, _| {
        engine.list_sheet_headers().map_err(|e| e.to_string())
    })
    .await
    {
        Ok(headers) => HttpResponse::Ok().json(headers),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Could not read headers: {}", e)),
    }
}

pub(crate) async fn rows(settings: web::Data<Settings>) -> impl Responder {
    match with_engine(settings, |engine, _| {
        engine.count_processable_rows().map_err(|e| e.to_string())
    })
    .await
    {
        Ok(rows) => HttpResponse::Ok().json(serde_json::json!({ "rows": rows })),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Could not count rows: {}", e)),
    }
}
