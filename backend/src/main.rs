use actix_web::{web, App, HttpServer};
use docmerge::config::Settings;
use docmerge::job_controller::state::JobsState;
use docmerge::services;
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let settings = Settings::from_env();
    let (host, port) = (settings.host.clone(), settings.port);

    info!(
        "Sheet: {}, data directory: {}",
        settings.sheet_path.display(),
        settings.data_dir.display()
    );
    info!("Server running at http://{}:{}", host, port);

    let settings = web::Data::new(settings);
    let jobs_state = web::Data::new(JobsState::new());

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(1024 * 1024)) // 1 MB
            .app_data(settings.clone())
            .app_data(jobs_state.clone())
            .service(services::merge::configure_routes())
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
