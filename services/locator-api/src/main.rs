use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use locator_api::{configure, AppState};
use shared::config::Settings;
use tracing::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();
    let settings = Settings::new().unwrap();
    info!(data_dir = %settings.data_dir, port = settings.port, "starting locator-api");

    let state = web::Data::new(AppState::new(settings.data_dir.clone()));
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(("0.0.0.0", settings.port))?
    .run()
    .await
}
