mod config;
mod services;
mod state;
mod storage;

use crate::config::AppConfig;
use crate::services::reminders::scheduler;
use crate::services::reminders::whatsapp::WhatsAppGateway;
use crate::state::AppState;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load();

    // Create the schema up front so every handler can assume it exists.
    let conn = storage::open(&config.db_path).map_err(std::io::Error::other)?;
    storage::init_schema(&conn).map_err(std::io::Error::other)?;
    drop(conn);

    let gateway = Arc::new(WhatsAppGateway::new(config.whatsapp.clone()));
    if gateway.is_enabled() {
        info!("Servicio de WhatsApp inicializado correctamente");
    } else {
        info!("Servicio de WhatsApp deshabilitado o sin configuración");
    }

    // Hourly reminder job; the /api/recordatorios/ejecutar-ahora endpoint
    // drives the same dispatch entry point on demand.
    scheduler::start(config.db_path.clone(), gateway.clone());

    let app_state = web::Data::new(AppState {
        db_path: config.db_path.clone(),
        gateway,
    });

    let url = format!("http://{}:{}", config.host, config.port);
    info!("Server running at {}", url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(app_state.clone())
            .service(services::owners::configure_routes())
            .service(services::pets::configure_routes())
            .service(services::appointments::configure_routes())
            .service(services::catalog::configure_routes())
            .service(services::staff::configure_routes())
            .service(services::inventory::configure_routes())
            .service(services::invoices::configure_routes())
            .service(services::documents::configure_routes())
            .service(services::reminders::configure_routes())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
