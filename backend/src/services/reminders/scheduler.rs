//! Hourly background job driving the reminder dispatch.

use crate::services::reminders::dispatch;
use crate::services::reminders::whatsapp::WhatsAppGateway;
use crate::storage;
use actix_web::rt;
use chrono::Local;
use log::error;
use std::sync::Arc;
use std::time::Duration;

const INTERVAL: Duration = Duration::from_secs(3600);

/// Spawns the reminder loop on the Actix runtime. The first run fires
/// immediately, then once per hour. Each tick opens its own connection;
/// a failure to open only skips that tick.
pub fn start(db_path: String, gateway: Arc<WhatsAppGateway>) {
    rt::spawn(async move {
        let mut ticker = rt::time::interval(INTERVAL);
        loop {
            ticker.tick().await;
            match storage::open(&db_path) {
                Ok(conn) => {
                    dispatch::run_dispatch(&conn, gateway.as_ref(), Local::now()).await;
                }
                Err(e) => {
                    error!("No se pudo abrir la base de datos para recordatorios: {}", e);
                }
            }
        }
    });
}
