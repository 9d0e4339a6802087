//! Shared application state injected into every Actix handler.

use crate::services::reminders::whatsapp::WhatsAppGateway;
use std::sync::Arc;

/// Handlers open their own SQLite connection against `db_path` per
/// request; the gateway is built once at startup from its config and
/// shared between the HTTP surface and the scheduled reminder job.
#[derive(Clone)]
pub struct AppState {
    pub db_path: String,
    pub gateway: Arc<WhatsAppGateway>,
}
