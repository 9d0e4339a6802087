//! Server configuration loaded from environment variables.
//!
//! Every knob has a working default so a development server starts with no
//! environment at all; the WhatsApp gateway simply reports itself disabled
//! until its credentials are provided.

use crate::services::reminders::whatsapp::WhatsAppConfig;
use log::info;
use std::env;

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub whatsapp: WhatsAppConfig,
}

impl AppConfig {
    pub fn load() -> Self {
        Self {
            host: env_or("VETERINARIA_HOST", "127.0.0.1"),
            port: env_or("VETERINARIA_PORT", "8080")
                .parse()
                .unwrap_or(8080),
            db_path: env_or("VETERINARIA_DB", "veterinaria.sqlite"),
            whatsapp: WhatsAppConfig::from_env(),
        }
    }
}

pub(crate) fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}
