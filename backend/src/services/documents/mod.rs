//! Certificate generation under `/api/documentos`.

pub mod engine;
mod generate;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/documentos";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/generar", post().to(generate::process))
}
