//! Reminder endpoints under `/api/recordatorios`.
//!
//! The scheduled job and the `ejecutar-ahora` endpoint share the same
//! dispatch entry point; the rest of the routes exist for operating the
//! gateway by hand: checking its status, test-sending to a number, and
//! re-sending for one appointment.

pub mod dispatch;
pub mod message;
pub mod scheduler;
pub mod whatsapp;

use crate::state::AppState;
use crate::storage;
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use chrono::Local;
use common::requests::ProbarEnvioRequest;
use serde_json::json;
use whatsapp::Messenger;

const API_PATH: &str = "/api/recordatorios";

const MENSAJE_PRUEBA: &str = "🐾 Mensaje de prueba de la Clínica Veterinaria Pucará";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("/estado", get().to(estado))
        .route("/probar-envio", post().to(probar_envio))
        .route("/enviar/{cita_id}", post().to(enviar))
        .route("/citas-pendientes", get().to(citas_pendientes))
        .route("/ejecutar-ahora", post().to(ejecutar_ahora))
}

async fn list(state: web::Data<AppState>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match dispatch::list_reminders(&conn) {
        Ok(reminders) => HttpResponse::Ok().json(reminders),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn estado(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "habilitado": state.gateway.is_enabled(),
        "timestamp": Local::now().to_rfc3339(),
    }))
}

async fn probar_envio(
    state: web::Data<AppState>,
    payload: web::Json<ProbarEnvioRequest>,
) -> impl Responder {
    let numero = match whatsapp::normalize_whatsapp_number(&payload.numero) {
        Ok(n) => n,
        Err(e) => return HttpResponse::BadRequest().body(e),
    };
    let mensaje = payload.mensaje.as_deref().unwrap_or(MENSAJE_PRUEBA);
    let exito = state.gateway.send(&numero, mensaje).await;
    HttpResponse::Ok().json(json!({
        "exito": exito,
        "numero": numero,
        "timestamp": Local::now().to_rfc3339(),
    }))
}

async fn enviar(state: web::Data<AppState>, cita_id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match dispatch::send_reminder_manually(&conn, state.gateway.as_ref(), *cita_id).await {
        Ok(true) => HttpResponse::Ok().json(json!({
            "exito": true,
            "mensaje": "Recordatorio enviado correctamente",
        })),
        Ok(false) => HttpResponse::Ok().json(json!({
            "exito": false,
            "mensaje": dispatch::ERROR_ENVIO,
        })),
        Err(e) => HttpResponse::BadRequest().body(e),
    }
}

async fn citas_pendientes(state: web::Data<AppState>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match dispatch::eligible(&conn, Local::now()) {
        Ok(citas) => HttpResponse::Ok().json(json!({
            "total": citas.len(),
            "citas": citas,
        })),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn ejecutar_ahora(state: web::Data<AppState>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    let resumen = dispatch::run_dispatch(&conn, state.gateway.as_ref(), Local::now()).await;
    HttpResponse::Ok().json(json!({
        "habilitado": resumen.habilitado,
        "enviados": resumen.enviados(),
        "fallidos": resumen.fallidos(),
        "omitidos": resumen.omitidos(),
        "resultados": resumen.resultados,
        "error": resumen.error,
        "timestamp": Local::now().to_rfc3339(),
    }))
}
