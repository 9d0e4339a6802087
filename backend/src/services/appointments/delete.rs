//! Delete handler for `DELETE /api/citas/{id}`.

use crate::state::AppState;
use crate::storage;
use actix_web::{web, HttpResponse, Responder};

pub(crate) async fn process(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match storage::exists(&conn, "citas", *id) {
        Ok(false) => return HttpResponse::NotFound().body("Cita no encontrada"),
        Err(e) => return HttpResponse::InternalServerError().body(e),
        Ok(true) => {}
    }
    match conn.execute("DELETE FROM citas WHERE id = ?1", [*id]) {
        Ok(_) => HttpResponse::Ok().body("Cita eliminada"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}
