//! CRUD endpoints for invoices under `/api/honorarios`.

use crate::state::AppState;
use crate::storage;
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use chrono::Local;
use common::model::invoice::Honorario;
use rusqlite::{params, Connection};

const API_PATH: &str = "/api/honorarios";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("", post().to(save))
        .route("/{id}", get().to(get_one))
        .route("/{id}", delete().to(remove))
}

async fn list(state: web::Data<AppState>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match list_invoices(&conn) {
        Ok(invoices) => HttpResponse::Ok().json(invoices),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn get_one(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match find_invoice(&conn, *id) {
        Ok(Some(invoice)) => HttpResponse::Ok().json(invoice),
        Ok(None) => HttpResponse::NotFound().body("Honorario no encontrado"),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn save(state: web::Data<AppState>, payload: web::Json<Honorario>) -> impl Responder {
    if payload.total < 0.0 {
        return HttpResponse::BadRequest().body("El total no puede ser negativo");
    }
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    if let Some(cita_id) = payload.cita_id {
        match storage::exists(&conn, "citas", cita_id) {
            Ok(false) => return HttpResponse::BadRequest().body("La cita indicada no existe"),
            Err(e) => return HttpResponse::InternalServerError().body(e),
            Ok(true) => {}
        }
    }
    match save_invoice(&conn, &payload) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn remove(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match storage::exists(&conn, "honorarios", *id) {
        Ok(false) => return HttpResponse::NotFound().body("Honorario no encontrado"),
        Err(e) => return HttpResponse::InternalServerError().body(e),
        Ok(true) => {}
    }
    match conn.execute("DELETE FROM honorarios WHERE id = ?1", [*id]) {
        Ok(_) => HttpResponse::Ok().body("Honorario eliminado"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

fn row_to_invoice(row: &rusqlite::Row) -> rusqlite::Result<Honorario> {
    Ok(Honorario {
        id: row.get(0)?,
        cita_id: row.get(1)?,
        propietario_id: row.get(2)?,
        fecha_emision: row.get(3)?,
        total: row.get(4)?,
        detalle: row.get(5)?,
        pagado: row.get(6)?,
    })
}

const SELECT_INVOICE: &str =
    "SELECT id, cita_id, propietario_id, fecha_emision, total, detalle, pagado FROM honorarios";

pub fn list_invoices(conn: &Connection) -> Result<Vec<Honorario>, String> {
    let mut stmt = conn
        .prepare(&format!("{} ORDER BY fecha_emision DESC", SELECT_INVOICE))
        .map_err(|e| e.to_string())?;
    let rows = stmt
        .query_map([], row_to_invoice)
        .map_err(|e| e.to_string())?;
    rows.collect::<Result<_, _>>().map_err(|e| e.to_string())
}

pub fn find_invoice(conn: &Connection, id: i64) -> Result<Option<Honorario>, String> {
    let mut stmt = conn
        .prepare(&format!("{} WHERE id = ?1", SELECT_INVOICE))
        .map_err(|e| e.to_string())?;
    let mut rows = stmt
        .query_map([id], row_to_invoice)
        .map_err(|e| e.to_string())?;
    match rows.next() {
        Some(Ok(invoice)) => Ok(Some(invoice)),
        Some(Err(e)) => Err(e.to_string()),
        None => Ok(None),
    }
}

pub fn save_invoice(conn: &Connection, invoice: &Honorario) -> Result<Honorario, String> {
    let mut saved = invoice.clone();
    let fecha = invoice
        .fecha_emision
        .unwrap_or_else(|| Local::now().naive_local());
    saved.fecha_emision = Some(fecha);
    match invoice.id {
        Some(id) => {
            if !storage::exists(conn, "honorarios", id)? {
                return Err("Honorario no encontrado".to_string());
            }
            conn.execute(
                "UPDATE honorarios SET cita_id = ?1, propietario_id = ?2, fecha_emision = ?3,
                 total = ?4, detalle = ?5, pagado = ?6 WHERE id = ?7",
                params![
                    invoice.cita_id,
                    invoice.propietario_id,
                    fecha,
                    invoice.total,
                    invoice.detalle,
                    invoice.pagado,
                    id
                ],
            )
            .map_err(|e| e.to_string())?;
        }
        None => {
            conn.execute(
                "INSERT INTO honorarios (cita_id, propietario_id, fecha_emision, total, detalle, pagado)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    invoice.cita_id,
                    invoice.propietario_id,
                    fecha,
                    invoice.total,
                    invoice.detalle,
                    invoice.pagado
                ],
            )
            .map_err(|e| e.to_string())?;
            saved.id = Some(conn.last_insert_rowid());
        }
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::open_test_db;

    #[test]
    fn save_sets_emission_date() {
        let conn = open_test_db();
        let saved = save_invoice(
            &conn,
            &Honorario {
                id: None,
                cita_id: None,
                propietario_id: None,
                fecha_emision: None,
                total: 25000.0,
                detalle: Some("Consulta general".to_string()),
                pagado: false,
            },
        )
        .unwrap();
        assert!(saved.fecha_emision.is_some());
        let found = find_invoice(&conn, saved.id.unwrap()).unwrap().unwrap();
        assert_eq!(found.total, 25000.0);
    }
}
