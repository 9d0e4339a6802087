//! CRUD endpoints for the service catalog under `/api/servicios`.

use crate::state::AppState;
use crate::storage;
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::model::service::Servicio;
use rusqlite::{params, Connection};

const API_PATH: &str = "/api/servicios";

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
    match list_services(&conn) {
        Ok(services) => HttpResponse::Ok().json(services),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn get_one(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match find_service(&conn, *id) {
        Ok(Some(service)) => HttpResponse::Ok().json(service),
        Ok(None) => HttpResponse::NotFound().body("Servicio no encontrado"),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn save(state: web::Data<AppState>, payload: web::Json<Servicio>) -> impl Responder {
    if payload.nombre.trim().is_empty() {
        return HttpResponse::BadRequest().body("El nombre del servicio es requerido");
    }
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match save_service(&conn, &payload) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn remove(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match storage::exists(&conn, "servicios", *id) {
        Ok(false) => return HttpResponse::NotFound().body("Servicio no encontrado"),
        Err(e) => return HttpResponse::InternalServerError().body(e),
        Ok(true) => {}
    }
    match conn.execute("DELETE FROM servicios WHERE id = ?1", [*id]) {
        Ok(_) => HttpResponse::Ok().body("Servicio eliminado"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

fn row_to_service(row: &rusqlite::Row) -> rusqlite::Result<Servicio> {
    Ok(Servicio {
        id: row.get(0)?,
        nombre: row.get(1)?,
        descripcion: row.get(2)?,
        precio: row.get(3)?,
        duracion: row.get(4)?,
        activo: row.get(5)?,
    })
}

const SELECT_SERVICE: &str =
    "SELECT id, nombre, descripcion, precio, duracion, activo FROM servicios";

pub fn list_services(conn: &Connection) -> Result<Vec<Servicio>, String> {
    let mut stmt = conn
        .prepare(&format!("{} ORDER BY nombre", SELECT_SERVICE))
        .map_err(|e| e.to_string())?;
    let rows = stmt
        .query_map([], row_to_service)
        .map_err(|e| e.to_string())?;
    rows.collect::<Result<_, _>>().map_err(|e| e.to_string())
}

pub fn find_service(conn: &Connection, id: i64) -> Result<Option<Servicio>, String> {
    let mut stmt = conn
        .prepare(&format!("{} WHERE id = ?1", SELECT_SERVICE))
        .map_err(|e| e.to_string())?;
    let mut rows = stmt
        .query_map([id], row_to_service)
        .map_err(|e| e.to_string())?;
    match rows.next() {
        Some(Ok(service)) => Ok(Some(service)),
        Some(Err(e)) => Err(e.to_string()),
        None => Ok(None),
    }
}

pub fn save_service(conn: &Connection, service: &Servicio) -> Result<Servicio, String> {
    let mut saved = service.clone();
    match service.id {
        Some(id) => {
            if !storage::exists(conn, "servicios", id)? {
                return Err("Servicio no encontrado".to_string());
            }
            conn.execute(
                "UPDATE servicios SET nombre = ?1, descripcion = ?2, precio = ?3,
                 duracion = ?4, activo = ?5 WHERE id = ?6",
                params![
                    service.nombre,
                    service.descripcion,
                    service.precio,
                    service.duracion,
                    service.activo,
                    id
                ],
            )
            .map_err(|e| e.to_string())?;
        }
        None => {
            conn.execute(
                "INSERT INTO servicios (nombre, descripcion, precio, duracion, activo)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    service.nombre,
                    service.descripcion,
                    service.precio,
                    service.duracion,
                    service.activo
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
    fn save_and_list_services() {
        let conn = open_test_db();
        let service = Servicio {
            id: None,
            nombre: "Vacunación antirrábica".to_string(),
            descripcion: None,
            precio: Some(15000.0),
            duracion: Some(20),
            activo: true,
        };
        save_service(&conn, &service).unwrap();
        let all = list_services(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].nombre, "Vacunación antirrábica");
    }
}
