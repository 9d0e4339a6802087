//! CRUD endpoints for clinic staff under `/api/personal`. Veterinarians
//! referenced by appointments are rows here.

use crate::state::AppState;
use crate::storage;
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::model::staff::Personal;
use rusqlite::{params, Connection};

const API_PATH: &str = "/api/personal";

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
    match list_staff(&conn) {
        Ok(staff) => HttpResponse::Ok().json(staff),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn get_one(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match find_staff(&conn, *id) {
        Ok(Some(member)) => HttpResponse::Ok().json(member),
        Ok(None) => HttpResponse::NotFound().body("Personal no encontrado"),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn save(state: web::Data<AppState>, payload: web::Json<Personal>) -> impl Responder {
    if payload.nombre.trim().is_empty() {
        return HttpResponse::BadRequest().body("El nombre es requerido");
    }
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match save_staff(&conn, &payload) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn remove(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match storage::exists(&conn, "personal", *id) {
        Ok(false) => return HttpResponse::NotFound().body("Personal no encontrado"),
        Err(e) => return HttpResponse::InternalServerError().body(e),
        Ok(true) => {}
    }
    match conn.execute("DELETE FROM personal WHERE id = ?1", [*id]) {
        Ok(_) => HttpResponse::Ok().body("Personal eliminado"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

fn row_to_staff(row: &rusqlite::Row) -> rusqlite::Result<Personal> {
    Ok(Personal {
        id: row.get(0)?,
        nombre: row.get(1)?,
        rut: row.get(2)?,
        cargo: row.get(3)?,
        especialidad: row.get(4)?,
        telefono: row.get(5)?,
        email: row.get(6)?,
        activo: row.get(7)?,
    })
}

const SELECT_STAFF: &str =
    "SELECT id, nombre, rut, cargo, especialidad, telefono, email, activo FROM personal";

pub fn list_staff(conn: &Connection) -> Result<Vec<Personal>, String> {
    let mut stmt = conn
        .prepare(&format!("{} ORDER BY nombre", SELECT_STAFF))
        .map_err(|e| e.to_string())?;
    let rows = stmt.query_map([], row_to_staff).map_err(|e| e.to_string())?;
    rows.collect::<Result<_, _>>().map_err(|e| e.to_string())
}

pub fn find_staff(conn: &Connection, id: i64) -> Result<Option<Personal>, String> {
    let mut stmt = conn
        .prepare(&format!("{} WHERE id = ?1", SELECT_STAFF))
        .map_err(|e| e.to_string())?;
    let mut rows = stmt.query_map([id], row_to_staff).map_err(|e| e.to_string())?;
    match rows.next() {
        Some(Ok(member)) => Ok(Some(member)),
        Some(Err(e)) => Err(e.to_string()),
        None => Ok(None),
    }
}

pub fn save_staff(conn: &Connection, member: &Personal) -> Result<Personal, String> {
    let mut saved = member.clone();
    match member.id {
        Some(id) => {
            if !storage::exists(conn, "personal", id)? {
                return Err("Personal no encontrado".to_string());
            }
            conn.execute(
                "UPDATE personal SET nombre = ?1, rut = ?2, cargo = ?3, especialidad = ?4,
                 telefono = ?5, email = ?6, activo = ?7 WHERE id = ?8",
                params![
                    member.nombre,
                    member.rut,
                    member.cargo,
                    member.especialidad,
                    member.telefono,
                    member.email,
                    member.activo,
                    id
                ],
            )
            .map_err(|e| e.to_string())?;
        }
        None => {
            conn.execute(
                "INSERT INTO personal (nombre, rut, cargo, especialidad, telefono, email, activo)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    member.nombre,
                    member.rut,
                    member.cargo,
                    member.especialidad,
                    member.telefono,
                    member.email,
                    member.activo
                ],
            )
            .map_err(|e| e.to_string())?;
            saved.id = Some(conn.last_insert_rowid());
        }
    }
    Ok(saved)
}
