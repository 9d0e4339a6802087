//! CRUD endpoints for pet owners under `/api/propietarios`.

use crate::state::AppState;
use crate::storage;
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::model::owner::Propietario;
use rusqlite::{params, Connection};

const API_PATH: &str = "/api/propietarios";

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
    match list_owners(&conn) {
        Ok(owners) => HttpResponse::Ok().json(owners),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn get_one(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match find_owner(&conn, *id) {
        Ok(Some(owner)) => HttpResponse::Ok().json(owner),
        Ok(None) => HttpResponse::NotFound().body("Propietario no encontrado"),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn save(state: web::Data<AppState>, payload: web::Json<Propietario>) -> impl Responder {
    if payload.nombre.trim().is_empty() {
        return HttpResponse::BadRequest().body("El nombre del propietario es requerido");
    }
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match save_owner(&conn, &payload) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn remove(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match storage::exists(&conn, "propietarios", *id) {
        Ok(false) => return HttpResponse::NotFound().body("Propietario no encontrado"),
        Err(e) => return HttpResponse::InternalServerError().body(e),
        Ok(true) => {}
    }
    match conn.execute("DELETE FROM propietarios WHERE id = ?1", [*id]) {
        Ok(_) => HttpResponse::Ok().body("Propietario eliminado"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

fn row_to_owner(row: &rusqlite::Row) -> rusqlite::Result<Propietario> {
    Ok(Propietario {
        id: row.get(0)?,
        rut: row.get(1)?,
        nombre: row.get(2)?,
        telefono: row.get(3)?,
        email: row.get(4)?,
    })
}

pub fn list_owners(conn: &Connection) -> Result<Vec<Propietario>, String> {
    let mut stmt = conn
        .prepare("SELECT id, rut, nombre, telefono, email FROM propietarios ORDER BY nombre")
        .map_err(|e| e.to_string())?;
    let rows = stmt.query_map([], row_to_owner).map_err(|e| e.to_string())?;
    rows.collect::<Result<_, _>>().map_err(|e| e.to_string())
}

pub fn find_owner(conn: &Connection, id: i64) -> Result<Option<Propietario>, String> {
    let mut stmt = conn
        .prepare("SELECT id, rut, nombre, telefono, email FROM propietarios WHERE id = ?1")
        .map_err(|e| e.to_string())?;
    let mut rows = stmt.query_map([id], row_to_owner).map_err(|e| e.to_string())?;
    match rows.next() {
        Some(Ok(owner)) => Ok(Some(owner)),
        Some(Err(e)) => Err(e.to_string()),
        None => Ok(None),
    }
}

/// Inserts when `id` is absent, updates otherwise. Returns the stored row
/// with its id filled in.
pub fn save_owner(conn: &Connection, owner: &Propietario) -> Result<Propietario, String> {
    let mut saved = owner.clone();
    match owner.id {
        Some(id) => {
            if !storage::exists(conn, "propietarios", id)? {
                return Err("Propietario no encontrado".to_string());
            }
            conn.execute(
                "UPDATE propietarios SET rut = ?1, nombre = ?2, telefono = ?3, email = ?4
                 WHERE id = ?5",
                params![owner.rut, owner.nombre, owner.telefono, owner.email, id],
            )
            .map_err(|e| e.to_string())?;
        }
        None => {
            conn.execute(
                "INSERT INTO propietarios (rut, nombre, telefono, email)
                 VALUES (?1, ?2, ?3, ?4)",
                params![owner.rut, owner.nombre, owner.telefono, owner.email],
            )
            .map_err(|e| e.to_string())?;
            saved.id = Some(conn.last_insert_rowid());
        }
    }
    Ok(saved)
}
