//! CRUD endpoints for pets under `/api/mascotas`.

use crate::state::AppState;
use crate::storage;
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::model::pet::Mascota;
use rusqlite::{params, Connection};

const API_PATH: &str = "/api/mascotas";

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
    match list_pets(&conn) {
        Ok(pets) => HttpResponse::Ok().json(pets),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn get_one(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match find_pet(&conn, *id) {
        Ok(Some(pet)) => HttpResponse::Ok().json(pet),
        Ok(None) => HttpResponse::NotFound().body("Mascota no encontrada"),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn save(state: web::Data<AppState>, payload: web::Json<Mascota>) -> impl Responder {
    if payload.nombre.trim().is_empty() {
        return HttpResponse::BadRequest().body("El nombre de la mascota es requerido");
    }
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    // The owner link is optional, but when present it must resolve.
    if let Some(owner_id) = payload.propietario_id {
        match storage::exists(&conn, "propietarios", owner_id) {
            Ok(false) => {
                return HttpResponse::BadRequest().body("El propietario indicado no existe")
            }
            Err(e) => return HttpResponse::InternalServerError().body(e),
            Ok(true) => {}
        }
    }
    match save_pet(&conn, &payload) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn remove(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match storage::exists(&conn, "mascotas", *id) {
        Ok(false) => return HttpResponse::NotFound().body("Mascota no encontrada"),
        Err(e) => return HttpResponse::InternalServerError().body(e),
        Ok(true) => {}
    }
    match conn.execute("DELETE FROM mascotas WHERE id = ?1", [*id]) {
        Ok(_) => HttpResponse::Ok().body("Mascota eliminada"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

fn row_to_pet(row: &rusqlite::Row) -> rusqlite::Result<Mascota> {
    Ok(Mascota {
        id: row.get(0)?,
        nombre: row.get(1)?,
        especie: row.get(2)?,
        raza: row.get(3)?,
        fecha_nacimiento: row.get(4)?,
        sexo: row.get(5)?,
        propietario_id: row.get(6)?,
    })
}

const SELECT_PET: &str =
    "SELECT id, nombre, especie, raza, fecha_nacimiento, sexo, propietario_id FROM mascotas";

pub fn list_pets(conn: &Connection) -> Result<Vec<Mascota>, String> {
    let mut stmt = conn
        .prepare(&format!("{} ORDER BY nombre", SELECT_PET))
        .map_err(|e| e.to_string())?;
    let rows = stmt.query_map([], row_to_pet).map_err(|e| e.to_string())?;
    rows.collect::<Result<_, _>>().map_err(|e| e.to_string())
}

pub fn find_pet(conn: &Connection, id: i64) -> Result<Option<Mascota>, String> {
    let mut stmt = conn
        .prepare(&format!("{} WHERE id = ?1", SELECT_PET))
        .map_err(|e| e.to_string())?;
    let mut rows = stmt.query_map([id], row_to_pet).map_err(|e| e.to_string())?;
    match rows.next() {
        Some(Ok(pet)) => Ok(Some(pet)),
        Some(Err(e)) => Err(e.to_string()),
        None => Ok(None),
    }
}

pub fn save_pet(conn: &Connection, pet: &Mascota) -> Result<Mascota, String> {
    let mut saved = pet.clone();
    match pet.id {
        Some(id) => {
            if !storage::exists(conn, "mascotas", id)? {
                return Err("Mascota no encontrada".to_string());
            }
            conn.execute(
                "UPDATE mascotas SET nombre = ?1, especie = ?2, raza = ?3,
                 fecha_nacimiento = ?4, sexo = ?5, propietario_id = ?6 WHERE id = ?7",
                params![
                    pet.nombre,
                    pet.especie,
                    pet.raza,
                    pet.fecha_nacimiento,
                    pet.sexo,
                    pet.propietario_id,
                    id
                ],
            )
            .map_err(|e| e.to_string())?;
        }
        None => {
            conn.execute(
                "INSERT INTO mascotas (nombre, especie, raza, fecha_nacimiento, sexo, propietario_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    pet.nombre,
                    pet.especie,
                    pet.raza,
                    pet.fecha_nacimiento,
                    pet.sexo,
                    pet.propietario_id
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
    use chrono::NaiveDate;

    #[test]
    fn save_and_find_pet() {
        let conn = open_test_db();
        let pet = Mascota {
            id: None,
            nombre: "Firulais".to_string(),
            especie: Some("Canino".to_string()),
            raza: Some("Quiltro".to_string()),
            fecha_nacimiento: NaiveDate::from_ymd_opt(2020, 5, 1),
            sexo: Some("Macho".to_string()),
            propietario_id: None,
        };
        let saved = save_pet(&conn, &pet).unwrap();
        let found = find_pet(&conn, saved.id.unwrap()).unwrap().unwrap();
        assert_eq!(found.nombre, "Firulais");
        assert_eq!(found.fecha_nacimiento, NaiveDate::from_ymd_opt(2020, 5, 1));
    }
}
