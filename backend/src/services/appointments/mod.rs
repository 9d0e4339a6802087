//! Appointment endpoints under `/api/citas`.
//!
//! Besides the CRUD handlers this module owns the joined queries that
//! resolve an appointment together with its pet, owner and service; the
//! reminder dispatcher and the pending-appointments endpoint both read
//! through them.

mod delete;
mod save;

use crate::state::AppState;
use crate::storage;
use actix_web::web::{self, get, post, scope};
use actix_web::{HttpResponse, Responder, Scope};
use chrono::NaiveDate;
use common::model::appointment::{Cita, CitaDetalle};
use common::model::owner::Propietario;
use common::model::pet::MascotaDetalle;
use common::model::service::Servicio;
use rusqlite::Connection;

const API_PATH: &str = "/api/citas";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("", post().to(save::process))
        .route("/{id}", get().to(get_one))
        .route("/{id}", web::delete().to(delete::process))
}

async fn list(state: web::Data<AppState>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match list_citas(&conn) {
        Ok(citas) => HttpResponse::Ok().json(citas),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn get_one(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match find_cita(&conn, *id) {
        Ok(Some(cita)) => HttpResponse::Ok().json(cita),
        Ok(None) => HttpResponse::NotFound().body("Cita no encontrada"),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

fn row_to_cita(row: &rusqlite::Row) -> rusqlite::Result<Cita> {
    Ok(Cita {
        id: row.get(0)?,
        fecha: row.get(1)?,
        hora: row.get(2)?,
        motivo: row.get(3)?,
        diagnostico: row.get(4)?,
        tratamiento: row.get(5)?,
        estado: row.get(6)?,
        mascota_id: row.get(7)?,
        veterinario_id: row.get(8)?,
        servicio_id: row.get(9)?,
    })
}

const SELECT_CITA: &str = "SELECT id, fecha, hora, motivo, diagnostico, tratamiento, estado,
    mascota_id, veterinario_id, servicio_id FROM citas";

pub fn list_citas(conn: &Connection) -> Result<Vec<Cita>, String> {
    let mut stmt = conn
        .prepare(&format!("{} ORDER BY fecha, hora", SELECT_CITA))
        .map_err(|e| e.to_string())?;
    let rows = stmt.query_map([], row_to_cita).map_err(|e| e.to_string())?;
    rows.collect::<Result<_, _>>().map_err(|e| e.to_string())
}

pub fn find_cita(conn: &Connection, id: i64) -> Result<Option<Cita>, String> {
    let mut stmt = conn
        .prepare(&format!("{} WHERE id = ?1", SELECT_CITA))
        .map_err(|e| e.to_string())?;
    let mut rows = stmt.query_map([id], row_to_cita).map_err(|e| e.to_string())?;
    match rows.next() {
        Some(Ok(cita)) => Ok(Some(cita)),
        Some(Err(e)) => Err(e.to_string()),
        None => Ok(None),
    }
}

const SELECT_DETALLE: &str = "SELECT c.id, c.fecha, c.hora, c.motivo, c.estado,
    m.id, m.nombre,
    p.id, p.rut, p.nombre, p.telefono, p.email,
    s.id, s.nombre, s.descripcion, s.precio, s.duracion, s.activo
    FROM citas c
    LEFT JOIN mascotas m ON m.id = c.mascota_id
    LEFT JOIN propietarios p ON p.id = m.propietario_id
    LEFT JOIN servicios s ON s.id = c.servicio_id";

fn row_to_detalle(row: &rusqlite::Row) -> rusqlite::Result<CitaDetalle> {
    let mascota = match row.get::<_, Option<i64>>(5)? {
        Some(pet_id) => {
            let propietario = match row.get::<_, Option<i64>>(7)? {
                Some(owner_id) => Some(Propietario {
                    id: Some(owner_id),
                    rut: row.get(8)?,
                    nombre: row.get(9)?,
                    telefono: row.get(10)?,
                    email: row.get(11)?,
                }),
                None => None,
            };
            Some(MascotaDetalle {
                id: pet_id,
                nombre: row.get(6)?,
                propietario,
            })
        }
        None => None,
    };
    let servicio = match row.get::<_, Option<i64>>(12)? {
        Some(service_id) => Some(Servicio {
            id: Some(service_id),
            nombre: row.get(13)?,
            descripcion: row.get(14)?,
            precio: row.get(15)?,
            duracion: row.get(16)?,
            activo: row.get(17)?,
        }),
        None => None,
    };
    Ok(CitaDetalle {
        id: row.get(0)?,
        fecha: row.get(1)?,
        hora: row.get(2)?,
        motivo: row.get(3)?,
        estado: row.get(4)?,
        mascota,
        servicio,
    })
}

/// Resolves one appointment with its pet, owner and service.
pub fn find_cita_detalle(conn: &Connection, id: i64) -> Result<Option<CitaDetalle>, String> {
    let mut stmt = conn
        .prepare(&format!("{} WHERE c.id = ?1", SELECT_DETALLE))
        .map_err(|e| e.to_string())?;
    let mut rows = stmt
        .query_map([id], row_to_detalle)
        .map_err(|e| e.to_string())?;
    match rows.next() {
        Some(Ok(detalle)) => Ok(Some(detalle)),
        Some(Err(e)) => Err(e.to_string()),
        None => Ok(None),
    }
}

/// All appointments on `fecha` whose status equals `estado` exactly.
/// Result order is whatever SQLite returns; the dispatcher does not rely
/// on it.
pub fn find_citas_by_fecha_estado(
    conn: &Connection,
    fecha: NaiveDate,
    estado: &str,
) -> Result<Vec<CitaDetalle>, String> {
    let mut stmt = conn
        .prepare(&format!(
            "{} WHERE c.fecha = ?1 AND c.estado = ?2",
            SELECT_DETALLE
        ))
        .map_err(|e| e.to_string())?;
    let rows = stmt
        .query_map(rusqlite::params![fecha, estado], row_to_detalle)
        .map_err(|e| e.to_string())?;
    rows.collect::<Result<_, _>>().map_err(|e| e.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::services::owners::save_owner;
    use crate::services::pets::save_pet;
    use common::model::appointment::ESTADO_ACTIVA;
    use common::model::pet::Mascota;
    use rusqlite::params;

    /// Inserts owner + pet + appointment and returns the appointment id.
    /// `telefono: None` seeds an owner without a phone on file.
    pub fn seed_cita(
        conn: &Connection,
        fecha: NaiveDate,
        estado: &str,
        telefono: Option<&str>,
    ) -> i64 {
        let owner = save_owner(
            conn,
            &Propietario {
                id: None,
                rut: None,
                nombre: "Carla Reyes".to_string(),
                telefono: telefono.map(str::to_string),
                email: None,
            },
        )
        .unwrap();
        let pet = save_pet(
            conn,
            &Mascota {
                id: None,
                nombre: "Kira".to_string(),
                especie: Some("Felino".to_string()),
                raza: None,
                fecha_nacimiento: None,
                sexo: Some("Hembra".to_string()),
                propietario_id: owner.id,
            },
        )
        .unwrap();
        conn.execute(
            "INSERT INTO citas (fecha, hora, motivo, estado, mascota_id)
             VALUES (?1, '10:30:00', 'Control anual', ?2, ?3)",
            params![fecha, estado, pet.id],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    pub fn seed_active_cita(conn: &Connection, fecha: NaiveDate, telefono: Option<&str>) -> i64 {
        seed_cita(conn, fecha, ESTADO_ACTIVA, telefono)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::open_test_db;
    use common::model::appointment::{ESTADO_ACTIVA, ESTADO_CANCELADA};

    #[test]
    fn detalle_resolves_pet_owner_and_missing_service() {
        let conn = open_test_db();
        let fecha = NaiveDate::from_ymd_opt(2026, 9, 3).unwrap();
        let id = test_support::seed_active_cita(&conn, fecha, Some("912345678"));

        let detalle = find_cita_detalle(&conn, id).unwrap().unwrap();
        let mascota = detalle.mascota.unwrap();
        assert_eq!(mascota.nombre, "Kira");
        assert_eq!(
            mascota.propietario.unwrap().telefono.as_deref(),
            Some("912345678")
        );
        assert!(detalle.servicio.is_none());
    }

    #[test]
    fn by_fecha_estado_matches_exact_literal() {
        let conn = open_test_db();
        let fecha = NaiveDate::from_ymd_opt(2026, 9, 3).unwrap();
        test_support::seed_cita(&conn, fecha, ESTADO_ACTIVA, Some("912345678"));
        test_support::seed_cita(&conn, fecha, ESTADO_CANCELADA, Some("912345678"));
        // Case differs, must not match.
        test_support::seed_cita(&conn, fecha, "activa", Some("912345678"));

        let citas = find_citas_by_fecha_estado(&conn, fecha, ESTADO_ACTIVA).unwrap();
        assert_eq!(citas.len(), 1);
        assert_eq!(citas[0].estado, ESTADO_ACTIVA);
    }
}
