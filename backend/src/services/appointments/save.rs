//! Create/update handler for `POST /api/citas`.

use crate::state::AppState;
use crate::storage;
use actix_web::{web, HttpResponse, Responder};
use common::model::appointment::{Cita, ESTADO_ACTIVA, ESTADO_CANCELADA, ESTADO_COMPLETADA};
use rusqlite::{params, Connection};

pub(crate) async fn process(state: web::Data<AppState>, payload: web::Json<Cita>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    if let Err(msg) = validate(&conn, &payload) {
        return HttpResponse::BadRequest().body(msg);
    }
    match save_cita(&conn, &payload) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

fn validate(conn: &Connection, cita: &Cita) -> Result<(), String> {
    const ESTADOS: [&str; 3] = [ESTADO_ACTIVA, ESTADO_COMPLETADA, ESTADO_CANCELADA];
    if !ESTADOS.contains(&cita.estado.as_str()) {
        return Err(format!("Estado de cita no válido: {}", cita.estado));
    }
    if !storage::exists(conn, "mascotas", cita.mascota_id)? {
        return Err("La mascota indicada no existe".to_string());
    }
    if let Some(vet_id) = cita.veterinario_id {
        if !storage::exists(conn, "personal", vet_id)? {
            return Err("El veterinario indicado no existe".to_string());
        }
    }
    if let Some(service_id) = cita.servicio_id {
        if !storage::exists(conn, "servicios", service_id)? {
            return Err("El servicio indicado no existe".to_string());
        }
    }
    Ok(())
}

pub fn save_cita(conn: &Connection, cita: &Cita) -> Result<Cita, String> {
    let mut saved = cita.clone();
    match cita.id {
        Some(id) => {
            if !storage::exists(conn, "citas", id)? {
                return Err("Cita no encontrada".to_string());
            }
            conn.execute(
                "UPDATE citas SET fecha = ?1, hora = ?2, motivo = ?3, diagnostico = ?4,
                 tratamiento = ?5, estado = ?6, mascota_id = ?7, veterinario_id = ?8,
                 servicio_id = ?9 WHERE id = ?10",
                params![
                    cita.fecha,
                    cita.hora,
                    cita.motivo,
                    cita.diagnostico,
                    cita.tratamiento,
                    cita.estado,
                    cita.mascota_id,
                    cita.veterinario_id,
                    cita.servicio_id,
                    id
                ],
            )
            .map_err(|e| e.to_string())?;
        }
        None => {
            conn.execute(
                "INSERT INTO citas (fecha, hora, motivo, diagnostico, tratamiento, estado,
                 mascota_id, veterinario_id, servicio_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    cita.fecha,
                    cita.hora,
                    cita.motivo,
                    cita.diagnostico,
                    cita.tratamiento,
                    cita.estado,
                    cita.mascota_id,
                    cita.veterinario_id,
                    cita.servicio_id
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
    use crate::services::pets::save_pet;
    use crate::storage::open_test_db;
    use chrono::NaiveDate;
    use common::model::pet::Mascota;

    #[test]
    fn validate_rejects_unknown_pet() {
        let conn = open_test_db();
        let cita = Cita {
            id: None,
            fecha: NaiveDate::from_ymd_opt(2026, 9, 3).unwrap(),
            hora: None,
            motivo: None,
            diagnostico: None,
            tratamiento: None,
            estado: ESTADO_ACTIVA.to_string(),
            mascota_id: 42,
            veterinario_id: None,
            servicio_id: None,
        };
        assert!(validate(&conn, &cita).unwrap_err().contains("mascota"));
    }

    #[test]
    fn save_roundtrips() {
        let conn = open_test_db();
        let pet = save_pet(
            &conn,
            &Mascota {
                id: None,
                nombre: "Rocky".to_string(),
                especie: None,
                raza: None,
                fecha_nacimiento: None,
                sexo: None,
                propietario_id: None,
            },
        )
        .unwrap();
        let cita = Cita {
            id: None,
            fecha: NaiveDate::from_ymd_opt(2026, 9, 3).unwrap(),
            hora: None,
            motivo: Some("Vacuna".to_string()),
            diagnostico: None,
            tratamiento: None,
            estado: ESTADO_ACTIVA.to_string(),
            mascota_id: pet.id.unwrap(),
            veterinario_id: None,
            servicio_id: None,
        };
        let saved = save_cita(&conn, &cita).unwrap();
        assert!(saved.id.is_some());
        let found = crate::services::appointments::find_cita(&conn, saved.id.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(found.motivo.as_deref(), Some("Vacuna"));
    }
}
