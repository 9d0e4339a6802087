use crate::model::pet::MascotaDetalle;
use crate::model::service::Servicio;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Appointment status literals stored in the database. The reminder
/// eligibility query matches `ESTADO_ACTIVA` exactly (case-sensitive).
pub const ESTADO_ACTIVA: &str = "Activa";
pub const ESTADO_COMPLETADA: &str = "Completada";
pub const ESTADO_CANCELADA: &str = "Cancelada";

/// An appointment as stored, with plain foreign keys. This is the shape
/// the CRUD endpoints accept and return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cita {
    pub id: Option<i64>,
    pub fecha: NaiveDate,
    pub hora: Option<NaiveTime>,
    pub motivo: Option<String>,
    pub diagnostico: Option<String>,
    pub tratamiento: Option<String>,
    #[serde(default = "default_estado")]
    pub estado: String,
    pub mascota_id: i64,
    pub veterinario_id: Option<i64>,
    pub servicio_id: Option<i64>,
}

fn default_estado() -> String {
    ESTADO_ACTIVA.to_string()
}

/// An appointment with its pet (and owner) and service resolved, as the
/// reminder dispatcher and the message formatter consume it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitaDetalle {
    pub id: i64,
    pub fecha: NaiveDate,
    pub hora: Option<NaiveTime>,
    pub motivo: Option<String>,
    pub estado: String,
    pub mascota: Option<MascotaDetalle>,
    pub servicio: Option<Servicio>,
}
