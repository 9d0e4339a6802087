use crate::model::owner::Propietario;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mascota {
    pub id: Option<i64>,
    pub nombre: String,
    pub especie: Option<String>,
    pub raza: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub sexo: Option<String>,
    pub propietario_id: Option<i64>,
}

/// A pet together with its resolved owner, as the reminder pipeline and
/// the pending-appointments endpoint need it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MascotaDetalle {
    pub id: i64,
    pub nombre: String,
    pub propietario: Option<Propietario>,
}
