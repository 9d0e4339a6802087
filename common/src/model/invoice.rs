use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Honorario {
    pub id: Option<i64>,
    pub cita_id: Option<i64>,
    pub propietario_id: Option<i64>,
    pub fecha_emision: Option<NaiveDateTime>,
    pub total: f64,
    pub detalle: Option<String>,
    #[serde(default)]
    pub pagado: bool,
}
