use serde::{Deserialize, Serialize};

/// A clinic service from the catalog (consultation, vaccination, surgery...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Servicio {
    pub id: Option<i64>,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: Option<f64>,
    /// Duration in minutes.
    pub duracion: Option<i64>,
    #[serde(default = "default_activo")]
    pub activo: bool,
}

fn default_activo() -> bool {
    true
}
