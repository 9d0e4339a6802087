use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producto {
    pub id: Option<i64>,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: Option<f64>,
    #[serde(default)]
    pub stock: i64,
    pub categoria: Option<String>,
    #[serde(default = "default_activo")]
    pub activo: bool,
}

fn default_activo() -> bool {
    true
}

/// A stock movement. Applying one adjusts the product's `stock` inside the
/// same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovimientoInventario {
    pub id: Option<i64>,
    /// Taken from the URL path by the movement endpoints; optional in the
    /// request body.
    #[serde(default)]
    pub producto_id: i64,
    /// "entrada" or "salida".
    pub tipo: String,
    pub cantidad: i64,
    pub nota: Option<String>,
    pub fecha: Option<NaiveDateTime>,
}
