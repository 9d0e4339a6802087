use serde::{Deserialize, Serialize};

/// A pet owner. `rut` is the Chilean national identifier used on
/// certificates; `telefono` is the WhatsApp destination for reminders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Propietario {
    pub id: Option<i64>,
    pub rut: Option<String>,
    pub nombre: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
}
