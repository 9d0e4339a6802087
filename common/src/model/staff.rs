use serde::{Deserialize, Serialize};

/// A clinic staff member. Veterinarians are staff rows with the
/// corresponding `cargo`; appointments reference them by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personal {
    pub id: Option<i64>,
    pub nombre: String,
    pub rut: Option<String>,
    pub cargo: Option<String>,
    pub especialidad: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    #[serde(default = "default_activo")]
    pub activo: bool,
}

fn default_activo() -> bool {
    true
}
