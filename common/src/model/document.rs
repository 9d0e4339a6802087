use serde::{Deserialize, Serialize};

/// In-memory tree for a certificate template: body paragraphs, body
/// tables, and per-header/per-footer paragraph and table sets. Templates
/// are deserialized from the embedded resources, mutated in place by the
/// substitution engine, and serialized back to bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Documento {
    #[serde(default)]
    pub parrafos: Vec<Parrafo>,
    #[serde(default)]
    pub tablas: Vec<Tabla>,
    #[serde(default)]
    pub encabezados: Vec<Seccion>,
    #[serde(default)]
    pub pies: Vec<Seccion>,
}

/// A header or footer: its own paragraphs and tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seccion {
    #[serde(default)]
    pub parrafos: Vec<Parrafo>,
    #[serde(default)]
    pub tablas: Vec<Tabla>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tabla {
    #[serde(default)]
    pub filas: Vec<Fila>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fila {
    #[serde(default)]
    pub celdas: Vec<Celda>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Celda {
    #[serde(default)]
    pub parrafos: Vec<Parrafo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parrafo {
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Parrafo {
    /// The paragraph's full text: all run texts concatenated in order.
    pub fn texto(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A styled text run. Formatting fields are optional; absent means
/// "inherit from the paragraph style", as in the source templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negrita: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursiva: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tamano_fuente: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuente: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
