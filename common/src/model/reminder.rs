use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A WhatsApp reminder row. One per appointment, enforced by an existence
/// check in the dispatcher rather than a UNIQUE constraint; the row is
/// inserted unsent before the delivery attempt so a hung or failed send
/// still leaves a trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recordatorio {
    pub id: Option<i64>,
    pub cita_id: i64,
    pub numero_whatsapp: String,
    pub fecha_envio: NaiveDateTime,
    pub enviado: bool,
    pub mensaje_enviado: Option<String>,
    pub error: Option<String>,
    pub fecha_creacion: NaiveDateTime,
}
