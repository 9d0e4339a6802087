use serde::Deserialize;
use serde_json::Value;

/// Request payload for `POST /api/documentos/generar`. The three `datos_*`
/// maps arrive as free-form JSON from the intake form; the mapping
/// builders look values up by dotted path and fall back to "N/A".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerarDocumentoRequest {
    pub documento_id: Option<String>,
    pub mascota_id: Option<i64>,
    pub propietario_id: Option<i64>,
    pub datos_mascota: Option<Value>,
    pub datos_propietario: Option<Value>,
    pub datos_formulario: Option<Value>,
}

/// Request payload for the WhatsApp test-send endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbarEnvioRequest {
    pub numero: String,
    pub mensaje: Option<String>,
}
