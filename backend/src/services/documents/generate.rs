//! Handler and mapping builders for `POST /api/documentos/generar`.
//!
//! Each certificate kind has its own fixed token set, filled from the
//! request's nested `datosMascota` / `datosPropietario` /
//! `datosFormulario` maps by dotted-path lookup. Missing values fall back
//! to "N/A"; form dates in `YYYY-MM-DD` are reformatted to `dd/MM/yyyy`.
//!
//! Several token spellings are odd on purpose — `{FECHA_CETIFICADO}`,
//! `{EDAD_MASCOYA}`, `{SEXO_MASCOTAS}`, `{NOMBRE_PROPietario}` — they
//! must match the placeholders as they exist inside the template files.
//! The parvovirus template also has `{NOMBRE_PACIENTE}` and
//! `{NOMBRE_MASCOTA}` swapped between its patient and owner sections, so
//! the mapping swaps them back.

use crate::services::documents::engine::{self, TipoDocumento};
use actix_web::{web, HttpResponse, Responder};
use chrono::{Local, NaiveDate};
use common::requests::GenerarDocumentoRequest;
use serde_json::{json, Value};
use std::collections::HashMap;

const DATE_FORMAT: &str = "%d/%m/%Y";

pub(crate) async fn process(payload: web::Json<GenerarDocumentoRequest>) -> impl Responder {
    let request = payload.into_inner();

    let documento_id = match request.documento_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return HttpResponse::BadRequest().body("El ID del documento es requerido"),
    };
    if request.mascota_id.is_none() {
        return HttpResponse::BadRequest().body("El ID de la mascota es requerido");
    }
    let tipo = match TipoDocumento::from_id(&documento_id) {
        Some(tipo) => tipo,
        None => {
            return HttpResponse::BadRequest()
                .body(format!("Tipo de documento no soportado: {}", documento_id))
        }
    };

    let datos = json!({
        "mascotaId": request.mascota_id,
        "propietarioId": request.propietario_id,
        "datosMascota": request.datos_mascota,
        "datosPropietario": request.datos_propietario,
        "datosFormulario": request.datos_formulario,
    });

    match generar_documento(tipo, &datos) {
        Ok(bytes) => {
            let nombre_mascota = get_string(&datos, "datosMascota.nombre", "documento");
            let filename = format!("{}_{}.json", tipo.file_label(), nombre_mascota);
            HttpResponse::Ok()
                .content_type("application/json")
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{}\"", filename),
                ))
                .body(bytes)
        }
        Err(e) => HttpResponse::InternalServerError()
            .body(format!("Error al generar el documento: {}", e)),
    }
}

pub fn generar_documento(tipo: TipoDocumento, datos: &Value) -> Result<Vec<u8>, String> {
    let mapping = build_mapping(tipo, datos);
    let mut doc = engine::load_template(tipo)?;
    engine::render(&mut doc, &mapping)
}

pub fn build_mapping(tipo: TipoDocumento, datos: &Value) -> HashMap<String, String> {
    match tipo {
        TipoDocumento::Parvovirus => parvovirus_mapping(datos),
        TipoDocumento::AutorizacionCirugiaAnestesia => cirugia_anestesia_mapping(datos),
        TipoDocumento::SaludSag => salud_sag_mapping(datos),
        TipoDocumento::Retrovirales => retrovirales_mapping(datos),
        TipoDocumento::SaludClinica => salud_clinica_mapping(datos),
        TipoDocumento::SagIngles => sag_ingles_mapping(datos),
    }
}

fn parvovirus_mapping(datos: &Value) -> HashMap<String, String> {
    let mut m = HashMap::new();
    let nombre_mascota = get_string(datos, "datosMascota.nombre", "N/A");
    let nombre_propietario = get_string(datos, "datosPropietario.nombre", "N/A");

    // The template's placeholders are inverted: {NOMBRE_PACIENTE} sits in
    // the patient section and {NOMBRE_MASCOTA} in the owner section.
    m.insert("{NOMBRE_PACIENTE}".to_string(), nombre_mascota);
    m.insert("{NOMBRE_MASCOTA}".to_string(), nombre_propietario.clone());

    m.insert("{ESPECIE}".to_string(), get_string(datos, "datosMascota.especie", "N/A"));
    m.insert("{RAZA}".to_string(), get_string(datos, "datosMascota.raza", "N/A"));
    m.insert("{EDAD}".to_string(), get_string(datos, "datosMascota.edad", "N/A"));
    m.insert("{SEXO}".to_string(), get_string(datos, "datosMascota.sexo", "N/A"));

    m.insert("{NOMBRE_PROPietario}".to_string(), nombre_propietario.clone());
    m.insert("{PROPIETARIO}".to_string(), nombre_propietario);

    m.insert(
        "{FECHA}".to_string(),
        fecha_o_hoy(datos, "datosFormulario.fecha"),
    );
    m.insert("{NUM_FICHA}".to_string(), numero_ficha(datos));
    m.insert(
        "{DOCTOR_SOLICITANTE}".to_string(),
        get_string(datos, "datosFormulario.doctorSolicitante", "N/A"),
    );
    m
}

fn cirugia_anestesia_mapping(datos: &Value) -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("{PACIENTE}".to_string(), get_string(datos, "datosMascota.nombre", "N/A"));
    m.insert("{ESPECIE}".to_string(), get_string(datos, "datosMascota.especie", "N/A"));
    m.insert("{RAZA}".to_string(), get_string(datos, "datosMascota.raza", "N/A"));
    m.insert("{EDAD}".to_string(), get_string(datos, "datosMascota.edad", "N/A"));
    m.insert("{SEXO}".to_string(), get_string(datos, "datosMascota.sexo", "N/A"));
    m.insert("{COLOR}".to_string(), get_string(datos, "datosFormulario.color", "N/A"));
    m.insert("{PESO}".to_string(), get_string(datos, "datosFormulario.peso", "N/A"));
    m.insert(
        "{PROPIETARIO}".to_string(),
        get_string(datos, "datosPropietario.nombre", "N/A"),
    );
    m.insert("{RUT}".to_string(), get_string(datos, "datosPropietario.rut", "N/A"));
    m.insert("{FONO}".to_string(), get_string(datos, "datosPropietario.telefono", "N/A"));
    m.insert("{CORREO}".to_string(), get_string(datos, "datosPropietario.email", "N/A"));
    m.insert(
        "{DIRECCION}".to_string(),
        get_string(datos, "datosFormulario.direccion", "N/A"),
    );
    m.insert(
        "{FECHA}".to_string(),
        fecha_o_hoy(datos, "datosFormulario.fecha"),
    );
    m
}

fn salud_sag_mapping(datos: &Value) -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("{NOMBRE_MASCOTA}".to_string(), get_string(datos, "datosMascota.nombre", "N/A"));
    m.insert("{ESPECIE_MASCOTA}".to_string(), get_string(datos, "datosMascota.especie", "N/A"));
    m.insert("{RAZA_MASCOTA}".to_string(), get_string(datos, "datosMascota.raza", "N/A"));
    m.insert("{EDAD_MASCOTA}".to_string(), get_string(datos, "datosMascota.edad", "N/A"));
    m.insert("{SEXO_MASCOTA}".to_string(), get_string(datos, "datosMascota.sexo", "N/A"));
    m.insert("{PESO_MASCOTA}".to_string(), get_string(datos, "datosFormulario.peso", "N/A"));
    m.insert("{COLO_MASCOTA}".to_string(), get_string(datos, "datosFormulario.color", "N/A"));
    m.insert(
        "{NUMERO_CHIP}".to_string(),
        get_string(datos, "datosFormulario.numeroChip", "N/A"),
    );
    m.insert(
        "{NOMBRE_PROPIETARIO}".to_string(),
        get_string(datos, "datosPropietario.nombre", "N/A"),
    );
    m.insert(
        "{RUT_PROPIETARIO}".to_string(),
        get_string(datos, "datosPropietario.rut", "N/A"),
    );
    m.insert(
        "{FONO_PROPIETARIO}".to_string(),
        get_string(datos, "datosPropietario.telefono", "N/A"),
    );
    m.insert(
        "{DIRECCION_PROPIETARIO}".to_string(),
        get_string(datos, "datosFormulario.direccion", "N/A"),
    );
    m.insert(
        "{FECHA_CERTIFICADO}".to_string(),
        fecha_o_hoy(datos, "datosFormulario.fechaCertificado"),
    );
    m.insert(
        "{FECHA_INCORPORACION}".to_string(),
        get_opt(datos, "datosFormulario.fechaIncorporacion")
            .map(|f| format_fecha(&f))
            .unwrap_or_else(|| "N/A".to_string()),
    );
    m.insert(
        "{SITIO_INCORPORACION}".to_string(),
        get_string(datos, "datosFormulario.sitioIncorporacion", "N/A"),
    );
    m
}

fn retrovirales_mapping(datos: &Value) -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert(
        "{NOMBRE_PROPIETARIO}".to_string(),
        get_string(datos, "datosPropietario.nombre", "N/A"),
    );
    m.insert("{NOMBRE_MASCOTA}".to_string(), get_string(datos, "datosMascota.nombre", "N/A"));
    m.insert("{ESPECIE_MASCOTA}".to_string(), get_string(datos, "datosMascota.especie", "N/A"));
    m.insert("{RAZA_MASCOTA}".to_string(), get_string(datos, "datosMascota.raza", "N/A"));
    m.insert("{EDAD_MASCOTA}".to_string(), get_string(datos, "datosMascota.edad", "N/A"));
    m.insert("{SEXO_MASCOTAS}".to_string(), get_string(datos, "datosMascota.sexo", "N/A"));
    m.insert(
        "{FECHA_CETIFICADO}".to_string(),
        fecha_o_hoy(datos, "datosFormulario.fechaCertificado"),
    );
    m.insert("{NUMERO_FICHA}".to_string(), numero_ficha(datos));
    m.insert(
        "{NOMBRE_SOLICITANTE}".to_string(),
        get_string(datos, "datosFormulario.nombreSolicitante", "N/A"),
    );
    m
}

fn salud_clinica_mapping(datos: &Value) -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("{NOMBRE_MASCOTA}".to_string(), get_string(datos, "datosMascota.nombre", "N/A"));
    m.insert("{ESPECIE_MASCOTA}".to_string(), get_string(datos, "datosMascota.especie", "N/A"));
    m.insert("{RAZA_MASCOTA}".to_string(), get_string(datos, "datosMascota.raza", "N/A"));
    m.insert("{EDAD_MASCOTA}".to_string(), get_string(datos, "datosMascota.edad", "N/A"));
    m.insert("{SEXO_MASCOTAS}".to_string(), get_string(datos, "datosMascota.sexo", "N/A"));
    m.insert("{PESO_MASCOTA}".to_string(), get_string(datos, "datosFormulario.peso", "N/A"));
    m.insert(
        "{NOMBRE_PROPIETARIO}".to_string(),
        get_string(datos, "datosPropietario.nombre", "N/A"),
    );
    m.insert(
        "{TELEFONO_PROPIETARIO}".to_string(),
        get_string(datos, "datosPropietario.telefono", "N/A"),
    );
    m.insert(
        "{DIRECCION_PROPIETARIO}".to_string(),
        get_string(datos, "datosFormulario.direccion", "N/A"),
    );
    m
}

fn sag_ingles_mapping(datos: &Value) -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("{NOMBRE_MASCOTA}".to_string(), get_string(datos, "datosMascota.nombre", "N/A"));
    m.insert("{ESPECIE}".to_string(), get_string(datos, "datosMascota.especie", "N/A"));
    m.insert("{RAZA}".to_string(), get_string(datos, "datosMascota.raza", "N/A"));
    m.insert("{EDAD_MASCOYA}".to_string(), get_string(datos, "datosMascota.edad", "N/A"));
    m.insert("{SEXO}".to_string(), get_string(datos, "datosMascota.sexo", "N/A"));
    m.insert("{PESO}".to_string(), get_string(datos, "datosFormulario.peso", "N/A"));
    m.insert("{COLOR}".to_string(), get_string(datos, "datosFormulario.color", "N/A"));
    m.insert(
        "{NUMERO_MICROCHIP}".to_string(),
        get_string(datos, "datosFormulario.numeroMicrochip", "N/A"),
    );
    m.insert(
        "{DATE_CHIP}".to_string(),
        get_opt(datos, "datosFormulario.fechaChip")
            .map(|f| format_fecha(&f))
            .unwrap_or_else(|| "N/A".to_string()),
    );
    m.insert(
        "{SITIO_CHIP}".to_string(),
        get_string(datos, "datosFormulario.sitioChip", "N/A"),
    );
    m.insert(
        "{NOMBRE_PROPIETARIO}".to_string(),
        get_string(datos, "datosPropietario.nombre", "N/A"),
    );
    m.insert("{RUT}".to_string(), get_string(datos, "datosPropietario.rut", "N/A"));
    m.insert(
        "{DIRECCION}".to_string(),
        get_string(datos, "datosFormulario.direccion", "N/A"),
    );
    m.insert("{NUMERO}".to_string(), get_string(datos, "datosPropietario.telefono", "N/A"));
    m
}

/// Dotted-path lookup into the nested request data. Numbers and booleans
/// are rendered as their plain string form.
fn get_opt(datos: &Value, path: &str) -> Option<String> {
    let mut current = datos;
    for parte in path.split('.') {
        current = current.get(parte)?;
    }
    match current {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        otro => Some(otro.to_string()),
    }
}

fn get_string(datos: &Value, path: &str, default: &str) -> String {
    get_opt(datos, path).unwrap_or_else(|| default.to_string())
}

/// Form value when given, today's date otherwise, always `dd/MM/yyyy`.
fn fecha_o_hoy(datos: &Value, path: &str) -> String {
    match get_opt(datos, path) {
        Some(fecha) => format_fecha(&fecha),
        None => Local::now().date_naive().format(DATE_FORMAT).to_string(),
    }
}

/// Form ficha number, falling back to the pet id.
fn numero_ficha(datos: &Value) -> String {
    get_opt(datos, "datosFormulario.numFicha")
        .or_else(|| get_opt(datos, "mascotaId"))
        .unwrap_or_else(|| "N/A".to_string())
}

/// `YYYY-MM-DD` becomes `dd/MM/yyyy`; anything else passes through.
fn format_fecha(fecha: &str) -> String {
    if fecha.len() == 10 && fecha.contains('-') {
        if let Ok(date) = NaiveDate::parse_from_str(fecha, "%Y-%m-%d") {
            return date.format(DATE_FORMAT).to_string();
        }
    }
    fecha.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datos() -> Value {
        json!({
            "mascotaId": 7,
            "datosMascota": {"nombre": "Kira", "especie": "Felino", "edad": 3},
            "datosPropietario": {"nombre": "Carla Reyes", "rut": "12.345.678-9"},
            "datosFormulario": {"fecha": "2026-09-03", "peso": "4,2 kg"}
        })
    }

    #[test]
    fn get_string_walks_nested_paths_and_defaults() {
        let d = datos();
        assert_eq!(get_string(&d, "datosMascota.nombre", "N/A"), "Kira");
        assert_eq!(get_string(&d, "datosMascota.edad", "N/A"), "3");
        assert_eq!(get_string(&d, "datosMascota.raza", "N/A"), "N/A");
        assert_eq!(get_string(&d, "datosFormulario.color", "N/A"), "N/A");
    }

    #[test]
    fn format_fecha_handles_iso_and_passthrough() {
        assert_eq!(format_fecha("2026-09-03"), "03/09/2026");
        assert_eq!(format_fecha("03/09/2026"), "03/09/2026");
        assert_eq!(format_fecha("mañana"), "mañana");
    }

    #[test]
    fn parvovirus_mapping_swaps_patient_and_owner() {
        let m = parvovirus_mapping(&datos());
        assert_eq!(m["{NOMBRE_PACIENTE}"], "Kira");
        assert_eq!(m["{NOMBRE_MASCOTA}"], "Carla Reyes");
        assert_eq!(m["{FECHA}"], "03/09/2026");
        // numFicha missing, falls back to the pet id.
        assert_eq!(m["{NUM_FICHA}"], "7");
    }

    #[test]
    fn retrovirales_mapping_keeps_template_typos() {
        let m = retrovirales_mapping(&datos());
        assert!(m.contains_key("{FECHA_CETIFICADO}"));
        assert!(m.contains_key("{SEXO_MASCOTAS}"));
    }

    #[test]
    fn generar_documento_end_to_end() {
        let bytes = generar_documento(TipoDocumento::SaludSag, &datos()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Kira"));
        assert!(!text.contains("{NOMBRE_MASCOTA}"));
    }
}
