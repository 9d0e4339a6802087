//! Placeholder substitution over certificate templates.
//!
//! A template is a `Documento` tree (body paragraphs, body tables, header
//! and footer sections) embedded in the binary. Matching happens on the
//! paragraph's merged text, so a token split across several runs is still
//! found; when a paragraph changes, its runs collapse into a single run
//! that keeps only the first original run's formatting.

use common::model::document::{Documento, Parrafo, Seccion, Tabla};
use include_dir::{include_dir, Dir};
use std::collections::HashMap;

static TEMPLATE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/templates/documentos");

/// The six supported certificate kinds, each bound to one embedded
/// template resource and one fixed token set (built in `generate.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoDocumento {
    Parvovirus,
    AutorizacionCirugiaAnestesia,
    SaludSag,
    Retrovirales,
    SaludClinica,
    SagIngles,
}

impl TipoDocumento {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "certificado-parvovirus" => Some(Self::Parvovirus),
            "certificado-autorizacion-cirugia-anestesia" => {
                Some(Self::AutorizacionCirugiaAnestesia)
            }
            "certificado-salud-sag" => Some(Self::SaludSag),
            "certificado-retrovirales" => Some(Self::Retrovirales),
            "certificado-salud-clinica" => Some(Self::SaludClinica),
            "certificado-sag-ingles" => Some(Self::SagIngles),
            _ => None,
        }
    }

    pub fn template_file(&self) -> &'static str {
        match self {
            Self::Parvovirus => "certificado-parvovirus.json",
            Self::AutorizacionCirugiaAnestesia => "autorizacion-cirugia-anestesia.json",
            Self::SaludSag => "certificado-salud-sag.json",
            Self::Retrovirales => "certificado-retrovirales.json",
            Self::SaludClinica => "certificado-salud-clinica.json",
            Self::SagIngles => "certificado-sag-ingles.json",
        }
    }

    /// Prefix for the download filename.
    pub fn file_label(&self) -> &'static str {
        match self {
            Self::Parvovirus => "Certificado_Parvovirus",
            Self::AutorizacionCirugiaAnestesia => "Certificado_Autorizacion_Cirugia_Anestesia",
            Self::SaludSag => "Certificado_Salud_SAG",
            Self::Retrovirales => "Certificado_Retrovirales",
            Self::SaludClinica => "Certificado_Salud",
            Self::SagIngles => "Certificado_SAG_Ingles",
        }
    }
}

/// Loads the embedded template for `tipo`. A missing or unparsable
/// resource is fatal to the generation request.
pub fn load_template(tipo: TipoDocumento) -> Result<Documento, String> {
    let name = tipo.template_file();
    let file = TEMPLATE_DIR
        .get_file(name)
        .ok_or_else(|| format!("No se encontró la plantilla: {}", name))?;
    serde_json::from_slice(file.contents())
        .map_err(|e| format!("Plantilla inválida {}: {}", name, e))
}

/// Applies the mapping in place and serializes the document to bytes.
pub fn render(doc: &mut Documento, mapping: &HashMap<String, String>) -> Result<Vec<u8>, String> {
    substitute_document(doc, mapping);
    serde_json::to_vec_pretty(doc).map_err(|e| e.to_string())
}

/// Body paragraphs, body tables, then every header and footer.
pub fn substitute_document(doc: &mut Documento, mapping: &HashMap<String, String>) {
    substitute_in_paragraphs(&mut doc.parrafos, mapping);
    substitute_in_tables(&mut doc.tablas, mapping);
    for seccion in doc.encabezados.iter_mut().chain(doc.pies.iter_mut()) {
        substitute_in_section(seccion, mapping);
    }
}

fn substitute_in_section(seccion: &mut Seccion, mapping: &HashMap<String, String>) {
    substitute_in_paragraphs(&mut seccion.parrafos, mapping);
    substitute_in_tables(&mut seccion.tablas, mapping);
}

fn substitute_in_tables(tablas: &mut [Tabla], mapping: &HashMap<String, String>) {
    for tabla in tablas {
        for fila in &mut tabla.filas {
            for celda in &mut fila.celdas {
                substitute_in_paragraphs(&mut celda.parrafos, mapping);
            }
        }
    }
}

fn substitute_in_paragraphs(parrafos: &mut [Parrafo], mapping: &HashMap<String, String>) {
    for parrafo in parrafos {
        substitute_in_paragraph(parrafo, mapping);
    }
}

/// Replaces every occurrence of every token in the paragraph's merged
/// text. Untouched paragraphs keep their runs byte for byte; a changed
/// paragraph ends up with a single run carrying the first original run's
/// formatting. Unmapped tokens stay as literal text.
fn substitute_in_paragraph(parrafo: &mut Parrafo, mapping: &HashMap<String, String>) {
    let texto = parrafo.texto();
    if !mapping.keys().any(|token| texto.contains(token.as_str())) {
        return;
    }

    let mut reemplazado = texto.clone();
    for (token, valor) in mapping {
        reemplazado = reemplazado.replace(token.as_str(), valor);
    }
    if reemplazado == texto {
        return;
    }

    let formato = parrafo.runs.first().cloned();
    parrafo.runs.clear();
    let mut run = formato.unwrap_or_default();
    run.text = reemplazado;
    parrafo.runs.push(run);
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::document::Run;

    fn run(text: &str) -> Run {
        Run {
            text: text.to_string(),
            ..Run::default()
        }
    }

    fn bold_run(text: &str) -> Run {
        Run {
            text: text.to_string(),
            negrita: Some(true),
            fuente: Some("Arial".to_string()),
            tamano_fuente: Some(11),
            ..Run::default()
        }
    }

    fn mapping(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn untouched_paragraph_keeps_all_runs_and_formatting() {
        let mut parrafo = Parrafo {
            runs: vec![bold_run("Sin "), run("placeholders "), bold_run("aquí")],
        };
        let original = parrafo.clone();
        substitute_in_paragraph(&mut parrafo, &mapping(&[("{PACIENTE}", "Kira")]));
        assert_eq!(parrafo.runs.len(), 3);
        for (a, b) in parrafo.runs.iter().zip(original.runs.iter()) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.negrita, b.negrita);
            assert_eq!(a.fuente, b.fuente);
        }
    }

    #[test]
    fn token_split_across_runs_is_still_replaced() {
        let mut parrafo = Parrafo {
            runs: vec![bold_run("Paciente: {NOMBRE_"), run("MASCOTA}")],
        };
        substitute_in_paragraph(&mut parrafo, &mapping(&[("{NOMBRE_MASCOTA}", "Kira")]));
        assert_eq!(parrafo.runs.len(), 1);
        assert_eq!(parrafo.runs[0].text, "Paciente: Kira");
        // Only the first run's formatting survives.
        assert_eq!(parrafo.runs[0].negrita, Some(true));
        assert_eq!(parrafo.runs[0].fuente.as_deref(), Some("Arial"));
    }

    #[test]
    fn every_occurrence_of_every_token_is_replaced() {
        let mut parrafo = Parrafo {
            runs: vec![run("{A} y {B}, de nuevo {A}")],
        };
        substitute_in_paragraph(&mut parrafo, &mapping(&[("{A}", "uno"), ("{B}", "dos")]));
        assert_eq!(parrafo.runs[0].text, "uno y dos, de nuevo uno");
    }

    #[test]
    fn unmapped_tokens_stay_as_literal_text() {
        let mut parrafo = Parrafo {
            runs: vec![run("{CONOCIDO} y {DESCONOCIDO}")],
        };
        substitute_in_paragraph(&mut parrafo, &mapping(&[("{CONOCIDO}", "ok")]));
        assert_eq!(parrafo.runs[0].text, "ok y {DESCONOCIDO}");
    }

    #[test]
    fn tables_headers_and_footers_are_traversed() {
        let tipo = TipoDocumento::SaludSag;
        let mut doc = load_template(tipo).unwrap();
        let m = mapping(&[("{NOMBRE_MASCOTA}", "Kira"), ("{NOMBRE_PROPIETARIO}", "Carla")]);
        substitute_document(&mut doc, &m);

        let all_text: String = doc
            .parrafos
            .iter()
            .chain(doc.tablas.iter().flat_map(|t| {
                t.filas
                    .iter()
                    .flat_map(|f| f.celdas.iter().flat_map(|c| c.parrafos.iter()))
            }))
            .chain(
                doc.encabezados
                    .iter()
                    .chain(doc.pies.iter())
                    .flat_map(|s| s.parrafos.iter()),
            )
            .map(|p| p.texto())
            .collect();
        assert!(!all_text.contains("{NOMBRE_MASCOTA}"));
        assert!(!all_text.contains("{NOMBRE_PROPIETARIO}"));
        assert!(all_text.contains("Kira"));
    }

    #[test]
    fn all_six_templates_load() {
        for tipo in [
            TipoDocumento::Parvovirus,
            TipoDocumento::AutorizacionCirugiaAnestesia,
            TipoDocumento::SaludSag,
            TipoDocumento::Retrovirales,
            TipoDocumento::SaludClinica,
            TipoDocumento::SagIngles,
        ] {
            let doc = load_template(tipo).unwrap();
            assert!(!doc.parrafos.is_empty(), "{:?}", tipo);
        }
    }

    #[test]
    fn render_output_reflects_substitution() {
        let mut doc = load_template(TipoDocumento::Parvovirus).unwrap();
        let bytes = render(&mut doc, &mapping(&[("{NOMBRE_PACIENTE}", "Firulais")])).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Firulais"));
        assert!(!text.contains("{NOMBRE_PACIENTE}"));
    }
}
