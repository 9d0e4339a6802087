//! Reminder message text.

use chrono::{Datelike, NaiveDate};
use common::model::appointment::CitaDetalle;

const DIAS: [&str; 7] = [
    "lunes",
    "martes",
    "miércoles",
    "jueves",
    "viernes",
    "sábado",
    "domingo",
];

const MESES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// "jueves, 3 de septiembre de 2026"
pub fn fecha_larga(fecha: NaiveDate) -> String {
    format!(
        "{}, {} de {} de {}",
        DIAS[fecha.weekday().num_days_from_monday() as usize],
        fecha.day(),
        MESES[fecha.month0() as usize],
        fecha.year()
    )
}

/// Builds the WhatsApp reminder body. Lines for the owner greeting, the
/// service and the reason only appear when the data is on file; a
/// whitespace-only reason counts as absent.
pub fn format_reminder(cita: &CitaDetalle) -> String {
    let mut mensaje = String::from("🐾 *Recordatorio de Cita Veterinaria* 🐾\n\n");

    let propietario = cita
        .mascota
        .as_ref()
        .and_then(|m| m.propietario.as_ref())
        .map(|p| p.nombre.as_str());
    if let Some(nombre) = propietario {
        mensaje.push_str(&format!("¡Hola {}!\n\n", nombre));
    }

    match cita.mascota.as_ref() {
        Some(mascota) => mensaje.push_str(&format!(
            "Te recordamos que *{}* tiene una cita mañana en la clínica.\n\n",
            mascota.nombre
        )),
        None => mensaje.push_str("Te recordamos que tienes una cita mañana en la clínica.\n\n"),
    }

    mensaje.push_str(&format!("📅 *Fecha:* {}\n", fecha_larga(cita.fecha)));
    if let Some(hora) = cita.hora {
        mensaje.push_str(&format!("⏰ *Hora:* {} hrs\n", hora.format("%H:%M")));
    }
    if let Some(servicio) = cita.servicio.as_ref() {
        mensaje.push_str(&format!("🩺 *Servicio:* {}\n", servicio.nombre));
    }
    let motivo = cita
        .motivo
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());
    if let Some(motivo) = motivo {
        mensaje.push_str(&format!("📝 *Motivo:* {}\n", motivo));
    }

    mensaje.push_str("\nPor favor llega 10 minutos antes de tu hora.\n");
    mensaje.push_str("Si necesitas reagendar, responde este mensaje.\n\n");
    mensaje.push_str("¡Te esperamos! 🏥");
    mensaje
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::owner::Propietario;
    use common::model::pet::MascotaDetalle;
    use common::model::appointment::ESTADO_ACTIVA;
    use chrono::NaiveTime;

    fn cita_completa() -> CitaDetalle {
        CitaDetalle {
            id: 1,
            fecha: NaiveDate::from_ymd_opt(2026, 9, 3).unwrap(),
            hora: Some(NaiveTime::from_hms_opt(10, 30, 0).unwrap()),
            motivo: Some("Control anual".to_string()),
            estado: ESTADO_ACTIVA.to_string(),
            mascota: Some(MascotaDetalle {
                id: 1,
                nombre: "Kira".to_string(),
                propietario: Some(Propietario {
                    id: Some(1),
                    rut: None,
                    nombre: "Carla Reyes".to_string(),
                    telefono: Some("912345678".to_string()),
                    email: None,
                }),
            }),
            servicio: None,
        }
    }

    #[test]
    fn long_date_is_localized() {
        assert_eq!(
            fecha_larga(NaiveDate::from_ymd_opt(2026, 9, 3).unwrap()),
            "jueves, 3 de septiembre de 2026"
        );
    }

    #[test]
    fn full_message_has_all_lines() {
        let mensaje = format_reminder(&cita_completa());
        assert!(mensaje.contains("¡Hola Carla Reyes!"));
        assert!(mensaje.contains("*Kira*"));
        assert!(mensaje.contains("📅 *Fecha:* jueves, 3 de septiembre de 2026"));
        assert!(mensaje.contains("⏰ *Hora:* 10:30 hrs"));
        assert!(mensaje.contains("📝 *Motivo:* Control anual"));
    }

    #[test]
    fn blank_reason_omits_the_reason_line() {
        let mut cita = cita_completa();
        cita.motivo = Some("   ".to_string());
        let mensaje = format_reminder(&cita);
        assert!(!mensaje.contains("*Motivo:*"));

        cita.motivo = Some("  Control anual  ".to_string());
        let mensaje = format_reminder(&cita);
        assert!(mensaje.contains("📝 *Motivo:* Control anual\n"));
    }

    #[test]
    fn missing_data_omits_its_lines() {
        let mut cita = cita_completa();
        cita.hora = None;
        cita.motivo = None;
        cita.mascota = None;
        let mensaje = format_reminder(&cita);
        assert!(!mensaje.contains("¡Hola"));
        assert!(!mensaje.contains("*Hora:*"));
        assert!(!mensaje.contains("*Motivo:*"));
        assert!(!mensaje.contains("*Servicio:*"));
        assert!(mensaje.contains("tienes una cita mañana"));
    }
}
