//! Reminder dispatch: finds tomorrow's active appointments and sends one
//! WhatsApp reminder per appointment, at most once.
//!
//! Idempotence rests on the existence check against
//! `recordatorios_whatsapp`, not on a unique constraint: a record is
//! inserted as unsent before the gateway is called, so a crash mid-send
//! leaves a visible unsent record instead of a silent duplicate on the
//! next run.

use crate::services::appointments::find_citas_by_fecha_estado;
use crate::services::reminders::message;
use crate::services::reminders::whatsapp::{normalize_whatsapp_number, Messenger};
use chrono::{DateTime, Duration, Local};
use common::dispatch::{ResultadoCandidato, ResumenEnvio};
use common::model::appointment::{CitaDetalle, ESTADO_ACTIVA};
use common::model::reminder::Recordatorio;
use log::info;
use rusqlite::{params, Connection};

pub const LEAD_TIME_DAYS: i64 = 1;

pub const ERROR_ENVIO: &str = "Error al enviar mensaje de WhatsApp";

/// Appointments due a reminder as of `now`: dated exactly `LEAD_TIME_DAYS`
/// ahead and still literally `Activa`.
pub fn eligible(conn: &Connection, now: DateTime<Local>) -> Result<Vec<CitaDetalle>, String> {
    let objetivo = now.date_naive() + Duration::days(LEAD_TIME_DAYS);
    find_citas_by_fecha_estado(conn, objetivo, ESTADO_ACTIVA)
}

/// Every reminder record, newest first.
pub fn list_reminders(conn: &Connection) -> Result<Vec<Recordatorio>, String> {
    let mut stmt = conn
        .prepare(
            "SELECT id, cita_id, numero_whatsapp, fecha_envio, enviado, mensaje_enviado,
             error, fecha_creacion FROM recordatorios_whatsapp ORDER BY fecha_creacion DESC",
        )
        .map_err(|e| e.to_string())?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Recordatorio {
                id: row.get(0)?,
                cita_id: row.get(1)?,
                numero_whatsapp: row.get(2)?,
                fecha_envio: row.get(3)?,
                enviado: row.get(4)?,
                mensaje_enviado: row.get(5)?,
                error: row.get(6)?,
                fecha_creacion: row.get(7)?,
            })
        })
        .map_err(|e| e.to_string())?;
    rows.collect::<Result<_, _>>().map_err(|e| e.to_string())
}

pub fn reminder_exists(conn: &Connection, cita_id: i64) -> Result<bool, String> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM recordatorios_whatsapp WHERE cita_id = ?1)",
        [cita_id],
        |row| row.get(0),
    )
    .map_err(|e| e.to_string())
}

/// One full dispatch run. Every candidate produces exactly one result;
/// a failure on one candidate never stops the rest.
pub async fn run_dispatch(
    conn: &Connection,
    gateway: &dyn Messenger,
    now: DateTime<Local>,
) -> ResumenEnvio {
    if !gateway.enabled() {
        info!("Servicio de WhatsApp deshabilitado, se omite el envío de recordatorios");
        return ResumenEnvio::deshabilitado();
    }

    let mut resumen = ResumenEnvio {
        habilitado: true,
        ..Default::default()
    };
    let candidatos = match eligible(conn, now) {
        Ok(citas) => citas,
        Err(e) => {
            resumen.error = Some(e);
            return resumen;
        }
    };

    for cita in candidatos {
        let cita_id = cita.id;
        let resultado = match process_candidate(conn, gateway, &cita, now).await {
            Ok(resultado) => resultado,
            Err(e) => ResultadoCandidato::Fallido { cita_id, error: e },
        };
        resumen.resultados.push(resultado);
    }

    info!(
        "Proceso de recordatorios completado. Enviados: {}, fallidos: {}",
        resumen.enviados(),
        resumen.fallidos()
    );
    resumen
}

async fn process_candidate(
    conn: &Connection,
    gateway: &dyn Messenger,
    cita: &CitaDetalle,
    now: DateTime<Local>,
) -> Result<ResultadoCandidato, String> {
    let cita_id = cita.id;

    if reminder_exists(conn, cita_id)? {
        return Ok(ResultadoCandidato::Omitido {
            cita_id,
            motivo: "Ya existe un recordatorio para esta cita".to_string(),
        });
    }

    let telefono = cita
        .mascota
        .as_ref()
        .and_then(|m| m.propietario.as_ref())
        .and_then(|p| p.telefono.as_deref());
    let telefono = match telefono {
        Some(t) if !t.trim().is_empty() => t,
        _ => {
            return Ok(ResultadoCandidato::Omitido {
                cita_id,
                motivo: "El propietario no tiene número de teléfono".to_string(),
            })
        }
    };
    let numero = normalize_whatsapp_number(telefono)?;

    // The record goes in as unsent before the gateway is called.
    conn.execute(
        "INSERT INTO recordatorios_whatsapp (cita_id, numero_whatsapp, fecha_envio, fecha_creacion)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            cita_id,
            numero,
            now.naive_local(),
            now.naive_local()
        ],
    )
    .map_err(|e| e.to_string())?;
    let record_id = conn.last_insert_rowid();

    let mensaje = message::format_reminder(cita);
    conn.execute(
        "UPDATE recordatorios_whatsapp SET mensaje_enviado = ?1 WHERE id = ?2",
        params![mensaje, record_id],
    )
    .map_err(|e| e.to_string())?;

    if gateway.send(&numero, &mensaje).await {
        conn.execute(
            "UPDATE recordatorios_whatsapp SET enviado = 1 WHERE id = ?1",
            [record_id],
        )
        .map_err(|e| e.to_string())?;
        Ok(ResultadoCandidato::Enviado { cita_id })
    } else {
        conn.execute(
            "UPDATE recordatorios_whatsapp SET error = ?1 WHERE id = ?2",
            params![ERROR_ENVIO, record_id],
        )
        .map_err(|e| e.to_string())?;
        Ok(ResultadoCandidato::Fallido {
            cita_id,
            error: ERROR_ENVIO.to_string(),
        })
    }
}

/// Manual send for one appointment, regardless of date or existing
/// reminders; no record is created. Returns whether the gateway accepted
/// the message.
pub async fn send_reminder_manually(
    conn: &Connection,
    gateway: &dyn Messenger,
    cita_id: i64,
) -> Result<bool, String> {
    let cita = crate::services::appointments::find_cita_detalle(conn, cita_id)?
        .ok_or_else(|| "Cita no encontrada".to_string())?;
    let telefono = cita
        .mascota
        .as_ref()
        .and_then(|m| m.propietario.as_ref())
        .and_then(|p| p.telefono.as_deref())
        .ok_or_else(|| "El propietario no tiene número de teléfono".to_string())?;
    let numero = normalize_whatsapp_number(telefono)?;
    let mensaje = message::format_reminder(&cita);
    Ok(gateway.send(&numero, &mensaje).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::appointments::test_support::{seed_active_cita, seed_cita};
    use crate::storage::open_test_db;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use common::model::appointment::ESTADO_CANCELADA;
    use std::sync::Mutex;

    struct MockMessenger {
        enabled: bool,
        accepts: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl MockMessenger {
        fn new() -> Self {
            Self {
                enabled: true,
                accepts: true,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Messenger for MockMessenger {
        fn enabled(&self) -> bool {
            self.enabled
        }

        async fn send(&self, to: &str, body: &str) -> bool {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            self.accepts
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 9, 2, 9, 0, 0).unwrap()
    }

    fn manana() -> chrono::NaiveDate {
        now().date_naive() + Duration::days(1)
    }

    fn record_count(conn: &Connection, cita_id: i64) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM recordatorios_whatsapp WHERE cita_id = ?1",
            [cita_id],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sends_for_tomorrows_active_citas_only() {
        let conn = open_test_db();
        let id = seed_active_cita(&conn, manana(), Some("912345678"));
        seed_cita(&conn, manana(), ESTADO_CANCELADA, Some("912345678"));
        seed_active_cita(&conn, manana() + Duration::days(1), Some("912345678"));
        let gateway = MockMessenger::new();

        let resumen = run_dispatch(&conn, &gateway, now()).await;

        assert!(resumen.habilitado);
        assert_eq!(resumen.enviados(), 1);
        assert_eq!(resumen.resultados.len(), 1);
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "whatsapp:+56912345678");
        assert!(sent[0].1.contains("Kira"));

        let (enviado, mensaje): (bool, Option<String>) = conn
            .query_row(
                "SELECT enviado, mensaje_enviado FROM recordatorios_whatsapp WHERE cita_id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(enviado);
        assert!(mensaje.unwrap().contains("Kira"));
    }

    #[tokio::test]
    async fn second_run_skips_already_reminded_citas() {
        let conn = open_test_db();
        let id = seed_active_cita(&conn, manana(), Some("912345678"));
        let gateway = MockMessenger::new();

        let primera = run_dispatch(&conn, &gateway, now()).await;
        let segunda = run_dispatch(&conn, &gateway, now()).await;

        assert_eq!(primera.enviados(), 1);
        assert_eq!(segunda.enviados(), 0);
        assert_eq!(segunda.omitidos(), 1);
        assert_eq!(gateway.sent().len(), 1);
        assert_eq!(record_count(&conn, id), 1);
    }

    #[tokio::test]
    async fn reminder_log_lists_the_stored_records() {
        let conn = open_test_db();
        let id = seed_active_cita(&conn, manana(), Some("912345678"));
        let gateway = MockMessenger::new();

        run_dispatch(&conn, &gateway, now()).await;
        let registros = list_reminders(&conn).unwrap();

        assert_eq!(registros.len(), 1);
        assert_eq!(registros[0].cita_id, id);
        assert_eq!(registros[0].numero_whatsapp, "whatsapp:+56912345678");
        assert!(registros[0].enviado);
        assert!(registros[0].error.is_none());
    }

    #[tokio::test]
    async fn disabled_gateway_short_circuits() {
        let conn = open_test_db();
        let id = seed_active_cita(&conn, manana(), Some("912345678"));
        let gateway = MockMessenger {
            enabled: false,
            ..MockMessenger::new()
        };

        let resumen = run_dispatch(&conn, &gateway, now()).await;

        assert!(!resumen.habilitado);
        assert!(resumen.resultados.is_empty());
        assert_eq!(record_count(&conn, id), 0);
    }

    #[tokio::test]
    async fn gateway_rejection_persists_the_error() {
        let conn = open_test_db();
        let id = seed_active_cita(&conn, manana(), Some("912345678"));
        let gateway = MockMessenger {
            accepts: false,
            ..MockMessenger::new()
        };

        let resumen = run_dispatch(&conn, &gateway, now()).await;

        assert_eq!(resumen.fallidos(), 1);
        let (enviado, error): (bool, Option<String>) = conn
            .query_row(
                "SELECT enviado, error FROM recordatorios_whatsapp WHERE cita_id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(!enviado);
        assert_eq!(error.as_deref(), Some(ERROR_ENVIO));
    }

    #[tokio::test]
    async fn owner_without_phone_is_skipped_without_a_record() {
        let conn = open_test_db();
        let id = seed_active_cita(&conn, manana(), None);
        let gateway = MockMessenger::new();

        let resumen = run_dispatch(&conn, &gateway, now()).await;

        assert_eq!(resumen.omitidos(), 1);
        assert!(gateway.sent().is_empty());
        assert_eq!(record_count(&conn, id), 0);
    }

    #[tokio::test]
    async fn one_bad_candidate_does_not_stop_the_rest() {
        let conn = open_test_db();
        seed_active_cita(&conn, manana(), None);
        seed_active_cita(&conn, manana(), Some("912345678"));
        let gateway = MockMessenger::new();

        let resumen = run_dispatch(&conn, &gateway, now()).await;

        assert_eq!(resumen.resultados.len(), 2);
        assert_eq!(resumen.omitidos(), 1);
        assert_eq!(resumen.enviados(), 1);
    }

    #[tokio::test]
    async fn manual_send_bypasses_record_creation() {
        let conn = open_test_db();
        let id = seed_active_cita(&conn, manana(), Some("912345678"));
        let gateway = MockMessenger::new();

        // Pre-existing reminder does not block a manual send.
        run_dispatch(&conn, &gateway, now()).await;
        let aceptado = send_reminder_manually(&conn, &gateway, id).await.unwrap();

        assert!(aceptado);
        assert_eq!(gateway.sent().len(), 2);
        assert_eq!(record_count(&conn, id), 1);
    }

    #[tokio::test]
    async fn manual_send_on_missing_cita_fails() {
        let conn = open_test_db();
        let gateway = MockMessenger::new();
        let err = send_reminder_manually(&conn, &gateway, 99).await.unwrap_err();
        assert!(err.contains("no encontrada"));
    }
}
