use serde::Serialize;

/// Outcome of one reminder candidate within a dispatch run. Collected into
/// the run summary instead of being logged and forgotten, so callers and
/// tests can assert on the full set.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "resultado", rename_all = "snake_case")]
pub enum ResultadoCandidato {
    /// The reminder record was persisted and the gateway accepted the message.
    Enviado { cita_id: i64 },
    /// The candidate was skipped before any record was created.
    Omitido { cita_id: i64, motivo: String },
    /// The gateway rejected the message or the attempt errored out.
    Fallido { cita_id: i64, error: String },
}

/// Aggregate result of one dispatch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResumenEnvio {
    /// False when the gateway reported itself disabled and the run was
    /// short-circuited before touching the store.
    pub habilitado: bool,
    pub resultados: Vec<ResultadoCandidato>,
    /// Set when the run itself failed before processing candidates
    /// (e.g. the eligibility query errored).
    pub error: Option<String>,
}

impl ResumenEnvio {
    pub fn deshabilitado() -> Self {
        Self::default()
    }

    pub fn enviados(&self) -> usize {
        self.resultados
            .iter()
            .filter(|r| matches!(r, ResultadoCandidato::Enviado { .. }))
            .count()
    }

    pub fn fallidos(&self) -> usize {
        self.resultados
            .iter()
            .filter(|r| matches!(r, ResultadoCandidato::Fallido { .. }))
            .count()
    }

    pub fn omitidos(&self) -> usize {
        self.resultados
            .iter()
            .filter(|r| matches!(r, ResultadoCandidato::Omitido { .. }))
            .count()
    }
}
