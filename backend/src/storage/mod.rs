//! SQLite access for the clinic backend.
//!
//! Handlers open a connection per request against the configured database
//! path; everything below them takes `&Connection` so the same logic runs
//! against `Connection::open_in_memory()` in tests. The schema is created
//! at startup with `CREATE TABLE IF NOT EXISTS`, there is no migration
//! machinery beyond that.

use rusqlite::Connection;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS propietarios (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rut TEXT,
    nombre TEXT NOT NULL,
    telefono TEXT,
    email TEXT
);

CREATE TABLE IF NOT EXISTS mascotas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    especie TEXT,
    raza TEXT,
    fecha_nacimiento TEXT,
    sexo TEXT,
    propietario_id INTEGER REFERENCES propietarios(id)
);

CREATE TABLE IF NOT EXISTS servicios (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    descripcion TEXT,
    precio REAL,
    duracion INTEGER,
    activo INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS personal (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    rut TEXT,
    cargo TEXT,
    especialidad TEXT,
    telefono TEXT,
    email TEXT,
    activo INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS citas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    fecha TEXT NOT NULL,
    hora TEXT,
    motivo TEXT,
    diagnostico TEXT,
    tratamiento TEXT,
    estado TEXT NOT NULL DEFAULT 'Activa',
    mascota_id INTEGER NOT NULL REFERENCES mascotas(id),
    veterinario_id INTEGER REFERENCES personal(id),
    servicio_id INTEGER REFERENCES servicios(id)
);

-- One reminder per appointment, enforced by an existence check in the
-- dispatcher, deliberately not by a UNIQUE constraint.
CREATE TABLE IF NOT EXISTS recordatorios_whatsapp (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cita_id INTEGER NOT NULL REFERENCES citas(id),
    numero_whatsapp TEXT NOT NULL,
    fecha_envio TEXT NOT NULL,
    enviado INTEGER NOT NULL DEFAULT 0,
    mensaje_enviado TEXT,
    error TEXT,
    fecha_creacion TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS productos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre TEXT NOT NULL,
    descripcion TEXT,
    precio REAL,
    stock INTEGER NOT NULL DEFAULT 0,
    categoria TEXT,
    activo INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS movimientos_inventario (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    producto_id INTEGER NOT NULL REFERENCES productos(id),
    tipo TEXT NOT NULL,
    cantidad INTEGER NOT NULL,
    nota TEXT,
    fecha TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS honorarios (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cita_id INTEGER REFERENCES citas(id),
    propietario_id INTEGER REFERENCES propietarios(id),
    fecha_emision TEXT,
    total REAL NOT NULL,
    detalle TEXT,
    pagado INTEGER NOT NULL DEFAULT 0
);
";

pub fn open(db_path: &str) -> Result<Connection, String> {
    Connection::open(db_path).map_err(|e| e.to_string())
}

pub fn init_schema(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(SCHEMA).map_err(|e| e.to_string())
}

/// Generic existence check used by the delete/update handlers.
pub fn exists(conn: &Connection, table: &str, id: i64) -> Result<bool, String> {
    // `table` is always a literal from this crate, never user input.
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table);
    conn.query_row(&sql, [id], |row| row.get::<_, bool>(0))
        .map_err(|e| e.to_string())
}

#[cfg(test)]
pub fn open_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory db");
    init_schema(&conn).expect("schema");
    conn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn exists_reports_missing_rows() {
        let conn = open_test_db();
        assert!(!exists(&conn, "citas", 1).unwrap());
        conn.execute(
            "INSERT INTO propietarios (nombre) VALUES ('Ana')",
            [],
        )
        .unwrap();
        assert!(exists(&conn, "propietarios", 1).unwrap());
    }
}
