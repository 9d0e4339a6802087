//! Inventory endpoints under `/api/productos`: product CRUD plus stock
//! movements. A movement and its stock adjustment commit in one
//! transaction so `productos.stock` never drifts from the movement log.

use crate::state::AppState;
use crate::storage;
use actix_web::web::{delete, get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use chrono::Local;
use common::model::inventory::{MovimientoInventario, Producto};
use rusqlite::{params, Connection};

const API_PATH: &str = "/api/productos";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("", post().to(save))
        .route("/{id}", get().to(get_one))
        .route("/{id}", delete().to(remove))
        .route("/{id}/movimientos", get().to(list_product_movements))
        .route("/{id}/movimientos", post().to(add_movement))
}

async fn list(state: web::Data<AppState>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match list_products(&conn) {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn get_one(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match find_product(&conn, *id) {
        Ok(Some(product)) => HttpResponse::Ok().json(product),
        Ok(None) => HttpResponse::NotFound().body("Producto no encontrado"),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn save(state: web::Data<AppState>, payload: web::Json<Producto>) -> impl Responder {
    if payload.nombre.trim().is_empty() {
        return HttpResponse::BadRequest().body("El nombre del producto es requerido");
    }
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match save_product(&conn, &payload) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn remove(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match storage::exists(&conn, "productos", *id) {
        Ok(false) => return HttpResponse::NotFound().body("Producto no encontrado"),
        Err(e) => return HttpResponse::InternalServerError().body(e),
        Ok(true) => {}
    }
    match conn.execute("DELETE FROM productos WHERE id = ?1", [*id]) {
        Ok(_) => HttpResponse::Ok().body("Producto eliminado"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

async fn list_product_movements(state: web::Data<AppState>, id: web::Path<i64>) -> impl Responder {
    let conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match list_movements(&conn, *id) {
        Ok(movements) => HttpResponse::Ok().json(movements),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

async fn add_movement(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    payload: web::Json<MovimientoInventario>,
) -> impl Responder {
    let mut movement = payload.into_inner();
    movement.producto_id = *id;
    if movement.cantidad <= 0 {
        return HttpResponse::BadRequest().body("La cantidad debe ser mayor que cero");
    }
    if movement.tipo != "entrada" && movement.tipo != "salida" {
        return HttpResponse::BadRequest().body("El tipo debe ser 'entrada' o 'salida'");
    }
    let mut conn = match storage::open(&state.db_path) {
        Ok(c) => c,
        Err(e) => return HttpResponse::InternalServerError().body(e),
    };
    match apply_movement(&mut conn, &movement) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) if e.contains("no encontrado") => HttpResponse::NotFound().body(e),
        Err(e) if e.contains("Stock insuficiente") => HttpResponse::BadRequest().body(e),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

fn row_to_product(row: &rusqlite::Row) -> rusqlite::Result<Producto> {
    Ok(Producto {
        id: row.get(0)?,
        nombre: row.get(1)?,
        descripcion: row.get(2)?,
        precio: row.get(3)?,
        stock: row.get(4)?,
        categoria: row.get(5)?,
        activo: row.get(6)?,
    })
}

const SELECT_PRODUCT: &str =
    "SELECT id, nombre, descripcion, precio, stock, categoria, activo FROM productos";

pub fn list_products(conn: &Connection) -> Result<Vec<Producto>, String> {
    let mut stmt = conn
        .prepare(&format!("{} ORDER BY nombre", SELECT_PRODUCT))
        .map_err(|e| e.to_string())?;
    let rows = stmt
        .query_map([], row_to_product)
        .map_err(|e| e.to_string())?;
    rows.collect::<Result<_, _>>().map_err(|e| e.to_string())
}

pub fn find_product(conn: &Connection, id: i64) -> Result<Option<Producto>, String> {
    let mut stmt = conn
        .prepare(&format!("{} WHERE id = ?1", SELECT_PRODUCT))
        .map_err(|e| e.to_string())?;
    let mut rows = stmt
        .query_map([id], row_to_product)
        .map_err(|e| e.to_string())?;
    match rows.next() {
        Some(Ok(product)) => Ok(Some(product)),
        Some(Err(e)) => Err(e.to_string()),
        None => Ok(None),
    }
}

pub fn save_product(conn: &Connection, product: &Producto) -> Result<Producto, String> {
    let mut saved = product.clone();
    match product.id {
        Some(id) => {
            if !storage::exists(conn, "productos", id)? {
                return Err("Producto no encontrado".to_string());
            }
            conn.execute(
                "UPDATE productos SET nombre = ?1, descripcion = ?2, precio = ?3,
                 stock = ?4, categoria = ?5, activo = ?6 WHERE id = ?7",
                params![
                    product.nombre,
                    product.descripcion,
                    product.precio,
                    product.stock,
                    product.categoria,
                    product.activo,
                    id
                ],
            )
            .map_err(|e| e.to_string())?;
        }
        None => {
            conn.execute(
                "INSERT INTO productos (nombre, descripcion, precio, stock, categoria, activo)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    product.nombre,
                    product.descripcion,
                    product.precio,
                    product.stock,
                    product.categoria,
                    product.activo
                ],
            )
            .map_err(|e| e.to_string())?;
            saved.id = Some(conn.last_insert_rowid());
        }
    }
    Ok(saved)
}

pub fn list_movements(
    conn: &Connection,
    product_id: i64,
) -> Result<Vec<MovimientoInventario>, String> {
    let mut stmt = conn
        .prepare(
            "SELECT id, producto_id, tipo, cantidad, nota, fecha
             FROM movimientos_inventario WHERE producto_id = ?1 ORDER BY fecha DESC",
        )
        .map_err(|e| e.to_string())?;
    let rows = stmt
        .query_map([product_id], |row| {
            Ok(MovimientoInventario {
                id: row.get(0)?,
                producto_id: row.get(1)?,
                tipo: row.get(2)?,
                cantidad: row.get(3)?,
                nota: row.get(4)?,
                fecha: row.get(5)?,
            })
        })
        .map_err(|e| e.to_string())?;
    rows.collect::<Result<_, _>>().map_err(|e| e.to_string())
}

/// Records the movement and adjusts the product's stock in one
/// transaction. An outbound movement larger than the stock on hand is
/// rejected.
pub fn apply_movement(
    conn: &mut Connection,
    movement: &MovimientoInventario,
) -> Result<MovimientoInventario, String> {
    let tx = conn.transaction().map_err(|e| e.to_string())?;

    let stock: i64 = tx
        .query_row(
            "SELECT stock FROM productos WHERE id = ?1",
            [movement.producto_id],
            |row| row.get(0),
        )
        .map_err(|_| "Producto no encontrado".to_string())?;

    let delta = if movement.tipo == "entrada" {
        movement.cantidad
    } else {
        if stock < movement.cantidad {
            return Err(format!(
                "Stock insuficiente: disponible {}, solicitado {}",
                stock, movement.cantidad
            ));
        }
        -movement.cantidad
    };

    let fecha = movement
        .fecha
        .unwrap_or_else(|| Local::now().naive_local());
    tx.execute(
        "INSERT INTO movimientos_inventario (producto_id, tipo, cantidad, nota, fecha)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            movement.producto_id,
            movement.tipo,
            movement.cantidad,
            movement.nota,
            fecha
        ],
    )
    .map_err(|e| e.to_string())?;
    let movement_id = tx.last_insert_rowid();

    tx.execute(
        "UPDATE productos SET stock = stock + ?1 WHERE id = ?2",
        params![delta, movement.producto_id],
    )
    .map_err(|e| e.to_string())?;

    tx.commit().map_err(|e| e.to_string())?;

    let mut saved = movement.clone();
    saved.id = Some(movement_id);
    saved.fecha = Some(fecha);
    Ok(saved)
}
