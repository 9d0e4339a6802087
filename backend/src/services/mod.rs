//! HTTP feature areas. Each sub-module exposes `configure_routes()` with
//! its `/api/...` scope; `main.rs` mounts them all.

pub mod appointments;
pub mod catalog;
pub mod documents;
pub mod inventory;
pub mod invoices;
pub mod owners;
pub mod pets;
pub mod reminders;
pub mod staff;
