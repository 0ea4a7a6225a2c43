//! Entity model interface for subtp.
//!
//! Defines the contract between a host ORM and the change-capture engine:
//! - [`EntitySchema`] — an entity type's ordered field whitelist
//! - [`Observable`] — implemented by the host for its live instances
//! - [`Entity`] — a generic JSON-backed record for hosts without their own types
//!
//! The engine never reflects over host objects. Everything it reads goes
//! through `Observable`, restricted to the fields the schema names.

mod entity;
mod schema;

pub use entity::{Entity, Observable};
pub use schema::EntitySchema;
