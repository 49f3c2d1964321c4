//! Database module: models, schema and SQLite storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for the identity store and the contacts database
//! - `sqlite.rs`: pool setup and the identity store
//! - `contacts.rs`: contacts storage and the one-shot seeder

pub mod contacts;
pub mod models;
pub mod schema;
pub mod sqlite;

pub use contacts::{ContactsStorage, ensure_seeded};
pub use models::{Contact, DbRole, DbSession, DbUser, NewContact};
pub use sqlite::{IdentityStorage, SqlitePool, connect};
