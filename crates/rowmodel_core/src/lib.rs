//! # rowmodel
//!
//! A minimal Active-Record style model system for SQL tables.
//!
//! This crate provides:
//! - A [`Model`] trait: concrete entity types declare a table and
//!   primary key and gain CRUD persistence (insert, batch insert,
//!   find, update with dirty tracking, delete, count, refresh)
//! - A [`Database`] connection handle and a slot-indexed [`Registry`]
//!   for multiple logical connections
//! - Parameterized SQL assembly with identifier allow-listing
//! - A one-shot [`RowCursor`] for streaming result consumption
//!
//! # Example
//!
//! ```rust,ignore
//! use rowmodel_core::{Database, DatabaseConfig, Model, Predicate};
//!
//! let config = DatabaseConfig::sqlite_in_memory();
//! let mut db = Database::new(Some(&config))?;
//! db.connect()?;
//!
//! let mut user = User::create();
//! user.set("user_uuid", "5c8169b1-…");
//! user.set("first_name", "Gwénola");
//! assert!(user.save(&db)?);
//!
//! let found = User::find_where(&db, &Predicate::new().eq("first_name", "Gwénola"))?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod cursor;
pub mod database;
pub mod error;
pub mod fields;
pub mod model;
pub mod sql;
pub mod value;

pub use config::{DatabaseConfig, EnvConfig};
pub use cursor::RowCursor;
pub use database::{Database, ExecOutcome, LoggedStatement, Registry, Slot};
pub use error::{CoreError, CoreResult};
pub use fields::FieldMap;
pub use model::{Model, PrimaryKey};
pub use sql::{Predicate, SortOrder};
pub use value::{Comparison, Row, Value};
