//! # rowmodel testkit
//!
//! Test utilities for rowmodel.
//!
//! This crate provides:
//! - Test fixtures: an in-memory (or file-backed) database with the
//!   `users` schema, sample models and seeded rows
//! - Property-based generators using proptest
//! - Golden SQL expectations for statement-shape verification
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rowmodel_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_database() {
//!     with_test_db(|db| {
//!         let mut user = User::create_with(new_uuid(), "Gwénola", None, None);
//!         assert!(user.save(db).unwrap());
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod golden;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::golden::*;
}

pub use fixtures::*;
pub use generators::*;
pub use golden::*;
