//! Deprecated Field Core - model metadata, query compilation and schema diffing.
//!
//! This crate provides the host ORM the `deprecated-field` crate plugs into:
//! field and descriptor hooks, SQL expressions, model classes, a query layer
//! on SQLite and migration state with a change detector.

pub mod backend;
pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod expression;
pub mod field;
pub mod migration;
pub mod model;
pub mod query;
pub mod value;

pub use backend::{Connection, SqliteConnection};
pub use catalog::{FieldDef, FieldType, OnDelete};
pub use descriptor::{Descriptor, FieldDescriptor};
pub use error::{Error, Result};
pub use expression::{Col, Expression};
pub use field::{Field, FieldDefault};
pub use migration::{Autodetector, Migration, ModelState, Operation, ProjectState, SchemaEditor};
pub use model::{Instance, Model, ModelBuilder, ModelRef};
pub use query::{QuerySet, SqlCompiler};
pub use value::Value;
