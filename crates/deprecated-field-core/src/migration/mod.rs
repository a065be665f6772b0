//! Schema migrations.
//!
//! Migration history is replayed into a [`ProjectState`]; live models are
//! snapshotted into another one through [`Field::clone_field`]. The
//! [`Autodetector`] diffs the two and the [`SchemaEditor`] applies the
//! resulting operations to a database.
//!
//! [`Field::clone_field`]: crate::field::Field::clone_field

mod autodetector;
mod operation;
mod schema_editor;
mod state;

pub use autodetector::Autodetector;
pub use operation::{Migration, Operation};
pub use schema_editor::SchemaEditor;
pub use state::{ModelState, ProjectState};
