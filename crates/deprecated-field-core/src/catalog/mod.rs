//! Field definitions and column types.

mod field;
mod types;

pub use field::FieldDef;
pub use types::{FieldType, OnDelete};
