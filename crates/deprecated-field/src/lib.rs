//! Deprecated Field - drop model columns safely across two deploys.
//!
//! Wrapping a field with [`deprecated`] keeps it declared on the model while
//! taking it out of everyday use:
//!
//! - SELECT queries read a `NULL` literal instead of the column, so the
//!   column can be dropped without breaking running code.
//! - Migration state still records the original field (made nullable), so
//!   the change detector emits an ordinary alter and later a remove.
//! - Reading or assigning the attribute returns `None` or is discarded.
//! - An explicit `update()` still writes the real column.
//!
//! Every touch is escalated: logged at error level with a backtrace, or
//! turned into a [`DeprecatedFieldAccessError`] when `STRICT_DEPRECATED_FIELD`
//! is on (see [`settings`]).
//!
//! ```no_run
//! use deprecated_field::deprecated;
//! use deprecated_field_core::{FieldDef, Model};
//!
//! let artist = Model::builder("tests.models", "Artist")
//!     .field("name", deprecated(FieldDef::char(256)))
//!     .build();
//! ```

pub mod descriptor;
pub mod error;
pub mod escalate;
pub mod expressions;
pub mod fields;
pub mod settings;

pub use descriptor::DeprecatedFieldDescriptor;
pub use error::{DeprecatedFieldAccessError, SettingsError};
pub use escalate::{escalate, Touch, TouchKind, LOG_TARGET};
pub use expressions::Null;
pub use fields::DeprecatedField;
pub use settings::{configure, is_strict, override_strict, set_strict, Settings, StrictOverride};

use deprecated_field_core::FieldDef;

/// Mark a field as deprecated.
///
/// The original definition is made nullable so inserts never need a value
/// for it, then moved into the wrapper.
pub fn deprecated(mut original: FieldDef) -> DeprecatedField {
    original.null = true;
    DeprecatedField::new(original)
}
