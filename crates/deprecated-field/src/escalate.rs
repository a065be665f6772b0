//! Escalation of deprecated field touches.
//!
//! Every touch of a deprecated field goes through [`escalate`]. In strict
//! mode the touch becomes a [`DeprecatedFieldAccessError`]; otherwise it is
//! logged at error level with a captured backtrace and the caller carries
//! on. Non-strict mode is never silent.

use std::backtrace::Backtrace;
use std::fmt;

use deprecated_field_core::ModelRef;
use tracing::error;

use crate::error::DeprecatedFieldAccessError;
use crate::settings;

/// Log target of every deprecated field diagnostic.
pub const LOG_TARGET: &str = "deprecated_field";

/// How a deprecated field was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchKind {
    /// Attribute read on an instance.
    InstanceGet,
    /// Attribute read on the model class.
    ClassGet,
    /// Attribute assignment on an instance.
    InstanceSet,
    /// Column resolved while compiling a query.
    QueryReference,
    /// Value prepared for an update-style write.
    Write,
}

impl TouchKind {
    /// Short name used in structured log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            TouchKind::InstanceGet => "instance_get",
            TouchKind::ClassGet => "class_get",
            TouchKind::InstanceSet => "instance_set",
            TouchKind::QueryReference => "query_reference",
            TouchKind::Write => "write",
        }
    }
}

impl fmt::Display for TouchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single touch of a deprecated field.
#[derive(Debug, Clone, Copy)]
pub struct Touch<'a> {
    kind: TouchKind,
    field: &'a str,
    model: &'a ModelRef,
}

impl<'a> Touch<'a> {
    /// Describe a touch of `field` on `model`.
    pub fn new(kind: TouchKind, field: &'a str, model: &'a ModelRef) -> Self {
        Self { kind, field, model }
    }

    /// How the field was touched.
    pub fn kind(&self) -> TouchKind {
        self.kind
    }

    /// Field name.
    pub fn field(&self) -> &'a str {
        self.field
    }

    /// Owning model.
    pub fn model(&self) -> &'a ModelRef {
        self.model
    }
}

impl fmt::Display for Touch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (field, model) = (self.field, self.model);
        match self.kind {
            TouchKind::InstanceGet => write!(
                f,
                "Accessed deprecated field \"{}\" on instance of \"{}\"",
                field, model
            ),
            TouchKind::ClassGet => write!(
                f,
                "Accessed deprecated field \"{}\" on model class \"{}\"",
                field, model
            ),
            TouchKind::InstanceSet => write!(
                f,
                "Tried to set deprecated field \"{}\" on instance of \"{}\"",
                field, model
            ),
            TouchKind::QueryReference => write!(
                f,
                "Deprecated field \"{}\" on \"{}\" referenced in query",
                field, model
            ),
            TouchKind::Write => write!(
                f,
                "Writing to deprecated field \"{}\" on \"{}\"",
                field, model
            ),
        }
    }
}

/// Log the touch, or fail with it when strict mode is on.
///
/// The strict flag is read on every call.
pub fn escalate(touch: &Touch<'_>) -> Result<(), DeprecatedFieldAccessError> {
    if settings::is_strict() {
        return Err(DeprecatedFieldAccessError::from(touch));
    }

    error!(
        target: LOG_TARGET,
        field = touch.field(),
        model = %touch.model(),
        kind = %touch.kind(),
        stack = %Backtrace::force_capture(),
        "{}",
        touch
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::override_strict;

    #[test]
    fn test_message_templates() {
        let model = ModelRef::new("tests.models", "Genre");
        let message = |kind| Touch::new(kind, "name", &model).to_string();

        assert_eq!(
            message(TouchKind::InstanceGet),
            "Accessed deprecated field \"name\" on instance of \"tests.models.Genre\""
        );
        assert_eq!(
            message(TouchKind::ClassGet),
            "Accessed deprecated field \"name\" on model class \"tests.models.Genre\""
        );
        assert_eq!(
            message(TouchKind::InstanceSet),
            "Tried to set deprecated field \"name\" on instance of \"tests.models.Genre\""
        );
        assert_eq!(
            message(TouchKind::QueryReference),
            "Deprecated field \"name\" on \"tests.models.Genre\" referenced in query"
        );
        assert_eq!(
            message(TouchKind::Write),
            "Writing to deprecated field \"name\" on \"tests.models.Genre\""
        );
    }

    #[test]
    fn test_escalate_follows_strict_flag() {
        let model = ModelRef::new("tests.models", "Artist");
        let touch = Touch::new(TouchKind::InstanceGet, "name", &model);

        {
            let _strict = override_strict(true);
            let err = escalate(&touch).unwrap_err();
            assert_eq!(err.kind(), TouchKind::InstanceGet);
        }

        let _lenient = override_strict(false);
        assert!(escalate(&touch).is_ok());
    }
}
