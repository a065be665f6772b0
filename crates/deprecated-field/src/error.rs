//! Error types for deprecated field access.

use thiserror::Error;

use crate::escalate::{Touch, TouchKind};

/// Raised when a deprecated field is touched while strict mode is on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DeprecatedFieldAccessError {
    message: String,
    kind: TouchKind,
    field: String,
    model: String,
}

impl DeprecatedFieldAccessError {
    /// The formatted diagnostic.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// How the field was touched.
    pub fn kind(&self) -> TouchKind {
        self.kind
    }

    /// Name of the deprecated field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// `module.qualname` of the owning model.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl From<&Touch<'_>> for DeprecatedFieldAccessError {
    fn from(touch: &Touch<'_>) -> Self {
        Self {
            message: touch.to_string(),
            kind: touch.kind(),
            field: touch.field().to_string(),
            model: touch.model().label(),
        }
    }
}

impl From<DeprecatedFieldAccessError> for deprecated_field_core::Error {
    fn from(err: DeprecatedFieldAccessError) -> Self {
        deprecated_field_core::Error::hook(err)
    }
}

/// Errors loading [`Settings`](crate::Settings).
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The flag value is not a recognized boolean.
    #[error("invalid value for {key}: {value:?}")]
    InvalidFlag {
        /// Setting name.
        key: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The settings document could not be parsed.
    #[error("invalid settings document: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use deprecated_field_core::ModelRef;

    #[test]
    fn test_access_error_from_touch() {
        let model = ModelRef::new("tests.models", "Genre");
        let touch = Touch::new(TouchKind::InstanceSet, "name", &model);
        let err = DeprecatedFieldAccessError::from(&touch);

        assert_eq!(
            err.to_string(),
            "Tried to set deprecated field \"name\" on instance of \"tests.models.Genre\""
        );
        assert_eq!(err.kind(), TouchKind::InstanceSet);
        assert_eq!(err.field(), "name");
        assert_eq!(err.model(), "tests.models.Genre");
    }

    #[test]
    fn test_converts_into_core_error() {
        let model = ModelRef::new("tests.models", "Artist");
        let touch = Touch::new(TouchKind::Write, "name", &model);
        let err: deprecated_field_core::Error = DeprecatedFieldAccessError::from(&touch).into();

        assert!(err.is_hook());
        let inner = err.downcast_ref::<DeprecatedFieldAccessError>().unwrap();
        assert_eq!(inner.kind(), TouchKind::Write);
        assert_eq!(
            err.to_string(),
            "Writing to deprecated field \"name\" on \"tests.models.Artist\""
        );
    }
}
