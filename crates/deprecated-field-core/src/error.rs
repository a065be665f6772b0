//! Core error types.

use thiserror::Error;

/// Errors raised by the model, query and migration layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Database backend error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A field name was not found on a model.
    #[error("{model} has no field named \"{field}\"")]
    FieldDoesNotExist {
        /// Qualified name of the model.
        model: String,
        /// The requested field name.
        field: String,
    },

    /// A value could not be prepared for a column.
    #[error("invalid value for field \"{field}\": {reason}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The operation is not supported by this backend or in this state.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Error raised by a field, descriptor or expression hook.
    ///
    /// Hook errors are propagated unchanged; use [`Error::downcast_ref`]
    /// to recover the original error.
    #[error(transparent)]
    Hook(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Wrap an error raised by an extension hook.
    pub fn hook(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Hook(Box::new(err))
    }

    /// Shortcut for [`Error::FieldDoesNotExist`].
    pub fn field_does_not_exist(model: impl Into<String>, field: impl Into<String>) -> Self {
        Error::FieldDoesNotExist {
            model: model.into(),
            field: field.into(),
        }
    }

    /// Borrow the hook error as a concrete type, if it is one.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Hook(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Check whether this error came from an extension hook.
    pub fn is_hook(&self) -> bool {
        matches!(self, Error::Hook(_))
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
