//! Strict mode configuration.
//!
//! Strict mode is a single process-wide flag, `STRICT_DEPRECATED_FIELD`.
//! When it is unset or false, touching a deprecated field logs an error;
//! when true, the touch fails with
//! [`DeprecatedFieldAccessError`](crate::DeprecatedFieldAccessError).
//!
//! The flag is never cached: [`is_strict`] reads it on every escalation, so
//! it can be flipped at runtime. Applications configure it with
//! [`configure`] or [`set_strict`].
//!
//! [`override_strict`] is a test aid. It shadows the process-wide flag on
//! the current thread only, so parallel tests can toggle strict mode
//! without racing each other. Production code should not use it.

use std::cell::Cell;
use std::env::{self, VarError};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use tracing::info;

use crate::error::SettingsError;

/// Name of the setting, as an environment variable and as a document key.
pub const STRICT_DEPRECATED_FIELD: &str = "STRICT_DEPRECATED_FIELD";

static STRICT: AtomicBool = AtomicBool::new(false);

thread_local! {
    static STRICT_OVERRIDE: Cell<Option<bool>> = const { Cell::new(None) };
}

/// Application settings read by the deprecation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Fail instead of logging when a deprecated field is touched.
    /// Unset behaves like `false`.
    #[serde(rename = "STRICT_DEPRECATED_FIELD", default)]
    pub strict_deprecated_field: Option<bool>,
}

impl Settings {
    /// Settings with strict mode explicitly on or off.
    pub fn strict(strict: bool) -> Self {
        Self {
            strict_deprecated_field: Some(strict),
        }
    }

    /// Read `STRICT_DEPRECATED_FIELD` from the environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        match env::var(STRICT_DEPRECATED_FIELD) {
            Ok(value) => Ok(Self {
                strict_deprecated_field: Some(parse_flag(&value)?),
            }),
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(value)) => Err(SettingsError::InvalidFlag {
                key: STRICT_DEPRECATED_FIELD,
                value: value.to_string_lossy().into_owned(),
            }),
        }
    }

    /// Parse a JSON settings document. Unknown keys are ignored.
    pub fn from_json(document: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Effective strict flag.
    pub fn is_strict(&self) -> bool {
        self.strict_deprecated_field.unwrap_or(false)
    }
}

/// Install `settings` as the process-wide configuration.
pub fn configure(settings: &Settings) {
    set_strict(settings.is_strict());
    info!(strict = settings.is_strict(), "deprecated field settings configured");
}

/// Set the process-wide strict flag.
pub fn set_strict(strict: bool) {
    STRICT.store(strict, Ordering::SeqCst);
}

/// Current strict flag, honoring a thread-local override.
pub fn is_strict() -> bool {
    STRICT_OVERRIDE
        .with(Cell::get)
        .unwrap_or_else(|| STRICT.load(Ordering::SeqCst))
}

/// Override the strict flag on the current thread until the guard drops.
///
/// Intended for tests. While the guard is alive, [`set_strict`] and
/// [`configure`] have no effect on this thread; other threads keep reading
/// the process-wide flag.
pub fn override_strict(strict: bool) -> StrictOverride {
    let previous = STRICT_OVERRIDE.with(|cell| cell.replace(Some(strict)));
    StrictOverride { previous }
}

/// Guard returned by [`override_strict`]. Restores the previous override
/// on drop.
#[must_use = "the override ends when the guard is dropped"]
#[derive(Debug)]
pub struct StrictOverride {
    previous: Option<bool>,
}

impl Drop for StrictOverride {
    fn drop(&mut self) {
        STRICT_OVERRIDE.with(|cell| cell.set(self.previous));
    }
}

fn parse_flag(value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(SettingsError::InvalidFlag {
            key: STRICT_DEPRECATED_FIELD,
            value: value.to_string(),
        }),
    }
}
