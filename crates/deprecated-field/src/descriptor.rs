//! Attribute descriptor for deprecated fields.

use deprecated_field_core::{Descriptor, Instance, ModelRef, Result, Value};

use crate::escalate::{escalate, Touch, TouchKind};

/// Descriptor installed for a deprecated field.
///
/// Reads always yield `None` and writes are discarded. Every access is
/// escalated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecatedFieldDescriptor {
    name: String,
}

impl DeprecatedFieldDescriptor {
    /// Descriptor for the deprecated field `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The field name this descriptor serves.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Descriptor for DeprecatedFieldDescriptor {
    fn get(&self, instance: Option<&Instance>, owner: &ModelRef) -> Result<Option<Value>> {
        match instance {
            Some(instance) => escalate(&Touch::new(
                TouchKind::InstanceGet,
                &self.name,
                instance.model().meta(),
            ))?,
            None => escalate(&Touch::new(TouchKind::ClassGet, &self.name, owner))?,
        }
        Ok(None)
    }

    fn set(&self, instance: &mut Instance, _value: Value) -> Result<()> {
        escalate(&Touch::new(
            TouchKind::InstanceSet,
            &self.name,
            instance.model().meta(),
        ))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeprecatedFieldAccessError;
    use crate::settings::override_strict;
    use deprecated_field_core::{FieldDef, Model};

    fn genre() -> Model {
        Model::builder("tests.models", "Genre")
            .field("label", FieldDef::char(32))
            .build()
    }

    #[test]
    fn test_get_returns_none() {
        let _lenient = override_strict(false);
        let model = genre();
        let instance = model.init([("label", "jazz")]).unwrap();
        let descriptor = DeprecatedFieldDescriptor::new("label");

        assert_eq!(descriptor.get(Some(&instance), model.meta()).unwrap(), None);
        assert_eq!(descriptor.get(None, model.meta()).unwrap(), None);
    }

    #[test]
    fn test_set_discards_value() {
        let _lenient = override_strict(false);
        let model = genre();
        let mut instance = model.init([("label", "jazz")]).unwrap();
        let descriptor = DeprecatedFieldDescriptor::new("label");

        descriptor.set(&mut instance, Value::from("rock")).unwrap();
        assert_eq!(instance.value("label"), Some(&Value::from("jazz")));
    }

    #[test]
    fn test_strict_errors_carry_kind() {
        let _strict = override_strict(true);
        let model = genre();
        let mut instance = model.init([("label", "jazz")]).unwrap();
        let descriptor = DeprecatedFieldDescriptor::new("label");

        let kind = |err: deprecated_field_core::Error| {
            err.downcast_ref::<DeprecatedFieldAccessError>()
                .map(DeprecatedFieldAccessError::kind)
        };
        assert_eq!(
            kind(descriptor.get(Some(&instance), model.meta()).unwrap_err()),
            Some(TouchKind::InstanceGet)
        );
        assert_eq!(
            kind(descriptor.get(None, model.meta()).unwrap_err()),
            Some(TouchKind::ClassGet)
        );
        assert_eq!(
            kind(descriptor.set(&mut instance, Value::Null).unwrap_err()),
            Some(TouchKind::InstanceSet)
        );
    }
}
