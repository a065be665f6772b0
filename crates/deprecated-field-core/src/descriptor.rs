//! Attribute descriptors.
//!
//! A model installs one descriptor per field name. Attribute reads and
//! writes on instances, and reads on the model class itself, are routed
//! through it.

use crate::error::Result;
use crate::model::{Instance, ModelRef};
use crate::value::Value;

/// Attribute access hooks installed on a model for one field.
pub trait Descriptor: Send + Sync {
    /// Read the attribute. `instance` is `None` for class-level access.
    fn get(&self, instance: Option<&Instance>, owner: &ModelRef) -> Result<Option<Value>>;

    /// Assign the attribute on an instance.
    fn set(&self, instance: &mut Instance, value: Value) -> Result<()>;
}

/// Default descriptor: reads and writes the instance slot directly.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    attname: String,
}

impl FieldDescriptor {
    /// Create a descriptor for the field `name` stored under `attname`.
    pub fn new(name: impl Into<String>, attname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attname: attname.into(),
        }
    }

    /// The field name this descriptor serves.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Descriptor for FieldDescriptor {
    fn get(&self, instance: Option<&Instance>, _owner: &ModelRef) -> Result<Option<Value>> {
        Ok(instance.and_then(|instance| instance.value(&self.attname).cloned()))
    }

    fn set(&self, instance: &mut Instance, value: Value) -> Result<()> {
        instance.store(&self.attname, value);
        Ok(())
    }
}
