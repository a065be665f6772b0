//! Model classes and instances.
//!
//! A [`Model`] is built once from its declared fields: every field is bound
//! through [`Field::contribute_to_class`] and its descriptor is installed
//! under the field name. Instances keep raw column values in named slots;
//! attribute access goes through the descriptors, while loading from and
//! writing to the database use the slots directly.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::backend::Connection;
use crate::catalog::FieldDef;
use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::field::{Field, FieldDefault};
use crate::query::QuerySet;
use crate::value::Value;

/// Identity of a model class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelRef {
    module: String,
    qualname: String,
}

impl ModelRef {
    /// Create a model reference from its module path and class name.
    pub fn new(module: impl Into<String>, qualname: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
        }
    }

    /// Module path, e.g. `tests.models`.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Class name, e.g. `Genre`.
    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    /// Application label: the first segment of the module path.
    pub fn app_label(&self) -> &str {
        self.module.split('.').next().unwrap_or(&self.module)
    }

    /// Lower-cased class name.
    pub fn model_name(&self) -> String {
        self.qualname.to_lowercase()
    }

    /// Database table name.
    pub fn db_table(&self) -> String {
        format!("{}_{}", self.app_label(), self.model_name())
    }

    /// `module.qualname`.
    pub fn label(&self) -> String {
        format!("{}.{}", self.module, self.qualname)
    }

    /// `app_label.qualname`, the form used by foreign key targets.
    pub fn app_model_label(&self) -> String {
        format!("{}.{}", self.app_label(), self.qualname)
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.qualname)
    }
}

/// Builder for a [`Model`].
pub struct ModelBuilder {
    meta: ModelRef,
    fields: Vec<(String, Box<dyn Field>)>,
}

impl ModelBuilder {
    /// Declare a field.
    pub fn field(mut self, name: impl Into<String>, field: impl Field + 'static) -> Self {
        self.fields.push((name.into(), Box::new(field)));
        self
    }

    /// Bind every field and produce the model.
    ///
    /// An auto-incrementing `id` primary key is added when no field is
    /// declared as primary key.
    pub fn build(self) -> Model {
        let ModelBuilder { meta, mut fields } = self;

        if !fields.iter().any(|(_, field)| field.is_primary_key()) {
            fields.insert(0, ("id".to_string(), Box::new(FieldDef::auto())));
        }

        let mut bound: Vec<Box<dyn Field>> = Vec::with_capacity(fields.len());
        let mut descriptors: HashMap<String, Arc<dyn Descriptor>> = HashMap::new();
        for (name, mut field) in fields {
            field.contribute_to_class(&meta, &name);
            descriptors.insert(name, field.descriptor());
            bound.push(field);
        }

        let pk = bound
            .iter()
            .position(|field| field.is_primary_key())
            .unwrap_or(0);

        debug!(model = %meta, fields = bound.len(), "model registered");

        Model {
            inner: Arc::new(ModelInner {
                meta,
                fields: bound,
                descriptors,
                pk,
            }),
        }
    }
}

struct ModelInner {
    meta: ModelRef,
    fields: Vec<Box<dyn Field>>,
    descriptors: HashMap<String, Arc<dyn Descriptor>>,
    pk: usize,
}

/// A model class. Cheap to clone.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("meta", &self.inner.meta)
            .field("fields", &self.inner.fields)
            .finish()
    }
}

impl Model {
    /// Start declaring a model.
    pub fn builder(module: impl Into<String>, qualname: impl Into<String>) -> ModelBuilder {
        ModelBuilder {
            meta: ModelRef::new(module, qualname),
            fields: Vec::new(),
        }
    }

    /// The model's identity.
    pub fn meta(&self) -> &ModelRef {
        &self.inner.meta
    }

    /// All local fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &dyn Field> {
        self.inner.fields.iter().map(|field| field.as_ref())
    }

    /// Fields read and written by default.
    pub fn concrete_fields(&self) -> impl Iterator<Item = &dyn Field> {
        self.fields().filter(|field| field.is_concrete())
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Result<&dyn Field> {
        self.fields()
            .find(|field| field.name() == name)
            .ok_or_else(|| Error::field_does_not_exist(self.meta().label(), name))
    }

    /// The primary key field.
    pub fn pk_field(&self) -> &dyn Field {
        self.inner.fields[self.inner.pk].as_ref()
    }

    /// The descriptor installed for `name`.
    pub fn descriptor(&self, name: &str) -> Result<Arc<dyn Descriptor>> {
        self.inner
            .descriptors
            .get(name)
            .cloned()
            .ok_or_else(|| Error::field_does_not_exist(self.meta().label(), name))
    }

    /// Construct an instance.
    ///
    /// Concrete fields take the supplied value or their default. Any other
    /// supplied name is assigned through its descriptor.
    pub fn init<I, K, V>(&self, kwargs: I) -> Result<Instance>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut kwargs: Vec<(String, Value)> = kwargs
            .into_iter()
            .map(|(name, value)| (name.as_ref().to_string(), value.into()))
            .collect();

        let mut instance = Instance::new(self.clone());
        for field in self.concrete_fields() {
            let attname = field.attname();
            let supplied = kwargs
                .iter()
                .position(|(name, _)| name == field.name() || *name == attname);
            match supplied {
                Some(index) => {
                    let (_, value) = kwargs.remove(index);
                    instance.store(&attname, value);
                }
                None => {
                    if let FieldDefault::Value(value) = field.get_default() {
                        instance.store(&attname, value);
                    }
                }
            }
        }

        for (name, value) in kwargs {
            let descriptor = self.descriptor(&name)?;
            descriptor.set(&mut instance, value)?;
        }

        Ok(instance)
    }

    /// Read an attribute on the model class itself.
    pub fn class_attr(&self, name: &str) -> Result<Option<Value>> {
        let descriptor = self.descriptor(name)?;
        descriptor.get(None, self.meta())
    }

    /// Query set over this model's table.
    pub fn objects<'c>(&self, connection: &'c dyn Connection) -> QuerySet<'c> {
        QuerySet::new(self.clone(), connection)
    }

    /// Build an instance from stored column values, bypassing descriptors.
    pub(crate) fn from_db(&self, values: impl IntoIterator<Item = (String, Value)>) -> Instance {
        let mut instance = Instance::new(self.clone());
        for (attname, value) in values {
            instance.store(&attname, value);
        }
        instance
    }
}

/// An instance of a model.
#[derive(Clone)]
pub struct Instance {
    model: Model,
    values: HashMap<String, Value>,
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("model", &self.model.meta().label())
            .field("values", &self.values)
            .finish()
    }
}

impl Instance {
    fn new(model: Model) -> Self {
        Self {
            model,
            values: HashMap::new(),
        }
    }

    /// The instance's model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Read an attribute through its descriptor.
    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        let descriptor = self.model.descriptor(name)?;
        descriptor.get(Some(self), self.model.meta())
    }

    /// Assign an attribute through its descriptor.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let descriptor = self.model.descriptor(name)?;
        descriptor.set(self, value.into())
    }

    /// Primary key value, once assigned.
    pub fn pk(&self) -> Option<&Value> {
        let attname = self.model.pk_field().attname();
        self.values.get(&attname).filter(|value| !value.is_null())
    }

    /// Raw slot value.
    pub fn value(&self, attname: &str) -> Option<&Value> {
        self.values.get(attname)
    }

    /// Check whether a slot holds a value.
    pub fn has_value(&self, attname: &str) -> bool {
        self.values.contains_key(attname)
    }

    /// Write a raw slot value.
    pub fn store(&mut self, attname: &str, value: Value) {
        self.values.insert(attname.to_string(), value);
    }
}
