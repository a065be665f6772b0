//! Concrete field definitions.

use std::sync::Arc;

use super::types::{FieldType, OnDelete};
use crate::backend::Connection;
use crate::descriptor::{Descriptor, FieldDescriptor};
use crate::error::Result;
use crate::expression::{Col, Expression};
use crate::field::{Field, FieldDefault};
use crate::model::ModelRef;
use crate::value::Value;

/// A field backed by a database column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Attribute name. Empty until bound to a model.
    pub name: String,
    /// Column type.
    pub field_type: FieldType,
    /// Whether the column accepts NULL.
    pub null: bool,
    /// Whether this is the primary key.
    pub primary_key: bool,
    /// Default value if the constructor omits the field.
    pub default: Option<Value>,
    /// Explicit column name.
    pub db_column: Option<String>,
    /// Reverse accessor name on the referenced model.
    pub related_name: Option<String>,
    /// Owning model, set when bound.
    pub model: Option<ModelRef>,
}

impl FieldDef {
    /// Create a new non-null field of the given type.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            name: String::new(),
            field_type,
            null: false,
            primary_key: false,
            default: None,
            db_column: None,
            related_name: None,
            model: None,
        }
    }

    /// Auto-incrementing primary key.
    pub fn auto() -> Self {
        Self::new(FieldType::Auto).primary_key()
    }

    /// Boolean field.
    pub fn boolean() -> Self {
        Self::new(FieldType::Bool)
    }

    /// 32-bit integer field.
    pub fn integer() -> Self {
        Self::new(FieldType::Integer)
    }

    /// 64-bit integer field.
    pub fn big_integer() -> Self {
        Self::new(FieldType::BigInteger)
    }

    /// Floating point field.
    pub fn float() -> Self {
        Self::new(FieldType::Float)
    }

    /// Character field with a maximum length.
    pub fn char(max_length: u32) -> Self {
        Self::new(FieldType::Char {
            max_length: Some(max_length),
        })
    }

    /// Character field without a maximum length.
    pub fn char_unbounded() -> Self {
        Self::new(FieldType::Char { max_length: None })
    }

    /// Text field.
    pub fn text() -> Self {
        Self::new(FieldType::Text)
    }

    /// Binary field.
    pub fn bytes() -> Self {
        Self::new(FieldType::Bytes)
    }

    /// Foreign key to the model labelled `to` (`app_label.ModelName`).
    pub fn foreign_key(to: impl Into<String>, on_delete: OnDelete) -> Self {
        Self::new(FieldType::ForeignKey {
            to: to.into(),
            on_delete,
        })
    }

    /// Allow NULL.
    pub fn null(mut self) -> Self {
        self.null = true;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set an explicit column name.
    pub fn with_db_column(mut self, column: impl Into<String>) -> Self {
        self.db_column = Some(column.into());
        self
    }

    /// Set the reverse accessor name.
    pub fn with_related_name(mut self, name: impl Into<String>) -> Self {
        self.related_name = Some(name.into());
        self
    }

    /// Mark as primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Check if this field has been bound to a model.
    pub fn is_bound(&self) -> bool {
        self.model.is_some()
    }

    /// Slot name this definition uses when bound under `name`.
    pub fn attname_for(&self, name: &str) -> String {
        if self.field_type.is_relation() {
            format!("{}_id", name)
        } else {
            name.to_string()
        }
    }

    /// Column name this definition uses when bound under `name`.
    pub fn column_for(&self, name: &str) -> String {
        self.db_column
            .clone()
            .unwrap_or_else(|| self.attname_for(name))
    }
}

impl Field for FieldDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> Option<&ModelRef> {
        self.model.as_ref()
    }

    fn is_concrete(&self) -> bool {
        true
    }

    fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    fn attname(&self) -> String {
        self.attname_for(&self.name)
    }

    fn column(&self) -> String {
        self.column_for(&self.name)
    }

    fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    fn clone_field(&self) -> FieldDef {
        FieldDef {
            name: String::new(),
            model: None,
            ..self.clone()
        }
    }

    fn contribute_to_class(&mut self, model: &ModelRef, name: &str) {
        self.name = name.to_string();
        self.model = Some(model.clone());
    }

    fn get_col(&self, alias: &str, output_field: Option<&FieldDef>) -> Result<Box<dyn Expression>> {
        let output_field = output_field
            .cloned()
            .unwrap_or_else(|| self.clone_field());
        Ok(Box::new(Col::new(alias, self.column(), output_field)))
    }

    fn get_db_prep_value(&self, value: Value, _connection: &dyn Connection) -> Result<Value> {
        self.field_type.prepare(&self.name, value)
    }

    fn get_default(&self) -> FieldDefault {
        if let Some(default) = &self.default {
            return FieldDefault::Value(default.clone());
        }
        match self.field_type {
            FieldType::Auto => FieldDefault::NotProvided,
            FieldType::Char { .. } | FieldType::Text if !self.null => {
                FieldDefault::Value(Value::String(String::new()))
            }
            _ => FieldDefault::Value(Value::Null),
        }
    }

    fn descriptor(&self) -> Arc<dyn Descriptor> {
        Arc::new(FieldDescriptor::new(self.name.clone(), self.attname()))
    }
}
