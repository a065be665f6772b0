//! Field capability.
//!
//! Every entry in a model's field list implements [`Field`]. The model,
//! query and migration layers only ever talk to fields through this trait,
//! so a field type can change how it is read, written, selected and
//! recorded in migration state by overriding the relevant hook.

use std::fmt;
use std::sync::Arc;

use crate::backend::Connection;
use crate::catalog::{FieldDef, FieldType};
use crate::descriptor::Descriptor;
use crate::error::Result;
use crate::expression::Expression;
use crate::model::ModelRef;
use crate::value::Value;

/// Result of [`Field::get_default`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
    /// Leave the instance slot unset.
    NotProvided,
    /// Store this value in the instance slot.
    Value(Value),
}

/// Hooks the host framework calls on a model field.
pub trait Field: fmt::Debug + Send + Sync {
    /// Attribute name on the model. Empty until the field is bound.
    fn name(&self) -> &str;

    /// The model this field is bound to.
    fn model(&self) -> Option<&ModelRef>;

    /// Whether the framework reads and writes this field's column by default.
    fn is_concrete(&self) -> bool;

    /// Whether this field is the model's primary key.
    fn is_primary_key(&self) -> bool {
        false
    }

    /// Name of the instance slot holding the field's value.
    fn attname(&self) -> String;

    /// Database column name.
    fn column(&self) -> String;

    /// The field's column type.
    fn field_type(&self) -> &FieldType;

    /// Unbound copy of the field definition, as recorded in migration state.
    fn clone_field(&self) -> FieldDef;

    /// Bind the field to a model under `name`.
    fn contribute_to_class(&mut self, model: &ModelRef, name: &str);

    /// Column expression used when the field is selected or filtered on.
    fn get_col(&self, alias: &str, output_field: Option<&FieldDef>) -> Result<Box<dyn Expression>>;

    /// Convert a value into its database representation.
    fn get_db_prep_value(&self, value: Value, connection: &dyn Connection) -> Result<Value>;

    /// Convert a value that is about to be saved.
    fn get_db_prep_save(&self, value: Value, connection: &dyn Connection) -> Result<Value> {
        self.get_db_prep_value(value, connection)
    }

    /// Value stored on a new instance when the constructor omits the field.
    fn get_default(&self) -> FieldDefault;

    /// Attribute descriptor installed on the model for this field.
    fn descriptor(&self) -> Arc<dyn Descriptor>;
}
