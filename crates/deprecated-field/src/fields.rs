//! The deprecated field wrapper.

use std::sync::Arc;

use deprecated_field_core::{
    Connection, Descriptor, Expression, Field, FieldDef, FieldDefault, FieldType, ModelRef,
    Result, Value,
};
use tracing::warn;

use crate::descriptor::DeprecatedFieldDescriptor;
use crate::escalate::{escalate, Touch, TouchKind};
use crate::expressions::Null;

/// Model label reported for touches of a field not yet attached to a model.
const UNBOUND: &str = "<unbound>";

/// A field whose column can be dropped in a later deploy.
///
/// The wrapper owns the original field definition and presents a different
/// face to each consumer of field metadata:
///
/// - Migration state records [`Field::clone_field`], which is a clone of the
///   original. The change detector sees an ordinary, nullable column.
/// - Query compilation resolves the column through [`Field::get_col`],
///   which yields a `NULL` literal, so SELECTs never reference the column.
/// - Attribute access goes through [`DeprecatedFieldDescriptor`], which
///   returns `None` and discards assignments.
/// - Update-style writes prepare the value for the original column type, so
///   an explicit `update()` still reaches the column.
///
/// Every one of these touches is escalated.
#[derive(Debug)]
pub struct DeprecatedField {
    original: FieldDef,
    name: String,
    model: Option<ModelRef>,
    concrete: bool,
}

impl DeprecatedField {
    /// Wrap `original`. Prefer [`deprecated`](crate::deprecated), which
    /// also makes the original nullable.
    pub fn new(original: FieldDef) -> Self {
        Self {
            original,
            name: String::new(),
            model: None,
            concrete: true,
        }
    }

    /// The wrapped field definition.
    pub fn original(&self) -> &FieldDef {
        &self.original
    }

    fn touch(&self, kind: TouchKind) -> Result<()> {
        let unbound;
        let model = match &self.model {
            Some(model) => model,
            None => {
                unbound = ModelRef::new(UNBOUND, UNBOUND);
                &unbound
            }
        };
        escalate(&Touch::new(kind, &self.name, model)).map_err(Into::into)
    }
}

impl Field for DeprecatedField {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> Option<&ModelRef> {
        self.model.as_ref()
    }

    fn is_concrete(&self) -> bool {
        self.concrete
    }

    fn is_primary_key(&self) -> bool {
        self.original.primary_key
    }

    fn attname(&self) -> String {
        self.original.attname_for(&self.name)
    }

    fn column(&self) -> String {
        self.original.column_for(&self.name)
    }

    fn field_type(&self) -> &FieldType {
        &self.original.field_type
    }

    fn clone_field(&self) -> FieldDef {
        self.original.clone_field()
    }

    fn contribute_to_class(&mut self, model: &ModelRef, name: &str) {
        if let Some(bound) = &self.model {
            warn!(
                field = %self.name,
                model = %bound,
                rebind = %model,
                "deprecated field is already bound; ignoring rebind"
            );
            return;
        }
        self.name = name.to_string();
        self.model = Some(model.clone());
        self.concrete = false;
    }

    fn get_col(&self, _alias: &str, output_field: Option<&FieldDef>) -> Result<Box<dyn Expression>> {
        self.touch(TouchKind::QueryReference)?;
        let output_field = output_field
            .cloned()
            .unwrap_or_else(|| self.original.clone_field());
        Ok(Box::new(Null::new(Some(output_field))))
    }

    fn get_db_prep_value(&self, value: Value, _connection: &dyn Connection) -> Result<Value> {
        self.original.field_type.prepare(&self.name, value)
    }

    fn get_db_prep_save(&self, value: Value, connection: &dyn Connection) -> Result<Value> {
        self.touch(TouchKind::Write)?;
        self.get_db_prep_value(value, connection)
    }

    fn get_default(&self) -> FieldDefault {
        FieldDefault::NotProvided
    }

    fn descriptor(&self) -> Arc<dyn Descriptor> {
        Arc::new(DeprecatedFieldDescriptor::new(self.name.clone()))
    }
}
