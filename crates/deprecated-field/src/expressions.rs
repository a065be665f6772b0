//! The `NULL` literal substituted for deprecated columns.

use deprecated_field_core::{Connection, Expression, FieldDef, Result, SqlCompiler, Value};

/// An expression that always evaluates to NULL.
///
/// Renders as the bare literal `NULL` with no parameters. The output field
/// only types the result column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Null {
    output_field: Option<FieldDef>,
}

impl Null {
    /// A NULL literal typed as `output_field`.
    pub fn new(output_field: Option<FieldDef>) -> Self {
        Self { output_field }
    }
}

impl Expression for Null {
    fn as_sql(
        &self,
        _compiler: &SqlCompiler<'_>,
        _connection: &dyn Connection,
    ) -> Result<(String, Vec<Value>)> {
        Ok(("NULL".to_string(), Vec::new()))
    }

    fn output_field(&self) -> Option<&FieldDef> {
        self.output_field.as_ref()
    }
}
