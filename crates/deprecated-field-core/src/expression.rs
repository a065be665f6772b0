//! SQL expressions.

use std::fmt;

use crate::backend::Connection;
use crate::catalog::FieldDef;
use crate::error::Result;
use crate::query::SqlCompiler;
use crate::value::Value;

/// An expression the query compiler can render into SQL.
pub trait Expression: fmt::Debug + Send + Sync {
    /// Render the expression as SQL text and its bound parameters.
    fn as_sql(
        &self,
        compiler: &SqlCompiler<'_>,
        connection: &dyn Connection,
    ) -> Result<(String, Vec<Value>)>;

    /// The field describing the expression's result type.
    fn output_field(&self) -> Option<&FieldDef>;
}

/// Reference to a table column.
#[derive(Debug, Clone, PartialEq)]
pub struct Col {
    alias: String,
    column: String,
    output_field: FieldDef,
}

impl Col {
    /// Create a column reference `alias.column`.
    pub fn new(alias: impl Into<String>, column: impl Into<String>, output_field: FieldDef) -> Self {
        Self {
            alias: alias.into(),
            column: column.into(),
            output_field,
        }
    }

    /// Table alias.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Column name.
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Expression for Col {
    fn as_sql(
        &self,
        compiler: &SqlCompiler<'_>,
        _connection: &dyn Connection,
    ) -> Result<(String, Vec<Value>)> {
        let sql = format!(
            "{}.{}",
            compiler.quote_name(&self.alias),
            compiler.quote_name(&self.column)
        );
        Ok((sql, Vec::new()))
    }

    fn output_field(&self) -> Option<&FieldDef> {
        Some(&self.output_field)
    }
}
