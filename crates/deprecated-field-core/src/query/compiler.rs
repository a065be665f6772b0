//! SQL compilation.

use crate::backend::Connection;
use crate::error::Result;
use crate::expression::Expression;
use crate::value::Value;

/// Renders expressions for one connection.
pub struct SqlCompiler<'c> {
    connection: &'c dyn Connection,
}

impl<'c> SqlCompiler<'c> {
    /// Create a compiler for `connection`.
    pub fn new(connection: &'c dyn Connection) -> Self {
        Self { connection }
    }

    /// The connection SQL is compiled for.
    pub fn connection(&self) -> &'c dyn Connection {
        self.connection
    }

    /// Quote an identifier for the connection.
    pub fn quote_name(&self, name: &str) -> String {
        self.connection.quote_name(name)
    }

    /// Render an expression.
    pub fn compile(&self, expression: &dyn Expression) -> Result<(String, Vec<Value>)> {
        expression.as_sql(self, self.connection)
    }

    /// Render a list of expressions, joined by `", "`.
    pub fn compile_list(&self, expressions: &[Box<dyn Expression>]) -> Result<(String, Vec<Value>)> {
        let mut parts = Vec::with_capacity(expressions.len());
        let mut params = Vec::new();
        for expression in expressions {
            let (sql, mut expr_params) = self.compile(expression.as_ref())?;
            parts.push(sql);
            params.append(&mut expr_params);
        }
        Ok((parts.join(", "), params))
    }
}
