//! Query sets: SELECT, INSERT and UPDATE over one model's table.

use std::collections::BTreeMap;

use tracing::debug;

use super::compiler::SqlCompiler;
use crate::backend::Connection;
use crate::error::{Error, Result};
use crate::expression::Expression;
use crate::field::Field;
use crate::model::{Instance, Model};
use crate::value::Value;

/// A lazily evaluated query over a model's table.
///
/// Every column a SELECT or WHERE clause refers to is resolved through
/// [`Field::get_col`]. Inserts write the concrete fields' slots directly and
/// never touch descriptors. Updates prepare each assigned value with
/// [`Field::get_db_prep_save`] and write the field's column.
pub struct QuerySet<'c> {
    model: Model,
    connection: &'c dyn Connection,
    filters: Vec<(String, Value)>,
}

impl<'c> QuerySet<'c> {
    /// Query set over every row of `model`.
    pub fn new(model: Model, connection: &'c dyn Connection) -> Self {
        Self {
            model,
            connection,
            filters: Vec::new(),
        }
    }

    /// The queried model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Restrict to rows where `name` equals `value`.
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((name.into(), value.into()));
        self
    }

    /// SQL and parameters of the projection `fields`.
    ///
    /// An empty list selects the concrete fields.
    pub fn sql_with_params(&self, fields: &[&str]) -> Result<(String, Vec<Value>)> {
        let columns = self.resolve_columns(&self.projection(fields))?;
        self.select_sql(&columns)
    }

    /// Rows of `fields`, in order.
    pub fn values_list(&self, fields: &[&str]) -> Result<Vec<Vec<Value>>> {
        let columns = self.resolve_columns(&self.projection(fields))?;
        self.fetch(&columns)
    }

    /// Rows of `fields`, keyed by field name.
    pub fn values(&self, fields: &[&str]) -> Result<Vec<BTreeMap<String, Value>>> {
        let names = self.projection(fields);
        let columns = self.resolve_columns(&names)?;
        let rows = self.fetch(&columns)?;
        Ok(rows
            .into_iter()
            .map(|row| names.iter().cloned().zip(row).collect())
            .collect())
    }

    /// Load every matching row as an instance.
    pub fn all(&self) -> Result<Vec<Instance>> {
        let fields: Vec<&dyn Field> = self.model.concrete_fields().collect();
        let alias = self.alias();
        let columns = fields
            .iter()
            .map(|field| field.get_col(&alias, None))
            .collect::<Result<Vec<_>>>()?;
        let rows = self.fetch(&columns)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let slots = fields.iter().map(|field| field.attname()).zip(row);
                self.model.from_db(slots)
            })
            .collect())
    }

    /// Number of matching rows.
    pub fn count(&self) -> Result<usize> {
        let compiler = self.compiler();
        let (where_sql, params) = self.where_sql(&compiler)?;
        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            compiler.quote_name(&self.alias()),
            where_sql
        );
        let rows = self.connection.query(&sql, &params)?;
        rows.first()
            .and_then(|row| row.first())
            .and_then(Value::as_i64)
            .map(|count| count as usize)
            .ok_or_else(|| Error::Unsupported("COUNT returned no rows".to_string()))
    }

    /// Construct an instance and insert it.
    pub fn create<I, K, V>(&self, kwargs: I) -> Result<Instance>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut instance = self.model.init(kwargs)?;
        self.save(&mut instance)?;
        Ok(instance)
    }

    /// Insert a new instance or update an existing one by primary key.
    pub fn save(&self, instance: &mut Instance) -> Result<()> {
        if instance.pk().is_some() {
            self.update_instance(instance)
        } else {
            self.insert_instance(instance)
        }
    }

    /// Insert already constructed instances.
    pub fn bulk_create(&self, mut instances: Vec<Instance>) -> Result<Vec<Instance>> {
        for instance in &mut instances {
            self.insert_instance(instance)?;
        }
        debug!(
            model = %self.model.meta(),
            rows = instances.len(),
            "bulk create complete"
        );
        Ok(instances)
    }

    /// Assign columns on every matching row.
    pub fn update<I, K, V>(&self, assignments: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let compiler = self.compiler();
        let mut sets = Vec::new();
        let mut params = Vec::new();
        for (name, value) in assignments {
            let field = self.model.get_field(name.as_ref())?;
            let prepared = field.get_db_prep_save(value.into(), self.connection)?;
            sets.push(format!("{} = ?", compiler.quote_name(&field.column())));
            params.push(prepared);
        }
        if sets.is_empty() {
            return Ok(0);
        }

        let (where_sql, mut where_params) = self.where_sql(&compiler)?;
        params.append(&mut where_params);
        let sql = format!(
            "UPDATE {} SET {}{}",
            compiler.quote_name(&self.alias()),
            sets.join(", "),
            where_sql
        );
        self.connection.execute(&sql, &params)
    }

    fn alias(&self) -> String {
        self.model.meta().db_table()
    }

    fn compiler(&self) -> SqlCompiler<'c> {
        SqlCompiler::new(self.connection)
    }

    fn projection(&self, fields: &[&str]) -> Vec<String> {
        if fields.is_empty() {
            self.model
                .concrete_fields()
                .map(|field| field.name().to_string())
                .collect()
        } else {
            fields.iter().map(|name| name.to_string()).collect()
        }
    }

    fn resolve_columns(&self, names: &[String]) -> Result<Vec<Box<dyn Expression>>> {
        let alias = self.alias();
        names
            .iter()
            .map(|name| self.model.get_field(name)?.get_col(&alias, None))
            .collect()
    }

    fn where_sql(&self, compiler: &SqlCompiler<'_>) -> Result<(String, Vec<Value>)> {
        if self.filters.is_empty() {
            return Ok((String::new(), Vec::new()));
        }

        let alias = self.alias();
        let mut parts = Vec::with_capacity(self.filters.len());
        let mut params = Vec::new();
        for (name, value) in &self.filters {
            let field = self.model.get_field(name)?;
            let lhs = field.get_col(&alias, None)?;
            let (sql, mut lhs_params) = compiler.compile(lhs.as_ref())?;
            params.append(&mut lhs_params);
            if value.is_null() {
                parts.push(format!("{} IS NULL", sql));
            } else {
                parts.push(format!("{} = ?", sql));
                params.push(field.get_db_prep_value(value.clone(), self.connection)?);
            }
        }
        Ok((format!(" WHERE {}", parts.join(" AND ")), params))
    }

    fn select_sql(&self, columns: &[Box<dyn Expression>]) -> Result<(String, Vec<Value>)> {
        let compiler = self.compiler();
        let (select, mut params) = compiler.compile_list(columns)?;
        let (where_sql, mut where_params) = self.where_sql(&compiler)?;
        params.append(&mut where_params);
        let sql = format!(
            "SELECT {} FROM {}{}",
            select,
            compiler.quote_name(&self.alias()),
            where_sql
        );
        Ok((sql, params))
    }

    fn fetch(&self, columns: &[Box<dyn Expression>]) -> Result<Vec<Vec<Value>>> {
        let (sql, params) = self.select_sql(columns)?;
        let rows = self.connection.query(&sql, &params)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(columns)
                    .map(|(value, column)| match column.output_field() {
                        Some(field) => field.field_type.from_db(value),
                        None => value,
                    })
                    .collect()
            })
            .collect())
    }

    fn insert_instance(&self, instance: &mut Instance) -> Result<()> {
        let compiler = self.compiler();
        let mut columns = Vec::new();
        let mut params = Vec::new();
        for field in self.model.concrete_fields() {
            let value = match instance.value(&field.attname()) {
                Some(value) => value.clone(),
                None if field.is_primary_key() => continue,
                None => Value::Null,
            };
            columns.push(compiler.quote_name(&field.column()));
            params.push(field.get_db_prep_save(value, self.connection)?);
        }

        let table = compiler.quote_name(&self.alias());
        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns.join(", "),
                vec!["?"; columns.len()].join(", ")
            )
        };
        self.connection.execute(&sql, &params)?;

        if instance.pk().is_none() {
            let pk = self.model.pk_field().attname();
            instance.store(&pk, Value::Int64(self.connection.last_insert_id()));
        }
        Ok(())
    }

    fn update_instance(&self, instance: &Instance) -> Result<()> {
        let compiler = self.compiler();
        let pk_field = self.model.pk_field();
        let mut sets = Vec::new();
        let mut params = Vec::new();
        for field in self.model.concrete_fields() {
            if field.is_primary_key() {
                continue;
            }
            let value = instance
                .value(&field.attname())
                .cloned()
                .unwrap_or(Value::Null);
            sets.push(format!("{} = ?", compiler.quote_name(&field.column())));
            params.push(field.get_db_prep_save(value, self.connection)?);
        }
        if sets.is_empty() {
            return Ok(());
        }

        let pk = instance.pk().cloned().unwrap_or(Value::Null);
        params.push(pk_field.get_db_prep_value(pk, self.connection)?);
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            compiler.quote_name(&self.alias()),
            sets.join(", "),
            compiler.quote_name(&pk_field.column())
        );
        self.connection.execute(&sql, &params)?;
        Ok(())
    }
}
