//! DDL execution for migration operations.

use tracing::{info, warn};

use super::operation::{Migration, Operation};
use super::state::{ModelState, ProjectState};
use crate::backend::Connection;
use crate::catalog::{FieldDef, FieldType};
use crate::error::{Error, Result};

/// Applies migration operations to a database.
pub struct SchemaEditor<'c> {
    connection: &'c dyn Connection,
}

impl<'c> SchemaEditor<'c> {
    /// Create an editor for `connection`.
    pub fn new(connection: &'c dyn Connection) -> Self {
        Self { connection }
    }

    /// Apply every operation of a migration, advancing `state`.
    pub fn migrate(&self, state: &mut ProjectState, migration: &Migration) -> Result<()> {
        for operation in &migration.operations {
            self.apply(state, operation)?;
        }
        info!(
            app_label = %migration.app_label,
            migration = %migration.name,
            operations = migration.operations.len(),
            "migration applied"
        );
        Ok(())
    }

    /// Apply one operation to the database, then to `state`.
    pub fn apply(&self, state: &mut ProjectState, operation: &Operation) -> Result<()> {
        match operation {
            Operation::CreateModel {
                app_label,
                name,
                fields,
            } => {
                let model = ModelState {
                    app_label: app_label.clone(),
                    name: name.clone(),
                    fields: fields.clone(),
                };
                self.create_model(&model)?;
            }
            Operation::DeleteModel { app_label, name } => {
                let model = lookup(state, app_label, name)?;
                self.delete_model(model)?;
            }
            Operation::AddField {
                app_label,
                model_name,
                name,
                field,
            } => {
                let model = lookup(state, app_label, model_name)?;
                self.add_field(model, name, field)?;
            }
            Operation::RemoveField { .. } | Operation::AlterField { .. } => {
                let (app_label, model_name) = (operation.app_label(), model_name(operation));
                let old = lookup(state, app_label, &model_name)?;
                let mut altered = state.clone();
                altered.apply(operation)?;
                let new = lookup(&altered, app_label, &model_name)?;
                self.remake_table(old, new)?;
            }
        }
        state.apply(operation)
    }

    /// `CREATE TABLE` for a model.
    pub fn create_model(&self, model: &ModelState) -> Result<()> {
        let sql = self.table_sql(&model.db_table(), model)?;
        self.connection.execute(&sql, &[])?;
        Ok(())
    }

    /// `DROP TABLE` for a model.
    pub fn delete_model(&self, model: &ModelState) -> Result<()> {
        let sql = format!("DROP TABLE {}", self.quote(&model.db_table()));
        self.connection.execute(&sql, &[])?;
        Ok(())
    }

    /// `ALTER TABLE ... ADD COLUMN`.
    pub fn add_field(&self, model: &ModelState, name: &str, field: &FieldDef) -> Result<()> {
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote(&model.db_table()),
            self.column_sql(name, field)?
        );
        self.connection.execute(&sql, &[])?;
        Ok(())
    }

    /// Rebuild a table with a new definition, keeping its rows.
    ///
    /// SQLite can neither alter a column in place nor drop one that takes
    /// part in a foreign key, so both go through a copy of the table.
    /// Foreign key enforcement is off while the old table is dropped, or
    /// the drop would cascade into referencing tables. The copy runs in a
    /// transaction, so a failed rebuild leaves the original table untouched.
    pub fn remake_table(&self, old: &ModelState, new: &ModelState) -> Result<()> {
        let table = new.db_table();
        let temp = format!("new__{}", table);

        let columns: Vec<String> = new
            .fields
            .iter()
            .filter(|(name, _)| old.get_field(name).is_some())
            .map(|(name, field)| self.quote(&field.column_for(name)))
            .collect();
        let columns = columns.join(", ");

        self.connection.execute("PRAGMA foreign_keys = OFF", &[])?;
        let rebuilt = self.atomic(|| self.copy_table(&temp, &table, &columns, new));
        self.connection.execute("PRAGMA foreign_keys = ON", &[])?;
        rebuilt
    }

    fn atomic(&self, body: impl FnOnce() -> Result<()>) -> Result<()> {
        self.connection.execute("BEGIN TRANSACTION", &[])?;
        match body() {
            Ok(()) => {
                self.connection.execute("COMMIT", &[])?;
                Ok(())
            }
            Err(err) => {
                if let Err(rollback) = self.connection.execute("ROLLBACK", &[]) {
                    warn!(error = %rollback, "rollback after failed table rebuild failed");
                }
                Err(err)
            }
        }
    }

    fn copy_table(&self, temp: &str, table: &str, columns: &str, new: &ModelState) -> Result<()> {
        self.connection.execute(&self.table_sql(temp, new)?, &[])?;
        self.connection.execute(
            &format!(
                "INSERT INTO {} ({}) SELECT {} FROM {}",
                self.quote(temp),
                columns,
                columns,
                self.quote(table)
            ),
            &[],
        )?;
        self.connection
            .execute(&format!("DROP TABLE {}", self.quote(table)), &[])?;
        self.connection.execute(
            &format!(
                "ALTER TABLE {} RENAME TO {}",
                self.quote(temp),
                self.quote(table)
            ),
            &[],
        )?;
        Ok(())
    }

    fn table_sql(&self, table: &str, model: &ModelState) -> Result<String> {
        let columns = model
            .fields
            .iter()
            .map(|(name, field)| self.column_sql(name, field))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "CREATE TABLE {} ({})",
            self.quote(table),
            columns.join(", ")
        ))
    }

    fn column_sql(&self, name: &str, field: &FieldDef) -> Result<String> {
        let mut sql = format!(
            "{} {}",
            self.quote(&field.column_for(name)),
            field.field_type.db_type()
        );
        sql.push_str(if field.null { " NULL" } else { " NOT NULL" });

        if field.primary_key {
            sql.push_str(" PRIMARY KEY");
            if field.field_type == FieldType::Auto {
                sql.push_str(" AUTOINCREMENT");
            }
        }

        if let FieldType::ForeignKey { to, on_delete } = &field.field_type {
            let (app_label, model) = to.split_once('.').ok_or_else(|| Error::InvalidValue {
                field: name.to_string(),
                reason: format!("foreign key target \"{}\" is not app_label.Model", to),
            })?;
            let target = format!("{}_{}", app_label, model.to_lowercase());
            sql.push_str(&format!(
                " REFERENCES {} ({}) ON DELETE {}",
                self.quote(&target),
                self.quote("id"),
                on_delete.as_sql()
            ));
        }

        Ok(sql)
    }

    fn quote(&self, name: &str) -> String {
        self.connection.quote_name(name)
    }
}

fn lookup<'s>(state: &'s ProjectState, app_label: &str, name: &str) -> Result<&'s ModelState> {
    state
        .get_model(app_label, name)
        .ok_or_else(|| Error::Unsupported(format!("no model {}.{} in project state", app_label, name)))
}

fn model_name(operation: &Operation) -> String {
    match operation {
        Operation::AddField { model_name, .. }
        | Operation::RemoveField { model_name, .. }
        | Operation::AlterField { model_name, .. } => model_name.clone(),
        Operation::CreateModel { name, .. } | Operation::DeleteModel { name, .. } => name.clone(),
    }
}
