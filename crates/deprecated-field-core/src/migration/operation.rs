//! Migration operations.

use crate::catalog::FieldDef;

/// A single schema change.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Create a model and its table.
    CreateModel {
        /// Application label.
        app_label: String,
        /// Class name.
        name: String,
        /// Field definitions in declaration order.
        fields: Vec<(String, FieldDef)>,
    },
    /// Delete a model and its table.
    DeleteModel {
        /// Application label.
        app_label: String,
        /// Class name.
        name: String,
    },
    /// Add a field to a model.
    AddField {
        /// Application label.
        app_label: String,
        /// Lower-cased model name.
        model_name: String,
        /// Field name.
        name: String,
        /// New field definition.
        field: FieldDef,
    },
    /// Remove a field from a model.
    RemoveField {
        /// Application label.
        app_label: String,
        /// Lower-cased model name.
        model_name: String,
        /// Field name.
        name: String,
    },
    /// Change a field's definition.
    AlterField {
        /// Application label.
        app_label: String,
        /// Lower-cased model name.
        model_name: String,
        /// Field name.
        name: String,
        /// New field definition.
        field: FieldDef,
    },
}

impl Operation {
    /// Application label the operation belongs to.
    pub fn app_label(&self) -> &str {
        match self {
            Operation::CreateModel { app_label, .. }
            | Operation::DeleteModel { app_label, .. }
            | Operation::AddField { app_label, .. }
            | Operation::RemoveField { app_label, .. }
            | Operation::AlterField { app_label, .. } => app_label,
        }
    }

    /// Human readable description.
    pub fn describe(&self) -> String {
        match self {
            Operation::CreateModel { name, .. } => format!("Create model {}", name),
            Operation::DeleteModel { name, .. } => format!("Delete model {}", name),
            Operation::AddField {
                model_name, name, ..
            } => format!("Add field {} to {}", name, model_name),
            Operation::RemoveField {
                model_name, name, ..
            } => format!("Remove field {} from {}", name, model_name),
            Operation::AlterField {
                model_name, name, ..
            } => format!("Alter field {} on {}", name, model_name),
        }
    }

    /// Fragment used to name a migration holding only this operation.
    pub fn migration_name_fragment(&self) -> String {
        match self {
            Operation::CreateModel { name, .. } => name.to_lowercase(),
            Operation::DeleteModel { name, .. } => format!("delete_{}", name.to_lowercase()),
            Operation::AddField {
                model_name, name, ..
            } => format!("{}_{}", model_name, name),
            Operation::RemoveField {
                model_name, name, ..
            } => format!("remove_{}_{}", model_name, name),
            Operation::AlterField {
                model_name, name, ..
            } => format!("alter_{}_{}", model_name, name),
        }
    }
}

/// An ordered set of operations for one app.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    /// Application label.
    pub app_label: String,
    /// Migration name.
    pub name: String,
    /// Operations, applied in order.
    pub operations: Vec<Operation>,
}

impl Migration {
    /// Create a migration, naming it after its operations.
    pub fn new(app_label: impl Into<String>, operations: Vec<Operation>) -> Self {
        let name = match operations.as_slice() {
            [single] => single.migration_name_fragment(),
            _ => "auto".to_string(),
        };
        Self {
            app_label: app_label.into(),
            name,
            operations,
        }
    }
}
