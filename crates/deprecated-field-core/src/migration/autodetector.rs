//! Change detection between two project states.
//!
//! Compares the state reached by replaying migration history with the
//! state of the live models and produces the operations needed to move from
//! one to the other.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::operation::{Migration, Operation};
use super::state::{ModelState, ProjectState};

/// Computes migrations between two project states.
pub struct Autodetector<'a> {
    from: &'a ProjectState,
    to: &'a ProjectState,
}

impl<'a> Autodetector<'a> {
    /// Compare `from` (history) against `to` (current models).
    pub fn new(from: &'a ProjectState, to: &'a ProjectState) -> Self {
        Self { from, to }
    }

    /// Detected changes, one migration per app label.
    ///
    /// An empty `trim_to_apps` keeps every app.
    pub fn changes(&self, trim_to_apps: &[&str]) -> BTreeMap<String, Vec<Migration>> {
        let mut per_app: BTreeMap<String, Vec<Operation>> = BTreeMap::new();
        for operation in self.operations() {
            per_app
                .entry(operation.app_label().to_string())
                .or_default()
                .push(operation);
        }

        per_app
            .into_iter()
            .filter(|(app_label, _)| {
                trim_to_apps.is_empty() || trim_to_apps.contains(&app_label.as_str())
            })
            .map(|(app_label, operations)| {
                debug!(app_label = %app_label, operations = operations.len(), "detected changes");
                let migration = Migration::new(app_label.clone(), operations);
                (app_label, vec![migration])
            })
            .collect()
    }

    /// Every detected operation: created models, removed fields, added
    /// fields, altered fields, then deleted models.
    pub fn operations(&self) -> Vec<Operation> {
        let from_keys: BTreeSet<_> = self.from.models().map(key).collect();
        let to_keys: BTreeSet<_> = self.to.models().map(key).collect();

        let mut created = Vec::new();
        let mut removed = Vec::new();
        let mut added = Vec::new();
        let mut altered = Vec::new();
        let mut deleted = Vec::new();

        for model in self.to.models() {
            if !from_keys.contains(&key(model)) {
                created.push(Operation::CreateModel {
                    app_label: model.app_label.clone(),
                    name: model.name.clone(),
                    fields: model.fields.clone(),
                });
            }
        }

        for model in self.from.models() {
            if !to_keys.contains(&key(model)) {
                deleted.push(Operation::DeleteModel {
                    app_label: model.app_label.clone(),
                    name: model.name.clone(),
                });
            }
        }

        for to_model in self.to.models() {
            let Some(from_model) = self.from.get_model(&to_model.app_label, &to_model.name) else {
                continue;
            };
            Self::diff_fields(from_model, to_model, &mut removed, &mut added, &mut altered);
        }

        created
            .into_iter()
            .chain(removed)
            .chain(added)
            .chain(altered)
            .chain(deleted)
            .collect()
    }

    fn diff_fields(
        from: &ModelState,
        to: &ModelState,
        removed: &mut Vec<Operation>,
        added: &mut Vec<Operation>,
        altered: &mut Vec<Operation>,
    ) {
        let app_label = &to.app_label;
        let model_name = to.name_lower();

        // Removed fields
        for (name, _) in &from.fields {
            if to.get_field(name).is_none() {
                removed.push(Operation::RemoveField {
                    app_label: app_label.clone(),
                    model_name: model_name.clone(),
                    name: name.clone(),
                });
            }
        }

        for (name, to_field) in &to.fields {
            match from.get_field(name) {
                // Added fields
                None => added.push(Operation::AddField {
                    app_label: app_label.clone(),
                    model_name: model_name.clone(),
                    name: name.clone(),
                    field: to_field.clone(),
                }),
                // Modified fields
                Some(from_field) if from_field != to_field => {
                    altered.push(Operation::AlterField {
                        app_label: app_label.clone(),
                        model_name: model_name.clone(),
                        name: name.clone(),
                        field: to_field.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }
}

fn key(model: &ModelState) -> (String, String) {
    (model.app_label.clone(), model.name_lower())
}
