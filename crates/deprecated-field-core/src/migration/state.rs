//! Project state: the field definitions migrations are computed against.

use std::collections::BTreeMap;

use super::operation::Operation;
use crate::catalog::FieldDef;
use crate::error::{Error, Result};
use crate::model::Model;

/// Migration-time snapshot of one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelState {
    /// Application label.
    pub app_label: String,
    /// Class name.
    pub name: String,
    /// Unbound field definitions keyed by attribute name, in declaration order.
    pub fields: Vec<(String, FieldDef)>,
}

impl ModelState {
    /// Create an empty model state.
    pub fn new(app_label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, name: impl Into<String>, field: FieldDef) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    /// Snapshot a live model.
    ///
    /// Every local field is recorded through [`Field::clone_field`], whether
    /// or not it is concrete.
    ///
    /// [`Field::clone_field`]: crate::field::Field::clone_field
    pub fn from_model(model: &Model) -> Self {
        let meta = model.meta();
        Self {
            app_label: meta.app_label().to_string(),
            name: meta.qualname().to_string(),
            fields: model
                .fields()
                .map(|field| (field.name().to_string(), field.clone_field()))
                .collect(),
        }
    }

    /// Lower-cased class name.
    pub fn name_lower(&self) -> String {
        self.name.to_lowercase()
    }

    /// Database table name.
    pub fn db_table(&self) -> String {
        format!("{}_{}", self.app_label, self.name_lower())
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, field)| field)
    }

    fn get_field_mut(&mut self, name: &str) -> Option<&mut FieldDef> {
        self.fields
            .iter_mut()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, field)| field)
    }
}

/// Snapshot of every model in a project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectState {
    models: BTreeMap<(String, String), ModelState>,
}

impl ProjectState {
    /// Create an empty project state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot live models.
    pub fn from_models<'a>(models: impl IntoIterator<Item = &'a Model>) -> Self {
        let mut state = Self::new();
        for model in models {
            state.add_model(ModelState::from_model(model));
        }
        state
    }

    /// Replay a migration history.
    pub fn from_operations<'a>(operations: impl IntoIterator<Item = &'a Operation>) -> Result<Self> {
        let mut state = Self::new();
        for operation in operations {
            state.apply(operation)?;
        }
        Ok(state)
    }

    /// Insert or replace a model.
    pub fn add_model(&mut self, model: ModelState) {
        let key = (model.app_label.clone(), model.name_lower());
        self.models.insert(key, model);
    }

    /// Look up a model by app label and (case-insensitive) name.
    pub fn get_model(&self, app_label: &str, name: &str) -> Option<&ModelState> {
        self.models
            .get(&(app_label.to_string(), name.to_lowercase()))
    }

    /// All models, ordered by app label and name.
    pub fn models(&self) -> impl Iterator<Item = &ModelState> {
        self.models.values()
    }

    /// Check whether the project has no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Apply an operation's effect on the state.
    pub fn apply(&mut self, operation: &Operation) -> Result<()> {
        match operation {
            Operation::CreateModel {
                app_label,
                name,
                fields,
            } => {
                self.add_model(ModelState {
                    app_label: app_label.clone(),
                    name: name.clone(),
                    fields: fields.clone(),
                });
            }
            Operation::DeleteModel { app_label, name } => {
                self.models
                    .remove(&(app_label.clone(), name.to_lowercase()))
                    .ok_or_else(|| missing_model(app_label, name))?;
            }
            Operation::AddField {
                app_label,
                model_name,
                name,
                field,
            } => {
                let model = self.model_mut(app_label, model_name)?;
                if model.get_field(name).is_some() {
                    return Err(Error::Unsupported(format!(
                        "field {} already exists on {}.{}",
                        name, app_label, model_name
                    )));
                }
                model.fields.push((name.clone(), field.clone()));
            }
            Operation::RemoveField {
                app_label,
                model_name,
                name,
            } => {
                let model = self.model_mut(app_label, model_name)?;
                let before = model.fields.len();
                model.fields.retain(|(field_name, _)| field_name != name);
                if model.fields.len() == before {
                    return Err(Error::field_does_not_exist(
                        format!("{}.{}", app_label, model_name),
                        name.clone(),
                    ));
                }
            }
            Operation::AlterField {
                app_label,
                model_name,
                name,
                field,
            } => {
                let model = self.model_mut(app_label, model_name)?;
                let slot = model.get_field_mut(name).ok_or_else(|| {
                    Error::field_does_not_exist(format!("{}.{}", app_label, model_name), name.clone())
                })?;
                *slot = field.clone();
            }
        }
        Ok(())
    }

    fn model_mut(&mut self, app_label: &str, name: &str) -> Result<&mut ModelState> {
        self.models
            .get_mut(&(app_label.to_string(), name.to_lowercase()))
            .ok_or_else(|| missing_model(app_label, name))
    }
}

fn missing_model(app_label: &str, name: &str) -> Error {
    Error::Unsupported(format!("no model {}.{} in project state", app_label, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OnDelete;

    fn initial() -> Vec<Operation> {
        vec![
            Operation::CreateModel {
                app_label: "tests".into(),
                name: "Artist".into(),
                fields: vec![
                    ("id".into(), FieldDef::auto()),
                    ("name".into(), FieldDef::char(256)),
                ],
            },
            Operation::CreateModel {
                app_label: "tests".into(),
                name: "Album".into(),
                fields: vec![("id".into(), FieldDef::auto())],
            },
        ]
    }

    #[test]
    fn test_from_operations() {
        let state = ProjectState::from_operations(&initial()).unwrap();
        let artist = state.get_model("tests", "artist").unwrap();
        assert_eq!(artist.get_field("name"), Some(&FieldDef::char(256)));
        assert_eq!(artist.db_table(), "tests_artist");
        assert_eq!(state.models().count(), 2);
    }

    #[test]
    fn test_apply_field_operations() {
        let mut state = ProjectState::from_operations(&initial()).unwrap();

        state
            .apply(&Operation::AddField {
                app_label: "tests".into(),
                model_name: "album".into(),
                name: "artist".into(),
                field: FieldDef::foreign_key("tests.Artist", OnDelete::Cascade),
            })
            .unwrap();
        state
            .apply(&Operation::AlterField {
                app_label: "tests".into(),
                model_name: "artist".into(),
                name: "name".into(),
                field: FieldDef::char(256).null(),
            })
            .unwrap();
        state
            .apply(&Operation::RemoveField {
                app_label: "tests".into(),
                model_name: "album".into(),
                name: "artist".into(),
            })
            .unwrap();

        let artist = state.get_model("tests", "Artist").unwrap();
        assert!(artist.get_field("name").unwrap().null);
        assert!(state
            .get_model("tests", "Album")
            .unwrap()
            .get_field("artist")
            .is_none());
    }

    #[test]
    fn test_apply_rejects_missing_targets() {
        let mut state = ProjectState::from_operations(&initial()).unwrap();
        assert!(state
            .apply(&Operation::RemoveField {
                app_label: "tests".into(),
                model_name: "artist".into(),
                name: "bio".into(),
            })
            .is_err());
        assert!(state
            .apply(&Operation::DeleteModel {
                app_label: "tests".into(),
                name: "Genre".into(),
            })
            .is_err());
    }

    #[test]
    fn test_from_model_records_clones() {
        let model = Model::builder("tests.models", "Artist")
            .field("name", FieldDef::char(256))
            .build();
        let state = ModelState::from_model(&model);

        assert_eq!(state.app_label, "tests");
        assert_eq!(state.name, "Artist");
        let name = state.get_field("name").unwrap();
        assert!(!name.is_bound());
        assert_eq!(name, &FieldDef::char(256));
    }
}
