//! Column type definitions for the catalog.

use crate::error::{Error, Result};
use crate::value::Value;

/// Behavior of a foreign key when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnDelete {
    /// Delete referencing rows.
    Cascade,
    /// Set the referencing column to null.
    SetNull,
    /// Refuse the delete.
    Restrict,
    /// Leave referencing rows untouched.
    DoNothing,
}

impl OnDelete {
    /// SQL clause for the referential action.
    pub fn as_sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
            OnDelete::Restrict => "RESTRICT",
            OnDelete::DoNothing => "NO ACTION",
        }
    }
}

/// Field types supported by model fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Auto-incrementing integer primary key.
    Auto,
    /// Boolean value.
    Bool,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInteger,
    /// 64-bit floating point.
    Float,
    /// Bounded or unbounded character data.
    Char {
        /// Maximum length, if bounded.
        max_length: Option<u32>,
    },
    /// Unbounded text.
    Text,
    /// Binary data.
    Bytes,
    /// Reference to another model's primary key.
    ForeignKey {
        /// Qualified label of the referenced model (`app_label.ModelName`).
        to: String,
        /// Referential action on delete.
        on_delete: OnDelete,
    },
}

impl FieldType {
    /// Check if this type references another model.
    pub fn is_relation(&self) -> bool {
        matches!(self, FieldType::ForeignKey { .. })
    }

    /// The column type used in DDL.
    pub fn db_type(&self) -> String {
        match self {
            FieldType::Auto => "integer".to_string(),
            FieldType::Bool => "bool".to_string(),
            FieldType::Integer => "integer".to_string(),
            FieldType::BigInteger | FieldType::ForeignKey { .. } => "bigint".to_string(),
            FieldType::Float => "real".to_string(),
            FieldType::Char {
                max_length: Some(len),
            } => format!("varchar({})", len),
            FieldType::Char { max_length: None } | FieldType::Text => "text".to_string(),
            FieldType::Bytes => "blob".to_string(),
        }
    }

    /// Coerce a value into the representation stored in the column.
    ///
    /// Null always passes through; nullability is enforced by the database.
    pub fn prepare(&self, field: &str, value: Value) -> Result<Value> {
        let invalid = |value: &Value| Error::InvalidValue {
            field: field.to_string(),
            reason: format!("{} is not valid for {:?}", value.kind(), self),
        };

        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),

            (
                FieldType::Auto
                | FieldType::Integer
                | FieldType::BigInteger
                | FieldType::ForeignKey { .. },
                value,
            ) => match value {
                Value::Int64(i) => Ok(Value::Int64(i)),
                Value::Bool(b) => Ok(Value::Int64(b as i64)),
                Value::String(ref s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int64)
                    .map_err(|_| invalid(&value)),
                other => Err(invalid(&other)),
            },

            (FieldType::Bool, value) => match value {
                Value::Bool(b) => Ok(Value::Bool(b)),
                Value::Int64(0) => Ok(Value::Bool(false)),
                Value::Int64(1) => Ok(Value::Bool(true)),
                other => Err(invalid(&other)),
            },

            (FieldType::Float, value) => match value {
                Value::Float64(f) => Ok(Value::Float64(f)),
                Value::Int64(i) => Ok(Value::Float64(i as f64)),
                other => Err(invalid(&other)),
            },

            (FieldType::Char { .. } | FieldType::Text, value) => match value {
                Value::String(s) => Ok(Value::String(s)),
                Value::Int64(i) => Ok(Value::String(i.to_string())),
                Value::Float64(f) => Ok(Value::String(f.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                other => Err(invalid(&other)),
            },

            (FieldType::Bytes, value) => match value {
                Value::Bytes(b) => Ok(Value::Bytes(b)),
                other => Err(invalid(&other)),
            },
        }
    }

    /// Convert a value read from the database back into the field's type.
    pub fn from_db(&self, value: Value) -> Value {
        match (self, value) {
            (FieldType::Bool, Value::Int64(i)) => Value::Bool(i != 0),
            (FieldType::Float, Value::Int64(i)) => Value::Float64(i as f64),
            (_, value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_types() {
        assert_eq!(
            FieldType::Char {
                max_length: Some(256)
            }
            .db_type(),
            "varchar(256)"
        );
        assert_eq!(FieldType::Char { max_length: None }.db_type(), "text");
        assert_eq!(
            FieldType::ForeignKey {
                to: "tests.Artist".into(),
                on_delete: OnDelete::Cascade
            }
            .db_type(),
            "bigint"
        );
    }

    #[test]
    fn test_prepare_coerces() {
        let char = FieldType::Char {
            max_length: Some(10),
        };
        assert_eq!(
            char.prepare("name", Value::Int64(5)).unwrap(),
            Value::String("5".into())
        );
        assert_eq!(
            FieldType::BigInteger
                .prepare("n", Value::String(" 42 ".into()))
                .unwrap(),
            Value::Int64(42)
        );
        assert_eq!(
            FieldType::Bool.prepare("b", Value::Int64(1)).unwrap(),
            Value::Bool(true)
        );
        assert!(FieldType::Bool.prepare("b", Value::Null).unwrap().is_null());
    }

    #[test]
    fn test_prepare_rejects() {
        let err = FieldType::Integer
            .prepare("count", Value::String("many".into()))
            .unwrap_err();
        assert!(err.to_string().contains("count"));
        assert!(FieldType::Bytes
            .prepare("blob", Value::String("x".into()))
            .is_err());
    }

    #[test]
    fn test_from_db() {
        assert_eq!(FieldType::Bool.from_db(Value::Int64(0)), Value::Bool(false));
        assert_eq!(FieldType::Float.from_db(Value::Int64(2)), Value::Float64(2.0));
        assert_eq!(FieldType::Text.from_db(Value::Null), Value::Null);
    }
}
