use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Value type for database parameters and results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DatabaseValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Decimal(Decimal),
}

impl DatabaseValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Short name of the variant, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            DatabaseValue::Null => "null",
            DatabaseValue::Boolean(_) => "boolean",
            DatabaseValue::Integer(_) => "integer",
            DatabaseValue::Float(_) => "float",
            DatabaseValue::Text(_) => "text",
            DatabaseValue::DateTime(_) => "datetime",
            DatabaseValue::Decimal(_) => "decimal",
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(value: bool) -> Self {
        DatabaseValue::Boolean(value)
    }
}

impl From<i32> for DatabaseValue {
    fn from(value: i32) -> Self {
        DatabaseValue::Integer(value as i64)
    }
}

impl From<i64> for DatabaseValue {
    fn from(value: i64) -> Self {
        DatabaseValue::Integer(value)
    }
}

impl From<f32> for DatabaseValue {
    fn from(value: f32) -> Self {
        DatabaseValue::Float(value as f64)
    }
}

impl From<f64> for DatabaseValue {
    fn from(value: f64) -> Self {
        DatabaseValue::Float(value)
    }
}

impl From<String> for DatabaseValue {
    fn from(value: String) -> Self {
        DatabaseValue::Text(value)
    }
}

impl From<&str> for DatabaseValue {
    fn from(value: &str) -> Self {
        DatabaseValue::Text(value.to_string())
    }
}

impl From<NaiveDateTime> for DatabaseValue {
    fn from(value: NaiveDateTime) -> Self {
        DatabaseValue::DateTime(value)
    }
}

impl From<Decimal> for DatabaseValue {
    fn from(value: Decimal) -> Self {
        DatabaseValue::Decimal(value)
    }
}

impl<T> From<Option<T>> for DatabaseValue
where
    T: Into<DatabaseValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// Conversion from a database value into a field's Rust type.
///
/// `Null` converts to `Default::default()` for plain types and to `None` for
/// `Option<T>`. Returns a message describing the mismatch on failure.
pub trait FromDatabaseValue: Sized {
    fn from_database_value(value: DatabaseValue) -> Result<Self, String>;
}

fn mismatch(expected: &str, value: &DatabaseValue) -> String {
    format!("expected {}, found {}", expected, value.kind())
}

impl FromDatabaseValue for i64 {
    fn from_database_value(value: DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Null => Ok(0),
            DatabaseValue::Integer(i) => Ok(i),
            DatabaseValue::Boolean(b) => Ok(b as i64),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl FromDatabaseValue for i32 {
    fn from_database_value(value: DatabaseValue) -> Result<Self, String> {
        let wide = i64::from_database_value(value)?;
        i32::try_from(wide).map_err(|_| format!("integer {} out of range for i32", wide))
    }
}

impl FromDatabaseValue for f64 {
    fn from_database_value(value: DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Null => Ok(0.0),
            DatabaseValue::Float(f) => Ok(f),
            DatabaseValue::Integer(i) => Ok(i as f64),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FromDatabaseValue for f32 {
    fn from_database_value(value: DatabaseValue) -> Result<Self, String> {
        f64::from_database_value(value).map(|f| f as f32)
    }
}

impl FromDatabaseValue for bool {
    fn from_database_value(value: DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Null => Ok(false),
            DatabaseValue::Boolean(b) => Ok(b),
            DatabaseValue::Integer(i) => Ok(i != 0),
            other => Err(mismatch("boolean", &other)),
        }
    }
}

impl FromDatabaseValue for String {
    fn from_database_value(value: DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Null => Ok(String::new()),
            DatabaseValue::Text(s) => Ok(s),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl FromDatabaseValue for NaiveDateTime {
    fn from_database_value(value: DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Null => Ok(NaiveDateTime::default()),
            DatabaseValue::DateTime(dt) => Ok(dt),
            other => Err(mismatch("datetime", &other)),
        }
    }
}

impl FromDatabaseValue for Decimal {
    fn from_database_value(value: DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Null => Ok(Decimal::ZERO),
            DatabaseValue::Decimal(d) => Ok(d),
            DatabaseValue::Integer(i) => Ok(Decimal::from(i)),
            DatabaseValue::Text(s) => {
                Decimal::from_str(&s).map_err(|e| format!("invalid decimal '{}': {}", s, e))
            }
            other => Err(mismatch("decimal", &other)),
        }
    }
}

impl<T> FromDatabaseValue for Option<T>
where
    T: FromDatabaseValue,
{
    fn from_database_value(value: DatabaseValue) -> Result<Self, String> {
        match value {
            DatabaseValue::Null => Ok(None),
            other => T::from_database_value(other).map(Some),
        }
    }
}
