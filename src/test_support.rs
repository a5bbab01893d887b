// Shared fixtures for unit tests: a recording SQL Server connection with a
// scripted inventory, and a few model types.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::database::{
    DatabaseConnection, DatabaseError, DatabaseResult, DatabaseRow, DatabaseType, DatabaseValue,
};
use crate::model_manager::{
    convert_value, ColumnMarker, FieldDescriptor, FieldType, Model, ModelDescriptor, Result,
};

/// Row backed by a column map
pub struct MockRow {
    values: HashMap<String, DatabaseValue>,
}

impl MockRow {
    pub fn new(values: Vec<(&str, DatabaseValue)>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    fn value(&self, column: &str) -> DatabaseResult<&DatabaseValue> {
        self.values
            .get(column)
            .ok_or_else(|| DatabaseError::Query(format!("no column named {}", column)))
    }
}

fn wrong_type(column: &str, value: &DatabaseValue) -> DatabaseError {
    DatabaseError::Query(format!("column {} holds {}", column, value.kind()))
}

impl DatabaseRow for MockRow {
    fn try_get_string(&self, column: &str) -> DatabaseResult<Option<String>> {
        match self.value(column)? {
            DatabaseValue::Null => Ok(None),
            DatabaseValue::Text(s) => Ok(Some(s.clone())),
            other => Err(wrong_type(column, other)),
        }
    }

    fn try_get_i64(&self, column: &str) -> DatabaseResult<Option<i64>> {
        match self.value(column)? {
            DatabaseValue::Null => Ok(None),
            DatabaseValue::Integer(i) => Ok(Some(*i)),
            other => Err(wrong_type(column, other)),
        }
    }

    fn try_get_f64(&self, column: &str) -> DatabaseResult<Option<f64>> {
        match self.value(column)? {
            DatabaseValue::Null => Ok(None),
            DatabaseValue::Float(f) => Ok(Some(*f)),
            other => Err(wrong_type(column, other)),
        }
    }

    fn try_get_bool(&self, column: &str) -> DatabaseResult<Option<bool>> {
        match self.value(column)? {
            DatabaseValue::Null => Ok(None),
            DatabaseValue::Boolean(b) => Ok(Some(*b)),
            other => Err(wrong_type(column, other)),
        }
    }

    fn try_get_datetime(&self, column: &str) -> DatabaseResult<Option<NaiveDateTime>> {
        match self.value(column)? {
            DatabaseValue::Null => Ok(None),
            DatabaseValue::DateTime(dt) => Ok(Some(*dt)),
            other => Err(wrong_type(column, other)),
        }
    }

    fn try_get_decimal(&self, column: &str) -> DatabaseResult<Option<Decimal>> {
        match self.value(column)? {
            DatabaseValue::Null => Ok(None),
            DatabaseValue::Decimal(d) => Ok(Some(*d)),
            other => Err(wrong_type(column, other)),
        }
    }
}

#[derive(Default)]
struct MockState {
    /// `(table, column, data type)` returned by the inventory query
    columns: Vec<(String, String, String)>,
    /// Rows returned by any other query
    rows: Vec<Vec<(String, DatabaseValue)>>,
    executed: Vec<(String, Vec<DatabaseValue>)>,
    /// Execute calls whose SQL contains this text fail
    fail_on: Option<String>,
}

/// Connection that records statements and answers queries from a script
pub struct MockConnection {
    database_type: DatabaseType,
    state: Mutex<MockState>,
}

impl MockConnection {
    pub fn sqlserver() -> Self {
        Self::new(DatabaseType::SqlServer)
    }

    pub fn new(database_type: DatabaseType) -> Self {
        Self {
            database_type,
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn with_column(self, table: &str, column: &str, data_type: &str) -> Self {
        self.state.lock().unwrap().columns.push((
            table.to_string(),
            column.to_string(),
            data_type.to_string(),
        ));
        self
    }

    pub fn with_row(self, row: Vec<(&str, DatabaseValue)>) -> Self {
        self.state
            .lock()
            .unwrap()
            .rows
            .push(row.into_iter().map(|(k, v)| (k.to_string(), v)).collect());
        self
    }

    pub fn failing_on(self, needle: &str) -> Self {
        self.state.lock().unwrap().fail_on = Some(needle.to_string());
        self
    }

    /// SQL of every successfully executed statement, in order
    pub fn executed_sql(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .executed
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    pub fn executed(&self) -> Vec<(String, Vec<DatabaseValue>)> {
        self.state.lock().unwrap().executed.clone()
    }
}

fn is_inventory_query(query: &str) -> bool {
    query.contains("INFORMATION_SCHEMA")
        || query.contains("information_schema")
        || query.contains("sqlite_master")
}

#[async_trait]
impl DatabaseConnection for MockConnection {
    async fn execute(&self, query: &str, params: &[DatabaseValue]) -> DatabaseResult<u64> {
        let mut state = self.state.lock().unwrap();
        if let Some(needle) = &state.fail_on {
            if query.contains(needle.as_str()) {
                return Err(DatabaseError::Query(format!("rejected: {}", query)));
            }
        }
        state.executed.push((query.to_string(), params.to_vec()));
        Ok(1)
    }

    async fn query(
        &self,
        query: &str,
        _params: &[DatabaseValue],
    ) -> DatabaseResult<Vec<Box<dyn DatabaseRow>>> {
        let state = self.state.lock().unwrap();
        if is_inventory_query(query) {
            return Ok(state
                .columns
                .iter()
                .map(|(t, c, d)| {
                    Box::new(MockRow::new(vec![
                        ("table_name", DatabaseValue::Text(t.clone())),
                        ("column_name", DatabaseValue::Text(c.clone())),
                        ("data_type", DatabaseValue::Text(d.clone())),
                    ])) as Box<dyn DatabaseRow>
                })
                .collect());
        }
        Ok(state
            .rows
            .iter()
            .map(|row| {
                Box::new(MockRow {
                    values: row.iter().cloned().collect(),
                }) as Box<dyn DatabaseRow>
            })
            .collect())
    }

    async fn query_one(
        &self,
        query: &str,
        params: &[DatabaseValue],
    ) -> DatabaseResult<Option<Box<dyn DatabaseRow>>> {
        Ok(self.query(query, params).await?.into_iter().next())
    }

    fn get_database_type(&self) -> DatabaseType {
        self.database_type
    }

    async fn ping(&self) -> DatabaseResult<()> {
        Ok(())
    }

    async fn close(&self) -> DatabaseResult<()> {
        Ok(())
    }
}

/// `Widgets`: identity key plus a bounded, required name
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Widget {
    pub id: i32,
    pub name: String,
}

pub static WIDGET: Lazy<ModelDescriptor> = Lazy::new(|| {
    ModelDescriptor::new("Widget")
        .table("Widgets")
        .field(
            FieldDescriptor::new("Id", FieldType::Integer)
                .column(ColumnMarker::new("Id").not_null())
                .primary_key(true),
        )
        .field(
            FieldDescriptor::new("Name", FieldType::Text)
                .column(ColumnMarker::new("Name").not_null().length(20)),
        )
});

impl Model for Widget {
    fn descriptor() -> &'static ModelDescriptor {
        &WIDGET
    }

    fn get_field(&self, field: &str) -> Option<DatabaseValue> {
        match field {
            "Id" => Some(self.id.into()),
            "Name" => Some(self.name.clone().into()),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: DatabaseValue) -> Result<()> {
        match field {
            "Id" => self.id = convert_value(field, value)?,
            "Name" => self.name = convert_value(field, value)?,
            _ => {}
        }
        Ok(())
    }
}

/// Model without a table marker
#[derive(Debug, Default)]
pub struct Scratch {
    pub note: String,
}

pub static SCRATCH: Lazy<ModelDescriptor> = Lazy::new(|| {
    ModelDescriptor::new("Scratch").field(
        FieldDescriptor::new("Note", FieldType::Text).column(ColumnMarker::new("Note")),
    )
});

impl Model for Scratch {
    fn descriptor() -> &'static ModelDescriptor {
        &SCRATCH
    }

    fn get_field(&self, field: &str) -> Option<DatabaseValue> {
        match field {
            "Note" => Some(self.note.clone().into()),
            _ => None,
        }
    }

    fn set_field(&mut self, field: &str, value: DatabaseValue) -> Result<()> {
        if field == "Note" {
            self.note = convert_value(field, value)?;
        }
        Ok(())
    }
}
