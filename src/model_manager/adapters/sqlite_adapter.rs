use crate::model_manager::{
    adapters::DatabaseAdapter,
    definitions::{FieldDescriptor, FieldType, ModelDescriptor},
    errors::unsupported_type_error,
    Result,
};

/// SQLite database adapter for model management
#[derive(Debug, Default)]
pub struct SqliteAdapter;

impl SqliteAdapter {
    /// Create a new SQLite adapter
    pub fn new() -> Self {
        Self
    }
}

impl DatabaseAdapter for SqliteAdapter {
    fn map_field_type(&self, field_type: &FieldType, _length: Option<u32>) -> Result<String> {
        match field_type {
            // SQLite does not enforce lengths, so text is always TEXT
            FieldType::Integer => Ok("INTEGER".to_string()),
            FieldType::Text => Ok("TEXT".to_string()),
            FieldType::DateTime => Ok("DATETIME".to_string()),
            FieldType::Boolean => Ok("BOOLEAN".to_string()),
            // NUMERIC affinity would round-trip through floating point
            FieldType::Decimal => Ok("TEXT".to_string()),
            FieldType::Float => Ok("REAL".to_string()),
            FieldType::Double => Ok("DOUBLE".to_string()),
            FieldType::Optional(_) | FieldType::Other(_) => {
                Err(unsupported_type_error(field_type.to_string()))
            }
        }
    }

    // A single INTEGER primary key is already an alias for the rowid
    fn identity_clause(&self) -> Option<&'static str> {
        None
    }

    // Only a sole INTEGER key is filled in from the rowid
    fn generates_identity(&self, model: &ModelDescriptor, field: &FieldDescriptor) -> bool {
        field.is_identity()
            && matches!(field.field_type.unwrap_optional(), FieldType::Integer)
            && model.primary_key_columns().len() == 1
    }

    fn identifier_quote_char_start(&self) -> char {
        '"'
    }

    fn identifier_quote_char_end(&self) -> char {
        '"'
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn inventory_query(&self) -> &'static str {
        "SELECT m.name AS table_name, p.name AS column_name, p.type AS data_type \
         FROM sqlite_master m JOIN pragma_table_info(m.name) p \
         WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite_%'"
    }
}
