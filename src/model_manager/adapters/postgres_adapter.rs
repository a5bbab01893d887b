use crate::model_manager::{
    adapters::{trait_def::bounded_length, DatabaseAdapter},
    definitions::FieldType,
    errors::unsupported_type_error,
    Result,
};

/// PostgreSQL database adapter for model management
#[derive(Debug, Default)]
pub struct PostgresAdapter;

impl PostgresAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new() -> Self {
        Self
    }
}

impl DatabaseAdapter for PostgresAdapter {
    fn map_field_type(&self, field_type: &FieldType, length: Option<u32>) -> Result<String> {
        match field_type {
            FieldType::Integer => Ok("INTEGER".to_string()),
            FieldType::Text => Ok(match bounded_length(length) {
                Some(n) => format!("VARCHAR({})", n),
                None => "TEXT".to_string(),
            }),
            FieldType::DateTime => Ok("TIMESTAMP".to_string()),
            FieldType::Boolean => Ok("BOOLEAN".to_string()),
            FieldType::Decimal => Ok("NUMERIC(18, 2)".to_string()),
            FieldType::Float => Ok("REAL".to_string()),
            FieldType::Double => Ok("DOUBLE PRECISION".to_string()),
            FieldType::Optional(_) | FieldType::Other(_) => {
                Err(unsupported_type_error(field_type.to_string()))
            }
        }
    }

    fn identity_clause(&self) -> Option<&'static str> {
        Some("GENERATED BY DEFAULT AS IDENTITY")
    }

    fn identifier_quote_char_start(&self) -> char {
        '"'
    }

    fn identifier_quote_char_end(&self) -> char {
        '"'
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn inventory_query(&self) -> &'static str {
        "SELECT table_name::text AS table_name, column_name::text AS column_name, \
         data_type::text AS data_type FROM information_schema.columns \
         WHERE table_schema = current_schema()"
    }
}
