use crate::model_manager::{
    adapters::{trait_def::bounded_length, DatabaseAdapter},
    definitions::FieldType,
    errors::unsupported_type_error,
    Result,
};

/// SQL Server adapter. Its output is the reference form of every statement.
#[derive(Debug, Default)]
pub struct SqlServerAdapter;

impl SqlServerAdapter {
    /// Create a new SQL Server adapter
    pub fn new() -> Self {
        Self
    }
}

impl DatabaseAdapter for SqlServerAdapter {
    fn map_field_type(&self, field_type: &FieldType, length: Option<u32>) -> Result<String> {
        match field_type {
            FieldType::Integer => Ok("INT".to_string()),
            FieldType::Text => Ok(match bounded_length(length) {
                Some(n) => format!("NVARCHAR({})", n),
                None => "NVARCHAR(MAX)".to_string(),
            }),
            FieldType::DateTime => Ok("DATETIME".to_string()),
            FieldType::Boolean => Ok("BIT".to_string()),
            FieldType::Decimal => Ok("DECIMAL(18, 2)".to_string()),
            // FLOAT is 8 bytes in T-SQL; REAL is the 4-byte type
            FieldType::Float => Ok("REAL".to_string()),
            FieldType::Double => Ok("FLOAT".to_string()),
            FieldType::Optional(_) | FieldType::Other(_) => {
                Err(unsupported_type_error(field_type.to_string()))
            }
        }
    }

    fn identity_clause(&self) -> Option<&'static str> {
        Some("IDENTITY(1,1)")
    }

    fn identifier_quote_char_start(&self) -> char {
        '['
    }

    fn identifier_quote_char_end(&self) -> char {
        ']'
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@P{}", index)
    }

    fn inventory_query(&self) -> &'static str {
        "SELECT TABLE_NAME AS table_name, COLUMN_NAME AS column_name, DATA_TYPE AS data_type \
         FROM INFORMATION_SCHEMA.COLUMNS"
    }
}
