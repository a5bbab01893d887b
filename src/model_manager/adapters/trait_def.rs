use crate::model_manager::{
    definitions::{FieldDescriptor, FieldType, ModelDescriptor},
    Result,
};

/// Dialect-specific pieces of SQL generation
pub trait DatabaseAdapter: Send + Sync {
    /// Map a non-optional field type to a column type string.
    /// `length` of `None` or `0` means unbounded.
    fn map_field_type(&self, field_type: &FieldType, length: Option<u32>) -> Result<String>;

    /// Column type for a field, unwrapping the optional wrapper first
    fn sql_type(&self, field_type: &FieldType, length: Option<u32>) -> Result<String> {
        self.map_field_type(field_type.unwrap_optional(), length)
    }

    /// Clause appended to identity primary-key columns, if the dialect needs one
    fn identity_clause(&self) -> Option<&'static str>;

    /// Whether the database assigns `field`'s value on insert, so INSERT
    /// statements leave the column out
    fn generates_identity(&self, _model: &ModelDescriptor, field: &FieldDescriptor) -> bool {
        field.is_identity()
    }

    /// Get the character used to quote identifiers at the start
    fn identifier_quote_char_start(&self) -> char;

    /// Get the character used to quote identifiers at the end
    fn identifier_quote_char_end(&self) -> char;

    /// Quote an identifier (table, column name) for the database
    fn quote_identifier(&self, identifier: &str) -> String {
        let start = self.identifier_quote_char_start();
        let end = self.identifier_quote_char_end();
        format!("{}{}{}", start, identifier, end)
    }

    /// Escape a string literal for SQL (without the surrounding quotes)
    fn escape_string_literal(&self, value: &str) -> String {
        value.replace('\'', "''")
    }

    /// Bind placeholder for the 1-based parameter `index`
    fn placeholder(&self, index: usize) -> String;

    /// Query listing every column of every table, with columns aliased
    /// `table_name`, `column_name` and `data_type`
    fn inventory_query(&self) -> &'static str;
}

/// Positive length, if any
pub(crate) fn bounded_length(length: Option<u32>) -> Option<u32> {
    length.filter(|n| *n > 0)
}
