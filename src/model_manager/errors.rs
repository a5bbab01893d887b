use thiserror::Error;

use crate::database::DatabaseError;

/// Error types for the model manager
#[derive(Debug, Error)]
pub enum Error {
    /// The model has no table marker
    #[error("model {model} does not declare a table")]
    MissingTableMetadata { model: String },

    /// The field type has no column type in the target dialect
    #[error("type {type_name} is not supported")]
    UnsupportedType { type_name: String },

    /// The database rejected a statement or could not be reached
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// A database value could not be assigned to a model field
    #[error("cannot assign value to field {field}: {message}")]
    ValueConversion { field: String, message: String },

    /// Error in model definition
    #[error("model definition error: {0}")]
    ModelDefinition(String),
}

/// Convenience Result type for model manager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Helper to create a MissingTableMetadata error
pub fn missing_table_error<S: Into<String>>(model: S) -> Error {
    Error::MissingTableMetadata {
        model: model.into(),
    }
}

/// Helper to create an UnsupportedType error
pub fn unsupported_type_error<S: Into<String>>(type_name: S) -> Error {
    Error::UnsupportedType {
        type_name: type_name.into(),
    }
}

/// Helper to create a ModelDefinition error
pub fn model_definition_error<S: Into<String>>(msg: S) -> Error {
    Error::ModelDefinition(msg.into())
}

/// Helper to create a ValueConversion error
pub fn value_conversion_error<F: Into<String>, M: Into<String>>(field: F, message: M) -> Error {
    Error::ValueConversion {
        field: field.into(),
        message: message.into(),
    }
}
