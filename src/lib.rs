//! Metadata-driven schema synchronization and entity mapping.
//!
//! Model types describe their table and columns through a static
//! [`ModelDescriptor`]. From that description the crate creates missing tables
//! and columns in a live database, and inserts and reads entities.

pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod logging;
pub mod model_manager;

#[cfg(test)]
mod test_support;

// Database re-exports
pub use database::{
    create_database_connection, extensions, DatabaseConfig, DatabaseConnection, DatabaseError,
    DatabaseResult, DatabaseRow, DatabaseType, DatabaseValue, FromDatabaseValue, PoolConfig,
};

// Re-export model_manager types
pub use model_manager::{
    ColumnMarker, FieldDescriptor, FieldType, Model, ModelDescriptor, ModelManager, Relationship,
    SchemaChange, SyncReport,
};

pub use context::{synchronize, ModelContext};
pub use error::{ConfigError, Error, Result};
pub use logging::{init_logging, LogFormat};

/// Prelude module, exposing the most commonly used items.
pub mod prelude {
    pub use crate::{
        convert_value, synchronize, ColumnMarker, DatabaseValue, FieldDescriptor, FieldType,
        Model, ModelContext, ModelDescriptor, ModelManager, Relationship,
    };
}

pub use model_manager::convert_value;
