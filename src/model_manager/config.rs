use crate::database::DatabaseType;
use crate::model_manager::{
    adapters::{adapter_for, DatabaseAdapter},
    generator::ModelGenerator,
};

/// Configuration for the model manager, selecting the appropriate database adapter.
#[derive(Debug, Clone, Copy)]
pub struct ModelManagerConfig {
    /// The type of database for SQL generation.
    pub database_type: DatabaseType,
}

impl ModelManagerConfig {
    /// Create a new `ModelManagerConfig` with the given database type.
    pub fn new(database_type: DatabaseType) -> Self {
        Self { database_type }
    }

    /// Get the database adapter based on the configured database type.
    pub fn get_adapter(&self) -> Box<dyn DatabaseAdapter> {
        adapter_for(self.database_type)
    }

    /// Generator for the configured dialect
    pub fn generator(&self) -> ModelGenerator {
        ModelGenerator::new(self.get_adapter())
    }
}
