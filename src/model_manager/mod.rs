// Model manager
//
// Metadata-driven schema synchronization and entity mapping: model
// descriptors, per-dialect SQL generation, the schema synchronizer and the
// generic save/query mapper.

pub mod adapters;
pub mod config;
pub mod definitions;
pub mod entity;
pub mod errors;
pub mod generator;
pub mod manager;
pub mod synchronizer;

// Re-export core types for convenience
pub use adapters::{adapter_for, DatabaseAdapter};
pub use config::ModelManagerConfig;
pub use definitions::{
    ColumnMarker, FieldDescriptor, FieldType, ForeignKeyMarker, Model, ModelDescriptor,
    PrimaryKeyMarker, Relationship, TableMarker,
};
pub use entity::{convert_value, query_entities, read_column, save_entity};
pub use errors::{Error, Result};
pub use generator::{validate_models, InsertStatement, ModelGenerator};
pub use manager::ModelManager;
pub use synchronizer::{
    plan_model, plan_sync, synchronize_schema, Inventory, SchemaChange, SyncReport,
};
