// Allow async functions in traits for this module
#![allow(async_fn_in_trait)]

// Extends DatabaseConnection with schema synchronization and entity mapping,
// for callers that manage their own connection.

use crate::database::DatabaseConnection;
use crate::model_manager::{
    adapters::adapter_for,
    definitions::{Model, ModelDescriptor},
    entity::{query_entities, save_entity},
    generator::ModelGenerator,
    synchronizer::{plan_sync, synchronize_schema, Inventory, SchemaChange, SyncReport},
    Result,
};

/// Extension trait to add model management functionality to DatabaseConnection
pub trait ModelManager {
    /// SQL generator for this connection's dialect
    fn generator(&self) -> ModelGenerator;

    /// Read the live `table -> column -> type` inventory
    async fn load_inventory(&self) -> Result<Inventory>;

    /// Changes `sync_schema` would apply, without executing them
    async fn plan_schema(&self, models: &[&ModelDescriptor]) -> Result<Vec<SchemaChange>>;

    /// Create missing tables and add missing columns
    async fn sync_schema(&self, models: &[&ModelDescriptor]) -> Result<SyncReport>;

    /// Insert one entity
    async fn save<T: Model>(&self, entity: &T) -> Result<()>;

    /// Load every row of `T`'s table
    async fn query_all<T: Model + Default>(&self) -> Result<Vec<T>>;
}

impl<C: ?Sized + DatabaseConnection> ModelManager for C {
    fn generator(&self) -> ModelGenerator {
        ModelGenerator::new(adapter_for(self.get_database_type()))
    }

    async fn load_inventory(&self) -> Result<Inventory> {
        Inventory::load(self).await
    }

    async fn plan_schema(&self, models: &[&ModelDescriptor]) -> Result<Vec<SchemaChange>> {
        let inventory = Inventory::load(self).await?;
        plan_sync(&self.generator(), &inventory, models)
    }

    async fn sync_schema(&self, models: &[&ModelDescriptor]) -> Result<SyncReport> {
        synchronize_schema(self, models).await
    }

    async fn save<T: Model>(&self, entity: &T) -> Result<()> {
        save_entity(self, entity).await
    }

    async fn query_all<T: Model + Default>(&self) -> Result<Vec<T>> {
        query_entities(self).await
    }
}
