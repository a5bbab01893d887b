use crate::database::{
    create_database_connection, DatabaseConfig, DatabaseConnection, DatabaseError, DatabaseType,
};
use crate::model_manager::{
    adapters::adapter_for,
    entity::{query_entities, save_entity},
    generator::ModelGenerator,
    synchronizer::{plan_sync, synchronize_schema, Inventory, SchemaChange, SyncReport},
    Model, ModelDescriptor, Result,
};

/// Entry point for schema synchronization and entity mapping.
///
/// Every operation opens its own connection from the configuration and
/// closes it before returning, whether or not the operation succeeded. An
/// in-memory SQLite database therefore does not outlive a single call, so
/// `from_connection_string` refuses one; use a file path instead.
#[derive(Debug, Clone)]
pub struct ModelContext {
    config: DatabaseConfig,
}

impl ModelContext {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Parse `sqlite://…`, `postgres://…` or `mssql://…` into a context
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let config = DatabaseConfig::from_connection_string(connection_string)?;
        if is_in_memory_sqlite(&config) {
            return Err(DatabaseError::Configuration(format!(
                "in-memory SQLite is discarded after every call: {}",
                connection_string
            ))
            .into());
        }
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    async fn connect(&self) -> Result<Box<dyn DatabaseConnection>> {
        Ok(create_database_connection(&self.config).await?)
    }

    /// Create missing tables and add missing columns for `models`, in order
    pub async fn synchronize(&self, models: &[&ModelDescriptor]) -> Result<SyncReport> {
        let connection = self.connect().await?;
        let result = synchronize_schema(&*connection, models).await;
        finish(connection, result).await
    }

    /// Changes `synchronize` would apply right now
    pub async fn plan(&self, models: &[&ModelDescriptor]) -> Result<Vec<SchemaChange>> {
        let connection = self.connect().await?;
        let result = match Inventory::load(&*connection).await {
            Ok(inventory) => {
                let generator = ModelGenerator::new(adapter_for(connection.get_database_type()));
                plan_sync(&generator, &inventory, models)
            }
            Err(e) => Err(e),
        };
        finish(connection, result).await
    }

    /// Insert `entity` as one row of its table
    pub async fn save<T: Model>(&self, entity: &T) -> Result<()> {
        // Fail on a missing table marker before touching the database
        T::descriptor().require_table()?;
        let connection = self.connect().await?;
        let result = save_entity(&*connection, entity).await;
        finish(connection, result).await
    }

    /// All rows of `T`'s table as entities
    pub async fn query<T: Model + Default>(&self) -> Result<Vec<T>> {
        T::descriptor().require_table()?;
        let connection = self.connect().await?;
        let result = query_entities(&*connection).await;
        finish(connection, result).await
    }
}

fn is_in_memory_sqlite(config: &DatabaseConfig) -> bool {
    config.db_type == DatabaseType::Sqlite
        && (config.database == ":memory:"
            || config.extra_params.get("mode").map(String::as_str) == Some("memory"))
}

/// Close the connection, then surface the operation's error ahead of any
/// error from closing.
async fn finish<T>(connection: Box<dyn DatabaseConnection>, result: Result<T>) -> Result<T> {
    let closed = connection.close().await;
    if let Err(e) = &closed {
        tracing::warn!("Failed to close connection: {}", e);
    }
    let value = result?;
    closed?;
    Ok(value)
}

/// Synchronize `models` against the database at `connection_string`
pub async fn synchronize(
    connection_string: &str,
    models: &[&ModelDescriptor],
) -> Result<SyncReport> {
    ModelContext::from_connection_string(connection_string)?
        .synchronize(models)
        .await
}
