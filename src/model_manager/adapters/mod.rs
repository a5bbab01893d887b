mod postgres_adapter;
mod sqlite_adapter;
mod sqlserver_adapter;
mod trait_def;

pub use postgres_adapter::PostgresAdapter;
pub use sqlite_adapter::SqliteAdapter;
pub use sqlserver_adapter::SqlServerAdapter;
pub use trait_def::DatabaseAdapter;

use crate::database::DatabaseType;

/// Adapter generating SQL for the given database type
pub fn adapter_for(database_type: DatabaseType) -> Box<dyn DatabaseAdapter> {
    match database_type {
        DatabaseType::SqlServer => Box::new(SqlServerAdapter::new()),
        DatabaseType::Postgres => Box::new(PostgresAdapter::new()),
        DatabaseType::Sqlite => Box::new(SqliteAdapter::new()),
    }
}
