use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::database::{
    DatabaseConfig, DatabaseConnection, DatabaseError, DatabaseResult, DatabaseRow, DatabaseType,
    DatabaseValue,
};

/// SQLite implementation of the database connection interface
pub struct SqliteConnection {
    pool: SqlitePool,
}

impl SqliteConnection {
    /// Create a new SQLite connection from a configuration
    pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<Self> {
        let database_url = build_sqlite_connection_string(config);

        // Ensure the directory exists if file-based
        if !is_memory_database(&config.database) && !config.database.starts_with("file:") {
            if let Some(parent) = Path::new(&config.database).parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::Connection(format!(
                        "Failed to create directory for SQLite database: {}",
                        e
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| DatabaseError::Configuration(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool.max_connections.max(1))
            .min_connections(config.pool.min_connections)
            .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        tracing::debug!(url = %database_url, "sqlite pool opened");

        Ok(Self { pool })
    }
}

fn is_memory_database(database: &str) -> bool {
    database == ":memory:" || database == ":memory"
}

/// Convert a DatabaseConfig to a SQLite connection string
fn build_sqlite_connection_string(config: &DatabaseConfig) -> String {
    let mut connection_string = if is_memory_database(&config.database) {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{}", config.database)
    };

    let mut params: Vec<_> = config.extra_params.iter().collect();
    params.sort();
    for (i, (key, value)) in params.into_iter().enumerate() {
        connection_string.push(if i == 0 { '?' } else { '&' });
        connection_string.push_str(&format!("{}={}", key, value));
    }

    connection_string
}

/// Bind parameters in order. SQLite has no native decimal type, so decimals
/// travel as their exact text form.
fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[DatabaseValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            DatabaseValue::Null => query.bind(None::<String>),
            DatabaseValue::Boolean(b) => query.bind(*b),
            DatabaseValue::Integer(i) => query.bind(*i),
            DatabaseValue::Float(f) => query.bind(*f),
            DatabaseValue::Text(s) => query.bind(s.clone()),
            DatabaseValue::DateTime(dt) => query.bind(*dt),
            DatabaseValue::Decimal(d) => query.bind(d.to_string()),
        };
    }
    query
}

/// SQLite implementation of the database row interface
pub struct SqliteRow {
    row: sqlx::sqlite::SqliteRow,
}

impl SqliteRow {
    fn get_optional<'r, T>(&'r self, column: &str, kind: &str) -> DatabaseResult<Option<T>>
    where
        T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
    {
        self.row.try_get::<Option<T>, _>(column).map_err(|e| {
            DatabaseError::Query(format!("Failed to get {} column {}: {}", kind, column, e))
        })
    }
}

impl DatabaseRow for SqliteRow {
    fn try_get_string(&self, column: &str) -> DatabaseResult<Option<String>> {
        self.get_optional(column, "string")
    }

    fn try_get_i64(&self, column: &str) -> DatabaseResult<Option<i64>> {
        self.get_optional(column, "i64")
    }

    fn try_get_f64(&self, column: &str) -> DatabaseResult<Option<f64>> {
        self.get_optional(column, "f64")
    }

    fn try_get_bool(&self, column: &str) -> DatabaseResult<Option<bool>> {
        self.get_optional(column, "bool")
    }

    fn try_get_datetime(&self, column: &str) -> DatabaseResult<Option<NaiveDateTime>> {
        self.get_optional(column, "datetime")
    }

    fn try_get_decimal(&self, column: &str) -> DatabaseResult<Option<Decimal>> {
        let text: Option<String> = self.get_optional(column, "decimal")?;
        text.map(|s| {
            Decimal::from_str(&s).map_err(|e| {
                DatabaseError::Query(format!(
                    "Failed to parse decimal column {} ('{}'): {}",
                    column, s, e
                ))
            })
        })
        .transpose()
    }
}

#[async_trait]
impl DatabaseConnection for SqliteConnection {
    async fn execute(&self, query: &str, params: &[DatabaseValue]) -> DatabaseResult<u64> {
        let result = bind_params(sqlx::query(query), params)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn query(
        &self,
        query: &str,
        params: &[DatabaseValue],
    ) -> DatabaseResult<Vec<Box<dyn DatabaseRow>>> {
        let rows = bind_params(sqlx::query(query), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| Box::new(SqliteRow { row }) as Box<dyn DatabaseRow>)
            .collect())
    }

    async fn query_one(
        &self,
        query: &str,
        params: &[DatabaseValue],
    ) -> DatabaseResult<Option<Box<dyn DatabaseRow>>> {
        let row = bind_params(sqlx::query(query), params)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(row.map(|r| Box::new(SqliteRow { row: r }) as Box<dyn DatabaseRow>))
    }

    fn get_database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    async fn ping(&self) -> DatabaseResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Connection(format!("Failed to ping database: {}", e)))?;

        Ok(())
    }

    async fn close(&self) -> DatabaseResult<()> {
        self.pool.close().await;
        Ok(())
    }
}
