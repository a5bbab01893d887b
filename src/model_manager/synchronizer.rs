// Schema synchronization.
//
// Reads the live column inventory once, then walks the models in order:
// missing tables are created and missing columns are added. Existing columns
// are never altered or dropped.

use std::collections::HashMap;
use std::fmt;

use crate::database::{DatabaseConnection, DatabaseRow};
use crate::model_manager::{
    adapters::adapter_for,
    definitions::ModelDescriptor,
    generator::ModelGenerator,
    Result,
};

/// Live schema as `table -> column -> data type`.
/// Names are compared exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    tables: HashMap<String, HashMap<String, String>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rows carrying `table_name`, `column_name` and `data_type`
    pub fn from_rows(rows: &[Box<dyn DatabaseRow>]) -> Result<Self> {
        let mut inventory = Self::new();
        for row in rows {
            let table = row.get_string("table_name")?;
            let column = row.get_string("column_name")?;
            let data_type = row.try_get_string("data_type")?.unwrap_or_default();
            inventory.insert_column(table, column, data_type);
        }
        Ok(inventory)
    }

    /// Query the live inventory through a connection
    pub async fn load<C>(connection: &C) -> Result<Self>
    where
        C: ?Sized + DatabaseConnection,
    {
        let adapter = adapter_for(connection.get_database_type());
        let rows = connection.query(adapter.inventory_query(), &[]).await?;
        let inventory = Self::from_rows(&rows)?;
        tracing::debug!(tables = inventory.tables.len(), "loaded schema inventory");
        Ok(inventory)
    }

    pub fn insert_table(&mut self, table: impl Into<String>) {
        self.tables.entry(table.into()).or_default();
    }

    pub fn insert_column(
        &mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        data_type: impl Into<String>,
    ) {
        self.tables
            .entry(table.into())
            .or_default()
            .insert(column.into(), data_type.into());
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn has_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .map(|columns| columns.contains_key(column))
            .unwrap_or(false)
    }

    /// Recorded data type of a column
    pub fn data_type(&self, table: &str, column: &str) -> Option<&str> {
        self.tables
            .get(table)
            .and_then(|columns| columns.get(column))
            .map(String::as_str)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Record an applied change so later models see it
    fn record(
        &mut self,
        generator: &ModelGenerator,
        model: &ModelDescriptor,
        change: &SchemaChange,
    ) -> Result<()> {
        match change {
            SchemaChange::CreateTable { table, .. } => {
                self.insert_table(table.clone());
                for (field, column) in model.mapped_fields() {
                    let sql_type = generator
                        .adapter()
                        .sql_type(&field.field_type, column.length)?;
                    self.insert_column(table.clone(), column.name.clone(), sql_type);
                }
            }
            SchemaChange::AddColumn { table, column, .. } => {
                if let Some((field, marker)) = model
                    .mapped_fields()
                    .find(|(_, marker)| &marker.name == column)
                {
                    let sql_type = generator
                        .adapter()
                        .sql_type(&field.field_type, marker.length)?;
                    self.insert_column(table.clone(), column.clone(), sql_type);
                }
            }
        }
        Ok(())
    }
}

/// A single additive schema change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaChange {
    CreateTable {
        table: String,
        sql: String,
    },
    AddColumn {
        table: String,
        column: String,
        sql: String,
    },
}

impl SchemaChange {
    pub fn sql(&self) -> &str {
        match self {
            SchemaChange::CreateTable { sql, .. } | SchemaChange::AddColumn { sql, .. } => sql,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            SchemaChange::CreateTable { table, .. } | SchemaChange::AddColumn { table, .. } => {
                table
            }
        }
    }
}

impl fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

/// Changes applied by one synchronization run, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub changes: Vec<SchemaChange>,
}

impl SyncReport {
    /// True when the schema already matched every model
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn tables_created(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, SchemaChange::CreateTable { .. }))
            .count()
    }

    pub fn columns_added(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, SchemaChange::AddColumn { .. }))
            .count()
    }
}

/// Changes needed to bring one model's table in line with the inventory
pub fn plan_model(
    generator: &ModelGenerator,
    inventory: &Inventory,
    model: &ModelDescriptor,
) -> Result<Vec<SchemaChange>> {
    let table = match model.table_name() {
        Some(table) => table,
        None => {
            tracing::debug!("Skipping model '{}' without a table", model.type_name);
            return Ok(Vec::new());
        }
    };

    if !inventory.has_table(table) {
        let sql = generator.generate_create_table_script(model)?;
        return Ok(vec![SchemaChange::CreateTable {
            table: table.to_string(),
            sql,
        }]);
    }

    let mut changes = Vec::new();
    for (field, column) in model.mapped_fields() {
        if !inventory.has_column(table, &column.name) {
            changes.push(SchemaChange::AddColumn {
                table: table.to_string(),
                column: column.name.clone(),
                sql: generator.generate_add_column_script(table, field)?,
            });
        }
    }
    Ok(changes)
}

/// Dry run: every change `synchronize_schema` would apply, without executing
pub fn plan_sync(
    generator: &ModelGenerator,
    inventory: &Inventory,
    models: &[&ModelDescriptor],
) -> Result<Vec<SchemaChange>> {
    let mut inventory = inventory.clone();
    let mut planned = Vec::new();
    for model in models {
        for change in plan_model(generator, &inventory, model)? {
            inventory.record(generator, model, &change)?;
            planned.push(change);
        }
    }
    Ok(planned)
}

/// Create missing tables and add missing columns for each model, in order.
///
/// Statements run one at a time outside any transaction; on error, changes
/// already applied stay in place.
pub async fn synchronize_schema<C>(
    connection: &C,
    models: &[&ModelDescriptor],
) -> Result<SyncReport>
where
    C: ?Sized + DatabaseConnection,
{
    let generator = ModelGenerator::new(adapter_for(connection.get_database_type()));
    let mut inventory = Inventory::load(connection).await?;
    let mut report = SyncReport::default();

    for model in models {
        let changes = plan_model(&generator, &inventory, model)?;
        for change in changes {
            tracing::debug!(sql = change.sql(), "executing schema change");
            connection.execute(change.sql(), &[]).await?;

            match &change {
                SchemaChange::CreateTable { table, .. } => {
                    tracing::info!("Created table: {}", table);
                }
                SchemaChange::AddColumn { table, column, .. } => {
                    tracing::info!("Added column: {} to table: {}", column, table);
                }
            }

            inventory.record(&generator, model, &change)?;
            report.changes.push(change);
        }
    }

    if report.is_empty() {
        tracing::info!("Schema already in sync for {} model(s)", models.len());
    }

    Ok(report)
}
