use crate::database::{DatabaseType, DatabaseValue};
use crate::model_manager::{
    adapters::{adapter_for, DatabaseAdapter},
    definitions::{ColumnMarker, FieldDescriptor, ModelDescriptor},
    errors::model_definition_error,
    Result,
};

/// Parameterized INSERT ready to execute
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub sql: String,
    /// Values for the placeholders in `sql`, in order
    pub params: Vec<DatabaseValue>,
}

/// Service for generating SQL from model definitions
pub struct ModelGenerator {
    /// The database adapter to use for SQL generation
    adapter: Box<dyn DatabaseAdapter>,
}

impl ModelGenerator {
    /// Create a new ModelGenerator with the given adapter
    pub fn new(adapter: Box<dyn DatabaseAdapter>) -> Self {
        Self { adapter }
    }

    /// Get the database adapter used by this generator
    pub fn adapter(&self) -> &dyn DatabaseAdapter {
        &*self.adapter
    }

    /// `<name> <type> <NULL|NOT NULL>`
    fn generate_column_definition(
        &self,
        field: &FieldDescriptor,
        column: &ColumnMarker,
    ) -> Result<String> {
        let sql_type = self.adapter.sql_type(&field.field_type, column.length)?;
        let nullability = if column.nullable { "NULL" } else { "NOT NULL" };
        Ok(format!(
            "{} {} {}",
            self.adapter.quote_identifier(&column.name),
            sql_type,
            nullability
        ))
    }

    /// Generate the CREATE TABLE statement for a model, on a single line:
    ///
    /// `CREATE TABLE [Widgets] ( [Id] INT NOT NULL IDENTITY(1,1), [Name] NVARCHAR(20) NOT NULL, PRIMARY KEY ([Id]) );`
    ///
    /// Identity clauses go on identity primary keys, `DEFAULT` literals on
    /// fields that declare one, and the primary key clause lists key columns
    /// in declaration order.
    pub fn generate_create_table_script(&self, model: &ModelDescriptor) -> Result<String> {
        let table = model.require_table()?;

        let mut clauses = Vec::new();
        for (field, column) in model.mapped_fields() {
            let mut clause = self.generate_column_definition(field, column)?;

            if field.is_identity() {
                if let Some(identity) = self.adapter.identity_clause() {
                    clause.push(' ');
                    clause.push_str(identity);
                }
            }

            if let Some(default) = &field.default_value {
                clause.push_str(&format!(
                    " DEFAULT '{}'",
                    self.adapter.escape_string_literal(default)
                ));
            }

            clauses.push(clause);
        }

        let primary_keys: Vec<String> = model
            .primary_key_columns()
            .into_iter()
            .map(|c| self.adapter.quote_identifier(c))
            .collect();
        if !primary_keys.is_empty() {
            clauses.push(format!("PRIMARY KEY ({})", primary_keys.join(", ")));
        }

        Ok(format!(
            "CREATE TABLE {} ( {} );",
            self.adapter.quote_identifier(table),
            clauses.join(", ")
        ))
    }

    /// Generate the SQL to add a column to an existing table.
    /// No default and no identity clause are emitted.
    pub fn generate_add_column_script(
        &self,
        table_name: &str,
        field: &FieldDescriptor,
    ) -> Result<String> {
        let column = field.column.as_ref().ok_or_else(|| {
            model_definition_error(format!("field {} has no column mapping", field.name))
        })?;

        Ok(format!(
            "ALTER TABLE {} ADD {};",
            self.adapter.quote_identifier(table_name),
            self.generate_column_definition(field, column)?
        ))
    }

    /// Generate an INSERT for one entity.
    ///
    /// `value_of` supplies each mapped field's value; `None` and
    /// [`DatabaseValue::Null`] are written as a literal `NULL`. Identity
    /// primary-key columns the dialect fills in itself are left out.
    pub fn generate_insert<F>(
        &self,
        model: &ModelDescriptor,
        mut value_of: F,
    ) -> Result<InsertStatement>
    where
        F: FnMut(&FieldDescriptor) -> Option<DatabaseValue>,
    {
        let table = self.adapter.quote_identifier(model.require_table()?);

        let mut columns = Vec::new();
        let mut values = Vec::new();
        let mut params = Vec::new();
        for (field, column) in model.mapped_fields() {
            if self.adapter.generates_identity(model, field) {
                continue;
            }
            columns.push(self.adapter.quote_identifier(&column.name));
            match value_of(field) {
                None | Some(DatabaseValue::Null) => values.push("NULL".to_string()),
                Some(value) => {
                    params.push(value);
                    values.push(self.adapter.placeholder(params.len()));
                }
            }
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES;", table)
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({});",
                table,
                columns.join(", "),
                values.join(", ")
            )
        };

        Ok(InsertStatement { sql, params })
    }

    /// Generate `SELECT * FROM <table>`
    pub fn generate_select_all_script(&self, model: &ModelDescriptor) -> Result<String> {
        let table = model.require_table()?;
        Ok(format!("SELECT * FROM {}", self.adapter.quote_identifier(table)))
    }
}

/// Check that every model with a table generates DDL in every dialect.
/// Models without a table are skipped, as synchronization skips them.
pub fn validate_models(models: &[ModelDescriptor]) -> Result<()> {
    for database_type in [DatabaseType::SqlServer, DatabaseType::Postgres, DatabaseType::Sqlite] {
        let generator = ModelGenerator::new(adapter_for(database_type));
        for model in models.iter().filter(|m| m.table.is_some()) {
            generator.generate_create_table_script(model).map_err(|e| {
                model_definition_error(format!(
                    "model '{}' is invalid for {}: {}",
                    model.type_name, database_type, e
                ))
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_manager::adapters::{PostgresAdapter, SqlServerAdapter, SqliteAdapter};
    use crate::model_manager::definitions::{ColumnMarker, FieldType};
    use crate::model_manager::Error;

    fn widget() -> ModelDescriptor {
        ModelDescriptor::new("Widget")
            .table("Widgets")
            .field(
                FieldDescriptor::new("Id", FieldType::Integer)
                    .column(ColumnMarker::new("Id").not_null())
                    .primary_key(true),
            )
            .field(
                FieldDescriptor::new("Name", FieldType::Text)
                    .column(ColumnMarker::new("Name").not_null().length(20)),
            )
    }

    fn sqlserver() -> ModelGenerator {
        ModelGenerator::new(Box::new(SqlServerAdapter::new()))
    }

    #[test]
    fn test_create_table_sqlserver() {
        assert_eq!(
            sqlserver().generate_create_table_script(&widget()).unwrap(),
            "CREATE TABLE [Widgets] ( [Id] INT NOT NULL IDENTITY(1,1), [Name] NVARCHAR(20) NOT NULL, PRIMARY KEY ([Id]) );"
        );
    }

    #[test]
    fn test_create_table_postgres_and_sqlite() {
        let pg = ModelGenerator::new(Box::new(PostgresAdapter::new()));
        assert_eq!(
            pg.generate_create_table_script(&widget()).unwrap(),
            "CREATE TABLE \"Widgets\" ( \"Id\" INTEGER NOT NULL GENERATED BY DEFAULT AS IDENTITY, \"Name\" VARCHAR(20) NOT NULL, PRIMARY KEY (\"Id\") );"
        );

        let lite = ModelGenerator::new(Box::new(SqliteAdapter::new()));
        assert_eq!(
            lite.generate_create_table_script(&widget()).unwrap(),
            "CREATE TABLE \"Widgets\" ( \"Id\" INTEGER NOT NULL, \"Name\" TEXT NOT NULL, PRIMARY KEY (\"Id\") );"
        );
    }

    #[test]
    fn test_create_table_defaults_and_composite_key() {
        let model = ModelDescriptor::new("Setting")
            .table("Settings")
            .field(
                FieldDescriptor::new("Scope", FieldType::Text)
                    .column(ColumnMarker::new("Scope").not_null().length(10))
                    .primary_key(false),
            )
            .field(
                FieldDescriptor::new("Key", FieldType::Text)
                    .column(ColumnMarker::new("Key").not_null().length(50))
                    .primary_key(false),
            )
            .field(
                FieldDescriptor::new("Value", FieldType::optional(FieldType::Text))
                    .column(ColumnMarker::new("Value"))
                    .default_value("it's on"),
            )
            .field(FieldDescriptor::new("Note", FieldType::Text));

        assert_eq!(
            sqlserver().generate_create_table_script(&model).unwrap(),
            "CREATE TABLE [Settings] ( [Scope] NVARCHAR(10) NOT NULL, [Key] NVARCHAR(50) NOT NULL, \
             [Value] NVARCHAR(MAX) NULL DEFAULT 'it''s on', PRIMARY KEY ([Scope], [Key]) );"
        );
    }

    #[test]
    fn test_create_table_without_primary_key() {
        let model = ModelDescriptor::new("Log").table("Logs").field(
            FieldDescriptor::new("Message", FieldType::Text).column(ColumnMarker::new("Message")),
        );
        assert_eq!(
            sqlserver().generate_create_table_script(&model).unwrap(),
            "CREATE TABLE [Logs] ( [Message] NVARCHAR(MAX) NULL );"
        );
    }

    #[test]
    fn test_create_table_requires_table_marker() {
        let model = ModelDescriptor::new("Draft");
        assert!(matches!(
            sqlserver().generate_create_table_script(&model),
            Err(Error::MissingTableMetadata { ref model }) if model == "Draft"
        ));
    }

    #[test]
    fn test_create_table_unsupported_type() {
        let model = widget().field(
            FieldDescriptor::new("Owner", FieldType::other("User"))
                .column(ColumnMarker::new("Owner")),
        );
        assert!(matches!(
            sqlserver().generate_create_table_script(&model),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn test_add_column_has_no_default_or_identity() {
        let field = FieldDescriptor::new("Name", FieldType::Text)
            .column(ColumnMarker::new("Name").not_null().length(20))
            .default_value("x");
        assert_eq!(
            sqlserver()
                .generate_add_column_script("Widgets", &field)
                .unwrap(),
            "ALTER TABLE [Widgets] ADD [Name] NVARCHAR(20) NOT NULL;"
        );

        let unmapped = FieldDescriptor::new("Scratch", FieldType::Text);
        assert!(sqlserver()
            .generate_add_column_script("Widgets", &unmapped)
            .is_err());
    }

    #[test]
    fn test_insert_skips_identity_and_inlines_null() {
        let model = widget()
            .field(
                FieldDescriptor::new("Price", FieldType::optional(FieldType::Decimal))
                    .column(ColumnMarker::new("Price")),
            )
            .field(
                FieldDescriptor::new("Active", FieldType::Boolean)
                    .column(ColumnMarker::new("Active")),
            );

        let stmt = sqlserver()
            .generate_insert(&model, |f| match f.name.as_str() {
                "Id" => Some(DatabaseValue::Integer(9)),
                "Name" => Some(DatabaseValue::Text("gear".to_string())),
                "Price" => Some(DatabaseValue::Null),
                _ => Some(DatabaseValue::Boolean(true)),
            })
            .unwrap();

        assert_eq!(
            stmt.sql,
            "INSERT INTO [Widgets] ([Name], [Price], [Active]) VALUES (@P1, NULL, @P2);"
        );
        assert_eq!(
            stmt.params,
            vec![
                DatabaseValue::Text("gear".to_string()),
                DatabaseValue::Boolean(true)
            ]
        );

        let pg = ModelGenerator::new(Box::new(PostgresAdapter::new()));
        let stmt = pg.generate_insert(&model, |_| Some(DatabaseValue::Integer(1))).unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO \"Widgets\" (\"Name\", \"Price\", \"Active\") VALUES ($1, $2, $3);"
        );
    }

    #[test]
    fn test_insert_only_identity_uses_default_values() {
        let model = ModelDescriptor::new("Counter").table("Counters").field(
            FieldDescriptor::new("Id", FieldType::Integer)
                .column(ColumnMarker::new("Id").not_null())
                .primary_key(true),
        );
        let stmt = sqlserver().generate_insert(&model, |_| None).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO [Counters] DEFAULT VALUES;");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_insert_sqlite_composite_key_keeps_identity_column() {
        let model = ModelDescriptor::new("Line")
            .table("Lines")
            .field(
                FieldDescriptor::new("Id", FieldType::Integer)
                    .column(ColumnMarker::new("Id").not_null())
                    .primary_key(true),
            )
            .field(
                FieldDescriptor::new("LineNo", FieldType::Integer)
                    .column(ColumnMarker::new("LineNo").not_null())
                    .primary_key(false),
            );
        let values = |f: &FieldDescriptor| match f.name.as_str() {
            "Id" => Some(DatabaseValue::Integer(5)),
            _ => Some(DatabaseValue::Integer(1)),
        };

        let lite = ModelGenerator::new(Box::new(SqliteAdapter::new()));
        let stmt = lite.generate_insert(&model, values).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO \"Lines\" (\"Id\", \"LineNo\") VALUES (?, ?);");
        assert_eq!(
            stmt.params,
            vec![DatabaseValue::Integer(5), DatabaseValue::Integer(1)]
        );

        let stmt = sqlserver().generate_insert(&model, values).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO [Lines] ([LineNo]) VALUES (@P1);");
    }

    #[test]
    fn test_unique_and_foreign_key_emit_no_constraint() {
        let model = ModelDescriptor::new("Account").table("Accounts").field(
            FieldDescriptor::new("Email", FieldType::Text)
                .column(ColumnMarker::new("Email"))
                .unique()
                .foreign_key("Users", "Id"),
        );

        let sql = sqlserver().generate_create_table_script(&model).unwrap();
        assert_eq!(sql, "CREATE TABLE [Accounts] ( [Email] NVARCHAR(MAX) NULL );");
        assert!(!sql.contains("UNIQUE"));
        assert!(!sql.contains("FOREIGN KEY"));
        assert!(!sql.contains("REFERENCES"));
    }

    #[test]
    fn test_validate_models() {
        let draft = ModelDescriptor::new("Draft").field(
            FieldDescriptor::new("Owner", FieldType::other("User"))
                .column(ColumnMarker::new("Owner")),
        );
        assert!(validate_models(&[widget(), draft]).is_ok());

        let broken = widget().field(
            FieldDescriptor::new("Owner", FieldType::other("User"))
                .column(ColumnMarker::new("Owner")),
        );
        let err = validate_models(&[broken]).unwrap_err();
        assert!(err.to_string().contains("sqlserver"));
    }

    #[test]
    fn test_select_all() {
        assert_eq!(
            sqlserver().generate_select_all_script(&widget()).unwrap(),
            "SELECT * FROM [Widgets]"
        );
    }
}
