use crate::database::{DatabaseConnection, DatabaseRow, DatabaseValue, FromDatabaseValue};
use crate::model_manager::{
    adapters::adapter_for,
    definitions::{FieldType, Model},
    errors::{unsupported_type_error, value_conversion_error},
    generator::ModelGenerator,
    Result,
};

/// Convert a database value for assignment to the named field.
///
/// Intended for `Model::set_field` implementations.
pub fn convert_value<T: FromDatabaseValue>(field: &str, value: DatabaseValue) -> Result<T> {
    T::from_database_value(value).map_err(|message| value_conversion_error(field, message))
}

/// Read a column from a row according to the field's semantic type.
/// NULL reads as [`DatabaseValue::Null`].
pub fn read_column(
    row: &dyn DatabaseRow,
    column: &str,
    field_type: &FieldType,
) -> Result<DatabaseValue> {
    let value = match field_type.unwrap_optional() {
        FieldType::Integer => row.try_get_i64(column)?.map(DatabaseValue::Integer),
        FieldType::Text => row.try_get_string(column)?.map(DatabaseValue::Text),
        FieldType::DateTime => row.try_get_datetime(column)?.map(DatabaseValue::DateTime),
        FieldType::Boolean => row.try_get_bool(column)?.map(DatabaseValue::Boolean),
        FieldType::Decimal => row.try_get_decimal(column)?.map(DatabaseValue::Decimal),
        FieldType::Float | FieldType::Double => row.try_get_f64(column)?.map(DatabaseValue::Float),
        other => return Err(unsupported_type_error(other.to_string())),
    };
    Ok(value.unwrap_or(DatabaseValue::Null))
}

/// Insert one entity as a single row. Generated identity values are not
/// read back.
pub async fn save_entity<C, T>(connection: &C, entity: &T) -> Result<()>
where
    C: ?Sized + DatabaseConnection,
    T: Model,
{
    let generator = ModelGenerator::new(adapter_for(connection.get_database_type()));
    let statement =
        generator.generate_insert(T::descriptor(), |field| entity.get_field(&field.name))?;

    tracing::debug!(sql = %statement.sql, params = statement.params.len(), "inserting entity");
    connection.execute(&statement.sql, &statement.params).await?;
    Ok(())
}

/// Load every row of the model's table, in the order the database returns them
pub async fn query_entities<C, T>(connection: &C) -> Result<Vec<T>>
where
    C: ?Sized + DatabaseConnection,
    T: Model + Default,
{
    let descriptor = T::descriptor();
    let generator = ModelGenerator::new(adapter_for(connection.get_database_type()));
    let sql = generator.generate_select_all_script(descriptor)?;

    tracing::debug!(sql = %sql, "querying entities");
    let rows = connection.query(&sql, &[]).await?;

    let mut entities = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut entity = T::default();
        for (field, column) in descriptor.mapped_fields() {
            let value = read_column(row.as_ref(), &column.name, &field.field_type)?;
            entity.set_field(&field.name, value)?;
        }
        entities.push(entity);
    }
    Ok(entities)
}
