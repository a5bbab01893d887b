use serde::{Deserialize, Serialize};
use std::fmt;

use crate::database::DatabaseValue;
use crate::model_manager::errors::{missing_table_error, Result};

/// Semantic type of a model field.
///
/// Serialized as a short string (`integer`, `text`, `datetime`, `boolean`,
/// `decimal`, `float`, `double`); a trailing `?` marks the optional wrapper
/// and any other string is kept verbatim as [`FieldType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Integer,
    Text,
    DateTime,
    Boolean,
    Decimal,
    Float,
    Double,
    /// Nullable wrapper around another type
    Optional(Box<FieldType>),
    /// Any other type, e.g. a related model
    Other(String),
}

impl FieldType {
    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    pub fn other(name: impl Into<String>) -> Self {
        FieldType::Other(name.into())
    }

    /// Strip every optional wrapper, yielding the underlying type.
    pub fn unwrap_optional(&self) -> &FieldType {
        match self {
            FieldType::Optional(inner) => inner.unwrap_optional(),
            other => other,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => write!(f, "integer"),
            FieldType::Text => write!(f, "text"),
            FieldType::DateTime => write!(f, "datetime"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Decimal => write!(f, "decimal"),
            FieldType::Float => write!(f, "float"),
            FieldType::Double => write!(f, "double"),
            FieldType::Optional(inner) => write!(f, "{}?", inner),
            FieldType::Other(name) => write!(f, "{}", name),
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if let Some(inner) = trimmed.strip_suffix('?') {
            return FieldType::optional(FieldType::from(inner.to_string()));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "integer" | "int" => FieldType::Integer,
            "text" | "string" => FieldType::Text,
            "datetime" | "timestamp" => FieldType::DateTime,
            "boolean" | "bool" => FieldType::Boolean,
            "decimal" => FieldType::Decimal,
            "float" => FieldType::Float,
            "double" => FieldType::Double,
            _ => FieldType::Other(trimmed.to_string()),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

/// Table a model maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableMarker {
    pub name: String,
}

/// Column mapping for a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMarker {
    /// Column name
    pub name: String,
    /// Whether the column allows NULL values (default: true)
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Maximum length for text columns; `None` or `0` means unbounded
    #[serde(default)]
    pub length: Option<u32>,
}

impl ColumnMarker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: true,
            length: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }
}

/// Primary key membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrimaryKeyMarker {
    /// Whether the database generates values for this column
    #[serde(default)]
    pub identity: bool,
}

/// Reference to another table's column. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyMarker {
    pub table: String,
    pub column: String,
}

/// Relationship hints. Declared but never resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Relationship {
    OneToOne {
        foreign_key_property: String,
    },
    OneToMany {
        foreign_key_property: String,
    },
    ManyToMany {
        join_table: String,
        join_column: String,
        inverse_join_column: String,
    },
}

/// Field of a model and its markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as used by `Model::get_field`/`Model::set_field`
    pub name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub column: Option<ColumnMarker>,
    #[serde(default)]
    pub primary_key: Option<PrimaryKeyMarker>,
    #[serde(default)]
    pub foreign_key: Option<ForeignKeyMarker>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub relationship: Option<Relationship>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            column: None,
            primary_key: None,
            foreign_key: None,
            unique: false,
            default_value: None,
            relationship: None,
        }
    }

    pub fn column(mut self, column: ColumnMarker) -> Self {
        self.column = Some(column);
        self
    }

    pub fn primary_key(mut self, identity: bool) -> Self {
        self.primary_key = Some(PrimaryKeyMarker { identity });
        self
    }

    pub fn foreign_key(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKeyMarker {
            table: table.into(),
            column: column.into(),
        });
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn relationship(mut self, relationship: Relationship) -> Self {
        self.relationship = Some(relationship);
        self
    }

    /// Column name, if the field is mapped
    pub fn column_name(&self) -> Option<&str> {
        self.column.as_ref().map(|c| c.name.as_str())
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key.is_some()
    }

    pub fn is_identity(&self) -> bool {
        self.primary_key.map(|pk| pk.identity).unwrap_or(false)
    }
}

/// Complete description of a model type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Name of the model type
    pub type_name: String,
    /// Target table; models without one are skipped by synchronization
    #[serde(default)]
    pub table: Option<TableMarker>,
    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            table: None,
            fields: Vec::new(),
        }
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(TableMarker { name: name.into() });
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_ref().map(|t| t.name.as_str())
    }

    /// Table name, or `MissingTableMetadata` when the model has no table marker
    pub fn require_table(&self) -> Result<&str> {
        self.table_name().ok_or_else(|| missing_table_error(&self.type_name))
    }

    /// Fields carrying a column marker, in declaration order, with their column
    pub fn mapped_fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &ColumnMarker)> {
        self.fields
            .iter()
            .filter_map(|f| f.column.as_ref().map(|c| (f, c)))
    }

    /// Primary key column names in declaration order
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.mapped_fields()
            .filter(|(f, _)| f.is_primary_key())
            .map(|(_, c)| c.name.as_str())
            .collect()
    }
}

fn default_true() -> bool {
    true
}

/// A record type mapped to a table.
///
/// Implementations expose a static descriptor and get/set access to field
/// values by field name:
///
/// ```
/// use modelsync::database::DatabaseValue;
/// use modelsync::model_manager::{
///     convert_value, ColumnMarker, FieldDescriptor, FieldType, Model, ModelDescriptor, Result,
/// };
/// use once_cell::sync::Lazy;
///
/// #[derive(Default)]
/// struct Widget {
///     id: i32,
///     name: String,
/// }
///
/// static WIDGET: Lazy<ModelDescriptor> = Lazy::new(|| {
///     ModelDescriptor::new("Widget")
///         .table("Widgets")
///         .field(
///             FieldDescriptor::new("Id", FieldType::Integer)
///                 .column(ColumnMarker::new("Id").not_null())
///                 .primary_key(true),
///         )
///         .field(
///             FieldDescriptor::new("Name", FieldType::Text)
///                 .column(ColumnMarker::new("Name").not_null().length(20)),
///         )
/// });
///
/// impl Model for Widget {
///     fn descriptor() -> &'static ModelDescriptor {
///         &WIDGET
///     }
///
///     fn get_field(&self, field: &str) -> Option<DatabaseValue> {
///         match field {
///             "Id" => Some(self.id.into()),
///             "Name" => Some(self.name.clone().into()),
///             _ => None,
///         }
///     }
///
///     fn set_field(&mut self, field: &str, value: DatabaseValue) -> Result<()> {
///         match field {
///             "Id" => self.id = convert_value(field, value)?,
///             "Name" => self.name = convert_value(field, value)?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Model {
    fn descriptor() -> &'static ModelDescriptor;

    /// Current value of the named field; `None` is stored as NULL
    fn get_field(&self, field: &str) -> Option<DatabaseValue>;

    fn set_field(&mut self, field: &str, value: DatabaseValue) -> Result<()>;
}
