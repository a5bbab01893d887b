// Loading of model definition files and database configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::database::DatabaseConfig;
use crate::error::{ConfigError, Result};
use crate::model_manager::ModelDescriptor;

/// Environment variable holding the default connection string
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Top-level layout of a model definition file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsFile {
    pub tables: Vec<ModelDescriptor>,
}

/// Parse model definitions from YAML or JSON text
pub fn parse_models(content: &str) -> Result<Vec<ModelDescriptor>> {
    let file: ModelsFile = match serde_yaml::from_str(content) {
        Ok(file) => file,
        Err(yaml_err) => serde_json::from_str(content).map_err(|json_err| {
            tracing::debug!("model file is neither YAML ({}) nor JSON", yaml_err);
            json_err
        })?,
    };
    Ok(file.tables)
}

/// Read model definitions from a `.json`, `.yaml` or `.yml` file
pub fn load_models(path: &Path) -> Result<Vec<ModelDescriptor>> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let models = if is_json {
        serde_json::from_str::<ModelsFile>(&content)?.tables
    } else {
        parse_models(&content)?
    };
    tracing::debug!(path = %path.display(), models = models.len(), "loaded model file");
    Ok(models)
}

/// Read a `DatabaseConfig` from a TOML file
pub fn load_database_config(path: &Path) -> Result<DatabaseConfig> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Pick the database configuration: a TOML file wins over a connection string.
pub fn resolve_database_config(
    database_url: Option<&str>,
    config_path: Option<&Path>,
) -> Result<DatabaseConfig> {
    if let Some(path) = config_path {
        return load_database_config(path);
    }
    match database_url {
        Some(url) => Ok(DatabaseConfig::from_connection_string(url)?),
        None => Err(ConfigError::MissingEnvVar(DATABASE_URL_ENV.to_string()).into()),
    }
}
