/*!
 * Catalog config file
 */

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub db_config: DbConfig,
    pub tracing_config: Option<TracingConfig>,
    #[serde(default)]
    pub batch_config: BatchConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct DbConfig {
    /// Database URL
    pub database_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TracingConfig {
    /// Jaeger agent endpoint, e.g. `localhost:6831`
    pub jaeger: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct BatchConfig {
    /// Abort the batch on the first failing game. Games before it stay written.
    pub stop_on_first_error: bool,

    /// Run each game's upsert and association replacement in one transaction
    pub transactional: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig { stop_on_first_error: true, transactional: true }
    }
}

pub fn load_config(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_batch_defaults() {
        let config: Config = toml::from_str(
            r#"
            [db-config]
            database-url = "postgres://catalog@localhost/catalog"
            "#,
        )
        .unwrap();
        assert_eq!(config.db_config.database_url, "postgres://catalog@localhost/catalog");
        assert!(config.tracing_config.is_none());
        assert!(config.batch_config.stop_on_first_error);
        assert!(config.batch_config.transactional);
    }

    #[test]
    fn full_config() {
        let config: Config = toml::from_str(
            r#"
            [db-config]
            database-url = "postgres://catalog@localhost/catalog"

            [tracing-config]
            jaeger = "localhost:6831"

            [batch-config]
            stop-on-first-error = false
            "#,
        )
        .unwrap();
        assert_eq!(config.tracing_config.unwrap().jaeger.as_deref(), Some("localhost:6831"));
        assert!(!config.batch_config.stop_on_first_error);
        assert!(config.batch_config.transactional);
    }
}
