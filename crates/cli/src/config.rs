//! `pickexec.toml` configuration.
//!
//! Every field is optional; a missing file yields [`CliConfig::default`].

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use messaging::DEFAULT_EVENT_SOURCE;
use picking::Location;
use serde::{Deserialize, Serialize};
use sessions::ServiceConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub start_location: StartLocation,
    /// CloudEvents `source` attribute for published events.
    pub event_source: String,
    pub log_format: LogFormat,
    /// OTLP/gRPC collector endpoint, e.g. `http://localhost:4317`.
    pub otlp_endpoint: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            start_location: StartLocation::default(),
            event_source: DEFAULT_EVENT_SOURCE.to_string(),
            log_format: LogFormat::default(),
            otlp_endpoint: None,
        }
    }
}

impl CliConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        text.parse()
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn service_config(&self) -> Result<ServiceConfig> {
        let location = self
            .start_location
            .to_location()
            .context("Invalid start_location")?;
        Ok(ServiceConfig::new(location))
    }
}

impl FromStr for CliConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

/// Where workers begin walking. Defaults to the dock at `A-01-01-01`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartLocation {
    pub aisle: String,
    pub bay: String,
    pub level: String,
    pub position: Option<String>,
}

impl Default for StartLocation {
    fn default() -> Self {
        Self {
            aisle: "A".to_string(),
            bay: "01".to_string(),
            level: "01".to_string(),
            position: Some("01".to_string()),
        }
    }
}

impl StartLocation {
    pub fn to_location(&self) -> picking::Result<Location> {
        Location::new(
            self.aisle.clone(),
            self.bay.clone(),
            self.level.clone(),
            self.position.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: CliConfig = "".parse().unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.event_source, DEFAULT_EVENT_SOURCE);
        assert_eq!(
            config.service_config().unwrap().start_location.display_string(),
            "A-01-01-01"
        );
    }

    #[test]
    fn partial_files_override_only_named_fields() {
        let config: CliConfig = r#"
            log_format = "json"
            otlp_endpoint = "http://collector:4317"

            [start_location]
            aisle = "B"
            bay = "10"
        "#
        .parse()
        .unwrap();

        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4317"));
        assert_eq!(config.start_location.aisle, "B");
        assert_eq!(config.start_location.level, "01");
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!("log_format = \"xml\"".parse::<CliConfig>().is_err());
    }

    #[test]
    fn blank_start_location_is_reported() {
        let config: CliConfig = "[start_location]\naisle = \"\"".parse().unwrap();
        assert!(config.service_config().is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = CliConfig::load(Path::new("/nonexistent/pickexec.toml")).unwrap();
        assert_eq!(config, CliConfig::default());
    }
}
