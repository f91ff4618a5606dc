use crate::parser;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub input: InputConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// How log lines are split into fields
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    #[default]
    Whitespace,
    Csv,
}

/// What to do with a line that does not match the grammar
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IngestPolicy {
    /// Skip the line, record it, keep going
    #[default]
    Lenient,
    /// Fail the whole ingest on the first bad line
    Strict,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default)]
pub struct InputConfig {
    pub format: InputFormat,
    pub policy: IngestPolicy,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportConfig {
    /// Symbol queried for biggest buys and best sell
    pub symbol: String,
    /// Exact timestamp queried for best sell
    pub timestamp: String,
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            symbol: "DVAM1".to_string(),
            timestamp: "15:30:00".to_string(),
            format: ReportFormat::Text,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Command-line values layered on top of the file config
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub symbol: Option<String>,
    pub timestamp: Option<String>,
    pub format: Option<ReportFormat>,
    pub strict: bool,
    pub csv: bool,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides, then validate the merged result
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(symbol) = overrides.symbol {
            self.report.symbol = symbol;
        }
        if let Some(timestamp) = overrides.timestamp {
            self.report.timestamp = timestamp;
        }
        if let Some(format) = overrides.format {
            self.report.format = format;
        }
        if overrides.strict {
            self.input.policy = IngestPolicy::Strict;
        }
        if overrides.csv {
            self.input.format = InputFormat::Csv;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "log_level must be one of {:?}, got {:?}",
                LOG_LEVELS, self.general.log_level
            )));
        }
        if self.report.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("report.symbol must not be empty".into()));
        }
        parser::validate_timestamp(&self.report.timestamp)
            .map_err(|e| ConfigError::Invalid(format!("report.timestamp: {}", e)))?;
        Ok(())
    }
}
