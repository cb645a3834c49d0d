use api::config::{Config as ApiConfig, ValidationError};
use serde::Deserialize;
use std::fs::File;

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
    #[serde(default = "default_metrics_prefix")]
    pub prefix: String,
}

fn default_metrics_prefix() -> String {
    "fanout".into()
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct LoggingConfig {
    pub sentry_dsn: Option<String>,
    /// Filter directives used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_traces_sample_rate")]
    pub traces_sample_rate: f32,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_traces_sample_rate() -> f32 {
    1.0
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            sentry_dsn: None,
            level: default_log_level(),
            traces_sample_rate: default_traces_sample_rate(),
        }
    }
}

#[derive(Clone, Deserialize, Debug, Default, PartialEq)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(flatten)]
    pub api: ApiConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self
            .common
            .metrics
            .as_ref()
            .is_some_and(|metrics| metrics.statsd_port == 0)
        {
            return Err(ValidationError::InvalidPort);
        }
        self.api.validate()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    ValidationError(#[from] ValidationError),
}
