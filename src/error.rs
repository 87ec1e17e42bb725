use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Cli(#[from] clap::Error),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(error: impl Into<ValidationError>) -> Self {
        AppError::Validation(error.into())
    }

    pub fn config(error: ConfigError) -> Self {
        AppError::Config(error)
    }
}

impl From<&'static str> for AppError {
    fn from(value: &'static str) -> Self {
        AppError::Message(value.to_owned())
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Message(value)
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid target URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid number '{value}': {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("Value must not be negative: '{value}'")]
    NegativeNumber { value: String },
    #[error("Report interval must be > 0.")]
    IntervalZero,
    #[error("{0}")]
    Message(String),
}

impl From<&'static str> for ValidationError {
    fn from(value: &'static str) -> Self {
        ValidationError::Message(value.to_owned())
    }
}

impl From<String> for ValidationError {
    fn from(value: String) -> Self {
        ValidationError::Message(value)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file has no extension. Use .toml or .json.")]
    MissingExtension,
}
