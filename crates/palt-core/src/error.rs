use thiserror::Error;

/// Error types for inventory queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InventoryError {
    #[error("Could not connect to the audio server: {0}")]
    Connection(String),

    #[error("Audio server query failed: {what}: {reason}")]
    Query { what: &'static str, reason: String },
}

/// Error types for loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("No configuration directory available")]
    NoConfigDir,
}
