use std::path::PathBuf;

use thiserror::Error;

/// Configuration could not be assembled; the process exits before any remote call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("{var} is still set to its placeholder value \"{value}\"")]
    PlaceholderValue { var: String, value: String },

    #[error("columns {columns:?} all normalize to metafield key \"{key}\"")]
    KeyCollision { key: String, columns: Vec<String> },
}

/// The source table could not be read.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}
