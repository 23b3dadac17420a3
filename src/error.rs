//! Error types for neonscan

use thiserror::Error;

/// Errors raised at the edges of the application (terminal, files, config).
///
/// The rendering and sequencing core never fails; everything here comes from
/// I/O or from a configuration file that does not make sense.
#[derive(Debug, Error)]
pub enum NeonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for neonscan operations
pub type Result<T> = std::result::Result<T, NeonError>;
