//! Error types for WebShell.

use std::io;

/// Errors produced by the shell and its platform collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("config error: {0}")]
    Config(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("URL opener error: {0}")]
    Opener(String),

    #[error("alert error: {0}")]
    Alert(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ShellError>;
