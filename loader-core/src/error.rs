use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Raised by a fallible watch; carried through untouched.
    #[error(transparent)]
    Watch(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
