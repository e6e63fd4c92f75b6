use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to read word source {}: {source}", .path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("word source {} contains no words", .path.display())]
    EmptySource { path: PathBuf },
    #[error("Invalid request format")]
    Protocol,
    #[error("Invalid request format")]
    InvalidRequest { offset: i64, count: i64 },
    #[error("server replied with an error: {0}")]
    Rejected(String),
    #[error("unable to load config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Read(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}
