use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("Failed to open temperature grid '{0}'")]
    Open(PathBuf, #[source] std::io::Error),

    #[error("Failed to read temperature grid '{0}'")]
    Read(PathBuf, #[source] PolarsError),

    #[error("Temperature grid '{0}' has no data rows or no area columns")]
    Empty(PathBuf),
}
