use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordIndexError {
    #[error("Failed to open coordinate source '{0}'")]
    Open(PathBuf, #[source] std::io::Error),

    #[error("Failed to read coordinate source '{0}'")]
    Read(PathBuf, #[source] PolarsError),
}
