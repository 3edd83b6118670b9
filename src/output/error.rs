use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create output file '{0}'")]
    Create(PathBuf, #[source] std::io::Error),

    #[error("Failed to write output file '{0}'")]
    Write(PathBuf, #[source] PolarsError),

    #[error("Failed to assemble output table")]
    Frame(#[from] PolarsError),
}
