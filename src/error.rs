use crate::coord_index::error::CoordIndexError;
use crate::grid::error::GridError;
use crate::neighbor::error::NeighborError;
use crate::output::error::SinkError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThermogridError {
    #[error(transparent)]
    CoordIndex(#[from] CoordIndexError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Neighbor(#[from] NeighborError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("Failed to create output directory '{0}'")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),
}
