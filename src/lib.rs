mod coord_index;
mod enrich;
mod error;
mod grid;
mod neighbor;
mod output;
mod pipeline;
mod types;
mod utils;
mod window_stats;

pub use error::ThermogridError;
pub use pipeline::*;

pub use coord_index::error::CoordIndexError;
pub use coord_index::index::CoordinateIndex;

pub use enrich::enrich;

pub use grid::error::GridError;
pub use grid::reader::{AreaSeries, TemperatureGrid, MISSING_SENTINEL};

pub use neighbor::error::NeighborError;
pub use neighbor::filter::{distance_km, NeighborFilter, DEFAULT_DAY_WINDOW, DEFAULT_RADIUS_KM};

pub use output::csv_sink::CsvSink;
pub use output::error::SinkError;

pub use types::coordinate::LatLon;
pub use types::record::{
    AreaId, EnrichedRecord, NeighborResult, WindowExtreme, WindowRecord, WindowSummary,
};

pub use window_stats::engine::{
    WindowStats, WindowStatsEngine, ANOMALY_THRESHOLD, DEFAULT_WINDOW_SIZE,
};
