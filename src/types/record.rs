//! Row types flowing between the pipeline stages: per-cell window records,
//! per-window summaries, coordinate-enriched records, and neighbor query results.

use crate::types::coordinate::LatLon;

/// Key identifying one spatial grid cell. Grid columns are keyed by their
/// stringified 0-based column position; coordinate sources use the same keys.
pub type AreaId = String;

/// One non-missing grid cell together with the statistics of the window it
/// belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRecord {
    /// 0-based day index within the grid.
    pub day: u32,
    /// The area the reading belongs to.
    pub area: AreaId,
    /// The raw temperature reading.
    pub temperature: f64,
    /// Mean of the non-missing readings in the surrounding window.
    pub window_average: f64,
    /// `temperature - window_average`.
    pub difference: f64,
    /// `difference / window_std_dev`, or 0 when the window's standard deviation
    /// is 0 (single-value or constant window).
    pub ratio: f64,
}

/// An extreme (max or min) reading within a window, tagged with the day it
/// occurred on. Ties keep the earliest day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowExtreme {
    pub temperature: f64,
    pub day: u32,
}

/// Aggregate statistics for one non-empty (area, window) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSummary {
    /// Day-range label of the window, clipped to the grid bounds
    /// (e.g. `"Days 0-13"`).
    pub period: String,
    pub area: AreaId,
    /// Mean of the non-missing readings.
    pub average: f64,
    /// Population standard deviation of the non-missing readings.
    pub std_dev: f64,
    pub max: WindowExtreme,
    pub min: WindowExtreme,
}

/// A [`WindowRecord`] with the area's coordinate attached when the coordinate
/// index knows the area. Records for unknown areas are kept, with `coordinate`
/// left empty.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: WindowRecord,
    pub coordinate: Option<LatLon>,
}

/// One row surviving a neighbor query, tagged with its great-circle distance
/// from the query reference.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborResult {
    pub record: EnrichedRecord,
    pub distance_km: f64,
}
