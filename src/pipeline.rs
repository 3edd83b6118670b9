//! The main entry point for running the analysis pipeline.
//!
//! A [`Thermogrid`] client owns the coordinate index, the output sink, and the
//! pipeline knobs. The pipeline is strictly sequential: every stage fully
//! consumes its predecessor's output, and each stage's files are flushed before
//! the next stage starts (they are not rolled back if a later stage fails).

use crate::coord_index::index::CoordinateIndex;
use crate::enrich::enrich;
use crate::error::ThermogridError;
use crate::grid::reader::TemperatureGrid;
use crate::neighbor::filter::NeighborFilter;
use crate::output::csv_sink::CsvSink;
use crate::types::record::{EnrichedRecord, NeighborResult, WindowRecord, WindowSummary};
use crate::utils::ensure_output_dir;
use crate::window_stats::engine::{WindowStatsEngine, DEFAULT_WINDOW_SIZE};
use bon::bon;
use log::info;
use std::path::PathBuf;

/// Default number of distinct areas per output shard.
pub const DEFAULT_SHARD_AREA_LIMIT: usize = 7000;

/// The in-memory result of one pipeline run.
///
/// The written files are the canonical output; this struct keeps the streams
/// around so neighbor queries can run against them without re-reading disk.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// One summary per non-empty (area, window) pair.
    pub summaries: Vec<WindowSummary>,
    /// The records whose ratio exceeded the anomaly threshold.
    pub anomalies: Vec<WindowRecord>,
    /// Every window record, coordinate-enriched, in pipeline order.
    pub enriched: Vec<EnrichedRecord>,
}

impl Analysis {
    /// Builds the spatio-temporal query index over this run's enriched
    /// records. Build it once per query session and reuse it across queries.
    pub fn neighbor_filter(&self) -> NeighborFilter<'_> {
        NeighborFilter::new(&self.enriched)
    }
}

/// The pipeline client.
///
/// # Examples
///
/// ```no_run
/// use thermogrid::{Thermogrid, ThermogridError};
///
/// fn main() -> Result<(), ThermogridError> {
///     let client = Thermogrid::builder()
///         .grid_path("data/temperature_grid.csv")
///         .coordinate_path("data/grid_coords.dat")
///         .output_dir("out")
///         .build()?;
///
///     let analysis = client.analyze()?;
///     let filter = analysis.neighbor_filter();
///     let neighbors = client.neighbors(&filter, 20, "7")?;
///     println!("{} rows near day 20, area 7", neighbors.len());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Thermogrid {
    grid_path: PathBuf,
    coordinate_index: CoordinateIndex,
    sink: CsvSink,
    engine: WindowStatsEngine,
    shard_area_limit: usize,
}

#[bon]
impl Thermogrid {
    /// Creates a pipeline client.
    ///
    /// Loads the coordinate index eagerly (an unreadable coordinate source
    /// aborts the run here, before any output exists) and ensures the output
    /// directory is present.
    ///
    /// # Arguments
    ///
    /// * `.grid_path(...)`: **Required.** The comma-delimited temperature grid.
    /// * `.coordinate_path(...)`: **Required.** The tab-delimited coordinate table.
    /// * `.output_dir(...)`: **Required.** Directory for all output files.
    /// * `.window_size(usize)`: Optional. Days per aggregation window. Defaults to `14`.
    /// * `.shard_area_limit(usize)`: Optional. Distinct areas per output shard.
    ///   Defaults to `7000`. Output rows are identical regardless of this value.
    #[builder]
    pub fn new(
        #[builder(into)] grid_path: PathBuf,
        #[builder(into)] coordinate_path: PathBuf,
        #[builder(into)] output_dir: PathBuf,
        window_size: Option<usize>,
        shard_area_limit: Option<usize>,
    ) -> Result<Self, ThermogridError> {
        ensure_output_dir(&output_dir)
            .map_err(|e| ThermogridError::OutputDirCreation(output_dir.clone(), e))?;
        let coordinate_index = CoordinateIndex::from_tsv_path(&coordinate_path)?;
        Ok(Self {
            grid_path,
            coordinate_index,
            sink: CsvSink::new(&output_dir),
            engine: WindowStatsEngine::new(window_size.unwrap_or(DEFAULT_WINDOW_SIZE)),
            shard_area_limit: shard_area_limit.unwrap_or(DEFAULT_SHARD_AREA_LIMIT),
        })
    }

    /// Runs the pipeline: grid read, window statistics, then enrichment,
    /// writing each stage's files as it completes.
    ///
    /// # Errors
    ///
    /// Fails on an unreadable or empty grid, or on any unwritable output file.
    /// Parse failures in grid cells never abort: they become missing readings.
    pub fn analyze(&self) -> Result<Analysis, ThermogridError> {
        let grid = TemperatureGrid::from_csv_path(&self.grid_path)?;
        // The grid is moved into the statistics stage and dropped there.
        let stats = self.engine.compute(grid);

        self.sink
            .write_window_shards(&stats.records, self.shard_area_limit)?;
        self.sink.write_anomalies(&stats.anomalies)?;
        self.sink.write_summaries(&stats.summaries)?;

        let enriched = enrich(stats.records, &self.coordinate_index);
        self.sink
            .write_enriched_shards(&enriched, self.shard_area_limit)?;

        info!("Pipeline run complete");
        Ok(Analysis {
            summaries: stats.summaries,
            anomalies: stats.anomalies,
            enriched,
        })
    }

    /// Runs one neighbor query against a prepared filter and writes its
    /// report file.
    ///
    /// # Errors
    ///
    /// Fails when the reference `(day, area)` has no record or no coordinates,
    /// or when the report cannot be written. A failed query leaves the
    /// pipeline outputs untouched.
    pub fn neighbors(
        &self,
        filter: &NeighborFilter<'_>,
        reference_day: u32,
        reference_area: &str,
    ) -> Result<Vec<NeighborResult>, ThermogridError> {
        let results = filter.query(reference_day, reference_area)?;
        self.sink
            .write_neighbor_report(&results, reference_day, reference_area)?;
        Ok(results)
    }
}
