//! Builds the area-to-coordinate lookup used by the enrichment stage.
//!
//! The source is tab-delimited with no header and five positional columns:
//! area id, two unused fields, longitude, latitude. The column order is part of
//! the format: longitude comes before latitude.

use crate::coord_index::error::CoordIndexError;
use crate::types::coordinate::LatLon;
use crate::types::record::AreaId;
use log::{info, warn};
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

const AREA_COLUMN: usize = 0;
const LNG_COLUMN: usize = 3;
const LAT_COLUMN: usize = 4;
const COLUMN_COUNT: usize = 5;

/// Read-only lookup from [`AreaId`] to [`LatLon`], built once per run.
///
/// Rows that are too short or fail to parse are skipped; a duplicate area id
/// overwrites the earlier occurrence (last write wins).
#[derive(Debug, Clone, Default)]
pub struct CoordinateIndex {
    coords: HashMap<AreaId, LatLon>,
}

impl CoordinateIndex {
    /// Loads the index from a tab-delimited coordinate file.
    ///
    /// # Errors
    ///
    /// Returns [`CoordIndexError::Open`] if the file cannot be opened and
    /// [`CoordIndexError::Read`] if it cannot be parsed at all. Individual
    /// malformed rows never fail the load.
    pub fn from_tsv_path(path: &Path) -> Result<Self, CoordIndexError> {
        let file =
            File::open(path).map_err(|e| CoordIndexError::Open(path.to_path_buf(), e))?;

        let df = match Self::read_frame(file) {
            Ok(df) => df,
            // An empty source is a valid, empty index.
            Err(PolarsError::NoData(_)) => {
                warn!("Coordinate source {:?} contains no rows", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(CoordIndexError::Read(path.to_path_buf(), e)),
        };

        let index = Self::from_frame(&df);
        info!(
            "Loaded coordinate index with {} areas from {:?}",
            index.len(),
            path
        );
        Ok(index)
    }

    /// Builds an index directly from `(area, coordinate)` pairs. Later pairs
    /// overwrite earlier ones, like the file loader.
    pub fn from_entries(entries: impl IntoIterator<Item = (AreaId, LatLon)>) -> Self {
        Self {
            coords: entries.into_iter().collect(),
        }
    }

    /// Looks up the coordinate for an area id.
    pub fn get(&self, area: &str) -> Option<LatLon> {
        self.coords.get(area).copied()
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    fn read_frame(file: File) -> PolarsResult<DataFrame> {
        // Schema inference is disabled so every column stays a string; field
        // validation happens row by row in `from_frame`.
        CsvReadOptions::default()
            .with_has_header(false)
            .with_infer_schema_length(Some(0))
            .with_parse_options(
                CsvParseOptions::default()
                    .with_separator(b'\t')
                    .with_truncate_ragged_lines(true),
            )
            .into_reader_with_file_handle(file)
            .finish()
    }

    fn from_frame(df: &DataFrame) -> Self {
        let mut coords = HashMap::new();
        let mut skipped = 0usize;

        if df.width() < COLUMN_COUNT {
            warn!(
                "Coordinate source has only {} columns, expected {}; no rows usable",
                df.width(),
                COLUMN_COUNT
            );
            return Self::default();
        }

        let columns = df.get_columns();
        let areas = columns[AREA_COLUMN].str();
        let lngs = columns[LNG_COLUMN].str();
        let lats = columns[LAT_COLUMN].str();
        let (Ok(areas), Ok(lngs), Ok(lats)) = (areas, lngs, lats) else {
            warn!("Coordinate source columns are not text; no rows usable");
            return Self::default();
        };

        for row in 0..df.height() {
            let Some(parsed) = Self::parse_row(areas.get(row), lngs.get(row), lats.get(row))
            else {
                skipped += 1;
                continue;
            };
            let (area, coord) = parsed;
            coords.insert(area, coord);
        }

        if skipped > 0 {
            warn!("Skipped {} malformed coordinate rows", skipped);
        }
        Self { coords }
    }

    fn parse_row(
        area: Option<&str>,
        lng: Option<&str>,
        lat: Option<&str>,
    ) -> Option<(AreaId, LatLon)> {
        let area = area?.trim();
        if area.is_empty() {
            return None;
        }
        let lng: f64 = lng?.trim().parse().ok()?;
        let lat: f64 = lat?.trim().parse().ok()?;
        Some((area.to_string(), LatLon(lat, lng)))
    }
}
