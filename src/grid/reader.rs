//! Reads the day × area temperature grid from comma-delimited text.
//!
//! The first line is a header of area labels and is skipped; the first column
//! of every data row is the day index and is discarded. Rows are ordered by
//! day, with row 0 holding day 0.

use crate::grid::error::GridError;
use crate::types::record::AreaId;
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Cell value marking a missing reading. Excluded from all aggregation.
pub const MISSING_SENTINEL: f64 = 0.0;

/// The day series of a single area column.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSeries {
    pub area: AreaId,
    /// One value per day; index 0 is day 0.
    pub temps: Vec<f64>,
}

/// An owned, rectangular day × area grid of temperature readings, stored
/// column-major (one series per area).
///
/// The grid is consumed by the window statistics stage and dropped there.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureGrid {
    series: Vec<AreaSeries>,
    days: usize,
}

impl TemperatureGrid {
    /// Reads a grid from a comma-delimited file.
    ///
    /// Cells that fail numeric parsing are coerced to [`MISSING_SENTINEL`].
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Open`] if the file cannot be opened,
    /// [`GridError::Empty`] if it has no data rows or no area columns, and
    /// [`GridError::Read`] for anything polars cannot parse (including ragged
    /// rows, which would break the rectangularity invariant).
    pub fn from_csv_path(path: &Path) -> Result<Self, GridError> {
        let file = File::open(path).map_err(|e| GridError::Open(path.to_path_buf(), e))?;

        let df = match Self::read_frame(file) {
            Ok(df) => df,
            Err(PolarsError::NoData(_)) => return Err(GridError::Empty(path.to_path_buf())),
            Err(e) => return Err(GridError::Read(path.to_path_buf(), e)),
        };

        // Column 0 is the day index; everything after it is one area per column.
        if df.height() == 0 || df.width() <= 1 {
            return Err(GridError::Empty(path.to_path_buf()));
        }

        let series = Self::extract_series(&df).map_err(|e| GridError::Read(path.to_path_buf(), e))?;
        let grid = Self {
            days: df.height(),
            series,
        };
        info!(
            "Loaded temperature grid with {} days x {} areas from {:?}",
            grid.days,
            grid.area_count(),
            path
        );
        Ok(grid)
    }

    /// Builds a grid directly from per-area series. All series must have the
    /// same length; used for synthetic grids in tests and benches.
    pub fn from_series(series: Vec<AreaSeries>) -> Self {
        let days = series.first().map_or(0, |s| s.temps.len());
        debug_assert!(series.iter().all(|s| s.temps.len() == days));
        Self { series, days }
    }

    /// Number of day rows in the grid.
    pub fn days(&self) -> usize {
        self.days
    }

    /// Number of area columns in the grid.
    pub fn area_count(&self) -> usize {
        self.series.len()
    }

    /// The per-area day series, in column order.
    pub fn series(&self) -> &[AreaSeries] {
        &self.series
    }

    fn read_frame(file: File) -> PolarsResult<DataFrame> {
        // The header line is skipped rather than parsed: its area labels carry
        // no meaning, and areas are keyed by column position instead.
        CsvReadOptions::default()
            .with_has_header(false)
            .with_skip_rows(1)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(file)
            .finish()
    }

    fn extract_series(df: &DataFrame) -> PolarsResult<Vec<AreaSeries>> {
        let mut series = Vec::with_capacity(df.width() - 1);
        for (position, column) in df.get_columns().iter().skip(1).enumerate() {
            // Non-strict cast: unparseable cells become null, then the missing
            // sentinel.
            let values = column.cast(&DataType::Float64)?;
            let values = values.f64()?;
            let temps = (0..values.len())
                .map(|row| values.get(row).unwrap_or(MISSING_SENTINEL))
                .collect();
            series.push(AreaSeries {
                area: position.to_string(),
                temps,
            });
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_source(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp source");
        file.write_all(contents.as_bytes())
            .expect("Failed to write temp source");
        file.flush().expect("Failed to flush temp source");
        file
    }

    #[test]
    fn drops_header_and_day_column() {
        let source = write_source("day,areaA,areaB\n0,1.5,2.5\n1,3.0,4.0\n");
        let grid = TemperatureGrid::from_csv_path(source.path()).unwrap();

        assert_eq!(grid.days(), 2);
        assert_eq!(grid.area_count(), 2);
        assert_eq!(grid.series()[0].area, "0");
        assert_eq!(grid.series()[0].temps, vec![1.5, 3.0]);
        assert_eq!(grid.series()[1].area, "1");
        assert_eq!(grid.series()[1].temps, vec![2.5, 4.0]);
    }

    #[test]
    fn coerces_unparseable_cells_to_sentinel() {
        let source = write_source("day,areaA\n0,garbage\n1,12.5\n2,\n");
        let grid = TemperatureGrid::from_csv_path(source.path()).unwrap();

        assert_eq!(grid.series()[0].temps, vec![MISSING_SENTINEL, 12.5, MISSING_SENTINEL]);
    }

    #[test]
    fn header_only_source_is_empty() {
        let source = write_source("day,areaA,areaB\n");
        let err = TemperatureGrid::from_csv_path(source.path()).unwrap_err();
        assert!(matches!(err, GridError::Empty(_)));
    }

    #[test]
    fn zero_byte_source_is_empty() {
        let source = write_source("");
        let err = TemperatureGrid::from_csv_path(source.path()).unwrap_err();
        assert!(matches!(err, GridError::Empty(_)));
    }

    #[test]
    fn day_index_only_rows_have_no_areas() {
        let source = write_source("day\n0\n1\n");
        let err = TemperatureGrid::from_csv_path(source.path()).unwrap_err();
        assert!(matches!(err, GridError::Empty(_)));
    }

    #[test]
    fn missing_file_fails_to_open() {
        let err = TemperatureGrid::from_csv_path(Path::new("/nonexistent/grid.csv")).unwrap_err();
        assert!(matches!(err, GridError::Open(_, _)));
    }
}
