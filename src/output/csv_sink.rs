//! Writes the pipeline's output streams as comma-delimited files with fixed
//! header lines and 4-decimal float precision.
//!
//! The main and enriched record streams are sharded: a shard holds at most a
//! configured number of distinct areas. Sharding is an output-size mitigation
//! only; shard boundaries never change the rows themselves, and both streams
//! use the same boundaries.

use crate::output::error::SinkError;
use crate::types::record::{EnrichedRecord, NeighborResult, WindowRecord, WindowSummary};
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::ops::Range;
use std::path::{Path, PathBuf};

const FLOAT_PRECISION: usize = 4;

/// Writes output files into a single directory.
#[derive(Debug, Clone)]
pub struct CsvSink {
    out_dir: PathBuf,
}

impl CsvSink {
    pub fn new(out_dir: &Path) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
        }
    }

    /// Writes the main window record stream, sharded by distinct area count.
    /// Returns the written paths, `window_records_1.csv` onward.
    pub fn write_window_shards(
        &self,
        records: &[WindowRecord],
        shard_area_limit: usize,
    ) -> Result<Vec<PathBuf>, SinkError> {
        let mut paths = Vec::new();
        let areas: Vec<&str> = records.iter().map(|r| r.area.as_str()).collect();
        for (index, range) in shard_bounds(&areas, shard_area_limit).into_iter().enumerate() {
            let path = self.out_dir.join(format!("window_records_{}.csv", index + 1));
            self.write_frame(window_frame(&records[range])?, &path)?;
            paths.push(path);
        }
        Ok(paths)
    }

    /// Writes the anomaly stream. The file is written even when there are no
    /// anomalies, so the header line is always present.
    pub fn write_anomalies(&self, anomalies: &[WindowRecord]) -> Result<PathBuf, SinkError> {
        let path = self.out_dir.join("anomalies.csv");
        self.write_frame(window_frame(anomalies)?, &path)?;
        Ok(path)
    }

    /// Writes the per-window summary stream.
    pub fn write_summaries(&self, summaries: &[WindowSummary]) -> Result<PathBuf, SinkError> {
        let path = self.out_dir.join("window_summary.csv");
        let frame = df!(
            "Period" => summaries.iter().map(|s| s.period.as_str()).collect::<Vec<_>>(),
            "Area" => summaries.iter().map(|s| s.area.as_str()).collect::<Vec<_>>(),
            "Average Temperature" => summaries.iter().map(|s| s.average).collect::<Vec<f64>>(),
            "Standard Deviation" => summaries.iter().map(|s| s.std_dev).collect::<Vec<f64>>(),
            "Max Temperature (Day)" => summaries
                .iter()
                .map(|s| format!("{:.prec$} (Day {})", s.max.temperature, s.max.day, prec = FLOAT_PRECISION))
                .collect::<Vec<_>>(),
            "Min Temperature (Day)" => summaries
                .iter()
                .map(|s| format!("{:.prec$} (Day {})", s.min.temperature, s.min.day, prec = FLOAT_PRECISION))
                .collect::<Vec<_>>(),
        )?;
        self.write_frame(frame, &path)?;
        Ok(path)
    }

    /// Writes the enriched stream, sharded at the same boundaries as the main
    /// stream (enrichment is one-to-one and order-preserving).
    pub fn write_enriched_shards(
        &self,
        enriched: &[EnrichedRecord],
        shard_area_limit: usize,
    ) -> Result<Vec<PathBuf>, SinkError> {
        let mut paths = Vec::new();
        let areas: Vec<&str> = enriched.iter().map(|e| e.record.area.as_str()).collect();
        for (index, range) in shard_bounds(&areas, shard_area_limit).into_iter().enumerate() {
            let path = self.out_dir.join(format!("enriched_{}.csv", index + 1));
            self.write_frame(enriched_frame(&enriched[range])?, &path)?;
            paths.push(path);
        }
        Ok(paths)
    }

    /// Writes one neighbor query report, named by its reference day and area.
    pub fn write_neighbor_report(
        &self,
        results: &[NeighborResult],
        reference_day: u32,
        reference_area: &str,
    ) -> Result<PathBuf, SinkError> {
        let path = self.out_dir.join(format!(
            "neighbors_day{}_area{}.csv",
            reference_day,
            sanitize_for_filename(reference_area)
        ));
        let enriched: Vec<EnrichedRecord> =
            results.iter().map(|r| r.record.clone()).collect();
        let mut frame = enriched_frame(&enriched)?;
        frame.with_column(Series::new(
            "Distance (km)".into(),
            results.iter().map(|r| r.distance_km).collect::<Vec<f64>>(),
        ))?;
        self.write_frame(frame, &path)?;
        Ok(path)
    }

    fn write_frame(&self, mut frame: DataFrame, path: &Path) -> Result<(), SinkError> {
        let mut file =
            File::create(path).map_err(|e| SinkError::Create(path.to_path_buf(), e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_float_precision(Some(FLOAT_PRECISION))
            .finish(&mut frame)
            .map_err(|e| SinkError::Write(path.to_path_buf(), e))?;
        info!("Wrote {} rows to {:?}", frame.height(), path);
        Ok(())
    }
}

fn window_frame(records: &[WindowRecord]) -> PolarsResult<DataFrame> {
    df!(
        "Day" => records.iter().map(|r| r.day).collect::<Vec<u32>>(),
        "Area" => records.iter().map(|r| r.area.as_str()).collect::<Vec<_>>(),
        "Temperature" => records.iter().map(|r| r.temperature).collect::<Vec<f64>>(),
        "Average" => records.iter().map(|r| r.window_average).collect::<Vec<f64>>(),
        "Difference" => records.iter().map(|r| r.difference).collect::<Vec<f64>>(),
        "Ratio" => records.iter().map(|r| r.ratio).collect::<Vec<f64>>(),
    )
}

fn enriched_frame(enriched: &[EnrichedRecord]) -> PolarsResult<DataFrame> {
    let mut frame = window_frame(
        &enriched
            .iter()
            .map(|e| e.record.clone())
            .collect::<Vec<_>>(),
    )?;
    // Unknown areas carry nulls, which serialize as empty fields.
    frame.with_column(Series::new(
        "Lat".into(),
        enriched
            .iter()
            .map(|e| e.coordinate.map(|c| c.0))
            .collect::<Vec<Option<f64>>>(),
    ))?;
    frame.with_column(Series::new(
        "Lng".into(),
        enriched
            .iter()
            .map(|e| e.coordinate.map(|c| c.1))
            .collect::<Vec<Option<f64>>>(),
    ))?;
    Ok(frame)
}

/// Shard boundaries over an area-grouped row sequence: each range covers at
/// most `limit` distinct areas. Always yields at least one range so header-only
/// files exist for empty streams.
fn shard_bounds(areas: &[&str], limit: usize) -> Vec<Range<usize>> {
    let limit = limit.max(1);
    let mut bounds = Vec::new();
    let mut start = 0usize;
    let mut distinct = 0usize;
    let mut prev: Option<&str> = None;

    for (row, &area) in areas.iter().enumerate() {
        if prev != Some(area) {
            prev = Some(area);
            distinct += 1;
            if distinct > limit {
                bounds.push(start..row);
                start = row;
                distinct = 1;
            }
        }
    }
    bounds.push(start..areas.len());
    bounds
}

fn sanitize_for_filename(area: &str) -> String {
    area.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::coordinate::LatLon;
    use tempfile::TempDir;

    fn record(day: u32, area: &str, temperature: f64) -> WindowRecord {
        WindowRecord {
            day,
            area: area.to_string(),
            temperature,
            window_average: temperature / 2.0,
            difference: temperature / 2.0,
            ratio: 1.0,
        }
    }

    #[test]
    fn window_stream_has_fixed_header_and_precision() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path());
        let paths = sink
            .write_window_shards(&[record(0, "0", 1.5)], 7000)
            .unwrap();

        assert_eq!(paths.len(), 1);
        let contents = std::fs::read_to_string(&paths[0]).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Day,Area,Temperature,Average,Difference,Ratio"
        );
        assert_eq!(lines.next().unwrap(), "0,0,1.5000,0.7500,0.7500,1.0000");
    }

    #[test]
    fn empty_anomaly_stream_still_writes_the_header() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path());
        let path = sink.write_anomalies(&[]).unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.trim(), "Day,Area,Temperature,Average,Difference,Ratio");
    }

    #[test]
    fn summary_stream_renders_extrema_with_days() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path());
        let summary = WindowSummary {
            period: "Days 0-13".to_string(),
            area: "3".to_string(),
            average: 7.0,
            std_dev: 1.25,
            max: crate::types::record::WindowExtreme {
                temperature: 13.0,
                day: 12,
            },
            min: crate::types::record::WindowExtreme {
                temperature: 1.0,
                day: 0,
            },
        };
        let path = sink.write_summaries(&[summary]).unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Period,Area,Average Temperature,Standard Deviation,Max Temperature (Day),Min Temperature (Day)"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Days 0-13,3,7.0000,1.2500,13.0000 (Day 12),1.0000 (Day 0)"
        );
    }

    #[test]
    fn enriched_stream_leaves_unknown_coordinates_empty() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path());
        let enriched = vec![
            EnrichedRecord {
                record: record(0, "0", 2.0),
                coordinate: Some(LatLon(10.0, 20.0)),
            },
            EnrichedRecord {
                record: record(1, "1", 2.0),
                coordinate: None,
            },
        ];
        let paths = sink.write_enriched_shards(&enriched, 7000).unwrap();

        let contents = std::fs::read_to_string(&paths[0]).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Day,Area,Temperature,Average,Difference,Ratio,Lat,Lng"
        );
        assert_eq!(
            lines.next().unwrap(),
            "0,0,2.0000,1.0000,1.0000,1.0000,10.0000,20.0000"
        );
        assert_eq!(lines.next().unwrap(), "1,1,2.0000,1.0000,1.0000,1.0000,,");
    }

    #[test]
    fn neighbor_report_appends_the_distance_column() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path());
        let results = vec![NeighborResult {
            record: EnrichedRecord {
                record: record(20, "7", 4.0),
                coordinate: Some(LatLon(0.0, 4.49)),
            },
            distance_km: 499.2567,
        }];
        let path = sink.write_neighbor_report(&results, 20, "7").unwrap();

        assert!(path.ends_with("neighbors_day20_area7.csv"));
        let contents = std::fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Day,Area,Temperature,Average,Difference,Ratio,Lat,Lng,Distance (km)"
        );
        assert!(lines.next().unwrap().ends_with(",499.2567"));
    }

    #[test]
    fn sharding_splits_on_distinct_area_count() {
        let records = vec![
            record(0, "0", 1.0),
            record(1, "0", 1.0),
            record(0, "1", 1.0),
            record(0, "2", 1.0),
            record(1, "2", 1.0),
        ];
        let areas: Vec<&str> = records.iter().map(|r| r.area.as_str()).collect();
        assert_eq!(shard_bounds(&areas, 2), vec![0..3, 3..5]);
        assert_eq!(shard_bounds(&areas, 3), vec![0..5]);
    }

    #[test]
    fn shard_size_never_changes_the_row_set() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path());
        let records: Vec<WindowRecord> = (0..6)
            .flat_map(|area| {
                (0..3).map(move |day| record(day, &area.to_string(), f64::from(day) + 1.0))
            })
            .collect();

        let single = sink.write_window_shards(&records, 7000).unwrap();
        let mut all_rows: Vec<String> = Vec::new();
        for path in &single {
            all_rows.extend(
                std::fs::read_to_string(path)
                    .unwrap()
                    .lines()
                    .skip(1)
                    .map(String::from),
            );
        }

        let sharded = sink.write_window_shards(&records, 2).unwrap();
        assert_eq!(sharded.len(), 3);
        let mut sharded_rows: Vec<String> = Vec::new();
        for path in &sharded {
            sharded_rows.extend(
                std::fs::read_to_string(path)
                    .unwrap()
                    .lines()
                    .skip(1)
                    .map(String::from),
            );
        }
        assert_eq!(all_rows, sharded_rows);
    }

    #[test]
    fn awkward_area_ids_stay_filesystem_safe() {
        assert_eq!(sanitize_for_filename("a/b c"), "a_b_c");
        assert_eq!(sanitize_for_filename("A-1_2"), "A-1_2");
    }
}
