//! Windowed statistics and anomaly detection over a temperature grid.
//!
//! Each area column is processed independently: its day series is partitioned
//! into consecutive fixed-size windows (the final window may be shorter), and
//! every non-missing reading is scored against its window's mean and population
//! standard deviation.

use crate::grid::reader::{TemperatureGrid, MISSING_SENTINEL};
use crate::types::record::{WindowExtreme, WindowRecord, WindowSummary};
use log::info;

/// Default number of days per aggregation window.
pub const DEFAULT_WINDOW_SIZE: usize = 14;

/// Ratio above which a record is flagged as anomalous. One-sided: strongly
/// negative ratios do not qualify.
pub const ANOMALY_THRESHOLD: f64 = 3.0;

/// The three output streams of the statistics stage.
///
/// `records` holds exactly one row per non-missing grid cell, ordered by area
/// column and then by day. `anomalies` is the subset of `records` whose ratio
/// exceeds [`ANOMALY_THRESHOLD`]; `summaries` holds one row per non-empty
/// (area, window) pair.
#[derive(Debug, Clone, Default)]
pub struct WindowStats {
    pub records: Vec<WindowRecord>,
    pub summaries: Vec<WindowSummary>,
    pub anomalies: Vec<WindowRecord>,
}

/// Computes per-window aggregate statistics and per-record anomaly scores.
#[derive(Debug, Clone, Copy)]
pub struct WindowStatsEngine {
    window_size: usize,
    anomaly_threshold: f64,
}

impl WindowStatsEngine {
    /// Creates an engine with the given window size and the default anomaly
    /// threshold. A window size of 0 is clamped to 1.
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            anomaly_threshold: ANOMALY_THRESHOLD,
        }
    }

    /// Runs the statistics stage, consuming the grid.
    pub fn compute(&self, grid: TemperatureGrid) -> WindowStats {
        let days = grid.days();
        let mut out = WindowStats::default();

        for series in grid.series() {
            for window_start in (0..days).step_by(self.window_size) {
                let window_end = (window_start + self.window_size).min(days);
                self.compute_window(
                    &series.area,
                    &series.temps[window_start..window_end],
                    window_start,
                    &mut out,
                );
            }
        }

        info!(
            "Window statistics produced {} records, {} summaries, {} anomalies",
            out.records.len(),
            out.summaries.len(),
            out.anomalies.len()
        );
        out
    }

    fn compute_window(
        &self,
        area: &str,
        temps: &[f64],
        window_start: usize,
        out: &mut WindowStats,
    ) {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut max: Option<WindowExtreme> = None;
        let mut min: Option<WindowExtreme> = None;

        for (offset, &temp) in temps.iter().enumerate() {
            if temp == MISSING_SENTINEL {
                continue;
            }
            let day = (window_start + offset) as u32;
            sum += temp;
            count += 1;
            // Strict comparisons: on a tie the earliest day wins.
            if max.is_none_or(|m| temp > m.temperature) {
                max = Some(WindowExtreme { temperature: temp, day });
            }
            if min.is_none_or(|m| temp < m.temperature) {
                min = Some(WindowExtreme { temperature: temp, day });
            }
        }

        // A window with no usable readings leaves no trace in any stream.
        if count == 0 {
            return;
        }

        let average = sum / count as f64;
        let variance = temps
            .iter()
            .filter(|&&t| t != MISSING_SENTINEL)
            .map(|&t| (t - average) * (t - average))
            .sum::<f64>()
            / count as f64;
        let std_dev = variance.sqrt();

        let (max, min) = (max.expect("non-empty window"), min.expect("non-empty window"));
        out.summaries.push(WindowSummary {
            period: format!(
                "Days {}-{}",
                window_start,
                window_start + temps.len() - 1
            ),
            area: area.to_string(),
            average,
            std_dev,
            max,
            min,
        });

        for (offset, &temp) in temps.iter().enumerate() {
            if temp == MISSING_SENTINEL {
                continue;
            }
            let difference = temp - average;
            let ratio = if std_dev > 0.0 { difference / std_dev } else { 0.0 };
            let record = WindowRecord {
                day: (window_start + offset) as u32,
                area: area.to_string(),
                temperature: temp,
                window_average: average,
                difference,
                ratio,
            };
            if ratio > self.anomaly_threshold {
                out.anomalies.push(record.clone());
            }
            out.records.push(record);
        }
    }
}
