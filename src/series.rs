//! Metric series loading from typeperf-style CSV logs.

use crate::markers::parse_timestamp;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::path::Path;

/// One monitored resource over time: (timestamp, value) samples in file
/// order. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct MetricSeries {
    pub points: Vec<(NaiveDateTime, f64)>,
}

impl MetricSeries {
    /// Load a two-column CSV (one header line, then timestamp/value rows).
    ///
    /// Rows whose value does not parse to a finite number, or whose
    /// timestamp is unrecognizable, are dropped rather than reported: the
    /// counters occasionally log blank or "NaN" samples and a gap in the
    /// line is the wrong way to show that.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open metric log: {}", path.display()))?;

        let mut points = Vec::new();
        for record in reader.records() {
            let record =
                record.with_context(|| format!("Failed to read metric log: {}", path.display()))?;
            let (Some(ts_field), Some(value_field)) = (record.get(0), record.get(1)) else {
                continue;
            };
            let Ok(timestamp) = parse_timestamp(ts_field.trim()) else {
                continue;
            };
            let Ok(value) = value_field.trim().parse::<f64>() else {
                continue;
            };
            if !value.is_finite() {
                continue;
            }
            points.push((timestamp, value));
        }

        Ok(Self { points })
    }

    /// Timestamp of the first sample.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.points.first().map(|(t, _)| *t)
    }
}
