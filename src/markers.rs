//! Event marker loading from `.marker` files in the log directory.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

/// A named event captured at a single instant during the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub timestamp: NaiveDateTime,
}

/// All markers for one run, in a stable first-seen order.
///
/// Names are the lower-cased file stems of the `.marker` files and are unique
/// within a run. Directory entries are sorted by filename before reading so
/// the marker order (and therefore group and color order) is reproducible.
#[derive(Debug, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    /// Scan `dir` for `*.marker` files and parse their timestamps.
    ///
    /// A marker file whose first line is not a recognizable timestamp aborts
    /// the run: annotation positions have to be trusted.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map_or(false, |ext| ext == "marker"))
            .collect();
        paths.sort();

        let mut markers = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read marker file: {}", path.display()))?;
            let first_line = content.lines().next().unwrap_or("").trim();
            let timestamp = parse_timestamp(first_line)
                .with_context(|| format!("Bad timestamp in marker file: {}", path.display()))?;
            markers.push(Marker { name, timestamp });
        }

        Ok(Self { markers })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(|m| m.name.as_str())
    }

    pub fn timestamp(&self, name: &str) -> Option<NaiveDateTime> {
        self.markers.iter().find(|m| m.name == name).map(|m| m.timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    #[cfg(test)]
    pub fn from_markers(markers: Vec<Marker>) -> Self {
        Self { markers }
    }
}

/// Timestamp layouts accepted in marker files, tried in order after RFC 3339.
const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
];

/// Parse a marker timestamp. Offsets in RFC 3339 input are discarded and the
/// written clock value kept, matching how the metric CSVs record time.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    anyhow::bail!("Unrecognized timestamp: {:?}", s)
}
