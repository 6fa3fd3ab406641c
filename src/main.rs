//! perfgraph - renders recorded system performance logs as annotated charts.
//!
//! Reads `cpu.csv`, `mem.csv`, and `disk.csv` from a log directory along with
//! `*.marker` event files, and writes one line chart per metric with dashed
//! vertical lines at each marker, color-paired by related events.
//!
//! Charts are emitted as SVG (`<prefix>_<metric>.svg`): plotters is built
//! with only its font-free SVG backend, so renders never depend on system
//! font libraries.

mod labels;
mod markers;
mod overlay;
mod plot;
mod series;

use anyhow::{Context, Result};
use clap::Parser;
use labels::Labeler;
use markers::MarkerSet;
use overlay::plan_overlays;
use series::MetricSeries;
use std::fs;
use std::path::{Path, PathBuf};

/// Render performance counter logs as annotated time-series charts
#[derive(Parser, Debug)]
#[command(name = "perfgraph")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run prefix: selects <prefix>-logs/<prefix>-plots and names outputs
    #[arg(short, long, default_value = "")]
    prefix: String,

    /// Log directory (overrides the prefix naming convention)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Output directory for charts (overrides the prefix naming convention)
    #[arg(long)]
    plot_dir: Option<PathBuf>,
}

/// Resolved run configuration, built once from the arguments and passed into
/// every component.
struct Config {
    prefix: String,
    log_dir: PathBuf,
    plot_dir: PathBuf,
}

impl Config {
    fn from_args(args: Args) -> Self {
        let log_dir = args
            .log_dir
            .unwrap_or_else(|| PathBuf::from(dir_name(&args.prefix, "logs")));
        let plot_dir = args
            .plot_dir
            .unwrap_or_else(|| PathBuf::from(dir_name(&args.prefix, "plots")));
        Self { prefix: args.prefix, log_dir, plot_dir }
    }

    /// Output filename for one metric chart.
    fn output_name(&self, basename: &str) -> String {
        if self.prefix.is_empty() {
            format!("{}.svg", basename)
        } else {
            format!("{}_{}.svg", self.prefix, basename)
        }
    }
}

fn dir_name(prefix: &str, kind: &str) -> String {
    if prefix.is_empty() {
        kind.to_string()
    } else {
        format!("{}-{}", prefix, kind)
    }
}

/// The three charts produced per run: (csv file, y-axis label, title, output
/// basename).
const METRICS: [(&str, &str, &str, &str); 3] = [
    ("cpu.csv", "CPU %", "CPU Usage Over Time", "cpu"),
    ("mem.csv", "Available Memory (MB)", "Memory Usage Over Time", "memory"),
    ("disk.csv", "Bytes/sec", "Disk Write Bytes Over Time", "disk"),
];

/// Create the output directory if missing, otherwise delete the files in it.
fn clean_output_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create plot directory: {}", dir.display()))?;
        return Ok(());
    }
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Failed to read plot directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove stale plot: {}", path.display()))?;
        }
    }
    Ok(())
}

fn run(config: &Config) -> Result<()> {
    clean_output_dir(&config.plot_dir)?;

    // Load every input before rendering anything: a missing or broken input
    // fails the run without leaving partial output behind.
    let mut loaded = Vec::with_capacity(METRICS.len());
    for (csv_name, y_label, title, basename) in METRICS {
        let series = MetricSeries::from_csv(config.log_dir.join(csv_name))?;
        loaded.push((series, y_label, title, basename));
    }
    let markers = MarkerSet::load(&config.log_dir)?;

    let labeler = Labeler::new(&config.prefix);
    // One grouping and color-assignment pass; every chart draws the same plan.
    let plan = plan_overlays(&markers, &labeler);

    for (series, y_label, title, basename) in &loaded {
        let out_path = config.plot_dir.join(config.output_name(basename));
        plot::render_metric_chart(series, &plan, y_label, title, &out_path)?;
        println!("Wrote {}", out_path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    let config = Config::from_args(Args::parse());
    run(&config)
}
