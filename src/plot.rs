//! Chart composition: one SVG per metric, annotated with the overlay plan.

use crate::overlay::OverlayLine;
use crate::series::MetricSeries;
use anyhow::Result;
use chrono::NaiveDateTime;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1600, 600);

/// Width reserved right of the plot area for the combined legend.
const LEGEND_AREA: u32 = 260;

/// Seconds elapsed from the chart origin.
fn elapsed_secs(origin: NaiveDateTime, instant: NaiveDateTime) -> f64 {
    (instant - origin).num_milliseconds() as f64 / 1000.0
}

/// Plot a metric series as a line chart with dashed vertical marker lines,
/// persisting it to `path` (overwriting any existing file).
///
/// Markers outside the sampled time span widen the x-axis rather than being
/// clipped, so an event logged just before sampling began is still visible.
pub fn render_metric_chart(
    series: &MetricSeries,
    overlays: &[OverlayLine],
    y_label: &str,
    title: &str,
    path: &Path,
) -> Result<()> {
    let Some(origin) = series.start() else {
        anyhow::bail!("No samples to plot for {}", path.display());
    };

    let times: Vec<f64> = series.points.iter().map(|(t, _)| elapsed_secs(origin, *t)).collect();
    let values: Vec<f64> = series.points.iter().map(|(_, v)| *v).collect();
    let marker_xs: Vec<f64> = overlays.iter().map(|o| elapsed_secs(origin, o.timestamp)).collect();

    let x_min = marker_xs.iter().cloned().fold(0.0_f64, f64::min);
    let x_max = times
        .last()
        .copied()
        .unwrap_or(0.0)
        .max(marker_xs.iter().cloned().fold(0.0_f64, f64::max))
        .max(x_min + 1.0);
    let y_max = values.iter().cloned().fold(0.0_f64, f64::max).max(1.0) * 1.1;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .right_y_label_area_size(LEGEND_AREA)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time (seconds)")
        .y_desc(y_label)
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            times.iter().zip(values.iter()).map(|(x, y)| (*x, *y)),
            &BLUE,
        ))?
        .label(y_label)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    for (line, &x) in overlays.iter().zip(marker_xs.iter()) {
        let color = line.color;
        let drawn = chart.draw_series(DashedLineSeries::new(
            [(x, 0.0), (x, y_max)],
            4,
            3,
            color.stroke_width(1),
        ))?;
        if let Some(ref label) = line.legend_label {
            drawn
                .label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
    }

    // Combined legend in the reserved strip outside the plot area,
    // vertically centered.
    let (plot_w, plot_h) = chart.plotting_area().dim_in_pixel();
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::Coordinate(plot_w as i32 + 10, plot_h as i32 / 2))
        .draw()?;

    root.present()?;
    Ok(())
}
