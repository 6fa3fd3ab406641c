//! Marker grouping, color assignment, and the annotation overlay plan.
//!
//! Related markers (`<stem>_start` / `<stem>_end`) share one color from a
//! fixed cyclic palette. The plan is computed once per run and drawn onto
//! every chart, so colors and legend entries are identical across the CPU,
//! memory, and disk outputs.

use crate::labels::Labeler;
use crate::markers::MarkerSet;
use chrono::NaiveDateTime;
use plotters::style::colors::{BLUE, CYAN, MAGENTA, RED};
use plotters::style::full_palette::{BROWN, ORANGE, PINK, PURPLE};
use plotters::style::RGBColor;
use std::collections::HashMap;

/// Fixed marker palette. Order and length are part of the output contract:
/// the 9th distinct group wraps around to orange again. Color reuse past 8
/// groups is accepted, not a fault.
pub const PALETTE: [RGBColor; 8] = [ORANGE, BLUE, RED, PURPLE, BROWN, PINK, CYAN, MAGENTA];

/// One dashed vertical line to draw on each chart.
///
/// `legend_label` is `Some` only for the first marker producing that label;
/// later markers with the same label reuse the color recorded here and stay
/// out of the legend.
#[derive(Debug, Clone)]
pub struct OverlayLine {
    pub timestamp: NaiveDateTime,
    pub color: RGBColor,
    pub legend_label: Option<String>,
}

/// Partition raw marker names into related-event groups.
///
/// The stem is the name with a single trailing `_start` or `_end` removed
/// (case-insensitive); an unpaired marker forms a singleton group. First-seen
/// order is preserved across stems and within each group.
pub fn group_markers<'a, I>(names: I) -> Vec<(String, Vec<String>)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut members: HashMap<String, Vec<String>> = HashMap::new();

    for name in names {
        let stem = strip_marker_suffix(name).to_string();
        match members.get_mut(&stem) {
            Some(group) => group.push(name.to_string()),
            None => {
                order.push(stem.clone());
                members.insert(stem, vec![name.to_string()]);
            }
        }
    }

    order
        .into_iter()
        .map(|stem| {
            let group = members.remove(&stem).unwrap_or_default();
            (stem, group)
        })
        .collect()
}

/// Remove one trailing `_start`/`_end` token, if present.
fn strip_marker_suffix(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    for suffix in ["_start", "_end"] {
        if lower.ends_with(suffix) {
            return &name[..name.len() - suffix.len()];
        }
    }
    name
}

/// Assign one palette color per stem, cycling in stem order.
pub fn assign_colors<'a, I>(stems: I) -> HashMap<String, RGBColor>
where
    I: IntoIterator<Item = &'a str>,
{
    stems
        .into_iter()
        .zip(PALETTE.iter().copied().cycle())
        .map(|(stem, color)| (stem.to_string(), color))
        .collect()
}

/// The single overlay pass: group the markers, assign group colors, format
/// labels, and resolve legend deduplication.
///
/// Once a label has been seen, its recorded color wins for every later marker
/// formatting to the same label, even across stems. First occurrence pins
/// both the color and the legend entry.
pub fn plan_overlays(markers: &MarkerSet, labeler: &Labeler) -> Vec<OverlayLine> {
    let groups = group_markers(markers.names());
    let colors = assign_colors(groups.iter().map(|(stem, _)| stem.as_str()));

    let mut pinned: HashMap<String, RGBColor> = HashMap::new();
    let mut plan = Vec::new();

    for (stem, names) in &groups {
        let group_color = colors[stem.as_str()];
        for name in names {
            let Some(timestamp) = markers.timestamp(name) else {
                continue; // names come from the same set, so this never fires
            };
            let label = labeler.format(name);
            match pinned.get(&label) {
                Some(&color) => plan.push(OverlayLine {
                    timestamp,
                    color,
                    legend_label: None,
                }),
                None => {
                    pinned.insert(label.clone(), group_color);
                    plan.push(OverlayLine {
                        timestamp,
                        color: group_color,
                        legend_label: Some(label),
                    });
                }
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::Marker;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(secs: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 1)
            .unwrap()
            .and_hms_opt(10, 0, secs)
            .unwrap()
    }

    fn marker_set(names: &[&str]) -> MarkerSet {
        MarkerSet::from_markers(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| Marker {
                    name: name.to_string(),
                    timestamp: ts(i as u32),
                })
                .collect(),
        )
    }

    #[test]
    fn start_end_pairs_share_a_stem() {
        let groups = group_markers(["10_bunny_start", "process_foo_start", "10_bunny_end"]);
        assert_eq!(
            groups,
            vec![
                (
                    "10_bunny".to_string(),
                    vec!["10_bunny_start".to_string(), "10_bunny_end".to_string()]
                ),
                ("process_foo".to_string(), vec!["process_foo_start".to_string()]),
            ]
        );
    }

    #[test]
    fn suffix_strip_is_case_insensitive_and_single() {
        let groups = group_markers(["phase_END", "reboot"]);
        assert_eq!(groups[0].0, "phase");
        assert_eq!(groups[1].0, "reboot");
        // Only one trailing token is removed.
        let groups = group_markers(["a_end_start"]);
        assert_eq!(groups[0].0, "a_end");
    }

    #[test]
    fn colors_follow_palette_in_stem_order() {
        let stems = ["a", "b", "c"];
        let colors = assign_colors(stems);
        assert_eq!(colors["a"], PALETTE[0]);
        assert_eq!(colors["b"], PALETTE[1]);
        assert_eq!(colors["c"], PALETTE[2]);
    }

    #[test]
    fn ninth_stem_wraps_to_first_color() {
        let stems = ["a", "b", "c", "d", "e", "f", "g", "h", "i"];
        let colors = assign_colors(stems);
        assert_eq!(colors["i"], colors["a"]);
        assert_eq!(colors["i"], PALETTE[0]);
    }

    #[test]
    fn paired_markers_render_in_one_color_with_one_legend_entry() {
        let markers = marker_set(&["10_big_buck_bunny_start", "10_big_buck_bunny_end", "process_foo_start"]);
        let plan = plan_overlays(&markers, &Labeler::new("foo"));

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].legend_label.as_deref(), Some("10Mbps Big Buck Bunny"));
        assert_eq!(plan[1].legend_label, None);
        assert_eq!(plan[0].color, plan[1].color);
        assert_eq!(plan[2].legend_label.as_deref(), Some("FOO Start"));
        assert_ne!(plan[2].color, plan[0].color);
    }

    #[test]
    fn repeated_label_across_stems_reuses_pinned_color() {
        // Two distinct stems whose names title-case to the same label: the
        // second line takes the first label's pinned color, not its own stem
        // color, and stays out of the legend.
        let markers = marker_set(&["warmup_phase", "WARMUP_PHASE"]);
        let plan = plan_overlays(&markers, &Labeler::new(""));

        assert_eq!(plan[0].legend_label.as_deref(), Some("Warmup Phase"));
        assert_eq!(plan[1].legend_label, None);
        assert_eq!(plan[1].color, plan[0].color);
        assert_eq!(plan[1].color, PALETTE[0]);
    }

    #[test]
    fn legend_entries_equal_distinct_labels() {
        let markers = marker_set(&[
            "10_sintel_start",
            "10_sintel_end",
            "process_foo_start",
            "process_foo_stop",
            "warmup",
        ]);
        let plan = plan_overlays(&markers, &Labeler::new("foo"));
        let legend_count = plan.iter().filter(|line| line.legend_label.is_some()).count();
        assert_eq!(plan.len(), 5);
        assert_eq!(legend_count, 4);
    }
}
