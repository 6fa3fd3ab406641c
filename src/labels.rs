//! Human-readable display labels for raw marker names.

use regex::Regex;
use std::sync::LazyLock;

/// Matches marker names like `10_big_buck_bunny_start`: a bitrate, a video
/// name, and a trailing start/end token. Anchored at the start only.
static BITRATE_VIDEO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+)_([a-z_]+)_(start|end)").expect("static pattern"));

/// Formats raw marker names into chart legend labels.
///
/// Holds the configured process prefix so the `process_<prefix>_start/stop`
/// markers get their dedicated labels.
pub struct Labeler {
    process_start: String,
    process_stop: String,
    prefix_upper: String,
}

impl Labeler {
    pub fn new(prefix: &str) -> Self {
        Self {
            process_start: format!("process_{}_start", prefix),
            process_stop: format!("process_{}_stop", prefix),
            prefix_upper: prefix.to_uppercase(),
        }
    }

    /// Format a raw marker name. Total over any input: names that match no
    /// special rule fall through to underscore-to-space title casing.
    pub fn format(&self, raw_name: &str) -> String {
        if let Some(caps) = BITRATE_VIDEO.captures(raw_name) {
            let bitrate = &caps[1];
            let video = title_case(&caps[2].replace('_', " "));
            return format!("{}Mbps {}", bitrate, video);
        }
        if raw_name == self.process_start {
            return format!("{} Start", self.prefix_upper);
        }
        if raw_name == self.process_stop {
            return format!("{} Stop", self.prefix_upper);
        }
        title_case(&raw_name.replace('_', " "))
    }
}

/// Title-case: uppercase any letter that follows a non-letter, lowercase
/// letters that follow letters. A letter after a digit starts a new word,
/// so `"10mbps big buck bunny"` becomes `"10Mbps Big Buck Bunny"` and
/// formatted labels are fixed points under re-formatting.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
