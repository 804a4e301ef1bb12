//! Renders the aggregate snapshot into the chat-ready report body
//!
//! ```text
//! 4  - 2
//! +   [######------]  50.00%
//! --- times:  2.00 ( 2.00 -  2.00)
//! --- moves:  10.0 (   10 -    10)
//! ```

use super::bucket::{BucketKey, BucketStats};
use super::summary::{summarize_moves, summarize_times};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Text the report message is created with before the first render
pub const PLACEHOLDER: &str = "# TEST SUMMARY";

const BAR_WIDTH: usize = 12;
const TIMESTAMP_FORMAT: &str = "%H:%M:%S of %m/%d/%Y";

const LEGEND: &str = "```md\n\
crate count - test count\n\
--- times: median (min, max)\n\
--- moves: median (min, max)```\n";

#[derive(Debug, Clone, Default)]
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        snapshot: &BTreeMap<BucketKey, BucketStats>,
        processed_count: usize,
        now: NaiveDateTime,
    ) -> String {
        let mut out = String::from(LEGEND);
        out.push_str("```diff\n");

        for (key, stats) in snapshot {
            out.push_str(&self.render_bucket(key, stats));
            out.push('\n');
        }

        out.push_str("```\n\n");
        // Writing to a String cannot fail
        let _ = writeln!(out, "***Tests ran:** {}*", processed_count);
        let _ = writeln!(out, "***Last update:** {}*", now.format(TIMESTAMP_FORMAT));
        out
    }

    pub fn render_bucket(&self, key: &BucketKey, stats: &BucketStats) -> String {
        let win_rate = stats.win_rate();
        let times = summarize_times(&stats.won_times);
        let moves = summarize_moves(&stats.won_moves);

        let mut out = String::new();
        let _ = writeln!(out, "{:<2} - {}", key, stats.total);
        out.push_str(if win_rate >= 0.5 { "+   " } else { "-   " });
        let _ = writeln!(out, "[{}] {:6.2}%", success_bar(win_rate), win_rate * 100.0);
        let _ = writeln!(
            out,
            "--- times: {:5.2} ({:5.2} - {:5.2})",
            times.median, times.min, times.max
        );
        let _ = writeln!(
            out,
            "--- moves: {:5.1} ({:5} - {:5})",
            moves.median, moves.min, moves.max
        );
        out
    }
}

fn success_bar(win_rate: f64) -> String {
    let filled = ((BAR_WIDTH as f64) * win_rate).round().clamp(0.0, BAR_WIDTH as f64) as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
