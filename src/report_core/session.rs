//! Aggregation state owned by one reporting session

use super::bucket::BucketAggregator;
use super::dedup::{DedupMode, DedupTracker};
use super::formatter::ReportFormatter;
use super::reader::LogReader;
use super::record::{RawRow, ResultRecord};
use chrono::NaiveDateTime;
use std::path::PathBuf;

/// Row counts for one read of the log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub rows_seen: usize,
    pub folded: usize,
    pub already_seen: usize,
    pub malformed: usize,
}

pub struct ReportSession {
    reader: LogReader,
    tracker: DedupTracker,
    aggregator: BucketAggregator,
    formatter: ReportFormatter,
}

impl ReportSession {
    pub fn new(log_path: PathBuf, dedup_mode: DedupMode) -> Self {
        Self {
            reader: LogReader::new(log_path),
            tracker: DedupTracker::new(dedup_mode),
            aggregator: BucketAggregator::new(),
            formatter: ReportFormatter::new(),
        }
    }

    /// Re-read the log and fold every row not yet accounted for
    pub async fn refresh(&mut self) -> CycleStats {
        let rows = self.reader.poll().await;
        self.ingest(rows)
    }

    pub fn ingest(&mut self, rows: Vec<RawRow>) -> CycleStats {
        let mut stats = CycleStats {
            rows_seen: rows.len(),
            ..CycleStats::default()
        };

        for row in rows {
            if self.tracker.seen(&row) {
                stats.already_seen += 1;
                continue;
            }

            match ResultRecord::from_fields(&row.fields) {
                Ok(record) => {
                    self.aggregator.fold(&record);
                    self.tracker.mark(&row);
                    stats.folded += 1;
                }
                Err(e) => {
                    // Not marked, so a row caught mid-write is picked up next cycle
                    log::debug!("Skipping malformed row {}: {}", row.position, e);
                    stats.malformed += 1;
                }
            }
        }

        stats
    }

    pub fn render(&self, now: NaiveDateTime) -> String {
        self.formatter
            .render(self.aggregator.snapshot(), self.tracker.len(), now)
    }

    pub fn aggregator(&self) -> &BucketAggregator {
        &self.aggregator
    }

    pub fn processed_count(&self) -> usize {
        self.tracker.len()
    }

    pub fn dedup_mode(&self) -> DedupMode {
        self.tracker.mode()
    }

    pub fn log_path(&self) -> &std::path::Path {
        self.reader.path()
    }
}
