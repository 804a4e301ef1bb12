//! Per-difficulty running statistics

use super::record::ResultRecord;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Difficulty key of a result row (the crate count).
///
/// Keeps the spelling found in the log for display, ordered by its integer
/// value first so `"10"` sorts after `"3"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    raw: String,
    value: i64,
}

impl BucketKey {
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.parse::<i64>().ok()?;
        Some(Self {
            raw: raw.to_string(),
            value,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl Ord for BucketKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for BucketKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.raw)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketStats {
    pub total: usize,
    pub wins: usize,
    /// Elapsed seconds of winning runs, in arrival order
    pub won_times: Vec<f64>,
    /// Move counts of winning runs, in arrival order
    pub won_moves: Vec<u64>,
}

impl BucketStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: &ResultRecord) {
        self.total += 1;

        // Lost runs only count towards the total
        if record.has_won {
            self.wins += 1;
            self.won_times.push(record.elapsed_seconds);
            self.won_moves.push(record.move_count);
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.wins as f64 / self.total as f64
        }
    }
}

/// Running statistics keyed by difficulty.
///
/// State only grows: records are folded one at a time and nothing is ever
/// evicted or recomputed.
#[derive(Debug, Default)]
pub struct BucketAggregator {
    buckets: BTreeMap<BucketKey, BucketStats>,
}

impl BucketAggregator {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }

    pub fn fold(&mut self, record: &ResultRecord) {
        self.buckets
            .entry(record.bucket_key.clone())
            .or_insert_with(BucketStats::new)
            .add_record(record);
    }

    /// Read-only view in ascending numeric key order
    pub fn snapshot(&self) -> &BTreeMap<BucketKey, BucketStats> {
        &self.buckets
    }

    pub fn get_stats(&self, key: &str) -> Option<&BucketStats> {
        self.buckets
            .iter()
            .find(|(bucket, _)| bucket.as_str() == key)
            .map(|(_, stats)| stats)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
