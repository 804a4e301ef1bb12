//! Median / min / max summaries over winning runs

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSummary {
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveSummary {
    /// Fractional when the two middle counts differ
    pub median: f64,
    pub min: u64,
    pub max: u64,
}

/// Summarize elapsed times. An empty slice summarizes as all zeros.
pub fn summarize_times(values: &[f64]) -> TimeSummary {
    if values.is_empty() {
        return TimeSummary {
            median: 0.0,
            min: 0.0,
            max: 0.0,
        };
    }

    let mut v = values.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    TimeSummary {
        median: median_f64_sorted(&v),
        min: v[0],
        max: v[v.len() - 1],
    }
}

/// Summarize move counts. An empty slice summarizes as all zeros.
pub fn summarize_moves(values: &[u64]) -> MoveSummary {
    if values.is_empty() {
        return MoveSummary {
            median: 0.0,
            min: 0,
            max: 0,
        };
    }

    let mut v = values.to_vec();
    v.sort_unstable();
    let as_f64: Vec<f64> = v.iter().map(|&m| m as f64).collect();
    MoveSummary {
        median: median_f64_sorted(&as_f64),
        min: v[0],
        max: v[v.len() - 1],
    }
}

fn median_f64_sorted(sorted: &[f64]) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    let mid = n / 2;
    if n % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}
