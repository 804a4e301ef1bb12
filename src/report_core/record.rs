//! Result row normalization from raw CSV fields to a typed ResultRecord

use super::bucket::BucketKey;
use thiserror::Error;

/// Columns every valid row must carry (the trailing `solution` is optional)
pub const REQUIRED_FIELDS: usize = 6;

/// Header as written by the test harness
pub const HEADER: [&str; 7] = [
    "test_name",
    "test_file",
    "time_taken",
    "no_move",
    "no_c",
    "has_won",
    "solution",
];

/// One line of the results log, split into fields but not yet interpreted.
///
/// `position` is the 0-based index among data rows (header excluded) and is
/// only used for position-based dedup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawRow {
    pub position: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new(position: usize, fields: Vec<String>) -> Self {
        Self { position, fields }
    }

    pub fn is_header(&self) -> bool {
        self.fields.len() >= 2 && self.fields[0] == HEADER[0] && self.fields[1] == HEADER[1]
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("row has {found} fields, expected at least 6")]
    TooFewFields { found: usize },

    #[error("invalid time_taken '{0}' (expected seconds with an 's' suffix)")]
    InvalidElapsed(String),

    #[error("invalid no_move '{0}'")]
    InvalidMoveCount(String),

    #[error("invalid no_c '{0}'")]
    InvalidBucketKey(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub test_name: String,
    pub test_file: String,
    pub elapsed_seconds: f64,
    pub move_count: u64,
    pub bucket_key: BucketKey,
    pub has_won: bool,
    pub solution: String,
}

impl ResultRecord {
    /// Parse a record from the fields of a single log row
    pub fn from_fields(fields: &[String]) -> Result<Self, RecordError> {
        if fields.len() < REQUIRED_FIELDS {
            return Err(RecordError::TooFewFields {
                found: fields.len(),
            });
        }

        let elapsed_seconds = parse_elapsed(&fields[2])?;
        let move_count = fields[3]
            .parse::<u64>()
            .map_err(|_| RecordError::InvalidMoveCount(fields[3].clone()))?;
        let bucket_key = BucketKey::parse(&fields[4])
            .ok_or_else(|| RecordError::InvalidBucketKey(fields[4].clone()))?;

        Ok(Self {
            test_name: fields[0].clone(),
            test_file: fields[1].clone(),
            elapsed_seconds,
            move_count,
            bucket_key,
            has_won: fields[5] == "true",
            solution: fields.get(6).cloned().unwrap_or_default(),
        })
    }
}

/// Parse a `time_taken` value such as `"3.21s"`.
pub fn parse_elapsed(raw: &str) -> Result<f64, RecordError> {
    raw.strip_suffix('s')
        .and_then(|number| number.parse::<f64>().ok())
        .filter(|secs| secs.is_finite())
        .ok_or_else(|| RecordError::InvalidElapsed(raw.to_string()))
}
