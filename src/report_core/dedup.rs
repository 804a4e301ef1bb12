//! Tracks which log rows have already been folded into the aggregates

use super::record::RawRow;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupMode {
    /// Rows are identified by their full content. Two identical rows count once.
    #[default]
    Content,
    /// Rows are identified by their position in the log.
    Position,
}

impl DedupMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DedupMode::Content => "content",
            DedupMode::Position => "position",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "content" => Some(DedupMode::Content),
            "position" => Some(DedupMode::Position),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct DedupTracker {
    mode: DedupMode,
    by_content: HashSet<Vec<String>>,
    by_position: HashSet<usize>,
}

impl DedupTracker {
    pub fn new(mode: DedupMode) -> Self {
        Self {
            mode,
            by_content: HashSet::new(),
            by_position: HashSet::new(),
        }
    }

    pub fn mode(&self) -> DedupMode {
        self.mode
    }

    pub fn seen(&self, row: &RawRow) -> bool {
        match self.mode {
            DedupMode::Content => self.by_content.contains(&row.fields),
            DedupMode::Position => self.by_position.contains(&row.position),
        }
    }

    /// Record a row as folded. Only call after a successful fold.
    pub fn mark(&mut self, row: &RawRow) {
        match self.mode {
            DedupMode::Content => {
                self.by_content.insert(row.fields.clone());
            }
            DedupMode::Position => {
                self.by_position.insert(row.position);
            }
        }
    }

    /// Number of rows processed so far
    pub fn len(&self) -> usize {
        match self.mode {
            DedupMode::Content => self.by_content.len(),
            DedupMode::Position => self.by_position.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
