//! Report Core - Incremental Test Result Aggregation
//!
//! This module turns the append-only CSV log written by the solver test
//! harness into a single live report that is republished on a fixed
//! interval.
//!
//! # Architecture
//!
//! ```text
//! result_tests.csv → LogReader (full re-read every tick)
//!     ↓
//! DedupTracker (full-row or row-position identity)
//!     ↓
//! BucketAggregator (per crate count: total, wins, winning times/moves)
//!     ↓
//! ReportFormatter (snapshot + timestamp → report text)
//!     ↓
//! ReportSink → Discord message or local file (create once, edit each tick)
//! ```
//!
//! `ReportScheduler` owns the session state and drives the cycle.

pub mod bucket;
pub mod dedup;
pub mod discord;
pub mod file_sink;
pub mod formatter;
pub mod publisher;
pub mod reader;
pub mod record;
pub mod retry;
pub mod scheduler;
pub mod session;
pub mod sink;
pub mod summary;

pub use bucket::{BucketAggregator, BucketKey, BucketStats};
pub use dedup::{DedupMode, DedupTracker};
pub use discord::DiscordSink;
pub use file_sink::FileSink;
pub use formatter::{ReportFormatter, PLACEHOLDER};
pub use publisher::ReportPublisher;
pub use reader::LogReader;
pub use record::{RawRow, RecordError, ResultRecord};
pub use scheduler::{ReportScheduler, SchedulerError, SchedulerState, SessionHandle, SessionReport};
pub use session::{CycleStats, ReportSession};
pub use sink::{MessageHandle, ReportSink, SinkError};
