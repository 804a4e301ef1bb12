//! Sink trait for the published report
//!
//! A sink holds exactly one mutable message: it is created once per session
//! and then edited in place with the full report text on every cycle.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Opaque reference to the published message (a Discord message id, a file path)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHandle(String);

impl MessageHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{backend} rejected request with status {status}: {body}")]
    Rejected {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

/// Backend trait for publishing the report
#[async_trait]
pub trait ReportSink: Send {
    /// Publish the initial message and return a handle to it
    async fn create(&mut self, initial_text: &str) -> Result<MessageHandle, SinkError>;

    /// Replace the content of a previously created message
    async fn edit(&mut self, handle: &MessageHandle, text: &str) -> Result<(), SinkError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
