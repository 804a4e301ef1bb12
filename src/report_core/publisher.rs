//! Unified publisher interface for the report
//!
//! Routes to either the Discord or the file backend based on configuration.

use super::discord::DiscordSink;
use super::file_sink::FileSink;
use super::sink::{MessageHandle, ReportSink, SinkError};
use crate::config::{BackendType, ReporterConfig};
use async_trait::async_trait;

/// Unified sink that routes to either the Discord or the file backend
pub enum ReportPublisher {
    Discord(DiscordSink),
    File(FileSink),
}

impl ReportPublisher {
    /// Create a publisher for the configured backend
    pub fn new(config: &ReporterConfig) -> Result<Self, SinkError> {
        match config.backend {
            BackendType::Discord => {
                let sink = DiscordSink::new(config.discord_token.clone(), config.discord_channel_id.clone())?;
                Ok(ReportPublisher::Discord(sink))
            }
            BackendType::File => Ok(ReportPublisher::File(FileSink::new(config.output_path.clone()))),
        }
    }
}

#[async_trait]
impl ReportSink for ReportPublisher {
    async fn create(&mut self, initial_text: &str) -> Result<MessageHandle, SinkError> {
        match self {
            ReportPublisher::Discord(s) => s.create(initial_text).await,
            ReportPublisher::File(s) => s.create(initial_text).await,
        }
    }

    async fn edit(&mut self, handle: &MessageHandle, text: &str) -> Result<(), SinkError> {
        match self {
            ReportPublisher::Discord(s) => s.edit(handle, text).await,
            ReportPublisher::File(s) => s.edit(handle, text).await,
        }
    }

    fn backend_type(&self) -> &'static str {
        match self {
            ReportPublisher::Discord(_) => "Discord",
            ReportPublisher::File(_) => "File",
        }
    }
}
