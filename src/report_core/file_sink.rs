//! File sink - keeps the latest report in a local file

use super::sink::{MessageHandle, ReportSink, SinkError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write through a sibling temp file so readers never see a partial report
    async fn replace(&self, text: &str) -> Result<(), SinkError> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ReportSink for FileSink {
    async fn create(&mut self, initial_text: &str) -> Result<MessageHandle, SinkError> {
        self.replace(initial_text).await?;
        log::info!("📝 Writing report to: {}", self.path.display());
        Ok(MessageHandle::new(self.path.display().to_string()))
    }

    async fn edit(&mut self, _handle: &MessageHandle, text: &str) -> Result<(), SinkError> {
        self.replace(text).await
    }

    fn backend_type(&self) -> &'static str {
        "File"
    }
}
