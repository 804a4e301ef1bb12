//! Report scheduler - one serialized read → fold → render → publish loop
//!
//! ```text
//! Idle ──start──▶ Running ──stop / sink error──▶ Stopped
//!                  │   ▲
//!                  └───┘ tick: one full cycle
//! ```
//!
//! A cycle always runs to completion; stopping only prevents the next tick.

use super::formatter::PLACEHOLDER;
use super::session::{CycleStats, ReportSession};
use super::sink::{MessageHandle, ReportSink, SinkError};
use chrono::Local;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};

/// Shortest tick period; `tokio::time::interval` rejects a zero period
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler is {0:?}, only an idle scheduler can be started")]
    NotIdle(SchedulerState),

    #[error("report sink failed: {0}")]
    Sink(#[from] SinkError),
}

pub struct ReportScheduler {
    state: SchedulerState,
    interval: Duration,
    session: ReportSession,
    handle: Option<MessageHandle>,
    cycles: u64,
}

impl ReportScheduler {
    /// `interval` is clamped to at least 1ms
    pub fn new(session: ReportSession, interval: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            interval: interval.max(MIN_INTERVAL),
            session,
            handle: None,
            cycles: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn session(&self) -> &ReportSession {
        &self.session
    }

    /// Handle of the published report, once created or supplied
    pub fn message_handle(&self) -> Option<&MessageHandle> {
        self.handle.as_ref()
    }

    /// Number of completed publish cycles
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run the session until `stop` is raised (or its sender dropped) or the
    /// sink fails. `placeholder` skips creating a new report message.
    pub async fn run<S: ReportSink>(
        &mut self,
        mut sink: S,
        placeholder: Option<MessageHandle>,
        mut stop: watch::Receiver<bool>,
    ) -> Result<(), SchedulerError> {
        if self.state != SchedulerState::Idle {
            return Err(SchedulerError::NotIdle(self.state));
        }

        self.state = SchedulerState::Running;
        self.handle = placeholder;

        log::info!(
            "⏰ Starting report session (interval: {}ms, backend: {}, log: {})",
            self.interval.as_millis(),
            sink.backend_type(),
            self.session.log_path().display()
        );

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let outcome = loop {
            if *stop.borrow_and_update() {
                break Ok(());
            }

            tokio::select! {
                biased;

                changed = stop.changed() => {
                    if changed.is_err() {
                        break Ok(());
                    }
                    continue;
                }
                _ = timer.tick() => {}
            }

            if let Err(e) = self.run_cycle(&mut sink).await {
                log::error!("❌ Report publish failed, stopping session: {}", e);
                break Err(SchedulerError::Sink(e));
            }
        };

        self.state = SchedulerState::Stopped;
        log::info!(
            "🛑 Report session stopped after {} cycles ({} tests processed)",
            self.cycles,
            self.session.processed_count()
        );
        outcome
    }

    /// Move the scheduler onto its own task
    pub fn spawn<S: ReportSink + 'static>(
        mut self,
        sink: S,
        placeholder: Option<MessageHandle>,
    ) -> SessionHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let result = self.run(sink, placeholder, stop_rx).await;
            SessionReport {
                scheduler: self,
                result,
            }
        });

        SessionHandle { stop_tx, task }
    }

    async fn run_cycle<S: ReportSink>(&mut self, sink: &mut S) -> Result<CycleStats, SinkError> {
        let handle = match self.handle.clone() {
            Some(handle) => handle,
            None => {
                let handle = sink.create(PLACEHOLDER).await?;
                log::info!("📌 Created report message {}", handle);
                self.handle = Some(handle.clone());
                handle
            }
        };

        let stats = self.session.refresh().await;
        let report = self.session.render(Local::now().naive_local());
        sink.edit(&handle, &report).await?;
        self.cycles += 1;

        log::debug!(
            "✅ Cycle {}: {} rows, {} folded, {} already seen, {} malformed",
            self.cycles,
            stats.rows_seen,
            stats.folded,
            stats.already_seen,
            stats.malformed
        );
        Ok(stats)
    }
}

/// Final state of a spawned session
pub struct SessionReport {
    pub scheduler: ReportScheduler,
    pub result: Result<(), SchedulerError>,
}

pub struct SessionHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<SessionReport>,
}

impl SessionHandle {
    /// Prevent any further cycle from starting. A cycle in flight completes.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Wait for the session to end. Must not be called again once it has
    /// returned.
    pub async fn join(&mut self) -> Result<SessionReport, JoinError> {
        (&mut self.task).await
    }
}
