//! Reporter Binary - Live Test Result Summary
//!
//! Watches the CSV log written by the solver test harness and keeps a single
//! summary message up to date.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin reporter
//! cargo run --release --bin reporter -- --backend file
//! ```
//!
//! ## Environment Variables
//!
//! - RESULTS_PATH - CSV results log (default: result_tests.csv)
//! - REPORT_INTERVAL_MS - Publish interval (default: 7500)
//! - REPORT_BACKEND - discord or file (default: discord)
//! - DISCORD_TOKEN / DISCORD_CHANNEL_ID - Bot credentials and target channel
//! - REPORT_MESSAGE_ID - Edit this existing message instead of posting a new one
//! - REPORT_OUTPUT_PATH - Report file for the file backend (default: report.md)
//! - DEDUP_MODE - content or position (default: content)
//! - RUST_LOG - Logging level (optional, default: info)

use sokoreport::config::ReporterConfig;
use sokoreport::report_core::{
    MessageHandle, ReportPublisher, ReportScheduler, ReportSession, ReportSink,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = ReporterConfig::from_env()?;

    log::info!("🚀 Starting test result reporter");
    log::info!("   Results log: {}", config.results_path.display());
    log::info!("   Interval: {}ms", config.interval_ms);
    log::info!("   Dedup mode: {}", config.dedup_mode.as_str());

    let publisher = ReportPublisher::new(&config)?;
    log::info!("📊 Backend: {}", publisher.backend_type());
    match &publisher {
        ReportPublisher::Discord(sink) => log::info!("   Channel: {}", sink.channel_id()),
        ReportPublisher::File(sink) => log::info!("   Output: {}", sink.path().display()),
    }

    let session = ReportSession::new(config.results_path.clone(), config.dedup_mode);
    let scheduler = ReportScheduler::new(session, config.interval());
    let placeholder = config.message_id.clone().map(MessageHandle::new);

    let mut handle = scheduler.spawn(publisher, placeholder);

    let report = tokio::select! {
        report = handle.join() => report?,
        _ = tokio::signal::ctrl_c() => {
            log::info!("Received Ctrl-C, finishing current cycle...");
            handle.stop();
            handle.join().await?
        }
    };

    let session = report.scheduler.session();
    log::info!(
        "✅ Published {} reports covering {} tests in {} buckets",
        report.scheduler.cycles(),
        session.processed_count(),
        session.aggregator().bucket_count()
    );
    report.result?;
    Ok(())
}
