//! Integration tests for the live report cycle
//!
//! Tests drive a real results log on disk through a full session:
//! - Header handling and bucket statistics end to end
//! - Rows appended between cycles, including a row caught mid-write
//! - Placeholder creation and in-place edits against the sink
//! - File backend publishing

#[cfg(test)]
mod report_cycle_tests {
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use sokoreport::report_core::{
        DedupMode, FileSink, MessageHandle, ReportScheduler, ReportSession, ReportSink,
        SchedulerState, SinkError, PLACEHOLDER,
    };
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::sync::watch;

    const HEADER_LINE: &str = "test_name,test_file,time_taken,no_move,no_c,has_won,solution\n";

    /// Keeps every published text; `on_edit` runs after each edit with the edit count
    struct CaptureSink<F: FnMut(usize) + Send> {
        texts: Arc<Mutex<Vec<String>>>,
        on_edit: F,
    }

    #[async_trait]
    impl<F: FnMut(usize) + Send> ReportSink for CaptureSink<F> {
        async fn create(&mut self, initial_text: &str) -> Result<MessageHandle, SinkError> {
            self.texts.lock().unwrap().push(initial_text.to_string());
            Ok(MessageHandle::new("report"))
        }

        async fn edit(&mut self, _handle: &MessageHandle, text: &str) -> Result<(), SinkError> {
            let count = {
                let mut texts = self.texts.lock().unwrap();
                texts.push(text.to_string());
                texts.len() - 1
            };
            (self.on_edit)(count);
            Ok(())
        }

        fn backend_type(&self) -> &'static str {
            "Capture"
        }
    }

    async fn append(path: &Path, text: &str) {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .unwrap();
        file.write_all(text.as_bytes()).await.unwrap();
        file.flush().await.unwrap();
    }

    #[tokio::test]
    async fn test_end_to_end_bucket_report() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("result_tests.csv");
        append(
            &log_path,
            &format!(
                "{}A,maps/a.txt,2.00s,10,4,true,udlr\n\
                 B,maps/b.txt,7.50s,33,4,false,\n\
                 C,maps/c.txt,4.00s,20,5,true,rrll\n",
                HEADER_LINE
            ),
        )
        .await;

        let mut session = ReportSession::new(log_path, DedupMode::Content);
        let stats = session.refresh().await;
        assert_eq!(stats.folded, 3);

        let four = session.aggregator().get_stats("4").unwrap();
        assert_eq!((four.total, four.wins), (2, 1));
        assert_eq!(four.win_rate(), 0.5);
        let five = session.aggregator().get_stats("5").unwrap();
        assert_eq!((five.total, five.wins), (1, 1));
        assert_eq!(five.win_rate(), 1.0);

        let now = NaiveDate::from_ymd_opt(2024, 10, 9)
            .unwrap()
            .and_hms_opt(16, 30, 0)
            .unwrap();
        let report = session.render(now);

        let bucket_four = report.find("4  - 2\n+   [######------]  50.00%").unwrap();
        let bucket_five = report.find("5  - 1\n+   [############] 100.00%").unwrap();
        assert!(bucket_four < bucket_five);
        assert!(report.contains("--- times:  4.00 ( 4.00 -  4.00)"));
        assert!(report.contains("--- moves:  20.0 (   20 -    20)"));
        assert!(report.contains("***Tests ran:** 3*"));
        assert!(report.contains("***Last update:** 16:30:00 of 10/09/2024*"));

        // A second poll of the unchanged log folds nothing
        let stats = session.refresh().await;
        assert_eq!(stats.folded, 0);
        assert_eq!(session.render(now), report);
    }

    #[tokio::test]
    async fn test_numeric_bucket_order_in_report() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("result_tests.csv");
        append(
            &log_path,
            &format!(
                "{}x,f,1.00s,1,2,true,\ny,f,1.00s,1,10,true,\nz,f,1.00s,1,3,false,\n",
                HEADER_LINE
            ),
        )
        .await;

        let mut session = ReportSession::new(log_path, DedupMode::Content);
        session.refresh().await;
        let report = session.render(chrono::Local::now().naive_local());

        let two = report.find("2  - 1").unwrap();
        let three = report.find("3  - 1").unwrap();
        let ten = report.find("10 - 1").unwrap();
        assert!(two < three && three < ten);
        // Bucket 3 only has a loss
        assert!(report.contains("3  - 1\n-   [------------]   0.00%\n--- times:  0.00 ( 0.00 -  0.00)"));
    }

    #[tokio::test]
    async fn test_session_follows_appends_across_cycles() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("result_tests.csv");
        append(&log_path, HEADER_LINE).await;
        append(&log_path, "A,maps/a.txt,2.00s,10,4,true,udlr\n").await;
        // The producer is midway through writing this row
        append(&log_path, "B,maps/b.txt,3.00s,12,4,tr").await;

        let texts = Arc::new(Mutex::new(Vec::new()));
        let (stop_tx, stop_rx) = watch::channel(false);
        let path_for_sink = log_path.clone();
        let sink = CaptureSink {
            texts: texts.clone(),
            on_edit: move |count| {
                if count == 1 {
                    // Finish the pending row before the next tick
                    let mut file = std::fs::OpenOptions::new()
                        .append(true)
                        .open(&path_for_sink)
                        .unwrap();
                    std::io::Write::write_all(&mut file, b"ue,\nC,maps/c.txt,9.00s,0,6,false,\n")
                        .unwrap();
                }
                if count == 2 {
                    stop_tx.send_replace(true);
                }
            },
        };

        let session = ReportSession::new(log_path, DedupMode::Content);
        let mut scheduler = ReportScheduler::new(session, Duration::from_millis(10));
        scheduler.run(sink, None, stop_rx).await.unwrap();

        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(scheduler.cycles(), 2);

        let texts = texts.lock().unwrap();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[0], PLACEHOLDER);

        // First cycle only sees the completed row
        assert!(texts[1].contains("4  - 1\n+   [############] 100.00%"));
        assert!(texts[1].contains("***Tests ran:** 1*"));

        // Second cycle picks up the finished row and the new bucket
        assert!(texts[2].contains("4  - 2\n+   [############] 100.00%"));
        assert!(texts[2].contains("--- times:  2.50 ( 2.00 -  3.00)"));
        assert!(texts[2].contains("6  - 1\n-   [------------]   0.00%"));
        assert!(texts[2].contains("***Tests ran:** 3*"));

        let agg = scheduler.session().aggregator();
        for stats in agg.snapshot().values() {
            assert_eq!(stats.won_times.len(), stats.wins);
            assert_eq!(stats.won_moves.len(), stats.wins);
            assert!(stats.wins <= stats.total);
        }
    }

    #[tokio::test]
    async fn test_unterminated_final_row_is_counted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("result_tests.csv");
        // The producer exits without terminating its last row
        append(
            &log_path,
            &format!(
                "{}A,maps/a.txt,2.00s,10,4,true,udlr\nB,maps/b.txt,3.00s,12,4,true,udlr",
                HEADER_LINE
            ),
        )
        .await;

        let mut session = ReportSession::new(log_path, DedupMode::Content);
        assert_eq!(session.refresh().await.folded, 1);
        assert_eq!(session.refresh().await.folded, 1);
        assert_eq!(session.refresh().await.folded, 0);

        assert_eq!(session.processed_count(), 2);
        let four = session.aggregator().get_stats("4").unwrap();
        assert_eq!((four.total, four.wins), (2, 2));
        assert_eq!(four.won_times, vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_missing_log_still_publishes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let texts = Arc::new(Mutex::new(Vec::new()));
        let (stop_tx, stop_rx) = watch::channel(false);
        let sink = CaptureSink {
            texts: texts.clone(),
            on_edit: move |_| {
                stop_tx.send_replace(true);
            },
        };

        let session = ReportSession::new(temp_dir.path().join("not_yet.csv"), DedupMode::Content);
        let mut scheduler = ReportScheduler::new(session, Duration::from_millis(10));
        scheduler.run(sink, None, stop_rx).await.unwrap();

        let texts = texts.lock().unwrap();
        assert_eq!(texts.len(), 2);
        assert!(texts[1].contains("***Tests ran:** 0*"));
    }

    #[tokio::test]
    async fn test_file_backend_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("result_tests.csv");
        let report_path = temp_dir.path().join("report.md");
        append(
            &log_path,
            &format!("{}A,maps/a.txt,1.25s,8,3,true,ud\n", HEADER_LINE),
        )
        .await;

        let session = ReportSession::new(log_path, DedupMode::Position);
        let scheduler = ReportScheduler::new(session, Duration::from_millis(10));
        let mut handle = scheduler.spawn(FileSink::new(report_path.clone()), None);

        let mut published = String::new();
        for _ in 0..200 {
            published = tokio::fs::read_to_string(&report_path).await.unwrap_or_default();
            if published.contains("***Tests ran:** 1*") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.stop();
        let report = handle.join().await.unwrap();

        assert!(report.result.is_ok());
        assert_eq!(report.scheduler.state(), SchedulerState::Stopped);
        assert_eq!(
            report.scheduler.message_handle(),
            Some(&MessageHandle::new(report_path.display().to_string()))
        );
        assert!(published.contains("3  - 1\n+   [############] 100.00%"));
        assert!(published.contains("--- times:  1.25 ( 1.25 -  1.25)"));
    }
}
