//! Full re-read of the CSV results log on every poll

use super::record::RawRow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct LogReader {
    path: PathBuf,
    /// Unterminated trailing line seen on the previous poll
    pending_tail: Option<Vec<u8>>,
}

impl LogReader {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            pending_tail: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every data row currently in the log, in file order.
    ///
    /// A missing or unreadable log yields no rows; the producer may not have
    /// started yet. Header rows are dropped wherever they appear. A trailing
    /// line without a newline is only returned once it is unchanged since the
    /// previous poll.
    pub async fn poll(&mut self) -> Vec<RawRow> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Results log not found yet: {}", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                log::warn!("⚠️  Cannot read results log {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        let readable = self.settled_prefix(&contents);
        parse_rows(readable)
    }

    /// The part of `contents` safe to parse this poll. An unterminated tail
    /// becomes pending and is included once a later poll sees the same bytes.
    fn settled_prefix<'a>(&mut self, contents: &'a [u8]) -> &'a [u8] {
        let (complete, tail) = split_tail(contents);
        if tail.is_empty() {
            self.pending_tail = None;
            return complete;
        }

        if self.pending_tail.as_deref() == Some(tail) {
            self.pending_tail = None;
            return contents;
        }

        log::debug!("Holding back {} bytes of unterminated trailing row", tail.len());
        self.pending_tail = Some(tail.to_vec());
        complete
    }
}

/// Split `contents` after its last newline into (complete lines, unterminated tail)
fn split_tail(contents: &[u8]) -> (&[u8], &[u8]) {
    match contents.iter().rposition(|&b| b == b'\n') {
        Some(last) => contents.split_at(last + 1),
        None => (&contents[..0], contents),
    }
}

pub fn parse_rows(contents: &[u8]) -> Vec<RawRow> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::debug!("Skipping unreadable row: {}", e);
                continue;
            }
        };

        let row = RawRow::new(rows.len(), record.iter().map(str::to_string).collect());
        if row.is_header() {
            continue;
        }
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    const HEADER_LINE: &str = "test_name,test_file,time_taken,no_move,no_c,has_won,solution\n";

    #[tokio::test]
    async fn test_missing_log_yields_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut reader = LogReader::new(temp_dir.path().join("result_tests.csv"));

        assert!(reader.poll().await.is_empty());
    }

    #[tokio::test]
    async fn test_directory_yields_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut reader = LogReader::new(temp_dir.path().to_path_buf());

        assert!(reader.poll().await.is_empty());
    }

    #[tokio::test]
    async fn test_poll_rereads_whole_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("result_tests.csv");

        let mut file = tokio::fs::File::create(&file_path).await.unwrap();
        file.write_all(HEADER_LINE.as_bytes()).await.unwrap();
        file.write_all(b"a,maps/a.txt,1.00s,10,4,true,udlr\n").await.unwrap();
        file.flush().await.unwrap();
        drop(file);

        let mut reader = LogReader::new(file_path.clone());
        let rows = reader.poll().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields[0], "a");
        assert_eq!(rows[0].position, 0);

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&file_path)
            .await
            .unwrap();
        file.write_all(b"b,maps/b.txt,2.00s,20,5,false,\n").await.unwrap();
        file.flush().await.unwrap();
        drop(file);

        let rows = reader.poll().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].fields[0], "b");
        assert_eq!(rows[1].position, 1);
    }

    #[test]
    fn test_header_dropped_by_value() {
        let contents = format!("{}a,f,1.00s,1,2,true,\n{}", HEADER_LINE, HEADER_LINE);
        let rows = parse_rows(contents.as_bytes());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields[0], "a");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let rows = parse_rows(b"a, maps/a.txt , 1.00s, 3, 4, true, ud\n");
        assert_eq!(
            rows[0].fields,
            vec!["a", "maps/a.txt", "1.00s", "3", "4", "true", "ud"]
        );
    }

    #[test]
    fn test_ragged_and_blank_rows() {
        let rows = parse_rows(b"a,f,1.00s\n\nb,f,1.00s,3,4,true,\r\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields.len(), 3);
        assert_eq!(rows[1].fields.len(), 7);
    }

    #[test]
    fn test_split_tail() {
        let contents = b"a,f,1.00s,3,4,true,\nb,f,2.00s,5,4,tr";
        let (complete, tail) = split_tail(contents);
        assert_eq!(complete, b"a,f,1.00s,3,4,true,\n");
        assert_eq!(tail, b"b,f,2.00s,5,4,tr");

        assert_eq!(split_tail(b"b,f,2.00s"), (&b""[..], &b"b,f,2.00s"[..]));
        assert_eq!(split_tail(b"a\n"), (&b"a\n"[..], &b""[..]));
    }

    #[tokio::test]
    async fn test_trailing_row_held_until_unchanged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("result_tests.csv");
        let contents = format!(
            "{}A,a,2.00s,10,4,true,udlr\nB,b,3.00s,12,4,true,udlr",
            HEADER_LINE
        );
        tokio::fs::write(&file_path, &contents).await.unwrap();

        let mut reader = LogReader::new(file_path);

        // First sighting of the tail: held back
        let rows = reader.poll().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields[0], "A");

        // Unchanged since the last poll: the final row is counted
        let rows = reader.poll().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].fields[0], "B");
        assert_eq!(rows[1].fields[6], "udlr");

        // And keeps being returned afterwards
        let rows = reader.poll().await;
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_growing_trailing_row_stays_pending() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("result_tests.csv");
        tokio::fs::write(&file_path, "A,a,2.00s,10,4,true,\nB,b,3.00s,12,4,tr")
            .await
            .unwrap();

        let mut reader = LogReader::new(file_path.clone());
        assert_eq!(reader.poll().await.len(), 1);

        // The producer wrote more of the row between polls
        tokio::fs::write(&file_path, "A,a,2.00s,10,4,true,\nB,b,3.00s,12,4,true,u")
            .await
            .unwrap();
        assert_eq!(reader.poll().await.len(), 1);

        tokio::fs::write(&file_path, "A,a,2.00s,10,4,true,\nB,b,3.00s,12,4,true,udlr\n")
            .await
            .unwrap();
        let rows = reader.poll().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].fields[5], "true");
        assert_eq!(rows[1].fields[6], "udlr");
    }
}
