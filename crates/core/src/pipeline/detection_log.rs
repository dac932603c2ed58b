use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::LOG_COLUMNS;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("cannot create detection log {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write detection log: {0}")]
    Write(#[from] csv::Error),
    #[error("failed to write detection log: {0}")]
    Io(#[from] std::io::Error),
}

/// One detection: the 1-based frame it was found in and its score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionLogRow {
    pub frame: usize,
    pub confidence: f32,
}

/// Per-job, append-only detection table.
///
/// Rows are kept in emission order. The log is consumed by
/// [`DetectionLog::flush`], so nothing can be recorded after it has been
/// persisted.
#[derive(Debug, Default)]
pub struct DetectionLog {
    rows: Vec<DetectionLogRow>,
}

impl DetectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame: usize, confidence: f32) {
        self.rows.push(DetectionLogRow { frame, confidence });
    }

    pub fn rows(&self) -> &[DetectionLogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the `frame,confidence` header and every row to `out`.
    /// The header is written even when there are no rows.
    pub fn write_to<W: Write>(&self, out: W) -> Result<(), LogError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);
        writer.write_record(LOG_COLUMNS)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Persists the log to `path`, replacing any previous file.
    pub fn flush(self, path: &Path) -> Result<usize, LogError> {
        let file = File::create(path).map_err(|source| LogError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_to(file)?;
        Ok(self.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_rows_keep_emission_order_without_dedup() {
        let mut log = DetectionLog::new();
        log.record(1, 0.9);
        log.record(1, 0.9);
        log.record(3, 0.7);
        assert_eq!(log.len(), 3);
        assert_eq!(
            log.rows(),
            &[
                DetectionLogRow { frame: 1, confidence: 0.9 },
                DetectionLogRow { frame: 1, confidence: 0.9 },
                DetectionLogRow { frame: 3, confidence: 0.7 },
            ]
        );
    }

    #[test]
    fn test_empty_log_writes_header_only() {
        let mut out = Vec::new();
        DetectionLog::new().write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "frame,confidence\n");
    }

    #[test]
    fn test_write_to_formats_rows() {
        let mut log = DetectionLog::new();
        log.record(1, 0.92);
        log.record(2, 1.0);
        let mut out = Vec::new();
        log.write_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "frame,confidence\n1,0.92\n2,1.0\n"
        );
    }

    #[test]
    fn test_flush_persists_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caffe_clip.mp4.csv");
        let mut log = DetectionLog::new();
        for frame in 1..=4 {
            log.record(frame, 0.75);
        }
        assert_eq!(log.flush(&path).unwrap(), 4);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["frame", "confidence"]);
        let rows: Vec<DetectionLogRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3], DetectionLogRow { frame: 4, confidence: 0.75 });
    }

    #[test]
    fn test_flush_into_missing_directory_fails() {
        let err = DetectionLog::new()
            .flush(Path::new("/nonexistent/logs/out.csv"))
            .unwrap_err();
        assert!(matches!(err, LogError::Create { .. }));
    }

    #[test]
    fn test_flush_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, "stale contents\nmore\n").unwrap();
        DetectionLog::new().flush(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "frame,confidence\n");
    }
}
