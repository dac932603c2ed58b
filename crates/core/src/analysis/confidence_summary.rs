//! Per-(backend, video) statistics over persisted detection logs.
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::pipeline::detection_log::DetectionLogRow;
use crate::shared::constants::LOG_EXTENSION;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("cannot read log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed detection log {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogSummary {
    pub backend: String,
    pub video: String,
    /// Detection rows in the log.
    pub detections: usize,
    /// Distinct frames with at least one detection.
    pub frames: usize,
    /// 0 when the log has no rows.
    pub mean_confidence: f64,
}

/// `caffe_clip_01.mp4.csv` → (`caffe`, `clip_01.mp4`). The backend is
/// everything before the first underscore.
pub fn split_log_name(file_name: &str) -> (String, String) {
    let suffix = format!(".{LOG_EXTENSION}");
    let stem = file_name.strip_suffix(&suffix).unwrap_or(file_name);
    match stem.split_once('_') {
        Some((backend, video)) => (backend.to_string(), video.to_string()),
        None => (stem.to_string(), String::new()),
    }
}

pub fn summarize_log(path: &Path) -> Result<LogSummary, SummaryError> {
    let parse_err = |source| SummaryError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(parse_err)?;

    let mut detections = 0;
    let mut frames = HashSet::new();
    let mut total = 0.0_f64;
    for row in reader.deserialize::<DetectionLogRow>() {
        let row = row.map_err(parse_err)?;
        detections += 1;
        frames.insert(row.frame);
        total += row.confidence as f64;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (backend, video) = split_log_name(&file_name);
    Ok(LogSummary {
        backend,
        video,
        detections,
        frames: frames.len(),
        mean_confidence: if detections == 0 {
            0.0
        } else {
            total / detections as f64
        },
    })
}

/// Summarizes every log in `dir`, ordered by file name.
pub fn summarize_logs(dir: &Path) -> Result<Vec<LogSummary>, SummaryError> {
    let entries = fs::read_dir(dir).map_err(|source| SummaryError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut logs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(LOG_EXTENSION)
        })
        .collect();
    logs.sort();

    logs.iter().map(|path| summarize_log(path)).collect()
}

pub fn render_table(summaries: &[LogSummary]) -> String {
    let backend_w = column_width("Backend", summaries.iter().map(|s| s.backend.as_str()));
    let video_w = column_width("Video", summaries.iter().map(|s| s.video.as_str()));

    let mut out = format!(
        "{:<backend_w$}  {:<video_w$}  {:>14}  {:>6}  {:>10}\n",
        "Backend", "Video", "Avg Confidence", "Frames", "Detections"
    );
    for s in summaries {
        out.push_str(&format!(
            "{:<backend_w$}  {:<video_w$}  {:>14.3}  {:>6}  {:>10}\n",
            s.backend, s.video, s.mean_confidence, s.frames, s.detections
        ));
    }
    out
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
}
