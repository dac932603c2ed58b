use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::DEFAULT_VIDEO_EXTENSIONS;
use crate::pipeline::job::{Job, JobPaths};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("cannot access {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a batch run needs to know about where things live.
///
/// Built once (defaults, then an optional JSON file, then CLI overrides)
/// and handed to the scheduler by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub video_dir: PathBuf,
    pub model_dir: PathBuf,
    pub video_output_dir: PathBuf,
    pub log_output_dir: PathBuf,
    pub frame_output_dir: PathBuf,
    /// Backend identifiers, kept as strings so that an unknown one fails
    /// only its own jobs.
    pub backends: Vec<String>,
    pub video_extensions: Vec<String>,
    /// Save every Nth annotated frame as an image; `None` disables sampling.
    pub sample_interval: Option<usize>,
    pub workers: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::from("videos"),
            model_dir: PathBuf::from("models"),
            video_output_dir: PathBuf::from("outputs/annotated_videos"),
            log_output_dir: PathBuf::from("outputs/logs"),
            frame_output_dir: PathBuf::from("outputs/annotated_frames"),
            backends: vec!["caffe".to_string(), "haar".to_string()],
            video_extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            sample_interval: None,
            workers: 1,
        }
    }
}

impl BenchConfig {
    /// Reads a JSON config; fields missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backends.is_empty() {
            return Err(ConfigError::Invalid("at least one backend is required".into()));
        }
        if self.video_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one video extension is required".into(),
            ));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.sample_interval == Some(0) {
            return Err(ConfigError::Invalid(
                "sample interval must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Creates the annotated-video and log directories.
    pub fn ensure_output_dirs(&self) -> Result<(), ConfigError> {
        for dir in [&self.video_output_dir, &self.log_output_dir] {
            fs::create_dir_all(dir).map_err(|source| ConfigError::Directory {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Video files directly inside `video_dir` whose extension matches
    /// (case-insensitively), sorted by path.
    pub fn discover_videos(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let entries = fs::read_dir(&self.video_dir).map_err(|source| ConfigError::Directory {
            path: self.video_dir.clone(),
            source,
        })?;

        let mut videos: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && self.is_video(path))
            .collect();
        videos.sort();
        Ok(videos)
    }

    /// Output video, log file and sample directory for one job.
    pub fn job_paths(&self, job: &Job) -> JobPaths {
        job.paths_in(
            &self.video_output_dir,
            &self.log_output_dir,
            &self.frame_output_dir,
        )
    }

    fn is_video(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.video_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
