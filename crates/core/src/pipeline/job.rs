use std::fmt;
use std::path::{Path, PathBuf};

use crate::shared::constants::LOG_EXTENSION;

/// One (video, backend) unit of work. The backend is kept as the raw
/// identifier so an unknown one is reported by the job itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub video: PathBuf,
    pub backend: String,
}

/// Where a job's artifacts land.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobPaths {
    pub video: PathBuf,
    pub log: PathBuf,
    pub samples: PathBuf,
}

impl Job {
    pub fn new(video: impl Into<PathBuf>, backend: impl Into<String>) -> Self {
        Self {
            video: video.into(),
            backend: backend.into(),
        }
    }

    /// File name of the source video, extension included.
    pub fn video_name(&self) -> String {
        file_name(&self.video)
    }

    /// `<backend>_<video file name>`, the prefix shared by the job's outputs.
    pub fn output_name(&self) -> String {
        format!("{}_{}", self.backend, self.video_name())
    }

    pub(crate) fn paths_in(
        &self,
        video_dir: &Path,
        log_dir: &Path,
        frame_dir: &Path,
    ) -> JobPaths {
        let output_name = self.output_name();
        let stem = self
            .video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        JobPaths {
            video: video_dir.join(&output_name),
            log: log_dir.join(format!("{output_name}.{LOG_EXTENSION}")),
            samples: frame_dir.join(format!("{}_{stem}", self.backend)),
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.backend, self.video_name())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names_follow_backend_prefix() {
        let job = Job::new("videos/benchmark_1.mp4", "caffe");
        let paths = job.paths_in(
            Path::new("out/videos"),
            Path::new("out/logs"),
            Path::new("out/frames"),
        );
        assert_eq!(paths.video, Path::new("out/videos/caffe_benchmark_1.mp4"));
        assert_eq!(paths.log, Path::new("out/logs/caffe_benchmark_1.mp4.csv"));
        assert_eq!(paths.samples, Path::new("out/frames/caffe_benchmark_1"));
    }

    #[test]
    fn test_display_names_backend_and_video() {
        let job = Job::new("/data/videos/crowd.mp4", "haar");
        assert_eq!(job.to_string(), "haar × crowd.mp4");
        assert_eq!(job.output_name(), "haar_crowd.mp4");
    }
}
