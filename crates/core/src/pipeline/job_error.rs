use std::path::PathBuf;

use thiserror::Error;

use super::detection_log::LogError;
use crate::detection::domain::detection_backend::BackendError;
use crate::video::video_channel::ChannelError;

/// Why a job did not reach `DONE`.
#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("cannot open video source {path}: {reason}")]
    SourceOpen { path: PathBuf, reason: String },
    #[error("cannot create output video {path}: {reason}")]
    SinkOpen { path: PathBuf, reason: String },
    #[error("frame {frame}: {reason}")]
    Stream { frame: usize, reason: String },
    #[error(transparent)]
    Log(#[from] LogError),
    #[error("failed to release video channel: {0}")]
    Release(String),
}

impl JobError {
    /// Backend construction failed because its model assets are unusable.
    pub fn is_load_error(&self) -> bool {
        matches!(self, JobError::Backend(BackendError::Load { .. }))
    }

    /// Short tag used when tallying failures.
    pub fn category(&self) -> &'static str {
        match self {
            JobError::Backend(BackendError::Load { .. }) => "load",
            JobError::Backend(BackendError::InvalidBackend(_)) => "invalid-backend",
            JobError::Backend(BackendError::Inference { .. }) => "inference",
            JobError::SourceOpen { .. } => "source-open",
            JobError::SinkOpen { .. } => "sink-open",
            JobError::Stream { .. } => "stream",
            JobError::Log(_) => "log",
            JobError::Release(_) => "release",
        }
    }
}

impl From<ChannelError> for JobError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::SourceOpen { path, reason } => JobError::SourceOpen { path, reason },
            ChannelError::SinkOpen { path, reason } => JobError::SinkOpen { path, reason },
            ChannelError::Release(reason) => JobError::Release(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::backend_kind::BackendKind;
    use rstest::rstest;

    #[rstest]
    #[case(JobError::Backend(BackendError::load(BackendKind::Haar, "m/x.xml", "missing")), "load", true)]
    #[case(JobError::Backend(BackendError::InvalidBackend("yolo".into())), "invalid-backend", false)]
    #[case(JobError::SourceOpen { path: "v.mp4".into(), reason: "gone".into() }, "source-open", false)]
    #[case(JobError::Stream { frame: 3, reason: "encoder".into() }, "stream", false)]
    #[case(JobError::Release("trailer".into()), "release", false)]
    fn test_classification(
        #[case] err: JobError,
        #[case] category: &str,
        #[case] is_load: bool,
    ) {
        assert_eq!(err.category(), category);
        assert_eq!(err.is_load_error(), is_load);
    }

    #[test]
    fn test_channel_errors_keep_their_kind() {
        let err: JobError = ChannelError::SourceOpen {
            path: "clip.mp4".into(),
            reason: "no such file".into(),
        }
        .into();
        assert!(matches!(err, JobError::SourceOpen { .. }));
        assert!(err.to_string().contains("clip.mp4"));
    }
}
