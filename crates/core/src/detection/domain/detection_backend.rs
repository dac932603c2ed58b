use std::path::PathBuf;

use thiserror::Error;

use super::backend_kind::BackendKind;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum BackendError {
    /// Model assets missing, unreadable or structurally invalid. Fatal to
    /// every job that uses this backend, and to nothing else.
    #[error("failed to load {kind} model from {path}: {reason}")]
    Load {
        kind: BackendKind,
        path: PathBuf,
        reason: String,
    },
    #[error("invalid backend '{0}' (expected one of: caffe, haar)")]
    InvalidBackend(String),
    #[error("{kind} inference failed: {reason}")]
    Inference { kind: BackendKind, reason: String },
}

impl BackendError {
    pub fn load(kind: BackendKind, path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        BackendError::Load {
            kind,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn inference(kind: BackendKind, reason: impl ToString) -> Self {
        BackendError::Inference {
            kind,
            reason: reason.to_string(),
        }
    }
}

/// Turns one frame into zero or more face detections.
///
/// The frame is only borrowed for reading. Implementations carry no state
/// between calls apart from the loaded model, so the same frame always
/// yields the same detections. `&mut self` is needed because the
/// underlying inference engines mutate their scratch buffers.
pub trait DetectionBackend: Send {
    fn kind(&self) -> BackendKind;

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, BackendError>;
}
