use std::fs;
use std::path::{Path, PathBuf};

use crate::detection::domain::backend_kind::BackendKind;
use crate::detection::domain::detection_backend::BackendError;
use crate::shared::constants::{CAFFE_TOPOLOGY_NAME, CAFFE_WEIGHTS_NAME, HAAR_CASCADE_NAME};

/// Locations of the three model files inside a model directory.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelAssets {
    pub topology: PathBuf,
    pub weights: PathBuf,
    pub cascade: PathBuf,
}

impl ModelAssets {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            topology: dir.join(CAFFE_TOPOLOGY_NAME),
            weights: dir.join(CAFFE_WEIGHTS_NAME),
            cascade: dir.join(HAAR_CASCADE_NAME),
        }
    }

    /// Files the given backend needs, in load order.
    pub fn required_by(&self, kind: BackendKind) -> Vec<&Path> {
        match kind {
            BackendKind::Caffe => vec![&self.topology, &self.weights],
            BackendKind::Haar => vec![&self.cascade],
        }
    }

    /// Fails with [`BackendError::Load`] on the first required file that is
    /// missing, unreadable or empty.
    pub fn check(&self, kind: BackendKind) -> Result<(), BackendError> {
        self.required_by(kind)
            .into_iter()
            .try_for_each(|path| require_file(kind, path))
    }
}

fn require_file(kind: BackendKind, path: &Path) -> Result<(), BackendError> {
    let meta = fs::metadata(path).map_err(|e| BackendError::load(kind, path, e))?;
    if !meta.is_file() {
        return Err(BackendError::load(kind, path, "not a regular file"));
    }
    if meta.len() == 0 {
        return Err(BackendError::load(kind, path, "file is empty"));
    }
    fs::File::open(path).map_err(|e| BackendError::load(kind, path, e))?;
    Ok(())
}
