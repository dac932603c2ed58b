use crate::detection::domain::backend_kind::BackendKind;
use crate::detection::domain::detection_backend::{BackendError, DetectionBackend};

use super::caffe_ssd_network::CaffeSsdNetwork;
use super::cascade_detector::CascadeDetector;
use super::deep_detector::DeepDetector;
use super::model_assets::ModelAssets;
use super::opencv_cascade::OpenCvCascade;

/// Loads the backend of the given kind from the model directory.
///
/// The files the backend needs are checked before anything is handed to
/// OpenCV, so a missing asset is reported with its path.
pub fn create_backend(
    kind: BackendKind,
    assets: &ModelAssets,
) -> Result<Box<dyn DetectionBackend>, BackendError> {
    assets.check(kind)?;
    match kind {
        BackendKind::Caffe => {
            log::info!(
                "Loading Caffe SSD model ({}, {})",
                assets.topology.display(),
                assets.weights.display()
            );
            let network = CaffeSsdNetwork::load(&assets.topology, &assets.weights)?;
            Ok(Box::new(DeepDetector::new(Box::new(network))))
        }
        BackendKind::Haar => {
            log::info!("Loading Haar cascade ({})", assets.cascade.display());
            let cascade = OpenCvCascade::load(&assets.cascade)?;
            Ok(Box::new(CascadeDetector::new(Box::new(cascade))))
        }
    }
}
