use std::path::Path;

use image::GrayImage;
use opencv::core::{Rect, Size, Vector};
use opencv::objdetect;
use opencv::prelude::*;

use super::cascade_detector::{CascadeParams, Window, WindowClassifier};
use crate::detection::domain::backend_kind::BackendKind;
use crate::detection::domain::detection_backend::BackendError;
use crate::shared::opencv_image::packed_to_mat;

/// Haar cascade evaluated by OpenCV's `CascadeClassifier`.
pub struct OpenCvCascade {
    classifier: objdetect::CascadeClassifier,
}

impl OpenCvCascade {
    pub fn load(path: &Path) -> Result<Self, BackendError> {
        let file = path.to_str().ok_or_else(|| {
            BackendError::load(BackendKind::Haar, path, "path is not valid UTF-8")
        })?;
        let classifier = objdetect::CascadeClassifier::new(file)
            .map_err(|e| BackendError::load(BackendKind::Haar, path, e))?;
        // OpenCV reports an unparseable cascade as an empty classifier
        // rather than an error.
        let empty = classifier
            .empty()
            .map_err(|e| BackendError::load(BackendKind::Haar, path, e))?;
        if empty {
            return Err(BackendError::load(
                BackendKind::Haar,
                path,
                "cascade file could not be parsed",
            ));
        }
        Ok(Self { classifier })
    }
}

impl WindowClassifier for OpenCvCascade {
    fn detect_multi_scale(
        &mut self,
        gray: &GrayImage,
        params: &CascadeParams,
    ) -> Result<Vec<Window>, Box<dyn std::error::Error>> {
        let mat = packed_to_mat(gray.as_raw(), gray.width(), gray.height(), 1)?;

        let mut rects = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &mat,
            &mut rects,
            params.scale_factor,
            params.min_neighbors,
            0,
            Size::new(params.min_size, params.min_size),
            Size::default(),
        )?;

        Ok(rects
            .iter()
            .map(|r| Window {
                x: r.x,
                y: r.y,
                width: r.width,
                height: r.height,
            })
            .collect())
    }
}
