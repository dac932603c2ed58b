use image::GrayImage;

use crate::detection::domain::backend_kind::BackendKind;
use crate::detection::domain::detection_backend::{BackendError, DetectionBackend};
use crate::shared::constants::{
    CASCADE_CONFIDENCE, CASCADE_MIN_NEIGHBORS, CASCADE_MIN_SIZE, CASCADE_SCALE_FACTOR,
};
use crate::shared::detection::{BoundingBox, Detection};
use crate::shared::frame::Frame;
use crate::shared::opencv_image::{packed_to_mat, rgb_to_gray};

/// Multi-scale sliding-window parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CascadeParams {
    pub scale_factor: f64,
    pub min_neighbors: i32,
    /// Smallest window side, in pixels.
    pub min_size: i32,
}

impl Default for CascadeParams {
    fn default() -> Self {
        Self {
            scale_factor: CASCADE_SCALE_FACTOR,
            min_neighbors: CASCADE_MIN_NEIGHBORS,
            min_size: CASCADE_MIN_SIZE,
        }
    }
}

/// A window accepted by the classifier, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Scans a grayscale image at multiple scales and returns accepted windows.
pub trait WindowClassifier: Send {
    fn detect_multi_scale(
        &mut self,
        gray: &GrayImage,
        params: &CascadeParams,
    ) -> Result<Vec<Window>, Box<dyn std::error::Error>>;
}

/// Classical cascade backend. The method produces no score, so every
/// accepted window is reported with confidence exactly 1.0.
pub struct CascadeDetector {
    classifier: Box<dyn WindowClassifier>,
    params: CascadeParams,
}

impl CascadeDetector {
    pub fn new(classifier: Box<dyn WindowClassifier>) -> Self {
        Self {
            classifier,
            params: CascadeParams::default(),
        }
    }
}

impl DetectionBackend for CascadeDetector {
    fn kind(&self) -> BackendKind {
        BackendKind::Haar
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, BackendError> {
        let gray = to_grayscale(frame)?;
        let windows = self
            .classifier
            .detect_multi_scale(&gray, &self.params)
            .map_err(|e| BackendError::inference(BackendKind::Haar, e))?;

        Ok(windows
            .iter()
            .filter_map(|w| {
                BoundingBox::clamped(
                    w.x as f32,
                    w.y as f32,
                    (w.x + w.width) as f32,
                    (w.y + w.height) as f32,
                    frame.width(),
                    frame.height(),
                )
            })
            .map(|bbox| Detection::new(bbox, CASCADE_CONFIDENCE))
            .collect())
    }
}

/// Single-channel frames pass through; RGB goes through OpenCV's
/// `COLOR_RGB2GRAY` so the cascade sees the same luma it was tuned on.
fn to_grayscale(frame: &Frame) -> Result<GrayImage, BackendError> {
    let luma = match frame.channels() {
        1 => frame.data().to_vec(),
        3 => packed_to_mat(frame.data(), frame.width(), frame.height(), 3)
            .and_then(|mat| rgb_to_gray(&mat))
            .map_err(|e| BackendError::inference(BackendKind::Haar, e))?,
        n => {
            return Err(BackendError::inference(
                BackendKind::Haar,
                format!("unsupported channel count {n}"),
            ))
        }
    };
    GrayImage::from_raw(frame.width(), frame.height(), luma)
        .ok_or_else(|| BackendError::inference(BackendKind::Haar, "grayscale buffer size mismatch"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct StubClassifier {
        windows: Vec<Window>,
        seen: Arc<Mutex<Vec<(u32, u32, CascadeParams)>>>,
    }

    impl StubClassifier {
        fn returning(windows: Vec<Window>) -> Self {
            Self {
                windows,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl WindowClassifier for StubClassifier {
        fn detect_multi_scale(
            &mut self,
            gray: &GrayImage,
            params: &CascadeParams,
        ) -> Result<Vec<Window>, Box<dyn std::error::Error>> {
            self.seen
                .lock()
                .unwrap()
                .push((gray.width(), gray.height(), *params));
            Ok(self.windows.clone())
        }
    }

    fn window(x: i32, y: i32, w: i32, h: i32) -> Window {
        Window {
            x,
            y,
            width: w,
            height: h,
        }
    }

    fn frame(w: u32, h: u32) -> Frame {
        Frame::new(vec![90; (w * h * 3) as usize], w, h, 3, 1)
    }

    #[test]
    fn test_fixed_scan_parameters() {
        let params = CascadeParams::default();
        assert_eq!(params.scale_factor, 1.1);
        assert_eq!(params.min_neighbors, 5);
        assert_eq!(params.min_size, 30);
    }

    #[test]
    fn test_classifier_receives_single_channel_frame_size() {
        let classifier = StubClassifier::returning(vec![]);
        let seen = classifier.seen.clone();
        let mut detector = CascadeDetector::new(Box::new(classifier));

        detector.detect(&frame(64, 48)).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!((seen[0].0, seen[0].1), (64, 48));
        assert_eq!(seen[0].2, CascadeParams::default());
    }

    #[test]
    fn test_every_window_has_confidence_one() {
        let classifier =
            StubClassifier::returning(vec![window(10, 10, 30, 30), window(50, 5, 40, 40)]);
        let mut detector = CascadeDetector::new(Box::new(classifier));

        let dets = detector.detect(&frame(100, 100)).unwrap();
        assert_eq!(dets.len(), 2);
        assert!(dets.iter().all(|d| d.confidence == 1.0));
        let b = dets[1].bbox;
        assert_eq!((b.x1, b.y1, b.x2, b.y2), (50, 5, 90, 45));
    }

    #[test]
    fn test_windows_clamped_to_frame() {
        let classifier = StubClassifier::returning(vec![window(80, 70, 40, 40)]);
        let mut detector = CascadeDetector::new(Box::new(classifier));

        let dets = detector.detect(&frame(100, 90)).unwrap();
        let b = dets[0].bbox;
        assert_eq!((b.x2, b.y2), (100, 90));
    }

    #[test]
    fn test_detect_is_deterministic() {
        let classifier = StubClassifier::returning(vec![window(10, 10, 30, 30)]);
        let mut detector = CascadeDetector::new(Box::new(classifier));
        let f = frame(60, 60);
        assert_eq!(detector.detect(&f).unwrap(), detector.detect(&f).unwrap());
    }

    #[test]
    fn test_grayscale_matches_opencv_luma() {
        let data = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let f = Frame::new(data, 4, 1, 3, 1);
        let gray = to_grayscale(&f).unwrap();
        assert_eq!(gray.get_pixel(0, 0).0[0], 76);
        assert_eq!(gray.get_pixel(1, 0).0[0], 150);
        assert_eq!(gray.get_pixel(2, 0).0[0], 29);
        assert_eq!(gray.get_pixel(3, 0).0[0], 255);
    }

    #[test]
    fn test_grayscale_passthrough_for_single_channel() {
        let f = Frame::new(vec![1, 2, 3, 4], 2, 2, 1, 1);
        let gray = to_grayscale(&f).unwrap();
        assert_eq!(gray.as_raw(), &vec![1, 2, 3, 4]);
    }
}
