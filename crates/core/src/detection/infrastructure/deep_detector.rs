//! SSD face detector: fixed 300×300 mean-subtracted BGR blob in, normalized
//! boxes with scores out. The inference engine sits behind [`SsdNetwork`]
//! so the pre/post-processing can be exercised without model files.
use ndarray::Array4;

use crate::detection::domain::backend_kind::BackendKind;
use crate::detection::domain::detection_backend::{BackendError, DetectionBackend};
use crate::shared::constants::{
    DEEP_CHANNEL_MEANS_BGR, DEEP_CONFIDENCE_THRESHOLD, DEEP_INPUT_SIZE,
};
use crate::shared::detection::{BoundingBox, Detection};
use crate::shared::frame::Frame;
use crate::shared::opencv_image::{packed_to_mat, resize_linear};

/// One raw SSD output row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SsdCandidate {
    pub confidence: f32,
    /// `[x1, y1, x2, y2]` as fractions of the original frame's width/height.
    pub bbox: [f32; 4],
}

/// Forward pass of an SSD-style network over a `[1, 3, H, W]` blob.
pub trait SsdNetwork: Send {
    fn forward(
        &mut self,
        blob: &Array4<f32>,
    ) -> Result<Vec<SsdCandidate>, Box<dyn std::error::Error>>;
}

pub struct DeepDetector {
    network: Box<dyn SsdNetwork>,
}

impl DeepDetector {
    pub fn new(network: Box<dyn SsdNetwork>) -> Self {
        Self { network }
    }
}

impl DetectionBackend for DeepDetector {
    fn kind(&self) -> BackendKind {
        BackendKind::Caffe
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, BackendError> {
        let blob = preprocess(frame, DEEP_INPUT_SIZE)?;
        let candidates = self
            .network
            .forward(&blob)
            .map_err(|e| BackendError::inference(BackendKind::Caffe, e))?;
        Ok(postprocess(&candidates, frame.width(), frame.height()))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// `INTER_LINEAR` resize to `size × size`, reorder RGB → BGR and subtract
/// the channel means. No scale factor is applied.
fn preprocess(frame: &Frame, size: u32) -> Result<Array4<f32>, BackendError> {
    if frame.channels() != 3 {
        return Err(BackendError::inference(
            BackendKind::Caffe,
            format!("expected a 3-channel frame, got {}", frame.channels()),
        ));
    }
    let resized = packed_to_mat(frame.data(), frame.width(), frame.height(), 3)
        .and_then(|mat| resize_linear(&mat, size, size))
        .map_err(|e| BackendError::inference(BackendKind::Caffe, e))?;

    let s = size as usize;
    let mut blob = Array4::<f32>::zeros((1, 3, s, s));
    for (i, pixel) in resized.chunks_exact(3).enumerate() {
        let (y, x) = (i / s, i % s);
        let [r, g, b] = [pixel[0], pixel[1], pixel[2]];
        for (c, value) in [b, g, r].into_iter().enumerate() {
            blob[[0, c, y, x]] = value as f32 - DEEP_CHANNEL_MEANS_BGR[c];
        }
    }
    Ok(blob)
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

fn postprocess(candidates: &[SsdCandidate], width: u32, height: u32) -> Vec<Detection> {
    let (fw, fh) = (width as f32, height as f32);
    candidates
        .iter()
        .filter(|c| c.confidence.is_finite() && c.confidence > DEEP_CONFIDENCE_THRESHOLD)
        .filter_map(|c| {
            let [x1, y1, x2, y2] = c.bbox;
            BoundingBox::clamped(x1 * fw, y1 * fh, x2 * fw, y2 * fh, width, height)
                .map(|bbox| Detection::new(bbox, c.confidence.min(1.0)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::{Arc, Mutex};

    struct StubNetwork {
        candidates: Vec<SsdCandidate>,
        seen_shapes: Arc<Mutex<Vec<Vec<usize>>>>,
    }

    impl StubNetwork {
        fn returning(candidates: Vec<SsdCandidate>) -> Self {
            Self {
                candidates,
                seen_shapes: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl SsdNetwork for StubNetwork {
        fn forward(
            &mut self,
            blob: &Array4<f32>,
        ) -> Result<Vec<SsdCandidate>, Box<dyn std::error::Error>> {
            self.seen_shapes.lock().unwrap().push(blob.shape().to_vec());
            Ok(self.candidates.clone())
        }
    }

    struct FailingNetwork;

    impl SsdNetwork for FailingNetwork {
        fn forward(
            &mut self,
            _blob: &Array4<f32>,
        ) -> Result<Vec<SsdCandidate>, Box<dyn std::error::Error>> {
            Err("layer mismatch".into())
        }
    }

    fn candidate(confidence: f32, bbox: [f32; 4]) -> SsdCandidate {
        SsdCandidate { confidence, bbox }
    }

    fn solid_frame(w: u32, h: u32, rgb: [u8; 3]) -> Frame {
        let data = rgb.repeat((w * h) as usize);
        Frame::new(data, w, h, 3, 1)
    }

    #[test]
    fn test_preprocess_shape_and_means() {
        let frame = solid_frame(64, 48, [10, 20, 30]);
        let blob = preprocess(&frame, DEEP_INPUT_SIZE).unwrap();
        assert_eq!(blob.shape(), &[1, 3, 300, 300]);
        // BGR order, means (104, 177, 123), no scaling
        assert_relative_eq!(blob[[0, 0, 150, 150]], 30.0 - 104.0);
        assert_relative_eq!(blob[[0, 1, 0, 299]], 20.0 - 177.0);
        assert_relative_eq!(blob[[0, 2, 299, 0]], 10.0 - 123.0);
    }

    #[test]
    fn test_preprocess_downscales_stripes_bilinearly() {
        // Columns 4k+1 and 4k+2 are white: a 4:1 linear reduction lands
        // exactly between them, so every blob pixel stays white.
        let (w, h) = (1200u32, 1200u32);
        let data: Vec<u8> = (0..w * h)
            .flat_map(|i| {
                let v = if matches!(i % w % 4, 1 | 2) { 255 } else { 0 };
                [v, v, v]
            })
            .collect();
        let blob = preprocess(&Frame::new(data, w, h, 3, 1), DEEP_INPUT_SIZE).unwrap();
        assert_relative_eq!(blob[[0, 0, 150, 150]], 255.0 - 104.0);
        assert_relative_eq!(blob[[0, 1, 7, 0]], 255.0 - 177.0);
        assert_relative_eq!(blob[[0, 2, 299, 299]], 255.0 - 123.0);
    }

    #[test]
    fn test_preprocess_rejects_grayscale_frame() {
        let frame = Frame::new(vec![0; 16], 4, 4, 1, 1);
        assert!(matches!(
            preprocess(&frame, DEEP_INPUT_SIZE),
            Err(BackendError::Inference { .. })
        ));
    }

    #[test]
    fn test_detect_feeds_network_working_resolution() {
        let network = StubNetwork::returning(vec![]);
        let shapes = network.seen_shapes.clone();
        let mut detector = DeepDetector::new(Box::new(network));

        detector.detect(&solid_frame(640, 360, [0, 0, 0])).unwrap();
        assert_eq!(shapes.lock().unwrap()[0], vec![1, 3, 300, 300]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let candidates = vec![
            candidate(0.5, [0.1, 0.1, 0.4, 0.4]),
            candidate(0.49, [0.1, 0.1, 0.4, 0.4]),
            candidate(0.5001, [0.5, 0.5, 0.9, 0.9]),
        ];
        let dets = postprocess(&candidates, 100, 100);
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].confidence, 0.5001);
    }

    #[test]
    fn test_maps_normalized_to_pixels() {
        let dets = postprocess(&[candidate(0.9, [0.1, 0.2, 0.5, 0.6])], 200, 100);
        assert_eq!(dets.len(), 1);
        let b = dets[0].bbox;
        assert_eq!((b.x1, b.y1, b.x2, b.y2), (20, 20, 100, 60));
    }

    #[test]
    fn test_clamps_to_frame_and_drops_degenerate() {
        let candidates = vec![
            candidate(0.8, [-0.2, -0.1, 1.3, 0.5]),
            candidate(0.8, [1.1, 0.2, 1.4, 0.6]),
            candidate(0.8, [0.6, 0.6, 0.3, 0.9]),
            candidate(f32::NAN, [0.1, 0.1, 0.2, 0.2]),
        ];
        let dets = postprocess(&candidates, 160, 120);
        assert_eq!(dets.len(), 1);
        let b = dets[0].bbox;
        assert_eq!((b.x1, b.y1, b.x2, b.y2), (0, 0, 160, 60));
    }

    #[test]
    fn test_detections_respect_invariants() {
        let candidates: Vec<_> = (0..50)
            .map(|i| {
                let t = i as f32 / 50.0;
                candidate(0.3 + t * 0.7, [t - 0.3, t * 0.5, t + 0.2, 1.2 - t])
            })
            .chain([candidate(1.2, [0.1, 0.1, 0.6, 0.6])])
            .collect();
        let mut saw_clamped_score = false;
        let (w, h) = (320, 240);
        for d in postprocess(&candidates, w, h) {
            assert!(d.confidence > 0.5 && d.confidence <= 1.0);
            saw_clamped_score |= d.confidence == 1.0;
            assert!(d.bbox.x1 < d.bbox.x2 && d.bbox.x2 <= w);
            assert!(d.bbox.y1 < d.bbox.y2 && d.bbox.y2 <= h);
        }
        assert!(saw_clamped_score);
    }

    #[test]
    fn test_detect_is_deterministic_and_leaves_frame_untouched() {
        let network = StubNetwork::returning(vec![candidate(0.92, [0.25, 0.25, 0.5, 0.5])]);
        let mut detector = DeepDetector::new(Box::new(network));
        let frame = solid_frame(80, 60, [120, 90, 60]);
        let before = frame.data().to_vec();

        let first = detector.detect(&frame).unwrap();
        let second = detector.detect(&frame).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(frame.data(), &before[..]);
    }

    #[test]
    fn test_network_failure_is_inference_error() {
        let mut detector = DeepDetector::new(Box::new(FailingNetwork));
        let err = detector.detect(&solid_frame(10, 10, [0, 0, 0])).unwrap_err();
        assert!(matches!(
            err,
            BackendError::Inference {
                kind: BackendKind::Caffe,
                ..
            }
        ));
    }

    #[test]
    fn test_kind_is_caffe() {
        let detector = DeepDetector::new(Box::new(StubNetwork::returning(vec![])));
        assert_eq!(detector.kind(), BackendKind::Caffe);
    }
}
