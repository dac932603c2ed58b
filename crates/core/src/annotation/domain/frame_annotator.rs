use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Draws detection results onto the frame that goes to the output video.
///
/// Implementations modify the frame in place and leave the detections
/// untouched.
pub trait FrameAnnotator: Send {
    fn annotate(
        &self,
        frame: &mut Frame,
        detections: &[Detection],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
