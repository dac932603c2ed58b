use opencv::core::{Point, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::backend_kind::BackendKind;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;
use crate::shared::opencv_image::packed_to_mat;

/// Box colour and label typography for one backend's output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnnotationStyle {
    /// Colour in the frame's own RGB channel order.
    pub color: [u8; 3],
    pub thickness: i32,
    pub font_scale: f64,
    /// Distance from the box's top edge to the label baseline.
    pub label_offset: i32,
}

impl AnnotationStyle {
    /// Green for the SSD detector, blue for the cascade, so the two
    /// outputs are distinguishable side by side.
    pub fn for_backend(kind: BackendKind) -> Self {
        let color = match kind {
            BackendKind::Caffe => [0, 255, 0],
            BackendKind::Haar => [0, 0, 255],
        };
        Self {
            color,
            thickness: 2,
            font_scale: 0.5,
            label_offset: 5,
        }
    }

    fn scalar(&self) -> Scalar {
        let [r, g, b] = self.color;
        Scalar::new(r as f64, g as f64, b as f64, 0.0)
    }
}

/// Rectangle plus a two-decimal confidence label per detection, rendered
/// with OpenCV's Hershey font.
pub struct OpenCvAnnotator {
    style: AnnotationStyle,
}

/// Labels never sit higher than this, so text above a box touching the top
/// edge stays visible.
const MIN_LABEL_BASELINE: i32 = 12;

impl OpenCvAnnotator {
    pub fn new(style: AnnotationStyle) -> Self {
        Self { style }
    }

    pub fn for_backend(kind: BackendKind) -> Self {
        Self::new(AnnotationStyle::for_backend(kind))
    }
}

pub(crate) fn label_text(detection: &Detection) -> String {
    format!("{:.2}", detection.confidence)
}

pub(crate) fn label_origin(detection: &Detection, offset: i32) -> (i32, i32) {
    let x = detection.bbox.x1 as i32;
    let y = (detection.bbox.y1 as i32 - offset).max(MIN_LABEL_BASELINE);
    (x, y)
}

impl FrameAnnotator for OpenCvAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        detections: &[Detection],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if detections.is_empty() {
            return Ok(());
        }
        if frame.channels() != 3 {
            return Err(format!("cannot annotate a {}-channel frame", frame.channels()).into());
        }

        let mut mat = packed_to_mat(frame.data(), frame.width(), frame.height(), 3)?;

        let color = self.style.scalar();
        for detection in detections {
            let bbox = &detection.bbox;
            imgproc::rectangle_points(
                &mut mat,
                Point::new(bbox.x1 as i32, bbox.y1 as i32),
                Point::new(bbox.x2 as i32, bbox.y2 as i32),
                color,
                self.style.thickness,
                imgproc::LINE_8,
                0,
            )?;

            let (x, y) = label_origin(detection, self.style.label_offset);
            imgproc::put_text(
                &mut mat,
                &label_text(detection),
                Point::new(x, y),
                imgproc::FONT_HERSHEY_SIMPLEX,
                self.style.font_scale,
                color,
                1,
                imgproc::LINE_8,
                false,
            )?;
        }

        frame.data_mut().copy_from_slice(mat.data_bytes()?);
        Ok(())
    }
}
