/// Axis-aligned face box in pixel coordinates.
///
/// Always satisfies `x1 < x2 <= frame width` and `y1 < y2 <= frame height`
/// for the frame it was produced from; construct through [`BoundingBox::clamped`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    /// Clamps each coordinate into `[0, width] × [0, height]` and truncates
    /// toward zero. Returns `None` for non-finite input or when the clamped
    /// box is degenerate (`x1 >= x2` or `y1 >= y2`).
    pub fn clamped(x1: f32, y1: f32, x2: f32, y2: f32, width: u32, height: u32) -> Option<Self> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return None;
        }
        let (fw, fh) = (width as f32, height as f32);
        let bbox = Self {
            x1: x1.clamp(0.0, fw) as u32,
            y1: y1.clamp(0.0, fh) as u32,
            x2: x2.clamp(0.0, fw) as u32,
            y2: y2.clamp(0.0, fh) as u32,
        };
        if bbox.x1 >= bbox.x2 || bbox.y1 >= bbox.y2 {
            return None;
        }
        Some(bbox)
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }
}

/// One detected face: where it is and how sure the backend is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    /// In `[0.0, 1.0]`.
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BoundingBox, confidence: f32) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&confidence),
            "confidence must lie in [0, 1]"
        );
        Self { bbox, confidence }
    }
}
