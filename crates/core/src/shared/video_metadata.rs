use std::path::PathBuf;

/// Exact frame rate as a reduced fraction, e.g. 30000/1001 for NTSC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    /// `None` unless both terms are positive.
    pub fn new(num: i32, den: i32) -> Option<Self> {
        if num <= 0 || den <= 0 {
            return None;
        }
        let (num, den) = (num as u32, den as u32);
        let g = gcd(num, den);
        Some(Self {
            num: num / g,
            den: den / g,
        })
    }

    /// Best fraction for a decimal rate. NTSC-style rates (29.97, 23.976,
    /// 59.94) map to their x/1001 form.
    pub fn from_fps(fps: f64) -> Option<Self> {
        if !fps.is_finite() || fps <= 0.0 || fps > i32::MAX as f64 / 1001.0 {
            return None;
        }
        for den in [1, 1001] {
            let num = (fps * den as f64).round();
            if num >= 1.0 && (num / den as f64 - fps).abs() < 1e-4 {
                return Self::new(num as i32, den);
            }
        }
        Self::new((fps * 1000.0).round() as i32, 1000)
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Stream properties captured when a source is opened; the output sink is
/// created with the same width, height and frame rate.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Container-reported rate; `None` when the source gave none.
    pub frame_rate: Option<FrameRate>,
    /// Container-reported frame count; 0 when unknown.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// The exact rate when known, otherwise one derived from `fps`.
    pub fn rate(&self) -> Option<FrameRate> {
        self.frame_rate.or_else(|| FrameRate::from_fps(self.fps))
    }
}
