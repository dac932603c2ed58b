use std::path::PathBuf;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Saves every N-th annotated frame (1, 1+N, 1+2N, …) as a JPEG for
/// manual ground-truth labelling.
pub struct FrameSampler {
    writer: Box<dyn ImageWriter>,
    dir: PathBuf,
    interval: usize,
    saved: usize,
}

impl FrameSampler {
    pub fn new(writer: Box<dyn ImageWriter>, dir: impl Into<PathBuf>, interval: usize) -> Self {
        Self {
            writer,
            dir: dir.into(),
            interval: interval.max(1),
            saved: 0,
        }
    }

    pub fn saved(&self) -> usize {
        self.saved
    }

    pub fn should_sample(&self, index: usize) -> bool {
        index >= 1 && (index - 1) % self.interval == 0
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{index:04}.jpg"))
    }

    /// Writes the frame if its index falls on the sampling grid. Returns the
    /// path written, if any.
    pub fn offer(
        &mut self,
        index: usize,
        frame: &Frame,
    ) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
        if !self.should_sample(index) {
            return Ok(None);
        }
        let path = self.path_for(index);
        self.writer.write(&path, frame)?;
        self.saved += 1;
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    struct RecordingWriter {
        paths: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ImageWriter for RecordingWriter {
        fn write(&self, path: &Path, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.paths.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0; 12], 2, 2, 3, index)
    }

    #[rstest]
    #[case(1, true)]
    #[case(2, false)]
    #[case(3, false)]
    #[case(4, true)]
    #[case(7, true)]
    #[case(0, false)]
    fn test_grid_every_third_frame(#[case] index: usize, #[case] expected: bool) {
        let sampler = FrameSampler::new(
            Box::new(RecordingWriter {
                paths: Arc::default(),
            }),
            "samples",
            3,
        );
        assert_eq!(sampler.should_sample(index), expected);
    }

    #[test]
    fn test_offer_writes_padded_file_names() {
        let paths = Arc::new(Mutex::new(Vec::new()));
        let mut sampler = FrameSampler::new(
            Box::new(RecordingWriter {
                paths: paths.clone(),
            }),
            "out/caffe_clip",
            5,
        );
        for i in 1..=12 {
            sampler.offer(i, &frame(i)).unwrap();
        }
        assert_eq!(sampler.saved(), 3);
        assert_eq!(
            *paths.lock().unwrap(),
            vec![
                PathBuf::from("out/caffe_clip/frame_0001.jpg"),
                PathBuf::from("out/caffe_clip/frame_0006.jpg"),
                PathBuf::from("out/caffe_clip/frame_0011.jpg"),
            ]
        );
    }

    #[test]
    fn test_zero_interval_samples_every_frame() {
        let sampler = FrameSampler::new(
            Box::new(RecordingWriter {
                paths: Arc::default(),
            }),
            "samples",
            0,
        );
        assert!((1..=5).all(|i| sampler.should_sample(i)));
    }
}
