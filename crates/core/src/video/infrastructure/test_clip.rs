//! Synthetic clips for tests that need a real container on disk.
use std::path::Path;

use super::ffmpeg_writer::FfmpegWriter;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::{FrameRate, VideoMetadata};
use crate::video::domain::video_writer::VideoWriter;

/// Encodes `num_frames` flat grey frames whose brightness steps per frame.
pub(crate) fn write_test_clip(path: &Path, num_frames: usize, width: u32, height: u32, fps: u32) {
    let metadata = VideoMetadata {
        width,
        height,
        fps: fps as f64,
        frame_rate: FrameRate::new(fps as i32, 1),
        total_frames: num_frames,
        codec: "mpeg4".to_string(),
        source_path: None,
    };
    let mut writer = FfmpegWriter::new();
    writer.open(path, &metadata).unwrap();
    for i in 0..num_frames {
        let value = ((i * 40) % 256) as u8;
        let data = vec![value; (width * height * 3) as usize];
        writer.write(&Frame::new(data, width, height, 3, i + 1)).unwrap();
    }
    writer.close().unwrap();
}
