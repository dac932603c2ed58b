use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Sequential frame source for one video asset.
///
/// Frames come out in decode order with 1-based indices. The pipeline only
/// ever sees [`Frame`] and [`VideoMetadata`]; container and codec handling
/// stays inside the implementation.
pub trait VideoReader: Send {
    /// Opens the asset and returns the stream properties the sink is
    /// created with.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Lazily decodes the remaining frames. The iterator ends at
    /// end-of-stream; an `Err` item means the source could not produce
    /// another frame.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases the decoder and file handle. Safe to call more than once.
    fn close(&mut self);
}
