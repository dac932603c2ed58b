use std::path::{Path, PathBuf};

use thiserror::Error;

use super::domain::video_reader::VideoReader;
use super::domain::video_writer::VideoWriter;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("cannot open video source {path}: {reason}")]
    SourceOpen { path: PathBuf, reason: String },
    #[error("cannot create output video {path}: {reason}")]
    SinkOpen { path: PathBuf, reason: String },
    #[error("failed to finalize output video: {0}")]
    Release(String),
}

pub type FrameStream<'a> =
    Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + 'a>;

/// A source/sink pair for one video asset.
///
/// Both ends are opened together and released together: explicitly through
/// [`VideoChannel::close`], or on drop if the caller bails out early.
pub struct VideoChannel {
    reader: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
    metadata: VideoMetadata,
    open: bool,
}

impl VideoChannel {
    /// Opens the source, then a sink with the source's width, height and
    /// frame rate. The sink file is only created once the source is known
    /// to be readable.
    pub fn open(
        mut reader: Box<dyn VideoReader>,
        mut writer: Box<dyn VideoWriter>,
        source: &Path,
        sink: &Path,
    ) -> Result<Self, ChannelError> {
        let metadata = reader.open(source).map_err(|e| ChannelError::SourceOpen {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

        if let Err(e) = writer.open(sink, &metadata) {
            reader.close();
            return Err(ChannelError::SinkOpen {
                path: sink.to_path_buf(),
                reason: e.to_string(),
            });
        }

        Ok(Self {
            reader,
            writer,
            metadata,
            open: true,
        })
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Borrows the frame stream and the sink at the same time so a frame
    /// can be written while the stream is still being consumed.
    pub fn split(&mut self) -> (FrameStream<'_>, &mut dyn VideoWriter) {
        (self.reader.frames(), self.writer.as_mut())
    }

    /// Releases both ends. The reader is always closed, even when
    /// finalizing the sink fails. Calling it again is a no-op.
    pub fn close(&mut self) -> Result<(), ChannelError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.reader.close();
        self.writer
            .close()
            .map_err(|e| ChannelError::Release(e.to_string()))
    }
}

impl Drop for VideoChannel {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("{e}");
        }
    }
}
