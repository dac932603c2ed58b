use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::annotation::infrastructure::opencv_annotator::OpenCvAnnotator;
use crate::detection::domain::backend_kind::BackendKind;
use crate::detection::domain::detection_backend::{BackendError, DetectionBackend};
use crate::detection::infrastructure::backend_factory::create_backend;
use crate::detection::infrastructure::model_assets::ModelAssets;
use crate::pipeline::job::Job;
use crate::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use crate::video::infrastructure::image_file_writer::ImageFileWriter;

/// Builds the fresh set of collaborators each job runs with.
///
/// Shared by all workers, so nothing it hands out may be shared between
/// jobs.
pub trait PipelineFactory: Send + Sync {
    fn backend(&self, kind: BackendKind) -> Result<Box<dyn DetectionBackend>, BackendError>;
    fn annotator(&self, kind: BackendKind) -> Box<dyn FrameAnnotator>;
    fn reader(&self) -> Box<dyn VideoReader>;
    fn writer(&self) -> Box<dyn VideoWriter>;
    fn image_writer(&self) -> Box<dyn ImageWriter>;
    fn logger(&self, job: &Job) -> Box<dyn PipelineLogger>;
}

/// OpenCV backends and annotator, ffmpeg I/O, `log`-based progress.
pub struct DefaultPipelineFactory {
    assets: ModelAssets,
    progress_every: usize,
}

impl DefaultPipelineFactory {
    pub fn new(assets: ModelAssets) -> Self {
        Self {
            assets,
            progress_every: 100,
        }
    }

    pub fn with_progress_every(mut self, frames: usize) -> Self {
        self.progress_every = frames;
        self
    }
}

impl PipelineFactory for DefaultPipelineFactory {
    fn backend(&self, kind: BackendKind) -> Result<Box<dyn DetectionBackend>, BackendError> {
        create_backend(kind, &self.assets)
    }

    fn annotator(&self, kind: BackendKind) -> Box<dyn FrameAnnotator> {
        Box::new(OpenCvAnnotator::for_backend(kind))
    }

    fn reader(&self) -> Box<dyn VideoReader> {
        Box::new(FfmpegReader::new())
    }

    fn writer(&self) -> Box<dyn VideoWriter> {
        Box::new(FfmpegWriter::new())
    }

    fn image_writer(&self) -> Box<dyn ImageWriter> {
        Box::new(ImageFileWriter::new())
    }

    fn logger(&self, job: &Job) -> Box<dyn PipelineLogger> {
        Box::new(StdoutPipelineLogger::new(job.to_string(), self.progress_every))
    }
}
