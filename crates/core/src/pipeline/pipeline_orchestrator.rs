use std::fmt;
use std::path::Path;
use std::time::Instant;

use super::detection_log::DetectionLog;
use super::frame_sampler::FrameSampler;
use super::job_error::JobError;
use super::pipeline_logger::PipelineLogger;
use super::run_result::RunResult;
use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::detection_backend::DetectionBackend;
use crate::pipeline::job::JobPaths;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;
use crate::video::video_channel::VideoChannel;

/// Lifecycle of a single job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Init,
    Opening,
    Streaming,
    Finalizing,
    Done,
    Aborted,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Aborted)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Init => "INIT",
            JobState::Opening => "OPENING",
            JobState::Streaming => "STREAMING",
            JobState::Finalizing => "FINALIZING",
            JobState::Done => "DONE",
            JobState::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

/// Drives the read → detect → annotate → log → write loop for one
/// (video, backend) job.
///
/// The channel is released on every exit path. The detection log is only
/// persisted when the stream was consumed to the end.
pub struct PipelineOrchestrator {
    backend: Box<dyn DetectionBackend>,
    annotator: Box<dyn FrameAnnotator>,
    logger: Box<dyn PipelineLogger>,
    sampler: Option<FrameSampler>,
    state: JobState,
}

impl PipelineOrchestrator {
    pub fn new(
        backend: Box<dyn DetectionBackend>,
        annotator: Box<dyn FrameAnnotator>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            backend,
            annotator,
            logger,
            sampler: None,
            state: JobState::Init,
        }
    }

    pub fn with_sampler(mut self, sampler: FrameSampler) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    fn transition(&mut self, next: JobState) {
        log::debug!(
            "{} job: {} -> {}",
            self.backend.kind(),
            self.state,
            next
        );
        self.state = next;
    }

    /// Runs the job to `DONE`, or to `ABORTED` with the error that stopped
    /// it.
    pub fn run(
        &mut self,
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        source: &Path,
        paths: &JobPaths,
    ) -> Result<RunResult, JobError> {
        let result = self.run_inner(reader, writer, source, paths);
        if result.is_err() {
            self.transition(JobState::Aborted);
        }
        result
    }

    fn run_inner(
        &mut self,
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        source: &Path,
        paths: &JobPaths,
    ) -> Result<RunResult, JobError> {
        self.transition(JobState::Opening);
        let mut channel = VideoChannel::open(reader, writer, source, &paths.video)?;
        let meta = channel.metadata();
        let total = meta.total_frames;
        self.logger.info(&format!(
            "{} ({}x{} @ {:.2} fps) -> {}",
            source.display(),
            meta.width,
            meta.height,
            meta.fps,
            paths.video.display()
        ));

        self.transition(JobState::Streaming);
        let started = Instant::now();
        let mut log = DetectionLog::new();
        let frame_count = self.stream(&mut channel, &mut log, total)?;
        let elapsed = started.elapsed();

        self.transition(JobState::Finalizing);
        let result = RunResult::new(frame_count, log.len(), elapsed);
        log.flush(&paths.log)?;
        channel.close()?;

        self.transition(JobState::Done);
        self.logger.info(&format!(
            "{} detections over {} frames -> {}",
            result.detection_count,
            result.frame_count,
            paths.log.display()
        ));
        self.logger.summary();
        Ok(result)
    }

    /// Consumes the channel's frames; returns how many were processed.
    fn stream(
        &mut self,
        channel: &mut VideoChannel,
        log: &mut DetectionLog,
        total: usize,
    ) -> Result<usize, JobError> {
        let (mut frames, sink) = channel.split();
        let mut frame_index = 0;

        loop {
            let t = Instant::now();
            let mut frame = match frames.next() {
                None => break,
                Some(Ok(frame)) => frame,
                Some(Err(e)) => {
                    log::warn!(
                        "Source stopped after frame {frame_index}: {e}; treating as end of stream"
                    );
                    break;
                }
            };
            self.logger.timing("read", elapsed_ms(t));
            frame_index += 1;

            let t = Instant::now();
            let detections = self.backend.detect(&frame)?;
            self.logger.timing("detect", elapsed_ms(t));
            self.logger.metric("detections", detections.len() as f64);

            let t = Instant::now();
            self.annotator
                .annotate(&mut frame, &detections)
                .map_err(|e| JobError::Stream {
                    frame: frame_index,
                    reason: format!("annotation failed: {e}"),
                })?;
            self.logger.timing("annotate", elapsed_ms(t));

            for detection in &detections {
                log.record(frame_index, detection.confidence);
            }

            let t = Instant::now();
            sink.write(&frame).map_err(|e| JobError::Stream {
                frame: frame_index,
                reason: format!("write failed: {e}"),
            })?;
            self.logger.timing("write", elapsed_ms(t));

            if let Some(sampler) = self.sampler.as_mut() {
                if let Err(e) = sampler.offer(frame_index, &frame) {
                    log::warn!("Could not save sample frame {frame_index}: {e}");
                }
            }

            self.logger.progress(frame_index, total);
        }

        Ok(frame_index)
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
