use std::path::PathBuf;

use super::frame_sampler::FrameSampler;
use super::job::Job;
use super::job_error::JobError;
use super::pipeline_factory::PipelineFactory;
use super::pipeline_orchestrator::{JobState, PipelineOrchestrator};
use super::run_result::RunResult;
use crate::detection::domain::backend_kind::BackendKind;
use crate::shared::bench_config::{BenchConfig, ConfigError};

/// How one job ended.
#[derive(Debug)]
pub struct JobOutcome {
    pub job: Job,
    pub final_state: JobState,
    pub result: Result<RunResult, JobError>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_load_skip(&self) -> bool {
        matches!(&self.result, Err(e) if e.is_load_error())
    }
}

/// Outcomes of a batch, in job order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn load_skips(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_load_skip()).count()
    }

    /// Failures other than backend load skips.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded() - self.load_skips()
    }

    pub fn log_summary(&self) {
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(r) => log::info!(
                    "  {:<32} {} frames, {} detections, {:.2} fps",
                    outcome.job.to_string(),
                    r.frame_count,
                    r.detection_count,
                    r.average_fps
                ),
                Err(e) => log::info!(
                    "  {:<32} {} ({})",
                    outcome.job.to_string(),
                    outcome.final_state,
                    e.category()
                ),
            }
        }
        log::info!(
            "Batch finished: {} succeeded, {} skipped (model load), {} failed",
            self.succeeded(),
            self.load_skips(),
            self.failed()
        );
    }
}

/// Runs every (video, backend) pair, one isolated orchestrator per job.
///
/// A failing job is reported and the batch moves on; nothing short of a
/// configuration error stops the run.
pub struct JobScheduler<F: PipelineFactory> {
    config: BenchConfig,
    factory: F,
}

impl<F: PipelineFactory> JobScheduler<F> {
    pub fn new(config: BenchConfig, factory: F) -> Self {
        Self { config, factory }
    }

    /// Video-major cartesian product: every backend for the first video,
    /// then every backend for the next. A backend listed twice runs once,
    /// since both jobs would write the same outputs.
    pub fn plan(videos: &[PathBuf], backends: &[String]) -> Vec<Job> {
        let mut unique: Vec<&String> = Vec::with_capacity(backends.len());
        for backend in backends {
            if unique.contains(&backend) {
                log::warn!("Backend '{backend}' listed more than once; running it once");
            } else {
                unique.push(backend);
            }
        }
        videos
            .iter()
            .flat_map(|video| {
                unique
                    .iter()
                    .map(move |b| Job::new(video.clone(), b.as_str()))
            })
            .collect()
    }

    /// Discovers the videos, prepares the output directories and runs the
    /// whole matrix.
    pub fn run(&self) -> Result<BatchReport, ConfigError> {
        self.config.validate()?;
        let videos = self.config.discover_videos()?;
        if videos.is_empty() {
            log::warn!(
                "No videos with extensions {:?} found in {}",
                self.config.video_extensions,
                self.config.video_dir.display()
            );
            return Ok(BatchReport::default());
        }
        self.config.ensure_output_dirs()?;

        let jobs = Self::plan(&videos, &self.config.backends);
        log::info!(
            "Scheduling {} jobs ({} videos × {} backends)",
            jobs.len(),
            videos.len(),
            self.config.backends.len()
        );
        Ok(self.run_jobs(jobs))
    }

    pub fn run_jobs(&self, jobs: Vec<Job>) -> BatchReport {
        let workers = self.config.workers.min(jobs.len()).max(1);
        let outcomes: Vec<JobOutcome> = if workers == 1 {
            jobs.into_iter().map(|job| self.run_job(job)).collect()
        } else {
            self.run_parallel(jobs, workers)
        };
        BatchReport { outcomes }
    }

    fn run_parallel(&self, jobs: Vec<Job>, workers: usize) -> Vec<JobOutcome> {
        let (job_tx, job_rx) = crossbeam_channel::bounded::<(usize, Job)>(workers);
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded::<(usize, JobOutcome)>();

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let outcome_tx = outcome_tx.clone();
                scope.spawn(move || {
                    for (position, job) in job_rx {
                        if outcome_tx.send((position, self.run_job(job))).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(job_rx);
            drop(outcome_tx);

            for entry in jobs.into_iter().enumerate() {
                if job_tx.send(entry).is_err() {
                    break;
                }
            }
            drop(job_tx);
        });

        let mut outcomes: Vec<(usize, JobOutcome)> = outcome_rx.into_iter().collect();
        outcomes.sort_by_key(|(position, _)| *position);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    fn run_job(&self, job: Job) -> JobOutcome {
        log::info!("Processing: {job}");
        let (final_state, result) = self.execute(&job);
        match &result {
            Ok(r) => log::info!(
                "Finished {job}: {} frames at {:.2} FPS",
                r.frame_count,
                r.average_fps
            ),
            Err(e) if e.is_load_error() => log::warn!("Skipping {job}: {e}"),
            Err(e) => log::error!("Job {job} failed: {e}"),
        }
        JobOutcome {
            job,
            final_state,
            result,
        }
    }

    fn execute(&self, job: &Job) -> (JobState, Result<RunResult, JobError>) {
        // Backend problems are caught before the channel opens, so a skipped
        // job never leaves output files behind.
        let backend = match job
            .backend
            .parse::<BackendKind>()
            .and_then(|kind| self.factory.backend(kind))
        {
            Ok(backend) => backend,
            Err(e) => return (JobState::Aborted, Err(e.into())),
        };
        let kind = backend.kind();
        let paths = self.config.job_paths(job);

        let mut orchestrator = PipelineOrchestrator::new(
            backend,
            self.factory.annotator(kind),
            self.factory.logger(job),
        );
        if let Some(interval) = self.config.sample_interval {
            orchestrator = orchestrator.with_sampler(FrameSampler::new(
                self.factory.image_writer(),
                paths.samples.clone(),
                interval,
            ));
        }

        let result = orchestrator.run(
            self.factory.reader(),
            self.factory.writer(),
            &job.video,
            &paths,
        );
        if result.is_ok() {
            log::info!("Log saved: {}", paths.log.display());
        }
        (orchestrator.state(), result)
    }
}
