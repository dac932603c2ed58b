use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use facebench_core::analysis::confidence_summary::{render_table, summarize_logs};
use facebench_core::detection::infrastructure::model_assets::ModelAssets;
use facebench_core::detection::infrastructure::model_fetcher::{fetch_missing, FetchStatus};
use facebench_core::pipeline::job_scheduler::JobScheduler;
use facebench_core::pipeline::pipeline_factory::DefaultPipelineFactory;
use facebench_core::shared::bench_config::{BenchConfig, ConfigError};

/// Run face-detection backends over a directory of videos and log every
/// detection for later comparison.
#[derive(Parser)]
#[command(name = "facebench", version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Process every (video, backend) pair (default).
    Run(RunArgs),
    /// Download any model files missing from the model directory.
    FetchModels {
        /// JSON config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Model directory.
        #[arg(long)]
        models: Option<PathBuf>,
    },
    /// Print mean confidence and frame counts for every detection log.
    Summarize {
        /// JSON config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory holding the detection logs.
        #[arg(long)]
        output_logs: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// JSON config file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of input videos.
    #[arg(long)]
    videos: Option<PathBuf>,

    /// Directory holding the model files.
    #[arg(long)]
    models: Option<PathBuf>,

    /// Where annotated videos are written.
    #[arg(long)]
    output_videos: Option<PathBuf>,

    /// Where detection logs are written.
    #[arg(long)]
    output_logs: Option<PathBuf>,

    /// Where sampled frames are written.
    #[arg(long)]
    output_frames: Option<PathBuf>,

    /// Backends to run (comma-separated): caffe, haar. Case-sensitive.
    #[arg(long, value_delimiter = ',')]
    backend: Option<Vec<String>>,

    /// Save every Nth annotated frame as a JPEG.
    #[arg(long)]
    sample_interval: Option<usize>,

    /// Jobs to run concurrently.
    #[arg(long)]
    workers: Option<usize>,

    /// Log a progress line every N frames per job.
    #[arg(long, default_value_t = 100)]
    progress_every: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Run(cli.run)) {
        Command::Run(args) => run_batch(&args),
        Command::FetchModels { config, models } => {
            let mut bench = load_config(config.as_ref())?;
            if let Some(models) = models {
                bench.model_dir = models;
            }
            run_fetch(&bench)
        }
        Command::Summarize {
            config,
            output_logs,
        } => {
            let mut bench = load_config(config.as_ref())?;
            if let Some(dir) = output_logs {
                bench.log_output_dir = dir;
            }
            run_summarize(&bench)
        }
    }
}

fn run_batch(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(args)?;
    let factory = DefaultPipelineFactory::new(ModelAssets::in_dir(&config.model_dir))
        .with_progress_every(args.progress_every);
    let scheduler = JobScheduler::new(config, factory);

    // Individual job failures are reported in the summary, not through the
    // exit status.
    let report = scheduler.run()?;
    report.log_summary();
    Ok(())
}

fn run_fetch(config: &BenchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let statuses = fetch_missing(&config.model_dir, Some(Box::new(download_progress)))?;
    let downloaded = statuses
        .iter()
        .filter(|s| matches!(s, FetchStatus::Downloaded(_)))
        .count();
    if downloaded > 0 {
        eprintln!();
    }
    log::info!(
        "{downloaded} downloaded, {} already present in {}",
        statuses.len() - downloaded,
        config.model_dir.display()
    );
    Ok(())
}

fn run_summarize(config: &BenchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let summaries = summarize_logs(&config.log_output_dir)?;
    if summaries.is_empty() {
        log::warn!(
            "No detection logs found in {}",
            config.log_output_dir.display()
        );
        return Ok(());
    }
    print!("{}", render_table(&summaries));
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<BenchConfig, ConfigError> {
    match path {
        Some(path) => BenchConfig::load(path),
        None => Ok(BenchConfig::default()),
    }
}

/// Defaults, then the config file, then flags.
fn build_config(args: &RunArgs) -> Result<BenchConfig, ConfigError> {
    let mut config = load_config(args.config.as_ref())?;

    let dirs = [
        (&args.videos, &mut config.video_dir),
        (&args.models, &mut config.model_dir),
        (&args.output_videos, &mut config.video_output_dir),
        (&args.output_logs, &mut config.log_output_dir),
        (&args.output_frames, &mut config.frame_output_dir),
    ];
    for (flag, field) in dirs {
        if let Some(dir) = flag {
            *field = dir.clone();
        }
    }
    if let Some(backends) = &args.backend {
        config.backends = backends
            .iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
    }
    if args.sample_interval.is_some() {
        config.sample_interval = args.sample_interval;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }

    config.validate()?;
    Ok(config)
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}
