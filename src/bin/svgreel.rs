use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use svgreel::schedule::load_schedule;
use svgreel::{AbortSignal, FailurePolicy, Project, ReelError, Severity, WorkerPool};
use tracing_subscriber::EnvFilter;

/// Exit status of a run stopped by a fatal render error.
const EXIT_FATAL: u8 = 42;

#[derive(Parser, Debug)]
#[command(name = "svgreel", version, about = "Render animated SVG templates into videos")]
struct Cli {
    /// Project directory containing project.json and artwork/.
    project: PathBuf,

    /// Render only the preview intro, single-threaded, directly in the artwork directory.
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Read the project's local schedule.xml instead of downloading the schedule.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Read the schedule from this file.
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Number of worker threads (defaults to the number of CPU cores).
    #[arg(long)]
    workers: Option<usize>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default = match (cli.verbose, cli.debug) {
        (0, false) => "info",
        (0, true) | (1, _) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let project = Project::open(&cli.project)?;
    let renderer = project.renderer();

    if cli.debug {
        tracing::warn!("debug mode: rendering preview only");
        let task = project.preview_task();
        let code = match renderer.render_task(&task, &AbortSignal::new()) {
            Ok(report) => {
                eprintln!(
                    "wrote {} ({} frames)",
                    report.output.display(),
                    report.frames
                );
                ExitCode::SUCCESS
            }
            Err(e) => render_failed(&e, &project.config().failures),
        };
        return Ok(code);
    }

    let source = project.schedule_source(cli.offline, cli.schedule.as_deref())?;
    let events = load_schedule(&source, project.title_map())?;
    let tasks = project.tasks(&events)?;

    let pool = WorkerPool::new(
        renderer,
        project.assets_dir(),
        project.outdir(),
        project.pool_opts(cli.workers),
    )?;
    eprintln!(
        "{} tasks in queue, starting {} worker threads",
        tasks.len(),
        pool.workers()
    );

    match pool.run(tasks) {
        Ok(summary) => {
            eprintln!(
                "done: {} rendered, {} failed",
                summary.succeeded, summary.failed
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(render_failed(&e, &project.config().failures)),
    }
}

fn render_failed(err: &ReelError, policy: &FailurePolicy) -> ExitCode {
    eprintln!("error: {err}");
    match err.severity(policy) {
        Severity::Fatal => ExitCode::from(EXIT_FATAL),
        Severity::TaskLocal => ExitCode::FAILURE,
    }
}
