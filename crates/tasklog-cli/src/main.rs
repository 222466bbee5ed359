use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use serde::Serialize;
use tokio::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tasklog_core::{
    CompletionPolicy, ConfigError, ContainerError, EventLog, Registry, RegistryConfig, Severity,
    Task, TaskContainer, TaskCounts, TaskEvent, TaskResult, TaskSnapshot, TrackedTask,
};

#[derive(Parser, Debug)]
#[command(name = "tasklog", version, about = "Archive a directory while tracking progress")]
struct Cli {
    /// JSON registry configuration.
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,

    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Directory whose files are archived.
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Number of step tasks the files are split across.
    #[arg(long, default_value_t = 3)]
    steps: usize,

    #[arg(long, conflicts_with = "success_on_error")]
    fail_on_error: bool,

    /// Errors are reported but the run still counts as a success.
    #[arg(long)]
    success_on_error: bool,

    /// Request a stop after this many files.
    #[arg(long, value_name = "N")]
    stop_after: Option<u64>,

    /// Pause between files, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 0)]
    delay_ms: u64,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn policy(&self) -> CompletionPolicy {
        if self.success_on_error && !self.fail_on_error {
            CompletionPolicy::SuccessOnError
        } else {
            CompletionPolicy::FailOnError
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid log level: {0}")]
    LogLevel(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot read {path}: {source}")]
    Scan {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("failed to render report: {0}")]
    Report(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct Report {
    result: TaskResult,
    counts: TaskCounts,
    messages: usize,
    tasks: Vec<TaskSnapshot>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(&args.log_level) {
        eprintln!("{err}");
        return ExitCode::from(2);
    }

    match run(args).await {
        Ok(result) if result.is_success() => ExitCode::SUCCESS,
        Ok(result) => {
            warn!(%result, "archive did not succeed");
            ExitCode::from(1)
        }
        Err(err) => {
            error!(error = %err, "tasklog failed");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(log_level: &str) -> Result<(), CliError> {
    let filter =
        EnvFilter::try_new(log_level).map_err(|err| CliError::LogLevel(err.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| CliError::LogLevel(err.to_string()))
}

fn load_config(path: Option<&Path>) -> Result<RegistryConfig, CliError> {
    match path {
        Some(path) => Ok(RegistryConfig::from_json_file(path)?),
        None => Ok(RegistryConfig::default()),
    }
}

fn list_files(root: &Path) -> Result<Vec<PathBuf>, CliError> {
    let scan_err = |source| CliError::Scan {
        path: root.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(root).map_err(scan_err)? {
        let path = entry.map_err(scan_err)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

async fn run(args: Cli) -> Result<TaskResult, CliError> {
    let config = load_config(args.config_path.as_deref())?;
    info!(
        root = %args.root.display(),
        steps = args.steps,
        mirror = config.mirror_messages,
        "starting tasklog"
    );
    let registry = Registry::with_config(config);
    let policy = args.policy();

    let files = list_files(&args.root)?;
    let steps = args.steps.clamp(1, files.len().max(1));
    let chunk = files.len().div_ceil(steps).max(1);

    let mut container = TaskContainer::new();
    let archive = registry.new_task("archive", true);
    archive.set_display_name(&format!("Archiving {}", args.root.display()));
    container.register(archive.clone(), "archive")?;
    container.set_global(archive.id())?;

    let log = Rc::new(EventLog::new());
    archive.subscribe(log.clone());

    let step_tasks = files
        .chunks(chunk)
        .enumerate()
        .map(|(i, _)| -> Result<Task, CliError> {
            let name = format!("step-{}", i + 1);
            let step = registry.new_task(&name, true);
            if let Err(err) = step.set_parent_task(archive.id()) {
                warn!(task = %step.id(), error = %err, "step left unparented");
            }
            container.register(step.clone(), name)?;
            Ok(step)
        })
        .collect::<Result<Vec<Task>, CliError>>()?;

    archive.start_task(
        Some(step_tasks.len() as u64),
        &format!("{} files in {} steps", files.len(), step_tasks.len()),
        Severity::Info,
    );

    let delay = Duration::from_millis(args.delay_ms);
    let mut processed = 0u64;

    'steps: for (step, batch) in step_tasks.iter().zip(files.chunks(chunk)) {
        step.start_task(Some(batch.len() as u64), "", Severity::Info);
        for file in batch {
            if args.stop_after.is_some_and(|limit| processed >= limit) {
                step.stop_task("stop requested", Severity::Warning);
                archive.stop_task("stop requested", Severity::Warning);
                break 'steps;
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            registry.tick();
            archive_file(step, file);
            processed += 1;
        }
        step.complete(policy);
        archive.add_completed_sub_tasks(
            1,
            &format!("{} finished: {}", step.name(), step.result()),
            Severity::Debug,
        );
    }
    archive.complete(policy);
    let result = archive.result();

    let report = Report {
        result,
        counts: registry.counts(),
        messages: log.count(|e| matches!(e, TaskEvent::MessageLogged { .. })),
        tasks: registry.snapshot(),
    };
    print_report(&report, args.json)?;

    drop(container);
    Ok(result)
}

/// Stand-in for the real work: inspects the file and reports what it sees.
fn archive_file(step: &Task, file: &Path) {
    match std::fs::metadata(file) {
        Ok(meta) if meta.len() == 0 => {
            step.log_warning(&format!("{} is empty", file.display()));
        }
        Ok(meta) => {
            step.log_message(
                &format!("{} ({} bytes)", file.display(), meta.len()),
                Severity::Debug,
            );
        }
        Err(err) => {
            step.log_error(&format!("{}: {err}", file.display()));
        }
    }
    step.advance(1);
}

fn print_report(report: &Report, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("result: {}", report.result);
    println!("messages: {}", report.messages);
    for task in &report.tasks {
        let expected = task
            .expected
            .map_or_else(|| "?".to_string(), |n| n.to_string());
        println!(
            "  {:<10} {:<10} {:<26} {}/{} {}ms",
            task.name,
            task.state.to_string(),
            task.result.to_string(),
            task.completed, expected, task.elapsed_ms
        );
        for err in &task.last_errors {
            println!("    ! {err}");
        }
    }
    Ok(())
}
