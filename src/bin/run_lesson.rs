//! CLI: Run one of the async lessons.
//!
//! - `pipeline`: user → repositories → commits of the first repository, one step at a time.
//! - `all`: two operations started together; waits for both.
//! - `first`: two operations started together; takes whichever settles first.
//!
//! Usage: `run_lesson [OPTIONS] <pipeline|all|first>`
//!
//! Set RUST_LOG=asyncflow=debug for unit and step events.

use std::path::PathBuf;
use std::process;

use asyncflow::config::parse_latency_ms;
use asyncflow::execution_log_io::save_execution_log;
use asyncflow::{AggregateMode, AggregateResult, LessonConfig, lessons};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Lesson {
  Pipeline,
  All,
  First,
}

/// Run an async lesson with simulated latency.
#[derive(Parser, Debug)]
#[command(name = "run_lesson")]
#[command(
  after_help = r#"Environment variables (override --latency-ms and --fail-unit when set):
  ASYNCFLOW_LATENCY_MS   Simulated latency of each unit, in milliseconds.
  ASYNCFLOW_FAIL_UNIT    Unit that rejects instead of resolving (e.g. get_repositories).

Examples:
  run_lesson pipeline
  run_lesson --latency-ms 10 --fail-unit get_repositories pipeline
  run_lesson --latency-ms 10 first"#
)]
struct Args {
  /// Simulated latency of each unit, in milliseconds.
  #[arg(long, value_name = "MS", value_parser = parse_latency_ms, default_value = "2000")]
  latency_ms: std::time::Duration,

  /// Unit that rejects instead of resolving.
  #[arg(long, value_name = "NAME")]
  fail_unit: Option<String>,

  /// Write the pipeline's execution log (JSON) to this path.
  #[arg(long, value_name = "PATH")]
  log: Option<PathBuf>,

  /// Lesson to run.
  #[arg(value_enum)]
  lesson: Lesson,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();
  let base = LessonConfig {
    latency: args.latency_ms,
    fail_unit: args.fail_unit.clone(),
    log_path: args.log.clone(),
  };
  let config = match base.with_env_overrides() {
    Ok(c) => c,
    Err(e) => {
      eprintln!("Error: {}", e);
      process::exit(2);
    }
  };
  info!(
    lesson = ?args.lesson,
    latency_ms = config.latency.as_millis() as u64,
    fail_unit = ?config.fail_unit,
    "options (env or flags)"
  );

  let ok = match args.lesson {
    Lesson::Pipeline => run_pipeline(&config).await,
    Lesson::All => run_aggregate(&config, AggregateMode::All).await,
    Lesson::First => run_aggregate(&config, AggregateMode::First).await,
  };
  if !ok {
    process::exit(1);
  }
}

async fn run_pipeline(config: &LessonConfig) -> bool {
  let pipeline = lessons::commits_pipeline(config, None);
  let run = pipeline.run_recorded(1).await;

  if let Some(path) = &config.log_path {
    if let Err(e) = save_execution_log(path, &run.log) {
      eprintln!("Error writing {}: {}", path.display(), e);
      return false;
    }
    info!(path = %path.display(), "execution log written");
  }

  match run.result {
    Ok(commits) => {
      println!("Commits: {:?}", commits);
      println!("Completed steps: {:?}", run.log.completed_steps);
      true
    }
    Err(e) => {
      println!("Error: {}", e);
      println!("Completed steps: {:?}", run.log.completed_steps);
      false
    }
  }
}

async fn run_aggregate(config: &LessonConfig, mode: AggregateMode) -> bool {
  let aggregator = match mode {
    AggregateMode::All => lessons::parallel_operations(config, None),
    AggregateMode::First => lessons::race_operations(config, None),
  };
  match aggregator.run(mode).await {
    Ok(AggregateResult::All(values)) => {
      println!("Result: {:?}", values);
      true
    }
    Ok(AggregateResult::First(winner)) => {
      println!("Result: {} (from {})", winner.value, winner.name);
      true
    }
    Err(e) => {
      println!("Error: {}", e);
      false
    }
  }
}
