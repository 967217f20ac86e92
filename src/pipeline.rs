//! Sequential composition of async units.
//!
//! A [Pipeline] runs its steps strictly in order. Each step's output becomes the next
//! step's input, optionally passed through a pure adapter ([Pipeline::then_with]).
//! The first failure aborts the remaining steps and reaches the caller unchanged.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::error::OperationFailed;
use crate::types::{EXECUTION_LOG_VERSION, ExecutionLog, ExecutionStepEntry, OutcomeStatus};
use crate::unit::AsyncUnit;

type Stage<I, O> =
  Arc<dyn Fn(I, StepRecorder) -> BoxFuture<'static, Result<O, OperationFailed>> + Send + Sync>;

/// Collects step entries for [Pipeline::run_recorded]. Disabled recorders drop everything.
#[derive(Clone, Default)]
struct StepRecorder {
  entries: Option<Arc<Mutex<Vec<ExecutionStepEntry>>>>,
}

impl StepRecorder {
  fn enabled() -> Self {
    Self {
      entries: Some(Arc::new(Mutex::new(Vec::new()))),
    }
  }

  fn record(&self, entry: ExecutionStepEntry) {
    if let Some(entries) = &self.entries {
      entries
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(entry);
    }
  }

  fn take_entries(&self) -> Vec<ExecutionStepEntry> {
    self
      .entries
      .as_ref()
      .map(|entries| std::mem::take(&mut *entries.lock().unwrap_or_else(PoisonError::into_inner)))
      .unwrap_or_default()
  }
}

/// Outcome of [Pipeline::run_recorded].
#[derive(Debug, Clone)]
pub struct PipelineRun<O> {
  pub result: Result<O, OperationFailed>,
  /// One entry per executed step; steps skipped after a failure are absent.
  pub log: ExecutionLog,
}

/// Ordered chain of async units from `I` to `O`.
pub struct Pipeline<I, O> {
  steps: Vec<String>,
  stage: Stage<I, O>,
}

impl<I, O> Clone for Pipeline<I, O> {
  fn clone(&self) -> Self {
    Self {
      steps: self.steps.clone(),
      stage: Arc::clone(&self.stage),
    }
  }
}

impl<I, O> fmt::Debug for Pipeline<I, O> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Pipeline")
      .field("steps", &self.steps)
      .finish()
  }
}

impl<T> Pipeline<T, T>
where
  T: Send + 'static,
{
  /// The empty pipeline: returns its input unchanged.
  pub fn new() -> Self {
    Self {
      steps: Vec::new(),
      stage: Arc::new(|input: T, _: StepRecorder| {
        futures::future::ready(Ok::<T, OperationFailed>(input)).boxed()
      }),
    }
  }
}

impl<T> Default for Pipeline<T, T>
where
  T: Send + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<I, O> Pipeline<I, O>
where
  I: Send + 'static,
  O: Send + 'static,
{
  /// Appends `unit`, fed directly with the current output.
  pub fn then<U>(self, unit: AsyncUnit<O, U>) -> Pipeline<I, U>
  where
    U: Send + 'static,
  {
    self.then_with(|value| value, unit)
  }

  /// Appends `unit`, fed with `adapter` applied to the current output.
  pub fn then_with<X, U, F>(self, adapter: F, unit: AsyncUnit<X, U>) -> Pipeline<I, U>
  where
    X: Send + 'static,
    U: Send + 'static,
    F: Fn(O) -> X + Send + Sync + 'static,
  {
    let Pipeline {
      mut steps,
      stage: previous,
    } = self;
    steps.push(unit.name().to_string());
    let step = steps.len() as u32;
    let adapter = Arc::new(adapter);

    let stage: Stage<I, U> = Arc::new(move |input: I, recorder: StepRecorder| {
      let previous = Arc::clone(&previous);
      let adapter = Arc::clone(&adapter);
      let unit = unit.clone();
      async move {
        let carried = previous(input, recorder.clone()).await?;

        info!(step, unit = unit.name(), "running pipeline step");
        let started = Instant::now();
        let result = unit.run(adapter(carried)).await;
        if let Err(e) = &result {
          warn!(step, unit = unit.name(), error = %e, "pipeline step failed");
        }

        recorder.record(ExecutionStepEntry {
          step,
          unit: unit.name().to_string(),
          status: OutcomeStatus::of(&result),
          failure_reason: result.as_ref().err().map(|e| e.message.clone()),
          elapsed_ms: started.elapsed().as_millis() as u64,
        });
        result
      }
      .boxed()
    });

    Pipeline { steps, stage }
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// Unit names in execution order.
  pub fn step_names(&self) -> &[String] {
    &self.steps
  }

  /// Runs every step in order and returns the last output or the first failure.
  #[instrument(level = "debug", skip(self, input), fields(steps = self.steps.len()))]
  pub async fn run(&self, input: I) -> Result<O, OperationFailed> {
    (self.stage)(input, StepRecorder::default()).await
  }

  /// Like [Pipeline::run], also returning an [ExecutionLog] of the executed steps.
  #[instrument(level = "debug", skip(self, input), fields(steps = self.steps.len()))]
  pub async fn run_recorded(&self, input: I) -> PipelineRun<O> {
    let started_at = Utc::now().to_rfc3339();
    let recorder = StepRecorder::enabled();
    let result = (self.stage)(input, recorder.clone()).await;
    let steps = recorder.take_entries();

    let completed_steps = steps
      .iter()
      .filter(|entry| entry.status == OutcomeStatus::Success)
      .map(|entry| entry.unit.clone())
      .collect();
    let log = ExecutionLog {
      version: EXECUTION_LOG_VERSION,
      started_at,
      finished_at: Some(Utc::now().to_rfc3339()),
      final_status: OutcomeStatus::of(&result).to_string(),
      completed_steps,
      steps,
    };
    info!(status = %log.final_status, executed = log.steps.len(), "pipeline finished");
    PipelineRun { result, log }
  }
}
