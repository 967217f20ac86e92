//! A single asynchronous operation with simulated latency and a deterministic outcome.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, debug_span, warn};

use crate::error::OperationFailed;
use crate::events::EventBus;
use crate::types::{OutcomeStatus, UnitEvent, UnitState};

type OutcomeFn<I, O> = Arc<dyn Fn(I) -> Result<O, OperationFailed> + Send + Sync>;

/// Named async operation: waits `latency`, then maps its input to a value or a failure.
///
/// Units hold no state between invocations; every [AsyncUnit::run] is independent.
pub struct AsyncUnit<I, O> {
  name: String,
  latency: Duration,
  outcome: OutcomeFn<I, O>,
  events: Option<EventBus>,
}

impl<I, O> Clone for AsyncUnit<I, O> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      latency: self.latency,
      outcome: Arc::clone(&self.outcome),
      events: self.events.clone(),
    }
  }
}

impl<I, O> fmt::Debug for AsyncUnit<I, O> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AsyncUnit")
      .field("name", &self.name)
      .field("latency", &self.latency)
      .field("publishes_events", &self.events.is_some())
      .finish()
  }
}

impl<I, O> AsyncUnit<I, O>
where
  I: Send + 'static,
  O: Send + 'static,
{
  pub fn new<F>(name: impl Into<String>, latency: Duration, outcome: F) -> Self
  where
    F: Fn(I) -> Result<O, OperationFailed> + Send + Sync + 'static,
  {
    Self {
      name: name.into(),
      latency,
      outcome: Arc::new(outcome),
      events: None,
    }
  }

  /// A unit that always fails with `message`, with no simulated latency.
  pub fn rejected(name: impl Into<String>, message: impl Into<String>) -> Self {
    let failure = OperationFailed::new(message);
    Self::new(name, Duration::ZERO, move |_| Err(failure.clone()))
  }

  /// Publishes `Started` / `Settled` events for every invocation on `events`.
  pub fn with_events(mut self, events: EventBus) -> Self {
    self.events = Some(events);
    self
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn latency(&self) -> Duration {
    self.latency
  }

  /// Runs the unit once.
  ///
  /// The returned future is lazy and never ready on its first poll, even with zero latency.
  pub fn run(&self, input: I) -> impl Future<Output = Result<O, OperationFailed>> + Send + 'static {
    let name = self.name.clone();
    let latency = self.latency;
    let outcome = Arc::clone(&self.outcome);
    let events = self.events.clone();
    let span = debug_span!("unit", unit = %name);

    async move {
      publish(
        events.as_ref(),
        UnitEvent::Started { unit: name.clone() },
      );
      debug!(latency_ms = latency.as_millis() as u64, "unit started");

      tokio::task::yield_now().await;
      if !latency.is_zero() {
        tokio::time::sleep(latency).await;
      }

      let result = outcome(input);
      let status = OutcomeStatus::of(&result);
      match &result {
        Ok(_) => debug!("unit settled"),
        Err(e) => debug!(error = %e, "unit failed"),
      }
      publish(
        events.as_ref(),
        UnitEvent::Settled {
          unit: name,
          status,
          message: result.as_ref().err().map(|e| e.message.clone()),
        },
      );
      result
    }
    .instrument(span)
  }

  /// Spawns the unit on the current runtime and returns a handle to observe it.
  pub fn start(&self, input: I) -> UnitHandle<O> {
    UnitHandle::spawn(self.name.clone(), self.run(input))
  }
}

impl<I, O> AsyncUnit<I, O>
where
  I: Send + 'static,
  O: Clone + Send + Sync + 'static,
{
  /// A unit that always succeeds with `value`, with no simulated latency.
  pub fn resolved(name: impl Into<String>, value: O) -> Self {
    Self::new(name, Duration::ZERO, move |_| Ok(value.clone()))
  }
}

fn publish(events: Option<&EventBus>, event: UnitEvent) {
  if let Some(bus) = events {
    bus.publish(event);
  }
}

/// A started unit invocation.
///
/// Dropping the handle detaches the task: the unit keeps running and its result is discarded.
#[derive(Debug)]
pub struct UnitHandle<T> {
  name: String,
  state: watch::Receiver<UnitState>,
  task: JoinHandle<Result<T, OperationFailed>>,
}

impl<T> UnitHandle<T>
where
  T: Send + 'static,
{
  /// Spawns `future` as a named unit invocation.
  pub fn spawn<F>(name: impl Into<String>, future: F) -> Self
  where
    F: Future<Output = Result<T, OperationFailed>> + Send + 'static,
  {
    let name = name.into();
    let (tx, state) = watch::channel(UnitState::NotStarted);
    advance(&tx, UnitState::Pending);
    let task = tokio::spawn(async move {
      let result = future.await;
      advance(&tx, UnitState::Settled(OutcomeStatus::of(&result)));
      result
    });
    Self { name, state, task }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Current lifecycle state: `Pending` until the unit settles.
  pub fn state(&self) -> UnitState {
    *self.state.borrow()
  }

  /// Waits for the unit to settle.
  pub async fn settled(self) -> Result<T, OperationFailed> {
    let UnitHandle { name, task, .. } = self;
    match task.await {
      Ok(result) => result,
      Err(e) => {
        warn!(unit = %name, error = %e, "unit task did not complete");
        Err(OperationFailed::new(format!("{} did not complete: {}", name, e)))
      }
    }
  }
}

fn advance(tx: &watch::Sender<UnitState>, next: UnitState) {
  tx.send_if_modified(|current| match current.transition(next) {
    Some(state) => {
      *current = state;
      true
    }
    None => false,
  });
}
