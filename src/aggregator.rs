//! Concurrent aggregation of independently started units.
//!
//! Participants are spawned in the order supplied and may settle in any order.
//! [Aggregator::all] keeps supplied order in its output and reports the first detected
//! failure immediately. [Aggregator::first] returns the earliest settlement.
//! Neither mode cancels anything: participants still outstanding when the aggregator
//! returns run to completion and their results are dropped.

use std::fmt;
use std::future::Future;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, info, instrument, warn};

use crate::error::{AggregateError, OperationFailed};
use crate::types::{AggregateMode, AggregateResult, UnitState, Winner};
use crate::unit::{AsyncUnit, UnitHandle};

type Launch<T> = Box<dyn FnOnce() -> UnitHandle<T> + Send>;

/// A unit invocation that has not been started yet.
pub struct Participant<T> {
  name: String,
  launch: Launch<T>,
}

impl<T> fmt::Debug for Participant<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Participant")
      .field("name", &self.name)
      .field("state", &UnitState::NotStarted)
      .finish()
  }
}

impl<T> Participant<T>
where
  T: Send + 'static,
{
  /// Participant running `unit` with `input`.
  pub fn new<I>(unit: &AsyncUnit<I, T>, input: I) -> Self
  where
    I: Send + 'static,
  {
    let unit = unit.clone();
    Self {
      name: unit.name().to_string(),
      launch: Box::new(move || unit.start(input)),
    }
  }

  /// Participant running an arbitrary future.
  pub fn from_future<F>(name: impl Into<String>, future: F) -> Self
  where
    F: Future<Output = Result<T, OperationFailed>> + Send + 'static,
  {
    let name = name.into();
    let handle_name = name.clone();
    Self {
      name,
      launch: Box::new(move || UnitHandle::spawn(handle_name, future)),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  fn start(self) -> UnitHandle<T> {
    (self.launch)()
  }
}

/// Fixed set of participants combined under `all` or `first` semantics.
pub struct Aggregator<T> {
  participants: Vec<Participant<T>>,
}

impl<T> fmt::Debug for Aggregator<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Aggregator")
      .field("participants", &self.participants)
      .finish()
  }
}

impl<T> Default for Aggregator<T> {
  fn default() -> Self {
    Self {
      participants: Vec::new(),
    }
  }
}

impl<T> FromIterator<Participant<T>> for Aggregator<T> {
  fn from_iter<It: IntoIterator<Item = Participant<T>>>(iter: It) -> Self {
    Self {
      participants: iter.into_iter().collect(),
    }
  }
}

impl<T> Aggregator<T>
where
  T: Send + 'static,
{
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a participant after the ones already supplied.
  pub fn participant(mut self, participant: Participant<T>) -> Self {
    self.participants.push(participant);
    self
  }

  pub fn len(&self) -> usize {
    self.participants.len()
  }

  pub fn is_empty(&self) -> bool {
    self.participants.is_empty()
  }

  /// Runs the aggregation selected by `mode`.
  pub async fn run(self, mode: AggregateMode) -> Result<AggregateResult<T>, AggregateError> {
    match mode {
      AggregateMode::All => self.all().await.map(AggregateResult::All),
      AggregateMode::First => self.first().await.map(AggregateResult::First),
    }
  }

  /// Waits for every participant and returns their values in supplied order.
  ///
  /// Returns as soon as any participant fails; outstanding participants keep running.
  #[instrument(level = "debug", skip(self), fields(participants = self.participants.len()))]
  pub async fn all(self) -> Result<Vec<T>, AggregateError> {
    let mut settling = self.start_all();
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(settling.len()).collect();

    while let Some((index, name, result)) = settling.next().await {
      match result {
        Ok(value) => {
          debug!(index, participant = %name, "participant settled");
          slots[index] = Some(value);
        }
        Err(source) => {
          warn!(index, participant = %name, error = %source, "participant failed");
          return Err(AggregateError::Participant {
            index,
            name,
            source,
          });
        }
      }
    }

    info!(settled = slots.len(), "all participants settled");
    Ok(slots.into_iter().flatten().collect())
  }

  /// Returns the earliest settlement, success or failure.
  ///
  /// The remaining participants keep running; their results are discarded.
  #[instrument(level = "debug", skip(self), fields(participants = self.participants.len()))]
  pub async fn first(self) -> Result<Winner<T>, AggregateError> {
    let mut settling = self.start_all();
    let Some((index, name, result)) = settling.next().await else {
      return Err(AggregateError::NoParticipants);
    };
    info!(index, participant = %name, discarded = settling.len(), "first participant settled");
    match result {
      Ok(value) => Ok(Winner { index, name, value }),
      Err(source) => Err(AggregateError::Participant {
        index,
        name,
        source,
      }),
    }
  }

  /// Starts every participant in order and returns their settlements as they arrive.
  fn start_all(
    self,
  ) -> FuturesUnordered<impl Future<Output = (usize, String, Result<T, OperationFailed>)>> {
    self
      .participants
      .into_iter()
      .map(Participant::start)
      .enumerate()
      .map(|(index, handle)| async move {
        let name = handle.name().to_string();
        (index, name, handle.settled().await)
      })
      .collect()
  }
}
