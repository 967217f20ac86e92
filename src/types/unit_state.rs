//! Lifecycle of a single unit invocation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::OutcomeStatus;

/// `NotStarted -> Pending -> Settled`. Moves only forward; `Settled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
  NotStarted,
  Pending,
  Settled(OutcomeStatus),
}

impl UnitState {
  /// Whether `next` is the single legal successor of `self`.
  pub fn can_transition_to(self, next: UnitState) -> bool {
    matches!(
      (self, next),
      (UnitState::NotStarted, UnitState::Pending) | (UnitState::Pending, UnitState::Settled(_))
    )
  }

  /// Returns `next` if the transition is legal, otherwise `None`.
  pub fn transition(self, next: UnitState) -> Option<UnitState> {
    self.can_transition_to(next).then_some(next)
  }

  pub fn is_settled(self) -> bool {
    matches!(self, UnitState::Settled(_))
  }
}

impl fmt::Display for UnitState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      UnitState::NotStarted => write!(f, "not_started"),
      UnitState::Pending => write!(f, "pending"),
      UnitState::Settled(status) => write!(f, "settled({})", status),
    }
  }
}
