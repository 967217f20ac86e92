//! Outcome status of a settled unit.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a unit settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
  Success,
  Failure,
}

impl OutcomeStatus {
  /// Status matching a unit's result.
  pub fn of<T, E>(result: &Result<T, E>) -> Self {
    match result {
      Ok(_) => OutcomeStatus::Success,
      Err(_) => OutcomeStatus::Failure,
    }
  }
}

impl fmt::Display for OutcomeStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OutcomeStatus::Success => write!(f, "success"),
      OutcomeStatus::Failure => write!(f, "failure"),
    }
  }
}
