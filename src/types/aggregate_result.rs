//! Results produced by an [crate::Aggregator].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which aggregation an [crate::Aggregator] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateMode {
  /// Wait for every participant; fail on the first detected failure.
  All,
  /// Take whichever participant settles first.
  First,
}

impl fmt::Display for AggregateMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AggregateMode::All => write!(f, "all"),
      AggregateMode::First => write!(f, "first"),
    }
  }
}

/// The participant that settled first in [AggregateMode::First].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Winner<T> {
  /// Position in the order participants were supplied.
  pub index: usize,
  pub name: String,
  pub value: T,
}

/// Successful aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "result", rename_all = "snake_case")]
pub enum AggregateResult<T> {
  /// Every value, in supplied order.
  All(Vec<T>),
  First(Winner<T>),
}

impl<T> AggregateResult<T> {
  pub fn mode(&self) -> AggregateMode {
    match self {
      AggregateResult::All(_) => AggregateMode::All,
      AggregateResult::First(_) => AggregateMode::First,
    }
  }
}
