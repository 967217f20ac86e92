//! Error types for units, aggregation and configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure produced by an async unit.
///
/// There is exactly one failure kind: a human-readable message. Pipelines and
/// aggregators hand it back to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct OperationFailed {
  pub message: String,
}

impl OperationFailed {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}

/// Failure of an [crate::Aggregator] run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
  /// A participant settled with a failure.
  #[error("participant {index} ({name}) failed: {source}")]
  Participant {
    /// Position of the participant in the order it was supplied.
    index: usize,
    name: String,
    #[source]
    source: OperationFailed,
  },
  /// `first` was asked to race an empty set.
  #[error("no participants to race")]
  NoParticipants,
}

impl AggregateError {
  /// The participant's failure, exactly as the unit produced it.
  pub fn failure(&self) -> Option<&OperationFailed> {
    match self {
      AggregateError::Participant { source, .. } => Some(source),
      AggregateError::NoParticipants => None,
    }
  }

  /// Name of the failing participant, if any.
  pub fn participant_name(&self) -> Option<&str> {
    match self {
      AggregateError::Participant { name, .. } => Some(name),
      AggregateError::NoParticipants => None,
    }
  }
}

/// Invalid lesson configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("invalid latency {value:?}: expected milliseconds as an unsigned integer")]
  InvalidLatency { value: String },
}
