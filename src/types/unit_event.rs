//! Notifications published on an [crate::EventBus].

use serde::{Deserialize, Serialize};

use super::OutcomeStatus;

/// Lifecycle event of one unit invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnitEvent {
  /// The unit was polled for the first time.
  Started { unit: String },
  /// The unit produced its outcome.
  Settled {
    unit: String,
    status: OutcomeStatus,
    /// Failure message, set only when `status` is `Failure`.
    message: Option<String>,
  },
}

impl UnitEvent {
  pub fn unit(&self) -> &str {
    match self {
      UnitEvent::Started { unit } | UnitEvent::Settled { unit, .. } => unit,
    }
  }
}
