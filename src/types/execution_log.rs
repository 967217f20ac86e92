//! DTOs for execution.log.json: the steps a pipeline run went through.

use serde::{Deserialize, Serialize};

use super::OutcomeStatus;

/// Current log format version.
pub const EXECUTION_LOG_VERSION: u32 = 1;

/// One executed pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStepEntry {
  /// 1-based step index.
  pub step: u32,
  /// Name of the unit the step ran.
  pub unit: String,
  pub status: OutcomeStatus,
  pub failure_reason: Option<String>,
  pub elapsed_ms: u64,
}

/// Root structure for execution.log.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLog {
  /// Log format version.
  pub version: u32,
  /// RFC 3339 timestamp when the run started.
  pub started_at: String,
  /// RFC 3339 timestamp when the run finished (None while still running).
  pub finished_at: Option<String>,
  /// "success" or "failure".
  pub final_status: String,
  /// Units that settled successfully, in order.
  pub completed_steps: Vec<String>,
  /// Executed steps in order. Steps after a failure never appear.
  pub steps: Vec<ExecutionStepEntry>,
}
