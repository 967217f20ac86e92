//! Lesson configuration: simulated latency, an optional failing unit and the log path.
//!
//! Flags supply the base values; `ASYNCFLOW_*` environment variables override them.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::ConfigError;

/// Latency of a lesson unit when nothing else is configured.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(2000);

/// Overrides the latency, in milliseconds.
pub const LATENCY_ENV: &str = "ASYNCFLOW_LATENCY_MS";
/// Names the unit that should reject instead of resolving.
pub const FAIL_UNIT_ENV: &str = "ASYNCFLOW_FAIL_UNIT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonConfig {
  pub latency: Duration,
  /// Unit that rejects with its failure message instead of producing a value.
  pub fail_unit: Option<String>,
  /// Where to write the execution log of a pipeline run.
  pub log_path: Option<PathBuf>,
}

impl Default for LessonConfig {
  fn default() -> Self {
    Self {
      latency: DEFAULT_LATENCY,
      fail_unit: None,
      log_path: None,
    }
  }
}

impl LessonConfig {
  pub fn fails(&self, unit: &str) -> bool {
    self.fail_unit.as_deref() == Some(unit)
  }

  /// Applies overrides from the process environment.
  pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
    self.with_overrides(|key| std::env::var(key).ok())
  }

  /// Applies overrides from `lookup`. Empty values are ignored.
  pub fn with_overrides(
    mut self,
    lookup: impl Fn(&str) -> Option<String>,
  ) -> Result<Self, ConfigError> {
    let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    if let Some(ms) = set(LATENCY_ENV) {
      self.latency = parse_latency_ms(&ms)?;
      debug!(latency_ms = self.latency.as_millis() as u64, "latency from environment");
    }
    if let Some(unit) = set(FAIL_UNIT_ENV) {
      debug!(%unit, "failing unit from environment");
      self.fail_unit = Some(unit.trim().to_string());
    }
    Ok(self)
  }
}

/// Parses a millisecond count such as `"250"`.
pub fn parse_latency_ms(value: &str) -> Result<Duration, ConfigError> {
  value
    .trim()
    .parse::<u64>()
    .map(Duration::from_millis)
    .map_err(|_| ConfigError::InvalidLatency {
      value: value.to_string(),
    })
}
