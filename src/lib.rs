//! # asyncflow
//!
//! Dependent and concurrent async work over simulated operations.
//!
//! ## Architecture
//!
//! - [AsyncUnit]: one named operation with simulated latency and a deterministic outcome.
//! - [Pipeline]: units run strictly in sequence, each fed by its predecessor's output.
//!   The first failure stops the pipeline and is returned unchanged.
//! - [Aggregator]: independently started units combined by `all` (supplied order,
//!   immediate failure) or `first` (earliest settlement). Nothing is ever cancelled.
//! - [EventBus]: explicitly owned publish/subscribe channel for unit lifecycle events.
//!
//! The `lessons` module wires these into the GitHub user → repositories → commits lesson.

pub mod aggregator;
#[cfg(test)]
mod aggregator_test;
pub mod config;
pub mod error;
pub mod events;
pub mod execution_log_io;
pub mod lessons;
pub mod pipeline;
pub mod types;
pub mod unit;

pub use aggregator::{Aggregator, Participant};
pub use config::LessonConfig;
pub use error::{AggregateError, ConfigError, OperationFailed};
pub use events::EventBus;
pub use pipeline::{Pipeline, PipelineRun};
pub use types::{AggregateMode, AggregateResult, OutcomeStatus, UnitEvent, UnitState, Winner};
pub use unit::{AsyncUnit, UnitHandle};
