//! Shared data types: unit lifecycle, events, aggregation results and execution logs.

mod aggregate_result;
mod execution_log;
mod outcome_status;
mod unit_event;
mod unit_state;

pub use aggregate_result::{AggregateMode, AggregateResult, Winner};
pub use execution_log::{EXECUTION_LOG_VERSION, ExecutionLog, ExecutionStepEntry};
pub use outcome_status::OutcomeStatus;
pub use unit_event::UnitEvent;
pub use unit_state::UnitState;
