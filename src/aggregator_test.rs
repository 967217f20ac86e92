//! Tests for `Aggregator`.

use std::time::Duration;

use tokio::time::Instant;

use crate::aggregator::{Aggregator, Participant};
use crate::error::{AggregateError, OperationFailed};
use crate::events::{EventBus, drain};
use crate::types::{AggregateMode, AggregateResult, UnitEvent};
use crate::unit::AsyncUnit;

fn value_after(name: &str, ms: u64, value: u32, bus: &EventBus) -> AsyncUnit<(), u32> {
  AsyncUnit::new(name, Duration::from_millis(ms), move |_| Ok(value)).with_events(bus.clone())
}

fn failure_after(name: &str, ms: u64, message: &str, bus: &EventBus) -> AsyncUnit<(), u32> {
  let message = message.to_string();
  AsyncUnit::new(name, Duration::from_millis(ms), move |_| {
    Err(OperationFailed::new(message.clone()))
  })
  .with_events(bus.clone())
}

fn settled_units(events: &[UnitEvent]) -> Vec<String> {
  events
    .iter()
    .filter(|e| matches!(e, UnitEvent::Settled { .. }))
    .map(|e| e.unit().to_string())
    .collect()
}

#[tokio::test(start_paused = true)]
async fn all_keeps_supplied_order() {
  let bus = EventBus::new(64);
  let mut rx = bus.subscribe();
  let values = Aggregator::new()
    .participant(Participant::new(&value_after("slow", 60, 1, &bus), ()))
    .participant(Participant::new(&value_after("fast", 10, 2, &bus), ()))
    .all()
    .await
    .unwrap();

  assert_eq!(values, vec![1, 2]);
  assert_eq!(settled_units(&drain(&mut rx)), vec!["fast", "slow"]);
}

#[tokio::test(start_paused = true)]
async fn all_runs_participants_concurrently() {
  let bus = EventBus::default();
  let start = Instant::now();
  let values = Aggregator::new()
    .participant(Participant::new(&value_after("op1", 2000, 1, &bus), ()))
    .participant(Participant::new(&value_after("op2", 6000, 2, &bus), ()))
    .all()
    .await
    .unwrap();
  assert_eq!(values, vec![1, 2]);
  let elapsed = start.elapsed();
  assert!(elapsed >= Duration::from_millis(6000));
  assert!(elapsed < Duration::from_millis(8000));
}

#[tokio::test(start_paused = true)]
async fn all_reports_failure_before_slow_participant_settles() {
  let bus = EventBus::new(64);
  let mut rx = bus.subscribe();
  let start = Instant::now();
  let err = Aggregator::new()
    .participant(Participant::new(&value_after("quick", 10, 1, &bus), ()))
    .participant(Participant::new(
      &failure_after("broken", 20, "Because something failed.", &bus),
      (),
    ))
    .participant(Participant::new(&value_after("slow", 500, 3, &bus), ()))
    .all()
    .await
    .unwrap_err();

  assert!(start.elapsed() < Duration::from_millis(500));
  assert_eq!(
    err,
    AggregateError::Participant {
      index: 1,
      name: "broken".to_string(),
      source: OperationFailed::new("Because something failed."),
    }
  );
  let settled = settled_units(&drain(&mut rx));
  assert!(!settled.contains(&"slow".to_string()));

  // The slow participant was not cancelled.
  tokio::time::sleep(Duration::from_millis(600)).await;
  assert_eq!(settled_units(&drain(&mut rx)), vec!["slow"]);
}

#[tokio::test]
async fn all_over_nothing_is_empty() {
  let values = Aggregator::<u32>::new().all().await.unwrap();
  assert!(values.is_empty());
}

#[tokio::test(start_paused = true)]
async fn first_returns_earliest_success() {
  let bus = EventBus::default();
  let winner = Aggregator::new()
    .participant(Participant::new(&value_after("op5", 2000, 5, &bus), ()))
    .participant(Participant::new(&value_after("op6", 1000, 6, &bus), ()))
    .first()
    .await
    .unwrap();
  assert_eq!(winner.index, 1);
  assert_eq!(winner.name, "op6");
  assert_eq!(winner.value, 6);
}

#[tokio::test(start_paused = true)]
async fn first_returns_earliest_failure() {
  let bus = EventBus::default();
  let err = Aggregator::new()
    .participant(Participant::new(&value_after("ok", 30, 1, &bus), ()))
    .participant(Participant::new(&failure_after("bad", 10, "too soon", &bus), ()))
    .first()
    .await
    .unwrap_err();
  assert_eq!(err.participant_name(), Some("bad"));
  assert_eq!(err.failure(), Some(&OperationFailed::new("too soon")));
}

#[tokio::test(start_paused = true)]
async fn first_lets_losers_finish() {
  let bus = EventBus::new(64);
  let mut rx = bus.subscribe();
  let winner = Aggregator::new()
    .participant(Participant::new(&value_after("winner", 10, 1, &bus), ()))
    .participant(Participant::new(&value_after("loser", 100, 2, &bus), ()))
    .first()
    .await
    .unwrap();
  assert_eq!(winner.value, 1);
  assert_eq!(settled_units(&drain(&mut rx)), vec!["winner"]);

  tokio::time::sleep(Duration::from_millis(200)).await;
  assert_eq!(settled_units(&drain(&mut rx)), vec!["loser"]);
}

#[tokio::test]
async fn first_over_nothing_fails() {
  let err = Aggregator::<u32>::new().first().await.unwrap_err();
  assert_eq!(err, AggregateError::NoParticipants);
}

#[tokio::test(start_paused = true)]
async fn participants_start_in_supplied_order() {
  let bus = EventBus::new(64);
  let mut rx = bus.subscribe();
  let units = ["a", "b", "c"];
  let aggregator: Aggregator<u32> = units
    .iter()
    .map(|name| Participant::new(&value_after(name, 5, 0, &bus), ()))
    .collect();
  assert_eq!(aggregator.len(), 3);
  aggregator.all().await.unwrap();

  let started: Vec<String> = drain(&mut rx)
    .into_iter()
    .filter(|e| matches!(e, UnitEvent::Started { .. }))
    .map(|e| e.unit().to_string())
    .collect();
  assert_eq!(started, vec!["a", "b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn run_dispatches_on_mode() {
  let bus = EventBus::default();
  let build = || {
    Aggregator::new()
      .participant(Participant::new(&value_after("x", 20, 1, &bus), ()))
      .participant(Participant::new(&value_after("y", 10, 2, &bus), ()))
  };

  let all = build().run(AggregateMode::All).await.unwrap();
  assert_eq!(all, AggregateResult::All(vec![1, 2]));
  assert_eq!(all.mode(), AggregateMode::All);

  match build().run(AggregateMode::First).await.unwrap() {
    AggregateResult::First(winner) => assert_eq!(winner.name, "y"),
    other => panic!("expected first result, got {:?}", other),
  }
}

#[tokio::test(start_paused = true)]
async fn from_future_participants() {
  let aggregator = Aggregator::new()
    .participant(Participant::from_future("ready", async {
      Ok::<_, OperationFailed>("now")
    }))
    .participant(Participant::from_future("later", async {
      tokio::time::sleep(Duration::from_millis(10)).await;
      Ok::<_, OperationFailed>("later")
    }));
  assert!(!aggregator.is_empty());
  assert_eq!(aggregator.all().await.unwrap(), vec!["now", "later"]);
}
