//! Explicitly owned publish/subscribe bus for unit lifecycle events.
//!
//! There is no process-wide emitter: whoever wants notifications creates an
//! [EventBus] and hands clones of it to the units that should publish.

use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::trace;

use crate::types::UnitEvent;

/// Default number of events buffered for slow subscribers.
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

/// Broadcasts [UnitEvent]s to every subscriber. Clones share one channel.
#[derive(Debug, Clone)]
pub struct EventBus {
  tx: broadcast::Sender<UnitEvent>,
}

impl EventBus {
  /// Creates a bus buffering up to `buffer_size` events per subscriber.
  pub fn new(buffer_size: usize) -> Self {
    let (tx, _rx) = broadcast::channel(buffer_size.max(1));
    Self { tx }
  }

  /// Sends an event to all current subscribers.
  ///
  /// Returns how many subscribers received it; zero when nobody listens.
  pub fn publish(&self, event: UnitEvent) -> usize {
    trace!(?event, "publishing unit event");
    self.tx.send(event).unwrap_or_default()
  }

  /// Subscribes to events published from now on.
  pub fn subscribe(&self) -> broadcast::Receiver<UnitEvent> {
    self.tx.subscribe()
  }

  /// Subscribes as a stream. A subscriber that lags behind skips the lost events.
  pub fn stream(&self) -> impl Stream<Item = UnitEvent> + Send + 'static {
    BroadcastStream::new(self.tx.subscribe()).filter_map(|item| async move { item.ok() })
  }

  pub fn receiver_count(&self) -> usize {
    self.tx.receiver_count()
  }
}

impl Default for EventBus {
  fn default() -> Self {
    Self::new(DEFAULT_EVENT_BUFFER)
  }
}

/// Drains every event already buffered on `rx` without waiting.
pub fn drain(rx: &mut broadcast::Receiver<UnitEvent>) -> Vec<UnitEvent> {
  let mut events = Vec::new();
  loop {
    match rx.try_recv() {
      Ok(event) => events.push(event),
      Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
      Err(_) => return events,
    }
  }
}
