use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::{RwLock, broadcast};
use tracing::warn;

use svcdeck_core::reducer::{DashEvent, EventEnvelope, reduce};
use svcdeck_core::state::DashboardState;

const BUS_CAPACITY: usize = 1_000;

/// Broadcast channel every job posts its results on.
///
/// Envelope ids are shared across all senders so the reducer sees one
/// increasing sequence regardless of which task emitted the event.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn emit(&self, event: DashEvent) {
        let env = EventEnvelope {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            at: Instant::now(),
            event,
        };
        // No subscribers just means nobody is rendering anymore
        let _ = self.tx.send(env);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply every event on the bus to the shared dashboard state.
pub fn spawn_reducer(bus: &EventBus, state: Arc<RwLock<DashboardState>>) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(env) => {
                    let mut s = state.write().await;
                    reduce(&mut s, &env);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "reducer lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
