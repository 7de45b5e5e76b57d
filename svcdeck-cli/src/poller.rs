use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use svcdeck_core::backend::Backend;
use svcdeck_core::reducer::DashEvent;
use svcdeck_core::store::RequestSeqs;

use crate::bus::EventBus;
use crate::scope::ScopeToken;

/// Requests an out-of-cycle poll. Forcing never moves the regular schedule.
#[derive(Clone)]
pub struct PollHandle {
    force_tx: mpsc::UnboundedSender<()>,
}

impl PollHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (force_tx, force_rx) = mpsc::unbounded_channel();
        (Self { force_tx }, force_rx)
    }

    pub fn force(&self) {
        if self.force_tx.send(()).is_err() {
            debug!("poller gone, forced refresh skipped");
        }
    }
}

/// Fetches stats and the service list on a fixed period.
///
/// The two reads are independent: each gets its own sequence number and its
/// own task, so one failing or hanging never holds back the other.
#[derive(Clone)]
pub struct Poller {
    backend: Arc<dyn Backend>,
    bus: EventBus,
    seqs: Arc<RequestSeqs>,
    scope: ScopeToken,
}

impl Poller {
    pub fn new(
        backend: Arc<dyn Backend>,
        bus: EventBus,
        seqs: Arc<RequestSeqs>,
        scope: ScopeToken,
    ) -> Self {
        Self {
            backend,
            bus,
            seqs,
            scope,
        }
    }

    /// Issue one stats read and one services read.
    pub fn poll(&self) -> (JoinHandle<()>, JoinHandle<()>) {
        (self.fetch_stats(), self.fetch_services())
    }

    fn fetch_stats(&self) -> JoinHandle<()> {
        let seq = self.seqs.stats.next();
        let backend = self.backend.clone();
        let bus = self.bus.clone();
        let scope = self.scope.clone();
        tokio::spawn(async move {
            match scope.run(backend.stats()).await {
                Some(result) => bus.emit(DashEvent::StatsPolled { seq, result }),
                None => debug!(seq, "stats poll abandoned"),
            }
        })
    }

    fn fetch_services(&self) -> JoinHandle<()> {
        let seq = self.seqs.services.next();
        let backend = self.backend.clone();
        let bus = self.bus.clone();
        let scope = self.scope.clone();
        tokio::spawn(async move {
            match scope.run(backend.services()).await {
                Some(result) => bus.emit(DashEvent::ServicesPolled { seq, result }),
                None => debug!(seq, "services poll abandoned"),
            }
        })
    }

    pub async fn run(self, period: Duration, mut force_rx: mpsc::UnboundedReceiver<()>) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut scope = self.scope.clone();

        // The first tick completes immediately, which is the startup poll
        loop {
            tokio::select! {
                _ = scope.cancelled() => break,
                _ = interval.tick() => {
                    self.poll();
                }
                Some(()) = force_rx.recv() => {
                    debug!("forced poll");
                    self.poll();
                }
            }
        }
        info!("poller stopped");
    }
}

pub fn spawn_poller(poller: Poller, period: Duration) -> PollHandle {
    let (handle, force_rx) = PollHandle::channel();
    tokio::spawn(poller.run(period, force_rx));
    handle
}
