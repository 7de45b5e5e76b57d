use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;

use svcdeck_core::clock::local_clock;
use svcdeck_core::reducer::DashEvent;
use svcdeck_core::state::DashboardState;

use crate::bus::EventBus;
use crate::dispatcher::LogFetcher;
use crate::scope::ScopeToken;

/// Repaint the header clock once per period until the scope ends.
pub fn spawn_clock(bus: EventBus, period: Duration, mut scope: ScopeToken) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = scope.cancelled() => break,
                _ = interval.tick() => bus.emit(DashEvent::ClockTick { text: local_clock() }),
            }
        }
    });
}

/// Re-fetch the selected service's logs while the popup stays open.
pub fn spawn_log_tail(
    fetcher: LogFetcher,
    state: Arc<RwLock<DashboardState>>,
    period: Duration,
    mut scope: ScopeToken,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Opening the popup already fetched once
        interval.tick().await;
        loop {
            tokio::select! {
                _ = scope.cancelled() => break,
                _ = interval.tick() => {
                    let open = state.read().await.logs.is_open();
                    if open {
                        fetcher.refresh_current_logs().await;
                    }
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Rig, ScriptedBackend, settle};

    #[tokio::test(start_paused = true)]
    async fn test_clock_ticks_until_cancelled() {
        let rig = Rig::new(Arc::new(ScriptedBackend::new()));
        spawn_clock(rig.bus.clone(), Duration::from_secs(1), rig.scope.token());
        settle().await;
        assert_eq!(rig.state.read().await.clock.len(), "00:00:00".len());

        rig.scope.cancel();
        settle().await;
        let id = rig.state.read().await.last_event_id;
        tokio::time::advance(Duration::from_secs(3)).await;
        settle().await;
        assert_eq!(rig.state.read().await.last_event_id, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_log_tail_only_refreshes_open_popup() {
        let backend = Arc::new(ScriptedBackend::new());
        let rig = Rig::new(backend.clone());
        let fetcher = rig.log_fetcher();
        spawn_log_tail(
            fetcher.clone(),
            rig.state.clone(),
            Duration::from_secs(2),
            rig.scope.token(),
        );
        settle().await;

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(backend.logs_calls(), 0);

        fetcher.open_logs("nginx".into()).await.unwrap();
        settle().await;
        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(backend.logs_calls(), 2);

        fetcher.close_logs();
        settle().await;
        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(backend.logs_calls(), 2);
    }
}
