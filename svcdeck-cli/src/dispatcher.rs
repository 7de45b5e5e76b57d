use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use svcdeck_core::backend::Backend;
use svcdeck_core::model::{ControlAction, ServiceName};
use svcdeck_core::reducer::DashEvent;
use svcdeck_core::state::DashboardState;
use svcdeck_core::store::{RequestSeqs, Seq};

use crate::bus::EventBus;
use crate::poller::PollHandle;
use crate::scope::ScopeToken;

/// Sends control commands and reports their outcome.
///
/// An acknowledged action forces an immediate poll; a rejected or failed
/// one leaves the store alone.
#[derive(Clone)]
pub struct ActionDispatcher {
    backend: Arc<dyn Backend>,
    bus: EventBus,
    poll: PollHandle,
    scope: ScopeToken,
}

impl ActionDispatcher {
    pub fn new(
        backend: Arc<dyn Backend>,
        bus: EventBus,
        poll: PollHandle,
        scope: ScopeToken,
    ) -> Self {
        Self {
            backend,
            bus,
            poll,
            scope,
        }
    }

    pub fn control_service(&self, name: ServiceName, action: ControlAction) -> JoinHandle<()> {
        info!(service = %name, %action, "sending control action");
        self.bus.emit(DashEvent::ControlSent {
            name: name.clone(),
            action,
        });

        let backend = self.backend.clone();
        let bus = self.bus.clone();
        let poll = self.poll.clone();
        let scope = self.scope.clone();
        tokio::spawn(async move {
            let Some(result) = scope.run(backend.control(&name, action)).await else {
                debug!(service = %name, %action, "control result abandoned");
                return;
            };
            let acknowledged = result.is_ok();
            bus.emit(DashEvent::ControlFinished {
                name,
                action,
                result,
            });
            if acknowledged {
                poll.force();
            }
        })
    }
}

/// Loads log text for the service selected in the log popup.
#[derive(Clone)]
pub struct LogFetcher {
    backend: Arc<dyn Backend>,
    bus: EventBus,
    state: Arc<RwLock<DashboardState>>,
    seqs: Arc<RequestSeqs>,
    scope: ScopeToken,
}

impl LogFetcher {
    pub fn new(
        backend: Arc<dyn Backend>,
        bus: EventBus,
        state: Arc<RwLock<DashboardState>>,
        seqs: Arc<RequestSeqs>,
        scope: ScopeToken,
    ) -> Self {
        Self {
            backend,
            bus,
            state,
            seqs,
            scope,
        }
    }

    pub fn open_logs(&self, name: ServiceName) -> JoinHandle<()> {
        let seq = self.seqs.logs.next();
        self.bus.emit(DashEvent::LogsOpened {
            name: name.clone(),
            seq,
        });
        self.fetch(name, seq)
    }

    /// Re-fetch for whatever is selected right now. No-op without a selection.
    pub async fn refresh_current_logs(&self) -> Option<JoinHandle<()>> {
        let name = self.state.read().await.logs.selected()?.to_string();
        let seq = self.seqs.logs.next();
        self.bus.emit(DashEvent::LogsRefreshing {
            name: name.clone(),
            seq,
        });
        Some(self.fetch(name, seq))
    }

    pub fn close_logs(&self) {
        self.bus.emit(DashEvent::LogsClosed);
    }

    fn fetch(&self, name: ServiceName, seq: Seq) -> JoinHandle<()> {
        let backend = self.backend.clone();
        let bus = self.bus.clone();
        let scope = self.scope.clone();
        tokio::spawn(async move {
            let Some(result) = scope.run(backend.logs(&name)).await else {
                debug!(service = %name, seq, "log fetch abandoned");
                return;
            };
            bus.emit(DashEvent::LogsFetched {
                name,
                seq,
                result: result.map(|bundle| bundle.text),
            });
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::testing::{Rig, ScriptedBackend, settle};
    use svcdeck_core::backend::ApiError;
    use svcdeck_core::logview::{ERROR_PLACEHOLDER, LOADING_PLACEHOLDER, LogContent};
    use svcdeck_core::model::{Service, ServiceStatus};
    use svcdeck_core::notice::NoticeKind;

    async fn last_notice(rig: &Rig) -> (String, NoticeKind) {
        let state = rig.state.read().await;
        let notice = state.notifier.last().expect("a notice");
        (notice.message.clone(), notice.kind)
    }

    #[tokio::test]
    async fn test_acknowledged_action_forces_refresh() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_control(Ok("restarted".into()));
        let rig = Rig::new(backend.clone());
        let (poll, mut force_rx) = PollHandle::channel();

        rig.dispatcher(poll)
            .control_service("nginx".into(), ControlAction::Restart)
            .await
            .unwrap();
        settle().await;

        assert!(force_rx.try_recv().is_ok());
        assert_eq!(backend.control_calls(), 1);
        assert_eq!(
            last_notice(&rig).await,
            ("nginx: restarted".to_string(), NoticeKind::Success)
        );
    }

    #[tokio::test]
    async fn test_rejected_action_does_not_refresh() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_control(Err(ApiError::Rejected {
            status: 500,
            message: "permission denied".into(),
        }));
        let rig = Rig::new(backend.clone());
        {
            let mut state = rig.state.write().await;
            state
                .store
                .replace_services(1, vec![Service::new("nginx", "", ServiceStatus::Running)]);
        }
        let (poll, mut force_rx) = PollHandle::channel();

        rig.dispatcher(poll)
            .control_service("nginx".into(), ControlAction::Stop)
            .await
            .unwrap();
        settle().await;

        assert!(force_rx.try_recv().is_err());
        assert_eq!(backend.control_calls(), 1);
        let (message, kind) = last_notice(&rig).await;
        assert!(message.contains("permission denied"));
        assert_eq!(kind, NoticeKind::Error);
        assert_eq!(
            rig.state.read().await.store.services()[0].status,
            ServiceStatus::Running
        );
    }

    #[tokio::test]
    async fn test_transport_failure_shows_connection_error() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_control(Err(ApiError::Transport("connection refused".into())));
        let rig = Rig::new(backend.clone());
        let (poll, mut force_rx) = PollHandle::channel();

        rig.dispatcher(poll)
            .control_service("nginx".into(), ControlAction::Start)
            .await
            .unwrap();
        settle().await;

        assert!(force_rx.try_recv().is_err());
        assert_eq!(
            last_notice(&rig).await,
            (
                "Connection error: connection refused".to_string(),
                NoticeKind::Error
            )
        );
    }

    #[tokio::test]
    async fn test_open_logs_shows_loading_then_text() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_logs(Ok("line one\nline two".into()));
        let rig = Rig::new(backend.clone());
        let fetcher = rig.log_fetcher();

        let mut rx = rig.bus.subscribe();
        let handle = fetcher.open_logs("nginx".into());
        // Opening posts the selection before anything is fetched
        assert!(matches!(
            rx.recv().await.unwrap().event,
            DashEvent::LogsOpened { .. }
        ));
        handle.await.unwrap();
        settle().await;

        let state = rig.state.read().await;
        assert_eq!(state.logs.selected(), Some("nginx"));
        assert_eq!(
            state.logs.content(),
            &LogContent::Loaded("line one\nline two".into())
        );
        assert_ne!(state.logs.content().text(), LOADING_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_failed_log_fetch_stays_in_popup() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_logs(Err(ApiError::Transport("reset".into())));
        let rig = Rig::new(backend.clone());

        rig.log_fetcher().open_logs("nginx".into()).await.unwrap();
        settle().await;

        let state = rig.state.read().await;
        assert_eq!(state.logs.content().text(), ERROR_PLACEHOLDER);
        assert!(state.notifier.last().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_logs_for_previous_selection_are_dropped() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_logs_after(Duration::from_secs(2), Ok("nginx logs".into()));
        backend.push_logs(Ok("redis logs".into()));
        let rig = Rig::new(backend.clone());
        let fetcher = rig.log_fetcher();

        let slow = fetcher.open_logs("nginx".into());
        settle().await;
        fetcher.close_logs();
        fetcher.open_logs("redis".into()).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        slow.await.unwrap();
        settle().await;

        let state = rig.state.read().await;
        assert_eq!(state.logs.selected(), Some("redis"));
        assert_eq!(state.logs.content().text(), "redis logs");
    }

    #[tokio::test]
    async fn test_refresh_without_selection_is_noop() {
        let backend = Arc::new(ScriptedBackend::new());
        let rig = Rig::new(backend.clone());

        assert!(rig.log_fetcher().refresh_current_logs().await.is_none());
        assert_eq!(backend.logs_calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_refetches_current_selection() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_logs(Ok("first".into()));
        backend.push_logs(Ok("second".into()));
        let rig = Rig::new(backend.clone());
        let fetcher = rig.log_fetcher();

        fetcher.open_logs("nginx".into()).await.unwrap();
        settle().await;
        fetcher.refresh_current_logs().await.unwrap().await.unwrap();
        settle().await;

        assert_eq!(backend.logs_calls(), 2);
        assert_eq!(rig.state.read().await.logs.content().text(), "second");
    }
}
