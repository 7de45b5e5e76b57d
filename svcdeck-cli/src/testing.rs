//! Scripted backend and wiring shared by the async job tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use svcdeck_core::backend::{ApiError, Backend};
use svcdeck_core::model::{ControlAction, LogBundle, Service, SystemStats};
use svcdeck_core::state::DashboardState;
use svcdeck_core::store::RequestSeqs;

use crate::bus::{EventBus, spawn_reducer};
use crate::dispatcher::{ActionDispatcher, LogFetcher};
use crate::poller::{PollHandle, Poller};
use crate::scope::ViewScope;

type Scripted<T> = Mutex<VecDeque<(Duration, Result<T, ApiError>)>>;

/// Backend whose replies are queued up front. Unscripted calls succeed with
/// a neutral default.
#[derive(Default)]
pub struct ScriptedBackend {
    stats: Scripted<SystemStats>,
    services: Scripted<Vec<Service>>,
    control: Scripted<String>,
    logs: Scripted<String>,
    stats_calls: AtomicUsize,
    services_calls: AtomicUsize,
    control_calls: AtomicUsize,
    logs_calls: AtomicUsize,
}

fn push<T>(queue: &Scripted<T>, delay: Duration, reply: Result<T, ApiError>) {
    queue.lock().unwrap().push_back((delay, reply));
}

async fn pop<T>(queue: &Scripted<T>, fallback: impl FnOnce() -> T) -> Result<T, ApiError> {
    let next = queue.lock().unwrap().pop_front();
    match next {
        Some((delay, reply)) => {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            reply
        }
        None => Ok(fallback()),
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_stats(&self, reply: Result<SystemStats, ApiError>) {
        push(&self.stats, Duration::ZERO, reply);
    }

    pub fn push_stats_after(&self, delay: Duration, reply: Result<SystemStats, ApiError>) {
        push(&self.stats, delay, reply);
    }

    pub fn push_services(&self, services: Vec<Service>) {
        push(&self.services, Duration::ZERO, Ok(services));
    }

    pub fn push_services_after(&self, delay: Duration, services: Vec<Service>) {
        push(&self.services, delay, Ok(services));
    }

    pub fn push_control(&self, reply: Result<String, ApiError>) {
        push(&self.control, Duration::ZERO, reply);
    }

    pub fn push_logs(&self, reply: Result<String, ApiError>) {
        push(&self.logs, Duration::ZERO, reply);
    }

    pub fn push_logs_after(&self, delay: Duration, reply: Result<String, ApiError>) {
        push(&self.logs, delay, reply);
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    pub fn services_calls(&self) -> usize {
        self.services_calls.load(Ordering::SeqCst)
    }

    pub fn control_calls(&self) -> usize {
        self.control_calls.load(Ordering::SeqCst)
    }

    pub fn logs_calls(&self) -> usize {
        self.logs_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn stats(&self) -> Result<SystemStats, ApiError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.stats, || SystemStats::new(10.0, 20.0)).await
    }

    async fn services(&self) -> Result<Vec<Service>, ApiError> {
        self.services_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.services, Vec::new).await
    }

    async fn control(&self, _name: &str, _action: ControlAction) -> Result<String, ApiError> {
        self.control_calls.fetch_add(1, Ordering::SeqCst);
        pop(&self.control, || "ok".to_string()).await
    }

    async fn logs(&self, name: &str) -> Result<LogBundle, ApiError> {
        self.logs_calls.fetch_add(1, Ordering::SeqCst);
        let text = pop(&self.logs, String::new).await?;
        Ok(LogBundle {
            service_name: name.to_string(),
            text,
        })
    }
}

/// Bus, reducer and scope wired the same way the TUI wires them.
pub struct Rig {
    pub backend: Arc<dyn Backend>,
    pub bus: EventBus,
    pub state: Arc<RwLock<DashboardState>>,
    pub seqs: Arc<RequestSeqs>,
    pub scope: ViewScope,
}

impl Rig {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let bus = EventBus::new();
        let state = Arc::new(RwLock::new(DashboardState::default()));
        spawn_reducer(&bus, state.clone());
        Self {
            backend,
            bus,
            state,
            seqs: Arc::new(RequestSeqs::default()),
            scope: ViewScope::new(),
        }
    }

    pub fn poller(&self) -> Poller {
        Poller::new(
            self.backend.clone(),
            self.bus.clone(),
            self.seqs.clone(),
            self.scope.token(),
        )
    }

    pub fn dispatcher(&self, poll: PollHandle) -> ActionDispatcher {
        ActionDispatcher::new(self.backend.clone(), self.bus.clone(), poll, self.scope.token())
    }

    pub fn log_fetcher(&self) -> LogFetcher {
        LogFetcher::new(
            self.backend.clone(),
            self.bus.clone(),
            self.state.clone(),
            self.seqs.clone(),
            self.scope.token(),
        )
    }
}

/// Let spawned tasks and the reducer run without moving the paused clock.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
