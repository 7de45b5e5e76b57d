use std::time::Instant;

use tracing::{debug, info, warn};

use crate::backend::ApiError;
use crate::model::{ControlAction, Service, ServiceCounts, ServiceName, SystemStats};
use crate::notice::NoticeKind;
use crate::state::DashboardState;
use crate::store::Seq;

#[derive(Clone, Debug)]
pub enum DashEvent {
    StatsPolled {
        seq: Seq,
        result: Result<SystemStats, ApiError>,
    },
    ServicesPolled {
        seq: Seq,
        result: Result<Vec<Service>, ApiError>,
    },
    ControlSent {
        name: ServiceName,
        action: ControlAction,
    },
    ControlFinished {
        name: ServiceName,
        action: ControlAction,
        result: Result<String, ApiError>,
    },
    LogsOpened {
        name: ServiceName,
        seq: Seq,
    },
    LogsRefreshing {
        name: ServiceName,
        seq: Seq,
    },
    LogsFetched {
        name: ServiceName,
        seq: Seq,
        result: Result<String, ApiError>,
    },
    LogsClosed,
    ClockTick {
        text: String,
    },
    NoticeDismissed,
    TornDown,
}

#[derive(Clone, Debug)]
pub struct EventEnvelope {
    pub id: u64,
    pub at: Instant,
    pub event: DashEvent,
}

pub fn reduce(state: &mut DashboardState, env: &EventEnvelope) {
    if state.torn_down {
        debug!(id = env.id, "view torn down, dropping event");
        return;
    }
    state.last_event_id = env.id;

    match &env.event {
        DashEvent::StatsPolled { seq, result } => match result {
            Ok(stats) => {
                if !state.store.replace_stats(*seq, stats.clone()) {
                    debug!(seq, applied = state.store.stats_seq(), "dropping stale stats response");
                }
            }
            Err(e) => warn!(seq, error = %e, "error fetching stats"),
        },
        DashEvent::ServicesPolled { seq, result } => match result {
            Ok(services) => {
                if state.store.replace_services(*seq, services.clone()) {
                    state.services_updated_at = Some(env.at);
                    state
                        .counters
                        .retarget(ServiceCounts::from_services(state.store.services()), env.at);
                } else {
                    debug!(
                        seq,
                        applied = state.store.services_seq(),
                        "dropping stale services response"
                    );
                }
            }
            Err(e) => warn!(seq, error = %e, "error fetching services"),
        },
        DashEvent::ControlSent { name, action } => {
            state.notifier.show(
                format!("Sending {} signal to {}...", action, name),
                NoticeKind::Info,
                env.at,
            );
        }
        DashEvent::ControlFinished {
            name,
            action,
            result,
        } => match result {
            Ok(message) => {
                info!(service = %name, %action, %message, "control action acknowledged");
                state
                    .notifier
                    .show(format!("{}: {}", name, message), NoticeKind::Success, env.at);
            }
            Err(e) => {
                info!(service = %name, %action, error = %e, "control action failed");
                state.notifier.show(e.notice_text(), NoticeKind::Error, env.at);
            }
        },
        DashEvent::LogsOpened { name, seq } => state.logs.open(name.clone(), *seq),
        DashEvent::LogsRefreshing { name, seq } => {
            if state.logs.selected() == Some(name.as_str()) {
                state.logs.begin_refresh(*seq);
            }
        }
        DashEvent::LogsFetched { name, seq, result } => {
            if let Err(e) = result {
                debug!(service = %name, error = %e, "error loading logs");
            }
            let result = result.clone().map_err(|_| ());
            if !state.logs.apply(name, *seq, result) {
                debug!(service = %name, seq, "dropping log response for stale selection");
            }
        }
        DashEvent::LogsClosed => state.logs.close(),
        DashEvent::ClockTick { text } => state.clock = text.clone(),
        DashEvent::NoticeDismissed => state.notifier.dismiss(),
        DashEvent::TornDown => state.torn_down = true,
    }
}
