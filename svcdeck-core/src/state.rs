use std::time::Instant;

use crate::config::DeckConfig;
use crate::counter::CounterSet;
use crate::logview::LogView;
use crate::notice::Notifier;
use crate::store::ServiceStore;

/// Everything the dashboard view renders from.
///
/// Owned by the top-level view and only mutated by the reducer.
#[derive(Clone, Debug)]
pub struct DashboardState {
    pub store: ServiceStore,
    pub counters: CounterSet,
    pub notifier: Notifier,
    pub logs: LogView,
    /// Last clock text rendered by the clock job
    pub clock: String,
    /// When the services slice was last replaced
    pub services_updated_at: Option<Instant>,
    pub last_event_id: u64,
    /// Set once the view is gone; late results are ignored from then on
    pub torn_down: bool,
}

impl DashboardState {
    pub fn new(config: &DeckConfig) -> Self {
        Self {
            store: ServiceStore::new(),
            counters: CounterSet::new(config.counter_transition()),
            notifier: Notifier::new(config.notice_ttl()),
            logs: LogView::new(config.keep_log_selection_on_close),
            clock: String::new(),
            services_updated_at: None,
            last_event_id: 0,
            torn_down: false,
        }
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(&DeckConfig::default())
    }
}
