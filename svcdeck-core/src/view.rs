//! Table view model
//!
//! Turns the stored services plus the active filter into the rows drawn on
//! screen, together with the per-row control table that input handling
//! resolves through. Nothing here touches the terminal.

use std::collections::BTreeMap;

use crate::filter::ServiceFilter;
use crate::model::{ControlAction, Service, ServiceName, ServiceStatus};

pub const EMPTY_PLACEHOLDER: &str = "No services found.";

/// Status badge shown in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Badge {
    Running,
    Failed,
    Stopped,
}

impl Badge {
    pub fn for_status(status: ServiceStatus) -> Self {
        match status {
            ServiceStatus::Running => Self::Running,
            ServiceStatus::Failed => Self::Failed,
            ServiceStatus::Stopped => Self::Stopped,
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Running => "✔",
            Self::Failed => "✖",
            Self::Stopped => "■",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Failed => "FAILED",
            Self::Stopped => "STOPPED",
        }
    }
}

/// The four buttons every row carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowControl {
    Start,
    Stop,
    Restart,
    Logs,
}

impl RowControl {
    pub const ALL: [RowControl; 4] = [Self::Start, Self::Stop, Self::Restart, Self::Logs];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Logs => "logs",
        }
    }
}

/// What activating an enabled control asks the dashboard to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Control {
        name: ServiceName,
        action: ControlAction,
    },
    OpenLogs {
        name: ServiceName,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlButton {
    pub control: RowControl,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceRow {
    pub name: ServiceName,
    pub description: String,
    pub status: ServiceStatus,
    pub badge: Badge,
    pub controls: [ControlButton; 4],
}

impl ServiceRow {
    pub fn from_service(service: &Service) -> Self {
        let running = service.status.is_running();
        let controls = RowControl::ALL.map(|control| ControlButton {
            control,
            enabled: match control {
                RowControl::Start => !running,
                RowControl::Stop => running,
                RowControl::Restart | RowControl::Logs => true,
            },
        });

        Self {
            name: service.name.clone(),
            description: service.description.clone(),
            status: service.status,
            badge: Badge::for_status(service.status),
            controls,
        }
    }

    pub fn is_enabled(&self, control: RowControl) -> bool {
        self.controls
            .iter()
            .any(|b| b.control == control && b.enabled)
    }

    fn intent(&self, control: RowControl) -> Intent {
        let name = self.name.clone();
        match control {
            RowControl::Start => Intent::Control {
                name,
                action: ControlAction::Start,
            },
            RowControl::Stop => Intent::Control {
                name,
                action: ControlAction::Stop,
            },
            RowControl::Restart => Intent::Control {
                name,
                action: ControlAction::Restart,
            },
            RowControl::Logs => Intent::OpenLogs { name },
        }
    }
}

/// Handlers for one render pass, keyed by row identity and control.
///
/// Disabled controls have no entry, so they cannot be triggered.
#[derive(Clone, Debug, Default)]
pub struct HandlerTable {
    entries: BTreeMap<(ServiceName, RowControl), Intent>,
}

impl HandlerTable {
    fn register(&mut self, row: &ServiceRow) {
        for button in row.controls.iter().filter(|b| b.enabled) {
            self.entries
                .insert((row.name.clone(), button.control), row.intent(button.control));
        }
    }

    pub fn resolve(&self, name: &str, control: RowControl) -> Option<&Intent> {
        self.entries.get(&(name.to_string(), control))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The full row set for one frame.
#[derive(Clone, Debug)]
pub struct TableView {
    rows: Vec<ServiceRow>,
    handlers: HandlerTable,
}

impl TableView {
    pub fn rows(&self) -> &[ServiceRow] {
        &self.rows
    }

    pub fn is_placeholder(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(EMPTY_PLACEHOLDER)
    }

    /// Number of table lines drawn, counting the placeholder as one.
    pub fn line_count(&self) -> usize {
        self.rows.len().max(1)
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    /// Resolve a control on the row at `index`, if that control is enabled.
    pub fn intent_at(&self, index: usize, control: RowControl) -> Option<Intent> {
        let row = self.rows.get(index)?;
        self.handlers.resolve(&row.name, control).cloned()
    }
}

/// Build the table for the current snapshot and filter.
pub fn render_table(services: &[Service], filter: &ServiceFilter) -> TableView {
    let rows: Vec<ServiceRow> = filter.apply(services).map(ServiceRow::from_service).collect();

    let mut handlers = HandlerTable::default();
    for row in &rows {
        handlers.register(row);
    }

    TableView { rows, handlers }
}
