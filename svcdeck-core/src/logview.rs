use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::ServiceName;
use crate::store::Seq;

pub const LOADING_PLACEHOLDER: &str = "Loading logs...";
pub const ERROR_PLACEHOLDER: &str = "Error loading logs.";

/// How the log popup re-fetches while it is open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRefreshPolicy {
    /// Only on explicit request
    #[default]
    Manual,
    /// Re-fetch every N milliseconds while the popup is open
    Every(u64),
}

impl LogRefreshPolicy {
    pub fn period(&self) -> Option<Duration> {
        match self {
            Self::Manual => None,
            Self::Every(ms) => Some(Duration::from_millis(*ms)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LogContent {
    #[default]
    Empty,
    Loading,
    Loaded(String),
    Failed,
}

impl LogContent {
    pub fn text(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Loading => LOADING_PLACEHOLDER,
            Self::Loaded(text) => text,
            Self::Failed => ERROR_PLACEHOLDER,
        }
    }
}

/// State of the log popup for the selected service.
#[derive(Clone, Debug, Default)]
pub struct LogView {
    selected: Option<ServiceName>,
    open: bool,
    content: LogContent,
    latest_request: Seq,
    keep_selection_on_close: bool,
    /// Bumped each time fresh text lands; the UI pins to the bottom on change
    revision: u64,
}

impl LogView {
    pub fn new(keep_selection_on_close: bool) -> Self {
        Self {
            keep_selection_on_close,
            ..Self::default()
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn content(&self) -> &LogContent {
        &self.content
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn open(&mut self, name: ServiceName, seq: Seq) {
        self.selected = Some(name);
        self.open = true;
        self.content = LogContent::Loading;
        self.latest_request = self.latest_request.max(seq);
    }

    /// Record a re-fetch for the current selection. None when nothing is selected.
    pub fn begin_refresh(&mut self, seq: Seq) -> Option<&str> {
        let name = self.selected.as_deref()?;
        self.latest_request = self.latest_request.max(seq);
        Some(name)
    }

    /// Apply a fetch result if it belongs to the current selection and is the
    /// most recent request. Returns whether anything changed.
    pub fn apply(&mut self, name: &str, seq: Seq, result: Result<String, ()>) -> bool {
        if self.selected.as_deref() != Some(name) || seq < self.latest_request {
            return false;
        }
        self.content = match result {
            Ok(text) => LogContent::Loaded(text),
            Err(()) => LogContent::Failed,
        };
        self.revision += 1;
        true
    }

    pub fn close(&mut self) {
        self.open = false;
        if !self.keep_selection_on_close {
            self.selected = None;
            self.content = LogContent::Empty;
        }
    }
}
