//! Keyboard state machine for the dashboard.
//!
//! Row controls are never acted on directly: a key picks a [`RowControl`]
//! and the current frame's [`TableView`] decides whether that control is
//! live for the selected row.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use svcdeck_core::filter::ServiceFilter;
use svcdeck_core::view::{Intent, RowControl, TableView};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Keystrokes go into the filter box
    Filter,
}

/// Something the loop has to do on behalf of a key press.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiCommand {
    Dispatch(Intent),
    RefreshLogs,
    CloseLogs,
    DismissNotice,
    Quit,
}

pub fn control_key(control: RowControl) -> char {
    match control {
        RowControl::Start => 's',
        RowControl::Stop => 'x',
        RowControl::Restart => 'r',
        RowControl::Logs => 'l',
    }
}

fn control_for_key(c: char) -> Option<RowControl> {
    RowControl::ALL.into_iter().find(|ctl| control_key(*ctl) == c)
}

#[derive(Debug, Default)]
pub struct UiState {
    pub filter: ServiceFilter,
    pub mode: InputMode,
    pub selected: usize,
    /// First visible line of the log popup
    pub log_scroll: u16,
    /// Stick to the newest line whenever fresh text arrives
    log_follow: bool,
    seen_log_revision: u64,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            log_follow: true,
            ..Self::default()
        }
    }

    pub fn clamp_selection(&mut self, table: &TableView) {
        let rows = table.rows().len();
        if rows == 0 {
            self.selected = 0;
        } else if self.selected >= rows {
            self.selected = rows - 1;
        }
    }

    /// Pin the popup to its last line when new text landed since last frame.
    pub fn sync_log_scroll(&mut self, revision: u64, line_count: usize, viewport: u16) {
        let bottom = line_count.saturating_sub(viewport as usize).min(u16::MAX as usize) as u16;
        if revision != self.seen_log_revision {
            self.seen_log_revision = revision;
            if self.log_follow {
                self.log_scroll = bottom;
            }
        }
        self.log_scroll = self.log_scroll.min(bottom);
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        table: &TableView,
        logs_open: bool,
    ) -> Option<UiCommand> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(UiCommand::Quit);
        }

        if logs_open {
            return self.handle_popup_key(key);
        }

        match self.mode {
            InputMode::Filter => {
                self.handle_filter_key(key);
                None
            }
            InputMode::Normal => self.handle_table_key(key, table),
        }
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('l') => {
                self.log_follow = true;
                Some(UiCommand::CloseLogs)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.log_follow = true;
                Some(UiCommand::RefreshLogs)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.log_follow = false;
                self.log_scroll = self.log_scroll.saturating_sub(1);
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.log_scroll = self.log_scroll.saturating_add(1);
                None
            }
            KeyCode::PageUp => {
                self.log_follow = false;
                self.log_scroll = self.log_scroll.saturating_sub(10);
                None
            }
            KeyCode::PageDown => {
                self.log_scroll = self.log_scroll.saturating_add(10);
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.log_follow = true;
                self.log_scroll = u16::MAX;
                None
            }
            _ => None,
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Esc => {
                self.filter.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => self.filter.pop(),
            KeyCode::Char(c) => self.filter.push(c),
            _ => return,
        }
        self.selected = 0;
    }

    fn handle_table_key(&mut self, key: KeyEvent, table: &TableView) -> Option<UiCommand> {
        match key.code {
            KeyCode::Char('q') => Some(UiCommand::Quit),
            KeyCode::Char('/') => {
                self.mode = InputMode::Filter;
                None
            }
            KeyCode::Esc if !self.filter.is_empty() => {
                self.filter.clear();
                self.selected = 0;
                None
            }
            KeyCode::Esc => Some(UiCommand::DismissNotice),
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < table.rows().len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.selected = 0;
                None
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = table.rows().len().saturating_sub(1);
                None
            }
            KeyCode::Enter => table
                .intent_at(self.selected, RowControl::Logs)
                .map(UiCommand::Dispatch),
            KeyCode::Char(c) => {
                let control = control_for_key(c)?;
                let intent = table.intent_at(self.selected, control)?;
                if matches!(intent, Intent::OpenLogs { .. }) {
                    self.log_follow = true;
                }
                Some(UiCommand::Dispatch(intent))
            }
            _ => None,
        }
    }
}
