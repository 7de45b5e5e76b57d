use std::time::{Duration, Instant};

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(5000);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoticeKind {
    #[default]
    Info,
    Success,
    Error,
}

impl NoticeKind {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Success => "✔",
            Self::Error => "⚠",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "OK",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub shown_at: Instant,
}

/// Holds at most one transient message. A new one replaces the old.
#[derive(Clone, Debug)]
pub struct Notifier {
    current: Option<Notice>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn show(&mut self, message: impl Into<String>, kind: NoticeKind, now: Instant) {
        self.current = Some(Notice {
            message: message.into(),
            kind,
            shown_at: now,
        });
    }

    pub fn visible(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.shown_at) < self.ttl)
    }

    /// Last notice shown, expired or not.
    pub fn last(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}
