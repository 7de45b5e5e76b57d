//! Colour palette and style helpers for the dashboard.

use ratatui::style::{Color, Modifier, Style};

use svcdeck_core::notice::NoticeKind;
use svcdeck_core::view::Badge;

/// Color palette tokens for the theme
#[derive(Clone, Debug)]
pub struct Palette {
    pub panel_border: Color,
    pub text: Color,
    pub text_dim: Color,
    /// Disabled controls, placeholders
    pub text_muted: Color,
    pub accent: Color,
    pub success: Color,
    pub error: Color,
    pub info: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub key_hint: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            panel_border: Color::Rgb(60, 60, 60),
            text: Color::Rgb(212, 212, 212),
            text_dim: Color::Rgb(150, 150, 150),
            text_muted: Color::Rgb(100, 100, 100),
            accent: Color::Rgb(79, 193, 255),      // Light blue
            success: Color::Rgb(78, 201, 176),     // Teal green
            error: Color::Rgb(244, 135, 113),      // Coral red
            info: Color::Rgb(156, 220, 254),       // Light cyan
            selection_bg: Color::Rgb(38, 79, 120), // Dark blue
            selection_fg: Color::White,
            key_hint: Color::Rgb(206, 145, 120), // Soft orange
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    pub fn badge_style(&self, badge: Badge) -> Style {
        let color = match badge {
            Badge::Running => self.palette.success,
            Badge::Failed => self.palette.error,
            Badge::Stopped => self.palette.text_muted,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn notice_style(&self, kind: NoticeKind) -> Style {
        let color = match kind {
            NoticeKind::Info => self.palette.info,
            NoticeKind::Success => self.palette.success,
            NoticeKind::Error => self.palette.error,
        };
        Style::default().fg(color)
    }

    pub fn control_style(&self, enabled: bool) -> Style {
        if enabled {
            Style::default().fg(self.palette.key_hint)
        } else {
            Style::default()
                .fg(self.palette.text_muted)
                .add_modifier(Modifier::DIM)
        }
    }

    /// Gauge colour climbs from green to red with load
    pub fn load_style(&self, ratio: f64) -> Style {
        let color = if ratio >= 0.85 {
            self.palette.error
        } else if ratio >= 0.6 {
            self.palette.key_hint
        } else {
            self.palette.success
        };
        Style::default().fg(color)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.palette.panel_border)
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.palette.selection_bg)
            .fg(self.palette.selection_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.palette.text)
    }

    pub fn text_dim_style(&self) -> Style {
        Style::default().fg(self.palette.text_dim)
    }

    pub fn text_muted_style(&self) -> Style {
        Style::default().fg(self.palette.text_muted)
    }

    pub fn accent_bold_style(&self) -> Style {
        Style::default()
            .fg(self.palette.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn key_hint_style(&self) -> Style {
        Style::default().fg(self.palette.key_hint)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.palette.text)
            .add_modifier(Modifier::BOLD)
    }
}

static DEFAULT_THEME: std::sync::OnceLock<Theme> = std::sync::OnceLock::new();

pub fn theme() -> &'static Theme {
    DEFAULT_THEME.get_or_init(Theme::default)
}

/// Shorthands over the default theme
pub mod styles {
    use super::*;

    pub fn badge(badge: Badge) -> Style {
        theme().badge_style(badge)
    }

    pub fn notice(kind: NoticeKind) -> Style {
        theme().notice_style(kind)
    }

    pub fn control(enabled: bool) -> Style {
        theme().control_style(enabled)
    }

    pub fn load(ratio: f64) -> Style {
        theme().load_style(ratio)
    }

    pub fn border() -> Style {
        theme().border_style()
    }

    pub fn selection() -> Style {
        theme().selection_style()
    }

    pub fn text() -> Style {
        theme().text_style()
    }

    pub fn text_dim() -> Style {
        theme().text_dim_style()
    }

    pub fn text_muted() -> Style {
        theme().text_muted_style()
    }

    pub fn accent_bold() -> Style {
        theme().accent_bold_style()
    }

    pub fn key_hint() -> Style {
        theme().key_hint_style()
    }

    pub fn title() -> Style {
        theme().title_style()
    }
}
