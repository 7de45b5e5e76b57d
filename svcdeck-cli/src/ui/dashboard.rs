use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState},
};

use svcdeck_core::clock::format_uptime;
use svcdeck_core::model::{SystemStats, format_percent};
use svcdeck_core::state::DashboardState;
use svcdeck_core::view::{Badge, RowControl, ServiceRow, TableView};

use super::app::{InputMode, UiState, control_key};
use super::theme::styles;

/// Frame-independent facts for the header.
pub struct HeaderInfo<'a> {
    pub backend: &'a str,
    pub now: Instant,
    pub now_unix: u64,
}

pub fn draw(
    f: &mut Frame,
    snapshot: &DashboardState,
    table: &TableView,
    ui: &mut UiState,
    header: &HeaderInfo,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, chunks[0], snapshot, header);
    draw_stats(f, chunks[1], snapshot);
    draw_filter(f, chunks[2], ui);
    draw_table(f, chunks[3], table, ui.selected);
    draw_notice(f, chunks[4], snapshot, header.now);
    draw_footer(f, chunks[5], ui.mode);

    if snapshot.logs.is_open() {
        draw_log_popup(f, snapshot, ui);
    }
}

fn draw_header(f: &mut Frame, area: Rect, snapshot: &DashboardState, header: &HeaderInfo) {
    let mut spans = vec![
        Span::styled(" svcdeck ", styles::accent_bold()),
        Span::styled(format!("· {} ", header.backend), styles::text_dim()),
    ];

    if let Some(updated) = snapshot.services_updated_at {
        let ago = header.now.saturating_duration_since(updated).as_secs();
        spans.push(Span::styled(
            format!("· updated {}s ago ", ago),
            styles::text_muted(),
        ));
    }

    if let Some(boot) = snapshot.store.stats().and_then(|s| s.boot_time) {
        spans.push(Span::styled(
            format!("· up {} ", format_uptime(boot, header.now_unix)),
            styles::text_dim(),
        ));
    }

    let left = Paragraph::new(Line::from(spans));
    let clock = Paragraph::new(Line::from(Span::styled(
        format!("{} ", snapshot.clock),
        styles::title(),
    )))
    .right_aligned();

    f.render_widget(left, area);
    f.render_widget(clock, area);
}

fn gauge<'a>(title: &'a str, pct: Option<f64>, ratio: f64) -> Gauge<'a> {
    let label = pct.map(format_percent).unwrap_or_else(|| "--".into());
    Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border())
                .title(title),
        )
        .gauge_style(styles::load(ratio))
        .ratio(ratio)
        .label(label)
}

fn draw_stats(f: &mut Frame, area: Rect, snapshot: &DashboardState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Percentage(30),
        ])
        .split(area);

    let stats = snapshot.store.stats();
    let cpu = stats.map(SystemStats::cpu_ratio).unwrap_or(0.0);
    let ram = stats.map(SystemStats::ram_ratio).unwrap_or(0.0);
    f.render_widget(gauge(" CPU ", stats.map(|s| s.cpu_percent), cpu), cols[0]);
    f.render_widget(gauge(" RAM ", stats.map(|s| s.ram_percent), ram), cols[1]);

    let counts = snapshot.counters.shown();
    let line = Line::from(vec![
        Span::styled(" Total ", styles::text_dim()),
        Span::styled(counts.total.to_string(), styles::title()),
        Span::styled("  Running ", styles::text_dim()),
        Span::styled(
            counts.running.to_string(),
            styles::badge(Badge::Running),
        ),
        Span::styled("  Failed ", styles::text_dim()),
        Span::styled(
            counts.failed.to_string(),
            styles::badge(Badge::Failed),
        ),
    ]);
    f.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border())
                .title(" Services "),
        ),
        cols[2],
    );
}

fn draw_filter(f: &mut Frame, area: Rect, ui: &UiState) {
    let typing = ui.mode == InputMode::Filter;
    let line = if ui.filter.is_empty() && !typing {
        Line::from(Span::styled("press / to filter by name or description", styles::text_muted()))
    } else {
        let mut spans = vec![Span::styled(ui.filter.term().to_string(), styles::text())];
        if typing {
            spans.push(Span::styled("▏", styles::key_hint()));
        }
        Line::from(spans)
    };

    let border = if typing {
        styles::key_hint()
    } else {
        styles::border()
    };
    f.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(" Filter "),
        ),
        area,
    );
}

fn controls_line(row: &ServiceRow) -> Line<'static> {
    let mut spans = Vec::with_capacity(RowControl::ALL.len() * 2);
    for button in &row.controls {
        spans.push(Span::styled(
            format!("{}:{}", control_key(button.control), button.control.label()),
            styles::control(button.enabled),
        ));
        spans.push(Span::raw("  "));
    }
    Line::from(spans)
}

fn draw_table(f: &mut Frame, area: Rect, table: &TableView, selected: usize) {
    let header = Row::new(["Service", "Status", "Description", "Actions"]).style(styles::title());

    let rows: Vec<Row> = match table.placeholder() {
        Some(text) => vec![Row::new([
            Cell::from(""),
            Cell::from(""),
            Cell::from(Span::styled(text, styles::text_muted())),
            Cell::from(""),
        ])],
        None => table
            .rows()
            .iter()
            .map(|row| {
                Row::new([
                    Cell::from(Span::styled(row.name.clone(), styles::text())),
                    Cell::from(Span::styled(
                        format!("{} {}", row.badge.icon(), row.badge.label()),
                        styles::badge(row.badge),
                    )),
                    Cell::from(Span::styled(row.description.clone(), styles::text_dim())),
                    Cell::from(controls_line(row)),
                ])
            })
            .collect(),
    };

    let widths = [
        Constraint::Percentage(22),
        Constraint::Length(11),
        Constraint::Fill(1),
        Constraint::Length(40),
    ];
    let widget = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border())
                .title(format!(" Services ({}) ", table.rows().len())),
        )
        .row_highlight_style(styles::selection())
        .highlight_symbol("› ");

    let mut state = TableState::default();
    if !table.is_placeholder() {
        state.select(Some(selected));
    }
    f.render_stateful_widget(widget, area, &mut state);
}

fn draw_notice(f: &mut Frame, area: Rect, snapshot: &DashboardState, now: Instant) {
    let Some(notice) = snapshot.notifier.visible(now) else {
        return;
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} {} ", notice.kind.icon(), notice.kind.label()),
            styles::notice(notice.kind),
        ),
        Span::styled(notice.message.clone(), styles::text()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_footer(f: &mut Frame, area: Rect, mode: InputMode) {
    let hints: &[(&str, &str)] = match mode {
        InputMode::Filter => &[("enter", "apply"), ("esc", "clear")],
        InputMode::Normal => &[
            ("j/k", "move"),
            ("/", "filter"),
            ("s", "start"),
            ("x", "stop"),
            ("r", "restart"),
            ("l", "logs"),
            ("q", "quit"),
        ],
    };
    let mut spans = vec![Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(*key, styles::key_hint()));
        spans.push(Span::styled(format!(" {}  ", label), styles::text_muted()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn centered(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn draw_log_popup(f: &mut Frame, snapshot: &DashboardState, ui: &mut UiState) {
    let area = centered(f.area(), 85, 80);
    let name = snapshot.logs.selected().unwrap_or_default();
    let text = snapshot.logs.content().text();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::key_hint())
        .title(Span::styled(format!(" Logs: {} ", name), styles::title()))
        .title_bottom(Line::from(Span::styled(
            " r refresh · j/k scroll · G bottom · esc close ",
            styles::text_muted(),
        )));
    let viewport = block.inner(area).height;
    ui.sync_log_scroll(snapshot.logs.revision(), text.lines().count(), viewport);

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(text.to_string())
            .style(styles::text())
            .block(block)
            .scroll((ui.log_scroll, 0)),
        area,
    );
}
