//! Drawing layer: renders the view model and modal dialogs with ratatui.
//!
//! Stateless given the application state; all decisions about what is
//! visible were made by the projection in [`super::view`].

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::view::ViewModel;
use super::{App, CatalogState, Focus, Modal};

const CARD_HEIGHT: u16 = 4;

pub(super) fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    match &app.state {
        CatalogState::Loading => draw_loading(frame, area, app),
        CatalogState::Failed(reason) => draw_error_panel(frame, area, reason),
        CatalogState::Ready(catalog) => {
            let vm = ViewModel::project(catalog, &app.selection, &app.visible);
            draw_catalog(frame, area, app, &vm);
            match &app.modal {
                Modal::None => {}
                Modal::Preview {
                    file,
                    asset_missing,
                } => draw_preview(frame, area, app, file, *asset_missing),
                Modal::Solutions { file, cursor } => {
                    draw_solutions(frame, area, app, file, *cursor)
                }
            }
        }
    }
}

fn draw_loading(frame: &mut Frame, area: Rect, app: &App) {
    let text = format!("loading catalog from {} ...", app.settings.catalog_url);
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("examshelf"));
    frame.render_widget(paragraph, area);
}

/// Fixed error panel shown in place of the catalog when loading fails.
/// The shell stays up; only quitting is offered.
fn draw_error_panel(frame: &mut Frame, area: Rect, reason: &str) {
    let lines = vec![
        Line::from(Span::styled(
            "failed to load catalog",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(reason.to_string()),
        Line::from(""),
        Line::from("check the base url and that catalog.json exists"),
        Line::from(""),
        Line::from("[q] quit"),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title("examshelf"),
        );
    frame.render_widget(paragraph, area);
}

fn draw_catalog(frame: &mut Frame, area: Rect, app: &App, vm: &ViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_counters(frame, chunks[0], vm);
    draw_search(frame, chunks[1], app);
    draw_tags(frame, chunks[2], app, vm);
    draw_cards(frame, chunks[3], app, vm);
    draw_status(frame, chunks[4], app);
}

fn draw_counters(frame: &mut Frame, area: Rect, vm: &ViewModel) {
    let c = vm.counters;
    let mut spans = vec![
        Span::raw(format!("sheets {}", c.total_sheets)),
        Span::raw("   "),
        Span::raw(format!("tags {}", c.total_tags)),
        Span::raw("   "),
        Span::raw(format!("visible {}", c.visible_sheets)),
    ];
    // Mirrors the active-filters badge: only shown while filters apply.
    if c.active_filters > 0 {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("filters {}", c.active_filters),
            Style::default().fg(Color::Yellow),
        ));
    }
    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("examshelf"));
    frame.render_widget(paragraph, area);
}

fn draw_search(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Search && matches!(app.modal, Modal::None);
    let mut text = app.query.clone();
    if focused {
        text.push('_');
    }
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title("search"),
    );
    frame.render_widget(paragraph, area);
}

fn draw_tags(frame: &mut Frame, area: Rect, app: &App, vm: &ViewModel) {
    let focused = app.focus == Focus::Tags && matches!(app.modal, Modal::None);
    let mut spans = Vec::with_capacity(vm.chips.len() * 2);
    for (i, chip) in vm.chips.iter().enumerate() {
        let mut style = if chip.active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        if focused && i == app.tag_cursor {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!(" {} ", chip.label), style));
        spans.push(Span::raw(" "));
    }
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title("tags"),
    );
    frame.render_widget(paragraph, area);
}

fn draw_cards(frame: &mut Frame, area: Rect, app: &App, vm: &ViewModel) {
    let focused = app.focus == Focus::Cards && matches!(app.modal, Modal::None);
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title("sheets");

    if vm.no_results {
        let paragraph = Paragraph::new("no sheets match the current filters")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::with_capacity(vm.cards.len() * CARD_HEIGHT as usize);
    for (i, card) in vm.cards.iter().enumerate() {
        let selected = focused && i == app.card_cursor;
        let base = if selected {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            card.name.clone(),
            base.add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("{}   [{}]", card.session, card.tags.join(", ")),
            base,
        )));
        let mut actions = String::from("[enter] preview   [d] download");
        if card.has_solutions {
            actions.push_str("   [s] solutions");
        }
        lines.push(Line::from(Span::styled(
            actions,
            base.fg(Color::DarkGray),
        )));
        lines.push(Line::from(""));
    }

    // Keep the selected card inside the viewport.
    let viewport = area.height.saturating_sub(2);
    let sel_top = (app.card_cursor as u16).saturating_mul(CARD_HEIGHT);
    let scroll = sel_top.saturating_sub(viewport.saturating_sub(CARD_HEIGHT));

    let paragraph = Paragraph::new(lines).scroll((scroll, 0)).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let text = match &app.status {
        Some(status) => status.clone(),
        None => "tab focus   / search   enter preview   d download   s solutions   q quit"
            .to_string(),
    };
    let paragraph = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn draw_preview(frame: &mut Frame, area: Rect, app: &App, file: &str, asset_missing: Option<bool>) {
    let Some(sheet) = app.catalog().and_then(|c| c.by_file(file)) else {
        return;
    };
    let asset = app
        .downloads
        .primary_url(sheet)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| sheet.file.clone());
    let availability = match asset_missing {
        None => Span::styled("checking availability ...", Style::default().fg(Color::DarkGray)),
        Some(false) => Span::styled("asset reachable", Style::default().fg(Color::Green)),
        Some(true) => Span::styled("asset unavailable", Style::default().fg(Color::Red)),
    };

    let lines = vec![
        Line::from(Span::styled(
            sheet.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("session  {}", sheet.session)),
        Line::from(format!("period   {}", sheet.period)),
        Line::from(format!("tags     {}", sheet.tags.join(", "))),
        Line::from(format!("asset    {asset}")),
        Line::from(availability),
        Line::from(""),
        Line::from(Span::styled(
            "[d] download   [esc] close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("preview"),
    );
    frame.render_widget(paragraph, popup);
}

fn draw_solutions(frame: &mut Frame, area: Rect, app: &App, file: &str, cursor: usize) {
    let Some(sheet) = app.catalog().and_then(|c| c.by_file(file)) else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("solutions for {}", sheet.name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (i, filename) in sheet.solutions.iter().enumerate() {
        let style = if i == cursor {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(format!("  {filename}  "), style)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[enter] download   [esc] close",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title("solutions"),
    );
    frame.render_widget(paragraph, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
