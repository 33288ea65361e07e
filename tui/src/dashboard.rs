//! Dashboard view: renders the current page's sections, charts and derived
//! figures using ratatui widgets.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};

use dashdeck_core::DataStore;

use crate::app::App;
use crate::field::EditableField;
use crate::input::InputLine;
use crate::pages::{Page, SegmentChart};


const BAR_WIDTH: usize = 20;
const CURSOR: char = '\u{258f}'; // ▏


/// Render the current page: editable sections on the left, charts and
/// derived figures on the right.
pub fn render_dashboard(frame: &mut Frame, area: Rect, app: &App) {
    let Some(page) = app.current_page() else {
        frame.render_widget(Paragraph::new("No pages."), area);
        return;
    };

    let has_side = !page.charts.is_empty() || !page.derived.is_empty();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if has_side {
            vec![Constraint::Fill(3), Constraint::Fill(2)]
        } else {
            vec![Constraint::Fill(1)]
        })
        .split(area);

    render_sections(frame, chunks[0], page, app.store(), app.selected_index());
    if has_side {
        render_side_panel(frame, chunks[1], page, app.store());
    }
}


/// Render the page tab strip: the current page highlighted, with arrows
/// only where navigation is possible.
pub fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::raw(if app.has_prev_page() { "\u{25c0} " } else { "  " })];
    for (i, page) in app.pages().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" | "));
        }
        let style = if i == app.page_index() {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title.clone(), style));
    }
    spans.push(Span::raw(if app.has_next_page() { " \u{25b6}" } else { "  " }));
    spans.push(Span::raw(format!(
        "   {}",
        page_indicator(app.page_index(), app.page_count())
    )));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}


// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn render_sections(frame: &mut Frame, area: Rect, page: &Page, store: &DataStore, selected: usize) {
    let value_width = area.width.saturating_sub(4) as usize / 2;
    let mut rows = Vec::new();
    let mut selected_row = None;
    let mut index = 0;

    for section in &page.sections {
        rows.push(
            Row::new(vec![Cell::from(section.title.clone()), Cell::from("")])
                .style(Style::default().fg(Color::Yellow).bold()),
        );
        for field in &section.fields {
            if index == selected {
                selected_row = Some(rows.len());
            }
            rows.push(field_row(field, store, index == selected, value_width));
            index += 1;
        }
    }

    let table = Table::new(rows, [Constraint::Fill(1), Constraint::Fill(1)])
        .block(Block::default().borders(Borders::ALL).title(page.title.clone()));
    let mut state = TableState::default().with_selected(selected_row);
    frame.render_stateful_widget(table, area, &mut state);
}

fn field_row<'a>(field: &EditableField, store: &DataStore, selected: bool, width: usize) -> Row<'a> {
    let value = match field.draft() {
        Some(draft) => draft_with_cursor(draft, width),
        None => field.display_text(store),
    };
    Row::new(vec![
        Cell::from(format!("  {}", field.label())),
        Cell::from(value),
    ])
    .style(field_style(selected, field.is_editing()))
}

fn field_style(selected: bool, editing: bool) -> Style {
    match (selected, editing) {
        (_, true) => Style::default().fg(Color::Black).bg(Color::Yellow),
        (true, false) => Style::default().bg(Color::DarkGray),
        _ => Style::default(),
    }
}

/// The visible part of `draft` with a cursor glyph at the cursor.
fn draft_with_cursor(draft: &InputLine, width: usize) -> String {
    let (visible, cursor) = draft.visible(width.max(2) - 1);
    let mut out: String = visible.chars().take(cursor).collect();
    out.push(CURSOR);
    out.extend(visible.chars().skip(cursor));
    out
}


// ---------------------------------------------------------------------------
// Charts and derived figures
// ---------------------------------------------------------------------------

fn render_side_panel(frame: &mut Frame, area: Rect, page: &Page, store: &DataStore) {
    let mut lines: Vec<Line> = Vec::new();
    for chart in &page.charts {
        lines.extend(chart_lines(chart, store));
        lines.push(Line::raw(""));
    }
    if !page.derived.is_empty() {
        lines.push(Line::styled("Derived", Style::default().fg(Color::Yellow).bold()));
        for d in &page.derived {
            lines.push(Line::raw(format!("  {}: {}", d.label, d.value(store))));
        }
    }
    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Charts"))
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

fn chart_lines<'a>(chart: &SegmentChart, store: &DataStore) -> Vec<Line<'a>> {
    let segments = chart.segments(store);
    let mut lines = vec![Line::styled(chart.title.clone(), Style::default().fg(Color::Yellow).bold())];
    if segments.is_empty() {
        lines.push(Line::styled("  (no data)", Style::default().fg(Color::DarkGray)));
        return lines;
    }
    let max = segments.iter().map(|s| s.value).fold(0.0_f64, f64::max);
    let label_width = segments.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    for (i, segment) in segments.iter().enumerate() {
        let mut text = format!(
            "  {:<lw$} {} {}",
            segment.label,
            bar(segment.value, max, BAR_WIDTH),
            chart.format.apply(segment.value),
            lw = label_width,
        );
        if let Some(note) = &segment.note {
            text.push_str(&format!(" ({})", note));
        }
        lines.push(Line::styled(text, Style::default().fg(segment_color(i))));
    }
    lines
}

/// A horizontal bar of `width` cells scaled so `max` fills it.
fn bar(value: f64, max: f64, width: usize) -> String {
    let filled = if max > 0.0 && value > 0.0 {
        ((value / max) * width as f64).round().clamp(1.0, width as f64) as usize
    } else {
        0
    };
    let mut out = "\u{2588}".repeat(filled);
    out.push_str(&"\u{2591}".repeat(width - filled));
    out
}

fn segment_color(index: usize) -> Color {
    const PALETTE: [Color; 5] = [Color::Green, Color::Blue, Color::Magenta, Color::Cyan, Color::Red];
    PALETTE[index % PALETTE.len()]
}

fn page_indicator(index: usize, count: usize) -> String {
    format!("{}/{}", index + 1, count.max(1))
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
