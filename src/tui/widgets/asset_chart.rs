use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph, Wrap};

use crate::assets::{AssetMonthEntry, WindowPoint, chart_segments, format_eok};
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;

/// Lowest and highest recorded totals, padded so a flat line stays visible
fn y_bounds(points: &[WindowPoint]) -> [f64; 2] {
    let totals = points.iter().filter_map(|p| p.total);
    let (min, max) = totals.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((max - min) * 0.1).max(max.abs() * 0.05).max(1.0);
    [min - pad, max + pad]
}

/// Twelve-month chart on top; the selected month's holdings and notes below
pub fn render_assets(
    f: &mut Frame,
    area: Rect,
    points: &[WindowPoint],
    cursor: usize,
    entry: Option<&AssetMonthEntry>,
    list_state: &mut ListState,
    palette: &Palette,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    render_chart(f, rows[0], points, cursor, palette);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    let selected = points.get(cursor);
    render_holdings(f, bottom[0], selected, entry, list_state, palette);
    render_notes(f, bottom[1], entry, palette);
}

fn render_chart(f: &mut Frame, area: Rect, points: &[WindowPoint], cursor: usize, palette: &Palette) {
    // One line per run of consecutive recorded months, so gaps stay gaps
    let segments = chart_segments(points);
    let dots: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.total.map(|t| (i as f64, t)))
        .collect();
    let highlight: Vec<(f64, f64)> = points
        .get(cursor)
        .and_then(|p| p.total)
        .map(|t| vec![(cursor as f64, t)])
        .unwrap_or_default();

    let mut datasets: Vec<Dataset> = segments
        .iter()
        .map(|run| {
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(palette.accent())
                .data(run)
        })
        .collect();
    datasets.push(
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(palette.accent())
            .data(&dots),
    );
    datasets.push(
        Dataset::default()
            .marker(Marker::Block)
            .graph_type(GraphType::Scatter)
            .style(palette.attention())
            .data(&highlight),
    );

    let [y_min, y_max] = y_bounds(points);
    let last = points.len().saturating_sub(1);
    let x_labels: Vec<Line> = [0, last / 2, last]
        .iter()
        .filter_map(|i| points.get(*i))
        .map(|p| Line::from(p.month.to_string()))
        .collect();
    let y_labels: Vec<Line> = [y_min, (y_min + y_max) / 2.0, y_max]
        .iter()
        .map(|v| Line::from(format_eok(Some(*v))))
        .collect();

    let title = match points.get(cursor) {
        Some(p) => format!(" Assets · {} · {} ", p.month, format_eok(p.total)),
        None => " Assets ".to_string(),
    };
    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title).style(palette.base()))
        .x_axis(
            Axis::default()
                .style(palette.muted())
                .bounds([0.0, last.max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(Axis::default().style(palette.muted()).bounds([y_min, y_max]).labels(y_labels));
    f.render_widget(chart, area);
}

fn render_holdings(
    f: &mut Frame,
    area: Rect,
    point: Option<&WindowPoint>,
    entry: Option<&AssetMonthEntry>,
    list_state: &mut ListState,
    palette: &Palette,
) {
    let title = point.map(|p| format!(" {} ", p.month)).unwrap_or_default();
    let block = Block::default().borders(Borders::ALL).title(title).style(palette.base());
    let items = entry.map(|e| e.items.as_slice()).unwrap_or_default();
    if items.is_empty() {
        f.render_widget(Paragraph::new("No holdings recorded").style(palette.muted()).block(block), area);
        return;
    }

    let max_width = area.width.saturating_sub(4) as usize;
    let rows: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let row = format!("{:<16} {:>12}", item.name, format_eok(Some(item.amount)));
            ListItem::new(truncate(&row, max_width))
        })
        .collect();
    let list = List::new(rows).block(block).highlight_style(palette.selected());
    f.render_stateful_widget(list, area, list_state);
}

fn render_notes(f: &mut Frame, area: Rect, entry: Option<&AssetMonthEntry>, palette: &Palette) {
    let (up, down) = entry
        .map(|e| (e.note_up.as_str(), e.note_down.as_str()))
        .unwrap_or(("", ""));
    let lines = vec![
        Line::from(vec![Span::styled("▲ ", palette.accent()), Span::raw(up.to_string())]),
        Line::from(vec![Span::styled("▼ ", palette.attention()), Span::raw(down.to_string())]),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Notes ").style(palette.base()))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

/// Placeholder shown while the assets gate is locked
pub fn render_locked(f: &mut Frame, area: Rect, unlock_key: &str, palette: &Palette) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Assets are locked", palette.attention())),
        Line::from(""),
        Line::from(format!("Press {} to enter the PIN", unlock_key)),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Assets ").style(palette.base()));
    f.render_widget(paragraph, area);
}
