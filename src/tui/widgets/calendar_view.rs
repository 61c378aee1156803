use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, ListState, Paragraph};

use crate::calendar::{DAYS_PER_WEEK, MonthGrid, Slot};
use crate::dates::DateKey;
use crate::models::TodoItem;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::item_lists::render_todo_list;

const WEEKDAYS: [&str; DAYS_PER_WEEK] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[allow(clippy::too_many_arguments)]
pub fn render_calendar(
    f: &mut Frame,
    area: Rect,
    grid: &MonthGrid,
    selected: DateKey,
    todos: &[TodoItem],
    list_state: &mut ListState,
    marker_limit: usize,
    palette: &Palette,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", grid.month))
        .style(palette.base());
    let inner = block.inner(chunks[0]);
    f.render_widget(block, chunks[0]);

    let cell_width = (inner.width as usize / DAYS_PER_WEEK).max(3);
    let lines = grid_lines(grid, selected, cell_width, marker_limit, palette);
    f.render_widget(Paragraph::new(lines).style(palette.base()), inner);

    render_todo_list(f, chunks[1], &selected.to_string(), todos, list_state, palette);
}

/// Weekday header, then two lines per week: day numbers with stars, then to-do markers
fn grid_lines(
    grid: &MonthGrid,
    selected: DateKey,
    cell_width: usize,
    marker_limit: usize,
    palette: &Palette,
) -> Vec<Line<'static>> {
    let header: Vec<Span> = WEEKDAYS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let style = if i == DAYS_PER_WEEK - 1 { palette.attention() } else { palette.muted() };
            Span::styled(pad(name, cell_width), style.add_modifier(Modifier::BOLD))
        })
        .collect();
    let mut lines = vec![Line::from(header)];

    for week in grid.weeks() {
        let mut days = Vec::with_capacity(DAYS_PER_WEEK);
        let mut markers = Vec::with_capacity(DAYS_PER_WEEK);
        for slot in week {
            let Slot::Day(day) = slot else {
                days.push(Span::raw(" ".repeat(cell_width)));
                markers.push(Span::raw(" ".repeat(cell_width)));
                continue;
            };

            let mut style = if day.needs_attention() { palette.attention() } else { palette.base() };
            if day.date == selected {
                style = palette.selected();
            }
            let stars = "★".repeat(day.max_stars as usize);
            let label = format!("{:>2}{}", day.day(), stars);
            days.push(Span::styled(pad(&label, cell_width), style));

            let dots = "•".repeat(day.markers(marker_limit));
            markers.push(Span::styled(pad(&dots, cell_width), palette.accent()));
        }
        lines.push(Line::from(days));
        lines.push(Line::from(markers));
    }

    lines
}

/// Left-align in exactly `width` columns, cutting overflow
fn pad(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{:<width$}", cut, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::build_month_grid;
    use crate::holidays::HolidaySet;
    use crate::models::TodoBook;
    use ratatui::style::Color;

    fn palette() -> Palette {
        Palette {
            fg: Color::White,
            bg: Color::Black,
            highlight_bg: Color::Blue,
            highlight_fg: Color::White,
            tab_bg: Color::Gray,
            attention: Color::Red,
            accent: Color::Yellow,
        }
    }

    #[test]
    fn test_grid_lines_cover_every_week() {
        let selected: DateKey = "2025-02-01".parse().unwrap();
        let grid = build_month_grid(selected.date(), &TodoBook::default(), &HolidaySet::korean());
        let lines = grid_lines(&grid, selected, 5, 10, &palette());
        assert_eq!(lines.len(), 1 + grid.week_count() * 2);
    }

    #[test]
    fn test_pad_is_fixed_width() {
        assert_eq!(pad("12", 5).chars().count(), 5);
        assert_eq!(pad("•••••••", 4), "••• ");
    }
}
