use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::models::{AvoidItem, GoalItem, TodoItem};
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;

fn status_indicator(done: bool) -> &'static str {
    if done { "✓" } else { "○" }
}

fn prio_label(prio: Option<u8>) -> String {
    prio.map(|p| format!("P{} ", p)).unwrap_or_default()
}

fn render_list(
    f: &mut Frame,
    area: Rect,
    title: String,
    rows: Vec<String>,
    empty_text: &str,
    list_state: &mut ListState,
    palette: &Palette,
) {
    // 2 for borders, 2 for padding
    let max_width = area.width.saturating_sub(4) as usize;
    let block = Block::default().borders(Borders::ALL).title(title).style(palette.base());

    if rows.is_empty() {
        let list = List::new(vec![ListItem::new(empty_text.to_string()).style(palette.muted())]).block(block);
        f.render_widget(list, area);
        return;
    }

    let items: Vec<ListItem> = rows.iter().map(|row| ListItem::new(truncate(row, max_width))).collect();
    let list = List::new(items)
        .block(block)
        .style(palette.base())
        .highlight_style(palette.selected());
    f.render_stateful_widget(list, area, list_state);
}

pub fn render_todo_list(
    f: &mut Frame,
    area: Rect,
    day: &str,
    todos: &[TodoItem],
    list_state: &mut ListState,
    palette: &Palette,
) {
    let rows = todos
        .iter()
        .map(|todo| {
            let stars = "★".repeat(todo.stars as usize);
            format!("{} {} {}", status_indicator(todo.done), todo.text, stars)
        })
        .collect();
    let title = format!(" {} ({}) ", day, todos.len());
    render_list(f, area, title, rows, "No to-dos", list_state, palette);
}

/// Goals in display (priority) order
pub fn render_goal_list(
    f: &mut Frame,
    area: Rect,
    year: i32,
    goals: &[GoalItem],
    list_state: &mut ListState,
    palette: &Palette,
) {
    let rows = goals
        .iter()
        .map(|goal| format!("{} {}{}", status_indicator(goal.done), prio_label(goal.prio), goal.title))
        .collect();
    let done = goals.iter().filter(|g| g.done).count();
    let title = format!(" Goals {} ({}/{}) ", year, done, goals.len());
    render_list(f, area, title, rows, "No goals for this year", list_state, palette);
}

pub fn render_avoid_list(f: &mut Frame, area: Rect, items: &[AvoidItem], list_state: &mut ListState, palette: &Palette) {
    let rows = items
        .iter()
        .map(|item| format!("✗ {}{}", prio_label(item.prio), item.title))
        .collect();
    render_list(f, area, " Avoid ".to_string(), rows, "Nothing to avoid yet", list_state, palette);
}
