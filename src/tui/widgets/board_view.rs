use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::models::BoardPost;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;

/// Post list on top, the selected post's content below
pub fn render_board(
    f: &mut Frame,
    area: Rect,
    posts: &[BoardPost],
    list_state: &mut ListState,
    admin: bool,
    palette: &Palette,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let title = if admin { " Board [admin] " } else { " Board " };
    let block = Block::default().borders(Borders::ALL).title(title).style(palette.base());
    let max_width = chunks[0].width.saturating_sub(4) as usize;

    if posts.is_empty() {
        let empty = Paragraph::new("No posts yet").style(palette.muted()).block(block);
        f.render_widget(empty, chunks[0]);
    } else {
        let items: Vec<ListItem> = posts
            .iter()
            .map(|post| {
                let row = format!("{}  - {} ({})", post.title, post.author, post.timestamp);
                ListItem::new(truncate(&row, max_width))
            })
            .collect();
        let list = List::new(items).block(block).highlight_style(palette.selected());
        f.render_stateful_widget(list, chunks[0], list_state);
    }

    let selected = list_state.selected().and_then(|i| posts.get(i));
    let lines = match selected {
        Some(post) => vec![
            Line::from(Span::styled(post.title.clone(), palette.accent())),
            Line::from(Span::styled(format!("{} · {}", post.author, post.timestamp), palette.muted())),
            Line::from(""),
            Line::from(post.content.clone()),
        ],
        None => vec![],
    };
    let content = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Post ").style(palette.base()))
        .wrap(Wrap { trim: false });
    f.render_widget(content, chunks[1]);
}
