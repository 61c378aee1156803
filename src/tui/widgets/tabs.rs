use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;

use crate::tui::app::Tab;
use crate::tui::widgets::color::{Palette, get_contrast_text_color};

pub fn render_tabs(f: &mut Frame, area: Rect, current_tab: Tab, palette: &Palette) {
    // Contrast-aware text for non-selected tabs so gray renders readably everywhere
    let tab_fg = get_contrast_text_color(palette.tab_bg);
    let pad = || Span::styled("  ", Style::default().bg(palette.tab_bg));

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            Line::from(vec![
                pad(),
                Span::styled(format!("{} {}", i + 1, tab.title()), Style::default().fg(tab_fg).bg(palette.tab_bg)),
                pad(),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(current_tab.index())
        .style(palette.base())
        .highlight_style(palette.selected())
        .divider("  ")
        .padding("", "");

    f.render_widget(tabs, area);
}
