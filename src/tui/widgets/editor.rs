use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::cmp;

use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;

/// Single-line text input with a character cursor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Editor {
    chars: Vec<char>,
    cursor: usize,
    scroll_col: usize,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing text, cursor at the end
    pub fn from_string(content: &str) -> Self {
        let chars: Vec<char> = content.chars().filter(|c| *c != '\n').collect();
        let cursor = chars.len();
        Self { chars, cursor, scroll_col: 0 }
    }

    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            return;
        }
        let col = cmp::min(self.cursor, self.chars.len());
        self.chars.insert(col, ch);
        self.cursor = col + 1;
    }

    /// Delete the character before the cursor
    pub fn delete_char(&mut self) {
        if self.cursor > 0 && self.cursor <= self.chars.len() {
            self.chars.remove(self.cursor - 1);
            self.cursor -= 1;
        }
    }

    /// Delete the character under the cursor
    pub fn delete_forward(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = cmp::min(self.cursor + 1, self.chars.len());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.chars.len();
    }

    /// Keep the cursor inside a viewport `width` columns wide
    pub fn update_horizontal_scroll(&mut self, width: usize) {
        let width = width.max(1);
        if self.cursor < self.scroll_col {
            self.scroll_col = self.cursor;
        } else if self.cursor >= self.scroll_col + width {
            self.scroll_col = self.cursor + 1 - width;
        }
    }

    /// The visible slice, with every character replaced by `*` when masked
    pub fn visible_text(&self, width: usize, masked: bool) -> String {
        self.chars
            .iter()
            .skip(self.scroll_col)
            .take(width)
            .map(|c| if masked { '*' } else { *c })
            .collect()
    }

    pub fn get_cursor_screen_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let visible_col = self.cursor.checked_sub(self.scroll_col)?;
        let max_x = area.width.saturating_sub(2) as usize;
        if visible_col >= max_x || area.height < 3 {
            return None;
        }
        Some((area.x + 1 + visible_col as u16, area.y + 1))
    }
}

/// Draw a one-line prompt box centered over `area` and place the cursor in it
pub fn render_prompt(
    f: &mut Frame,
    area: Rect,
    label: &str,
    editor: &mut Editor,
    masked: bool,
    palette: &Palette,
) {
    let popup = popup_area(area, 60, 20);
    let input_area = Rect::new(popup.x, popup.y + popup.height.saturating_sub(3) / 2, popup.width, 3);

    f.render_widget(Clear, input_area);
    let inner_width = input_area.width.saturating_sub(2) as usize;
    editor.update_horizontal_scroll(inner_width);

    let paragraph = Paragraph::new(Line::from(editor.visible_text(inner_width, masked)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(label.to_string())
                .title_alignment(Alignment::Left)
                .title_bottom(Line::from("Enter: OK  Esc: Cancel").alignment(Alignment::Right))
                .style(palette.base()),
        )
        .style(palette.base());
    f.render_widget(paragraph, input_area);

    if let Some((x, y)) = editor.get_cursor_screen_pos(input_area) {
        f.set_cursor_position((x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_delete() {
        let mut editor = Editor::new();
        for c in "héllo".chars() {
            editor.insert_char(c);
        }
        editor.move_cursor_left();
        editor.delete_char();
        assert_eq!(editor.value(), "hélo");
        editor.move_cursor_home();
        editor.delete_forward();
        assert_eq!(editor.value(), "élo");
        editor.insert_char('\n');
        assert_eq!(editor.value(), "élo");
    }

    #[test]
    fn test_cursor_bounds() {
        let mut editor = Editor::from_string("ab");
        assert_eq!(editor.cursor(), 2);
        editor.move_cursor_right();
        assert_eq!(editor.cursor(), 2);
        editor.move_cursor_home();
        editor.move_cursor_left();
        assert_eq!(editor.cursor(), 0);
        editor.delete_char();
        assert_eq!(editor.value(), "ab");
    }

    #[test]
    fn test_masked_scrolling_view() {
        let mut editor = Editor::from_string("123456");
        editor.update_horizontal_scroll(4);
        assert_eq!(editor.visible_text(4, false), "456");
        assert_eq!(editor.visible_text(4, true), "***");
        editor.move_cursor_home();
        editor.update_horizontal_scroll(4);
        assert_eq!(editor.visible_text(4, false), "1234");
    }
}
