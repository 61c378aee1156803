use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::config::KeyBindings;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, bindings: &KeyBindings, palette: &Palette) {
    let popup_area = popup_area(area, 60, 80);

    // Clear the background first so content does not show through
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(bindings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(palette.base()),
        )
        .style(palette.base())
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

pub fn build_help_text(kb: &KeyBindings) -> String {
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {}: Switch tabs\n", key(&kb.next_tab), key(&kb.prev_tab)));
    text.push_str(&format!(
        "  {}-{}: Jump to tab\n",
        key(&kb.tab_1),
        key(&kb.tab_5)
    ));
    text.push_str(&format!("  {} / {}: Move in list\n", key(&kb.list_up), key(&kb.list_down)));
    text.push_str(&format!(
        "  {} / {}: Previous / next month or year\n",
        key(&kb.prev_period),
        key(&kb.next_period)
    ));
    text.push_str(&format!("  {}: Jump to today\n", key(&kb.today)));
    text.push_str("  Arrow keys: Move day (Calendar) or month (Assets)\n");
    text.push('\n');

    text.push_str("Actions:\n");
    text.push_str(&format!("  {}: New item\n", key(&kb.new)));
    text.push_str(&format!("  {}: Delete selected item\n", key(&kb.delete)));
    text.push_str(&format!("  {}: Toggle done\n", key(&kb.toggle)));
    text.push_str(&format!("  {}: Cycle stars (Calendar)\n", key(&kb.stars)));
    text.push_str(&format!("  {}: Cycle priority (Goals, Avoid)\n", key(&kb.priority)));
    text.push_str(&format!("  {}: Edit month notes (Assets)\n", key(&kb.edit_notes)));
    text.push('\n');

    text.push_str("PIN:\n");
    text.push_str(&format!("  {}: Unlock assets / board admin\n", key(&kb.unlock)));
    text.push_str(&format!("  {}: Lock again\n", key(&kb.lock)));
    text.push_str(&format!("  {}: Change PIN (while unlocked)\n", key(&kb.set_pin)));
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));
    text.push_str(&format!("  {}: Next theme\n", key(&kb.cycle_theme)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_mentions_custom_bindings() {
        let kb = KeyBindings { new: "a".to_string(), ..KeyBindings::default() };
        let text = build_help_text(&kb);
        assert!(text.contains("  a: New item"));
        assert!(text.contains("Unlock assets"));
    }
}
