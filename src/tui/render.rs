use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::widgets::{Block, Borders};

use crate::tui::app::{Mode, Tab};
use crate::tui::widgets::{
    asset_chart::{render_assets, render_locked},
    board_view::render_board,
    calendar_view::render_calendar,
    color::Palette,
    confirm_delete::render_confirm_delete,
    editor::render_prompt,
    help::render_help,
    item_lists::{render_avoid_list, render_goal_list},
    status_bar::render_status_bar,
    tabs::render_tabs,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display as key;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let palette = Palette::from_config(&app.config);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Daybook")
        .title_alignment(Alignment::Center)
        .style(palette.base());
    f.render_widget(outer_block, f.area());

    render_tabs(f, layout.tabs_area, app.ui.current_tab, &palette);

    let area = layout.main_area;
    match app.ui.current_tab {
        Tab::Calendar => {
            let grid = app.month_grid();
            let todos = app.todos.items_on(app.ui.selected_date);
            render_calendar(
                f,
                area,
                &grid,
                app.ui.selected_date,
                todos,
                &mut app.ui.list_state,
                app.config.max_day_markers,
                &palette,
            );
        }
        Tab::Goals => {
            let goals = app.visible_goals();
            render_goal_list(f, area, app.ui.goal_year, &goals, &mut app.ui.list_state, &palette);
        }
        Tab::Avoid => {
            let items = app.visible_avoid();
            render_avoid_list(f, area, &items, &mut app.ui.list_state, &palette);
        }
        Tab::Assets if app.assets_locked() => {
            render_locked(f, area, &key(&app.config.key_bindings.unlock), &palette);
        }
        Tab::Assets => {
            let points = app.asset_window();
            let entry = app.assets.entry(app.selected_asset_month());
            render_assets(f, area, &points, app.ui.asset_cursor, entry, &mut app.ui.list_state, &palette);
        }
        Tab::Board => {
            let admin = app.board_gate.has_pin() && app.board_gate.is_unlocked();
            render_board(f, area, app.board.posts(), &mut app.ui.list_state, admin, &palette);
        }
    }

    // Overlays render after the main content
    match app.ui.mode {
        Mode::Help => render_help(f, f.area(), &app.config.key_bindings, &palette),
        Mode::ConfirmDelete => {
            if let Some(target) = &app.modals.delete_confirmation {
                render_confirm_delete(f, f.area(), target, app.modals.delete_modal_selection, &palette);
            }
        }
        Mode::Prompt => {
            if let Some(prompt) = app.modals.prompt.as_mut() {
                let masked = prompt.kind.masked();
                render_prompt(f, f.area(), prompt.kind.label(), &mut prompt.editor, masked, &palette);
            }
        }
        Mode::View => {}
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &key_hints, &palette);
}

pub fn get_key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    match app.ui.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", key(&kb.help))],
        Mode::Prompt => vec!["Enter: OK".to_string(), "Esc: Cancel".to_string()],
        Mode::ConfirmDelete => vec![
            "↑/↓: Choose".to_string(),
            "Enter: Confirm".to_string(),
            "Esc: Cancel".to_string(),
        ],
        Mode::View => {
            let mut hints = vec![format!("{}: Quit", key(&kb.quit))];
            match app.ui.current_tab {
                Tab::Calendar => {
                    hints.push("Arrows: Day".to_string());
                    hints.push(format!("{}/{}: Month", key(&kb.prev_period), key(&kb.next_period)));
                    hints.push(format!("{}: New", key(&kb.new)));
                    hints.push(format!("{}: Done", key(&kb.toggle)));
                    hints.push(format!("{}: Stars", key(&kb.stars)));
                    hints.push(format!("{}: Delete", key(&kb.delete)));
                }
                Tab::Goals => {
                    hints.push(format!("{}/{}: Year", key(&kb.prev_period), key(&kb.next_period)));
                    hints.push(format!("{}: New", key(&kb.new)));
                    hints.push(format!("{}: Done", key(&kb.toggle)));
                    hints.push(format!("{}: Priority", key(&kb.priority)));
                    hints.push(format!("{}: Delete", key(&kb.delete)));
                }
                Tab::Avoid => {
                    hints.push(format!("{}: New", key(&kb.new)));
                    hints.push(format!("{}: Priority", key(&kb.priority)));
                    hints.push(format!("{}: Delete", key(&kb.delete)));
                }
                Tab::Assets if app.assets_locked() => {
                    hints.push(format!("{}: Unlock", key(&kb.unlock)));
                }
                Tab::Assets => {
                    hints.push("←/→: Month".to_string());
                    hints.push(format!("{}/{}: Shift window", key(&kb.prev_period), key(&kb.next_period)));
                    hints.push(format!("{}: Add holding", key(&kb.new)));
                    hints.push(format!("{}: Notes", key(&kb.edit_notes)));
                    hints.push(format!("{}: Delete", key(&kb.delete)));
                    hints.push(format!("{}: Lock", key(&kb.lock)));
                    hints.push(format!("{}: PIN", key(&kb.set_pin)));
                }
                Tab::Board => {
                    hints.push(format!("{}: Post", key(&kb.new)));
                    if app.board_gate.is_unlocked() {
                        hints.push(format!("{}: Delete", key(&kb.delete)));
                        hints.push(format!("{}: PIN", key(&kb.set_pin)));
                    } else {
                        hints.push(format!("{}: Admin", key(&kb.unlock)));
                    }
                }
            }
            hints.push(format!("{}: Theme", key(&kb.cycle_theme)));
            hints.push(format!("{}: Help", key(&kb.help)));
            hints
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::Tab;
    use crate::{Config, Database};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;

    fn test_app() -> App {
        App::new(Config::default(), Database::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn test_every_tab_renders() {
        let mut app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        for tab in Tab::ALL {
            app.switch_tab(tab);
            terminal
                .draw(|f| {
                    let layout = Layout::calculate(Rect::new(0, 0, 100, 40));
                    render(f, &mut app, &layout);
                })
                .unwrap();
        }
        app.enter_help_mode();
        terminal
            .draw(|f| render(f, &mut app, &Layout::calculate(Rect::new(0, 0, 100, 40))))
            .unwrap();
    }

    #[test]
    fn test_locked_assets_hints() {
        let mut app = test_app();
        app.assets_gate = crate::gate::PinGate::new("1");
        app.switch_tab(Tab::Assets);
        let hints = get_key_hints(&app);
        assert!(hints.contains(&"u: Unlock".to_string()));
        assert!(!hints.iter().any(|h| h.ends_with("Add holding")));
    }
}
