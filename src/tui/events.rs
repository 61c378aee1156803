use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;
use std::time::Duration;
use tracing::info;

use crate::config::KeyBindings;
use crate::tui::App;
use crate::tui::app::{Mode, Tab};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::widgets::confirm_delete::DELETE_OPTIONS;
use crate::utils::{ParsedKeyBinding, has_primary_modifier, parse_key_binding};

/// Guard that ensures terminal state is restored even on panic.
/// If the terminal is left in raw mode or on the alternate screen, the
/// user's shell is unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Manually restore terminal state (called on normal exit).
    /// After calling this, the guard does nothing on drop.
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop, we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

/// Key bindings from the config, parsed once at startup
#[derive(Debug, Clone)]
pub struct Keymap {
    pub quit: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
    pub next_tab: ParsedKeyBinding,
    pub prev_tab: ParsedKeyBinding,
    pub tabs: [ParsedKeyBinding; 5],
    pub new: ParsedKeyBinding,
    pub delete: ParsedKeyBinding,
    pub toggle: ParsedKeyBinding,
    pub stars: ParsedKeyBinding,
    pub priority: ParsedKeyBinding,
    pub list_up: ParsedKeyBinding,
    pub list_down: ParsedKeyBinding,
    pub prev_period: ParsedKeyBinding,
    pub next_period: ParsedKeyBinding,
    pub today: ParsedKeyBinding,
    pub unlock: ParsedKeyBinding,
    pub lock: ParsedKeyBinding,
    pub set_pin: ParsedKeyBinding,
    pub edit_notes: ParsedKeyBinding,
    pub cycle_theme: ParsedKeyBinding,
}

impl Keymap {
    pub fn from_config(kb: &KeyBindings) -> Result<Self, TuiError> {
        let parse = |s: &str| parse_key_binding(s).map_err(TuiError::KeyBindingError);
        Ok(Self {
            quit: parse(&kb.quit)?,
            help: parse(&kb.help)?,
            next_tab: parse(&kb.next_tab)?,
            prev_tab: parse(&kb.prev_tab)?,
            tabs: [
                parse(&kb.tab_1)?,
                parse(&kb.tab_2)?,
                parse(&kb.tab_3)?,
                parse(&kb.tab_4)?,
                parse(&kb.tab_5)?,
            ],
            new: parse(&kb.new)?,
            delete: parse(&kb.delete)?,
            toggle: parse(&kb.toggle)?,
            stars: parse(&kb.stars)?,
            priority: parse(&kb.priority)?,
            list_up: parse(&kb.list_up)?,
            list_down: parse(&kb.list_down)?,
            prev_period: parse(&kb.prev_period)?,
            next_period: parse(&kb.next_period)?,
            today: parse(&kb.today)?,
            unlock: parse(&kb.unlock)?,
            lock: parse(&kb.lock)?,
            set_pin: parse(&kb.set_pin)?,
            edit_notes: parse(&kb.edit_notes)?,
            cycle_theme: parse(&kb.cycle_theme)?,
        })
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering alternate screen so the error
    // lands in the normal terminal
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;
    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    info!("TUI started");

    loop {
        app.check_status_message_timeout();

        let size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        if event::poll(Duration::from_millis(16))? {
            // Only Press events, so Windows does not process keys twice
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event) {
                    break;
                }
            }
        }
    }

    guard.restore()?;
    info!("TUI stopped");
    Ok(())
}

/// Route a key press by mode. Returns true when the user asked to quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> bool {
    match app.ui.mode {
        Mode::ConfirmDelete => handle_delete_confirmation_modal(app, key_event),
        Mode::Prompt => handle_prompt_mode(app, key_event),
        Mode::Help => handle_help_mode(app, key_event),
        Mode::View => return handle_view_mode(app, key_event),
    }
    false
}

fn handle_delete_confirmation_modal(app: &mut App, key_event: KeyEvent) {
    let options = DELETE_OPTIONS.len();
    match key_event.code {
        KeyCode::Up | KeyCode::Left => {
            app.modals.delete_modal_selection = (app.modals.delete_modal_selection + options - 1) % options;
        }
        KeyCode::Down | KeyCode::Right | KeyCode::Tab => {
            app.modals.delete_modal_selection = (app.modals.delete_modal_selection + 1) % options;
        }
        KeyCode::Enter if app.modals.delete_modal_selection == 0 => app.confirm_delete(),
        KeyCode::Enter | KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
}

fn handle_prompt_mode(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc => {
            app.cancel_prompt();
            return;
        }
        KeyCode::Enter => {
            app.submit_prompt();
            return;
        }
        _ => {}
    }

    let Some(prompt) = app.modals.prompt.as_mut() else {
        app.ui.mode = Mode::View;
        return;
    };
    let editor = &mut prompt.editor;
    match key_event.code {
        KeyCode::Backspace => editor.delete_char(),
        KeyCode::Delete => editor.delete_forward(),
        KeyCode::Left => editor.move_cursor_left(),
        KeyCode::Right => editor.move_cursor_right(),
        KeyCode::Home => editor.move_cursor_home(),
        KeyCode::End => editor.move_cursor_end(),
        KeyCode::Char(c) if !has_primary_modifier(key_event.modifiers) => editor.insert_char(c),
        _ => {}
    }
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) {
    if key_event.code == KeyCode::Esc || app.keymap.help.matches(&key_event) {
        app.exit_help_mode();
    }
}

fn handle_view_mode(app: &mut App, key: KeyEvent) -> bool {
    let km = app.keymap.clone();

    if km.quit.matches(&key) {
        return true;
    }
    if km.help.matches(&key) {
        app.enter_help_mode();
        return false;
    }
    if km.next_tab.matches(&key) {
        app.switch_tab(app.ui.current_tab.next());
        return false;
    }
    if km.prev_tab.matches(&key) {
        app.switch_tab(app.ui.current_tab.prev());
        return false;
    }
    if let Some(i) = km.tabs.iter().position(|b| b.matches(&key)) {
        app.switch_tab(Tab::ALL[i]);
        return false;
    }
    if km.cycle_theme.matches(&key) {
        app.cycle_theme();
        return false;
    }

    // Keys shared by every list
    if km.list_up.matches(&key) {
        app.move_selection_up();
        return false;
    }
    if km.list_down.matches(&key) {
        app.move_selection_down();
        return false;
    }

    match app.ui.current_tab {
        Tab::Calendar => handle_calendar_key(app, &km, key),
        Tab::Goals => handle_goals_key(app, &km, key),
        Tab::Avoid => handle_avoid_key(app, &km, key),
        Tab::Assets => handle_assets_key(app, &km, key),
        Tab::Board => handle_board_key(app, &km, key),
    }
    false
}

fn handle_period_keys(app: &mut App, km: &Keymap, key: KeyEvent) -> bool {
    if km.prev_period.matches(&key) {
        app.shift_period(-1);
    } else if km.next_period.matches(&key) {
        app.shift_period(1);
    } else if km.today.matches(&key) {
        app.go_to_today();
    } else {
        return false;
    }
    true
}

fn handle_calendar_key(app: &mut App, km: &Keymap, key: KeyEvent) {
    if handle_period_keys(app, km, key) {
        return;
    }
    match key.code {
        KeyCode::Left => app.move_day(-1),
        KeyCode::Right => app.move_day(1),
        KeyCode::Up => app.move_day(-7),
        KeyCode::Down => app.move_day(7),
        _ if km.new.matches(&key) => app.start_new(),
        _ if km.toggle.matches(&key) => app.toggle_selected(),
        _ if km.stars.matches(&key) => app.cycle_stars(),
        _ if km.delete.matches(&key) => app.request_delete(),
        _ => {}
    }
}

fn handle_goals_key(app: &mut App, km: &Keymap, key: KeyEvent) {
    if handle_period_keys(app, km, key) {
        return;
    }
    match key.code {
        KeyCode::Up => app.move_selection_up(),
        KeyCode::Down => app.move_selection_down(),
        _ if km.new.matches(&key) => app.start_new(),
        _ if km.toggle.matches(&key) => app.toggle_selected(),
        _ if km.priority.matches(&key) => app.cycle_priority(),
        _ if km.delete.matches(&key) => app.request_delete(),
        _ => {}
    }
}

fn handle_avoid_key(app: &mut App, km: &Keymap, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.move_selection_up(),
        KeyCode::Down => app.move_selection_down(),
        _ if km.new.matches(&key) => app.start_new(),
        _ if km.priority.matches(&key) => app.cycle_priority(),
        _ if km.delete.matches(&key) => app.request_delete(),
        _ => {}
    }
}

fn handle_assets_key(app: &mut App, km: &Keymap, key: KeyEvent) {
    if km.unlock.matches(&key) {
        app.start_unlock();
        return;
    }
    if app.assets_locked() {
        return;
    }
    if handle_period_keys(app, km, key) {
        return;
    }
    match key.code {
        KeyCode::Left => app.move_asset_cursor(-1),
        KeyCode::Right => app.move_asset_cursor(1),
        KeyCode::Up => app.move_selection_up(),
        KeyCode::Down => app.move_selection_down(),
        _ if km.new.matches(&key) => app.start_new(),
        _ if km.delete.matches(&key) => app.request_delete(),
        _ if km.edit_notes.matches(&key) => app.start_edit_notes(),
        _ if km.lock.matches(&key) => app.lock_current(),
        _ if km.set_pin.matches(&key) => app.start_set_pin(),
        _ => {}
    }
}

fn handle_board_key(app: &mut App, km: &Keymap, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.move_selection_up(),
        KeyCode::Down => app.move_selection_down(),
        _ if km.new.matches(&key) => app.start_new(),
        _ if km.delete.matches(&key) => app.request_delete(),
        _ if km.unlock.matches(&key) => app.start_unlock(),
        _ if km.lock.matches(&key) => app.lock_current(),
        _ if km.set_pin.matches(&key) => app.start_set_pin(),
        _ => {}
    }
}
