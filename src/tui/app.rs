use chrono::{Datelike, Days, Local, Months};
use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::assets::{AssetBook, AssetItem, WINDOW_MONTHS, WindowPoint, build_window};
use crate::calendar::{MonthGrid, build_month_grid};
use crate::dates::{DateKey, MonthKey};
use crate::gate::PinGate;
use crate::holidays::HolidaySet;
use crate::models::{AvoidItem, AvoidList, Board, BoardPost, GoalBook, GoalItem, MAX_STARS, TodoBook, TodoItem};
use crate::state::{self, ASSETS_PIN_KEY, BOARD_PIN_KEY, StateError};
use crate::tui::error::TuiError;
use crate::tui::events::Keymap;
use crate::tui::widgets::editor::Editor;
use crate::{Config, Database};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Calendar,
    Goals,
    Avoid,
    Assets,
    Board,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Calendar, Tab::Goals, Tab::Avoid, Tab::Assets, Tab::Board];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Calendar => "Calendar",
            Tab::Goals => "Goals",
            Tab::Avoid => "Avoid",
            Tab::Assets => "Assets",
            Tab::Board => "Board",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Help,
    Prompt,
    ConfirmDelete,
}

/// What the open prompt is asking for. Multi-step inputs carry the earlier answers.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptKind {
    TodoText,
    GoalTitle,
    AvoidTitle,
    AssetName,
    AssetAmount { name: String },
    NoteUp,
    NoteDown { up: String },
    PostTitle,
    PostContent { title: String },
    PostAuthor { title: String, content: String },
    UnlockAssets,
    UnlockBoard,
    NewAssetsPin,
    NewBoardPin,
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::TodoText => " New to-do ",
            PromptKind::GoalTitle => " New goal ",
            PromptKind::AvoidTitle => " Something to avoid ",
            PromptKind::AssetName => " Holding name ",
            PromptKind::AssetAmount { .. } => " Amount (won) ",
            PromptKind::NoteUp => " Why it went up ",
            PromptKind::NoteDown { .. } => " Why it went down ",
            PromptKind::PostTitle => " Post title ",
            PromptKind::PostContent { .. } => " Post content ",
            PromptKind::PostAuthor { .. } => " Author (blank for default) ",
            PromptKind::UnlockAssets => " Assets PIN ",
            PromptKind::UnlockBoard => " Admin PIN ",
            PromptKind::NewAssetsPin => " New assets PIN (blank removes) ",
            PromptKind::NewBoardPin => " New admin PIN (blank removes) ",
        }
    }

    pub fn masked(&self) -> bool {
        matches!(
            self,
            PromptKind::UnlockAssets | PromptKind::UnlockBoard | PromptKind::NewAssetsPin | PromptKind::NewBoardPin
        )
    }
}

#[derive(Debug, Clone)]
pub struct PromptState {
    pub kind: PromptKind,
    pub editor: Editor,
}

/// Item awaiting delete confirmation
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    Todo { date: DateKey, item: TodoItem },
    Goal { year: i32, item: GoalItem },
    Avoid { item: AvoidItem },
    AssetItem { month: MonthKey, item: AssetItem },
    Post { item: BoardPost },
}

impl DeleteTarget {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DeleteTarget::Todo { .. } => "to-do",
            DeleteTarget::Goal { .. } => "goal",
            DeleteTarget::Avoid { .. } => "item",
            DeleteTarget::AssetItem { .. } => "holding",
            DeleteTarget::Post { .. } => "post",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DeleteTarget::Todo { item, .. } => &item.text,
            DeleteTarget::Goal { item, .. } => &item.title,
            DeleteTarget::Avoid { item } => &item.title,
            DeleteTarget::AssetItem { item, .. } => &item.name,
            DeleteTarget::Post { item } => &item.title,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub current_tab: Tab,
    pub mode: Mode,
    pub selected_date: DateKey,
    pub selected_index: usize,
    pub list_state: ListState,
    pub goal_year: i32,
    /// First month of the twelve-month asset window
    pub asset_anchor: MonthKey,
    /// Selected month within the window, 0..WINDOW_MONTHS
    pub asset_cursor: usize,
}

impl Default for UiState {
    fn default() -> Self {
        let today = DateKey::today();
        Self {
            current_tab: Tab::Calendar,
            mode: Mode::View,
            selected_date: today,
            selected_index: 0,
            list_state: ListState::default(),
            goal_year: today.date().year(),
            asset_anchor: today.month().add_months(1 - WINDOW_MONTHS as i32),
            asset_cursor: WINDOW_MONTHS - 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub delete_confirmation: Option<DeleteTarget>,
    pub delete_modal_selection: usize,
    pub prompt: Option<PromptState>,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    // Core infrastructure
    pub config: Config,
    /// Where theme changes are saved; None keeps them in memory only
    pub config_path: Option<PathBuf>,
    pub database: Database,
    pub keymap: Keymap,
    pub holidays: HolidaySet,

    // Snapshot containers, replaced wholesale on every change
    pub todos: TodoBook,
    pub goals: GoalBook,
    pub avoid: AvoidList,
    pub assets: AssetBook,
    pub board: Board,
    pub assets_gate: PinGate,
    pub board_gate: PinGate,

    // Grouped state
    pub ui: UiState,
    pub modals: ModalState,
    pub status: StatusState,
}

impl App {
    pub fn new(config: Config, database: Database) -> Result<Self, TuiError> {
        let keymap = Keymap::from_config(&config.key_bindings)?;
        let holidays = HolidaySet::korean().with_extra(&config.extra_holidays);
        info!("Store holds {} key(s)", database.keys()?.len());

        let mut app = Self {
            keymap,
            holidays,
            todos: TodoBook::load(&database),
            goals: GoalBook::load(&database),
            avoid: AvoidList::load(&database),
            assets: AssetBook::load(&database),
            board: Board::load(&database),
            assets_gate: state::load_gate(&database, ASSETS_PIN_KEY),
            board_gate: state::load_gate(&database, BOARD_PIN_KEY),
            config,
            config_path: None,
            database,
            ui: UiState::default(),
            modals: ModalState::default(),
            status: StatusState::default(),
        };
        app.sync_list_state();
        Ok(app)
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn month_grid(&self) -> MonthGrid {
        build_month_grid(self.ui.selected_date.date(), &self.todos, &self.holidays)
    }

    pub fn day_todos(&self) -> &[TodoItem] {
        self.todos.items_on(self.ui.selected_date)
    }

    /// Goals of the shown year in display order
    pub fn visible_goals(&self) -> Vec<GoalItem> {
        self.goals.sorted(self.ui.goal_year)
    }

    pub fn visible_avoid(&self) -> Vec<AvoidItem> {
        self.avoid.sorted()
    }

    pub fn asset_window(&self) -> Vec<WindowPoint> {
        build_window(self.ui.asset_anchor, &self.assets)
    }

    pub fn selected_asset_month(&self) -> MonthKey {
        self.ui.asset_anchor.add_months(self.ui.asset_cursor as i32)
    }

    pub fn asset_items(&self) -> &[AssetItem] {
        self.assets
            .entry(self.selected_asset_month())
            .map(|e| e.items.as_slice())
            .unwrap_or_default()
    }

    pub fn assets_locked(&self) -> bool {
        !self.assets_gate.is_unlocked()
    }

    /// Length of the list the selection moves through on the current tab
    pub fn current_list_len(&self) -> usize {
        match self.ui.current_tab {
            Tab::Calendar => self.day_todos().len(),
            Tab::Goals => self.goals.goals_in(self.ui.goal_year).len(),
            Tab::Avoid => self.avoid.items().len(),
            Tab::Assets if self.assets_locked() => 0,
            Tab::Assets => self.asset_items().len(),
            Tab::Board => self.board.posts().len(),
        }
    }

    /// Sync ListState with selected_index, clamping it to the current list
    pub fn sync_list_state(&mut self) {
        let len = self.current_list_len();
        if len == 0 {
            self.ui.selected_index = 0;
            self.ui.list_state.select(None);
        } else {
            self.ui.selected_index = self.ui.selected_index.min(len - 1);
            self.ui.list_state.select(Some(self.ui.selected_index));
        }
    }

    pub fn move_selection_up(&mut self) {
        self.ui.selected_index = self.ui.selected_index.saturating_sub(1);
        self.sync_list_state();
    }

    pub fn move_selection_down(&mut self) {
        self.ui.selected_index += 1;
        self.sync_list_state();
    }

    pub fn switch_tab(&mut self, new_tab: Tab) {
        self.ui.current_tab = new_tab;
        self.ui.selected_index = 0;
        self.sync_list_state();
    }

    /// Move the calendar selection by whole days
    pub fn move_day(&mut self, days: i64) {
        let date = self.ui.selected_date.date();
        let moved = if days >= 0 {
            date.checked_add_days(Days::new(days as u64))
        } else {
            date.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(moved) = moved {
            self.ui.selected_date = DateKey::new(moved);
            self.ui.selected_index = 0;
            self.sync_list_state();
        }
    }

    /// Previous/next month on Calendar and Assets, previous/next year on Goals
    pub fn shift_period(&mut self, delta: i32) {
        match self.ui.current_tab {
            Tab::Calendar => {
                let date = self.ui.selected_date.date();
                let months = Months::new(delta.unsigned_abs());
                // Day-of-month is clamped to the target month's length
                let moved = if delta >= 0 {
                    date.checked_add_months(months)
                } else {
                    date.checked_sub_months(months)
                };
                if let Some(moved) = moved {
                    self.ui.selected_date = DateKey::new(moved);
                }
            }
            Tab::Goals => self.ui.goal_year += delta,
            Tab::Assets => self.ui.asset_anchor = self.ui.asset_anchor.add_months(delta),
            Tab::Avoid | Tab::Board => return,
        }
        self.ui.selected_index = 0;
        self.sync_list_state();
    }

    pub fn go_to_today(&mut self) {
        let defaults = UiState::default();
        match self.ui.current_tab {
            Tab::Calendar => self.ui.selected_date = defaults.selected_date,
            Tab::Goals => self.ui.goal_year = defaults.goal_year,
            Tab::Assets => {
                self.ui.asset_anchor = defaults.asset_anchor;
                self.ui.asset_cursor = defaults.asset_cursor;
            }
            Tab::Avoid | Tab::Board => return,
        }
        self.ui.selected_index = 0;
        self.sync_list_state();
    }

    pub fn move_asset_cursor(&mut self, delta: i32) {
        let next = self.ui.asset_cursor as i32 + delta;
        self.ui.asset_cursor = next.clamp(0, WINDOW_MONTHS as i32 - 1) as usize;
        self.ui.selected_index = 0;
        self.sync_list_state();
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 3 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn open_prompt(&mut self, kind: PromptKind, initial: &str) {
        self.modals.prompt = Some(PromptState { kind, editor: Editor::from_string(initial) });
        self.ui.mode = Mode::Prompt;
    }

    pub fn cancel_prompt(&mut self) {
        self.modals.prompt = None;
        self.ui.mode = Mode::View;
    }

    /// Start the "new item" flow for the current tab
    pub fn start_new(&mut self) {
        let kind = match self.ui.current_tab {
            Tab::Calendar => PromptKind::TodoText,
            Tab::Goals => PromptKind::GoalTitle,
            Tab::Avoid => PromptKind::AvoidTitle,
            Tab::Assets => PromptKind::AssetName,
            Tab::Board => PromptKind::PostTitle,
        };
        self.open_prompt(kind, "");
    }

    pub fn start_edit_notes(&mut self) {
        let up = self
            .assets
            .tooltip(self.selected_asset_month())
            .map(|(up, _)| up.to_string())
            .unwrap_or_default();
        self.open_prompt(PromptKind::NoteUp, &up);
    }

    pub fn start_unlock(&mut self) {
        let (gate, kind, what) = match self.ui.current_tab {
            Tab::Assets => (&self.assets_gate, PromptKind::UnlockAssets, "Assets"),
            Tab::Board => (&self.board_gate, PromptKind::UnlockBoard, "Admin mode"),
            _ => return,
        };
        if gate.is_unlocked() {
            self.set_status_message(format!("{} already unlocked", what));
        } else {
            self.open_prompt(kind, "");
        }
    }

    pub fn lock_current(&mut self) {
        match self.ui.current_tab {
            Tab::Assets if self.assets_gate.has_pin() => {
                self.assets_gate.lock();
                self.sync_list_state();
                self.set_status_message("Assets locked".to_string());
            }
            Tab::Board if self.board_gate.has_pin() => {
                self.board_gate.lock();
                self.set_status_message("Admin mode off".to_string());
            }
            Tab::Assets | Tab::Board => self.set_status_message("No PIN set".to_string()),
            _ => {}
        }
    }

    pub fn start_set_pin(&mut self) {
        let (gate, kind) = match self.ui.current_tab {
            Tab::Assets => (&self.assets_gate, PromptKind::NewAssetsPin),
            Tab::Board => (&self.board_gate, PromptKind::NewBoardPin),
            _ => return,
        };
        if let Err(e) = gate.ensure_unlocked() {
            self.set_status_message(e.to_string());
            return;
        }
        self.open_prompt(kind, "");
    }

    /// Apply the open prompt's answer, possibly chaining into the next prompt
    pub fn submit_prompt(&mut self) {
        let Some(prompt) = self.modals.prompt.take() else {
            return;
        };
        self.ui.mode = Mode::View;
        let value = prompt.editor.value();

        match prompt.kind {
            PromptKind::TodoText => {
                let date = self.ui.selected_date;
                let next = self.todos.add(date, &value, 0);
                if next != self.todos {
                    self.commit_todos(next);
                    self.ui.selected_index = self.todos.items_on(date).len().saturating_sub(1);
                    self.sync_list_state();
                }
            }
            PromptKind::GoalTitle => {
                let next = self.goals.add(self.ui.goal_year, &value, None);
                if next != self.goals {
                    self.commit_goals(next);
                }
            }
            PromptKind::AvoidTitle => {
                let next = self.avoid.add(&value, None);
                if next != self.avoid {
                    self.commit_avoid(next);
                }
            }
            PromptKind::AssetName => {
                if !value.trim().is_empty() {
                    self.open_prompt(PromptKind::AssetAmount { name: value }, "");
                }
            }
            PromptKind::AssetAmount { name } => {
                let next = self.assets.add_item(self.selected_asset_month(), &name, &value);
                if next == self.assets {
                    debug!("Ignored asset amount {value:?}");
                } else {
                    self.commit_assets(next);
                }
            }
            PromptKind::NoteUp => {
                let down = self
                    .assets
                    .tooltip(self.selected_asset_month())
                    .map(|(_, down)| down.to_string())
                    .unwrap_or_default();
                self.open_prompt(PromptKind::NoteDown { up: value }, &down);
            }
            PromptKind::NoteDown { up } => {
                let next = self.assets.set_notes(self.selected_asset_month(), &up, &value);
                self.commit_assets(next);
            }
            PromptKind::PostTitle => {
                if !value.trim().is_empty() {
                    self.open_prompt(PromptKind::PostContent { title: value }, "");
                }
            }
            PromptKind::PostContent { title } => {
                if !value.trim().is_empty() {
                    self.open_prompt(PromptKind::PostAuthor { title, content: value }, "");
                }
            }
            PromptKind::PostAuthor { title, content } => {
                let now = Local::now().naive_local();
                let next = self.board.post(&title, &content, &value, &self.config.default_author, now);
                if next != self.board {
                    self.commit_board(next);
                    self.ui.selected_index = 0;
                    self.sync_list_state();
                }
            }
            PromptKind::UnlockAssets => match self.assets_gate.try_unlock(&value) {
                Ok(()) => {
                    self.sync_list_state();
                    self.set_status_message("Assets unlocked".to_string());
                }
                Err(e) => self.set_status_message(e.to_string()),
            },
            PromptKind::UnlockBoard => match self.board_gate.try_unlock(&value) {
                Ok(()) => self.set_status_message("Admin mode on".to_string()),
                Err(e) => self.set_status_message(e.to_string()),
            },
            PromptKind::NewAssetsPin => self.change_pin(ASSETS_PIN_KEY, &value),
            PromptKind::NewBoardPin => self.change_pin(BOARD_PIN_KEY, &value),
        }
    }

    fn change_pin(&mut self, key: &'static str, new_pin: &str) {
        let gate = if key == ASSETS_PIN_KEY { &mut self.assets_gate } else { &mut self.board_gate };
        if let Err(e) = gate.set_pin(new_pin) {
            self.set_status_message(e.to_string());
            return;
        }
        let removed = !gate.has_pin();
        let result = state::save_pin(&self.database, key, gate);
        if result.is_ok() {
            info!("PIN for {key} changed");
            let msg = if removed { "PIN removed" } else { "PIN updated" };
            self.set_status_message(msg.to_string());
        }
        self.report_save("PIN", result);
    }

    pub fn toggle_selected(&mut self) {
        match self.ui.current_tab {
            Tab::Calendar => {
                let date = self.ui.selected_date;
                if let Some(item) = self.day_todos().get(self.ui.selected_index) {
                    let next = self.todos.toggle(date, &item.id);
                    self.commit_todos(next);
                }
            }
            Tab::Goals => {
                let year = self.ui.goal_year;
                if let Some(goal) = self.visible_goals().get(self.ui.selected_index) {
                    let next = self.goals.toggle(year, &goal.id);
                    self.commit_goals(next);
                }
            }
            _ => {}
        }
    }

    /// Stars go 0, 1, 2, 3, then back to 0
    pub fn cycle_stars(&mut self) {
        if self.ui.current_tab != Tab::Calendar {
            return;
        }
        let date = self.ui.selected_date;
        if let Some(item) = self.day_todos().get(self.ui.selected_index) {
            let stars = (item.stars + 1) % (MAX_STARS + 1);
            let next = self.todos.set_stars(date, &item.id, stars);
            self.commit_todos(next);
        }
    }

    /// Cycle priority of the selected goal or avoid entry. The selection follows the
    /// item to its new place in the sorted list.
    pub fn cycle_priority(&mut self) {
        match self.ui.current_tab {
            Tab::Goals => {
                let year = self.ui.goal_year;
                if let Some(goal) = self.visible_goals().get(self.ui.selected_index).cloned() {
                    let next = self.goals.cycle_prio(year, &goal.id);
                    self.commit_goals(next);
                    let pos = self.visible_goals().iter().position(|g| g.id == goal.id);
                    self.ui.selected_index = pos.unwrap_or(0);
                    self.sync_list_state();
                }
            }
            Tab::Avoid => {
                if let Some(item) = self.visible_avoid().get(self.ui.selected_index).cloned() {
                    let next = self.avoid.cycle_prio(&item.id);
                    self.commit_avoid(next);
                    let pos = self.visible_avoid().iter().position(|a| a.id == item.id);
                    self.ui.selected_index = pos.unwrap_or(0);
                    self.sync_list_state();
                }
            }
            _ => {}
        }
    }

    /// Open the delete confirmation for the selected item
    pub fn request_delete(&mut self) {
        let index = self.ui.selected_index;
        let target = match self.ui.current_tab {
            Tab::Calendar => self.day_todos().get(index).cloned().map(|item| DeleteTarget::Todo {
                date: self.ui.selected_date,
                item,
            }),
            Tab::Goals => self.visible_goals().get(index).cloned().map(|item| DeleteTarget::Goal {
                year: self.ui.goal_year,
                item,
            }),
            Tab::Avoid => self.visible_avoid().get(index).cloned().map(|item| DeleteTarget::Avoid { item }),
            Tab::Assets => self.asset_items().get(index).cloned().map(|item| DeleteTarget::AssetItem {
                month: self.selected_asset_month(),
                item,
            }),
            Tab::Board => {
                if let Err(e) = self.board_gate.ensure_unlocked() {
                    self.set_status_message(e.to_string());
                    return;
                }
                self.board.posts().get(index).cloned().map(|item| DeleteTarget::Post { item })
            }
        };
        if let Some(target) = target {
            self.modals.delete_confirmation = Some(target);
            self.modals.delete_modal_selection = 0;
            self.ui.mode = Mode::ConfirmDelete;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.modals.delete_confirmation = None;
        self.ui.mode = Mode::View;
    }

    pub fn confirm_delete(&mut self) {
        let Some(target) = self.modals.delete_confirmation.take() else {
            return;
        };
        self.ui.mode = Mode::View;
        match target {
            DeleteTarget::Todo { date, item } => {
                let next = self.todos.remove(date, &item.id);
                self.commit_todos(next);
            }
            DeleteTarget::Goal { year, item } => {
                let next = self.goals.remove(year, &item.id);
                self.commit_goals(next);
            }
            DeleteTarget::Avoid { item } => {
                let next = self.avoid.remove(&item.id);
                self.commit_avoid(next);
            }
            DeleteTarget::AssetItem { month, item } => {
                let next = self.assets.remove_item(month, &item.id);
                self.commit_assets(next);
            }
            DeleteTarget::Post { item } => match self.board.remove(&item.id, &self.board_gate) {
                Ok(next) => self.commit_board(next),
                Err(e) => self.set_status_message(e.to_string()),
            },
        }
        self.sync_list_state();
    }

    pub fn cycle_theme(&mut self) {
        let name = self.config.next_theme_name();
        if let Err(e) = self.config.set_theme(&name) {
            self.set_status_message(e.to_string());
            return;
        }
        if let Some(path) = self.config_path.clone() {
            if let Err(e) = self.config.save_to_path(&path) {
                error!("Failed to save theme: {e}");
            }
        }
        self.set_status_message(format!("Theme: {}", name));
    }

    fn commit_todos(&mut self, next: TodoBook) {
        self.todos = next;
        let result = self.todos.save(&self.database);
        self.report_save("to-dos", result);
    }

    fn commit_goals(&mut self, next: GoalBook) {
        self.goals = next;
        let result = self.goals.save(&self.database);
        self.report_save("goals", result);
    }

    fn commit_avoid(&mut self, next: AvoidList) {
        self.avoid = next;
        let result = self.avoid.save(&self.database);
        self.report_save("avoid list", result);
    }

    fn commit_assets(&mut self, next: AssetBook) {
        self.assets = next;
        let result = self.assets.save(&self.database);
        self.report_save("assets", result);
        self.sync_list_state();
    }

    fn commit_board(&mut self, next: Board) {
        self.board = next;
        let result = self.board.save(&self.database);
        self.report_save("board", result);
    }

    fn report_save(&mut self, what: &str, result: Result<(), StateError>) {
        if let Err(e) = result {
            error!("Failed to save {what}: {e}");
            self.set_status_message(format!("Failed to save {}: {}", what, e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn test_app() -> App {
        App::new(Config::default(), Database::open_in_memory().unwrap()).unwrap()
    }

    fn type_and_submit(app: &mut App, text: &str) {
        if let Some(prompt) = app.modals.prompt.as_mut() {
            for c in text.chars() {
                prompt.editor.insert_char(c);
            }
        }
        app.submit_prompt();
    }

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(Tab::Board.next(), Tab::Calendar);
        assert_eq!(Tab::Calendar.prev(), Tab::Board);
        assert_eq!(Tab::Assets.index(), 3);
    }

    #[test]
    fn test_add_todo_persists() {
        let mut app = test_app();
        app.start_new();
        assert_eq!(app.ui.mode, Mode::Prompt);
        type_and_submit(&mut app, "water plants");

        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.day_todos().len(), 1);
        assert_eq!(TodoBook::load(&app.database), app.todos);
    }

    #[test]
    fn test_blank_todo_is_ignored() {
        let mut app = test_app();
        app.start_new();
        type_and_submit(&mut app, "   ");
        assert!(app.day_todos().is_empty());
    }

    #[test]
    fn test_stars_cycle_back_to_zero() {
        let mut app = test_app();
        app.start_new();
        type_and_submit(&mut app, "x");
        for _ in 0..3 {
            app.cycle_stars();
        }
        assert_eq!(app.day_todos()[0].stars, 3);
        app.cycle_stars();
        assert_eq!(app.day_todos()[0].stars, 0);
    }

    #[test]
    fn test_priority_selection_follows_item() {
        let mut app = test_app();
        app.switch_tab(Tab::Goals);
        for title in ["a", "b"] {
            app.start_new();
            type_and_submit(&mut app, title);
        }
        app.ui.selected_index = 1;
        app.sync_list_state();
        app.cycle_priority();
        // "b" now has P1 and sorts first
        assert_eq!(app.visible_goals()[0].title, "b");
        assert_eq!(app.ui.selected_index, 0);
    }

    #[test]
    fn test_asset_flow_chains_prompts() {
        let mut app = test_app();
        app.switch_tab(Tab::Assets);
        app.start_new();
        type_and_submit(&mut app, "savings");
        assert!(matches!(
            app.modals.prompt.as_ref().map(|p| &p.kind),
            Some(PromptKind::AssetAmount { .. })
        ));
        type_and_submit(&mut app, "150000000");
        assert_eq!(app.assets.total(app.selected_asset_month()), Some(150_000_000.0));

        app.start_new();
        type_and_submit(&mut app, "bonds");
        type_and_submit(&mut app, "not a number");
        assert_eq!(app.asset_items().len(), 1);
    }

    #[test]
    fn test_locked_assets_hide_items() {
        let mut app = test_app();
        app.switch_tab(Tab::Assets);
        app.start_new();
        type_and_submit(&mut app, "cash");
        type_and_submit(&mut app, "10");

        app.start_set_pin();
        type_and_submit(&mut app, "1234");
        app.lock_current();
        assert!(app.assets_locked());
        assert_eq!(app.current_list_len(), 0);

        app.start_unlock();
        type_and_submit(&mut app, "0000");
        assert!(app.assets_locked());
        assert_eq!(app.status.message.as_deref(), Some("Incorrect PIN"));

        app.start_unlock();
        type_and_submit(&mut app, "1234");
        assert!(!app.assets_locked());
        assert_eq!(app.current_list_len(), 1);
    }

    #[test]
    fn test_board_delete_requires_admin() {
        let mut app = test_app();
        app.switch_tab(Tab::Board);
        app.start_new();
        type_and_submit(&mut app, "Hello");
        type_and_submit(&mut app, "First post");
        type_and_submit(&mut app, "");
        assert_eq!(app.board.posts()[0].author, "anonymous");

        app.start_set_pin();
        type_and_submit(&mut app, "42");
        app.lock_current();

        app.request_delete();
        assert_eq!(app.ui.mode, Mode::View);
        assert!(app.modals.delete_confirmation.is_none());

        app.start_unlock();
        type_and_submit(&mut app, "42");
        app.request_delete();
        assert_eq!(app.ui.mode, Mode::ConfirmDelete);
        app.confirm_delete();
        assert!(app.board.posts().is_empty());
        assert!(Board::load(&app.database).posts().is_empty());
    }

    #[test]
    fn test_shift_period_clamps_day() {
        let mut app = test_app();
        app.ui.selected_date = "2025-01-31".parse().unwrap();
        app.shift_period(1);
        assert_eq!(app.ui.selected_date.to_string(), "2025-02-28");
        app.shift_period(-2);
        assert_eq!(app.ui.selected_date.to_string(), "2024-12-28");
    }

    #[test]
    fn test_asset_cursor_stays_in_window() {
        let mut app = test_app();
        app.switch_tab(Tab::Assets);
        app.move_asset_cursor(5);
        assert_eq!(app.ui.asset_cursor, WINDOW_MONTHS - 1);
        app.move_asset_cursor(-100);
        assert_eq!(app.ui.asset_cursor, 0);
        assert_eq!(app.selected_asset_month(), app.ui.asset_anchor);
    }
}
