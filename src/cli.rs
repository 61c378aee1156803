use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;

use crate::Config;
use crate::assets::{AssetBook, build_window, format_eok};
use crate::calendar::{MonthGrid, Slot, build_month_grid};
use crate::database::{Database, DatabaseError};
use crate::dates::{DateKey, KeyParseError, MonthKey};
use crate::gate::{GateError, PinGate};
use crate::holidays::HolidaySet;
use crate::models::{AvoidList, Board, GoalBook, ItemId, TodoBook};
use crate::state::{self, ASSETS_PIN_KEY, BOARD_PIN_KEY, StateError};
use crate::utils::{parse_date, parse_month};

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Daybook - calendar to-dos, goals, an avoid list, assets and a message board")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    /// Log level: off, error, warn, info, debug, trace. RUST_LOG overrides it.
    #[arg(long, default_value_t = LevelFilter::WARN)]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Print the calendar grid for a month
    Month {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },
    /// Per-day to-do items
    Todo {
        #[command(subcommand)]
        action: TodoCommand,
    },
    /// Yearly goals
    Goal {
        #[command(subcommand)]
        action: GoalCommand,
    },
    /// Things to avoid
    Avoid {
        #[command(subcommand)]
        action: AvoidCommand,
    },
    /// Monthly asset tracker
    Asset {
        #[command(subcommand)]
        action: AssetCommand,
    },
    /// Message board
    Board {
        #[command(subcommand)]
        action: BoardCommand,
    },
}

#[derive(Subcommand)]
pub enum TodoCommand {
    /// Add a to-do to a day (YYYY-MM-DD, today, tomorrow)
    Add {
        date: String,
        text: String,
        /// Star rating 0-3
        #[arg(long, default_value_t = 0)]
        stars: u8,
    },
    /// List to-dos for a day (default today)
    List { date: Option<String> },
    /// Flip a to-do between open and done
    Toggle { date: String, id: String },
    /// Remove a to-do
    Remove { date: String, id: String },
}

#[derive(Subcommand)]
pub enum GoalCommand {
    /// Add a goal for a year (default current year)
    Add {
        title: String,
        #[arg(long)]
        year: Option<i32>,
        /// Priority 1-3
        #[arg(long)]
        prio: Option<u8>,
    },
    /// List goals in priority order
    List {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Flip a goal between open and done
    Toggle {
        id: String,
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
pub enum AvoidCommand {
    /// Add something to avoid
    Add {
        title: String,
        /// Priority 1-3
        #[arg(long)]
        prio: Option<u8>,
    },
    /// List in priority order
    List,
}

#[derive(Subcommand)]
pub enum AssetCommand {
    /// Record a holding for a month
    Add {
        month: String,
        name: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        #[arg(long)]
        pin: Option<String>,
    },
    /// Show twelve months of totals starting at a month
    Window {
        /// First month (YYYY-MM), defaults to eleven months ago
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        pin: Option<String>,
    },
    /// Set the up/down notes for a month
    Note {
        month: String,
        #[arg(long, default_value = "")]
        up: String,
        #[arg(long, default_value = "")]
        down: String,
        #[arg(long)]
        pin: Option<String>,
    },
    /// Change the assets PIN (empty string removes it)
    SetPin {
        new_pin: String,
        /// Current PIN, if one is set
        #[arg(long)]
        pin: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BoardCommand {
    /// Publish a post
    Post {
        title: String,
        content: String,
        #[arg(long, default_value = "")]
        author: String,
    },
    /// List posts, newest first
    List,
    /// Delete a post (admin)
    Delete {
        id: String,
        #[arg(long)]
        pin: Option<String>,
    },
    /// Change the board admin PIN (empty string removes it)
    SetPin {
        new_pin: String,
        #[arg(long)]
        pin: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Failed to save: {0}")]
    StateError(#[from] StateError),
    #[error("{0}")]
    KeyError(#[from] KeyParseError),
    #[error("{0}")]
    GateError(#[from] GateError),
    #[error("No item with id {0}")]
    NotFound(String),
}

/// Run a one-shot command against the store
pub fn run(command: Commands, config: &Config, db: &Database) -> Result<(), CliError> {
    match command {
        Commands::Tui => Ok(()),
        Commands::Month { month } => handle_month(month, config, db),
        Commands::Todo { action } => handle_todo(action, db),
        Commands::Goal { action } => handle_goal(action, db),
        Commands::Avoid { action } => handle_avoid(action, db),
        Commands::Asset { action } => handle_asset(action, db),
        Commands::Board { action } => handle_board(action, config, db),
    }
}

fn handle_month(month: Option<String>, config: &Config, db: &Database) -> Result<(), CliError> {
    let month = match month {
        Some(m) => parse_month(&m)?,
        None => MonthKey::current(),
    };
    let reference = month
        .first_day()
        .ok_or_else(|| KeyParseError::InvalidMonth(month.to_string()))?;
    let holidays = HolidaySet::korean().with_extra(&config.extra_holidays);
    let grid = build_month_grid(reference, &TodoBook::load(db), &holidays);
    debug!(
        "{}: {} days over {} weeks, {} leading blanks",
        grid.month,
        grid.day_count(),
        grid.week_count(),
        grid.leading_blanks()
    );
    print!("{}", format_month_grid(&grid, config.max_day_markers));
    Ok(())
}

/// Plain-text grid: a day line (`*` marks Sundays and holidays) and a summary
/// line (to-do count and stars) per week
pub fn format_month_grid(grid: &MonthGrid, marker_limit: usize) -> String {
    const CELL: usize = 6;
    let mut out = format!("{:^width$}\n", grid.month.to_string(), width = CELL * 7);
    for name in ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"] {
        out.push_str(&format!("{:>width$}", name, width = CELL - 1));
        out.push(' ');
    }
    out.push('\n');

    for week in grid.weeks() {
        let mut days = String::new();
        let mut summary = String::new();
        for slot in week {
            match slot {
                Slot::Empty => {
                    days.push_str(&" ".repeat(CELL));
                    summary.push_str(&" ".repeat(CELL));
                }
                Slot::Day(day) => {
                    let flag = if day.needs_attention() { '*' } else { ' ' };
                    days.push_str(&format!("{:>4}{} ", day.day(), flag));
                    let cell = match day.markers(marker_limit) {
                        0 => String::new(),
                        n => format!("{}{}", n, "★".repeat(day.max_stars as usize)),
                    };
                    summary.push_str(&format!("{:>5} ", cell));
                }
            }
        }
        out.push_str(days.trim_end());
        out.push('\n');
        out.push_str(summary.trim_end());
        out.push('\n');
    }
    out
}

fn handle_todo(action: TodoCommand, db: &Database) -> Result<(), CliError> {
    let todos = TodoBook::load(db);
    match action {
        TodoCommand::Add { date, text, stars } => {
            let date = parse_date(&date)?;
            let next = todos.add(date, &text, stars);
            if next == todos {
                println!("Nothing added: text is empty");
                return Ok(());
            }
            next.save(db)?;
            if let Some(item) = next.items_on(date).last() {
                info!("Added to-do {} on {}", item.id, date);
                println!("To-do added on {} (ID: {})", date, item.id);
            }
        }
        TodoCommand::List { date } => {
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => DateKey::today(),
            };
            let items = todos.items_on(date);
            if items.is_empty() {
                println!("No to-dos on {}", date);
            }
            for item in items {
                let status = if item.done { "✓" } else { "○" };
                let stars = "★".repeat(item.stars as usize);
                println!("{} {} {} [{}]", status, item.text, stars, item.id);
            }
        }
        TodoCommand::Toggle { date, id } => {
            let date = parse_date(&date)?;
            let id = require_id(todos.items_on(date).iter().map(|i| &i.id), &id)?;
            todos.toggle(date, &id).save(db)?;
            println!("To-do {} toggled", id);
        }
        TodoCommand::Remove { date, id } => {
            let date = parse_date(&date)?;
            let id = require_id(todos.items_on(date).iter().map(|i| &i.id), &id)?;
            todos.remove(date, &id).save(db)?;
            println!("To-do {} removed", id);
        }
    }
    Ok(())
}

fn handle_goal(action: GoalCommand, db: &Database) -> Result<(), CliError> {
    let goals = GoalBook::load(db);
    let this_year = MonthKey::current().year();
    match action {
        GoalCommand::Add { title, year, prio } => {
            let year = year.unwrap_or(this_year);
            let next = goals.add(year, &title, prio);
            if next == goals {
                println!("Nothing added: title is empty");
                return Ok(());
            }
            next.save(db)?;
            if let Some(goal) = next.goals_in(year).last() {
                println!("Goal added for {} (ID: {})", year, goal.id);
            }
        }
        GoalCommand::List { year } => {
            let year = year.unwrap_or(this_year);
            let sorted = goals.sorted(year);
            if sorted.is_empty() {
                println!("No goals for {}", year);
            }
            for goal in sorted {
                let status = if goal.done { "✓" } else { "○" };
                let prio = goal.prio.map(|p| format!("P{} ", p)).unwrap_or_default();
                println!("{} {}{} [{}]", status, prio, goal.title, goal.id);
            }
        }
        GoalCommand::Toggle { id, year } => {
            let year = year.unwrap_or(this_year);
            let id = require_id(goals.goals_in(year).iter().map(|g| &g.id), &id)?;
            goals.toggle(year, &id).save(db)?;
            println!("Goal {} toggled", id);
        }
    }
    Ok(())
}

fn handle_avoid(action: AvoidCommand, db: &Database) -> Result<(), CliError> {
    let list = AvoidList::load(db);
    match action {
        AvoidCommand::Add { title, prio } => {
            let next = list.add(&title, prio);
            if next == list {
                println!("Nothing added: title is empty");
                return Ok(());
            }
            next.save(db)?;
            println!("Added to the avoid list");
        }
        AvoidCommand::List => {
            for item in list.sorted() {
                let prio = item.prio.map(|p| format!("P{} ", p)).unwrap_or_default();
                println!("✗ {}{} [{}]", prio, item.title, item.id);
            }
        }
    }
    Ok(())
}

/// Load a gate and unlock it with the PIN given on the command line, if any
fn open_gate(db: &Database, key: &str, pin: Option<&str>) -> Result<PinGate, CliError> {
    let mut gate = state::load_gate(db, key);
    if let Some(pin) = pin {
        if gate.has_pin() {
            gate.try_unlock(pin)?;
        }
    }
    gate.ensure_unlocked()?;
    Ok(gate)
}

fn handle_asset(action: AssetCommand, db: &Database) -> Result<(), CliError> {
    match action {
        AssetCommand::Add { month, name, amount, pin } => {
            open_gate(db, ASSETS_PIN_KEY, pin.as_deref())?;
            let month = parse_month(&month)?;
            let book = AssetBook::load(db);
            let next = book.add_item(month, &name, &amount);
            if next == book {
                debug!("Ignored asset input name={name:?} amount={amount:?}");
                println!("Nothing added: name must be set and amount must be a number");
                return Ok(());
            }
            next.save(db)?;
            println!("{} total: {}", month, format_eok(next.total(month)));
        }
        AssetCommand::Window { from, pin } => {
            open_gate(db, ASSETS_PIN_KEY, pin.as_deref())?;
            let anchor = match from {
                Some(m) => parse_month(&m)?,
                None => MonthKey::current().add_months(-11),
            };
            let book = AssetBook::load(db);
            for point in build_window(anchor, &book) {
                let notes = book
                    .tooltip(point.month)
                    .map(|(up, down)| format_notes(up, down))
                    .unwrap_or_default();
                println!("{}  {:>12}{}", point.month, format_eok(point.total), notes);
            }
        }
        AssetCommand::Note { month, up, down, pin } => {
            open_gate(db, ASSETS_PIN_KEY, pin.as_deref())?;
            let month = parse_month(&month)?;
            AssetBook::load(db).set_notes(month, &up, &down).save(db)?;
            println!("Notes saved for {}", month);
        }
        AssetCommand::SetPin { new_pin, pin } => {
            let mut gate = open_gate(db, ASSETS_PIN_KEY, pin.as_deref())?;
            gate.set_pin(&new_pin)?;
            state::save_pin(db, ASSETS_PIN_KEY, &gate)?;
            println!("Assets PIN updated");
        }
    }
    Ok(())
}

fn format_notes(up: &str, down: &str) -> String {
    let mut notes = String::new();
    if !up.is_empty() {
        notes.push_str(&format!("  ▲ {}", up));
    }
    if !down.is_empty() {
        notes.push_str(&format!("  ▼ {}", down));
    }
    notes
}

fn handle_board(action: BoardCommand, config: &Config, db: &Database) -> Result<(), CliError> {
    let board = Board::load(db);
    match action {
        BoardCommand::Post { title, content, author } => {
            let now = chrono::Local::now().naive_local();
            let next = board.post(&title, &content, &author, &config.default_author, now);
            if next == board {
                println!("Nothing posted: title and content are required");
                return Ok(());
            }
            next.save(db)?;
            println!("Posted (ID: {})", next.posts()[0].id);
        }
        BoardCommand::List => {
            for post in board.posts() {
                println!("[{}] {} - {} ({})", post.id, post.title, post.author, post.timestamp);
                println!("    {}", post.content);
            }
        }
        BoardCommand::Delete { id, pin } => {
            let admin = open_gate(db, BOARD_PIN_KEY, pin.as_deref())?;
            let id = require_id(board.posts().iter().map(|p| &p.id), &id)?;
            board.remove(&id, &admin)?.save(db)?;
            println!("Post {} deleted", id);
        }
        BoardCommand::SetPin { new_pin, pin } => {
            let mut gate = open_gate(db, BOARD_PIN_KEY, pin.as_deref())?;
            gate.set_pin(&new_pin)?;
            state::save_pin(db, BOARD_PIN_KEY, &gate)?;
            println!("Board admin PIN updated");
        }
    }
    Ok(())
}

fn require_id<'a>(mut ids: impl Iterator<Item = &'a ItemId>, raw: &str) -> Result<ItemId, CliError> {
    let wanted = ItemId::from(raw);
    if ids.any(|id| id == &wanted) {
        Ok(wanted)
    } else {
        Err(CliError::NotFound(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Config, Database) {
        (Config::default(), Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_cli_parses_nested_commands() {
        let cli = Cli::try_parse_from(["daybook", "--dev", "asset", "add", "2025-01", "loan", "-500"]).unwrap();
        assert!(cli.dev);
        match cli.command {
            Some(Commands::Asset { action: AssetCommand::Add { amount, .. } }) => assert_eq!(amount, "-500"),
            _ => panic!("expected asset add"),
        }
    }

    #[test]
    fn test_todo_add_and_toggle() {
        let (config, db) = setup();
        run(
            Commands::Todo {
                action: TodoCommand::Add { date: "2025-06-01".into(), text: "dentist".into(), stars: 2 },
            },
            &config,
            &db,
        )
        .unwrap();

        let day: DateKey = "2025-06-01".parse().unwrap();
        let id = TodoBook::load(&db).items_on(day)[0].id.to_string();
        run(
            Commands::Todo { action: TodoCommand::Toggle { date: "2025-06-01".into(), id } },
            &config,
            &db,
        )
        .unwrap();
        assert!(TodoBook::load(&db).items_on(day)[0].done);
    }

    #[test]
    fn test_unknown_id_is_reported() {
        let (config, db) = setup();
        let err = run(
            Commands::Todo { action: TodoCommand::Remove { date: "2025-06-01".into(), id: "nope".into() } },
            &config,
            &db,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::NotFound(_)));
    }

    #[test]
    fn test_asset_commands_respect_pin() {
        let (config, db) = setup();
        run(
            Commands::Asset { action: AssetCommand::SetPin { new_pin: "1234".into(), pin: None } },
            &config,
            &db,
        )
        .unwrap();

        let add = |pin: Option<&str>| {
            run(
                Commands::Asset {
                    action: AssetCommand::Add {
                        month: "2025-01".into(),
                        name: "cash".into(),
                        amount: "100".into(),
                        pin: pin.map(String::from),
                    },
                },
                &config,
                &db,
            )
        };
        assert!(matches!(add(None), Err(CliError::GateError(GateError::Locked))));
        assert!(matches!(add(Some("0000")), Err(CliError::GateError(GateError::WrongPin))));
        add(Some("1234")).unwrap();

        let month: MonthKey = "2025-01".parse().unwrap();
        assert_eq!(AssetBook::load(&db).total(month), Some(100.0));
    }

    #[test]
    fn test_invalid_amount_is_ignored() {
        let (config, db) = setup();
        run(
            Commands::Asset {
                action: AssetCommand::Add {
                    month: "2025-01".into(),
                    name: "cash".into(),
                    amount: "lots".into(),
                    pin: None,
                },
            },
            &config,
            &db,
        )
        .unwrap();
        assert_eq!(AssetBook::load(&db), AssetBook::default());
    }

    #[test]
    fn test_board_delete_needs_admin_pin() {
        let (config, db) = setup();
        run(
            Commands::Board {
                action: BoardCommand::Post { title: "hi".into(), content: "there".into(), author: String::new() },
            },
            &config,
            &db,
        )
        .unwrap();
        run(
            Commands::Board { action: BoardCommand::SetPin { new_pin: "9".into(), pin: None } },
            &config,
            &db,
        )
        .unwrap();

        let id = Board::load(&db).posts()[0].id.to_string();
        assert_eq!(Board::load(&db).posts()[0].author, "anonymous");
        let delete = |pin: Option<&str>| {
            run(
                Commands::Board { action: BoardCommand::Delete { id: id.clone(), pin: pin.map(String::from) } },
                &config,
                &db,
            )
        };
        assert!(delete(None).is_err());
        delete(Some("9")).unwrap();
        assert!(Board::load(&db).posts().is_empty());
    }

    #[test]
    fn test_format_month_grid() {
        let reference = "2025-10-01".parse::<DateKey>().unwrap().date();
        let todos = TodoBook::default().add("2025-10-15".parse().unwrap(), "x", 2);
        let grid = build_month_grid(reference, &todos, &HolidaySet::korean());
        let text = format_month_grid(&grid, 10);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("2025-10"));
        assert!(lines[1].contains("Mon"));
        // header + weekday row + two lines per week
        assert_eq!(lines.len(), 2 + grid.week_count() * 2);
        assert!(text.contains("5*"));
        assert!(text.contains("1★★"));
    }
}
