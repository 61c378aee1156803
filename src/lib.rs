pub mod assets;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod database;
pub mod dates;
pub mod gate;
pub mod holidays;
pub mod logging;
pub mod models;
pub mod priority;
pub mod state;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use database::Database;
pub use dates::{DateKey, MonthKey};
pub use models::{AvoidList, Board, GoalBook, TodoBook};
pub use utils::Profile;
