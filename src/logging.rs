use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Filter for this crate at `level`, unless RUST_LOG is set
fn env_filter(level: LevelFilter) -> EnvFilter {
    match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    }
}

/// Log to stderr. Used by the one-shot CLI commands.
pub fn init_stderr_logger(level: LevelFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to a file, since stderr belongs to the terminal UI while it runs.
/// Falls back to no logging when the file cannot be opened.
pub fn init_file_logger(level: LevelFilter, log_path: &Path) {
    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = match File::options().create(true).append(true).open(log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Could not open log file {}: {e}", log_path.display());
            return;
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
