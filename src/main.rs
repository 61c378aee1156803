use clap::Parser;
use color_eyre::Result;
use daybook::{Config, Database, Profile, cli::{Cli, Commands}, logging, utils};
use std::path::Path;
use tracing::info;

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let command = cli.command.unwrap_or(Commands::Tui);
    let interactive = matches!(command, Commands::Tui);

    // The TUI owns the terminal, so its logs go to a file
    if interactive {
        let log_dir = utils::get_data_dir(profile).unwrap_or_else(|| Path::new(".").to_path_buf());
        logging::init_file_logger(cli.log_level, &log_dir.join("daybook.log"));
    } else {
        logging::init_stderr_logger(cli.log_level);
    }

    let config_path = match &cli.config {
        Some(path) => utils::expand_path(path),
        None => Config::get_config_path(profile)?,
    };
    let config = Config::load_from_path(&config_path, profile)?;

    let db_path = config.get_database_path();
    info!("Opening store at {}", db_path.display());
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;

    if interactive {
        let app = daybook::tui::App::new(config, db)?.with_config_path(config_path);
        daybook::tui::run_event_loop(app)?;
    } else {
        daybook::cli::run(command, &config, &db)?;
    }

    Ok(())
}
