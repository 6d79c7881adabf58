use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::LinkBoard;
use crate::config::ConfigLoader;
use crate::storage;

pub mod commands;

use self::commands::{AddArgs, RemindArgs, RemoveArgs, SortArgs};

#[derive(Parser, Debug)]
#[command(
    name = "linkdeck",
    version,
    about = "Terminal bookmark manager with natural-language reminders"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over LINKDECK_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over LINKDECK_DATA)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the sorted link collection (default)
    List,
    /// Add a new link
    Add(AddArgs),
    /// Remove a link by text and URL
    Remove(RemoveArgs),
    /// Set, replace, or clear the reminder on a link
    Remind(RemindArgs),
    /// Change the sort order applied to the collection
    Sort(SortArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var("LINKDECK_CONFIG", path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var("LINKDECK_DATA", path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    let paths = loader.paths().clone();
    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let config = loader.load_or_init()?;
    let store = storage::init(&paths, &config.storage)?;

    let mut board = LinkBoard::load(store, config.default_sort);
    match cli.command.unwrap_or(Commands::List) {
        Commands::List => commands::list_links(&board),
        Commands::Add(args) => commands::add_link(&mut board, args),
        Commands::Remove(args) => commands::remove_link(&mut board, args),
        Commands::Remind(args) => commands::set_reminder(&mut board, args),
        Commands::Sort(args) => commands::set_sort(&mut board, args),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(())
    })
    .map(|_| ())
}
