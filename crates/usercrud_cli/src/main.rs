//! Console entry point for the user directory.
//!
//! # Responsibility
//! - Merge configuration from file, environment and flags.
//! - Open the store once; a failure here ends the process before the menu.
//! - Run the menu on stdin/stdout and shut the store down on exit.

mod menu;
mod settings;

use anyhow::Context;
use clap::Parser;
use log::info;
use menu::Menu;
use settings::AppConfig;
use std::io;
use std::path::PathBuf;
use usercrud_core::{init_logging, StoreContext, UserDao};

#[derive(Debug, Parser)]
#[command(name = "usercrud", version)]
#[command(about = "Console user directory backed by SQLite", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./usercrud.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,
    /// Keep the store in memory; nothing is written to disk
    #[arg(long)]
    in_memory: bool,
    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,
    /// Directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(db) = &self.db {
            config.store.path = db.clone();
        }
        if self.in_memory {
            config.store.in_memory = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.logging.dir = dir.clone();
        }
    }
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("usercrud: {err:#}");
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let base_dir = std::env::current_dir().context("failed to resolve working directory")?;
    if let Err(err) = init_logging(&config.logging.level, &config.log_dir(&base_dir)) {
        eprintln!("usercrud: file logging disabled: {err}");
    }

    let mut context =
        StoreContext::open(config.store_settings(&base_dir)).context("failed to open user store")?;
    info!("event=app_ready module=cli status=ok");

    let result = Menu::new(UserDao::new(&context), io::stdin().lock(), io::stdout().lock()).run();
    context.shutdown();
    result.context("console I/O failed")
}
