//! `usuario` command-line entry point.
//!
//! # Responsibility
//! - Parse flags and environment configuration.
//! - Compose logging, storage and the user store, then hand over to the menu.

mod input;
mod menu;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::io;
use std::path::{Path, PathBuf};
use usuario_core::db::open_db;
use usuario_core::{
    core_version, default_log_level, init_logging, InMemoryUserRepository,
    SqliteUserRepository, UserService, UserStore,
};

use crate::menu::Menu;

const DEFAULT_DB_FILE: &str = "usuarios.sqlite3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Console user manager: add, list, edit, find and delete users.
#[derive(Debug, Parser)]
#[command(name = "usuario", version = core_version())]
struct Cli {
    /// SQLite database file holding the users table.
    #[arg(long, env = "USUARIO_DB", default_value = DEFAULT_DB_FILE)]
    db: PathBuf,

    /// Keep users in memory only; nothing is written to disk.
    #[arg(long)]
    memory: bool,

    /// Log level; defaults to `debug` in debug builds and `info` in release.
    #[arg(long, env = "USUARIO_LOG_LEVEL", value_enum, ignore_case = true)]
    log_level: Option<LogLevel>,

    /// Directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "USUARIO_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Print all users as JSON and exit instead of opening the menu.
    #[arg(long)]
    export_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.map_or(default_log_level(), LogLevel::as_str);
        let log_dir = absolute_dir(log_dir)?;
        init_logging(level, &log_dir)
            .with_context(|| format!("cannot start logging in `{}`", log_dir.display()))?;
    }

    if cli.memory {
        info!("event=cli_start module=cli status=ok backend=memory");
        let mut store = UserService::new(InMemoryUserRepository::new());
        return run(&cli, &mut store);
    }

    info!("event=cli_start module=cli status=ok backend=sqlite");
    let conn = open_db(&cli.db)
        .with_context(|| format!("cannot open user database `{}`", cli.db.display()))?;
    let repo = SqliteUserRepository::try_new(&conn)?;
    let mut store = UserService::new(repo);
    run(&cli, &mut store)
}

fn run(cli: &Cli, store: &mut dyn UserStore) -> Result<()> {
    if cli.export_json {
        let users = store.list()?;
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(store, stdin.lock(), stdout.lock()).run()?;
    Ok(())
}

fn absolute_dir(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot resolve current directory")?;
    Ok(cwd.join(path))
}
