//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tagmemo_core` linkage, configuration and database bootstrap.
//! - Keep output deterministic for quick local sanity checks.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tagmemo_core::db::migrations::latest_version;
use tagmemo_core::db::open_db_with_options;
use tagmemo_core::{init_logging, CoreConfig, NoteService, SqliteNoteRepository};

#[derive(Parser, Debug)]
#[command(name = "tagmemo")]
#[command(version, about = "Smoke checks for the tagmemo core")]
struct Cli {
    /// JSON config file; defaults apply when omitted
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core ping and version
    Ping,
    /// Open the database, apply migrations and print the schema version
    Migrate,
    /// List canonical tags
    Tags,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Command::Ping = cli.command {
        println!("tagmemo_core ping={}", tagmemo_core::ping());
        println!("tagmemo_core version={}", tagmemo_core::core_version());
        return Ok(());
    }

    let config = match cli.config {
        Some(path) => CoreConfig::load(path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let mut conn = open_db_with_options(&config.database_path, &config.db_options())
        .map_err(|err| err.to_string())?;
    log::info!("event=cli_start module=cli status=ok command={:?}", cli.command);

    match cli.command {
        Command::Ping => {}
        Command::Migrate => {
            println!("schema_version={}", latest_version());
        }
        Command::Tags => {
            let repo = SqliteNoteRepository::try_new(&mut conn).map_err(|err| err.to_string())?;
            let service = NoteService::new(repo);
            for tag in service.list_tags().map_err(|err| err.to_string())? {
                println!("{}\t{}", tag.id, tag.name);
            }
        }
    }
    Ok(())
}
