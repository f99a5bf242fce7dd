// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! dbsnap - snapshot a local SQLite database to object storage and restore it.
//!
//! This is the binary entry point. Every subcommand loads and validates the
//! configuration first; an invalid configuration exits before any database
//! or network work starts.

mod commands;
mod serve;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dbsnap_core::OperationResult;

/// dbsnap - SQLite snapshot backup and restore.
#[derive(Parser, Debug)]
#[command(name = "dbsnap", version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to the XDG search path.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Print backup/restore results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Take one snapshot of the database and upload it.
    Backup,
    /// Fetch a snapshot by name and replace the local database with it.
    Restore {
        /// Snapshot file name, e.g. wblog_20240101120000.db
        file_name: String,
    },
    /// Serve the HTTP trigger endpoints.
    Serve,
    /// Validate the configuration and show what a run would use.
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => dbsnap_config::load_and_validate_path(path),
        None => dbsnap_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => Arc::new(config),
        Err(errors) => {
            dbsnap_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    serve::init_tracing(&config.log.level, commands::secret_list(&config));

    match cli.command {
        Commands::Backup => report(commands::run_backup(config).await, cli.json),
        Commands::Restore { file_name } => {
            report(commands::run_restore(config, &file_name).await, cli.json)
        }
        Commands::Serve => match serve::run_serve(config.clone()).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("dbsnap serve: {}", commands::scrub(&config, &e));
                ExitCode::FAILURE
            }
        },
        Commands::Check => match commands::run_check(&config) {
            Ok(lines) => {
                for line in lines {
                    println!("{line}");
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("dbsnap check: {}", commands::scrub(&config, &e));
                ExitCode::FAILURE
            }
        },
    }
}

fn report(result: OperationResult, json: bool) -> ExitCode {
    if json {
        match serde_json::to_string(&result) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => eprintln!("dbsnap: failed to render result: {e}"),
        }
    } else if result.succeeded {
        println!("{}", result.message);
    } else {
        eprintln!("error: {}", result.message);
    }

    if result.succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
