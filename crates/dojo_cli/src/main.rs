//! Command line entry point for the dojo registry.
//!
//! # Responsibility
//! - Invoke any registered `dojos:*` function with JSON arguments.
//! - Print the response envelope as JSON on stdout.

use clap::{Parser, Subcommand};
use dojo_api::{call_with_config, ApiConfig, ApiResponse, FUNCTIONS};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dojo")]
#[command(about = "Dojo registry CLI")]
#[command(
    after_help = "Environment:\n  DOJO_DB_PATH     Store file (default: <tmp>/dojo.sqlite3)\n  DOJO_LOG_LEVEL   Log verbosity\n  DOJO_LOG_DIR     Absolute directory for rolling logs"
)]
struct Cli {
    /// Store file; overrides DOJO_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Absolute log directory; overrides DOJO_LOG_DIR.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// Log level; overrides DOJO_LOG_LEVEL.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists registered functions and their kinds.
    Functions,
    /// Calls one function, e.g. `call dojos:create '{"name":"Hombu"}'`.
    Call {
        function: String,
        #[arg(default_value = "{}")]
        args: String,
    },
    /// Prints the core crate version.
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Functions => {
            for spec in FUNCTIONS {
                println!("{:<8} {}", spec.kind.label(), spec.path);
            }
            ExitCode::SUCCESS
        }
        Commands::Version => {
            println!("dojo_core version={}", dojo_core::core_version());
            ExitCode::SUCCESS
        }
        Commands::Call { function, args } => {
            let mut config = ApiConfig::from_env();
            if let Some(db) = cli.db {
                config.db_path = db;
            }
            if let Some(log_dir) = cli.log_dir {
                config.log_dir = Some(log_dir);
            }
            if let Some(log_level) = cli.log_level {
                config.log_level = log_level;
            }

            if let Err(err) = config.init_logging() {
                eprintln!("logging disabled: {err}");
            }

            let response = match serde_json::from_str::<Value>(&args) {
                Ok(args) => call_with_config(&config, &function, args),
                Err(err) => ApiResponse::failure(format!("arguments are not valid JSON: {err}")),
            };
            print_response(&response)
        }
    }
}

fn print_response(response: &ApiResponse) -> ExitCode {
    match serde_json::to_string_pretty(response) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("failed to encode response: {err}");
            return ExitCode::FAILURE;
        }
    }
    if response.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
