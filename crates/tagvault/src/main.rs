// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tagvault - a credential vault unlocked by a password and an RFID tag.
//!
//! This is the binary entry point.

mod config_cmd;
mod ports;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tagvault_config::TagvaultConfig;

/// Tagvault - a credential vault unlocked by a password and an RFID tag.
#[derive(Parser, Debug)]
#[command(name = "tagvault", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// List serial ports so the reader allow-list can be filled in.
    Ports,
    /// Print the effective configuration.
    Config,
}

fn load_config(path: Option<&std::path::Path>) -> TagvaultConfig {
    let loaded = match path {
        Some(path) => tagvault_config::load_and_validate_path(path),
        None => tagvault_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            tagvault_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => {
            let config = load_config(cli.config.as_deref());
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Ports) => {
            if let Err(e) = ports::run_ports() {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            let config = load_config(cli.config.as_deref());
            if let Err(e) = config_cmd::run_config(&config) {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("tagvault: use --help for available commands");
        }
    }
}
