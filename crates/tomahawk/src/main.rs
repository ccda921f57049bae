// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tomahawk account host.
//!
//! Discovers account plugins, manages the persisted account list, and runs
//! the account lifecycle loop.

mod commands;
mod run;
mod setup;
mod watch;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tomahawk_config::TomahawkConfig;

/// Tomahawk account plugin host.
#[derive(Parser, Debug)]
#[command(name = "tomahawk", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List loadable account plugins.
    Plugins {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List configured accounts.
    Accounts {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Create a new account for a plugin factory.
    Add {
        /// Factory id, e.g. `xmpp`.
        factory: String,
    },
    /// Remove a configured account.
    Remove {
        /// Account id, e.g. `xmpp_3f2a...`.
        account_id: String,
    },
    /// Connect accounts and run until interrupted.
    Run {
        /// Stop after this many seconds instead of waiting for Ctrl-C.
        #[arg(long, value_name = "SECS")]
        stop_after: Option<u64>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => tomahawk_config::load_and_validate_path(path),
        None => tomahawk_config::load_and_validate(),
    };
    let config: TomahawkConfig = match loaded {
        Ok(config) => config,
        Err(errors) => {
            tomahawk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    run::init_tracing(&config.app.log_level);

    let result = match cli.command {
        Some(Commands::Plugins { json }) => commands::list_plugins(&config, json),
        Some(Commands::Accounts { json }) => commands::list_accounts(&config, json),
        Some(Commands::Add { factory }) => commands::add_account(&config, &factory),
        Some(Commands::Remove { account_id }) => commands::remove_account(&config, &account_id),
        Some(Commands::Run { stop_after }) => {
            let watched = match &cli.config {
                Some(path) => vec![path.clone()],
                None => tomahawk_config::config_file_candidates(),
            };
            run::run(&config, watched, stop_after.map(Duration::from_secs)).await
        }
        None => {
            println!("tomahawk: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
