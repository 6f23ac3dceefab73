// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Huddle - realtime presence and message relay server.
//!
//! This is the binary entry point for the Huddle server.

use clap::{Parser, Subcommand};

mod serve;
mod shutdown;

/// Huddle - realtime presence and message relay server.
#[derive(Parser, Debug)]
#[command(name = "huddle", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Huddle relay server.
    Serve,
    /// Print the resolved configuration and exit.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match huddle_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            huddle_config::render_errors(errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("huddle serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            println!(
                "server:  {}:{} (log level {})",
                config.server.host, config.server.port, config.server.log_level
            );
            println!(
                "storage: {} (wal={})",
                config.storage.database_path, config.storage.wal_mode
            );
            println!(
                "bus:     enabled={} capacity={}",
                config.bus.enabled, config.bus.channel_capacity
            );
            println!(
                "relay:   dedup ttl={}s capacity={}",
                config.relay.dedup_ttl_secs, config.relay.dedup_capacity
            );
        }
        None => {
            println!("huddle: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        let config =
            huddle_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.server.port, 4100);
    }
}
