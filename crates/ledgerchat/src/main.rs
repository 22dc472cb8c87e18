// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ledgerchat - natural-language questions over a buyers and debtors ledger.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod ask;
mod bootstrap;
mod doctor;
mod serve;
mod shell;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ledgerchat_config::LedgerchatConfig;

/// Ledgerchat - ask about top buyers and debtors in plain language.
#[derive(Parser, Debug)]
#[command(name = "ledgerchat", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Answer a single message and print the reply as JSON.
    Ask {
        /// The question, e.g. "dame los top 2 deudores".
        message: String,
    },
    /// Launch an interactive chat session.
    Shell,
    /// Run diagnostic checks against the environment.
    Doctor {
        /// Send one test request to each configured provider.
        #[arg(long)]
        probe: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Print the effective configuration with API keys masked.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> LedgerchatConfig {
    let loaded = match path {
        Some(path) => ledgerchat_config::load_and_validate_path(path),
        None => ledgerchat_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            ledgerchat_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Ask { message }) => ask::run_ask(config, &message).await,
        Some(Commands::Shell) => shell::run_shell(config).await,
        Some(Commands::Doctor { probe, plain }) => {
            doctor::run_doctor(&config, probe, plain).await
        }
        Some(Commands::Config) => bootstrap::render_config(&config).map(|rendered| {
            print!("{rendered}");
        }),
        None => {
            println!("ledgerchat: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_ask_with_global_config() {
        let cli = Cli::parse_from(["ledgerchat", "ask", "cuántos deudores hay", "--config", "a.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("a.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Ask { ref message }) if message == "cuántos deudores hay"
        ));
    }

    #[test]
    fn parses_doctor_flags() {
        let cli = Cli::parse_from(["ledgerchat", "doctor", "--plain"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Doctor { probe: false, plain: true })
        ));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = ledgerchat_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.app.name, "ledgerchat");
        assert_eq!(config.server.port, 5000);
    }
}
