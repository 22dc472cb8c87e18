// SPDX-FileCopyrightText: 2026 Ledgerchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ledgerchat shell` command implementation.
//!
//! An interactive REPL over the same pipeline the gateway uses, with
//! readline history and replies colored by status.

use colored::Colorize;
use ledgerchat_config::LedgerchatConfig;
use ledgerchat_core::{Availability, ChatReply, LedgerchatError, ReplyStatus};
use ledgerchat_router::ChatPipeline;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::error;

use crate::bootstrap::{build_pipeline, init_tracing, log_credentials};

/// What the REPL should do with one input line.
#[derive(Debug, PartialEq, Eq)]
enum ShellInput<'a> {
    Quit,
    Skip,
    Health,
    Message(&'a str),
}

fn parse_line(line: &str) -> ShellInput<'_> {
    match line.trim() {
        "" => ShellInput::Skip,
        "/quit" | "/exit" | "exit" | "quit" | "salir" => ShellInput::Quit,
        "/health" => ShellInput::Health,
        text => ShellInput::Message(text),
    }
}

/// Runs the `ledgerchat shell` interactive REPL.
pub async fn run_shell(config: LedgerchatConfig) -> Result<(), LedgerchatError> {
    // Keep the prompt readable: only warnings and errors reach the terminal.
    init_tracing("warn");
    log_credentials(&config);

    let pipeline = build_pipeline(&config).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| LedgerchatError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "ledgerchat shell".bold().green());
    println!(
        "Mode {}. Type {} for component status, {} to exit.\n",
        config.classifier.mode.to_string().cyan(),
        "/health".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", "ledgerchat".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => match parse_line(&line) {
                ShellInput::Quit => break,
                ShellInput::Skip => continue,
                ShellInput::Health => {
                    let _ = rl.add_history_entry(&line);
                    print_health(&pipeline).await;
                }
                ShellInput::Message(text) => {
                    let _ = rl.add_history_entry(&line);
                    match pipeline.handle(text).await {
                        Ok(outcome) => {
                            print_reply(&outcome.reply);
                            println!(
                                "{}",
                                format!("[{}]", outcome.classification.source).dimmed()
                            );
                        }
                        Err(e) => eprintln!("{}: {e}", "error".red()),
                    }
                }
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    if let Err(e) = pipeline.shutdown().await {
        error!(error = %e, "error during adapter shutdown");
    }
    Ok(())
}

fn print_reply(reply: &ChatReply) {
    match reply.status {
        ReplyStatus::Success => println!("{}", reply.message),
        ReplyStatus::Error => println!("{}", reply.message.yellow()),
    }
}

async fn print_health(pipeline: &ChatPipeline) {
    let health = pipeline.health().await;
    let (name, status) = &health.lookup;
    let label = if health.is_serving() {
        status.label().green()
    } else {
        status.label().red()
    };
    println!("  {name:<12} {label}");
    for (name, availability) in &health.classifiers {
        let label = availability.to_string();
        let label = match availability {
            Availability::Ready => label.green(),
            Availability::Unreachable => label.red(),
            Availability::Unconfigured => label.dimmed(),
        };
        println!("  {name:<12} {label}");
    }
}
