//! tocwatch: live, numbered table of contents for markdown documents.

mod commands;
mod config;
mod controller;
mod diagnostics;
mod error;
mod format;
mod host;
mod lifecycle;
mod markdown;
mod outline;
mod scanner;
mod sidebar;
#[cfg(test)]
mod testing;
mod throttle;
mod tree;
mod types;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::OutlineOptions;
use crate::format::OutputFormat;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "tocwatch", about = "Live, numbered table of contents for markdown documents")]
struct Cli {
    /// Command to run.
    #[command(subcommand)]
    command: Commands,
}

/// Subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Reveal the heading numbered LABEL (e.g. 2.3.1) and print its location
    Goto {
        /// Markdown document
        file: PathBuf,
        /// Dotted heading number
        label: String,
    },
    /// Reserved: interpret text as an outline request (always empty for now)
    Interpret {
        /// Text to interpret
        #[arg(default_value = "")]
        text: String,
    },
    /// Print the numbered outline of a document once
    Render {
        /// Markdown document
        file: PathBuf,
        #[command(flatten)]
        outline: OutlineArgs,
    },
    /// Keep the outline in sync while the document changes
    Watch {
        /// Markdown document
        file: PathBuf,
        #[command(flatten)]
        outline: OutlineArgs,
    },
}

/// Flags shared by `render` and `watch`.
#[derive(Args)]
struct OutlineArgs {
    /// Output format (overrides `.tocwatch.toml`)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// File standing in for the floating header; `unpinned` in it unpins the outline
    #[arg(long, value_name = "PATH")]
    header: Option<PathBuf>,
    /// Write heading numbers into the document
    #[arg(long)]
    number: bool,
    /// Write the outline to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

impl From<OutlineArgs> for OutlineOptions {
    fn from(args: OutlineArgs) -> Self {
        return Self { format: args.format, header: args.header, number: args.number, out: args.out };
    }
}

/// Log to stderr, filtered by `TOCWATCH_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("TOCWATCH_LOG").unwrap_or_else(|_| return EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Run the CLI and map errors to a failing exit code.
fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Goto { file, label } => commands::goto(&file, &label),
        Commands::Interpret { text } => Ok(commands::interpret(&text)),
        Commands::Render { file, outline } => commands::render(&file, &outline.into()),
        Commands::Watch { file, outline } => watch::run(&file, &outline.into()),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
