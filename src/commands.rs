//! CLI commands: render, goto, interpret. `watch` lives in its own module.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::Config;
use crate::controller::{SyncController, SyncState};
use crate::error::Error;
use crate::format::OutputFormat;
use crate::host::Sidebar;
use crate::markdown::{HeadingLoc, MarkdownDocument};
use crate::sidebar::{FileSidebar, StreamSidebar};

/// Flags shared by `render` and `watch`, layered over `.tocwatch.toml`.
pub struct OutlineOptions {
    /// Output format override.
    pub format: Option<OutputFormat>,
    /// Floating header file override.
    pub header: Option<PathBuf>,
    /// Write number markers into the document.
    pub number: bool,
    /// Write the outline to this file instead of stdout.
    pub out: Option<PathBuf>,
}

/// Load `.tocwatch.toml` from the working directory and apply CLI overrides.
///
/// # Errors
///
/// Returns config loading errors.
pub fn load_config(options: &OutlineOptions) -> Result<Config, Error> {
    let mut config = Config::load(Path::new("."))?;
    if let Some(format) = options.format {
        config.format = format;
    }
    if let Some(header) = &options.header {
        config.header = Some(header.clone());
    }
    if options.number {
        config.number_headings = true;
    }
    return Ok(config);
}

/// One build and render pass over `file`.
///
/// # Errors
///
/// Returns errors from config loading, reading the document, writing
/// markers, or writing the outline.
pub fn render(file: &Path, options: &OutlineOptions) -> Result<ExitCode, Error> {
    let config = load_config(options)?;
    return match &options.out {
        Some(out) => render_into(file, &config, FileSidebar::new(out, config.format)),
        None => render_into(file, &config, StreamSidebar::new(io::stdout(), config.format)),
    };
}

/// Attach `file` to a fresh controller presenting into `sidebar`. The
/// controller is not torn down afterwards so the output stays in place.
///
/// # Errors
///
/// Returns errors from the initial rebuild.
fn render_into<S: Sidebar<HeadingLoc>>(file: &Path, config: &Config, sidebar: S) -> Result<ExitCode, Error> {
    let mut controller = SyncController::new(sidebar, config);
    let document =
        MarkdownDocument::new(file, config.line_height, config.number_headings).with_header(config.header.clone());

    match controller.attach(document, Vec::new())? {
        SyncState::Empty => eprintln!("{}: no headings", file.display()),
        SyncState::Detached | SyncState::Populated => {},
    }
    return Ok(ExitCode::SUCCESS);
}

/// Activate the entry numbered `label` and report where it landed.
///
/// # Errors
///
/// Returns `Error::UnknownLabel` if no heading carries `label`, or errors
/// from reading the document.
pub fn goto(file: &Path, label: &str) -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    let mut controller = SyncController::new(StreamSidebar::new(io::sink(), config.format), &config);
    let document = MarkdownDocument::new(file, config.line_height, false);
    controller.attach(document, Vec::new())?;
    controller.activate(label)?;

    if let Some(document) = controller.document()
        && let Some(line) = document.focused_line()
    {
        println!("{}:{line}", document.path().display());
        eprintln!("viewport starts at line {}", document.viewport_line());
    }
    return Ok(ExitCode::SUCCESS);
}

/// Reserved text-interpretation entry point. Prints its (always empty) result.
pub fn interpret(text: &str) -> ExitCode {
    let config = Config::default();
    let controller: SyncController<MarkdownDocument, StreamSidebar<io::Sink>> =
        SyncController::new(StreamSidebar::new(io::sink(), config.format), &config);
    println!("{}", controller.interpret(text));
    return ExitCode::SUCCESS;
}
