//! Markdown rendering of errors for the terminal.

use crate::error::Error;

/// ANSI bold on.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened and,
/// where there is one, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::DocumentNotFound { path } => format!("\
# Error: Document Not Found

`{}` does not exist.

## Fix

Check the path, or create the document first.
", path.display()),

        Error::FileTooLarge { file, size_bytes, max_bytes } => format!("\
# Error: File Too Large

`{}` is {size_bytes} bytes; the limit is {max_bytes} bytes.
", file.display()),

        Error::InvalidConfig { .. } | Error::InvalidDepth { .. } | Error::TomlDe(_) => format!("\
# Error: Invalid Configuration

{e}

## Fix

Edit `.tocwatch.toml`. Depths run from 1 to 6 and `min_depth` must not exceed `max_depth`.
"),

        Error::UnknownLabel { label } => format!("\
# Error: Unknown Heading Number

No heading is numbered `{label}`.

## Fix

List the current numbering:

    tocwatch render <FILE>
"),

        Error::Watch { reason } => format!("\
# Error: Watch Failed

{reason}
"),

        _ => format!("\
# Error

{e}
"),
    };
}
