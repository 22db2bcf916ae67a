//! Crate-level error types for tocwatch diagnostics.

use std::path::PathBuf;

/// Every error names the document, label, or reason that failed so the CLI
/// can print a useful diagnostic. Missing headings, a missing floating header
/// and a detached controller are normal states and never show up here.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The watched or rendered document does not exist on disk.
    #[error("document not found: {}", path.display())]
    DocumentNotFound {
        /// Path to the missing document.
        path: PathBuf,
    },

    /// Document exceeds the size limit for a single parse.
    #[error("file too large ({size_bytes} bytes, max {max_bytes}): {}", file.display())]
    FileTooLarge {
        /// Document that exceeded the size limit.
        file: PathBuf,
        /// Maximum allowed size in bytes.
        max_bytes: u64,
        /// Actual size in bytes.
        size_bytes: u64,
    },

    /// `.tocwatch.toml` parsed but holds values that cannot be used.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Which setting is wrong and why.
        reason: String,
    },

    /// A heading level outside 1..=6.
    #[error("invalid heading depth {depth} (expected 1-6)")]
    InvalidDepth {
        /// The rejected level.
        depth: u8,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of an outline failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped serde_json error.
        #[from]
        serde_json::Error,
    ),

    /// A registered listener could not be detached.
    #[error("failed to release listener `{name}`: {reason}")]
    ListenerRelease {
        /// Listener identifier.
        name: String,
        /// Description of the failure.
        reason: String,
    },

    /// Tree-sitter failed to parse a document.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// Document that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// No outline entry carries the requested label.
    #[error("no heading numbered `{label}`")]
    UnknownLabel {
        /// Dotted label that was looked up, e.g. `2.3.1`.
        label: String,
    },

    /// The filesystem watcher could not be set up.
    #[error("watch: {reason}")]
    Watch {
        /// Description of the watcher failure.
        reason: String,
    },
}
