//! `.tocwatch.toml` loading and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;
use crate::format::OutputFormat;
use crate::types::Depth;

/// Default leading-edge throttle window, in milliseconds.
const DEFAULT_THROTTLE_MS: u64 = 50;
/// Extra quiet time the trailing run waits beyond the throttle window.
const TRAILING_SLACK_MS: u64 = 50;
/// Space kept above a revealed heading for the floating header.
const DEFAULT_SCROLL_OFFSET: i64 = 130;
/// Viewport units per markdown line.
const DEFAULT_LINE_HEIGHT: i64 = 20;

/// Inclusive window of heading depths that make it into the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthRange {
    /// Deepest level included.
    max: u8,
    /// Shallowest level included.
    min: u8,
}

impl DepthRange {
    /// Build a window, validating both ends.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDepth` if either end is outside 1-6, or
    /// `Error::InvalidConfig` if `min > max`.
    pub fn new(min: u8, max: u8) -> Result<Self, Error> {
        let min = Depth::new(min)?.get();
        let max = Depth::new(max)?.get();
        if min > max {
            return Err(Error::InvalidConfig {
                reason: format!("min_depth {min} is greater than max_depth {max}"),
            });
        }
        return Ok(Self { max, min });
    }

    /// Whether `depth` falls inside the window.
    pub const fn contains(self, depth: Depth) -> bool {
        return depth.get() >= self.min && depth.get() <= self.max;
    }
}

impl Default for DepthRange {
    fn default() -> Self {
        return Self { max: Depth::MAX, min: 1 };
    }
}

/// Settings loaded from `.tocwatch.toml`, with CLI overrides applied on top.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which heading depths to include.
    pub depths: DepthRange,
    /// Outline format for `render` and `watch`.
    pub format: OutputFormat,
    /// File standing in for the floating header, if any.
    pub header: Option<PathBuf>,
    /// Viewport units per markdown line, used when revealing a heading.
    pub line_height: i64,
    /// Whether number markers are written back into the document.
    pub number_headings: bool,
    /// Gap left above a revealed heading.
    pub scroll_offset: i64,
    /// Leading-edge throttle window for rebuilds and pin refreshes.
    pub throttle: Duration,
    /// Quiet period before the guaranteed trailing rebuild.
    pub trailing: Duration,
}

/// Raw TOML structure for `.tocwatch.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TocwatchTomlConfig {
    /// Output format name.
    #[serde(default)]
    format: Option<OutputFormat>,
    /// Header file path.
    #[serde(default)]
    header: Option<PathBuf>,
    /// Viewport units per line.
    #[serde(default)]
    line_height: Option<i64>,
    /// Deepest heading level included.
    #[serde(default)]
    max_depth: Option<u8>,
    /// Shallowest heading level included.
    #[serde(default)]
    min_depth: Option<u8>,
    /// Write number markers into the document.
    #[serde(default)]
    number_headings: Option<bool>,
    /// Gap above a revealed heading.
    #[serde(default)]
    scroll_offset: Option<i64>,
    /// Leading throttle window.
    #[serde(default)]
    throttle_ms: Option<u64>,
    /// Delay before the trailing run.
    #[serde(default)]
    trailing_ms: Option<u64>,
}

impl Config {
    /// Load config from `.tocwatch.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. A file that exists but is
    /// malformed is an error, never a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed, or `Error::InvalidConfig` /
    /// `Error::InvalidDepth` if a value is out of range.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(".tocwatch.toml");
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Same as `load`, minus the I/O.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: TocwatchTomlConfig = toml::from_str(content)?;

        let throttle_ms = raw.throttle_ms.unwrap_or(DEFAULT_THROTTLE_MS);
        let trailing_ms = raw
            .trailing_ms
            .unwrap_or_else(|| return throttle_ms.saturating_add(TRAILING_SLACK_MS));
        if trailing_ms < throttle_ms {
            return Err(Error::InvalidConfig {
                reason: format!("trailing_ms {trailing_ms} is shorter than throttle_ms {throttle_ms}"),
            });
        }

        let line_height = raw.line_height.unwrap_or(DEFAULT_LINE_HEIGHT);
        if line_height <= 0 {
            return Err(Error::InvalidConfig {
                reason: format!("line_height must be positive, got {line_height}"),
            });
        }

        return Ok(Self {
            depths: DepthRange::new(raw.min_depth.unwrap_or(1), raw.max_depth.unwrap_or(Depth::MAX))?,
            format: raw.format.unwrap_or_default(),
            header: raw.header,
            line_height,
            number_headings: raw.number_headings.unwrap_or(false),
            scroll_offset: raw.scroll_offset.unwrap_or(DEFAULT_SCROLL_OFFSET),
            throttle: Duration::from_millis(throttle_ms),
            trailing: Duration::from_millis(trailing_ms),
        });
    }
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            depths: DepthRange::default(),
            format: OutputFormat::default(),
            header: None,
            line_height: DEFAULT_LINE_HEIGHT,
            number_headings: false,
            scroll_offset: DEFAULT_SCROLL_OFFSET,
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
            trailing: Duration::from_millis(DEFAULT_THROTTLE_MS.saturating_add(TRAILING_SLACK_MS)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.throttle, Duration::from_millis(50));
        assert_eq!(config.trailing, Duration::from_millis(100));
        assert_eq!(config.scroll_offset, 130);
        assert_eq!(config.depths, DepthRange::default());
        assert!(!config.number_headings);
        assert!(config.header.is_none());
    }

    #[test]
    fn trailing_defaults_to_throttle_plus_slack() {
        let config = Config::parse("throttle_ms = 200").unwrap();
        assert_eq!(config.trailing, Duration::from_millis(250));
    }

    #[test]
    fn reads_every_field() {
        let config = Config::parse(
            r#"
            format = "json"
            header = "banner.txt"
            line_height = 16
            min_depth = 2
            max_depth = 4
            number_headings = true
            scroll_offset = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.header, Some(PathBuf::from("banner.txt")));
        assert_eq!(config.line_height, 16);
        assert_eq!(config.depths, DepthRange::new(2, 4).unwrap());
        assert!(config.number_headings);
        assert_eq!(config.scroll_offset, 0);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".tocwatch.toml"), "throttle_ms = \"fast\"").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn rejects_inverted_depth_window() {
        let err = Config::parse("min_depth = 5\nmax_depth = 2").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
        assert!(matches!(Config::parse("max_depth = 7"), Err(Error::InvalidDepth { depth: 7 })));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(Config::parse("colour = \"red\""), Err(Error::TomlDe(_))));
    }
}
