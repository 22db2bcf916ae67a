//! Markdown file host: headings come from a file on disk, number markers are
//! written back into it as inline HTML.
//!
//! The file is re-read and re-parsed on every `heading_elements` call. Marker
//! changes queued during a render are applied in one write by
//! `commit_markers`, and only if the file is unchanged since it was scanned.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::{Node, Parser, Tree};

use crate::error::Error;
use crate::host::{Document, HeadingElement, InlineNode};

/// Maximum document size (16 MiB).
const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Matches a number marker written by a previous render.
#[allow(clippy::expect_used, reason = "hardcoded pattern")]
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r#"<span class="toc-header-number">([^<]*)</span>[ \t]*"#).expect("valid regex");
});

/// Matches an optional ATX closing sequence, e.g. the ` ##` in `## Title ##`.
#[allow(clippy::expect_used, reason = "hardcoded pattern")]
static CLOSING_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"(^|[ \t]+)#+[ \t]*$").expect("valid regex");
});

/// Where a heading lives in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingLoc {
    /// Byte range of the heading's inline content (marker included).
    pub content: Range<usize>,
    /// 1-based line of the heading.
    pub line: usize,
}

/// A markdown file acting as the monitored document.
pub struct MarkdownDocument {
    /// Line currently carrying the focus highlight.
    focused: Option<usize>,
    /// File standing in for the floating header.
    header: Option<PathBuf>,
    /// Viewport units per line.
    line_height: i64,
    /// File on disk.
    path: PathBuf,
    /// Marker rewrites keyed by content start: (content range, new content).
    pending: BTreeMap<usize, (Range<usize>, String)>,
    /// File content as of the last scan.
    snapshot: Option<String>,
    /// Top edge of the viewport, in viewport units.
    viewport_top: i64,
    /// Whether queued markers are actually written to disk.
    write_markers: bool,
}

impl MarkdownDocument {
    /// Monitor `path`. Nothing is read until the first scan.
    pub fn new(path: &Path, line_height: i64, write_markers: bool) -> Self {
        return Self {
            focused: None,
            header: None,
            line_height: line_height.max(1),
            path: path.to_path_buf(),
            pending: BTreeMap::new(),
            snapshot: None,
            viewport_top: 0,
            write_markers,
        };
    }

    /// Use `header` as the floating header. It counts as pinned unless its
    /// content reads `unpinned`.
    pub fn with_header(mut self, header: Option<PathBuf>) -> Self {
        self.header = header;
        return self;
    }

    /// The monitored file.
    pub fn path(&self) -> &Path {
        return &self.path;
    }

    /// Line carrying the focus highlight after the last activation.
    pub const fn focused_line(&self) -> Option<usize> {
        return self.focused;
    }

    /// First line visible in the viewport (1-based).
    pub fn viewport_line(&self) -> i64 {
        return self.viewport_top.checked_div(self.line_height).unwrap_or(0).saturating_add(1);
    }

    /// Read the file, enforcing the size limit.
    ///
    /// # Errors
    ///
    /// Returns `Error::DocumentNotFound`, `Error::FileTooLarge`, or `Error::Io`.
    fn read_source(&self) -> Result<String, Error> {
        let source = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::DocumentNotFound { path: self.path.clone() });
            },
            Err(e) => return Err(Error::Io(e)),
        };
        let size: u64 = source.len().try_into().unwrap_or(u64::MAX);
        if size > MAX_FILE_SIZE {
            return Err(Error::FileTooLarge {
                file: self.path.clone(),
                max_bytes: MAX_FILE_SIZE,
                size_bytes: size,
            });
        }
        return Ok(source);
    }
}

impl Document for MarkdownDocument {
    type Ref = HeadingLoc;

    fn heading_elements(&mut self) -> Result<Vec<HeadingElement<HeadingLoc>>, Error> {
        let source = self.read_source()?;
        let tree = parse_markdown(&self.path, &source)?;

        let mut elements = Vec::new();
        collect_headings(tree.root_node(), &source, &mut elements);

        self.pending.clear();
        self.snapshot = Some(source);
        return Ok(elements);
    }

    fn ensure_number_marker(&mut self, target: &HeadingLoc, label: &str) {
        let Some(current) = self.snapshot.as_deref().and_then(|s| return s.get(target.content.clone())) else {
            return;
        };
        if current.trim().is_empty() {
            return;
        }
        let text = MARKER.replace_all(current, "");
        let text = text.trim();
        let marker = format!("<span class=\"toc-header-number\">{label}</span>");
        // A heading whose title was cleared keeps just the marker, no trailing space.
        let desired = if text.is_empty() { marker } else { format!("{marker} {text}") };
        if desired == current {
            return;
        }
        self.pending.insert(target.content.start, (target.content.clone(), desired));
    }

    fn commit_markers(&mut self) -> Result<(), Error> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let edits = std::mem::take(&mut self.pending);
        if !self.write_markers {
            return Ok(());
        }
        let Some(snapshot) = self.snapshot.as_deref() else {
            return Ok(());
        };

        // The file may have moved on since the scan; the next rebuild redoes the markers.
        let on_disk = self.read_source()?;
        if on_disk != snapshot {
            tracing::debug!(path = %self.path.display(), "document changed since scan, dropping marker writes");
            return Ok(());
        }

        let mut updated = on_disk;
        for (range, replacement) in edits.values().rev() {
            if updated.get(range.clone()).is_none() {
                continue;
            }
            updated.replace_range(range.clone(), replacement);
        }
        std::fs::write(&self.path, &updated)?;
        tracing::info!(path = %self.path.display(), headings = edits.len(), "updated number markers");
        self.snapshot = Some(updated);
        return Ok(());
    }

    fn offset_top(&self, target: &HeadingLoc) -> Option<i64> {
        let line = i64::try_from(target.line).ok()?;
        return Some(line.saturating_sub(1).saturating_mul(self.line_height));
    }

    fn scroll_to(&mut self, top: i64) {
        self.viewport_top = top;
    }

    fn remove_focus(&mut self, target: &HeadingLoc) {
        if self.focused == Some(target.line) {
            self.focused = None;
        }
    }

    fn add_focus(&mut self, target: &HeadingLoc) {
        self.focused = Some(target.line);
    }

    fn header_pinned(&self) -> Option<bool> {
        let header = self.header.as_ref()?;
        return match std::fs::read_to_string(header) {
            Ok(content) => Some(content.trim() != "unpinned"),
            Err(e) => {
                tracing::debug!(path = %header.display(), error = %e, "no floating header");
                None
            },
        };
    }
}

/// Parse markdown into a tree-sitter block tree.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the language cannot be set or parsing fails.
fn parse_markdown(path: &Path, source: &str) -> Result<Tree, Error> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_md::LANGUAGE.into())
        .map_err(|e| return Error::ParseFailed { file: path.to_path_buf(), reason: e.to_string() })?;

    return parser.parse(source, None).ok_or_else(|| {
        return Error::ParseFailed {
            file: path.to_path_buf(),
            reason: "tree-sitter returned None".to_string(),
        };
    });
}

/// Walk the block tree in document order, collecting ATX and setext headings.
fn collect_headings(node: Node<'_>, source: &str, out: &mut Vec<HeadingElement<HeadingLoc>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "atx_heading" | "setext_heading" => {
                if let Some(element) = heading_element(child, source) {
                    out.push(element);
                }
            },
            _ => collect_headings(child, source, out),
        }
    }
}

/// Build a heading element from an `atx_heading` or `setext_heading` node.
fn heading_element(heading: Node<'_>, source: &str) -> Option<HeadingElement<HeadingLoc>> {
    let level = heading_level(heading)?;
    let content = content_range(heading, source);
    let raw = source.get(content.clone()).unwrap_or("");
    let text = CLOSING_SEQUENCE.replace(raw, "");

    return Some(HeadingElement {
        inline: split_inline(&text),
        level,
        source: HeadingLoc {
            content,
            line: heading.start_position().row.saturating_add(1),
        },
    });
}

/// Level from the ATX marker or the setext underline.
fn heading_level(heading: Node<'_>) -> Option<u8> {
    let mut cursor = heading.walk();
    for child in heading.children(&mut cursor) {
        let level = match child.kind() {
            "atx_h1_marker" | "setext_h1_underline" => 1,
            "atx_h2_marker" | "setext_h2_underline" => 2,
            "atx_h3_marker" => 3,
            "atx_h4_marker" => 4,
            "atx_h5_marker" => 5,
            "atx_h6_marker" => 6,
            _ => continue,
        };
        return Some(level);
    }
    return None;
}

/// Trimmed byte range of the heading's inline content. Empty (at the end of
/// the heading line) when the heading has no text.
fn content_range(heading: Node<'_>, source: &str) -> Range<usize> {
    let node = heading.child_by_field_name("heading_content").or_else(|| {
        let mut cursor = heading.walk();
        return heading
            .children(&mut cursor)
            .find(|c| return matches!(c.kind(), "inline" | "paragraph"));
    });
    let Some(node) = node else {
        let end = heading.end_byte();
        return end..end;
    };
    return trim_range(source, node.start_byte()..node.end_byte());
}

/// Shrink `range` so it excludes leading and trailing whitespace.
fn trim_range(source: &str, range: Range<usize>) -> Range<usize> {
    let Some(text) = source.get(range.clone()) else {
        return range;
    };
    let leading = text.len().saturating_sub(text.trim_start().len());
    let trimmed_len = text.trim().len();
    let start = range.start.saturating_add(leading);
    return start..start.saturating_add(trimmed_len);
}

/// Split heading text into marker and plain-text inline nodes.
fn split_inline(text: &str) -> Vec<InlineNode> {
    let mut nodes = Vec::new();
    let mut last = 0;
    for caps in MARKER.captures_iter(text) {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if let Some(before) = text.get(last..whole.start())
            && !before.is_empty()
        {
            nodes.push(InlineNode::text(before));
        }
        nodes.push(InlineNode::marker(label.as_str()));
        last = whole.end();
    }
    if let Some(rest) = text.get(last..)
        && !rest.is_empty()
    {
        nodes.push(InlineNode::text(rest));
    }
    return nodes;
}
