//! Textual forms of a rendered outline: plain text, markdown links, JSON.

use std::fmt::Write as _;

use crate::error::Error;
use crate::outline::{Outline, OutlineEntry};

/// How an outline is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented `label title` lines.
    #[default]
    Text,
    /// Nested bullet list of in-page links.
    Markdown,
    /// Entries with path, label, title, depth and children.
    Json,
}

/// Print `outline` in the requested format. Always ends with a newline unless
/// the outline is empty.
///
/// # Errors
///
/// Returns `Error::Json` if JSON serialization fails.
pub fn outline_to_string<R>(outline: &Outline<R>, format: OutputFormat) -> Result<String, Error> {
    let mut out = String::new();
    match format {
        OutputFormat::Text => {
            for entry in &outline.entries {
                write_text_entry(&mut out, entry, 0);
            }
        },
        OutputFormat::Markdown => {
            for entry in &outline.entries {
                write_markdown_entry(&mut out, entry, 0);
            }
        },
        OutputFormat::Json => {
            out = serde_json::to_string_pretty(&outline.entries)?;
            out.push('\n');
        },
    }
    return Ok(out);
}

/// Append `entry` and its subtree as indented `label title` lines.
fn write_text_entry<R>(out: &mut String, entry: &OutlineEntry<R>, indent: usize) {
    let pad = "  ".repeat(indent);
    let _ = writeln!(out, "{pad}{} {}", entry.label, entry.title);
    for child in &entry.children {
        write_text_entry(out, child, indent.saturating_add(1));
    }
}

/// Append `entry` and its subtree as a nested link list.
fn write_markdown_entry<R>(out: &mut String, entry: &OutlineEntry<R>, indent: usize) {
    let pad = "  ".repeat(indent);
    let _ = writeln!(out, "{pad}- [{} {}](#{})", entry.label, entry.title, slugify(&entry.title));
    for child in &entry.children {
        write_markdown_entry(out, child, indent.saturating_add(1));
    }
}

/// Convert heading text to a GitHub-style anchor.
/// Lowercase, keep alphanumerics, `-` and `_`, spaces become hyphens, drop the rest.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            slug.push(c);
        } else if c.is_whitespace() {
            slug.push('-');
        }
    }
    return slug;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::render;
    use crate::testing::MemoryDocument;
    use crate::tree::TocTree;
    use crate::types::{Depth, HeadingRecord};

    fn outline(headings: &[(u8, &str)]) -> Outline<usize> {
        let (mut doc, _handle) = MemoryDocument::new(headings);
        let tree = TocTree::build(headings.iter().enumerate().map(|(i, (d, t))| HeadingRecord {
            depth: Depth::new(*d).unwrap(),
            source: i,
            title: (*t).to_string(),
        }));
        render(&tree, &mut doc)
    }

    #[test]
    fn text_indents_by_nesting() {
        let o = outline(&[(1, "Intro"), (2, "Setup"), (1, "Usage")]);
        let text = outline_to_string(&o, OutputFormat::Text).unwrap();
        assert_eq!(text, "1 Intro\n  1.1 Setup\n2 Usage\n");
    }

    #[test]
    fn markdown_links_to_heading_anchors() {
        let o = outline(&[(2, "Getting Started!"), (3, "Step 1: install")]);
        let md = outline_to_string(&o, OutputFormat::Markdown).unwrap();
        assert_eq!(
            md,
            "- [1 Getting Started!](#getting-started)\n  - [1.1 Step 1: install](#step-1-install)\n"
        );
    }

    #[test]
    fn json_carries_path_and_children() {
        let o = outline(&[(1, "A"), (2, "B")]);
        let json = outline_to_string(&o, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["label"], "1");
        assert_eq!(value[0]["children"][0]["path"], serde_json::json!([1, 1]));
        assert_eq!(value[0]["children"][0]["title"], "B");
        assert!(value[0].get("activation").is_none());
    }

    #[test]
    fn empty_outline_prints_nothing() {
        let o = outline(&[]);
        assert_eq!(outline_to_string(&o, OutputFormat::Text).unwrap(), "");
        assert_eq!(outline_to_string(&o, OutputFormat::Json).unwrap(), "[]\n");
    }
}
