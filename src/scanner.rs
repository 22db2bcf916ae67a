//! Heading elements to heading records: depth checks and titles.

use crate::config::DepthRange;
use crate::host::{HeadingElement, InlineNode};
use crate::types::{Depth, HeadingRecord};

/// Turn enumerated heading elements into heading records.
/// Elements with a level outside 1-6 are skipped with a warning; elements
/// outside the configured depth window are skipped silently.
pub fn collect_records<R>(elements: Vec<HeadingElement<R>>, range: DepthRange) -> Vec<HeadingRecord<R>> {
    let mut records = Vec::with_capacity(elements.len());

    for element in elements {
        let depth = match Depth::new(element.level) {
            Ok(depth) => depth,
            Err(e) => {
                tracing::warn!(error = %e, "skipping heading");
                continue;
            },
        };
        if !range.contains(depth) {
            continue;
        }
        records.push(HeadingRecord {
            depth,
            title: heading_title(&element.inline),
            source: element.source,
        });
    }

    return records;
}

/// Text of every non-marker inline node, with runs of whitespace (line
/// breaks included) collapsed to one space.
pub fn heading_title(inline: &[InlineNode]) -> String {
    let words: Vec<&str> = inline
        .iter()
        .filter(|node| return !node.number_marker)
        .flat_map(|node| return node.text.split_whitespace())
        .collect();
    return words.join(" ");
}
