//! Outline rendering: turns a heading tree into numbered, clickable entries.
//!
//! Numbering is top-down (each entry's path is its parent's path plus its
//! 1-based position among siblings) while construction is bottom-up: an
//! entry's children are rendered before the entry itself. The root is not an
//! entry; an `Outline` holds the root's rendered children.
//!
//! Rendering never touches the tree. Its only side effect is asking the
//! document to keep each heading's number marker in sync with its label.

use serde::Serialize;

use crate::host::Document;
use crate::tree::{NodeId, TocTree};
use crate::types::PathNumber;

/// Click target bound to one entry: the originating heading.
#[derive(Debug, Clone)]
pub struct Activation<R> {
    /// Handle of the heading to reveal.
    target: R,
}

impl<R> Activation<R> {
    /// Scroll `target` into view `scroll_offset` units below the top edge
    /// (clearing a floating header), then restart its focus highlight by
    /// removing and re-adding it so repeated clicks always replay.
    pub fn invoke<D>(&self, document: &mut D, scroll_offset: i64)
    where
        D: Document<Ref = R>,
    {
        if let Some(top) = document.offset_top(&self.target) {
            document.scroll_to(top.saturating_sub(scroll_offset).max(0));
        }
        document.remove_focus(&self.target);
        document.add_focus(&self.target);
    }
}

/// One rendered heading.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct OutlineEntry<R> {
    /// What a click on this entry does.
    #[serde(skip)]
    pub activation: Activation<R>,
    /// Rendered subheadings in document order.
    pub children: Vec<OutlineEntry<R>>,
    /// Heading level.
    pub depth: u8,
    /// Dotted form of `path`, e.g. `2.3.1`.
    pub label: String,
    /// Sibling positions from the root.
    pub path: PathNumber,
    /// Heading text.
    pub title: String,
}

/// The rendered outline: the top-level entries.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct Outline<R> {
    /// Entries for the root's children.
    pub entries: Vec<OutlineEntry<R>>,
}

impl<R> Outline<R> {
    /// Find the entry numbered `label`.
    pub fn find(&self, label: &str) -> Option<&OutlineEntry<R>> {
        let mut stack: Vec<&OutlineEntry<R>> = self.entries.iter().collect();
        while let Some(entry) = stack.pop() {
            if entry.label == label {
                return Some(entry);
            }
            stack.extend(entry.children.iter());
        }
        return None;
    }
}

/// Render `tree` into an outline, syncing number markers on `document`.
pub fn render<D: Document>(tree: &TocTree<D::Ref>, document: &mut D) -> Outline<D::Ref> {
    let root_path = PathNumber::default();
    let entries = render_children(tree, tree.root(), &root_path, document);
    return Outline { entries };
}

/// Render every child of `id`, numbering them under `path`.
fn render_children<D: Document>(
    tree: &TocTree<D::Ref>,
    id: NodeId,
    path: &PathNumber,
    document: &mut D,
) -> Vec<OutlineEntry<D::Ref>> {
    let mut entries = Vec::with_capacity(tree.children(id).len());
    for (position, child) in tree.children(id).iter().enumerate() {
        let child_path = path.child(position.saturating_add(1));
        if let Some(entry) = render_entry(tree, *child, child_path, document) {
            entries.push(entry);
        }
    }
    return entries;
}

/// Render one heading after its subtree.
fn render_entry<D: Document>(
    tree: &TocTree<D::Ref>,
    id: NodeId,
    path: PathNumber,
    document: &mut D,
) -> Option<OutlineEntry<D::Ref>> {
    let children = render_children(tree, id, &path, document);

    let node = tree.node(id)?;
    let source = node.source.as_ref()?;
    let label = path.to_string();
    document.ensure_number_marker(source, &label);

    return Some(OutlineEntry {
        activation: Activation { target: source.clone() },
        children,
        depth: node.depth,
        label,
        path,
        title: node.title.clone().unwrap_or_default(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryDocument;
    use crate::types::{Depth, HeadingRecord};

    fn tree_of(depths: &[(u8, &str)]) -> TocTree<usize> {
        TocTree::build(depths.iter().enumerate().map(|(i, (depth, title))| HeadingRecord {
            depth: Depth::new(*depth).unwrap(),
            source: i,
            title: (*title).to_string(),
        }))
    }

    fn labels(outline: &Outline<usize>) -> Vec<(String, String)> {
        outline
            .flatten()
            .into_iter()
            .map(|e| (e.label.clone(), e.title.clone()))
            .collect()
    }

    #[test]
    fn numbers_nested_headings() {
        let (mut doc, _handle) = MemoryDocument::new(&[(1, "A"), (2, "B"), (2, "C"), (3, "D"), (1, "E")]);
        let tree = tree_of(&[(1, "A"), (2, "B"), (2, "C"), (3, "D"), (1, "E")]);
        let outline = render(&tree, &mut doc);
        let expected = [("1", "A"), ("1.1", "B"), ("1.2", "C"), ("1.2.1", "D"), ("2", "E")];
        let expected: Vec<(String, String)> =
            expected.iter().map(|(l, t)| ((*l).to_string(), (*t).to_string())).collect();
        assert_eq!(labels(&outline), expected);
        assert_eq!(outline.find("1.2.1").unwrap().path, PathNumber(vec![1, 2, 1]));
    }

    #[test]
    fn depth_jump_numbers_contiguously() {
        let (mut doc, _handle) = MemoryDocument::new(&[(2, "x"), (4, "y"), (1, "z")]);
        let tree = tree_of(&[(2, "x"), (4, "y"), (1, "z")]);
        let outline = render(&tree, &mut doc);
        let got: Vec<String> = labels(&outline).into_iter().map(|(l, _)| l).collect();
        assert_eq!(got, ["1", "1.1", "2"]);
    }

    #[test]
    fn rerender_keeps_one_marker_per_heading() {
        let (mut doc, handle) = MemoryDocument::new(&[(1, "A"), (2, "B"), (1, "C")]);
        let tree = tree_of(&[(1, "A"), (2, "B"), (1, "C")]);

        let first = render(&tree, &mut doc);
        let second = render(&tree, &mut doc);
        assert_eq!(labels(&first), labels(&second));

        let state = handle.borrow();
        for (index, heading) in state.headings.iter().enumerate() {
            let markers: Vec<&str> = heading
                .inline
                .iter()
                .filter(|n| n.number_marker)
                .map(|n| n.text.as_str())
                .collect();
            assert_eq!(markers.len(), 1, "heading {index} has {markers:?}");
        }
        assert_eq!(state.headings[1].inline[0].text, "1.1");
    }

    #[test]
    fn empty_tree_renders_nothing() {
        let (mut doc, handle) = MemoryDocument::new(&[]);
        let outline = render(&TocTree::<usize>::build(Vec::new()), &mut doc);
        assert!(outline.entries.is_empty());
        assert!(handle.borrow().headings.is_empty());
    }

    #[test]
    fn activation_scrolls_below_header_and_restarts_focus() {
        let (mut doc, handle) = MemoryDocument::new(&[(1, "A"), (2, "B")]);
        let tree = tree_of(&[(1, "A"), (2, "B")]);
        let outline = render(&tree, &mut doc);

        let entry = outline.find("1.1").unwrap();
        entry.activation.invoke(&mut doc, 130);
        entry.activation.invoke(&mut doc, 130);

        let state = handle.borrow();
        assert_eq!(state.scroll_top, Some(state.offset_of(1) - 130));
        assert_eq!(state.focus_log, ["-1", "+1", "-1", "+1"]);
    }

    #[test]
    fn activation_never_scrolls_above_document_top() {
        let (mut doc, handle) = MemoryDocument::new(&[(1, "A")]);
        let outline = render(&tree_of(&[(1, "A")]), &mut doc);
        outline.find("1").unwrap().activation.invoke(&mut doc, 130);
        assert_eq!(handle.borrow().scroll_top, Some(0));
    }
}
