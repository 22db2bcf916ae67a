//! Seams to the environment that owns the document and the sidebar.
//!
//! The tree builder and the renderer never see a concrete document: they go
//! through `Document` for heading enumeration, number markers, scrolling and
//! focus, and through `Sidebar` for showing the rendered outline.

use std::fmt;

use crate::error::Error;
use crate::outline::Outline;

/// One inline content node of a heading element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineNode {
    /// Whether this node is a number-label marker written by the renderer.
    pub number_marker: bool,
    /// Text content of the node.
    pub text: String,
}

impl InlineNode {
    /// Plain heading text.
    pub fn text(text: impl Into<String>) -> Self {
        return Self { number_marker: false, text: text.into() };
    }

    /// A number-label marker carrying `label`.
    pub fn marker(label: impl Into<String>) -> Self {
        return Self { number_marker: true, text: label.into() };
    }
}

/// A heading element as enumerated by the host, in document order.
#[derive(Debug, Clone)]
pub struct HeadingElement<R> {
    /// Inline content, possibly including an earlier number marker.
    pub inline: Vec<InlineNode>,
    /// Raw nesting level reported by the host.
    pub level: u8,
    /// Handle used to reach the element again.
    pub source: R,
}

/// A document whose headings feed the outline.
pub trait Document {
    /// Opaque handle to one heading element.
    type Ref: Clone + fmt::Debug;

    /// Enumerate heading elements in document order. Reads the document as it
    /// is now, so a rebuild always sees the latest state.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or parsed.
    fn heading_elements(&mut self) -> Result<Vec<HeadingElement<Self::Ref>>, Error>;

    /// Make sure `target` carries a number marker reading `label`. Updates an
    /// existing marker instead of adding a second one.
    fn ensure_number_marker(&mut self, target: &Self::Ref, label: &str);

    /// Flush marker changes queued by `ensure_number_marker`.
    ///
    /// # Errors
    ///
    /// Returns an error if the changes cannot be written back.
    fn commit_markers(&mut self) -> Result<(), Error> {
        return Ok(());
    }

    /// Distance of `target` from the top of the document, in viewport units.
    fn offset_top(&self, target: &Self::Ref) -> Option<i64>;

    /// Scroll the viewport so its top edge sits at `top`.
    fn scroll_to(&mut self, top: i64);

    /// Drop the transient focus highlight from `target`.
    fn remove_focus(&mut self, target: &Self::Ref);

    /// Put the transient focus highlight on `target`, restarting its animation.
    fn add_focus(&mut self, target: &Self::Ref);

    /// Whether the floating header is currently pinned (visible). `None` when
    /// the document has no floating header.
    fn header_pinned(&self) -> Option<bool> {
        return None;
    }
}

/// Where the rendered outline is presented.
pub trait Sidebar<R> {
    /// Replace the sidebar content with `outline` and make it visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the sidebar cannot be written.
    fn show(&mut self, outline: &Outline<R>) -> Result<(), Error>;

    /// Hide the sidebar and clear its content.
    ///
    /// # Errors
    ///
    /// Returns an error if the sidebar cannot be written.
    fn hide(&mut self) -> Result<(), Error>;

    /// Follow the floating header's pinned state.
    fn set_pinned(&mut self, pinned: bool);
}

/// A listener registered with the host on behalf of a controller.
pub trait Subscription {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Detach the listener.
    ///
    /// # Errors
    ///
    /// Returns `Error::ListenerRelease` if the host refuses to detach it.
    fn release(&mut self) -> Result<(), Error>;
}
