//! Keeps the sidebar in sync with a changing document.
//!
//! States: `Detached` (no document), `Empty` (document with no headings),
//! `Populated` (at least one heading). Every rebuild rescans the document,
//! builds a fresh tree, renders it, and moves between `Empty` and
//! `Populated` depending on whether the root has children.
//!
//! Change signals go through a `Coalescer`, so a burst costs one immediate
//! rebuild plus one trailing rebuild. Pin signals have their own coalescer
//! and never rebuild the tree.

use std::time::Instant;

use crate::config::{Config, DepthRange};
use crate::error::Error;
use crate::host::{Document, Sidebar, Subscription};
use crate::outline::{self, Outline};
use crate::scanner;
use crate::throttle::Coalescer;
use crate::tree::TocTree;

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No document is attached.
    Detached,
    /// A document is attached but has no headings.
    Empty,
    /// A document is attached and the outline has at least one entry.
    Populated,
}

/// Drives rebuilds of one document's outline into one sidebar.
pub struct SyncController<D: Document, S: Sidebar<D::Ref>> {
    /// Which heading depths make it into the outline.
    depths: DepthRange,
    /// The monitored document, if any.
    document: Option<D>,
    /// Host listeners registered for the attached document.
    listeners: Vec<Box<dyn Subscription>>,
    /// Outline from the latest rebuild, kept for activation.
    outline: Option<Outline<D::Ref>>,
    /// Coalescer for pinned-state refreshes.
    pin: Coalescer,
    /// Coalescer for tree rebuilds.
    rebuilds: Coalescer,
    /// Gap left above a revealed heading.
    scroll_offset: i64,
    /// Presentation surface.
    sidebar: S,
    /// Current lifecycle state.
    state: SyncState,
}

impl<D: Document, S: Sidebar<D::Ref>> SyncController<D, S> {
    /// Create a detached controller presenting into `sidebar`.
    pub fn new(sidebar: S, config: &Config) -> Self {
        return Self {
            depths: config.depths,
            document: None,
            listeners: Vec::new(),
            outline: None,
            pin: Coalescer::new(config.throttle, config.trailing),
            rebuilds: Coalescer::new(config.throttle, config.trailing),
            scroll_offset: config.scroll_offset,
            sidebar,
            state: SyncState::Detached,
        };
    }

    /// Start monitoring `document`. Any previously attached document is torn
    /// down first. Rebuilds immediately and syncs the pinned state.
    ///
    /// # Errors
    ///
    /// Returns errors from the initial rebuild; the document stays attached.
    pub fn attach(
        &mut self,
        document: D,
        listeners: Vec<Box<dyn Subscription>>,
    ) -> Result<SyncState, Error> {
        if self.document.is_some() {
            self.teardown();
        }
        self.document = Some(document);
        self.listeners = listeners;
        tracing::debug!(listeners = self.listeners.len(), "attached document");

        self.refresh_pinned();
        return self.rebuild();
    }

    /// A change signal arrived at `now`. Rebuilds right away on the leading
    /// edge; otherwise the rebuild waits for `poll`.
    ///
    /// # Errors
    ///
    /// Returns errors from the rebuild.
    pub fn on_change(&mut self, now: Instant) -> Result<SyncState, Error> {
        if self.document.is_none() {
            return Ok(self.state);
        }
        if self.rebuilds.signal(now) {
            return self.rebuild();
        }
        return Ok(self.state);
    }

    /// The floating header changed at `now`. Only the pinned state is
    /// refreshed; the tree is left alone.
    pub fn on_pin_change(&mut self, now: Instant) {
        if self.pin.signal(now) {
            self.refresh_pinned();
        }
    }

    /// Run whatever trailing work is due at `now`.
    ///
    /// # Errors
    ///
    /// Returns errors from a trailing rebuild.
    pub fn poll(&mut self, now: Instant) -> Result<SyncState, Error> {
        if self.pin.poll(now) {
            self.refresh_pinned();
        }
        if self.rebuilds.poll(now) {
            return self.rebuild();
        }
        return Ok(self.state);
    }

    /// Earliest moment `poll` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        return match (self.rebuilds.deadline(), self.pin.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    /// Rescan the document, rebuild the tree, re-render the sidebar.
    /// Reads the document as it is now, not as it was when the change
    /// was signaled.
    ///
    /// # Errors
    ///
    /// Returns errors from reading the document, writing markers, or
    /// writing the sidebar.
    pub fn rebuild(&mut self) -> Result<SyncState, Error> {
        let Some(document) = self.document.as_mut() else {
            return Ok(SyncState::Detached);
        };

        let elements = document.heading_elements()?;
        let records = scanner::collect_records(elements, self.depths);
        let tree = TocTree::build(records);

        let next = if tree.has_headings() {
            let rendered = outline::render(&tree, document);
            self.sidebar.show(&rendered)?;
            self.outline = Some(rendered);
            document.commit_markers()?;
            SyncState::Populated
        } else {
            self.outline = None;
            self.sidebar.hide()?;
            SyncState::Empty
        };

        if next != self.state {
            tracing::info!(from = ?self.state, to = ?next, "outline state changed");
        }
        tracing::debug!(headings = tree.len(), "rebuilt outline");
        self.state = next;
        return Ok(next);
    }

    /// Stop monitoring: release every listener, cancel pending rebuilds,
    /// clear the sidebar. Safe to call repeatedly and before any `attach`.
    /// A listener that fails to release is logged and the rest are still
    /// released.
    pub fn teardown(&mut self) {
        for mut listener in self.listeners.drain(..) {
            if let Err(e) = listener.release() {
                tracing::warn!(listener = listener.name(), error = %e, "listener release failed");
            }
        }
        self.rebuilds.cancel();
        self.pin.cancel();
        self.outline = None;

        if self.document.take().is_some() || self.state != SyncState::Detached {
            if let Err(e) = self.sidebar.hide() {
                tracing::warn!(error = %e, "failed to clear sidebar");
            }
            tracing::info!(from = ?self.state, "detached document");
        }
        self.state = SyncState::Detached;
    }

    /// Click on the entry numbered `label`: reveal and highlight its heading.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownLabel` if no current entry carries `label`.
    pub fn activate(&mut self, label: &str) -> Result<(), Error> {
        let entry = self.outline.as_ref().and_then(|o| return o.find(label));
        let (Some(entry), Some(document)) = (entry, self.document.as_mut()) else {
            return Err(Error::UnknownLabel { label: label.to_string() });
        };
        entry.activation.invoke(document, self.scroll_offset);
        return Ok(());
    }

    /// Reserved text-interpretation entry point. Exporting the full outline
    /// as text is not implemented; the result is always empty.
    pub fn interpret(&self, _text: &str) -> String {
        return String::new();
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> SyncState {
        return self.state;
    }

    /// The attached document.
    pub const fn document(&self) -> Option<&D> {
        return self.document.as_ref();
    }

    /// Push the floating header's pinned state to the sidebar. No header,
    /// no change.
    fn refresh_pinned(&mut self) {
        let pinned = self.document.as_ref().and_then(|d| return d.header_pinned());
        if let Some(pinned) = pinned {
            self.sidebar.set_pinned(pinned);
        }
    }
}
