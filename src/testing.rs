//! In-memory host used by unit tests.
//!
//! Tests keep a shared handle to the state so they can rewrite headings after
//! handing the document to a controller and inspect what the controller did.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Error;
use crate::host::{Document, HeadingElement, InlineNode, Sidebar, Subscription};
use crate::outline::{Outline, OutlineEntry};

impl<R> Outline<R> {
    /// All entries in document order.
    pub fn flatten(&self) -> Vec<&OutlineEntry<R>> {
        let mut order = Vec::new();
        let mut stack: Vec<&OutlineEntry<R>> = self.entries.iter().rev().collect();
        while let Some(entry) = stack.pop() {
            order.push(entry);
            stack.extend(entry.children.iter().rev());
        }
        order
    }
}

/// A heading element held in memory.
#[derive(Debug, Clone)]
pub struct MemoryHeading {
    pub inline: Vec<InlineNode>,
    pub level: u8,
}

#[derive(Debug, Default)]
pub struct MemoryState {
    pub focus_log: Vec<String>,
    pub headings: Vec<MemoryHeading>,
    pub pinned: Option<bool>,
    pub reads: usize,
    pub scroll_top: Option<i64>,
}

impl MemoryState {
    /// Every heading sits 100 units below the previous one.
    pub fn offset_of(&self, index: usize) -> i64 {
        i64::try_from(index + 1).unwrap() * 100
    }

    pub fn set_headings(&mut self, headings: &[(u8, &str)]) {
        self.headings = headings
            .iter()
            .map(|(level, title)| MemoryHeading {
                inline: vec![InlineNode::text(*title)],
                level: *level,
            })
            .collect();
    }
}

pub type Shared<T> = Rc<RefCell<T>>;

pub struct MemoryDocument {
    state: Shared<MemoryState>,
}

impl MemoryDocument {
    pub fn new(headings: &[(u8, &str)]) -> (Self, Shared<MemoryState>) {
        let mut state = MemoryState::default();
        state.set_headings(headings);
        let state = Rc::new(RefCell::new(state));
        (Self { state: Rc::clone(&state) }, state)
    }
}

impl Document for MemoryDocument {
    type Ref = usize;

    fn heading_elements(&mut self) -> Result<Vec<HeadingElement<usize>>, Error> {
        let mut state = self.state.borrow_mut();
        state.reads += 1;
        Ok(state
            .headings
            .iter()
            .enumerate()
            .map(|(source, h)| HeadingElement {
                inline: h.inline.clone(),
                level: h.level,
                source,
            })
            .collect())
    }

    fn ensure_number_marker(&mut self, target: &usize, label: &str) {
        let mut state = self.state.borrow_mut();
        let Some(heading) = state.headings.get_mut(*target) else {
            return;
        };
        if let Some(marker) = heading.inline.iter_mut().find(|n| n.number_marker) {
            marker.text = label.to_string();
        } else {
            heading.inline.insert(0, InlineNode::marker(label));
        }
    }

    fn offset_top(&self, target: &usize) -> Option<i64> {
        let state = self.state.borrow();
        (*target < state.headings.len()).then(|| state.offset_of(*target))
    }

    fn scroll_to(&mut self, top: i64) {
        self.state.borrow_mut().scroll_top = Some(top);
    }

    fn remove_focus(&mut self, target: &usize) {
        self.state.borrow_mut().focus_log.push(format!("-{target}"));
    }

    fn add_focus(&mut self, target: &usize) {
        self.state.borrow_mut().focus_log.push(format!("+{target}"));
    }

    fn header_pinned(&self) -> Option<bool> {
        self.state.borrow().pinned
    }
}

#[derive(Debug, Default)]
pub struct SidebarState {
    /// Labels and titles of the last outline shown, `label title`.
    pub content: Vec<String>,
    pub hides: usize,
    pub pinned: Option<bool>,
    pub shows: usize,
    pub visible: bool,
}

pub struct MemorySidebar {
    state: Shared<SidebarState>,
}

impl MemorySidebar {
    pub fn new() -> (Self, Shared<SidebarState>) {
        let state = Rc::new(RefCell::new(SidebarState::default()));
        (Self { state: Rc::clone(&state) }, state)
    }
}

impl<R> Sidebar<R> for MemorySidebar {
    fn show(&mut self, outline: &Outline<R>) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        state.content = outline
            .flatten()
            .into_iter()
            .map(|e| format!("{} {}", e.label, e.title))
            .collect();
        state.visible = true;
        state.shows += 1;
        Ok(())
    }

    fn hide(&mut self) -> Result<(), Error> {
        let mut state = self.state.borrow_mut();
        state.content.clear();
        state.visible = false;
        state.hides += 1;
        Ok(())
    }

    fn set_pinned(&mut self, pinned: bool) {
        self.state.borrow_mut().pinned = Some(pinned);
    }
}

/// Listener that counts releases and can be told to fail.
pub struct RecordingSubscription {
    pub fail: bool,
    pub name: String,
    pub released: Shared<Vec<String>>,
}

impl RecordingSubscription {
    pub fn boxed(name: &str, fail: bool, released: &Shared<Vec<String>>) -> Box<dyn Subscription> {
        Box::new(Self {
            fail,
            name: name.to_string(),
            released: Rc::clone(released),
        })
    }
}

impl Subscription for RecordingSubscription {
    fn name(&self) -> &str {
        &self.name
    }

    fn release(&mut self) -> Result<(), Error> {
        self.released.borrow_mut().push(self.name.clone());
        if self.fail {
            return Err(Error::ListenerRelease {
                name: self.name.clone(),
                reason: "host refused".to_string(),
            });
        }
        Ok(())
    }
}
