//! Single-instance ownership of the running controller.

use crate::controller::SyncController;
use crate::host::{Document, Sidebar};

/// Owns at most one active controller. Starting a new one always tears the
/// previous one down first, and dropping the lifecycle tears down whatever
/// is still active.
pub struct Lifecycle<D: Document, S: Sidebar<D::Ref>> {
    /// The running controller, if any.
    active: Option<SyncController<D, S>>,
}

impl<D: Document, S: Sidebar<D::Ref>> Lifecycle<D, S> {
    /// A lifecycle with nothing running.
    pub const fn new() -> Self {
        return Self { active: None };
    }

    /// Make `controller` the active one, stopping any previous controller.
    pub fn start(&mut self, controller: SyncController<D, S>) -> &mut SyncController<D, S> {
        self.stop();
        return self.active.insert(controller);
    }

    /// Tear down the active controller, if any. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut controller) = self.active.take() {
            controller.teardown();
        }
    }
}

impl<D: Document, S: Sidebar<D::Ref>> Drop for Lifecycle<D, S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::Config;
    use crate::controller::SyncState;
    use crate::testing::{MemoryDocument, MemorySidebar, RecordingSubscription};

    fn running(
        title: &str,
        released: &Rc<RefCell<Vec<String>>>,
    ) -> SyncController<MemoryDocument, MemorySidebar> {
        let (sidebar, _) = MemorySidebar::new();
        let mut controller = SyncController::new(sidebar, &Config::default());
        let (doc, _) = MemoryDocument::new(&[(1, title)]);
        controller
            .attach(doc, vec![RecordingSubscription::boxed(title, false, released)])
            .unwrap();
        controller
    }

    #[test]
    fn start_stops_previous_instance() {
        let released = Rc::new(RefCell::new(Vec::new()));
        let mut lifecycle = Lifecycle::new();
        lifecycle.start(running("first", &released));
        assert!(released.borrow().is_empty());

        let second = lifecycle.start(running("second", &released));
        assert_eq!(second.state(), SyncState::Populated);
        assert_eq!(*released.borrow(), ["first"]);
    }

    #[test]
    fn stop_is_idempotent_and_safe_when_never_started() {
        let released = Rc::new(RefCell::new(Vec::new()));
        let mut lifecycle: Lifecycle<MemoryDocument, MemorySidebar> = Lifecycle::new();
        lifecycle.stop();

        lifecycle.start(running("only", &released));
        lifecycle.stop();
        lifecycle.stop();
        assert_eq!(*released.borrow(), ["only"]);
    }

    #[test]
    fn drop_tears_down_active_controller() {
        let released = Rc::new(RefCell::new(Vec::new()));
        {
            let mut lifecycle = Lifecycle::new();
            lifecycle.start(running("scoped", &released));
        }
        assert_eq!(*released.borrow(), ["scoped"]);
    }
}
