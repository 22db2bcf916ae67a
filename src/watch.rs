//! Watch mode: renders on startup, then keeps the outline in sync with the file.
//!
//! The directory holding the document is watched for the whole session, so
//! the document can disappear (teardown, `Detached`) and come back (attach).
//! Each attachment also registers a watch on the file itself, released on
//! teardown. Events on the header file, if one is configured, only refresh
//! the pinned state.

use std::cell::RefCell;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};

use crate::commands::{self, OutlineOptions};
use crate::config::Config;
use crate::controller::{SyncController, SyncState};
use crate::error::Error;
use crate::host::{Sidebar, Subscription};
use crate::lifecycle::Lifecycle;
use crate::markdown::{HeadingLoc, MarkdownDocument};
use crate::sidebar::{FileSidebar, StreamSidebar};

/// What happened to a watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    /// The document was created, written, or renamed into place.
    Changed,
    /// The header file changed, appeared or went away.
    Pin,
    /// The document was deleted or renamed away.
    Removed,
}

/// Watch on the document file itself, held for one attachment.
struct FileWatch {
    /// Whether the watch is still registered.
    active: bool,
    /// Watched file.
    path: PathBuf,
    /// Watcher shared with the session.
    watcher: Rc<RefCell<RecommendedWatcher>>,
}

impl FileWatch {
    /// Start watching `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Watch` if the watch cannot be registered.
    fn start(watcher: &Rc<RefCell<RecommendedWatcher>>, path: &Path) -> Result<Self, Error> {
        watcher
            .borrow_mut()
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| return Error::Watch { reason: format!("{}: {e}", path.display()) })?;
        return Ok(Self { active: true, path: path.to_path_buf(), watcher: Rc::clone(watcher) });
    }
}

impl Subscription for FileWatch {
    fn name(&self) -> &str {
        return "file watch";
    }

    fn release(&mut self) -> Result<(), Error> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        return match self.watcher.borrow_mut().unwatch(&self.path) {
            // A deleted file takes its watch with it.
            Err(e) if !matches!(e.kind, notify::ErrorKind::WatchNotFound) => {
                Err(Error::ListenerRelease { name: self.path.display().to_string(), reason: e.to_string() })
            },
            _ => Ok(()),
        };
    }
}

/// File names the watcher reacts to.
#[derive(Debug, Clone)]
struct Targets {
    /// Path of the document.
    document: PathBuf,
    /// File name of the document.
    document_name: Option<OsString>,
    /// File name of the header file, if one is configured.
    header_name: Option<OsString>,
}

impl Targets {
    /// Targets for `document` and an optional `header`.
    fn new(document: &Path, header: Option<&Path>) -> Self {
        return Self {
            document: document.to_path_buf(),
            document_name: document.file_name().map(std::ffi::OsStr::to_os_string),
            header_name: header.and_then(Path::file_name).map(std::ffi::OsStr::to_os_string),
        };
    }

    /// Map the paths of one event to a signal. Document events win over
    /// header events; anything else is ignored.
    fn classify(&self, paths: &[PathBuf]) -> Option<Signal> {
        let touches = |name: Option<&OsString>| {
            return name.is_some_and(|name| return paths.iter().any(|p| return p.file_name() == Some(name.as_os_str())));
        };
        if touches(self.document_name.as_ref()) {
            return Some(if self.document.exists() { Signal::Changed } else { Signal::Removed });
        }
        if touches(self.header_name.as_ref()) {
            return Some(Signal::Pin);
        }
        return None;
    }
}

/// Create a watcher that reports events touching `targets` on `tx`.
///
/// # Errors
///
/// Returns `Error::Watch` if the watcher cannot be created.
fn create_watcher(targets: Targets, tx: Sender<Signal>) -> Result<RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        let Ok(event) = res else {
            return;
        };
        if !matches!(
            event.kind,
            notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
        ) {
            return;
        }
        if let Some(signal) = targets.classify(&event.paths) {
            let _ = tx.send(signal);
        }
    })
    .map_err(|e| return Error::Watch { reason: format!("watcher setup failed: {e}") });
}

/// Directory holding `file`; `.` for a bare file name.
fn parent_dir(file: &Path) -> PathBuf {
    return match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
}

/// Everything a watch session needs besides the controller.
struct Session<'cfg> {
    /// Settings for new documents.
    config: &'cfg Config,
    /// The watched document.
    file: PathBuf,
    /// Watcher shared by the session and every file watch.
    watcher: Rc<RefCell<RecommendedWatcher>>,
}

impl<'cfg> Session<'cfg> {
    /// Watch the directories holding `file` and the header file. Signals
    /// arrive on `tx`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Watch` if the watcher cannot be set up.
    fn open(file: &Path, config: &'cfg Config, tx: Sender<Signal>) -> Result<Self, Error> {
        let targets = Targets::new(file, config.header.as_deref());
        let watcher = Rc::new(RefCell::new(create_watcher(targets, tx)?));

        let mut dirs = vec![parent_dir(file)];
        if let Some(header) = &config.header {
            let dir = parent_dir(header);
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        for dir in &dirs {
            watcher
                .borrow_mut()
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|e| return Error::Watch { reason: format!("{}: {e}", dir.display()) })?;
        }
        return Ok(Self { config, file: file.to_path_buf(), watcher });
    }

    /// Attach a fresh `MarkdownDocument` for the file with its own file watch.
    ///
    /// # Errors
    ///
    /// Returns errors from registering the watch or from the initial rebuild.
    fn attach<S: Sidebar<HeadingLoc>>(
        &self,
        controller: &mut SyncController<MarkdownDocument, S>,
    ) -> Result<SyncState, Error> {
        let document = MarkdownDocument::new(&self.file, self.config.line_height, self.config.number_headings)
            .with_header(self.config.header.clone());
        let watch = FileWatch::start(&self.watcher, &self.file)?;
        return controller.attach(document, vec![Box::new(watch)]);
    }

    /// Feed one signal (or, for `None`, an expired deadline) to `controller`.
    ///
    /// # Errors
    ///
    /// Returns errors from attaching or rebuilding.
    fn dispatch<S: Sidebar<HeadingLoc>>(
        &self,
        controller: &mut SyncController<MarkdownDocument, S>,
        signal: Option<Signal>,
        now: Instant,
    ) -> Result<SyncState, Error> {
        return match signal {
            Some(Signal::Changed) if controller.state() == SyncState::Detached => {
                eprintln!("watch: {} appeared", self.file.display());
                self.attach(controller)
            },
            Some(Signal::Changed) => controller.on_change(now),
            Some(Signal::Pin) => {
                controller.on_pin_change(now);
                Ok(controller.state())
            },
            Some(Signal::Removed) => {
                if controller.state() != SyncState::Detached {
                    eprintln!("watch: {} removed, waiting for it to come back", self.file.display());
                }
                controller.teardown();
                Ok(SyncState::Detached)
            },
            None => controller.poll(now),
        };
    }
}

/// Entry point for the watch command.
///
/// # Errors
///
/// Returns errors from config loading or watcher setup. Rebuild errors are
/// reported and the session keeps going.
pub fn run(file: &Path, options: &OutlineOptions) -> Result<ExitCode, Error> {
    let config = commands::load_config(options)?;
    return match &options.out {
        Some(out) => watch_into(file, &config, FileSidebar::new(out, config.format)),
        None => watch_into(file, &config, StreamSidebar::new(std::io::stdout(), config.format)),
    };
}

/// Run the watch loop presenting into `sidebar`.
///
/// # Errors
///
/// Returns `Error::Watch` if the watcher cannot be set up.
fn watch_into<S: Sidebar<HeadingLoc>>(file: &Path, config: &Config, sidebar: S) -> Result<ExitCode, Error> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let session = Session::open(file, config, tx)?;

    let mut lifecycle = Lifecycle::new();
    let controller = lifecycle.start(SyncController::new(sidebar, config));

    eprintln!("watch: initial render");
    if file.exists() {
        report(session.attach(controller), controller);
    } else {
        eprintln!("watch: {} does not exist yet, waiting", file.display());
    }
    eprintln!("watch: monitoring {}, press Ctrl+C to stop", file.display());

    while let Some(signal) = next_signal(&rx, controller.next_deadline()) {
        let result = session.dispatch(controller, signal, Instant::now());
        report(result, controller);
    }

    return Ok(ExitCode::SUCCESS);
}

/// Wait for the next signal, or until `deadline` passes. `Some(None)` means
/// the deadline passed; `None` means the watcher is gone.
fn next_signal(rx: &Receiver<Signal>, deadline: Option<Instant>) -> Option<Option<Signal>> {
    let Some(deadline) = deadline else {
        return rx.recv().ok().map(Some);
    };
    return match rx.recv_deadline(deadline) {
        Ok(signal) => Some(Some(signal)),
        Err(RecvTimeoutError::Timeout) => Some(None),
        Err(RecvTimeoutError::Disconnected) => None,
    };
}

/// Print the outcome of a rebuild. A document that vanished mid-rebuild is
/// treated as a teardown signal.
fn report<S: Sidebar<HeadingLoc>>(
    result: Result<SyncState, Error>,
    controller: &mut SyncController<MarkdownDocument, S>,
) {
    match result {
        Ok(SyncState::Empty) => eprintln!("watch: no headings"),
        Ok(SyncState::Detached | SyncState::Populated) => {},
        Err(Error::DocumentNotFound { .. }) => controller.teardown(),
        Err(e) => eprintln!("watch: {e}"),
    }
}
