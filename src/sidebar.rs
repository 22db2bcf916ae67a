//! Sidebars for the CLI: a terminal stream and an output file.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::format::{OutputFormat, outline_to_string};
use crate::host::Sidebar;
use crate::outline::Outline;

/// Writes each outline frame to a stream such as stdout. Hiding writes
/// nothing; a frame identical to the previous one is skipped.
pub struct StreamSidebar<W: Write> {
    /// How frames are printed.
    format: OutputFormat,
    /// Last frame written, if the sidebar is showing.
    last_frame: Option<String>,
    /// Destination stream.
    out: W,
    /// Pinned state last reported by the document.
    pinned: bool,
}

impl<W: Write> StreamSidebar<W> {
    /// Present outlines on `out` in `format`.
    pub const fn new(out: W, format: OutputFormat) -> Self {
        return Self { format, last_frame: None, out, pinned: true };
    }
}

impl<R, W: Write> Sidebar<R> for StreamSidebar<W> {
    fn show(&mut self, outline: &Outline<R>) -> Result<(), Error> {
        let frame = outline_to_string(outline, self.format)?;
        if self.last_frame.as_deref() == Some(frame.as_str()) {
            return Ok(());
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        self.last_frame = Some(frame);
        return Ok(());
    }

    fn hide(&mut self) -> Result<(), Error> {
        self.last_frame = None;
        return Ok(());
    }

    fn set_pinned(&mut self, pinned: bool) {
        if pinned != self.pinned {
            tracing::debug!(pinned, "sidebar pin state changed");
        }
        self.pinned = pinned;
    }
}

/// Rewrites an output file with every outline. A hidden sidebar is an
/// empty file.
pub struct FileSidebar {
    /// How frames are printed.
    format: OutputFormat,
    /// Output file, rewritten on every frame.
    path: PathBuf,
}

impl FileSidebar {
    /// Present outlines in `path`, formatted as `format`.
    pub fn new(path: &Path, format: OutputFormat) -> Self {
        return Self { format, path: path.to_path_buf() };
    }
}

impl<R> Sidebar<R> for FileSidebar {
    fn show(&mut self, outline: &Outline<R>) -> Result<(), Error> {
        let frame = outline_to_string(outline, self.format)?;
        std::fs::write(&self.path, frame)?;
        return Ok(());
    }

    fn hide(&mut self) -> Result<(), Error> {
        std::fs::write(&self.path, "")?;
        return Ok(());
    }

    fn set_pinned(&mut self, pinned: bool) {
        tracing::debug!(pinned, path = %self.path.display(), "sidebar pin state changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::render;
    use crate::testing::MemoryDocument;
    use crate::tree::TocTree;
    use crate::types::{Depth, HeadingRecord};

    fn outline(titles: &[&str]) -> Outline<usize> {
        let headings: Vec<(u8, &str)> = titles.iter().map(|t| (1, *t)).collect();
        let (mut doc, _) = MemoryDocument::new(&headings);
        let tree = TocTree::build(titles.iter().enumerate().map(|(i, t)| HeadingRecord {
            depth: Depth::new(1).unwrap(),
            source: i,
            title: (*t).to_string(),
        }));
        render(&tree, &mut doc)
    }

    #[test]
    fn stream_skips_repeated_frames() {
        let mut sidebar = StreamSidebar::new(Vec::new(), OutputFormat::Text);
        sidebar.show(&outline(&["A"])).unwrap();
        sidebar.show(&outline(&["A"])).unwrap();
        sidebar.show(&outline(&["A", "B"])).unwrap();
        assert_eq!(String::from_utf8(sidebar.out.clone()).unwrap(), "1 A\n1 A\n2 B\n");

        Sidebar::<usize>::hide(&mut sidebar).unwrap();
        sidebar.show(&outline(&["A", "B"])).unwrap();
        assert_eq!(String::from_utf8(sidebar.out).unwrap(), "1 A\n1 A\n2 B\n1 A\n2 B\n");
    }

    #[test]
    fn file_is_rewritten_wholesale_and_emptied_on_hide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toc.txt");
        let mut sidebar = FileSidebar::new(&path, OutputFormat::Text);

        sidebar.show(&outline(&["A", "B"])).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1 A\n2 B\n");
        sidebar.show(&outline(&["C"])).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1 C\n");
        Sidebar::<usize>::hide(&mut sidebar).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
