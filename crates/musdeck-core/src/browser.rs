//! Directory listing, pagination window and bounded navigation history.
//!
//! Entry indices are 1-based over the listing; index 0 is a synthetic ".."
//! parent link that is always present. Directories come before files, each
//! partition sorted case-insensitively.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::error::{PlayerError, Result};
use crate::MAX_DIRECTORIES;

/// One entry as reported by the filesystem collaborator.
#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

/// Enumerates a directory. The sole filesystem seam of this crate.
pub trait DirectorySource {
    /// All entries of `path`, in any order, hidden files included.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>>;
}

/// Sorted, partitioned snapshot of one directory.
///
/// Rebuilt wholesale on every refresh; never mutated in place.
#[derive(Debug, Default)]
pub struct DirectoryListing {
    dirs: Vec<String>,
    files: Vec<String>,
}

impl DirectoryListing {
    fn build(mut entries: Vec<DirEntryInfo>) -> Self {
        entries.retain(|e| !e.name.starts_with('.'));

        let (mut dirs, mut files): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.is_dir);
        dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        Self {
            dirs: dirs.into_iter().map(|e| e.name).collect(),
            files: files.into_iter().map(|e| e.name).collect(),
        }
    }

    /// Number of real entries; the ".." link at index 0 is not counted, so
    /// valid cursor positions are `0..=total()`.
    pub fn total(&self) -> usize {
        self.dirs.len() + self.files.len()
    }

    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Index of the first file entry. Valid only when files exist.
    pub fn first_file_index(&self) -> usize {
        self.dirs.len() + 1
    }

    pub fn is_dir_index(&self, index: usize) -> bool {
        (1..=self.dirs.len()).contains(&index)
    }

    pub fn is_file_index(&self, index: usize) -> bool {
        index > self.dirs.len() && index <= self.total()
    }

    /// Entry name at a 1-based index; `None` for 0 and out-of-range.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        if self.is_dir_index(index) {
            self.dirs.get(index - 1).map(String::as_str)
        } else if self.is_file_index(index) {
            self.files.get(index - 1 - self.dirs.len()).map(String::as_str)
        } else {
            None
        }
    }
}

/// One visible row of the listing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    /// The synthetic ".." link at index 0.
    Parent,
    Dir(&'a str),
    File(&'a str),
}

/// Cursor and viewport of a parent listing, saved while inside a child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationFrame {
    pub selected: usize,
    pub offset: usize,
}

/// Bounded ring of [`NavigationFrame`]s, nearest ancestor first.
///
/// Pushing when full evicts the farthest-ancestor frame; history beyond
/// [`MAX_DIRECTORIES`] levels is irrecoverable and popping past it yields
/// default frames.
#[derive(Debug, Default)]
pub struct NavigationStack {
    frames: VecDeque<NavigationFrame>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: NavigationFrame) {
        if self.frames.len() == MAX_DIRECTORIES {
            self.frames.pop_back();
        }
        self.frames.push_front(frame);
    }

    pub fn pop(&mut self) -> NavigationFrame {
        self.frames.pop_front().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Listing, cursor, window and history over one working directory.
///
/// Owned and mutated exclusively by the control thread.
pub struct DirectoryBrowser {
    source: Box<dyn DirectorySource>,
    cwd: PathBuf,
    listing: DirectoryListing,
    cursor: usize,
    from: usize,
    page_rows: usize,
    stack: NavigationStack,
}

impl DirectoryBrowser {
    /// Open a browser rooted at `root`. Fails if the root cannot be read.
    pub fn new(source: Box<dyn DirectorySource>, root: PathBuf, page_rows: usize) -> Result<Self> {
        let mut browser = Self {
            source,
            cwd: root,
            listing: DirectoryListing::default(),
            cursor: 0,
            from: 0,
            page_rows: page_rows.max(1),
            stack: NavigationStack::new(),
        };
        browser.refresh()?;
        Ok(browser)
    }

    /// Re-enumerate the working directory, replacing the listing wholesale.
    /// The cursor is clamped in case entries disappeared.
    pub fn refresh(&mut self) -> Result<()> {
        self.listing = DirectoryListing::build(self.read(&self.cwd.clone())?);
        self.set_cursor(self.cursor);
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Vec<DirEntryInfo>> {
        self.source.read_dir(path).map_err(|err| match err {
            // Tag enumeration failures with the path being listed.
            PlayerError::DirectoryRead { source, .. } => PlayerError::DirectoryRead {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn listing(&self) -> &DirectoryListing {
        &self.listing
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// First entry index inside the visible window.
    pub fn window_start(&self) -> usize {
        self.from
    }

    /// Absolute path of the entry under `index`; `None` for the ".." link.
    pub fn entry_path(&self, index: usize) -> Option<PathBuf> {
        self.listing.name_at(index).map(|name| self.cwd.join(name))
    }

    pub fn cursor_on_parent_link(&self) -> bool {
        self.cursor == 0
    }

    pub fn cursor_on_dir(&self) -> bool {
        self.listing.is_dir_index(self.cursor)
    }

    pub fn cursor_on_file(&self) -> bool {
        self.listing.is_file_index(self.cursor)
    }

    // --- cursor movement -------------------------------------------------

    /// Clamp to `[0, total]` and keep the cursor visible with a minimal
    /// window adjustment (no scroll-ahead).
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.listing.total());
        if self.cursor < self.from {
            self.from = self.cursor;
        } else if self.cursor >= self.from + self.page_rows {
            self.from = self.cursor + 1 - self.page_rows;
        }
    }

    pub fn move_up(&mut self) {
        self.set_cursor(self.cursor.saturating_sub(1));
    }

    pub fn move_down(&mut self) {
        self.set_cursor(self.cursor + 1);
    }

    pub fn page_back(&mut self) {
        self.set_cursor(self.cursor.saturating_sub(self.page_rows));
    }

    pub fn page_forward(&mut self) {
        self.set_cursor(self.cursor + self.page_rows);
    }

    // --- navigation ------------------------------------------------------

    /// Descend into the directory entry under the cursor. No-op when the
    /// cursor is not on a directory.
    pub fn descend(&mut self) -> Result<()> {
        let Some(child) = self
            .cursor_on_dir()
            .then(|| self.entry_path(self.cursor))
            .flatten()
        else {
            return Ok(());
        };

        // Enumerate before touching any state, so a failed descent leaves
        // the browser where it was.
        let entries = self.read(&child)?;
        self.stack.push(NavigationFrame {
            selected: self.cursor,
            offset: self.from,
        });
        self.cwd = child;
        self.listing = DirectoryListing::build(entries);
        self.cursor = 0;
        self.from = 0;
        Ok(())
    }

    /// Ascend to the parent directory, restoring the saved cursor/viewport
    /// (or a default frame when the history is exhausted). No-op at the
    /// filesystem root.
    pub fn ascend(&mut self) -> Result<()> {
        let Some(parent) = self.cwd.parent().map(Path::to_path_buf) else {
            return Ok(());
        };

        let entries = self.read(&parent)?;
        self.cwd = parent;
        self.listing = DirectoryListing::build(entries);

        let frame = self.stack.pop();
        self.from = frame.offset;
        self.set_cursor(frame.selected);
        Ok(())
    }

    // --- rendering -------------------------------------------------------

    /// The rows currently inside the window, as `(index, entry)` pairs.
    /// Pure view of the listing; the caller compares indices against
    /// [`cursor`](Self::cursor) to mark the selection.
    pub fn visible_rows(&self) -> Vec<(usize, Entry<'_>)> {
        let mut rows = Vec::with_capacity(self.page_rows);
        for index in self.from..self.from + self.page_rows {
            if index > self.listing.total() {
                break;
            }
            let entry = if index == 0 {
                Entry::Parent
            } else if self.listing.is_dir_index(index) {
                match self.listing.name_at(index) {
                    Some(name) => Entry::Dir(name),
                    None => break,
                }
            } else {
                match self.listing.name_at(index) {
                    Some(name) => Entry::File(name),
                    None => break,
                }
            };
            rows.push((index, entry));
        }
        rows
    }

    // --- skip / auto-advance targets -------------------------------------

    /// Cursor position for a prev/next skip, clamped to the file range of
    /// the listing. `None` when the cursor is not on a file (skips never
    /// land on directories or the parent link) or the listing has no files.
    ///
    /// At a boundary the clamp can return the current position; the caller
    /// then restarts the same track.
    pub fn skip_target(&self, forward: bool) -> Option<usize> {
        if !self.cursor_on_file() {
            return None;
        }
        let first = self.listing.first_file_index();
        let last = self.listing.total();
        let target = if forward {
            (self.cursor + 1).min(last)
        } else {
            self.cursor.saturating_sub(1).max(first)
        };
        Some(target)
    }

    /// Cursor position of the next track after a natural end of stream, or
    /// `None` when the ended track was the last one (or the cursor has moved
    /// off the file entries) and playback should simply stop.
    pub fn auto_advance_target(&self) -> Option<usize> {
        if !self.cursor_on_file() {
            return None;
        }
        let next = self.cursor + 1;
        (next <= self.listing.total()).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory directory tree.
    struct FakeSource {
        tree: HashMap<PathBuf, Vec<DirEntryInfo>>,
    }

    impl FakeSource {
        fn new(tree: &[(&str, &[(&str, bool)])]) -> Self {
            let tree = tree
                .iter()
                .map(|(path, entries)| {
                    let entries = entries
                        .iter()
                        .map(|(name, is_dir)| DirEntryInfo {
                            name: name.to_string(),
                            is_dir: *is_dir,
                        })
                        .collect();
                    (PathBuf::from(path), entries)
                })
                .collect();
            Self { tree }
        }
    }

    impl DirectorySource for FakeSource {
        fn read_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>> {
            self.tree
                .get(path)
                .cloned()
                .ok_or_else(|| PlayerError::DirectoryRead {
                    path: path.to_path_buf(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
        }
    }

    fn browser(tree: &[(&str, &[(&str, bool)])], root: &str, rows: usize) -> DirectoryBrowser {
        DirectoryBrowser::new(Box::new(FakeSource::new(tree)), PathBuf::from(root), rows).unwrap()
    }

    #[test]
    fn listing_filters_hidden_and_sorts_dirs_before_files() {
        let b = browser(
            &[(
                "/music",
                &[
                    (".git", true),
                    ("b.mp3", false),
                    ("A", true),
                    ("a.mp3", false),
                ],
            )],
            "/music",
            10,
        );

        let rows = b.visible_rows();
        assert_eq!(
            rows,
            vec![
                (0, Entry::Parent),
                (1, Entry::Dir("A")),
                (2, Entry::File("a.mp3")),
                (3, Entry::File("b.mp3")),
            ]
        );
        assert_eq!(b.listing().total(), 3);
    }

    #[test]
    fn sorting_is_case_insensitive_within_each_partition() {
        let b = browser(
            &[(
                "/music",
                &[("Zebra.mp3", false), ("apple.mp3", false), ("Mango.mp3", false)],
            )],
            "/music",
            10,
        );
        assert_eq!(b.listing().name_at(1), Some("apple.mp3"));
        assert_eq!(b.listing().name_at(2), Some("Mango.mp3"));
        assert_eq!(b.listing().name_at(3), Some("Zebra.mp3"));
    }

    #[test]
    fn window_moves_only_when_the_cursor_would_leave_it() {
        let entries: Vec<(String, bool)> =
            (0..20).map(|i| (format!("t{i:02}.mp3"), false)).collect();
        let borrowed: Vec<(&str, bool)> =
            entries.iter().map(|(n, d)| (n.as_str(), *d)).collect();
        let mut b = browser(&[("/music", &borrowed)], "/music", 5);

        // Cursor walks inside the window without scrolling.
        for _ in 0..4 {
            b.move_down();
        }
        assert_eq!(b.cursor(), 4);
        assert_eq!(b.window_start(), 0);

        // One more step pushes the window down by exactly one.
        b.move_down();
        assert_eq!(b.cursor(), 5);
        assert_eq!(b.window_start(), 1);

        // Jumping back pulls the window up just enough.
        b.page_back();
        assert_eq!(b.cursor(), 0);
        assert_eq!(b.window_start(), 0);
    }

    #[test]
    fn cursor_clamps_to_listing_bounds() {
        let mut b = browser(&[("/music", &[("a.mp3", false)])], "/music", 5);
        b.page_forward();
        assert_eq!(b.cursor(), 1);
        b.move_down();
        assert_eq!(b.cursor(), 1);
        b.page_back();
        b.move_up();
        assert_eq!(b.cursor(), 0);
    }

    #[test]
    fn descend_and_ascend_restore_the_saved_frame() {
        let mut b = browser(
            &[
                (
                    "/music",
                    &[("album", true), ("x.mp3", false), ("y.mp3", false)],
                ),
                ("/music/album", &[("1.mp3", false)]),
                ("/", &[("music", true)]),
            ],
            "/music",
            2,
        );

        b.set_cursor(1);
        b.descend().unwrap();
        assert_eq!(b.cwd(), Path::new("/music/album"));
        assert_eq!(b.cursor(), 0);
        assert_eq!(b.window_start(), 0);

        b.ascend().unwrap();
        assert_eq!(b.cwd(), Path::new("/music"));
        assert_eq!(b.cursor(), 1);
    }

    #[test]
    fn ascend_past_saved_history_lands_on_a_default_frame() {
        let mut b = browser(
            &[("/a", &[("b", true)]), ("/a/b", &[]), ("/", &[("a", true)])],
            "/a/b",
            5,
        );
        // Never descended, so the stack is empty.
        b.set_cursor(0);
        b.ascend().unwrap();
        assert_eq!(b.cwd(), Path::new("/a"));
        assert_eq!(b.cursor(), 0);
        assert_eq!(b.window_start(), 0);
    }

    #[test]
    fn navigation_history_is_bounded() {
        let mut stack = NavigationStack::new();
        for i in 0..MAX_DIRECTORIES + 3 {
            stack.push(NavigationFrame {
                selected: i,
                offset: i,
            });
        }
        assert_eq!(stack.depth(), MAX_DIRECTORIES);

        // The most recent frames survive; the oldest three were evicted.
        assert_eq!(stack.pop().selected, MAX_DIRECTORIES + 2);
        for _ in 1..MAX_DIRECTORIES {
            stack.pop();
        }
        // Exhausted: further pops yield the default frame.
        assert_eq!(stack.pop(), NavigationFrame::default());
    }

    #[test]
    fn descend_failure_leaves_the_browser_unchanged() {
        let mut b = browser(
            &[("/music", &[("gone", true), ("a.mp3", false)])],
            "/music",
            5,
        );
        b.set_cursor(1);
        assert!(matches!(
            b.descend(),
            Err(PlayerError::DirectoryRead { .. })
        ));
        assert_eq!(b.cwd(), Path::new("/music"));
        assert_eq!(b.cursor(), 1);
        assert_eq!(b.listing().total(), 2);
    }

    #[test]
    fn descend_ignores_files_and_the_parent_link() {
        let mut b = browser(
            &[("/music", &[("a.mp3", false)])],
            "/music",
            5,
        );
        b.set_cursor(1);
        b.descend().unwrap();
        assert_eq!(b.cwd(), Path::new("/music"));
        b.set_cursor(0);
        b.descend().unwrap();
        assert_eq!(b.cwd(), Path::new("/music"));
    }

    #[test]
    fn skip_targets_stay_within_the_file_range() {
        let b = browser(
            &[(
                "/music",
                &[("album", true), ("a.mp3", false), ("b.mp3", false)],
            )],
            "/music",
            10,
        );
        // Files occupy indices 2 and 3.
        let mut b = b;
        b.set_cursor(2);
        assert_eq!(b.skip_target(true), Some(3));
        // Backward from the first file clamps onto itself (track restart).
        assert_eq!(b.skip_target(false), Some(2));

        b.set_cursor(3);
        assert_eq!(b.skip_target(true), Some(3));
        assert_eq!(b.skip_target(false), Some(2));

        // On a directory or the parent link, skips are no-ops.
        b.set_cursor(1);
        assert_eq!(b.skip_target(true), None);
        b.set_cursor(0);
        assert_eq!(b.skip_target(false), None);
    }

    #[test]
    fn auto_advance_stops_after_the_last_file() {
        let mut b = browser(
            &[("/music", &[("a.mp3", false), ("b.mp3", false)])],
            "/music",
            10,
        );
        b.set_cursor(1);
        assert_eq!(b.auto_advance_target(), Some(2));
        b.set_cursor(2);
        assert_eq!(b.auto_advance_target(), None);
        // Cursor moved onto the parent link while a track played out.
        b.set_cursor(0);
        assert_eq!(b.auto_advance_target(), None);
    }
}
