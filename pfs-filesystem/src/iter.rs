//! Directory iterators.
//!
//! Both iterators are single pass cursors whose state is shared between clones, advancing one
//! clone advances all of them. A default constructed iterator is the end iterator.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use pfs_path::Path;

use crate::entry::DirectoryEntry;
use crate::stream::{skip_permission_denied, DirectoryStream};
use crate::{DirectoryOptions, Errc, Error, ErrorCode, FileType};

/// Iterates over the entries of a single directory, skipping `.` and `..`.
///
/// The order of the entries is whatever order the OS returns them in.
#[derive(Debug, Clone, Default)]
pub struct DirectoryIterator {
    stream: Option<Rc<RefCell<DirectoryStream>>>,
    /// The entry currently pointed at was returned by [`Iterator::next`], so the next call
    /// has to increment first.
    pending_increment: bool,
}

impl DirectoryIterator {
    pub fn new(path: &Path) -> Result<Self, Error> {
        Self::with_options(path, DirectoryOptions::empty())
    }

    pub fn new_ec(path: &Path, ec: &mut ErrorCode) -> Self {
        Self::with_options_ec(path, DirectoryOptions::empty(), ec)
    }

    pub fn with_options(path: &Path, options: DirectoryOptions) -> Result<Self, Error> {
        Self::open(path, options)
            .map_err(|code| Error::new("directory_iterator::new", code).with_path(path))
    }

    pub fn with_options_ec(path: &Path, options: DirectoryOptions, ec: &mut ErrorCode) -> Self {
        ec.capture(Self::open(path, options), DirectoryIterator::default())
    }

    pub(crate) fn open(path: &Path, options: DirectoryOptions) -> Result<Self, ErrorCode> {
        let stream = DirectoryStream::open(path, options)?;
        let stream = stream.good().then(|| Rc::new(RefCell::new(stream)));
        Ok(DirectoryIterator {
            stream,
            pending_increment: false,
        })
    }

    /// The end iterator.
    pub fn end() -> Self {
        DirectoryIterator::default()
    }

    pub fn is_end(&self) -> bool {
        match &self.stream {
            None => true,
            Some(stream) => !stream.borrow().good(),
        }
    }

    /// The current entry, `None` for the end iterator.
    pub fn entry(&self) -> Option<Ref<'_, DirectoryEntry>> {
        let stream = self.stream.as_ref()?;
        Ref::filter_map(stream.borrow(), |stream| {
            stream.good().then(|| stream.entry())
        })
        .ok()
    }

    /// Move to the next entry, becoming the end iterator once the directory is exhausted.
    pub fn increment(&mut self) -> Result<(), Error> {
        self.increment_result().map_err(|(code, root)| {
            let err = Error::new("directory_iterator::increment", code);
            match root {
                Some(root) => err.with_path(&root),
                None => err,
            }
        })
    }

    pub fn increment_ec(&mut self, ec: &mut ErrorCode) {
        let result = self.increment_result().map_err(|(code, _root)| code);
        ec.capture(result, ());
    }

    fn increment_result(&mut self) -> Result<(), (ErrorCode, Option<Path>)> {
        self.pending_increment = false;
        // A clone may have run the shared stream to its end.
        if self.is_end() {
            self.stream = None;
            return Err((Errc::InvalidArgument.into(), None));
        }
        let Some(stream) = self.stream.clone() else {
            return Err((Errc::InvalidArgument.into(), None));
        };

        let result = stream.borrow_mut().advance();
        match result {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.stream = None;
                Ok(())
            }
            Err(code) => {
                let root = stream.borrow().root().clone();
                self.stream = None;
                Err((code, Some(root)))
            }
        }
    }
}

impl PartialEq for DirectoryIterator {
    fn eq(&self, other: &Self) -> bool {
        match (&self.stream, &other.stream) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => self.is_end() && other.is_end(),
        }
    }
}

impl Eq for DirectoryIterator {}

impl Iterator for DirectoryIterator {
    type Item = Result<DirectoryEntry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending_increment {
            if let Err(err) = self.increment() {
                return Some(Err(err));
            }
        }
        let entry = self.entry()?.clone();
        self.pending_increment = true;
        Some(Ok(entry))
    }
}

#[derive(Debug)]
struct RecursiveState {
    /// One stream per directory level, the root directory at the bottom.
    stack: Vec<DirectoryStream>,
    options: DirectoryOptions,
}

/// Walks a directory tree depth first, yielding each directory before its contents.
///
/// Symlinks to directories are only descended into with
/// [`DirectoryOptions::FOLLOW_DIRECTORY_SYMLINK`]. There is no cycle detection when following
/// symlinks.
#[derive(Debug, Clone, Default)]
pub struct RecursiveDirectoryIterator {
    state: Option<Rc<RefCell<RecursiveState>>>,
    /// Whether the next increment descends into the current entry, not shared between clones.
    recursion_pending: bool,
    pending_increment: bool,
}

/// Why an operation on a [`RecursiveDirectoryIterator`] failed, and the path it failed on.
type Failure = (ErrorCode, Option<Path>);

impl RecursiveDirectoryIterator {
    pub fn new(path: &Path) -> Result<Self, Error> {
        Self::with_options(path, DirectoryOptions::empty())
    }

    pub fn new_ec(path: &Path, ec: &mut ErrorCode) -> Self {
        Self::with_options_ec(path, DirectoryOptions::empty(), ec)
    }

    pub fn with_options(path: &Path, options: DirectoryOptions) -> Result<Self, Error> {
        Self::open(path, options)
            .map_err(|code| Error::new("recursive_directory_iterator::new", code).with_path(path))
    }

    pub fn with_options_ec(path: &Path, options: DirectoryOptions, ec: &mut ErrorCode) -> Self {
        ec.capture(Self::open(path, options), RecursiveDirectoryIterator::default())
    }

    fn open(path: &Path, options: DirectoryOptions) -> Result<Self, ErrorCode> {
        let stream = DirectoryStream::open(path, options)?;
        let state = stream.good().then(|| {
            Rc::new(RefCell::new(RecursiveState {
                stack: vec![stream],
                options,
            }))
        });
        Ok(RecursiveDirectoryIterator {
            state,
            recursion_pending: true,
            pending_increment: false,
        })
    }

    /// The end iterator.
    pub fn end() -> Self {
        RecursiveDirectoryIterator::default()
    }

    pub fn is_end(&self) -> bool {
        match &self.state {
            None => true,
            Some(state) => state.borrow().stack.is_empty(),
        }
    }

    /// The current entry, `None` for the end iterator.
    pub fn entry(&self) -> Option<Ref<'_, DirectoryEntry>> {
        let state = self.state.as_ref()?;
        Ref::filter_map(state.borrow(), |state| {
            state.stack.last().map(DirectoryStream::entry)
        })
        .ok()
    }

    /// How many directories below the root the current entry is, the root's entries are at
    /// depth `0`.
    pub fn depth(&self) -> Result<usize, Error> {
        self.depth_result()
            .map_err(|code| Error::new("recursive_directory_iterator::depth", code))
    }

    pub fn depth_ec(&self, ec: &mut ErrorCode) -> usize {
        ec.capture(self.depth_result(), 0)
    }

    fn depth_result(&self) -> Result<usize, ErrorCode> {
        match &self.state {
            Some(state) if !state.borrow().stack.is_empty() => Ok(state.borrow().stack.len() - 1),
            _ => Err(Errc::InvalidArgument.into()),
        }
    }

    pub fn options(&self) -> Result<DirectoryOptions, Error> {
        self.options_result()
            .map_err(|code| Error::new("recursive_directory_iterator::options", code))
    }

    pub fn options_ec(&self, ec: &mut ErrorCode) -> DirectoryOptions {
        ec.capture(self.options_result(), DirectoryOptions::empty())
    }

    fn options_result(&self) -> Result<DirectoryOptions, ErrorCode> {
        match &self.state {
            Some(state) if !self.is_end() => Ok(state.borrow().options),
            _ => Err(Errc::InvalidArgument.into()),
        }
    }

    /// Returns `true` if the next increment will descend into the current entry, if it's a
    /// directory.
    pub fn recursion_pending(&self) -> bool {
        self.recursion_pending
    }

    /// Skip the contents of the current entry on the next increment.
    pub fn disable_recursion_pending(&mut self) {
        self.recursion_pending = false;
    }

    /// Stop iterating the current directory and continue with the next entry of its parent.
    pub fn pop(&mut self) -> Result<(), Error> {
        self.pop_result()
            .map_err(|failure| into_error("recursive_directory_iterator::pop", failure))
    }

    pub fn pop_ec(&mut self, ec: &mut ErrorCode) {
        let result = self.pop_result().map_err(|(code, _path)| code);
        ec.capture(result, ());
    }

    fn pop_result(&mut self) -> Result<(), Failure> {
        self.pending_increment = false;
        let Some(state) = self.state.as_ref().filter(|_| !self.is_end()) else {
            return Err((Errc::InvalidArgument.into(), None));
        };

        let popped = state.borrow_mut().stack.pop();
        if let Some(popped) = popped {
            tracing::debug!(root = %popped.root(), "popped directory");
        }
        self.recursion_pending = true;
        self.advance()
    }

    /// Move to the next entry, descending into the current one first if recursion is pending.
    pub fn increment(&mut self) -> Result<(), Error> {
        self.increment_result()
            .map_err(|failure| into_error("recursive_directory_iterator::increment", failure))
    }

    pub fn increment_ec(&mut self, ec: &mut ErrorCode) {
        let result = self.increment_result().map_err(|(code, _path)| code);
        ec.capture(result, ());
    }

    fn increment_result(&mut self) -> Result<(), Failure> {
        self.pending_increment = false;
        if self.is_end() {
            return Err((Errc::InvalidArgument.into(), None));
        }

        let recursion_pending = std::mem::replace(&mut self.recursion_pending, true);
        if recursion_pending && self.try_recursion()? {
            return Ok(());
        }
        self.advance()
    }

    /// Advance the deepest stream, popping exhausted levels until one yields an entry.
    fn advance(&mut self) -> Result<(), Failure> {
        let Some(state) = self.state.clone() else {
            return Ok(());
        };
        let mut state = state.borrow_mut();

        while let Some(top) = state.stack.last_mut() {
            match top.advance() {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    if let Some(popped) = state.stack.pop() {
                        tracing::debug!(root = %popped.root(), "finished directory");
                    }
                }
                Err(code) => {
                    let root = top.root().clone();
                    state.stack.clear();
                    drop(state);
                    self.state = None;
                    return Err((code, Some(root)));
                }
            }
        }

        drop(state);
        self.state = None;
        Ok(())
    }

    /// Try to descend into the current entry, returns `true` if a new level was pushed.
    fn try_recursion(&mut self) -> Result<bool, Failure> {
        let Some(state) = self.state.clone() else {
            return Ok(false);
        };
        let mut state = state.borrow_mut();
        let options = state.options;
        let Some(top) = state.stack.last() else {
            return Ok(false);
        };
        let entry = top.entry();

        let follow = options.contains(DirectoryOptions::FOLLOW_DIRECTORY_SYMLINK);
        let file_type = if follow {
            entry.file_type_result()
        } else {
            entry.symlink_file_type_result()
        };

        let result = match file_type {
            Ok(FileType::Directory) => DirectoryStream::open(entry.path(), options).map(Some),
            Ok(_) => Ok(None),
            Err(code) => Err(code),
        };

        match skip_permission_denied(result, options, entry.path()).map(Option::flatten) {
            Ok(Some(stream)) if stream.good() => {
                tracing::debug!(root = %stream.root(), depth = state.stack.len(), "descending");
                state.stack.push(stream);
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(code) => {
                let path = entry.path().clone();
                state.stack.clear();
                drop(state);
                self.state = None;
                Err((code, Some(path)))
            }
        }
    }
}

fn into_error(op: &'static str, (code, path): Failure) -> Error {
    let err = Error::new(op, code);
    match path {
        Some(path) => err.with_path(&path),
        None => err,
    }
}

impl PartialEq for RecursiveDirectoryIterator {
    fn eq(&self, other: &Self) -> bool {
        match (&self.state, &other.state) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => self.is_end() && other.is_end(),
        }
    }
}

impl Eq for RecursiveDirectoryIterator {}

impl Iterator for RecursiveDirectoryIterator {
    type Item = Result<DirectoryEntry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending_increment {
            if let Err(err) = self.increment() {
                return Some(Err(err));
            }
        }
        let entry = self.entry()?.clone();
        self.pending_increment = true;
        Some(Ok(entry))
    }
}
