//! A single open directory, read one entry at a time.

use pfs_path::Path;

use crate::entry::DirectoryEntry;
use crate::platform::{FilesystemPlatform, Platform};
use crate::{DirectoryOptions, Errc, ErrorCode, FileType};

/// Wraps one OS directory handle and the entry most recently read from it.
///
/// The stream is _good_ while the handle is open. It closes the handle as soon as the
/// directory is exhausted or reading fails, and on drop.
#[derive(Debug)]
pub(crate) struct DirectoryStream {
    handle: Option<<FilesystemPlatform as Platform>::DirHandle>,
    root: Path,
    entry: DirectoryEntry,
}

impl DirectoryStream {
    /// Open `root` and read its first entry.
    ///
    /// If `root` can't be opened because of its permissions and `options` contains
    /// [`DirectoryOptions::SKIP_PERMISSION_DENIED`] this succeeds with a stream that is
    /// already exhausted.
    pub(crate) fn open(root: &Path, options: DirectoryOptions) -> Result<Self, ErrorCode> {
        Self::from_handle(root, FilesystemPlatform::open_directory(root), options)
    }

    /// Finish opening `root` given the result of asking the platform for its handle.
    fn from_handle(
        root: &Path,
        opened: Result<<FilesystemPlatform as Platform>::DirHandle, ErrorCode>,
        options: DirectoryOptions,
    ) -> Result<Self, ErrorCode> {
        let handle = skip_permission_denied(opened, options, root)?;
        if handle.is_some() {
            tracing::debug!(%root, "opened directory");
        }

        let mut stream = DirectoryStream {
            handle,
            root: root.clone(),
            entry: DirectoryEntry::default(),
        };
        stream.advance()?;
        Ok(stream)
    }

    /// Returns `true` while the handle is open, i.e. [`DirectoryStream::entry`] is valid.
    pub(crate) fn good(&self) -> bool {
        self.handle.is_some()
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn entry(&self) -> &DirectoryEntry {
        &self.entry
    }

    /// Read the next entry, skipping `.` and `..`.
    ///
    /// Returns `Ok(false)` once the directory is exhausted. Both that and an error close the
    /// handle.
    pub(crate) fn advance(&mut self) -> Result<bool, ErrorCode> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(false);
        };

        loop {
            match FilesystemPlatform::read_next_entry(handle) {
                Ok(Some(raw)) if raw.name == "." || raw.name == ".." => continue,
                Ok(Some(raw)) => {
                    let type_hint = if crate::FS_DIRENT_TYPE_HINTS.read(crate::configs()) {
                        raw.type_hint
                    } else {
                        FileType::None
                    };
                    let path = self.root.join(&Path::new(raw.name));
                    tracing::trace!(%path, ?type_hint, "directory entry");
                    self.entry.assign_iter_entry(path, type_hint);
                    return Ok(true);
                }
                Ok(None) => {
                    self.close();
                    return Ok(false);
                }
                Err(code) => {
                    tracing::debug!(root = %self.root, %code, "failed to read directory");
                    self.close();
                    return Err(code);
                }
            }
        }
    }

    fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            FilesystemPlatform::close_directory(handle);
            tracing::debug!(root = %self.root, "closed directory");
        }
    }
}

/// Turns a permission error into `Ok(None)` if `options` asks for those to be skipped.
pub(crate) fn skip_permission_denied<T>(
    result: Result<T, ErrorCode>,
    options: DirectoryOptions,
    path: &Path,
) -> Result<Option<T>, ErrorCode> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(code)
            if code == Errc::PermissionDenied
                && options.contains(DirectoryOptions::SKIP_PERMISSION_DENIED) =>
        {
            tracing::debug!(%path, "skipping directory, permission denied");
            Ok(None)
        }
        Err(code) => Err(code),
    }
}

impl Drop for DirectoryStream {
    fn drop(&mut self) {
        self.close();
    }
}
