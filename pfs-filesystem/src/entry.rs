//! [`DirectoryEntry`], a path plus whatever we already know about the file it names.

use std::cmp::Ordering;
use std::time::SystemTime;

use pfs_path::Path;

use crate::ops;
use crate::platform::{FileStat, FilesystemPlatform, Platform};
use crate::{Errc, Error, ErrorCode, FileStatus, FileType, Perms};

/// How much of [`CachedData`] can be trusted.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
enum CacheType {
    /// Nothing is cached, every accessor asks the OS.
    #[default]
    Empty,
    /// Produced by directory iteration, the entry is a symlink and nothing else is known.
    IterSymlink,
    /// Produced by directory iteration, only `file_type` is known.
    IterNonSymlink,
    /// Refreshed, the entry is a symlink and the data describes its resolved target.
    RefreshSymlink,
    /// Refreshed, the entry is a symlink that we failed to resolve.
    RefreshSymlinkUnresolved,
    /// Refreshed, the entry is not a symlink (or doesn't exist).
    RefreshNonSymlink,
}

#[derive(Debug, Clone, Copy)]
struct CachedData {
    size: u64,
    nlink: u64,
    write_time: Option<SystemTime>,
    sym_perms: Perms,
    non_sym_perms: Perms,
    file_type: FileType,
    cache_type: CacheType,
}

impl Default for CachedData {
    fn default() -> Self {
        CachedData {
            size: u64::MAX,
            nlink: u64::MAX,
            write_time: None,
            sym_perms: Perms::UNKNOWN,
            non_sym_perms: Perms::UNKNOWN,
            file_type: FileType::None,
            cache_type: CacheType::Empty,
        }
    }
}

impl CachedData {
    /// What directory iteration tells us, the type of the entry and nothing more.
    fn from_type_hint(file_type: FileType) -> Self {
        let cache_type = match file_type {
            FileType::None => CacheType::Empty,
            FileType::Symlink => CacheType::IterSymlink,
            _ => CacheType::IterNonSymlink,
        };
        CachedData {
            file_type,
            cache_type,
            ..CachedData::default()
        }
    }

    /// Fill in size, link count and modified time from a stat of the file.
    fn fill_from(&mut self, stat: &FileStat) {
        if stat.file_type == FileType::Regular {
            self.size = stat.size;
        }
        if FileStatus::from(stat.file_type).exists() {
            self.nlink = stat.nlink;
            // An unrepresentable time is reported when it's asked for.
            self.write_time = stat.mtime;
        }
    }
}

/// A path within a directory, plus a cache of the attributes of the file at that path.
///
/// Entries produced by the directory iterators only know the type of the file, if the OS
/// reported one. Entries created with [`DirectoryEntry::new`] or refreshed with
/// [`DirectoryEntry::refresh`] cache everything a single `stat` returns. Accessors only trust
/// the cache as far as it goes and ask the OS for anything else.
#[derive(Debug, Clone, Default)]
pub struct DirectoryEntry {
    path: Path,
    data: CachedData,
}

macro_rules! entry_accessors {
    ($(
        $(#[$meta:meta])*
        fn $name:ident() -> $ret:ty, on_error = $failed:expr;
    )*) => {
        paste::paste! {
            $(
                $(#[$meta])*
                pub fn $name(&self) -> Result<$ret, Error> {
                    self.[<$name _result>]().map_err(|code| {
                        Error::new(concat!("directory_entry::", stringify!($name)), code)
                            .with_path(&self.path)
                    })
                }

                #[doc = "Like [`DirectoryEntry::" $name "`], reporting failure through `ec`."]
                pub fn [<$name _ec>](&self, ec: &mut ErrorCode) -> $ret {
                    ec.capture(self.[<$name _result>](), $failed)
                }
            )*
        }
    };
}

impl DirectoryEntry {
    /// Create an entry for `path`, caching the attributes of the file.
    pub fn new(path: Path) -> Result<Self, Error> {
        let mut entry = DirectoryEntry {
            path,
            data: CachedData::default(),
        };
        entry.refresh()?;
        Ok(entry)
    }

    /// Like [`DirectoryEntry::new`], reporting failure through `ec`.
    pub fn new_ec(path: Path, ec: &mut ErrorCode) -> Self {
        let mut entry = DirectoryEntry {
            path,
            data: CachedData::default(),
        };
        entry.refresh_ec(ec);
        entry
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> Path {
        self.path
    }

    /// Point this entry at `path` and refresh it.
    pub fn assign(&mut self, path: Path) -> Result<(), Error> {
        self.path = path;
        self.refresh()
    }

    pub fn assign_ec(&mut self, path: Path, ec: &mut ErrorCode) {
        self.path = path;
        self.refresh_ec(ec);
    }

    /// Replace the filename of this entry's path and refresh it.
    pub fn replace_filename(&mut self, filename: &Path) -> Result<(), Error> {
        self.path.replace_filename(filename);
        self.refresh()
    }

    pub fn replace_filename_ec(&mut self, filename: &Path, ec: &mut ErrorCode) {
        self.path.replace_filename(filename);
        self.refresh_ec(ec);
    }

    /// Re-read the attributes of the file.
    ///
    /// A path that doesn't exist is not an error, the entry then caches
    /// [`FileType::NotFound`]. For a symlink the attributes of its target are cached, failing
    /// to resolve the target is not an error either.
    pub fn refresh(&mut self) -> Result<(), Error> {
        self.refresh_result().map_err(|code| {
            Error::new("directory_entry::refresh", code).with_path(&self.path)
        })
    }

    pub fn refresh_ec(&mut self, ec: &mut ErrorCode) {
        let result = self.refresh_result();
        ec.capture(result, ());
    }

    /// Reset this entry to what iterating its directory produced.
    pub(crate) fn assign_iter_entry(&mut self, path: Path, type_hint: FileType) {
        self.path = path;
        self.data = CachedData::from_type_hint(type_hint);
    }

    fn refresh_result(&mut self) -> Result<(), ErrorCode> {
        self.data = CachedData::default();

        let stat = match FilesystemPlatform::query_stat(&self.path, false) {
            Ok(stat) => stat,
            Err(code) if code.is_not_found() => {
                self.data.cache_type = CacheType::RefreshNonSymlink;
                self.data.file_type = FileType::NotFound;
                return Ok(());
            }
            Err(code) => return Err(code),
        };

        if stat.file_type != FileType::Symlink {
            self.data.cache_type = CacheType::RefreshNonSymlink;
            self.data.file_type = stat.file_type;
            self.data.non_sym_perms = stat.perms;
            self.data.fill_from(&stat);
            return Ok(());
        }

        self.data.sym_perms = stat.perms;
        // Failing to resolve the link is not reported, only remembered.
        match FilesystemPlatform::query_stat(&self.path, true) {
            Ok(target) => {
                self.data.cache_type = CacheType::RefreshSymlink;
                self.data.file_type = target.file_type;
                self.data.non_sym_perms = target.perms;
                self.data.fill_from(&target);
            }
            Err(code) if code.is_not_found() => {
                self.data.cache_type = CacheType::RefreshSymlink;
                self.data.file_type = FileType::NotFound;
            }
            Err(code) => {
                tracing::debug!(path = %self.path, %code, "failed to resolve symlink");
                self.data.cache_type = CacheType::RefreshSymlinkUnresolved;
            }
        }
        Ok(())
    }

    /// Type of the file, following symlinks.
    pub(crate) fn file_type_result(&self) -> Result<FileType, ErrorCode> {
        match self.data.cache_type {
            CacheType::Empty | CacheType::IterSymlink | CacheType::RefreshSymlinkUnresolved => {
                ops::status_impl(&self.path).map(|status| status.file_type())
            }
            CacheType::IterNonSymlink | CacheType::RefreshNonSymlink | CacheType::RefreshSymlink => {
                Ok(self.data.file_type)
            }
        }
    }

    /// Type of the file, not following symlinks.
    pub(crate) fn symlink_file_type_result(&self) -> Result<FileType, ErrorCode> {
        match self.data.cache_type {
            CacheType::Empty => ops::symlink_status_impl(&self.path).map(|status| status.file_type()),
            CacheType::IterSymlink
            | CacheType::RefreshSymlink
            | CacheType::RefreshSymlinkUnresolved => Ok(FileType::Symlink),
            CacheType::IterNonSymlink | CacheType::RefreshNonSymlink => Ok(self.data.file_type),
        }
    }

    /// The cached, followed, type of a refreshed entry, which has to exist.
    fn existing_file_type(&self) -> Result<FileType, ErrorCode> {
        let file_type = self.file_type_result()?;
        if FileStatus::from(file_type).exists() {
            Ok(file_type)
        } else {
            Err(Errc::NoSuchFileOrDirectory.into())
        }
    }

    fn exists_result(&self) -> Result<bool, ErrorCode> {
        self.file_type_result()
            .map(|file_type| FileStatus::from(file_type).exists())
    }

    fn is_directory_result(&self) -> Result<bool, ErrorCode> {
        self.file_type_result().map(|t| t == FileType::Directory)
    }

    fn is_regular_file_result(&self) -> Result<bool, ErrorCode> {
        self.file_type_result().map(|t| t == FileType::Regular)
    }

    fn is_symlink_result(&self) -> Result<bool, ErrorCode> {
        self.symlink_file_type_result().map(|t| t == FileType::Symlink)
    }

    fn is_block_file_result(&self) -> Result<bool, ErrorCode> {
        self.file_type_result().map(|t| t == FileType::Block)
    }

    fn is_character_file_result(&self) -> Result<bool, ErrorCode> {
        self.file_type_result().map(|t| t == FileType::Character)
    }

    fn is_fifo_result(&self) -> Result<bool, ErrorCode> {
        self.file_type_result().map(|t| t == FileType::Fifo)
    }

    fn is_socket_result(&self) -> Result<bool, ErrorCode> {
        self.file_type_result().map(|t| t == FileType::Socket)
    }

    fn is_other_result(&self) -> Result<bool, ErrorCode> {
        self.file_type_result()
            .map(|file_type| FileStatus::from(file_type).is_other())
    }

    fn file_size_result(&self) -> Result<u64, ErrorCode> {
        match self.data.cache_type {
            CacheType::Empty
            | CacheType::IterSymlink
            | CacheType::IterNonSymlink
            | CacheType::RefreshSymlinkUnresolved => ops::file_size_impl(&self.path),
            CacheType::RefreshSymlink | CacheType::RefreshNonSymlink => {
                match self.existing_file_type()? {
                    FileType::Regular => Ok(self.data.size),
                    FileType::Directory => Err(Errc::IsADirectory.into()),
                    _ => Err(Errc::NotSupported.into()),
                }
            }
        }
    }

    fn hard_link_count_result(&self) -> Result<u64, ErrorCode> {
        match self.data.cache_type {
            CacheType::Empty
            | CacheType::IterSymlink
            | CacheType::IterNonSymlink
            | CacheType::RefreshSymlinkUnresolved => ops::hard_link_count_impl(&self.path),
            CacheType::RefreshSymlink | CacheType::RefreshNonSymlink => {
                self.existing_file_type()?;
                Ok(self.data.nlink)
            }
        }
    }

    fn last_write_time_result(&self) -> Result<SystemTime, ErrorCode> {
        match self.data.cache_type {
            CacheType::Empty
            | CacheType::IterSymlink
            | CacheType::IterNonSymlink
            | CacheType::RefreshSymlinkUnresolved => ops::last_write_time_impl(&self.path),
            CacheType::RefreshSymlink | CacheType::RefreshNonSymlink => {
                self.existing_file_type()?;
                self.data
                    .write_time
                    .ok_or_else(|| Errc::ValueTooLarge.into())
            }
        }
    }

    fn status_result(&self) -> Result<FileStatus, ErrorCode> {
        match self.data.cache_type {
            CacheType::Empty
            | CacheType::IterSymlink
            | CacheType::IterNonSymlink
            | CacheType::RefreshSymlinkUnresolved => ops::status_impl(&self.path),
            CacheType::RefreshSymlink | CacheType::RefreshNonSymlink => Ok(FileStatus::new(
                self.data.file_type,
                self.data.non_sym_perms,
            )),
        }
    }

    fn symlink_status_result(&self) -> Result<FileStatus, ErrorCode> {
        match self.data.cache_type {
            CacheType::Empty | CacheType::IterSymlink | CacheType::IterNonSymlink => {
                ops::symlink_status_impl(&self.path)
            }
            CacheType::RefreshNonSymlink => Ok(FileStatus::new(
                self.data.file_type,
                self.data.non_sym_perms,
            )),
            CacheType::RefreshSymlink | CacheType::RefreshSymlinkUnresolved => {
                Ok(FileStatus::new(FileType::Symlink, self.data.sym_perms))
            }
        }
    }

    entry_accessors! {
        /// Returns `true` if the file, or the target of the symlink, exists.
        fn exists() -> bool, on_error = false;
        fn is_directory() -> bool, on_error = false;
        fn is_regular_file() -> bool, on_error = false;
        /// Returns `true` if the entry itself is a symlink.
        fn is_symlink() -> bool, on_error = false;
        fn is_block_file() -> bool, on_error = false;
        fn is_character_file() -> bool, on_error = false;
        fn is_fifo() -> bool, on_error = false;
        fn is_socket() -> bool, on_error = false;
        fn is_other() -> bool, on_error = false;
        /// Size of the regular file, in bytes.
        fn file_size() -> u64, on_error = u64::MAX;
        fn hard_link_count() -> u64, on_error = u64::MAX;
        fn last_write_time() -> SystemTime, on_error = SystemTime::UNIX_EPOCH;
        /// Status of the file, following symlinks.
        fn status() -> FileStatus, on_error = FileStatus::default();
        /// Status of the entry itself.
        fn symlink_status() -> FileStatus, on_error = FileStatus::default();
    }
}

impl PartialEq for DirectoryEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for DirectoryEntry {}

impl PartialOrd for DirectoryEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DirectoryEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl AsRef<Path> for DirectoryEntry {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}
