//! Abstract interface for a specific platform, e.g. `unix`, `windows`, etc.
//!
//! Everything above this module, the entry cache, the iterators and the operations, only ever
//! talks to the OS through [`Platform`].

use std::fmt::Debug;
use std::time::SystemTime;

use pfs_path::Path;

use crate::{Errc, ErrorCode, FileType, Perms, SpaceInfo};

/// Raw data for a single entry produced while reading a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDirEntry {
    /// Name of the entry within its directory.
    pub name: String,
    /// Type reported by the directory itself, [`FileType::None`] if the OS didn't say.
    pub type_hint: FileType,
}

/// Metadata returned by the `stat` family of functions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub file_type: FileType,
    pub perms: Perms,
    /// Size of a file in bytes.
    pub size: u64,
    pub nlink: u64,
    /// Modified time, `None` if the OS reported a time [`SystemTime`] can't represent.
    pub mtime: Option<SystemTime>,
    /// `(device, inode)` pair that uniquely identifies the file, if the platform has one.
    pub identity: Option<(u64, u64)>,
}

/// Platform specific filesystem operations.
pub trait Platform {
    /// An open directory being read.
    type DirHandle: Debug;

    fn open_directory(path: &Path) -> Result<Self::DirHandle, ErrorCode>;
    /// Returns the next entry of the directory, `None` once it's exhausted. Entries whose name
    /// isn't valid UTF-8 are skipped.
    fn read_next_entry(handle: &mut Self::DirHandle) -> Result<Option<RawDirEntry>, ErrorCode>;
    fn close_directory(handle: Self::DirHandle);

    /// `stat` or, if `follow_symlinks` is false, `lstat`.
    fn query_stat(path: &Path, follow_symlinks: bool) -> Result<FileStat, ErrorCode>;

    fn query_size(path: &Path) -> Result<u64, ErrorCode> {
        Self::query_stat(path, true).map(|stat| stat.size)
    }

    fn query_hard_link_count(path: &Path) -> Result<u64, ErrorCode> {
        Self::query_stat(path, true).map(|stat| stat.nlink)
    }

    fn query_last_write_time(path: &Path) -> Result<SystemTime, ErrorCode> {
        Self::query_stat(path, true)?
            .mtime
            .ok_or_else(|| Errc::ValueTooLarge.into())
    }

    /// Map a raw OS error number to its portable name.
    fn classify_os_error(raw: i32) -> Option<Errc>;

    fn create_directory(path: &Path, perms: Perms) -> Result<(), ErrorCode>;
    fn remove_file(path: &Path) -> Result<(), ErrorCode>;
    fn remove_directory(path: &Path) -> Result<(), ErrorCode>;
    fn rename(from: &Path, to: &Path) -> Result<(), ErrorCode>;

    fn create_symlink(target: &Path, link: &Path, is_directory: bool) -> Result<(), ErrorCode>;
    fn create_hard_link(target: &Path, link: &Path) -> Result<(), ErrorCode>;
    fn read_symlink(path: &Path) -> Result<Path, ErrorCode>;

    /// Set the permission bits of `path`, following symlinks.
    fn set_permissions(path: &Path, perms: Perms) -> Result<(), ErrorCode>;
    fn set_last_write_time(path: &Path, time: SystemTime) -> Result<(), ErrorCode>;
    fn resize_file(path: &Path, size: u64) -> Result<(), ErrorCode>;
    /// Copy the contents and permissions of the regular file `from` to `to`.
    fn copy_file_contents(from: &Path, to: &Path) -> Result<(), ErrorCode>;

    fn canonicalize(path: &Path) -> Result<Path, ErrorCode>;
    fn current_directory() -> Result<Path, ErrorCode>;
    fn set_current_directory(path: &Path) -> Result<(), ErrorCode>;
    fn space(path: &Path) -> Result<SpaceInfo, ErrorCode>;
    /// Temporary directory suggested by the environment, not checked for existence.
    fn temp_directory() -> Result<Path, ErrorCode>;
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        pub use unix::UnixPlatform as FilesystemPlatform;
    } else {
        mod portable;
        pub use portable::PortablePlatform as FilesystemPlatform;
    }
}
