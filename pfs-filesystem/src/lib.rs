//! Portable filesystem access for `pfs`.
//!
//! * [`DirectoryEntry`] is a path plus a cache of what a single `stat` reports about it.
//! * [`DirectoryIterator`] and [`RecursiveDirectoryIterator`] walk directories.
//! * The free functions ([`status`], [`copy`], [`remove_all`], ...) are the usual set of
//!   filesystem operations.
//!
//! Everything that can fail comes in two forms, `op(..) -> Result<T, Error>` and
//! `op_ec(.., &mut ErrorCode) -> T`, see [`Error`].
//!
//! ```no_run
//! use pfs_filesystem::{DirectoryOptions, RecursiveDirectoryIterator};
//! use pfs_path::Path;
//!
//! let root = Path::new("/var/log");
//! let walk = RecursiveDirectoryIterator::with_options(
//!     &root,
//!     DirectoryOptions::SKIP_PERMISSION_DENIED,
//! )?;
//! for entry in walk {
//!     let entry = entry?;
//!     if entry.is_regular_file()? {
//!         println!("{} {}", entry.path(), entry.file_size()?);
//!     }
//! }
//! # Ok::<_, pfs_filesystem::Error>(())
//! ```

use std::sync::OnceLock;

use pfs_cfg::{Config, ConfigSet};

mod entry;
mod error;
mod iter;
mod ops;
pub mod platform;
mod stream;
mod types;

pub use entry::DirectoryEntry;
pub use error::{Category, Errc, Error, ErrorCode};
pub use iter::{DirectoryIterator, RecursiveDirectoryIterator};
pub use ops::*;
pub use platform::{FileStat, FilesystemPlatform, Platform, RawDirEntry};
pub use types::{
    CopyOptions, DirectoryOptions, FileStatus, FileType, PermOptions, Perms, SpaceInfo,
};

pub static FS_DIRENT_TYPE_HINTS: Config<bool> = Config::new(
    "fs_dirent_type_hints",
    "Trust the file type reported while reading a directory, instead of asking for it again.",
    true,
);

pub static FS_TEMP_DIRECTORY: Config<&'static str> = Config::new(
    "fs_temp_directory",
    "Directory returned by `temp_directory_path`, the environment is consulted when empty.",
    "",
);

/// The [`ConfigSet`] read by this crate, built on first use.
///
/// Environment overrides (`PFS_FS_DIRENT_TYPE_HINTS`, ...) are applied once, when the set is
/// built. Use [`ConfigSet::update`] to change values afterwards.
pub fn configs() -> &'static ConfigSet {
    static CONFIGS: OnceLock<ConfigSet> = OnceLock::new();

    CONFIGS.get_or_init(|| {
        let mut builder = ConfigSet::builder();
        builder
            .register(&FS_DIRENT_TYPE_HINTS)
            .register(&FS_TEMP_DIRECTORY);
        let configs = builder.build();

        if let Err(err) = configs.apply_env_overrides() {
            tracing::warn!(?err, "ignoring invalid filesystem config override");
        }
        configs
    })
}

#[cfg(test)]
mod tests;
