//! [`Platform`] built only on what `std::fs` offers everywhere.
//!
//! Permissions are reduced to the read-only flag, hard link counts are always `1`, and there
//! is no way to tell whether two paths name the same file.

use std::fs;
use std::time::SystemTime;

use pfs_path::Path;

use crate::platform::{FileStat, Platform, RawDirEntry};
use crate::{Errc, ErrorCode, FileType, Perms, SpaceInfo};

pub struct PortablePlatform;

impl Platform for PortablePlatform {
    type DirHandle = fs::ReadDir;

    fn open_directory(path: &Path) -> Result<Self::DirHandle, ErrorCode> {
        Ok(fs::read_dir(path.as_std_path())?)
    }

    fn read_next_entry(handle: &mut Self::DirHandle) -> Result<Option<RawDirEntry>, ErrorCode> {
        for entry in handle.by_ref() {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(path = ?entry.path(), "skipping entry with a non UTF-8 name");
                continue;
            };
            let type_hint = entry
                .file_type()
                .map(file_type)
                .unwrap_or(FileType::None);

            return Ok(Some(RawDirEntry { name, type_hint }));
        }
        Ok(None)
    }

    fn close_directory(handle: Self::DirHandle) {
        drop(handle);
    }

    fn query_stat(path: &Path, follow_symlinks: bool) -> Result<FileStat, ErrorCode> {
        let metadata = if follow_symlinks {
            fs::metadata(path.as_std_path())?
        } else {
            fs::symlink_metadata(path.as_std_path())?
        };

        let perms = if metadata.permissions().readonly() {
            Perms::OWNER_READ | Perms::GROUP_READ | Perms::OTHERS_READ
        } else {
            Perms::ALL
        };
        let mtime = metadata.modified().ok();
        if mtime.is_none() {
            tracing::warn!(%path, "modified time unavailable");
        }

        Ok(FileStat {
            file_type: file_type(metadata.file_type()),
            perms,
            size: metadata.len(),
            nlink: 1,
            mtime,
            identity: None,
        })
    }

    fn classify_os_error(raw: i32) -> Option<Errc> {
        use std::io::ErrorKind;

        let errc = match std::io::Error::from_raw_os_error(raw).kind() {
            ErrorKind::NotFound => Errc::NoSuchFileOrDirectory,
            ErrorKind::PermissionDenied => Errc::PermissionDenied,
            ErrorKind::AlreadyExists => Errc::FileExists,
            ErrorKind::InvalidInput => Errc::InvalidArgument,
            ErrorKind::Unsupported => Errc::NotSupported,
            ErrorKind::Interrupted => Errc::Interrupted,
            _ => return None,
        };
        Some(errc)
    }

    fn create_directory(path: &Path, _perms: Perms) -> Result<(), ErrorCode> {
        Ok(fs::create_dir(path.as_std_path())?)
    }

    fn remove_file(path: &Path) -> Result<(), ErrorCode> {
        Ok(fs::remove_file(path.as_std_path())?)
    }

    fn remove_directory(path: &Path) -> Result<(), ErrorCode> {
        Ok(fs::remove_dir(path.as_std_path())?)
    }

    fn rename(from: &Path, to: &Path) -> Result<(), ErrorCode> {
        Ok(fs::rename(from.as_std_path(), to.as_std_path())?)
    }

    fn create_symlink(target: &Path, link: &Path, is_directory: bool) -> Result<(), ErrorCode> {
        cfg_if::cfg_if! {
            if #[cfg(windows)] {
                let result = if is_directory {
                    std::os::windows::fs::symlink_dir(target.as_std_path(), link.as_std_path())
                } else {
                    std::os::windows::fs::symlink_file(target.as_std_path(), link.as_std_path())
                };
                Ok(result?)
            } else {
                let _ = (target, link, is_directory);
                Err(Errc::NotSupported.into())
            }
        }
    }

    fn create_hard_link(target: &Path, link: &Path) -> Result<(), ErrorCode> {
        Ok(fs::hard_link(target.as_std_path(), link.as_std_path())?)
    }

    fn read_symlink(path: &Path) -> Result<Path, ErrorCode> {
        let target = fs::read_link(path.as_std_path())?;
        Ok(Path::try_from(target)?)
    }

    fn set_permissions(path: &Path, perms: Perms) -> Result<(), ErrorCode> {
        let mut permissions = fs::metadata(path.as_std_path())?.permissions();
        permissions.set_readonly(!perms.intersects(Perms::OWNER_WRITE));
        Ok(fs::set_permissions(path.as_std_path(), permissions)?)
    }

    fn set_last_write_time(path: &Path, time: SystemTime) -> Result<(), ErrorCode> {
        let file = fs::OpenOptions::new().write(true).open(path.as_std_path())?;
        file.set_modified(time)?;
        Ok(())
    }

    fn resize_file(path: &Path, size: u64) -> Result<(), ErrorCode> {
        let file = fs::OpenOptions::new().write(true).open(path.as_std_path())?;
        file.set_len(size)?;
        Ok(())
    }

    fn copy_file_contents(from: &Path, to: &Path) -> Result<(), ErrorCode> {
        fs::copy(from.as_std_path(), to.as_std_path())?;
        Ok(())
    }

    fn canonicalize(path: &Path) -> Result<Path, ErrorCode> {
        let canonical = fs::canonicalize(path.as_std_path())?;
        Ok(Path::try_from(canonical)?)
    }

    fn current_directory() -> Result<Path, ErrorCode> {
        Ok(Path::try_from(std::env::current_dir()?)?)
    }

    fn set_current_directory(path: &Path) -> Result<(), ErrorCode> {
        Ok(std::env::set_current_dir(path.as_std_path())?)
    }

    fn space(_path: &Path) -> Result<SpaceInfo, ErrorCode> {
        Err(Errc::NotSupported.into())
    }

    fn temp_directory() -> Result<Path, ErrorCode> {
        Ok(Path::try_from(std::env::temp_dir())?)
    }
}

fn file_type(file_type: fs::FileType) -> FileType {
    if file_type.is_symlink() {
        FileType::Symlink
    } else if file_type.is_dir() {
        FileType::Directory
    } else if file_type.is_file() {
        FileType::Regular
    } else {
        FileType::Unknown
    }
}
