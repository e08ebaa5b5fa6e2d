//! [`Platform`] for unix-like systems, built on `std::os::unix` plus `libc` for the few calls
//! std doesn't expose.

use std::ffi::CString;
use std::fs;
use std::mem::MaybeUninit;
use std::os::unix::fs::{DirBuilderExt, FileTypeExt, MetadataExt, PermissionsExt};
use std::time::{Duration, SystemTime};

use pfs_ore::cast::CastFrom;
use pfs_path::Path;

use crate::platform::{FileStat, Platform, RawDirEntry};
use crate::{Errc, ErrorCode, FileType, Perms, SpaceInfo};

pub struct UnixPlatform;

impl Platform for UnixPlatform {
    type DirHandle = fs::ReadDir;

    fn open_directory(path: &Path) -> Result<Self::DirHandle, ErrorCode> {
        Ok(fs::read_dir(path.as_std_path())?)
    }

    fn read_next_entry(handle: &mut Self::DirHandle) -> Result<Option<RawDirEntry>, ErrorCode> {
        for entry in handle.by_ref() {
            let entry = entry?;
            // Paths are UTF-8, an entry we can't name is skipped rather than ending the read.
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(path = ?entry.path(), "skipping entry with a non UTF-8 name");
                continue;
            };
            // Only costs an `lstat` when the directory didn't report a type.
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

        let mtime = u32::try_from(metadata.mtime_nsec())
            .ok()
            .and_then(|nanos| time_from_parts(metadata.mtime(), nanos));
        if mtime.is_none() {
            tracing::warn!(%path, secs = metadata.mtime(), "modified time out of range");
        }

        Ok(FileStat {
            file_type: file_type(metadata.file_type()),
            perms: Perms::from_bits_truncate(metadata.mode() & Perms::MASK.bits()),
            size: metadata.size(),
            nlink: metadata.nlink(),
            mtime,
            identity: Some((metadata.dev(), metadata.ino())),
        })
    }

    fn classify_os_error(raw: i32) -> Option<Errc> {
        let errc = match raw {
            libc::ENOENT => Errc::NoSuchFileOrDirectory,
            libc::ENOTDIR => Errc::NotADirectory,
            libc::EISDIR => Errc::IsADirectory,
            libc::EACCES | libc::EPERM => Errc::PermissionDenied,
            libc::EEXIST => Errc::FileExists,
            libc::EINVAL => Errc::InvalidArgument,
            libc::EOVERFLOW => Errc::ValueTooLarge,
            libc::ENOTSUP => Errc::NotSupported,
            libc::ENOTEMPTY => Errc::DirectoryNotEmpty,
            libc::EILSEQ => Errc::IllegalByteSequence,
            libc::EXDEV => Errc::CrossDeviceLink,
            libc::ELOOP => Errc::TooManySymbolicLinkLevels,
            libc::ENAMETOOLONG => Errc::FilenameTooLong,
            libc::EROFS => Errc::ReadOnlyFileSystem,
            libc::ENOSPC => Errc::NoSpaceOnDevice,
            libc::EBUSY => Errc::DeviceOrResourceBusy,
            libc::EINTR => Errc::Interrupted,
            libc::EIO => Errc::IoError,
            _ => return None,
        };
        Some(errc)
    }

    fn create_directory(path: &Path, perms: Perms) -> Result<(), ErrorCode> {
        fs::DirBuilder::new()
            .mode(perms.bits() & Perms::MASK.bits())
            .create(path.as_std_path())?;
        Ok(())
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

    fn create_symlink(target: &Path, link: &Path, _is_directory: bool) -> Result<(), ErrorCode> {
        Ok(std::os::unix::fs::symlink(
            target.as_std_path(),
            link.as_std_path(),
        )?)
    }

    fn create_hard_link(target: &Path, link: &Path) -> Result<(), ErrorCode> {
        Ok(fs::hard_link(target.as_std_path(), link.as_std_path())?)
    }

    fn read_symlink(path: &Path) -> Result<Path, ErrorCode> {
        let target = fs::read_link(path.as_std_path())?;
        Ok(Path::try_from(target)?)
    }

    fn set_permissions(path: &Path, perms: Perms) -> Result<(), ErrorCode> {
        let perms = fs::Permissions::from_mode(perms.bits() & Perms::MASK.bits());
        Ok(fs::set_permissions(path.as_std_path(), perms)?)
    }

    fn set_last_write_time(path: &Path, time: SystemTime) -> Result<(), ErrorCode> {
        // A read-only handle is enough for `futimens`, and works for directories too.
        let file = fs::File::open(path.as_std_path())?;
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

    fn space(path: &Path) -> Result<SpaceInfo, ErrorCode> {
        let c_path =
            CString::new(path.as_str()).map_err(|_| ErrorCode::from(Errc::InvalidArgument))?;
        let mut raw = MaybeUninit::<libc::statvfs>::uninit();

        // SAFETY: `c_path` is a valid NUL terminated string and `raw` has room for one
        // `statvfs`, both outlive the call.
        let result = unsafe { libc::statvfs(c_path.as_ptr(), raw.as_mut_ptr()) };
        if result != 0 {
            return Err(ErrorCode::last_os_error());
        }
        // SAFETY: `statvfs` succeeded, so it filled in the struct.
        let raw = unsafe { raw.assume_init() };

        let fragment = u64::cast_from(raw.f_frsize);
        Ok(SpaceInfo {
            capacity: u64::cast_from(raw.f_blocks).saturating_mul(fragment),
            free: u64::cast_from(raw.f_bfree).saturating_mul(fragment),
            available: u64::cast_from(raw.f_bavail).saturating_mul(fragment),
        })
    }

    fn temp_directory() -> Result<Path, ErrorCode> {
        for var in ["TMPDIR", "TMP", "TEMP", "TEMPDIR"] {
            if let Some(value) = std::env::var_os(var) {
                let value = value
                    .into_string()
                    .map_err(|_| ErrorCode::from(Errc::IllegalByteSequence))?;
                return Ok(Path::new(value));
            }
        }
        Ok(Path::new("/tmp"))
    }
}

fn file_type(file_type: fs::FileType) -> FileType {
    if file_type.is_symlink() {
        FileType::Symlink
    } else if file_type.is_dir() {
        FileType::Directory
    } else if file_type.is_file() {
        FileType::Regular
    } else if file_type.is_block_device() {
        FileType::Block
    } else if file_type.is_char_device() {
        FileType::Character
    } else if file_type.is_fifo() {
        FileType::Fifo
    } else if file_type.is_socket() {
        FileType::Socket
    } else {
        tracing::warn!(?file_type, "unrecognized file type");
        FileType::Unknown
    }
}

/// Time from seconds and nanoseconds relative to the unix epoch.
fn time_from_parts(secs: i64, nanos: u32) -> Option<SystemTime> {
    let since_epoch = Duration::from_secs(secs.unsigned_abs());
    let time = if secs >= 0 {
        SystemTime::UNIX_EPOCH.checked_add(since_epoch)?
    } else {
        SystemTime::UNIX_EPOCH.checked_sub(since_epoch)?
    };
    time.checked_add(Duration::from_nanos(u64::from(nanos)))
}
