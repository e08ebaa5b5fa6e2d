//! Filesystem operations.
//!
//! Every operation is implemented once as `<name>_impl`, returning `Result<T, ErrorCode>`, and
//! exposed in both calling forms by `dual_form!`.

use std::time::SystemTime;

use pfs_path::Path;

use crate::iter::DirectoryIterator;
use crate::platform::{FilesystemPlatform, Platform};
use crate::{
    CopyOptions, DirectoryOptions, Errc, Error, ErrorCode, FileStatus, FileType, PermOptions,
    Perms, SpaceInfo,
};

/// Generates `name(..) -> Result<T, Error>` and `name_ec(.., &mut ErrorCode) -> T` from
/// `name_impl(..) -> Result<T, ErrorCode>`.
///
/// The arguments listed in `paths` are attached to the [`Error`], the `_ec` form returns
/// `on_error` when the operation fails.
macro_rules! dual_form {
    ($(
        $(#[$meta:meta])*
        pub fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty,
            on_error = $failed:expr, paths = [$($path:ident),*];
    )*) => {
        paste::paste! {
            $(
                $(#[$meta])*
                pub fn $name($($arg: $ty),*) -> Result<$ret, Error> {
                    [<$name _impl>]($($arg),*).map_err(|code| {
                        let err = Error::new(stringify!($name), code);
                        $( let err = err.with_path($path); )*
                        err
                    })
                }

                #[doc = "Like [`" $name "`], reporting failure through `ec`."]
                pub fn [<$name _ec>]($($arg: $ty,)* ec: &mut ErrorCode) -> $ret {
                    ec.capture([<$name _impl>]($($arg),*), $failed)
                }
            )*
        }
    };
}

dual_form! {
    /// `path` made absolute against the current directory, without touching the filesystem
    /// otherwise.
    pub fn absolute(path: &Path) -> Path, on_error = Path::default(), paths = [path];

    /// Absolute `path` with every symlink, `.` and `..` resolved. `path` has to exist.
    pub fn canonical(path: &Path) -> Path, on_error = Path::default(), paths = [path];

    /// Like [`canonical`] for the longest prefix of `path` that exists, the rest is appended
    /// and normalized lexically.
    pub fn weakly_canonical(path: &Path) -> Path, on_error = Path::default(), paths = [path];

    /// `path` relative to `base`, after making both weakly canonical. Empty if there is no
    /// such relative path.
    pub fn relative(path: &Path, base: &Path) -> Path,
        on_error = Path::default(), paths = [path, base];

    /// Like [`relative`] but returns the weakly canonical `path` instead of an empty one.
    pub fn proximate(path: &Path, base: &Path) -> Path,
        on_error = Path::default(), paths = [path, base];

    /// Copy files, directories and symlinks from `from` to `to`.
    ///
    /// Without any [`CopyOptions`] a directory is copied along with the files directly inside
    /// it, [`CopyOptions::RECURSIVE`] copies everything below it.
    pub fn copy(from: &Path, to: &Path, options: CopyOptions) -> (),
        on_error = (), paths = [from, to];

    /// Copy the regular file `from` to `to`, returns `false` if an existing `to` was left
    /// alone.
    pub fn copy_file(from: &Path, to: &Path, options: CopyOptions) -> bool,
        on_error = false, paths = [from, to];

    /// Create a symlink at `to` with the same target as the symlink `from`.
    pub fn copy_symlink(from: &Path, to: &Path) -> (), on_error = (), paths = [from, to];

    /// Create the directory `path`, returns `false` if it already existed.
    pub fn create_directory(path: &Path) -> bool, on_error = false, paths = [path];

    /// Create the directory `path` with the permissions of the directory `attributes`.
    pub fn create_directory_with_attributes(path: &Path, attributes: &Path) -> bool,
        on_error = false, paths = [path, attributes];

    /// Create `path` and any of its missing parents, returns `false` if nothing was created.
    pub fn create_directories(path: &Path) -> bool, on_error = false, paths = [path];

    pub fn create_symlink(target: &Path, link: &Path) -> (),
        on_error = (), paths = [target, link];

    /// Like [`create_symlink`], for platforms that distinguish links to directories.
    pub fn create_directory_symlink(target: &Path, link: &Path) -> (),
        on_error = (), paths = [target, link];

    pub fn create_hard_link(target: &Path, link: &Path) -> (),
        on_error = (), paths = [target, link];

    pub fn current_path() -> Path, on_error = Path::default(), paths = [];

    pub fn set_current_path(path: &Path) -> (), on_error = (), paths = [path];

    /// Returns `true` if both paths resolve to the same file.
    pub fn equivalent(path1: &Path, path2: &Path) -> bool,
        on_error = false, paths = [path1, path2];

    /// Returns `true` if `path` exists, following symlinks. Not existing is not an error.
    pub fn exists(path: &Path) -> bool, on_error = false, paths = [path];

    /// Size of the regular file `path`, in bytes.
    pub fn file_size(path: &Path) -> u64, on_error = u64::MAX, paths = [path];

    pub fn hard_link_count(path: &Path) -> u64, on_error = u64::MAX, paths = [path];

    /// Returns `true` for a directory without entries or a regular file without contents.
    pub fn is_empty(path: &Path) -> bool, on_error = false, paths = [path];

    pub fn is_directory(path: &Path) -> bool, on_error = false, paths = [path];
    pub fn is_regular_file(path: &Path) -> bool, on_error = false, paths = [path];
    /// Returns `true` if `path` itself is a symlink.
    pub fn is_symlink(path: &Path) -> bool, on_error = false, paths = [path];
    pub fn is_block_file(path: &Path) -> bool, on_error = false, paths = [path];
    pub fn is_character_file(path: &Path) -> bool, on_error = false, paths = [path];
    pub fn is_fifo(path: &Path) -> bool, on_error = false, paths = [path];
    pub fn is_socket(path: &Path) -> bool, on_error = false, paths = [path];
    /// Returns `true` if `path` exists but is not a regular file, directory or symlink.
    pub fn is_other(path: &Path) -> bool, on_error = false, paths = [path];

    pub fn last_write_time(path: &Path) -> SystemTime,
        on_error = SystemTime::UNIX_EPOCH, paths = [path];

    pub fn set_last_write_time(path: &Path, time: SystemTime) -> (),
        on_error = (), paths = [path];

    /// Change the permissions of `path`.
    ///
    /// `options` has to contain exactly one of [`PermOptions::REPLACE`], [`PermOptions::ADD`]
    /// and [`PermOptions::REMOVE`]. Changing the permissions of a symlink itself, with
    /// [`PermOptions::NOFOLLOW`], is not supported.
    pub fn permissions(path: &Path, perms: Perms, options: PermOptions) -> (),
        on_error = (), paths = [path];

    /// Target of the symlink `path`.
    pub fn read_symlink(path: &Path) -> Path, on_error = Path::default(), paths = [path];

    /// Remove the file or empty directory `path`, returns `false` if it didn't exist.
    pub fn remove(path: &Path) -> bool, on_error = false, paths = [path];

    /// Remove `path` and, if it's a directory, everything below it. Symlinks are removed, not
    /// followed. Returns the number of files and directories removed.
    pub fn remove_all(path: &Path) -> u64, on_error = u64::MAX, paths = [path];

    pub fn rename(from: &Path, to: &Path) -> (), on_error = (), paths = [from, to];

    /// Truncate or extend the regular file `path` to `size` bytes.
    pub fn resize_file(path: &Path, size: u64) -> (), on_error = (), paths = [path];

    /// Space on the filesystem containing `path`.
    pub fn space(path: &Path) -> SpaceInfo, on_error = SpaceInfo::UNKNOWN, paths = [path];

    /// Type and permissions of `path`, following symlinks. A missing file has type
    /// [`FileType::NotFound`] and is not an error.
    pub fn status(path: &Path) -> FileStatus, on_error = FileStatus::default(), paths = [path];

    /// Like [`status`] but doesn't follow a symlink at `path`.
    pub fn symlink_status(path: &Path) -> FileStatus,
        on_error = FileStatus::default(), paths = [path];

    /// Directory for temporary files.
    ///
    /// Uses the `fs_temp_directory` config if set, otherwise asks the environment. The result
    /// has to be an existing directory.
    pub fn temp_directory_path() -> Path, on_error = Path::default(), paths = [];
}

fn query_status(path: &Path, follow_symlinks: bool) -> Result<FileStatus, ErrorCode> {
    match FilesystemPlatform::query_stat(path, follow_symlinks) {
        Ok(stat) => Ok(FileStatus::new(stat.file_type, stat.perms)),
        Err(code) if code.is_not_found() => Ok(FileStatus::not_found()),
        Err(code) => Err(code),
    }
}

pub(crate) fn status_impl(path: &Path) -> Result<FileStatus, ErrorCode> {
    query_status(path, true)
}

pub(crate) fn symlink_status_impl(path: &Path) -> Result<FileStatus, ErrorCode> {
    query_status(path, false)
}

/// `(device, inode)` of an existing `path`.
fn identity(path: &Path) -> Result<(u64, u64), ErrorCode> {
    FilesystemPlatform::query_stat(path, true)?
        .identity
        .ok_or_else(|| Errc::NotSupported.into())
}

/// Returns `true` if both existing paths are known to be the same file.
fn same_file(path1: &Path, path2: &Path) -> Result<bool, ErrorCode> {
    let identity1 = FilesystemPlatform::query_stat(path1, true)?.identity;
    let identity2 = FilesystemPlatform::query_stat(path2, true)?.identity;
    Ok(identity1.is_some() && identity1 == identity2)
}

fn absolute_impl(path: &Path) -> Result<Path, ErrorCode> {
    if path.is_absolute() {
        return Ok(path.clone());
    }
    Ok(FilesystemPlatform::current_directory()?.join(path))
}

fn canonical_impl(path: &Path) -> Result<Path, ErrorCode> {
    if path.is_empty() {
        return Err(Errc::NoSuchFileOrDirectory.into());
    }
    FilesystemPlatform::canonicalize(&absolute_impl(path)?)
}

fn weakly_canonical_impl(path: &Path) -> Result<Path, ErrorCode> {
    if path.is_empty() {
        return Ok(Path::default());
    }

    let parts: Vec<Path> = path.iter().collect();
    let mut existing = parts.len();
    let mut result = Path::default();
    while existing > 0 {
        let mut prefix = Path::default();
        for part in &parts[..existing] {
            prefix.push(part);
        }
        if status_impl(&prefix)?.exists() {
            result = canonical_impl(&prefix)?;
            break;
        }
        existing -= 1;
    }

    if existing == parts.len() {
        return Ok(result);
    }
    for part in &parts[existing..] {
        result.push(part);
    }
    Ok(result.lexically_normal())
}

fn relative_impl(path: &Path, base: &Path) -> Result<Path, ErrorCode> {
    let path = weakly_canonical_impl(path)?;
    let base = weakly_canonical_impl(base)?;
    Ok(path.lexically_relative(&base))
}

fn proximate_impl(path: &Path, base: &Path) -> Result<Path, ErrorCode> {
    let path = weakly_canonical_impl(path)?;
    let base = weakly_canonical_impl(base)?;
    Ok(path.lexically_proximate(&base))
}

fn copy_impl(from: &Path, to: &Path, options: CopyOptions) -> Result<(), ErrorCode> {
    tracing::debug!(%from, %to, ?options, "copy");
    copy_inner(from, to, options, true)
}

/// `top_level` is `false` for the entries of a directory being copied, which keeps a copy
/// without options from descending further than one level.
fn copy_inner(
    from: &Path,
    to: &Path,
    options: CopyOptions,
    top_level: bool,
) -> Result<(), ErrorCode> {
    let inspect_links = options.intersects(CopyOptions::CREATE_SYMLINKS | CopyOptions::SKIP_SYMLINKS);
    let from_status = if inspect_links || options.contains(CopyOptions::COPY_SYMLINKS) {
        symlink_status_impl(from)?
    } else {
        status_impl(from)?
    };
    let to_status = if inspect_links {
        symlink_status_impl(to)?
    } else {
        status_impl(to)?
    };

    if !from_status.exists()
        || from_status.is_other()
        || to_status.is_other()
        || (from_status.is_directory() && to_status.is_regular_file())
    {
        return Err(Errc::NotSupported.into());
    }
    if to_status.exists() && same_file(from, to)? {
        return Err(Errc::NotSupported.into());
    }

    if from_status.is_symlink() {
        if options.contains(CopyOptions::COPY_SYMLINKS) {
            return copy_symlink_impl(from, to);
        } else if options.contains(CopyOptions::SKIP_SYMLINKS) {
            return Ok(());
        }
        return Err(Errc::NotSupported.into());
    }

    if from_status.is_regular_file() {
        if options.contains(CopyOptions::DIRECTORIES_ONLY) {
            return Ok(());
        } else if options.contains(CopyOptions::CREATE_SYMLINKS) {
            return create_symlink_impl(from, to);
        } else if options.contains(CopyOptions::CREATE_HARD_LINKS) {
            return create_hard_link_impl(from, to);
        } else if to_status.is_directory() {
            copy_file_impl(from, &to.join(&from.filename()), options)?;
        } else {
            copy_file_impl(from, to, options)?;
        }
        return Ok(());
    }

    if from_status.is_directory() && options.contains(CopyOptions::CREATE_SYMLINKS) {
        return Err(Errc::IsADirectory.into());
    }

    let descend = options.contains(CopyOptions::RECURSIVE) || (options.is_empty() && top_level);
    if from_status.is_directory() && descend {
        if !to_status.exists() {
            create_directory_with_attributes_impl(to, from)?;
        }
        for entry in DirectoryIterator::open(from, DirectoryOptions::empty())? {
            let entry = entry.map_err(|err| err.code())?;
            let target = to.join(&entry.path().filename());
            copy_inner(entry.path(), &target, options, false)?;
        }
    }
    Ok(())
}

fn copy_file_impl(from: &Path, to: &Path, options: CopyOptions) -> Result<bool, ErrorCode> {
    let from_status = status_impl(from)?;
    if !from_status.exists() {
        return Err(Errc::NoSuchFileOrDirectory.into());
    }
    if !from_status.is_regular_file() {
        return Err(Errc::NotSupported.into());
    }

    let to_status = status_impl(to)?;
    if to_status.exists() {
        if !to_status.is_regular_file() {
            return Err(Errc::NotSupported.into());
        }
        if same_file(from, to)? {
            return Err(Errc::FileExists.into());
        }

        if options.contains(CopyOptions::SKIP_EXISTING) {
            return Ok(false);
        } else if options.contains(CopyOptions::UPDATE_EXISTING) {
            let from_time = FilesystemPlatform::query_last_write_time(from)?;
            let to_time = FilesystemPlatform::query_last_write_time(to)?;
            if from_time <= to_time {
                return Ok(false);
            }
        } else if !options.contains(CopyOptions::OVERWRITE_EXISTING) {
            return Err(Errc::FileExists.into());
        }
    }

    FilesystemPlatform::copy_file_contents(from, to)?;
    Ok(true)
}

fn copy_symlink_impl(from: &Path, to: &Path) -> Result<(), ErrorCode> {
    let target = FilesystemPlatform::read_symlink(from)?;
    let is_directory = status_impl(from)?.is_directory();
    FilesystemPlatform::create_symlink(&target, to, is_directory)
}

fn create_directory_with_perms(path: &Path, perms: Perms) -> Result<bool, ErrorCode> {
    match FilesystemPlatform::create_directory(path, perms) {
        Ok(()) => Ok(true),
        Err(code) if code == Errc::FileExists => {
            // Only an existing directory counts as success.
            match status_impl(path) {
                Ok(status) if status.is_directory() => Ok(false),
                _ => Err(code),
            }
        }
        Err(code) => Err(code),
    }
}

fn create_directory_impl(path: &Path) -> Result<bool, ErrorCode> {
    create_directory_with_perms(path, Perms::ALL)
}

fn create_directory_with_attributes_impl(
    path: &Path,
    attributes: &Path,
) -> Result<bool, ErrorCode> {
    let status = status_impl(attributes)?;
    if !status.is_directory() {
        return Err(Errc::NotADirectory.into());
    }
    create_directory_with_perms(path, status.permissions())
}

fn create_directories_impl(path: &Path) -> Result<bool, ErrorCode> {
    // `a/b/` names the same directory as `a/b`.
    if path.has_relative_path() && !path.has_filename() {
        return create_directories_impl(&path.parent_path());
    }

    let status = status_impl(path)?;
    if status.is_directory() {
        return Ok(false);
    } else if status.exists() {
        return Err(Errc::FileExists.into());
    }

    let parent = path.parent_path();
    if !parent.is_empty() {
        let parent_status = status_impl(&parent)?;
        if !parent_status.exists() {
            if parent == *path {
                return Err(Errc::InvalidArgument.into());
            }
            create_directories_impl(&parent)?;
        } else if !parent_status.is_directory() {
            return Err(Errc::NotADirectory.into());
        }
    }
    create_directory_impl(path)
}

fn create_symlink_impl(target: &Path, link: &Path) -> Result<(), ErrorCode> {
    FilesystemPlatform::create_symlink(target, link, false)
}

fn create_directory_symlink_impl(target: &Path, link: &Path) -> Result<(), ErrorCode> {
    FilesystemPlatform::create_symlink(target, link, true)
}

fn create_hard_link_impl(target: &Path, link: &Path) -> Result<(), ErrorCode> {
    FilesystemPlatform::create_hard_link(target, link)
}

fn current_path_impl() -> Result<Path, ErrorCode> {
    FilesystemPlatform::current_directory()
}

fn set_current_path_impl(path: &Path) -> Result<(), ErrorCode> {
    FilesystemPlatform::set_current_directory(path)
}

fn equivalent_impl(path1: &Path, path2: &Path) -> Result<bool, ErrorCode> {
    let exists1 = status_impl(path1)?.exists();
    let exists2 = status_impl(path2)?.exists();
    match (exists1, exists2) {
        (false, false) => Err(Errc::NoSuchFileOrDirectory.into()),
        (true, true) => Ok(identity(path1)? == identity(path2)?),
        _ => Ok(false),
    }
}

fn exists_impl(path: &Path) -> Result<bool, ErrorCode> {
    status_impl(path).map(|status| status.exists())
}

pub(crate) fn file_size_impl(path: &Path) -> Result<u64, ErrorCode> {
    let stat = FilesystemPlatform::query_stat(path, true)?;
    match stat.file_type {
        FileType::Regular => Ok(stat.size),
        FileType::Directory => Err(Errc::IsADirectory.into()),
        _ => Err(Errc::NotSupported.into()),
    }
}

pub(crate) fn hard_link_count_impl(path: &Path) -> Result<u64, ErrorCode> {
    FilesystemPlatform::query_hard_link_count(path)
}

fn is_empty_impl(path: &Path) -> Result<bool, ErrorCode> {
    let status = status_impl(path)?;
    if !status.exists() {
        Err(Errc::NoSuchFileOrDirectory.into())
    } else if status.is_directory() {
        Ok(DirectoryIterator::open(path, DirectoryOptions::empty())?.is_end())
    } else if status.is_regular_file() {
        Ok(FilesystemPlatform::query_size(path)? == 0)
    } else {
        Err(Errc::NotSupported.into())
    }
}

fn is_directory_impl(path: &Path) -> Result<bool, ErrorCode> {
    status_impl(path).map(|status| status.is_directory())
}

fn is_regular_file_impl(path: &Path) -> Result<bool, ErrorCode> {
    status_impl(path).map(|status| status.is_regular_file())
}

fn is_symlink_impl(path: &Path) -> Result<bool, ErrorCode> {
    symlink_status_impl(path).map(|status| status.is_symlink())
}

fn is_block_file_impl(path: &Path) -> Result<bool, ErrorCode> {
    status_impl(path).map(|status| status.is_block_file())
}

fn is_character_file_impl(path: &Path) -> Result<bool, ErrorCode> {
    status_impl(path).map(|status| status.is_character_file())
}

fn is_fifo_impl(path: &Path) -> Result<bool, ErrorCode> {
    status_impl(path).map(|status| status.is_fifo())
}

fn is_socket_impl(path: &Path) -> Result<bool, ErrorCode> {
    status_impl(path).map(|status| status.is_socket())
}

fn is_other_impl(path: &Path) -> Result<bool, ErrorCode> {
    status_impl(path).map(|status| status.is_other())
}

pub(crate) fn last_write_time_impl(path: &Path) -> Result<SystemTime, ErrorCode> {
    FilesystemPlatform::query_last_write_time(path)
}

fn set_last_write_time_impl(path: &Path, time: SystemTime) -> Result<(), ErrorCode> {
    FilesystemPlatform::set_last_write_time(path, time)
}

fn permissions_impl(path: &Path, perms: Perms, options: PermOptions) -> Result<(), ErrorCode> {
    let modes = [PermOptions::REPLACE, PermOptions::ADD, PermOptions::REMOVE];
    if modes.iter().filter(|mode| options.contains(**mode)).count() != 1 {
        return Err(Errc::InvalidArgument.into());
    }

    let nofollow = options.contains(PermOptions::NOFOLLOW);
    let status = if nofollow {
        symlink_status_impl(path)?
    } else {
        status_impl(path)?
    };
    if !status.exists() {
        return Err(Errc::NoSuchFileOrDirectory.into());
    }
    if nofollow && status.is_symlink() {
        return Err(Errc::NotSupported.into());
    }

    let perms = perms & Perms::MASK;
    let current = status.permissions() & Perms::MASK;
    let updated = if options.contains(PermOptions::ADD) {
        current | perms
    } else if options.contains(PermOptions::REMOVE) {
        current & !perms
    } else {
        perms
    };
    FilesystemPlatform::set_permissions(path, updated)
}

fn read_symlink_impl(path: &Path) -> Result<Path, ErrorCode> {
    FilesystemPlatform::read_symlink(path)
}

fn remove_impl(path: &Path) -> Result<bool, ErrorCode> {
    let status = symlink_status_impl(path)?;
    if !status.exists() {
        return Ok(false);
    }
    if status.is_directory() {
        FilesystemPlatform::remove_directory(path)?;
    } else {
        FilesystemPlatform::remove_file(path)?;
    }
    Ok(true)
}

fn remove_all_impl(path: &Path) -> Result<u64, ErrorCode> {
    let status = symlink_status_impl(path)?;
    if !status.exists() {
        return Ok(0);
    }
    let count = remove_all_inner(path, status.file_type())?;
    tracing::debug!(%path, count, "removed all");
    Ok(count)
}

fn remove_all_inner(path: &Path, file_type: FileType) -> Result<u64, ErrorCode> {
    if file_type != FileType::Directory {
        FilesystemPlatform::remove_file(path)?;
        return Ok(1);
    }

    // Read the whole directory before removing anything from it.
    let mut children = Vec::new();
    for entry in DirectoryIterator::open(path, DirectoryOptions::empty())? {
        let entry = entry.map_err(|err| err.code())?;
        let file_type = entry.symlink_file_type_result()?;
        children.push((entry.into_path(), file_type));
    }

    let mut count = 0;
    for (child, file_type) in children {
        count += remove_all_inner(&child, file_type)?;
    }
    FilesystemPlatform::remove_directory(path)?;
    Ok(count + 1)
}

fn rename_impl(from: &Path, to: &Path) -> Result<(), ErrorCode> {
    FilesystemPlatform::rename(from, to)
}

fn resize_file_impl(path: &Path, size: u64) -> Result<(), ErrorCode> {
    FilesystemPlatform::resize_file(path, size)
}

fn space_impl(path: &Path) -> Result<SpaceInfo, ErrorCode> {
    FilesystemPlatform::space(path)
}

fn temp_directory_path_impl() -> Result<Path, ErrorCode> {
    let configured = crate::FS_TEMP_DIRECTORY.read(crate::configs());
    let path = if configured.is_empty() {
        FilesystemPlatform::temp_directory()?
    } else {
        Path::new(configured.as_str())
    };

    if !status_impl(&path)?.is_directory() {
        tracing::debug!(%path, "temp directory is not a directory");
        return Err(Errc::NotADirectory.into());
    }
    Ok(path)
}
