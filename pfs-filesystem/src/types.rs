//! Value types shared by the directory iterators and the filesystem operations.

use bitflags::bitflags;

/// Type of a file as reported by the OS.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Not evaluated yet, or evaluation failed.
    #[default]
    None,
    /// The file definitely doesn't exist.
    NotFound,
    Regular,
    Directory,
    Symlink,
    Block,
    Character,
    Fifo,
    Socket,
    /// The file exists but its type can't be determined.
    Unknown,
}

bitflags! {
    /// POSIX style permission bits.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct Perms: u32 {
        const OWNER_READ = 0o400;
        const OWNER_WRITE = 0o200;
        const OWNER_EXEC = 0o100;
        const OWNER_ALL = 0o700;

        const GROUP_READ = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXEC = 0o010;
        const GROUP_ALL = 0o070;

        const OTHERS_READ = 0o004;
        const OTHERS_WRITE = 0o002;
        const OTHERS_EXEC = 0o001;
        const OTHERS_ALL = 0o007;

        const ALL = 0o777;
        const SET_UID = 0o4000;
        const SET_GID = 0o2000;
        const STICKY_BIT = 0o1000;
        const MASK = 0o7777;

        /// The permissions are not known, e.g. the file doesn't exist.
        const UNKNOWN = 0xFFFF;
    }
}

impl Default for Perms {
    fn default() -> Self {
        Perms::UNKNOWN
    }
}

bitflags! {
    /// How [`permissions`](crate::permissions) combines the new bits with the existing ones.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct PermOptions: u32 {
        const REPLACE = 0b0001;
        const ADD = 0b0010;
        const REMOVE = 0b0100;
        /// Change a symlink itself instead of its target.
        const NOFOLLOW = 0b1000;
    }
}

impl Default for PermOptions {
    fn default() -> Self {
        PermOptions::REPLACE
    }
}

bitflags! {
    /// Options for [`copy`](crate::copy) and [`copy_file`](crate::copy_file).
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct CopyOptions: u32 {
        // What to do when the destination exists.
        const SKIP_EXISTING = 0b0000_0001;
        const OVERWRITE_EXISTING = 0b0000_0010;
        const UPDATE_EXISTING = 0b0000_0100;

        /// Copy the contents of sub-directories.
        const RECURSIVE = 0b0000_1000;

        // What to do with symlinks.
        const COPY_SYMLINKS = 0b0001_0000;
        const SKIP_SYMLINKS = 0b0010_0000;

        // What to create in place of a regular file.
        const DIRECTORIES_ONLY = 0b0100_0000;
        const CREATE_SYMLINKS = 0b1000_0000;
        const CREATE_HARD_LINKS = 0b1_0000_0000;
    }
}

impl Default for CopyOptions {
    fn default() -> Self {
        CopyOptions::empty()
    }
}

bitflags! {
    /// Options for the directory iterators.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct DirectoryOptions: u32 {
        /// Descend into symlinks that point at directories.
        const FOLLOW_DIRECTORY_SYMLINK = 0b0001;
        /// Treat directories we're not allowed to open as empty.
        const SKIP_PERMISSION_DENIED = 0b0010;
    }
}

impl Default for DirectoryOptions {
    fn default() -> Self {
        DirectoryOptions::empty()
    }
}

/// Type and permissions of a file.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FileStatus {
    file_type: FileType,
    perms: Perms,
}

impl FileStatus {
    pub fn new(file_type: FileType, perms: Perms) -> Self {
        FileStatus { file_type, perms }
    }

    pub(crate) fn not_found() -> Self {
        FileStatus::new(FileType::NotFound, Perms::UNKNOWN)
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn permissions(&self) -> Perms {
        self.perms
    }

    pub fn set_file_type(&mut self, file_type: FileType) {
        self.file_type = file_type;
    }

    pub fn set_permissions(&mut self, perms: Perms) {
        self.perms = perms;
    }

    /// Returns `true` if the type has been determined, `NotFound` counts as determined.
    pub fn status_known(&self) -> bool {
        self.file_type != FileType::None
    }

    pub fn exists(&self) -> bool {
        self.status_known() && self.file_type != FileType::NotFound
    }

    pub fn is_regular_file(&self) -> bool {
        self.file_type == FileType::Regular
    }

    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }

    pub fn is_block_file(&self) -> bool {
        self.file_type == FileType::Block
    }

    pub fn is_character_file(&self) -> bool {
        self.file_type == FileType::Character
    }

    pub fn is_fifo(&self) -> bool {
        self.file_type == FileType::Fifo
    }

    pub fn is_socket(&self) -> bool {
        self.file_type == FileType::Socket
    }

    /// Exists, but is not a regular file, directory or symlink.
    pub fn is_other(&self) -> bool {
        self.exists() && !self.is_regular_file() && !self.is_directory() && !self.is_symlink()
    }
}

impl From<FileType> for FileStatus {
    fn from(file_type: FileType) -> Self {
        FileStatus::new(file_type, Perms::UNKNOWN)
    }
}

/// Space on the filesystem that contains a path, in bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SpaceInfo {
    pub capacity: u64,
    pub free: u64,
    /// Free space available to an unprivileged process.
    pub available: u64,
}

impl SpaceInfo {
    /// Returned when the space can't be queried.
    pub const UNKNOWN: SpaceInfo = SpaceInfo {
        capacity: u64::MAX,
        free: u64::MAX,
        available: u64::MAX,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_predicates() {
        let status = FileStatus::default();
        assert!(!status.status_known());
        assert!(!status.exists());

        let status = FileStatus::from(FileType::NotFound);
        assert!(status.status_known());
        assert!(!status.exists());
        assert!(!status.is_other());

        let status = FileStatus::new(FileType::Fifo, Perms::OWNER_READ);
        assert!(status.exists());
        assert!(status.is_fifo());
        assert!(status.is_other());
        assert_eq!(status.permissions(), Perms::OWNER_READ);
    }

    #[test]
    fn perms_combine() {
        let perms = Perms::OWNER_ALL | Perms::GROUP_READ | Perms::OTHERS_READ;
        assert_eq!(perms.bits(), 0o744);
        assert!(Perms::ALL.contains(perms));
        assert_eq!((perms & !Perms::OWNER_WRITE).bits(), 0o544);
        assert!(Perms::MASK.contains(Perms::SET_UID | Perms::STICKY_BIT));
        assert_eq!(Perms::default(), Perms::UNKNOWN);
    }

    #[test]
    fn options_combine() {
        let options =
            DirectoryOptions::FOLLOW_DIRECTORY_SYMLINK | DirectoryOptions::SKIP_PERMISSION_DENIED;
        assert!(options.contains(DirectoryOptions::SKIP_PERMISSION_DENIED));
        assert!(DirectoryOptions::default().is_empty());

        let mut copy = CopyOptions::RECURSIVE;
        copy |= CopyOptions::SKIP_EXISTING;
        copy ^= CopyOptions::RECURSIVE;
        assert_eq!(copy, CopyOptions::SKIP_EXISTING);
    }
}
