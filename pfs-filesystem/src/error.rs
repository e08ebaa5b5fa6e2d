//! Error codes and the structured [`Error`] built from them.
//!
//! Every fallible operation is implemented once, returning `Result<T, ErrorCode>`. The public
//! surface then comes in two forms: `op(..) -> Result<T, Error>`, which attaches the name of
//! the operation and the paths involved, and `op_ec(.., &mut ErrorCode) -> T`, which never
//! fails and instead stores the code in its out parameter.

use std::fmt;

use pfs_path::Path;

use crate::platform::{FilesystemPlatform, Platform};

/// Where the numeric value of an [`ErrorCode`] comes from.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// Values of [`Errc`], portable across platforms.
    #[default]
    Generic,
    /// Raw OS error numbers, e.g. `errno`.
    System,
}

/// Portable classification of an [`ErrorCode`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Errc {
    NoSuchFileOrDirectory = 1,
    NotADirectory,
    IsADirectory,
    PermissionDenied,
    FileExists,
    InvalidArgument,
    ValueTooLarge,
    NotSupported,
    DirectoryNotEmpty,
    IllegalByteSequence,
    CrossDeviceLink,
    TooManySymbolicLinkLevels,
    FilenameTooLong,
    ReadOnlyFileSystem,
    NoSpaceOnDevice,
    DeviceOrResourceBusy,
    Interrupted,
    IoError,
}

impl Errc {
    const ALL: [Errc; 18] = [
        Errc::NoSuchFileOrDirectory,
        Errc::NotADirectory,
        Errc::IsADirectory,
        Errc::PermissionDenied,
        Errc::FileExists,
        Errc::InvalidArgument,
        Errc::ValueTooLarge,
        Errc::NotSupported,
        Errc::DirectoryNotEmpty,
        Errc::IllegalByteSequence,
        Errc::CrossDeviceLink,
        Errc::TooManySymbolicLinkLevels,
        Errc::FilenameTooLong,
        Errc::ReadOnlyFileSystem,
        Errc::NoSpaceOnDevice,
        Errc::DeviceOrResourceBusy,
        Errc::Interrupted,
        Errc::IoError,
    ];

    fn from_value(value: i32) -> Option<Errc> {
        Errc::ALL.into_iter().find(|errc| *errc as i32 == value)
    }

    pub fn message(&self) -> &'static str {
        match self {
            Errc::NoSuchFileOrDirectory => "No such file or directory",
            Errc::NotADirectory => "Not a directory",
            Errc::IsADirectory => "Is a directory",
            Errc::PermissionDenied => "Permission denied",
            Errc::FileExists => "File exists",
            Errc::InvalidArgument => "Invalid argument",
            Errc::ValueTooLarge => "Value too large for defined data type",
            Errc::NotSupported => "Operation not supported",
            Errc::DirectoryNotEmpty => "Directory not empty",
            Errc::IllegalByteSequence => "Illegal byte sequence",
            Errc::CrossDeviceLink => "Invalid cross-device link",
            Errc::TooManySymbolicLinkLevels => "Too many levels of symbolic links",
            Errc::FilenameTooLong => "File name too long",
            Errc::ReadOnlyFileSystem => "Read-only file system",
            Errc::NoSpaceOnDevice => "No space left on device",
            Errc::DeviceOrResourceBusy => "Device or resource busy",
            Errc::Interrupted => "Interrupted system call",
            Errc::IoError => "Input/output error",
        }
    }
}

/// A numeric error value plus the [`Category`] it belongs to.
///
/// The default value means success.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    value: i32,
    category: Category,
}

impl ErrorCode {
    pub const fn new(value: i32, category: Category) -> Self {
        ErrorCode { value, category }
    }

    /// The error of the most recent failed OS call on this thread.
    pub fn last_os_error() -> Self {
        std::io::Error::last_os_error().into()
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Reset to success.
    pub fn clear(&mut self) {
        *self = ErrorCode::default();
    }

    pub fn is_err(&self) -> bool {
        self.value != 0
    }

    pub fn is_ok(&self) -> bool {
        !self.is_err()
    }

    /// Classify this code, `None` for success or for OS errors we have no name for.
    pub fn errc(&self) -> Option<Errc> {
        match self.category {
            _ if self.is_ok() => None,
            Category::Generic => Errc::from_value(self.value),
            Category::System => FilesystemPlatform::classify_os_error(self.value),
        }
    }

    /// Returns `true` if this code means the file isn't there, which pure queries report as
    /// [`FileType::NotFound`](crate::FileType::NotFound) instead of failing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.errc(),
            Some(Errc::NoSuchFileOrDirectory | Errc::NotADirectory)
        )
    }

    pub fn message(&self) -> String {
        match self.category {
            _ if self.is_ok() => "Success".to_string(),
            Category::Generic => match Errc::from_value(self.value) {
                Some(errc) => errc.message().to_string(),
                None => format!("Unknown error {}", self.value),
            },
            Category::System => std::io::Error::from_raw_os_error(self.value).to_string(),
        }
    }

    /// Store the outcome of `result` in `self`, returning `failed` if it was an error.
    pub(crate) fn capture<T>(&mut self, result: Result<T, ErrorCode>, failed: T) -> T {
        match result {
            Ok(val) => {
                self.clear();
                val
            }
            Err(code) => {
                *self = code;
                failed
            }
        }
    }
}

impl fmt::Debug for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorCode")
            .field("value", &self.value)
            .field("category", &self.category)
            .field("errc", &self.errc())
            .finish()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl From<Errc> for ErrorCode {
    fn from(errc: Errc) -> Self {
        ErrorCode::new(errc as i32, Category::Generic)
    }
}

impl From<std::io::Error> for ErrorCode {
    fn from(err: std::io::Error) -> Self {
        if let Some(raw) = err.raw_os_error() {
            return ErrorCode::new(raw, Category::System);
        }

        use std::io::ErrorKind;
        let errc = match err.kind() {
            ErrorKind::NotFound => Errc::NoSuchFileOrDirectory,
            ErrorKind::PermissionDenied => Errc::PermissionDenied,
            ErrorKind::AlreadyExists => Errc::FileExists,
            ErrorKind::InvalidInput => Errc::InvalidArgument,
            ErrorKind::InvalidData => Errc::IllegalByteSequence,
            ErrorKind::Unsupported => Errc::NotSupported,
            ErrorKind::Interrupted => Errc::Interrupted,
            _ => Errc::IoError,
        };
        errc.into()
    }
}

impl From<pfs_path::PathError> for ErrorCode {
    fn from(err: pfs_path::PathError) -> Self {
        match err {
            pfs_path::PathError::NotUnicode(_) => Errc::IllegalByteSequence.into(),
        }
    }
}

impl PartialEq<Errc> for ErrorCode {
    fn eq(&self, other: &Errc) -> bool {
        self.errc() == Some(*other)
    }
}

/// A failed filesystem operation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{op}: {code}{}", PathContext(.path1.as_ref(), .path2.as_ref()))]
pub struct Error {
    op: &'static str,
    code: ErrorCode,
    path1: Option<Path>,
    path2: Option<Path>,
}

impl Error {
    pub fn new(op: &'static str, code: ErrorCode) -> Self {
        Error {
            op,
            code,
            path1: None,
            path2: None,
        }
    }

    /// Attach `path` as the next path operand.
    pub fn with_path(mut self, path: &Path) -> Self {
        if self.path1.is_none() {
            self.path1 = Some(path.clone());
        } else {
            self.path2 = Some(path.clone());
        }
        self
    }

    /// Name of the operation that failed.
    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn path1(&self) -> Option<&Path> {
        self.path1.as_ref()
    }

    pub fn path2(&self) -> Option<&Path> {
        self.path2.as_ref()
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        let kind = match err.code.category {
            Category::System => return std::io::Error::from_raw_os_error(err.code.value),
            Category::Generic => match err.code.errc() {
                Some(Errc::NoSuchFileOrDirectory) => std::io::ErrorKind::NotFound,
                Some(Errc::PermissionDenied) => std::io::ErrorKind::PermissionDenied,
                Some(Errc::FileExists) => std::io::ErrorKind::AlreadyExists,
                Some(Errc::InvalidArgument) => std::io::ErrorKind::InvalidInput,
                Some(Errc::NotSupported) => std::io::ErrorKind::Unsupported,
                _ => std::io::ErrorKind::Other,
            },
        };
        std::io::Error::new(kind, err)
    }
}

/// Formats the path operands of an [`Error`], if any.
struct PathContext<'a>(Option<&'a Path>, Option<&'a Path>);

impl fmt::Display for PathContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for path in [self.0, self.1].into_iter().flatten() {
            write!(f, " [{path:?}]")?;
        }
        Ok(())
    }
}
