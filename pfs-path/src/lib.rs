//! Lexical paths for `pfs`.
//!
//! [`Path`] is an owned, platform independent path value. It never touches the filesystem:
//! everything in this crate (decomposition, comparison, appending, normalization) is a pure
//! function of the path text and the grammar of its [`Style`].
//!
//! ### Grammar
//!
//! A path is split, left to right, into an optional _root-name_ (`C:` or `//host` where the
//! style allows them), an optional _root-directory_ (one separator) and a _relative-path_ made
//! of filenames separated by runs of separators. A trailing separator yields one extra, empty,
//! filename so that `a/b/` and `a/b` decompose differently.
//!
//! ```
//! use pfs_path::Path;
//!
//! let path = Path::new("/usr/lib//libc.so.6");
//! assert_eq!(path.parent_path(), "/usr/lib");
//! assert_eq!(path.filename(), "libc.so.6");
//! assert_eq!(path.extension(), ".6");
//! assert_eq!(Path::new("/a//b/../c").lexically_normal(), "/a/c");
//! ```

mod iter;
mod lexical;
mod ops;
mod path;
mod style;

pub use iter::Iter;
pub use path::{Path, PathError};
pub use style::{NativeStyle, Posix, Style, Windows};

/// A [`Path`] that always uses the POSIX grammar.
pub type PosixPath = Path<Posix>;
/// A [`Path`] that always uses the Windows grammar.
pub type WindowsPath = Path<Windows>;

#[cfg(test)]
mod tests;
