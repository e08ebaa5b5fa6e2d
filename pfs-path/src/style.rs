//! Grammar rules that differ between platforms.

use std::fmt::Debug;

/// The platform specific pieces of the path grammar.
///
/// Everything else about a [`Path`](crate::Path) is shared, so the rules are expressed as
/// constants and the path algorithms never branch on the platform directly.
pub trait Style: Copy + Debug + Default + Send + Sync + 'static {
    /// Separator used when a separator has to be inserted, e.g. by `push`.
    const PREFERRED_SEPARATOR: u8;
    /// `X:` prefixes are root-names.
    const DRIVE_LETTERS: bool;
    /// `//host` prefixes are root-names.
    const NETWORK_ROOT_NAMES: bool;

    /// Returns `true` if `byte` is a directory separator.
    fn is_separator(byte: u8) -> bool;

    /// Length of the root-name at the start of `text`, `0` if there isn't one.
    fn root_name_len(text: &[u8]) -> usize {
        if Self::DRIVE_LETTERS && text.len() >= 2 && text[1] == b':' && text[0].is_ascii_alphabetic()
        {
            return 2;
        }

        if Self::NETWORK_ROOT_NAMES
            && text.len() >= 3
            && Self::is_separator(text[0])
            && Self::is_separator(text[1])
            && !Self::is_separator(text[2])
        {
            // "//host" runs up to the next separator.
            return text[3..]
                .iter()
                .position(|b| Self::is_separator(*b))
                .map_or(text.len(), |end| end + 3);
        }

        0
    }

    /// Returns `true` if `root_name` is a `//host` style root-name.
    fn is_network_root_name(root_name: &[u8]) -> bool {
        Self::NETWORK_ROOT_NAMES
            && root_name.len() >= 3
            && Self::is_separator(root_name[0])
            && Self::is_separator(root_name[1])
    }
}

/// POSIX grammar: `/` is the only separator and there are no root-names.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Posix;

impl Style for Posix {
    const PREFERRED_SEPARATOR: u8 = b'/';
    const DRIVE_LETTERS: bool = false;
    const NETWORK_ROOT_NAMES: bool = false;

    fn is_separator(byte: u8) -> bool {
        byte == b'/'
    }
}

/// Windows grammar: `\` and `/` are both separators, `C:` and `\\host` are root-names.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Windows;

impl Style for Windows {
    const PREFERRED_SEPARATOR: u8 = b'\\';
    const DRIVE_LETTERS: bool = true;
    const NETWORK_ROOT_NAMES: bool = true;

    fn is_separator(byte: u8) -> bool {
        byte == b'/' || byte == b'\\'
    }
}

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        /// Grammar of the platform we're compiled for.
        pub type NativeStyle = Windows;
    } else {
        /// Grammar of the platform we're compiled for.
        pub type NativeStyle = Posix;
    }
}
