//! Helpers for reading environment variables.

use std::ffi::OsStr;

/// Returns true if `value` is one of `'0', '', 'no', 'false'` (case insensitive), the
/// spellings we treat as "off".
pub fn is_falsey(value: &OsStr) -> bool {
    static CANDIDATES: &[&str] = &["0", "", "no", "false"];

    let value = value.to_ascii_lowercase();
    CANDIDATES.iter().any(|falsey| value == *falsey)
}

/// Name of the environment variable that overrides the setting `name`.
///
/// `fs_dirent_type_hints` becomes `PFS_FS_DIRENT_TYPE_HINTS`.
pub fn override_var(name: &str) -> String {
    format!("PFS_{}", name.to_ascii_uppercase())
}
