//! Operator and conversion impls for [`Path`].

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Div, DivAssign};
use std::str::FromStr;

use crate::style::Style;
use crate::{Path, PathError};

impl<S: Style> fmt::Debug for Path<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<S: Style> fmt::Display for Path<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<S: Style> PartialEq for Path<S> {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other).is_eq()
    }
}

impl<S: Style> Eq for Path<S> {}

impl<S: Style> PartialOrd for Path<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: Style> Ord for Path<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

/// Hashes the same parts [`Path::compare`] looks at, so equal paths hash equally.
impl<S: Style> Hash for Path<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root_name_str().hash(state);
        self.has_root_directory().hash(state);
        for name in self.relative_names() {
            name.hash(state);
        }
    }
}

impl<S: Style> PartialEq<str> for Path<S> {
    fn eq(&self, other: &str) -> bool {
        self.compare(&Path::from(other)).is_eq()
    }
}

impl<S: Style> PartialEq<&str> for Path<S> {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl<S: Style> From<&str> for Path<S> {
    fn from(text: &str) -> Self {
        Path::from_string(text.to_string())
    }
}

impl<S: Style> From<String> for Path<S> {
    fn from(text: String) -> Self {
        Path::from_string(text)
    }
}

impl<S: Style> FromStr for Path<S> {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Path::from(s))
    }
}

impl<S: Style> AsRef<str> for Path<S> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<std::path::Path> for Path {
    fn as_ref(&self) -> &std::path::Path {
        self.as_std_path()
    }
}

impl TryFrom<std::path::PathBuf> for Path {
    type Error = PathError;

    fn try_from(path: std::path::PathBuf) -> Result<Self, Self::Error> {
        path.into_os_string()
            .into_string()
            .map(Path::new)
            .map_err(PathError::NotUnicode)
    }
}

impl TryFrom<&std::path::Path> for Path {
    type Error = PathError;

    fn try_from(path: &std::path::Path) -> Result<Self, Self::Error> {
        path.to_str()
            .map(Path::new)
            .ok_or_else(|| PathError::NotUnicode(path.as_os_str().to_os_string()))
    }
}

impl<S: Style> DivAssign<&Path<S>> for Path<S> {
    fn div_assign(&mut self, rhs: &Path<S>) {
        self.push(rhs);
    }
}

impl<S: Style> DivAssign<&str> for Path<S> {
    fn div_assign(&mut self, rhs: &str) {
        self.push(&Path::from(rhs));
    }
}

impl<S: Style> Div<&Path<S>> for &Path<S> {
    type Output = Path<S>;

    fn div(self, rhs: &Path<S>) -> Path<S> {
        self.join(rhs)
    }
}

impl<S: Style> Div<&str> for &Path<S> {
    type Output = Path<S>;

    fn div(self, rhs: &str) -> Path<S> {
        self.join(&Path::from(rhs))
    }
}

impl<S: Style> Div<&str> for Path<S> {
    type Output = Path<S>;

    fn div(mut self, rhs: &str) -> Path<S> {
        self.push(&Path::from(rhs));
        self
    }
}

/// Concatenation, `+=` never inserts a separator.
impl<S: Style> AddAssign<&str> for Path<S> {
    fn add_assign(&mut self, rhs: &str) {
        self.concat(rhs);
    }
}

impl<S: Style> Add<&str> for Path<S> {
    type Output = Path<S>;

    fn add(mut self, rhs: &str) -> Path<S> {
        self.concat(rhs);
        self
    }
}
