//! The [`Path`] value type and its decomposition.

use std::cmp::Ordering;
use std::marker::PhantomData;

use smallvec::SmallVec;

use crate::style::{NativeStyle, Style};

/// Errors from converting other path representations into a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path is not valid unicode: {0:?}")]
    NotUnicode(std::ffi::OsString),
}

/// What a [`Path`], or one of its components, is made of.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Kind {
    /// More than one component, each listed in `Path::components`.
    Multi,
    RootName,
    RootDir,
    Filename,
}

/// A component of a [`Path`], stored as a range of the owning path's text.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Component {
    pub(crate) kind: Kind,
    pub(crate) pos: usize,
    pub(crate) len: usize,
}

impl Component {
    pub(crate) fn end(&self) -> usize {
        self.pos + self.len
    }

    pub(crate) fn text<'a>(&self, text: &'a str) -> &'a str {
        &text[self.pos..self.end()]
    }

    /// The synthetic filename produced by a trailing separator.
    pub(crate) fn is_empty_filename(&self) -> bool {
        self.kind == Kind::Filename && self.len == 0
    }
}

/// An owned filesystem path.
///
/// Stores the path text as given, plus the split of that text into components. The split is
/// recomputed from scratch after every modification.
///
/// Paths compare, hash and order component-wise, so `a//b` and `a/b` are equal while `a/b/`
/// and `a/b` are not.
#[derive(Clone)]
pub struct Path<S: Style = NativeStyle> {
    pub(crate) text: String,
    /// [`Kind::Multi`] if `components` holds the split, otherwise the path is a single
    /// component of this kind (or empty).
    pub(crate) kind: Kind,
    /// Either empty or at least two entries.
    pub(crate) components: SmallVec<[Component; 4]>,
    style: PhantomData<fn() -> S>,
}

impl Path<NativeStyle> {
    /// Create a [`Path`] using the grammar of the current platform.
    pub fn new<T: Into<String>>(text: T) -> Self {
        Path::from_string(text.into())
    }

    /// View this path as a [`std::path::Path`], e.g. to hand it to `std::fs`.
    pub fn as_std_path(&self) -> &std::path::Path {
        std::path::Path::new(self.text.as_str())
    }
}

impl<S: Style> Path<S> {
    /// Create a [`Path`] from `text` using the grammar `S`.
    pub fn from_string(text: String) -> Self {
        let mut path = Path {
            text,
            kind: Kind::Filename,
            components: SmallVec::new(),
            style: PhantomData,
        };
        path.split();
        path
    }

    /// Create a single component path without re-parsing `text`.
    pub(crate) fn from_component(text: &str, kind: Kind) -> Self {
        debug_assert!(kind != Kind::Multi);
        Path {
            text: text.to_string(),
            kind,
            components: SmallVec::new(),
            style: PhantomData,
        }
    }

    pub(crate) fn dot() -> Self {
        Self::from_component(".", Kind::Filename)
    }

    /// Re-derive `kind` and `components` from `text`.
    pub(crate) fn split(&mut self) {
        let bytes = self.text.as_bytes();
        let mut components: SmallVec<[Component; 4]> = SmallVec::new();

        let mut pos = S::root_name_len(bytes);
        if pos > 0 {
            components.push(Component {
                kind: Kind::RootName,
                pos: 0,
                len: pos,
            });
        }
        if pos < bytes.len() && S::is_separator(bytes[pos]) {
            components.push(Component {
                kind: Kind::RootDir,
                pos,
                len: 1,
            });
            pos = skip_separators::<S>(bytes, pos);
        }

        while pos < bytes.len() {
            let start = pos;
            while pos < bytes.len() && !S::is_separator(bytes[pos]) {
                pos += 1;
            }
            components.push(Component {
                kind: Kind::Filename,
                pos: start,
                len: pos - start,
            });

            if pos < bytes.len() {
                pos = skip_separators::<S>(bytes, pos);
                if pos == bytes.len() {
                    components.push(Component {
                        kind: Kind::Filename,
                        pos,
                        len: 0,
                    });
                }
            }
        }

        // Trim: a single component is stored as the kind of the whole path.
        match components.len() {
            0 => {
                self.kind = Kind::Filename;
                self.components.clear();
            }
            1 => {
                self.kind = components[0].kind;
                self.components.clear();
            }
            _ => {
                self.kind = Kind::Multi;
                self.components = components;
            }
        }
    }

    /// The path text, in whatever separators it was built with.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// The path text with every separator replaced by `/`.
    pub fn generic_string(&self) -> String {
        self.map_separators(b'/')
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns an iterator over the components of this path.
    pub fn iter(&self) -> crate::Iter<'_, S> {
        crate::Iter::new(self)
    }

    pub(crate) fn component_count(&self) -> usize {
        match self.kind {
            Kind::Multi => self.components.len(),
            _ if self.text.is_empty() => 0,
            _ => 1,
        }
    }

    /// The component at `index`, synthesized for single component paths.
    pub(crate) fn component(&self, index: usize) -> Component {
        match self.kind {
            Kind::Multi => self.components[index],
            kind => {
                debug_assert_eq!(index, 0, "single component path");
                let len = if kind == Kind::RootDir {
                    1
                } else {
                    self.text.len()
                };
                Component { kind, pos: 0, len }
            }
        }
    }

    pub(crate) fn component_path(&self, component: Component) -> Self {
        Self::from_component(component.text(&self.text), component.kind)
    }

    fn root_name_component(&self) -> Option<Component> {
        if self.component_count() == 0 {
            return None;
        }
        Some(self.component(0)).filter(|c| c.kind == Kind::RootName)
    }

    fn root_directory_component(&self) -> Option<Component> {
        (0..self.component_count().min(2))
            .map(|index| self.component(index))
            .find(|c| c.kind == Kind::RootDir)
    }

    /// Index of the first component of the relative-path.
    pub(crate) fn relative_start(&self) -> usize {
        (0..self.component_count())
            .find(|index| self.component(*index).kind == Kind::Filename)
            .unwrap_or_else(|| self.component_count())
    }

    /// Text of the root-name, empty if there isn't one.
    pub(crate) fn root_name_str(&self) -> &str {
        self.root_name_component()
            .map_or("", |c| c.text(&self.text))
    }

    /// Final component, if it is a non-empty filename.
    fn filename_component(&self) -> Option<Component> {
        let count = self.component_count();
        if count == 0 {
            return None;
        }
        Some(self.component(count - 1)).filter(|c| c.kind == Kind::Filename && c.len > 0)
    }

    /// Relative-path components as text, the input for comparing and hashing.
    pub(crate) fn relative_names(&self) -> impl Iterator<Item = &str> + '_ {
        (self.relative_start()..self.component_count())
            .map(|index| self.component(index).text(&self.text))
    }

    pub fn root_name(&self) -> Self {
        self.root_name_component()
            .map(|c| self.component_path(c))
            .unwrap_or_default()
    }

    pub fn root_directory(&self) -> Self {
        self.root_directory_component()
            .map(|c| self.component_path(c))
            .unwrap_or_default()
    }

    /// [`Path::root_name`] followed by [`Path::root_directory`].
    pub fn root_path(&self) -> Self {
        let end = self
            .root_directory_component()
            .or_else(|| self.root_name_component())
            .map_or(0, |c| c.end());
        Self::from_string(self.text[..end].to_string())
    }

    /// Everything after [`Path::root_path`].
    pub fn relative_path(&self) -> Self {
        let start = self.relative_start();
        if start == self.component_count() {
            return Self::default();
        }
        let pos = self.component(start).pos;
        Self::from_string(self.text[pos..].to_string())
    }

    /// The path without its last component, or the path itself if it has no relative-path.
    pub fn parent_path(&self) -> Self {
        if !self.has_relative_path() {
            return self.clone();
        }
        let count = self.component_count();
        if count < 2 {
            return Self::default();
        }
        let parent = self.component(count - 2);
        Self::from_string(self.text[..parent.end()].to_string())
    }

    /// The last component if it's a filename, empty if the path ends in a separator.
    pub fn filename(&self) -> Self {
        self.filename_component()
            .map(|c| self.component_path(c))
            .unwrap_or_default()
    }

    /// [`Path::filename`] without its [`Path::extension`].
    pub fn stem(&self) -> Self {
        let Some(name) = self.filename_component() else {
            return Self::default();
        };
        let name = name.text(&self.text);
        let end = extension_start(name).unwrap_or(name.len());
        Self::from_component(&name[..end], Kind::Filename)
    }

    /// The part of [`Path::filename`] from its last `.`, unless that `.` is the first
    /// character or the name is only dots.
    pub fn extension(&self) -> Self {
        let Some(name) = self.filename_component() else {
            return Self::default();
        };
        let name = name.text(&self.text);
        match extension_start(name) {
            Some(start) => Self::from_component(&name[start..], Kind::Filename),
            None => Self::default(),
        }
    }

    pub fn has_root_name(&self) -> bool {
        self.root_name_component().is_some()
    }

    pub fn has_root_directory(&self) -> bool {
        self.root_directory_component().is_some()
    }

    pub fn has_root_path(&self) -> bool {
        self.has_root_name() || self.has_root_directory()
    }

    pub fn has_relative_path(&self) -> bool {
        self.relative_start() < self.component_count()
    }

    pub fn has_parent_path(&self) -> bool {
        !self.parent_path().is_empty()
    }

    pub fn has_filename(&self) -> bool {
        self.filename_component().is_some()
    }

    pub fn has_stem(&self) -> bool {
        !self.stem().is_empty()
    }

    pub fn has_extension(&self) -> bool {
        !self.extension().is_empty()
    }

    /// Returns `true` if the path identifies a location without reference to a current
    /// directory.
    ///
    /// That requires a root-directory, plus a root-name where the grammar has drive letters.
    /// A `//host` root-name is absolute on its own.
    pub fn is_absolute(&self) -> bool {
        match self.root_name_component() {
            Some(root_name) if S::is_network_root_name(root_name.text(&self.text).as_bytes()) => {
                true
            }
            Some(_) => self.has_root_directory(),
            None => self.has_root_directory() && !S::DRIVE_LETTERS,
        }
    }

    pub fn is_relative(&self) -> bool {
        !self.is_absolute()
    }

    /// Compare two paths component by component.
    ///
    /// Root-names compare first, then the presence of a root-directory, then the filenames of
    /// the relative-path, each by their text.
    pub fn compare(&self, other: &Self) -> Ordering {
        let ordering = self.root_name_str().cmp(other.root_name_str());
        if ordering.is_ne() {
            return ordering;
        }

        match (self.has_root_directory(), other.has_root_directory()) {
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            _ => (),
        }

        self.relative_names().cmp(other.relative_names())
    }

    pub fn clear(&mut self) -> &mut Self {
        self.text.clear();
        self.split();
        self
    }

    /// Replace the contents of this path with `text`.
    pub fn assign<T: Into<String>>(&mut self, text: T) -> &mut Self {
        self.text = text.into();
        self.split();
        self
    }

    /// Append `other` as a new component, the `/=` of the path grammar.
    ///
    /// If `other` is absolute, or names a different root, it replaces this path entirely. If
    /// it has a root-directory, it replaces everything after our root-name. Otherwise a
    /// separator is inserted when needed and `other` is appended.
    pub fn push(&mut self, other: &Self) -> &mut Self {
        let other_root_name = other.root_name_str();
        if other.is_absolute()
            || (!other_root_name.is_empty() && other_root_name != self.root_name_str())
        {
            *self = other.clone();
            return self;
        }

        if other.has_root_directory() {
            let keep = self.root_name_component().map_or(0, |c| c.end());
            self.text.truncate(keep);
        } else if self.has_filename() || (!self.has_root_directory() && self.is_absolute()) {
            self.text.push(char::from(S::PREFERRED_SEPARATOR));
        }

        self.text.push_str(&other.text[other_root_name.len()..]);
        self.split();
        self
    }

    /// Returns a new path with `other` appended, see [`Path::push`].
    pub fn join(&self, other: &Self) -> Self {
        let mut joined = self.clone();
        joined.push(other);
        joined
    }

    /// Append `text` without inserting a separator.
    pub fn concat(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self.split();
        self
    }

    /// Remove the last component if it's a filename, leaving any separator before it.
    pub fn remove_filename(&mut self) -> &mut Self {
        if let Some(name) = self.filename_component() {
            self.text.truncate(name.pos);
            self.split();
        }
        self
    }

    pub fn replace_filename(&mut self, replacement: &Self) -> &mut Self {
        self.remove_filename();
        self.push(replacement)
    }

    /// Replace the extension with `replacement`, adding a leading `.` if it doesn't have one.
    /// An empty `replacement` just removes the extension.
    pub fn replace_extension(&mut self, replacement: &str) -> &mut Self {
        if let Some(name) = self.filename_component() {
            if let Some(start) = extension_start(name.text(&self.text)) {
                self.text.truncate(name.pos + start);
            }
        }

        if !replacement.is_empty() {
            if !replacement.starts_with('.') {
                self.text.push('.');
            }
            self.text.push_str(replacement);
        }
        self.split();
        self
    }

    /// Rewrite every separator as the preferred separator of the grammar.
    pub fn make_preferred(&mut self) -> &mut Self {
        if self.text.bytes().any(|b| S::is_separator(b) && b != S::PREFERRED_SEPARATOR) {
            self.text = self.map_separators(S::PREFERRED_SEPARATOR);
            self.split();
        }
        self
    }

    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    fn map_separators(&self, separator: u8) -> String {
        self.text
            .chars()
            .map(|c| {
                if c.is_ascii() && S::is_separator(c as u8) {
                    char::from(separator)
                } else {
                    c
                }
            })
            .collect()
    }
}

impl<S: Style> Default for Path<S> {
    fn default() -> Self {
        Path {
            text: String::new(),
            kind: Kind::Filename,
            components: SmallVec::new(),
            style: PhantomData,
        }
    }
}

fn skip_separators<S: Style>(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && S::is_separator(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// Index of the `.` that starts the extension of the filename `name`.
fn extension_start(name: &str) -> Option<usize> {
    if name.bytes().all(|b| b == b'.') {
        return None;
    }
    match name.rfind('.') {
        Some(0) | None => None,
        Some(start) => Some(start),
    }
}
