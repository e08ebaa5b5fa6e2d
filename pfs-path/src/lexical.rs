//! Normalization and relative paths, computed from the path text alone.

use crate::path::{Component, Kind};
use crate::style::Style;
use crate::Path;

impl<S: Style> Path<S> {
    /// Returns this path in normal form.
    ///
    /// Runs of separators collapse to one preferred separator, `.` filenames are dropped, and a
    /// filename followed by `..` cancels out. A `..` directly after the root-directory is
    /// removed, and a path ending in `..` never ends in a separator, so `a/b/..` is `a`. An
    /// empty path stays empty while any other path that normalizes to nothing becomes `.`.
    pub fn lexically_normal(&self) -> Self {
        if self.is_empty() {
            return Self::default();
        }

        let dot_dot = Self::from_component("..", Kind::Filename);
        let mut normal = Self::default();

        for index in 0..self.component_count() {
            let component = self.component(index);
            let name = component.text(&self.text);
            match component.kind {
                Kind::RootName => {
                    normal.concat(name);
                }
                Kind::RootDir => {
                    normal.concat(separator::<S>());
                }
                Kind::Filename if name == ".." => normal.pop_for_dot_dot(&dot_dot),
                Kind::Filename if name == "." || name.is_empty() => {
                    // Keeps a trailing separator, if there is something to separate.
                    normal.push(&Self::default());
                }
                Kind::Filename => {
                    normal.push(&Self::from_component(name, Kind::Filename));
                }
                Kind::Multi => unreachable!("components are never multi"),
            }
        }

        let ends_in_dot_dot = self.filename().as_str() == "..";
        let count = normal.component_count();
        if count >= 2 {
            let last = normal.component(count - 1);
            let before = normal.component(count - 2);
            if last.is_empty_filename()
                && before.kind == Kind::Filename
                && (ends_in_dot_dot || before.text(&normal.text) == "..")
            {
                normal = normal.parent_path();
            }
        } else if normal.is_empty() {
            normal = Self::dot();
        }

        normal.make_preferred();
        normal
    }

    /// Apply a `..` to a path that is already in normal form.
    fn pop_for_dot_dot(&mut self, dot_dot: &Self) {
        if self.has_filename() {
            if self.filename().as_str() == ".." {
                self.push(dot_dot);
            } else {
                self.remove_filename();
            }
        } else if !self.has_relative_path() {
            // `..` right after a root-directory goes nowhere.
            if !self.has_root_directory() {
                self.push(dot_dot);
            }
        } else {
            // Ends in a separator, look at the filename before it.
            let before = self.component(self.component_count() - 2);
            if before.kind == Kind::Filename && before.text(&self.text) != ".." {
                self.text.truncate(before.pos);
                self.split();
            } else {
                self.push(dot_dot);
            }
        }
    }

    /// Returns this path relative to `base`, or an empty path if there is no lexical way to
    /// get from `base` to this path.
    ///
    /// `..` and `.` in `base` past the common prefix are honored, so `base` should usually be
    /// normalized first.
    pub fn lexically_relative(&self, base: &Self) -> Self {
        if self.root_name_str() != base.root_name_str()
            || self.is_absolute() != base.is_absolute()
            || (!self.has_root_directory() && base.has_root_directory())
            || self.has_filename_like_root_name()
            || base.has_filename_like_root_name()
        {
            return Self::default();
        }

        let count = self.component_count();
        let base_count = base.component_count();

        let mut ours = 0;
        let mut theirs = 0;
        while ours < count
            && theirs < base_count
            && same_component(self, self.component(ours), base, base.component(theirs))
        {
            ours += 1;
            theirs += 1;
        }

        if ours == count && theirs == base_count {
            return Self::dot();
        }

        let mut depth: isize = 0;
        for index in theirs..base_count {
            let component = base.component(index);
            if component.kind != Kind::Filename {
                continue;
            }
            match component.text(&base.text) {
                ".." => depth -= 1,
                "." | "" => (),
                _ => depth += 1,
            }
        }

        if depth < 0 {
            return Self::default();
        }
        if depth == 0 && (ours == count || self.component(ours).is_empty_filename()) {
            return Self::dot();
        }

        let dot_dot = Self::from_component("..", Kind::Filename);
        let mut relative = Self::default();
        for _ in 0..depth {
            relative.push(&dot_dot);
        }
        for index in ours..count {
            relative.push(&self.component_path(self.component(index)));
        }
        relative
    }

    /// [`Path::lexically_relative`], or this path unchanged if that is empty.
    pub fn lexically_proximate(&self, base: &Self) -> Self {
        let relative = self.lexically_relative(base);
        if relative.is_empty() {
            self.clone()
        } else {
            relative
        }
    }

    /// Returns `true` if a filename of the relative-path could be mistaken for a root-name,
    /// e.g. `a/c:`, which can't be the start of a relative result.
    fn has_filename_like_root_name(&self) -> bool {
        (self.relative_start()..self.component_count()).any(|index| {
            let name = self.component(index).text(&self.text);
            S::root_name_len(name.as_bytes()) > 0
        })
    }
}

fn same_component<S: Style>(
    lhs: &Path<S>,
    lhs_component: Component,
    rhs: &Path<S>,
    rhs_component: Component,
) -> bool {
    lhs_component.kind == rhs_component.kind
        && (lhs_component.kind == Kind::RootDir
            || lhs_component.text(&lhs.text) == rhs_component.text(&rhs.text))
}

fn separator<S: Style>() -> &'static str {
    if S::PREFERRED_SEPARATOR == b'\\' {
        "\\"
    } else {
        "/"
    }
}
