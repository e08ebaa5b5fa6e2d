use std::iter::FusedIterator;

use crate::style::Style;
use crate::Path;

/// Iterator over the components of a [`Path`]: the root-name, the root-directory and then each
/// filename, including the empty filename produced by a trailing separator.
///
/// Created by [`Path::iter`].
#[derive(Debug, Clone)]
pub struct Iter<'a, S: Style> {
    path: &'a Path<S>,
    /// Index of the next component yielded from the front.
    front: usize,
    /// One past the index of the next component yielded from the back.
    back: usize,
}

impl<'a, S: Style> Iter<'a, S> {
    pub(crate) fn new(path: &'a Path<S>) -> Self {
        Iter {
            path,
            front: 0,
            back: path.component_count(),
        }
    }
}

impl<'a, S: Style> Iterator for Iter<'a, S> {
    type Item = Path<S>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let component = self.path.component(self.front);
        self.front += 1;
        Some(self.path.component_path(component))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, S: Style> DoubleEndedIterator for Iter<'a, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.path.component_path(self.path.component(self.back)))
    }
}

impl<'a, S: Style> ExactSizeIterator for Iter<'a, S> {}

impl<'a, S: Style> FusedIterator for Iter<'a, S> {}

/// Two iterators are equal if they walk the same path object and are at the same position.
impl<'a, S: Style> PartialEq for Iter<'a, S> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.path, other.path) && self.front == other.front && self.back == other.back
    }
}

impl<'a, S: Style> Eq for Iter<'a, S> {}

impl<'a, S: Style> IntoIterator for &'a Path<S> {
    type Item = Path<S>;
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
