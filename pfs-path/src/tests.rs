use proptest::prelude::*;

use crate::{Path, PosixPath, Style, WindowsPath};

/// Path text built from a small alphabet so that separators, dots and repeated names collide
/// often.
fn posix_text() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        Just("a"),
        Just("b"),
        Just("."),
        Just(".."),
        Just("/"),
        Just("//"),
        Just("c:"),
        Just(".x"),
    ];
    proptest::collection::vec(piece, 0..8).prop_map(|pieces| pieces.concat())
}

fn windows_text() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        Just("a"),
        Just("b"),
        Just("."),
        Just(".."),
        Just("/"),
        Just("\\"),
        Just("//"),
        Just(".x"),
    ];
    let body = proptest::collection::vec(piece, 0..8).prop_map(|pieces| pieces.concat());
    (prop_oneof![Just(""), Just("c:"), Just("d:")], body)
        .prop_map(|(drive, body)| format!("{drive}{body}"))
}

fn round_trips<S: Style>(path: &Path<S>) -> Result<(), TestCaseError> {
    let mut rebuilt = path.root_name();
    rebuilt.concat(path.root_directory().as_str());
    rebuilt.concat(path.relative_path().as_str());
    prop_assert_eq!(&rebuilt, path);

    let mut rebuilt = path.root_path();
    rebuilt.concat(path.relative_path().as_str());
    prop_assert_eq!(&rebuilt, path);

    let mut name = path.stem();
    name.concat(path.extension().as_str());
    let filename = path.filename();
    prop_assert_eq!(name.as_str(), filename.as_str());
    Ok(())
}

fn normal_is_idempotent<S: Style>(path: &Path<S>) -> Result<(), TestCaseError> {
    let once = path.lexically_normal();
    let twice = once.lexically_normal();
    prop_assert_eq!(once.as_str(), twice.as_str());
    Ok(())
}

fn iterates_relative_path<S: Style>(path: &Path<S>) -> Result<(), TestCaseError> {
    if !path.is_empty() {
        prop_assert!(path.iter().count() > 0);
    }
    prop_assert_eq!(path.iter().len(), path.iter().rev().count());

    let skip = usize::from(path.has_root_name()) + usize::from(path.has_root_directory());
    let names: Vec<String> = path.iter().skip(skip).map(|c| c.into_string()).collect();
    let rebuilt = Path::<S>::from_string(names.join("/"));
    prop_assert_eq!(rebuilt, path.relative_path());
    Ok(())
}

proptest! {
    #[test]
    fn posix_round_trip(text in posix_text()) {
        round_trips(&PosixPath::from(text.as_str()))?;
    }

    #[test]
    fn windows_round_trip(text in windows_text()) {
        round_trips(&WindowsPath::from(text.as_str()))?;
    }

    #[test]
    fn posix_normal_idempotent(text in posix_text()) {
        normal_is_idempotent(&PosixPath::from(text.as_str()))?;
    }

    #[test]
    fn windows_normal_idempotent(text in windows_text()) {
        normal_is_idempotent(&WindowsPath::from(text.as_str()))?;
    }

    #[test]
    fn posix_iterator_agrees(text in posix_text()) {
        iterates_relative_path(&PosixPath::from(text.as_str()))?;
    }

    #[test]
    fn windows_iterator_agrees(text in windows_text()) {
        iterates_relative_path(&WindowsPath::from(text.as_str()))?;
    }

    #[test]
    fn append_consistency(lhs in posix_text(), rhs in posix_text()) {
        let lhs = PosixPath::from(lhs.as_str());
        let rhs = PosixPath::from(rhs.as_str());

        let mut pushed = lhs.clone();
        pushed /= &rhs;
        let joined = &lhs / &rhs;
        prop_assert_eq!(joined.as_str(), pushed.as_str());

        // Self append reads the right hand side before it's modified.
        let mut doubled = lhs.clone();
        let copy = doubled.clone();
        doubled.push(&copy);
        let self_joined = &lhs / &lhs;
        prop_assert_eq!(doubled.as_str(), self_joined.as_str());

        if lhs.has_filename() {
            let separated = &lhs / "";
            prop_assert_eq!(separated.as_str(), format!("{}/", lhs.as_str()));
        }
    }

    #[test]
    fn compare_is_antisymmetric(lhs in posix_text(), rhs in posix_text()) {
        let lhs = PosixPath::from(lhs.as_str());
        let rhs = PosixPath::from(rhs.as_str());

        prop_assert!(lhs.compare(&lhs).is_eq());
        prop_assert_eq!(lhs.compare(&rhs), rhs.compare(&lhs).reverse());
        prop_assert_eq!(lhs == rhs, lhs.compare(&rhs).is_eq());
    }

    #[test]
    fn windows_compare_is_antisymmetric(lhs in windows_text(), rhs in windows_text()) {
        let lhs = WindowsPath::from(lhs.as_str());
        let rhs = WindowsPath::from(rhs.as_str());
        prop_assert_eq!(lhs.compare(&rhs), rhs.compare(&lhs).reverse());
    }

    #[test]
    fn posix_absolute_means_root_directory(text in posix_text()) {
        let path = PosixPath::from(text.as_str());
        prop_assert_eq!(path.is_absolute(), path.has_root_directory());
        prop_assert!(!path.has_root_name());
    }

    #[test]
    fn windows_absolute_needs_both_roots(text in windows_text()) {
        let path = WindowsPath::from(text.as_str());
        let network = {
            let root_name = path.root_name().into_string();
            root_name.len() > 2 && !root_name.ends_with(':')
        };
        prop_assert_eq!(
            path.is_absolute(),
            network || (path.has_root_name() && path.has_root_directory())
        );
    }
}

#[test]
fn normal_collapses_separators() {
    assert_eq!(PosixPath::from("/a//b").lexically_normal(), PosixPath::from("/a/b"));
}

#[test]
fn normal_drops_trailing_separator_after_dot_dot() {
    let normal = PosixPath::from("a/b/..").lexically_normal();
    assert_eq!(normal, PosixPath::from("a"));
    assert_eq!(normal.as_str(), "a");
    assert!(normal.has_filename());

    // A trailing separator that was written after the `..` is kept.
    assert_eq!(PosixPath::from("a/b/c/../").lexically_normal().as_str(), "a/b/");
    assert_eq!(PosixPath::from("foo/./bar/..").lexically_normal().as_str(), "foo");
}

#[test]
fn proximate_walks_up() {
    let path = PosixPath::from("/a/d").lexically_proximate(&PosixPath::from("/a/b/c"));
    assert_eq!(path, "../../d");
}

#[test]
fn last_dot_splits_extension() {
    let path = PosixPath::from("abc..");
    assert_eq!(path.stem(), "abc.");
    assert_eq!(path.extension(), ".");
}

#[test]
fn append_empty_adds_separator() {
    let path = PosixPath::from("foo") / "";
    assert_eq!(path.as_str(), "foo/");
    assert_eq!(path, "foo/");
    assert_ne!(path, "foo");
}
