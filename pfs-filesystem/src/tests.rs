use std::collections::BTreeSet;
use std::fs;
use std::time::{Duration, SystemTime};

use pfs_path::Path;

use crate::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn temp_root(temp: &tempfile::TempDir) -> Path {
    Path::try_from(temp.path()).unwrap()
}

fn touch(path: &Path, contents: &str) {
    fs::write(path.as_std_path(), contents).unwrap();
}

fn mkdir(path: &Path) {
    fs::create_dir(path.as_std_path()).unwrap();
}

/// Paths of everything `iter` yields, relative to `root`.
fn collect_relative(
    root: &Path,
    iter: impl Iterator<Item = Result<DirectoryEntry, Error>>,
) -> Vec<String> {
    iter.map(|entry| {
        let entry = entry.unwrap();
        entry.path().lexically_relative(root).generic_string()
    })
    .collect()
}

/// Returns `true` if permission bits are actually enforced for this process, they aren't for
/// root.
#[cfg(unix)]
fn permissions_enforced(temp: &tempfile::TempDir) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let locked = temp.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    let enforced = fs::read_dir(&locked).is_err();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    fs::remove_dir(&locked).unwrap();
    enforced
}

#[test]
fn flat_iteration_skips_dots() {
    init_tracing();
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    for name in ["a", "b", ".hidden"] {
        touch(&(&root / name), name);
    }
    mkdir(&(&root / "dir"));
    touch(&(&root / "dir" / "nested"), "");

    let names: BTreeSet<_> = collect_relative(&root, DirectoryIterator::new(&root).unwrap())
        .into_iter()
        .collect();
    let expected: BTreeSet<_> = [".hidden", "a", "b", "dir"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(names, expected);
}

#[test]
fn flat_iteration_cursor() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    touch(&(&root / "only"), "");

    let mut iter = DirectoryIterator::new(&root).unwrap();
    let copy = iter.clone();
    assert!(!iter.is_end());
    assert_eq!(iter, copy);
    assert_ne!(iter, DirectoryIterator::end());
    assert!(iter.entry().unwrap().is_regular_file().unwrap());

    // Clones share their position.
    iter.increment().unwrap();
    assert!(iter.is_end());
    assert!(copy.is_end());
    assert_eq!(iter, DirectoryIterator::end());

    let err = iter.increment().unwrap_err();
    assert_eq!(err.code(), Errc::InvalidArgument);

    let mut ec = ErrorCode::default();
    iter.increment_ec(&mut ec);
    assert_eq!(ec, Errc::InvalidArgument);
}

#[test]
fn clone_at_shared_end_rejects_increment() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    touch(&(&root / "only"), "");

    let mut a = DirectoryIterator::new(&root).unwrap();
    let mut b = a.clone();
    a.increment().unwrap();
    assert!(b.is_end());

    let err = b.increment().unwrap_err();
    assert_eq!(err.code(), Errc::InvalidArgument);
    let mut ec = ErrorCode::default();
    b.increment_ec(&mut ec);
    assert_eq!(ec, Errc::InvalidArgument);
    assert_eq!(b, DirectoryIterator::end());
}

#[test]
fn recursive_clone_at_shared_end_rejects_queries() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    touch(&(&root / "only"), "");

    let mut a = RecursiveDirectoryIterator::with_options(
        &root,
        DirectoryOptions::SKIP_PERMISSION_DENIED,
    )
    .unwrap();
    let mut b = a.clone();
    assert_eq!(b.options().unwrap(), DirectoryOptions::SKIP_PERMISSION_DENIED);

    a.increment().unwrap();
    assert!(a.is_end());
    assert!(b.is_end());

    assert_eq!(b.options().unwrap_err().code(), Errc::InvalidArgument);
    let mut ec = ErrorCode::default();
    assert_eq!(b.options_ec(&mut ec), DirectoryOptions::empty());
    assert_eq!(ec, Errc::InvalidArgument);
    assert_eq!(b.depth().unwrap_err().code(), Errc::InvalidArgument);
    assert_eq!(b.increment().unwrap_err().code(), Errc::InvalidArgument);
    assert_eq!(b.pop().unwrap_err().code(), Errc::InvalidArgument);
}

#[test]
fn independent_iterators_are_not_equal() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    touch(&(&root / "file"), "");

    let a = DirectoryIterator::new(&root).unwrap();
    let b = DirectoryIterator::new(&root).unwrap();
    assert_ne!(a, b);

    let empty = tempfile::TempDir::new().unwrap();
    let c = DirectoryIterator::new(&temp_root(&empty)).unwrap();
    assert!(c.is_end());
    assert_eq!(c, DirectoryIterator::default());
}

#[test]
fn missing_directory() {
    let temp = tempfile::TempDir::new().unwrap();
    let missing = temp_root(&temp) / "missing";

    let err = DirectoryIterator::new(&missing).unwrap_err();
    assert!(err.code().is_not_found());
    assert_eq!(err.path1(), Some(&missing));
    assert!(err.to_string().starts_with("directory_iterator::new: "));

    let mut ec = ErrorCode::default();
    let iter = RecursiveDirectoryIterator::new_ec(&missing, &mut ec);
    assert!(ec.is_err());
    assert!(iter.is_end());
}

#[test]
fn recursive_pre_order() {
    init_tracing();
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    mkdir(&(&root / "a"));
    mkdir(&(&root / "a" / "b"));
    touch(&(&root / "a" / "b" / "c"), "");
    touch(&(&root / "a" / "d"), "");
    mkdir(&(&root / "e"));

    let visited = collect_relative(&root, RecursiveDirectoryIterator::new(&root).unwrap());
    assert_eq!(visited.len(), 5);
    let unique: BTreeSet<_> = visited.iter().cloned().collect();
    assert_eq!(unique.len(), 5);

    // Every entry comes after its parent directory.
    let position = |name: &str| visited.iter().position(|v| v == name).unwrap();
    assert!(position("a") < position("a/b"));
    assert!(position("a/b") < position("a/b/c"));
    assert!(position("a") < position("a/d"));

    // And all of a directory's descendants are visited before its next sibling.
    let a = position("a");
    let e = position("e");
    let descendants = ["a/b", "a/b/c", "a/d"].map(position);
    if a < e {
        assert!(descendants.iter().all(|d| *d < e));
    } else {
        assert!(descendants.iter().all(|d| *d > e));
    }
}

#[test]
fn recursive_depth() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    mkdir(&(&root / "x"));
    mkdir(&(&root / "x" / "y"));
    touch(&(&root / "x" / "y" / "z"), "");

    let mut iter = RecursiveDirectoryIterator::new(&root).unwrap();
    assert_eq!(iter.options().unwrap(), DirectoryOptions::empty());
    let mut depths = Vec::new();
    while !iter.is_end() {
        let name = iter.entry().unwrap().path().filename().into_string();
        depths.push((name, iter.depth().unwrap()));
        iter.increment().unwrap();
    }
    assert_eq!(
        depths,
        vec![("x".to_string(), 0), ("y".to_string(), 1), ("z".to_string(), 2)]
    );

    let err = iter.depth().unwrap_err();
    assert_eq!(err.code(), Errc::InvalidArgument);
    let mut ec = ErrorCode::default();
    assert_eq!(iter.options_ec(&mut ec), DirectoryOptions::empty());
    assert_eq!(ec, Errc::InvalidArgument);
}

#[test]
fn pop_returns_to_end() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    mkdir(&(&root / "d1"));
    mkdir(&(&root / "d1" / "d2"));

    let mut iter = RecursiveDirectoryIterator::new(&root).unwrap();
    assert_eq!(iter.entry().unwrap().path(), &(&root / "d1"));

    iter.increment().unwrap();
    assert_eq!(iter.entry().unwrap().path(), &(&root / "d1" / "d2"));
    assert_eq!(iter.depth().unwrap(), 1);

    iter.pop().unwrap();
    assert!(iter.is_end());
    assert_eq!(iter, RecursiveDirectoryIterator::end());

    let err = iter.pop().unwrap_err();
    assert_eq!(err.code(), Errc::InvalidArgument);
    let mut ec = ErrorCode::default();
    iter.pop_ec(&mut ec);
    assert_eq!(ec, Errc::InvalidArgument);
}

#[test]
fn pop_continues_with_parent() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    mkdir(&(&root / "only"));
    for name in ["1", "2", "3"] {
        touch(&(&root / "only" / name), "");
    }

    let mut iter = RecursiveDirectoryIterator::new(&root).unwrap();
    iter.increment().unwrap();
    assert_eq!(iter.depth().unwrap(), 1);

    // The rest of `only` is skipped, and the root has nothing else.
    iter.pop().unwrap();
    assert!(iter.is_end());
}

#[test]
fn disable_recursion_pending() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    mkdir(&(&root / "skip"));
    touch(&(&root / "skip" / "hidden"), "");

    let mut iter = RecursiveDirectoryIterator::new(&root).unwrap();
    assert!(iter.recursion_pending());
    let first = iter.next().unwrap().unwrap();
    assert_eq!(first.path().filename(), "skip");

    // Applies to the entry `next` just returned.
    iter.disable_recursion_pending();
    assert!(!iter.recursion_pending());
    assert!(iter.next().is_none());
}

#[test]
fn lazy_iterator_pop() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    mkdir(&(&root / "a"));
    touch(&(&root / "a" / "1"), "");
    touch(&(&root / "a" / "2"), "");

    let mut iter = RecursiveDirectoryIterator::new(&root).unwrap();
    assert_eq!(iter.next().unwrap().unwrap().path().filename(), "a");
    let child = iter.next().unwrap().unwrap();
    assert_eq!(child.path().parent_path(), &root / "a");

    iter.pop().unwrap();
    assert!(iter.next().is_none());
}

#[cfg(unix)]
#[test]
fn symlinks_followed_only_when_asked() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    mkdir(&(&root / "real"));
    touch(&(&root / "real" / "file"), "");
    std::os::unix::fs::symlink((&root / "real").as_std_path(), (&root / "link").as_std_path())
        .unwrap();

    let visited: BTreeSet<_> =
        collect_relative(&root, RecursiveDirectoryIterator::new(&root).unwrap())
            .into_iter()
            .collect();
    let expected: BTreeSet<_> = ["link", "real", "real/file"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(visited, expected);

    let followed = RecursiveDirectoryIterator::with_options(
        &root,
        DirectoryOptions::FOLLOW_DIRECTORY_SYMLINK,
    )
    .unwrap();
    let visited: BTreeSet<_> = collect_relative(&root, followed).into_iter().collect();
    let expected: BTreeSet<_> = ["link", "link/file", "real", "real/file"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(visited, expected);
}

// Linux filesystems accept any bytes in a name, others may refuse to create the entry.
#[cfg(target_os = "linux")]
#[test]
fn non_unicode_names_are_skipped() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    init_tracing();
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    for name in ["a", "b", "c"] {
        touch(&(&root / name), "");
    }
    mkdir(&(&root / "d"));
    touch(&(&root / "d" / "e"), "");
    let bad = OsStr::from_bytes(b"bad\xff");
    fs::write(temp.path().join(bad), "").unwrap();
    fs::write(temp.path().join("d").join(bad), "").unwrap();

    let names: BTreeSet<_> = collect_relative(&root, DirectoryIterator::new(&root).unwrap())
        .into_iter()
        .collect();
    let expected: BTreeSet<_> = ["a", "b", "c", "d"].into_iter().map(String::from).collect();
    assert_eq!(names, expected);

    let walked: BTreeSet<_> =
        collect_relative(&root, RecursiveDirectoryIterator::new(&root).unwrap())
            .into_iter()
            .collect();
    let expected: BTreeSet<_> = ["a", "b", "c", "d", "d/e"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(walked, expected);
}

#[cfg(unix)]
#[test]
fn permission_denied() {
    use std::os::unix::fs::PermissionsExt;

    init_tracing();
    let temp = tempfile::TempDir::new().unwrap();
    if !permissions_enforced(&temp) {
        return;
    }
    let root = temp_root(&temp);
    let locked = &root / "locked";
    mkdir(&locked);
    touch(&(&locked / "secret"), "");
    fs::set_permissions(locked.as_std_path(), fs::Permissions::from_mode(0o000)).unwrap();

    let err = DirectoryIterator::new(&locked).unwrap_err();
    assert_eq!(err.code(), Errc::PermissionDenied);

    let mut ec = ErrorCode::default();
    let iter = DirectoryIterator::new_ec(&locked, &mut ec);
    assert_eq!(ec, Errc::PermissionDenied);
    assert_eq!(iter, DirectoryIterator::end());

    let iter =
        DirectoryIterator::with_options(&locked, DirectoryOptions::SKIP_PERMISSION_DENIED).unwrap();
    assert_eq!(iter, DirectoryIterator::end());

    // Descending into it fails the whole walk, unless skipped.
    let mut walk = RecursiveDirectoryIterator::new(&root).unwrap();
    let err = walk.increment().unwrap_err();
    assert_eq!(err.code(), Errc::PermissionDenied);
    assert_eq!(err.path1(), Some(&locked));
    assert!(walk.is_end());

    let walk =
        RecursiveDirectoryIterator::with_options(&root, DirectoryOptions::SKIP_PERMISSION_DENIED)
            .unwrap();
    assert_eq!(collect_relative(&root, walk), vec!["locked".to_string()]);

    fs::set_permissions(locked.as_std_path(), fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn type_hints_config() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    mkdir(&(&root / "dir"));

    let configs = configs();
    configs.update(&FS_DIRENT_TYPE_HINTS, false);
    let iter = DirectoryIterator::new(&root).unwrap();
    configs.update(&FS_DIRENT_TYPE_HINTS, true);

    // Without the hint the type is looked up on demand.
    assert!(iter.entry().unwrap().is_directory().unwrap());
    assert_eq!(
        iter.entry().unwrap().symlink_status().unwrap().file_type(),
        FileType::Directory
    );
}

#[test]
fn status_of_missing_path() {
    let temp = tempfile::TempDir::new().unwrap();
    let missing = temp_root(&temp) / "nope";

    assert_eq!(status(&missing).unwrap().file_type(), FileType::NotFound);
    assert_eq!(symlink_status(&missing).unwrap().file_type(), FileType::NotFound);
    assert!(!exists(&missing).unwrap());
    assert!(!is_directory(&missing).unwrap());

    let mut ec = ErrorCode::from(Errc::IoError);
    assert!(!exists_ec(&missing, &mut ec));
    assert!(ec.is_ok());

    let err = file_size(&missing).unwrap_err();
    assert!(err.code().is_not_found());
    assert_eq!(err.op(), "file_size");
    assert_eq!(file_size_ec(&missing, &mut ec), u64::MAX);
    assert!(ec.is_not_found());
    assert_eq!(last_write_time_ec(&missing, &mut ec), SystemTime::UNIX_EPOCH);
    assert_eq!(hard_link_count_ec(&missing, &mut ec), u64::MAX);
}

#[test]
fn file_size_errors() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    let file = &root / "file";
    touch(&file, "twelve bytes");

    assert_eq!(file_size(&file).unwrap(), 12);
    assert_eq!(file_size(&root).unwrap_err().code(), Errc::IsADirectory);

    resize_file(&file, 3).unwrap();
    assert_eq!(file_size(&file).unwrap(), 3);
    resize_file(&file, 100).unwrap();
    assert_eq!(file_size(&file).unwrap(), 100);
}

#[test]
fn create_and_remove() {
    init_tracing();
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);

    let deep = &root / "a" / "b" / "c";
    assert!(create_directories(&deep).unwrap());
    assert!(is_directory(&deep).unwrap());
    assert!(!create_directories(&deep).unwrap());
    assert!(!create_directory(&deep).unwrap());

    // A trailing separator names the same directory.
    assert!(create_directories(&(&root / "x" / "y/")).unwrap());
    assert!(is_directory(&(&root / "x" / "y")).unwrap());

    let file = &root / "file";
    touch(&file, "");
    let err = create_directories(&(&file / "sub")).unwrap_err();
    assert_eq!(err.code(), Errc::NotADirectory);
    assert_eq!(create_directory(&file).unwrap_err().code(), Errc::FileExists);

    assert!(create_directory_with_attributes(&(&root / "copy"), &deep).unwrap());
    assert_eq!(
        create_directory_with_attributes(&(&root / "bad"), &file)
            .unwrap_err()
            .code(),
        Errc::NotADirectory
    );

    assert!(remove(&file).unwrap());
    assert!(!remove(&file).unwrap());
    assert_eq!(
        remove(&(&root / "a")).unwrap_err().code(),
        Errc::DirectoryNotEmpty
    );

    touch(&(&root / "a" / "b" / "file"), "");
    // a, a/b, a/b/c, a/b/file
    assert_eq!(remove_all(&(&root / "a")).unwrap(), 4);
    assert!(!exists(&(&root / "a")).unwrap());
    assert_eq!(remove_all(&(&root / "a")).unwrap(), 0);
}

#[cfg(unix)]
#[test]
fn remove_all_does_not_follow_symlinks() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    let kept = &root / "kept";
    mkdir(&kept);
    touch(&(&kept / "file"), "");

    let doomed = &root / "doomed";
    mkdir(&doomed);
    create_directory_symlink(&kept, &(&doomed / "link")).unwrap();
    assert!(is_symlink(&(&doomed / "link")).unwrap());

    assert_eq!(remove_all(&doomed).unwrap(), 2);
    assert!(exists(&(&kept / "file")).unwrap());
}

#[test]
fn copy_files() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    let from = &root / "from";
    let to = &root / "to";
    touch(&from, "new contents");

    assert!(copy_file(&from, &to, CopyOptions::empty()).unwrap());
    assert_eq!(fs::read_to_string(to.as_std_path()).unwrap(), "new contents");

    touch(&to, "old");
    let err = copy_file(&from, &to, CopyOptions::empty()).unwrap_err();
    assert_eq!(err.code(), Errc::FileExists);
    assert_eq!(err.path1(), Some(&from));
    assert_eq!(err.path2(), Some(&to));

    assert!(!copy_file(&from, &to, CopyOptions::SKIP_EXISTING).unwrap());
    assert_eq!(fs::read_to_string(to.as_std_path()).unwrap(), "old");

    // `to` is newer than `from`.
    let past = SystemTime::now() - Duration::from_secs(3600);
    set_last_write_time(&from, past).unwrap();
    assert!(!copy_file(&from, &to, CopyOptions::UPDATE_EXISTING).unwrap());

    assert!(copy_file(&from, &to, CopyOptions::OVERWRITE_EXISTING).unwrap());
    assert_eq!(fs::read_to_string(to.as_std_path()).unwrap(), "new contents");

    assert_eq!(
        copy_file(&root, &(&root / "dir"), CopyOptions::empty())
            .unwrap_err()
            .code(),
        Errc::NotSupported
    );
    if cfg!(unix) {
        assert_eq!(
            copy_file(&from, &from, CopyOptions::OVERWRITE_EXISTING)
                .unwrap_err()
                .code(),
            Errc::FileExists
        );
    }
}

#[test]
fn copy_directories() {
    init_tracing();
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    let src = &root / "src";
    mkdir(&src);
    touch(&(&src / "top"), "top");
    mkdir(&(&src / "sub"));
    touch(&(&src / "sub" / "deep"), "deep");

    // Without options only the first level is copied.
    let shallow = &root / "shallow";
    copy(&src, &shallow, CopyOptions::empty()).unwrap();
    assert!(is_regular_file(&(&shallow / "top")).unwrap());
    assert!(!exists(&(&shallow / "sub")).unwrap());

    let full = &root / "full";
    copy(&src, &full, CopyOptions::RECURSIVE).unwrap();
    assert_eq!(
        fs::read_to_string((&full / "sub" / "deep").as_std_path()).unwrap(),
        "deep"
    );

    let dirs = &root / "dirs";
    copy(
        &src,
        &dirs,
        CopyOptions::RECURSIVE | CopyOptions::DIRECTORIES_ONLY,
    )
    .unwrap();
    assert!(is_directory(&(&dirs / "sub")).unwrap());
    assert!(!exists(&(&dirs / "top")).unwrap());

    // A file copied into a directory keeps its name.
    copy(&(&src / "top"), &dirs, CopyOptions::empty()).unwrap();
    assert!(is_regular_file(&(&dirs / "top")).unwrap());

    let err = copy(&(&root / "missing"), &dirs, CopyOptions::empty()).unwrap_err();
    assert_eq!(err.code(), Errc::NotSupported);
}

#[cfg(unix)]
#[test]
fn copy_and_read_symlinks() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    let target = &root / "target";
    touch(&target, "");
    let link = &root / "link";
    create_symlink(&Path::new("target"), &link).unwrap();

    assert_eq!(read_symlink(&link).unwrap(), "target");
    assert!(is_symlink(&link).unwrap());
    assert!(is_regular_file(&link).unwrap());

    let copied = &root / "copied";
    copy_symlink(&link, &copied).unwrap();
    assert_eq!(read_symlink(&copied).unwrap(), "target");

    let err = copy(&link, &(&root / "other"), CopyOptions::SKIP_SYMLINKS);
    assert!(err.is_ok());
    assert!(!exists(&(&root / "other")).unwrap());

    let err = read_symlink(&target).unwrap_err();
    assert_eq!(err.code(), Errc::InvalidArgument);
}

#[test]
fn links_and_equivalence() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    let file = &root / "file";
    let link = &root / "hard";
    touch(&file, "");

    assert_eq!(hard_link_count(&file).unwrap(), 1);
    create_hard_link(&file, &link).unwrap();

    if cfg!(unix) {
        assert_eq!(hard_link_count(&file).unwrap(), 2);
        assert!(equivalent(&file, &link).unwrap());
        assert!(equivalent(&root, &(&root / ".")).unwrap());
        assert!(!equivalent(&file, &root).unwrap());
    }

    let missing = &root / "missing";
    assert!(!equivalent(&file, &missing).unwrap());
    let err = equivalent(&missing, &(&root / "also-missing")).unwrap_err();
    assert_eq!(err.code(), Errc::NoSuchFileOrDirectory);
}

#[test]
fn rename_files() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    let from = &root / "from";
    let to = &root / "to";
    touch(&from, "data");

    rename(&from, &to).unwrap();
    assert!(!exists(&from).unwrap());
    assert_eq!(fs::read_to_string(to.as_std_path()).unwrap(), "data");

    let mut ec = ErrorCode::default();
    rename_ec(&from, &to, &mut ec);
    assert!(ec.is_not_found());
}

#[cfg(unix)]
#[test]
fn change_permissions() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    let file = &root / "file";
    touch(&file, "");

    let perms = Perms::OWNER_READ | Perms::OWNER_WRITE;
    permissions(&file, perms, PermOptions::REPLACE).unwrap();
    assert_eq!(status(&file).unwrap().permissions(), perms);

    permissions(&file, Perms::GROUP_READ, PermOptions::ADD).unwrap();
    assert_eq!(status(&file).unwrap().permissions(), perms | Perms::GROUP_READ);

    permissions(&file, Perms::OWNER_WRITE, PermOptions::REMOVE).unwrap();
    assert_eq!(
        status(&file).unwrap().permissions(),
        Perms::OWNER_READ | Perms::GROUP_READ
    );

    let err = permissions(&file, perms, PermOptions::ADD | PermOptions::REMOVE).unwrap_err();
    assert_eq!(err.code(), Errc::InvalidArgument);
    let err = permissions(&file, perms, PermOptions::empty()).unwrap_err();
    assert_eq!(err.code(), Errc::InvalidArgument);

    // Not following a symlink works for anything that isn't one.
    permissions(&file, Perms::ALL, PermOptions::REPLACE | PermOptions::NOFOLLOW).unwrap();
    assert_eq!(status(&file).unwrap().permissions(), Perms::ALL);

    let link = &root / "link";
    create_symlink(&file, &link).unwrap();
    let mut ec = ErrorCode::default();
    permissions_ec(
        &link,
        Perms::OWNER_READ,
        PermOptions::REPLACE | PermOptions::NOFOLLOW,
        &mut ec,
    );
    assert_eq!(ec, Errc::NotSupported);
    assert_eq!(status(&file).unwrap().permissions(), Perms::ALL);
}

#[test]
fn write_times() {
    let temp = tempfile::TempDir::new().unwrap();
    let file = temp_root(&temp) / "file";
    touch(&file, "");

    let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
    set_last_write_time(&file, when).unwrap();
    assert_eq!(last_write_time(&file).unwrap(), when);
    assert_eq!(DirectoryEntry::new(file).unwrap().last_write_time().unwrap(), when);
}

#[test]
fn emptiness() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    assert!(is_empty(&root).unwrap());

    let file = &root / "file";
    touch(&file, "");
    assert!(is_empty(&file).unwrap());
    assert!(!is_empty(&root).unwrap());

    touch(&file, "x");
    assert!(!is_empty(&file).unwrap());

    let err = is_empty(&(&root / "missing")).unwrap_err();
    assert_eq!(err.code(), Errc::NoSuchFileOrDirectory);
}

#[cfg(unix)]
#[test]
fn sockets_are_other() {
    let temp = tempfile::TempDir::new().unwrap();
    let socket = temp_root(&temp) / "sock";
    let _listener = std::os::unix::net::UnixListener::bind(socket.as_std_path()).unwrap();

    assert!(is_socket(&socket).unwrap());
    assert!(is_other(&socket).unwrap());
    assert!(!is_fifo(&socket).unwrap());
    assert!(!is_block_file(&socket).unwrap());
    assert!(!is_character_file(&socket).unwrap());
    assert_eq!(file_size(&socket).unwrap_err().code(), Errc::NotSupported);
    assert_eq!(is_empty(&socket).unwrap_err().code(), Errc::NotSupported);

    let entry = DirectoryEntry::new(socket).unwrap();
    assert!(entry.is_socket().unwrap());
    assert!(entry.is_other().unwrap());
}

#[test]
fn paths_against_the_filesystem() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = canonical(&temp_root(&temp)).unwrap();
    mkdir(&(&root / "a"));
    mkdir(&(&root / "a" / "b"));

    let cwd = current_path().unwrap();
    assert!(cwd.is_absolute());
    set_current_path(&cwd).unwrap();
    assert_eq!(absolute(&Path::new("x")).unwrap(), cwd.join(&Path::new("x")));
    assert_eq!(absolute(&root).unwrap(), root);

    assert_eq!(canonical(&(&root / "a" / "." / "b" / "..")).unwrap(), &root / "a");
    assert!(canonical(&(&root / "missing")).unwrap_err().code().is_not_found());

    assert_eq!(
        weakly_canonical(&(&root / "a" / "missing" / ".." / "c")).unwrap(),
        &root / "a" / "c"
    );
    assert_eq!(weakly_canonical(&(&root / "a" / "b")).unwrap(), &root / "a" / "b");

    assert_eq!(relative(&(&root / "a" / "b"), &root).unwrap(), "a/b");
    assert_eq!(relative(&root, &(&root / "a" / "b")).unwrap(), "../..");
    assert_eq!(
        proximate(&(&root / "a" / "d"), &(&root / "a" / "b" / "c")).unwrap(),
        "../../d"
    );
}

#[test]
fn filesystem_space() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);

    let mut ec = ErrorCode::default();
    let info = space_ec(&root, &mut ec);
    if ec.is_ok() {
        assert!(info.capacity >= info.free);
        assert!(info.free >= info.available);
    } else {
        assert_eq!(info, SpaceInfo::UNKNOWN);
    }
}

#[test]
fn temp_directory_override() {
    let temp = tempfile::TempDir::new().unwrap();
    let root = temp_root(&temp);
    let file = &root / "file";
    touch(&file, "");

    let configs = configs();
    configs
        .try_update(FS_TEMP_DIRECTORY.name(), root.as_str())
        .unwrap();
    assert_eq!(temp_directory_path().unwrap(), root);

    configs
        .try_update(FS_TEMP_DIRECTORY.name(), file.as_str())
        .unwrap();
    let mut ec = ErrorCode::default();
    assert!(temp_directory_path_ec(&mut ec).is_empty());
    assert_eq!(ec, Errc::NotADirectory);

    configs.update(&FS_TEMP_DIRECTORY, "");
}
