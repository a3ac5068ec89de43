use std::fs;
use std::path::Path;

use globber::{ConfigError, Entry, Error, MatchFlag, WalkOptions, walk};

/// `root/{a.ts, b.md, sub/{c.ts, .hidden}}`
fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.ts"), "export {};\n").unwrap();
    fs::write(root.join("b.md"), "# b\n").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub/c.ts"), "export {};\n").unwrap();
    fs::write(root.join("sub/.hidden"), "").unwrap();
    dir
}

/// The walked directory with symlinks resolved, so resolved entry paths stay below it.
fn cwd(dir: &tempfile::TempDir) -> std::path::PathBuf {
    fs::canonicalize(dir.path()).unwrap()
}

fn sorted_relatives(options: WalkOptions) -> Vec<String> {
    let mut found: Vec<String> = walk(options)
        .unwrap()
        .map(|entry| entry.unwrap().relative().to_string())
        .collect();
    // directory listing order is up to the host
    found.sort();
    found
}

#[test]
fn walk_with_extensions() {
    let dir = project();
    let options = WalkOptions::new(cwd(&dir)).extensions([".ts"]);
    assert_eq!(sorted_relatives(options), ["a.ts", "sub/c.ts"]);
}

#[test]
fn walk_excluding_directories() {
    let dir = project();
    let options = WalkOptions::new(cwd(&dir))
        .exclude_directories(true)
        .exclude(["sub/**"]);
    assert_eq!(sorted_relatives(options), ["a.ts", "b.md"]);
}

#[test]
fn walk_everything() {
    let dir = project();
    let options = WalkOptions::new(cwd(&dir)).add_flags(MatchFlag::DOT);
    assert_eq!(
        sorted_relatives(options),
        ["./", "a.ts", "b.md", "sub/", "sub/.hidden", "sub/c.ts"]
    );
}

#[test]
fn entry_paths() {
    let dir = project();
    let root = cwd(&dir);
    let entries: Vec<Entry> = walk(WalkOptions::new(&root).include(["sub/c.ts"]))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.name(), "c.ts");
    assert_eq!(entry.relative(), "sub/c.ts");
    assert_eq!(entry.path(), root.join("sub").join("c.ts"));
    assert!(entry.is_file());
    assert!(!entry.is_symlink());
}

#[test]
fn max_depth_zero_yields_root_only() {
    let dir = project();
    let entries: Vec<Entry> = walk(WalkOptions::new(cwd(&dir)).max_depth(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].relative(), "./");
    assert!(entries[0].is_dir());
}

#[test]
fn excluded_directory_is_pruned() {
    let dir = project();
    let options = WalkOptions::new(cwd(&dir))
        .include(["**/*.ts"])
        .exclude(["sub"]);
    assert_eq!(sorted_relatives(options), ["a.ts"]);
}

#[test]
fn exclude_both_is_rejected() {
    let options = WalkOptions::new("/definitely/not/there")
        .exclude_directories(true)
        .exclude_files(true);
    assert!(matches!(walk(options).err(), Some(Error::Config(ConfigError::ExcludeBoth))));
}

#[test]
fn missing_directory_is_a_traversal_error() {
    let dir = project();
    let missing = cwd(&dir).join("missing");
    let results: Vec<_> = walk(WalkOptions::new(&missing).exclude_directories(true))
        .unwrap()
        .collect();

    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(Error::Traversal(err)) => {
            assert_eq!(Path::new(err.root()), missing);
            assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn symlinks() {
    use std::os::unix::fs::symlink;

    let dir = project();
    let root = cwd(&dir);
    symlink(root.join("sub/c.ts"), root.join("alias.ts")).unwrap();
    symlink(&root, root.join("sub/loop")).unwrap();

    let followed: Vec<Entry> = walk(WalkOptions::new(&root).exclude_directories(true))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let mut found: Vec<(&str, bool)> = followed
        .iter()
        .map(|entry| (entry.relative(), entry.is_symlink()))
        .collect();
    found.sort();
    // `sub/loop` points back at the walked directory and is not entered again
    assert_eq!(
        found,
        [
            ("a.ts", false),
            ("b.md", false),
            ("sub/c.ts", false),
            ("sub/c.ts", true)
        ]
    );

    let options = WalkOptions::new(&root)
        .exclude_directories(true)
        .follow_symlinks(false);
    assert_eq!(sorted_relatives(options), ["a.ts", "b.md", "sub/c.ts"]);
}

// other unix filesystems may refuse names which are not valid UTF-8
#[cfg(target_os = "linux")]
#[test]
fn non_utf8_names_are_skipped() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = project();
    let root = cwd(&dir);
    let bad = root.join(OsStr::from_bytes(b"bad\xff"));
    fs::create_dir(&bad).unwrap();
    fs::write(bad.join("x.ts"), "").unwrap();
    fs::write(root.join(OsStr::from_bytes(b"y\xfe.ts")), "").unwrap();
    fs::write(root.join("zz.ts"), "").unwrap();

    let options = WalkOptions::new(&root).extensions([".ts"]);
    assert_eq!(sorted_relatives(options), ["a.ts", "sub/c.ts", "zz.ts"]);
}
