//! Path string normalization.
//!
//! Paths handled by this crate are plain strings using `/` as the only separator, regardless of
//! the host platform.

/// The separator used in all normalized paths.
pub const SEPARATOR: char = '/';

/// Extended-length and device path prefixes, in their raw and their normalized form.
const UNC_PREFIXES: [&str; 4] = ["\\\\?\\", "\\\\.\\", "//?/", "//./"];

/// Normalize slashes in a path to forward slashes, condense repeated slashes and, when
/// `strip_trailing` is set, remove trailing slashes.
///
/// Extended-length (`\\?\`) and device (`\\.\`) prefixes keep their leading double slash. Like
/// `/`, such a prefix on its own keeps its trailing slash.
///
/// ```
/// # use globber::normalize_path;
/// assert_eq!(normalize_path("E://foo//bar\\baz//", true), "E:/foo/bar/baz");
/// assert_eq!(normalize_path("foo\\bar\\", false), "foo/bar/");
/// assert_eq!(normalize_path("\\\\?\\C:\\docs", true), "//?/C:/docs");
/// ```
pub fn normalize_path(path: &str, strip_trailing: bool) -> String {
    if path == "\\" || path == "/" {
        return "/".to_string();
    }

    if path.chars().count() <= 1 {
        return path.to_string();
    }

    if UNC_PREFIXES.contains(&path) {
        return path.replace('\\', "/");
    }

    let (prefix, rest) = match path.get(..4) {
        Some(head) if path.len() > 4 && UNC_PREFIXES.contains(&head) => ("//", &path[2..]),
        _ => ("", path),
    };

    let mut segments: Vec<&str> = rest.split(['/', '\\']).collect();
    // runs of separators produce empty segments, keep only a leading one
    let mut normalized = Vec::with_capacity(segments.len());
    let last_empty = segments.last().is_some_and(|s| s.is_empty()) && segments.len() > 1;
    if last_empty {
        segments.pop();
    }
    for (index, segment) in segments.into_iter().enumerate() {
        if segment.is_empty() && index != 0 {
            continue;
        }
        normalized.push(segment);
    }

    let mut result = format!("{prefix}{}", normalized.join("/"));
    if last_empty && !strip_trailing && !result.ends_with(SEPARATOR) {
        result.push(SEPARATOR);
    }
    result
}

/// Normalize a path and resolve `.` and `..` segments lexically.
///
/// An empty result becomes `.`. Trailing slashes are kept unless `strip_trailing` is set. `/`,
/// `//?/` and `//./` are roots, `..` never climbs above them.
///
/// ```
/// # use globber::normalize;
/// assert_eq!(normalize("./src/../lib/", false), "lib/");
/// assert_eq!(normalize("\\\\?\\C:\\..\\..\\x", true), "//?/x");
/// ```
pub fn normalize(path: &str, strip_trailing: bool) -> String {
    let path = normalize_path(path, strip_trailing);
    if path.is_empty() {
        return ".".to_string();
    }

    let (prefix, rest) = match path.get(..4) {
        Some(root @ ("//?/" | "//./")) => (root, &path[4..]),
        _ => match path.strip_prefix(SEPARATOR) {
            Some(rest) => ("/", rest),
            None => ("", path.as_str()),
        },
    };
    let trailing = rest.ends_with(SEPARATOR);

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split(SEPARATOR) {
        match segment {
            "" | "." => (),
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // `..` above the root of an absolute path stays at the root
                _ if !prefix.is_empty() => (),
                _ => segments.push(".."),
            },
            segment => segments.push(segment),
        }
    }

    let mut result = format!("{prefix}{}", segments.join("/"));
    if result.is_empty() {
        result.push('.');
    }
    if trailing && !result.ends_with(SEPARATOR) {
        result.push(SEPARATOR);
    }
    result
}

/// Normalize a directory path, optionally ending it with a single trailing slash.
pub fn normalize_directory(directory: &str, trailing_slash: bool) -> String {
    let mut directory = normalize(directory, true);
    if trailing_slash && !directory.ends_with(SEPARATOR) {
        directory.push(SEPARATOR);
    }
    directory
}

/// Get the normalized path from either a plain path or a `file:` URL.
///
/// ```
/// # use globber::get_path;
/// assert_eq!(get_path("file:///home/user/project/"), "/home/user/project/");
/// assert_eq!(get_path("C:\\Users\\me"), "C:/Users/me");
/// ```
pub fn get_path(path: &str) -> String {
    match path.strip_prefix("file:") {
        Some(url) => {
            // drop the (usually empty) authority of `file://host/path`
            let url = match url.strip_prefix("//") {
                Some(rest) => rest.find(SEPARATOR).map(|pos| &rest[pos..]).unwrap_or("/"),
                None => url,
            };
            // a query or fragment is not part of the pathname
            let end = url.find(['?', '#']).unwrap_or(url.len());
            url[..end].to_string()
        }
        None => normalize(path, false),
    }
}

/// Join a normalized directory and an entry name.
pub(crate) fn join(directory: &str, name: &str) -> String {
    if directory.ends_with(SEPARATOR) {
        format!("{directory}{name}")
    } else {
        format!("{directory}{SEPARATOR}{name}")
    }
}

/// The last segment of a normalized path.
pub(crate) fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(pos) => &trimmed[(pos + 1)..],
        None => trimmed,
    }
}

/// The lexical path from `from` to `to`, both normalized and absolute. Equal paths give an empty
/// string.
pub(crate) fn relative(from: &str, to: &str) -> String {
    let from: Vec<&str> = from.split(SEPARATOR).filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to.split(SEPARATOR).filter(|s| !s.is_empty()).collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = vec![".."; from.len() - common];
    segments.extend_from_slice(&to[common..]);
    segments.join("/")
}

#[test]
fn test_single_slash() {
    assert_eq!(normalize_path("/", false), "/");
    assert_eq!(normalize_path("/", true), "/");
    assert_eq!(normalize_path("\\", false), "/");
    assert_eq!(normalize_path("\\", true), "/");
}

#[test]
fn test_strip_trailing() {
    let units = [
        ("../../foo/bar", "../../foo/bar"),
        ("..\\..\\foo/bar", "../../foo/bar"),
        ("..\\\\..\\\\foo/bar", "../../foo/bar"),
        ("//foo/bar\\baz", "/foo/bar/baz"),
        ("//foo\\bar\\baz", "/foo/bar/baz"),
        ("/user/docs/Letter.txt", "/user/docs/Letter.txt"),
        ("\\?\\C:\\user\\docs\\Letter.txt", "/?/C:/user/docs/Letter.txt"),
        (
            "\\?\\UNC\\Server01\\user\\docs\\Letter.txt",
            "/?/UNC/Server01/user/docs/Letter.txt",
        ),
        ("\\\\.\\CdRomX", "//./CdRomX"),
        ("\\\\.\\PhysicalDiskX", "//./PhysicalDiskX"),
        ("\\\\?\\C:\\user\\docs\\Letter.txt", "//?/C:/user/docs/Letter.txt"),
        (
            "\\\\?\\UNC\\Server01\\user\\docs\\Letter.txt",
            "//?/UNC/Server01/user/docs/Letter.txt",
        ),
        ("\\Server01\\user\\docs\\Letter.txt", "/Server01/user/docs/Letter.txt"),
        ("C:\\user\\docs\\Letter.txt", "C:/user/docs/Letter.txt"),
        (
            "C:\\user\\docs\\somefile.ext:alternate_stream_name",
            "C:/user/docs/somefile.ext:alternate_stream_name",
        ),
        ("C:Letter.txt", "C:Letter.txt"),
        ("E://foo//bar//baz", "E:/foo/bar/baz"),
        ("E://foo//bar//baz//", "E:/foo/bar/baz"),
        ("E://foo//bar//baz//////", "E:/foo/bar/baz"),
        ("E://foo/bar\\baz", "E:/foo/bar/baz"),
        ("E://foo\\bar\\baz", "E:/foo/bar/baz"),
        ("E:/foo/bar/baz/", "E:/foo/bar/baz"),
        ("E:/foo/bar/baz///", "E:/foo/bar/baz"),
        ("E:\\\\foo/bar\\baz", "E:/foo/bar/baz"),
        ("foo\\bar\\baz", "foo/bar/baz"),
        ("foo\\bar\\baz\\", "foo/bar/baz"),
        ("foo\\bar\\baz\\\\\\", "foo/bar/baz"),
    ];

    for (input, expected) in units {
        assert_eq!(normalize_path(input, true), expected, "input: {input:?}");
    }
}

#[test]
fn test_keep_trailing() {
    let units = [
        ("\\", "/"),
        ("foo\\bar\\baz\\", "foo/bar/baz/"),
        ("foo\\\\bar\\\\baz\\\\", "foo/bar/baz/"),
        ("foo//bar//baz//", "foo/bar/baz/"),
        ("foo/bar/baz/", "foo/bar/baz/"),
        ("./foo/bar/baz/", "./foo/bar/baz/"),
    ];

    for (input, expected) in units {
        assert_eq!(normalize_path(input, false), expected, "input: {input:?}");
    }
}

#[test]
fn test_idempotent() {
    let inputs = [
        "",
        "a",
        "/",
        "\\\\?\\C:\\user\\docs\\Letter.txt",
        "\\\\.\\CdRomX",
        "\\?\\C:\\user",
        "//foo/bar\\baz",
        "E://foo//bar//baz//",
        "foo\\\\bar\\\\baz\\\\",
        "./foo/../bar",
        "\\\\?\\",
        "//./",
    ];

    for input in inputs {
        for strip in [true, false] {
            let once = normalize_path(input, strip);
            assert_eq!(normalize_path(&once, strip), once, "input: {input:?}");
        }
    }
}

#[test]
fn test_normalize_idempotent() {
    let inputs = [
        "",
        ".",
        "./",
        "..",
        "/",
        "/..",
        "/../a",
        "../a/./b/",
        "./foo/../bar/",
        "C:\\a\\..\\..\\b",
        "//?/../x",
        "//./a/..",
        "//./a/../",
        "\\\\?\\C:\\..\\x",
        "\\\\.\\CdRomX\\..",
        "\\\\?\\",
        "//foo/../..",
    ];

    for input in inputs {
        for strip in [true, false] {
            let once = normalize(input, strip);
            assert_eq!(normalize(&once, strip), once, "input: {input:?}");
        }
    }
}

#[test]
fn test_normalize() {
    assert_eq!(normalize("", true), ".");
    assert_eq!(normalize("./foo/../bar/", false), "bar/");
    assert_eq!(normalize("./foo/../bar/", true), "bar");
    assert_eq!(normalize("../a/./b", true), "../a/b");
    assert_eq!(normalize("/../a", true), "/a");
    assert_eq!(normalize("C:\\a\\..\\b", true), "C:/b");

    // extended-length and device prefixes are roots
    assert_eq!(normalize("//?/../x", true), "//?/x");
    assert_eq!(normalize("//./a/..", true), "//./");
    assert_eq!(normalize("//./a/../", false), "//./");
    assert_eq!(normalize("\\\\?\\C:\\..\\..\\x", false), "//?/x");
    assert_eq!(normalize("\\\\?\\C:\\docs\\..\\x", true), "//?/C:/x");

    assert_eq!(normalize_directory("", true), "./");
    assert_eq!(normalize_directory("/", true), "/");
    assert_eq!(normalize_directory("/tmp/x//", false), "/tmp/x");
    assert_eq!(normalize_directory("/tmp/x", true), "/tmp/x/");
}

#[test]
fn test_get_path() {
    assert_eq!(get_path("file:///tmp/project"), "/tmp/project");
    assert_eq!(get_path("file://localhost/tmp/a?x=1"), "/tmp/a");
    assert_eq!(get_path("file:/tmp"), "/tmp");
    assert_eq!(get_path("./src/../lib"), "lib");
}

#[test]
fn test_relative_join_basename() {
    assert_eq!(relative("/root", "/root"), "");
    assert_eq!(relative("/root", "/root/sub/c.ts"), "sub/c.ts");
    assert_eq!(relative("/root/sub", "/root/other"), "../other");
    assert_eq!(relative("/", "/etc"), "etc");

    assert_eq!(join("/", "etc"), "/etc");
    assert_eq!(join("/root", "a.ts"), "/root/a.ts");

    assert_eq!(basename("/root/sub/"), "sub");
    assert_eq!(basename("a.ts"), "a.ts");
    assert_eq!(basename("/"), "");
}
