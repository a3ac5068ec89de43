//! Recognize files which operating systems and tools leave behind.

use std::sync::LazyLock;

use regex::Regex;

const IGNORE_LIST: &[&str] = &[
    // package manager debug logs
    r"^pnpm-debug\.log$",
    r"^yarn-debug\.log$",
    r"^npm-debug\.log$",
    // vim swap files
    r"^\..*\.swp$",
    // macOS
    r"^\.DS_Store$",
    r"^\.AppleDouble$",
    r"^\.LSOverride$",
    "^Icon\r$",
    r"^\._.*",
    r"^\.Spotlight-V100(?:$|/)",
    r"\.Trashes",
    r"^__MACOSX$",
    // backup files
    r"~$",
    // Windows
    r"^Thumbs\.db$",
    r"^ehthumbs\.db$",
    r"^Desktop\.ini$",
    // Synology thumbnail directories
    r"@eaDir$",
];

static JUNK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&IGNORE_LIST.join("|")).expect("Invalid junk file regex"));

/// Returns `true` if `filename` is a junk file such as `.DS_Store` or `Thumbs.db`.
///
/// ```
/// # use globber::is_junk;
/// assert!(is_junk(".DS_Store"));
/// assert!(!is_junk("notes.txt"));
/// ```
pub fn is_junk(filename: &str) -> bool {
    JUNK.is_match(filename)
}

/// The inverse of [`is_junk`].
pub fn is_not_junk(filename: &str) -> bool {
    !is_junk(filename)
}

#[test]
fn test_junk() {
    let junk = [
        ".DS_Store",
        ".AppleDouble",
        ".LSOverride",
        "Icon\r",
        "._test",
        ".Spotlight-V100",
        ".Spotlight-V100/Store-V2/C6DBF25D-81D4-4B57-907E-B4A555E72C90/0.directoryStoreFile",
        ".Trashes",
        "__MACOSX",
        "test~",
        "Thumbs.db",
        "ehthumbs.db",
        "Desktop.ini",
        "npm-debug.log",
        "pnpm-debug.log",
        "yarn-debug.log",
        ".test.swp",
        "@eaDir",
    ];

    for name in junk {
        assert!(is_junk(name), "{name:?} should be junk");
    }
}

#[test]
fn test_not_junk() {
    for name in ["test", "Icon", "Icons.woff", ".Spotlight-V100-unicorn"] {
        assert!(is_not_junk(name), "{name:?} should not be junk");
    }
}
