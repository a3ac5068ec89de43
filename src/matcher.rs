//! Compose glob, regex and predicate patterns into a single match decision.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use regex::Regex;

use crate::error::ConfigError;
use crate::glob::{Glob, GlobFlag};
use crate::junk::is_junk;
use crate::normalize::{SEPARATOR, basename};

/// Signature of a predicate pattern.
pub type MatchFn = dyn Fn(&str) -> bool + Send + Sync;

#[rustfmt::skip]
bitflags! {
    /// These flags influence which paths a [`Matcher`] accepts.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MatchFlag: u16 {
        /// Treat a leading `!` as part of the glob instead of a veto.
        const DISABLE_NEGATION          = 0x00_01;

        /// Do not turn a glob ending in `/` into `dir/**/*`.
        const DISABLE_GLOB_EXPANSION    = 0x00_02;

        /// Compile globs case insensitively. Regex and predicate patterns are unaffected.
        const CASE_INSENSITIVE          = 0x00_04;

        /// Allow paths where any segment starts with a dot.
        const DOT                       = 0x01_00;

        /// Allow junk files, see [`is_junk`](crate::is_junk).
        const JUNK                      = 0x02_00;

        /// Treat `?(..)`, `*(..)`, `+(..)`, `@(..)`, `!(..)` and `{a,b}` literally.
        const DISABLE_EXTENDED_GLOBBING = 0x04_00;
    }
}

/// A single pattern in a [`Matcher`].
#[derive(Clone)]
pub enum MatchPattern {
    /// A glob, optionally negated with a leading `!`.
    Glob(String),

    /// A regular expression, tested with unanchored search semantics.
    Regex(Regex),

    /// An arbitrary predicate over the path.
    Predicate(Arc<MatchFn>),
}

impl MatchPattern {
    pub fn glob(glob: impl Into<String>) -> Self {
        MatchPattern::Glob(glob.into())
    }

    pub fn predicate<F>(func: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        MatchPattern::Predicate(Arc::new(func))
    }
}

impl fmt::Debug for MatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatchPattern::Glob(glob) => f.debug_tuple("Glob").field(glob).finish(),
            MatchPattern::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            MatchPattern::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for MatchPattern {
    fn from(glob: &str) -> Self {
        MatchPattern::Glob(glob.to_string())
    }
}

impl From<String> for MatchPattern {
    fn from(glob: String) -> Self {
        MatchPattern::Glob(glob)
    }
}

impl From<Regex> for MatchPattern {
    fn from(regex: Regex) -> Self {
        MatchPattern::Regex(regex)
    }
}

/// Options shared by every pattern of a [`Matcher`].
#[derive(Clone, Debug, Default)]
pub struct MatcherConfig {
    flags: MatchFlag,
    extensions: Option<Vec<String>>,
}

impl MatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the match flags to a specific value.
    pub fn flags(mut self, flags: MatchFlag) -> Self {
        self.flags = flags;
        self
    }

    /// Builder method to add flag bits to the already present ones.
    pub fn add_flags(mut self, flags: MatchFlag) -> Self {
        self.flags.insert(flags);
        self
    }

    /// Builder method to remove match flag bits.
    pub fn remove_flags(mut self, flags: MatchFlag) -> Self {
        self.flags.remove(flags);
        self
    }

    /// Builder method to only accept paths ending in one of `extensions`.
    ///
    /// `ts` and `.ts` are equivalent. An empty list removes the filter.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extensions: Vec<String> = extensions
            .into_iter()
            .map(Into::into)
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();

        self.extensions = if extensions.is_empty() {
            None
        } else {
            Some(extensions)
        };
        self
    }

    /// Directly access the match flags.
    pub fn match_flags(&self) -> MatchFlag {
        self.flags
    }

    /// The normalized extension filter, if any.
    pub fn extension_list(&self) -> Option<&[String]> {
        self.extensions.as_deref()
    }

    fn glob_flags(&self) -> GlobFlag {
        let mut flags = GlobFlag::empty();
        if self.flags.intersects(MatchFlag::CASE_INSENSITIVE) {
            flags.insert(GlobFlag::IGNORE_CASE);
        }
        if !self.flags.intersects(MatchFlag::DISABLE_EXTENDED_GLOBBING) {
            flags.insert(GlobFlag::EXTENDED);
        }
        flags
    }
}

enum Compiled {
    Glob { glob: Glob, negated: bool },
    Regex(Regex),
    Predicate(Arc<MatchFn>),
}

impl Compiled {
    fn new(pattern: MatchPattern, config: &MatcherConfig) -> Result<Option<Self>, ConfigError> {
        let source = match pattern {
            MatchPattern::Glob(source) => source,
            MatchPattern::Regex(regex) => return Ok(Some(Compiled::Regex(regex))),
            MatchPattern::Predicate(func) => return Ok(Some(Compiled::Predicate(func))),
        };

        if source.is_empty() {
            return Ok(None);
        }

        // with negation disabled the `!` is dropped and the glob acts positively
        let (glob, negated) = match source.strip_prefix('!') {
            Some(rest) => (rest, !config.flags.intersects(MatchFlag::DISABLE_NEGATION)),
            None => (source.as_str(), false),
        };

        let expand = glob.ends_with(SEPARATOR)
            && !config.flags.intersects(MatchFlag::DISABLE_GLOB_EXPANSION);
        let glob = if expand {
            format!("{glob}**/*")
        } else {
            glob.to_string()
        };

        // errors name the pattern as it was given, not its expansion
        let glob = Glob::new(&glob, config.glob_flags()).map_err(|err| ConfigError::Pattern {
            pattern: source.clone(),
            source: err,
        })?;

        Ok(Some(Compiled::Glob { glob, negated }))
    }

    fn matches(&self, source: &str) -> bool {
        match self {
            Compiled::Glob { glob, .. } => glob.matches(source),
            Compiled::Regex(regex) => regex.is_match(source),
            Compiled::Predicate(func) => func(source),
        }
    }

    fn is_negated(&self) -> bool {
        matches!(self, Compiled::Glob { negated: true, .. })
    }
}

struct Inner {
    patterns: Vec<Compiled>,
    flags: MatchFlag,
    extensions: Option<Vec<String>>,
}

/// A compiled list of patterns deciding whether a slash separated path matches.
///
/// Positive matches accumulate while a matching negated glob vetoes the whole result:
///
/// ```
/// # use globber::{MatchFlag, Matcher, MatcherConfig};
/// let matcher = Matcher::new(["**/*.ts", "!**/*.d.ts"], &MatcherConfig::new()).unwrap();
/// assert!(matcher.matches("src/lib.ts"));
/// assert!(!matcher.matches("src/lib.d.ts"));
///
/// let config = MatcherConfig::new().add_flags(MatchFlag::DISABLE_NEGATION);
/// let matcher = Matcher::new(["**/*.ts", "!**/*.d.ts"], &config).unwrap();
/// assert!(matcher.matches("src/lib.d.ts"));
/// ```
///
/// Cloning is cheap and a matcher can be shared between threads.
#[derive(Clone)]
pub struct Matcher {
    inner: Arc<Inner>,
}

impl Matcher {
    /// Compile `patterns`. Empty globs are dropped, a malformed glob is an error.
    pub fn new<I, P>(patterns: I, config: &MatcherConfig) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = P>,
        P: Into<MatchPattern>,
    {
        let mut compiled = Vec::new();
        for pattern in patterns {
            if let Some(pattern) = Compiled::new(pattern.into(), config)? {
                compiled.push(pattern);
            }
        }

        Ok(Self {
            inner: Arc::new(Inner {
                patterns: compiled,
                flags: config.flags,
                extensions: config.extensions.clone(),
            }),
        })
    }

    /// A matcher without patterns never matches.
    pub fn is_empty(&self) -> bool {
        self.inner.patterns.is_empty()
    }

    /// Test a slash separated path.
    pub fn matches(&self, source: &str) -> bool {
        let inner = &*self.inner;
        if inner.patterns.is_empty() || !self.passes_filters(source) {
            return false;
        }

        let disable_negation = inner.flags.intersects(MatchFlag::DISABLE_NEGATION);
        let mut any_match = false;
        for pattern in &inner.patterns {
            if !pattern.matches(source) {
                continue;
            }
            if disable_negation {
                return true;
            }
            if pattern.is_negated() {
                return false;
            }
            any_match = true;
        }

        any_match
    }

    fn passes_filters(&self, source: &str) -> bool {
        let inner = &*self.inner;

        if !inner.flags.intersects(MatchFlag::DOT)
            && source.split(SEPARATOR).any(|part| part.starts_with('.'))
        {
            return false;
        }

        if !inner.flags.intersects(MatchFlag::JUNK) && (is_junk(source) || is_junk(basename(source)))
        {
            return false;
        }

        match &inner.extensions {
            Some(extensions) => extensions.iter().any(|ext| source.ends_with(ext.as_str())),
            None => true,
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("patterns", &self.inner.patterns.len())
            .field("flags", &self.inner.flags)
            .field("extensions", &self.inner.extensions)
            .finish()
    }
}

/// Compile `patterns` into a plain matching function.
///
/// ```
/// # use globber::{MatcherConfig, create_matcher};
/// let is_source = create_matcher(["src/"], &MatcherConfig::new().extensions(["rs"])).unwrap();
/// assert!(is_source("src/bin/main.rs"));
/// assert!(!is_source("src/data.json"));
/// assert!(!is_source("tests/walk.rs"));
/// ```
pub fn create_matcher<I, P>(
    patterns: I,
    config: &MatcherConfig,
) -> Result<impl Fn(&str) -> bool + Clone + Send + Sync + 'static, ConfigError>
where
    I: IntoIterator<Item = P>,
    P: Into<MatchPattern>,
{
    let matcher = Matcher::new(patterns, config)?;
    Ok(move |source: &str| matcher.matches(source))
}

#[cfg(test)]
fn check(patterns: Vec<MatchPattern>, config: MatcherConfig, input: &str) -> bool {
    Matcher::new(patterns, &config).unwrap().matches(input)
}

#[test]
fn test_pattern_kinds() {
    let ends_with_txt = MatchPattern::predicate(|name| name.ends_with(".txt"));
    assert!(check(vec![ends_with_txt], MatcherConfig::new(), "awesome.txt"));

    let exact = MatchPattern::predicate(|path| path == "awesome.ts");
    assert!(!check(vec![exact], MatcherConfig::new(), "hello/awesome.ts"));

    assert!(check(vec!["*.ts".into()], MatcherConfig::new(), "awesome.ts"));

    let regex = Regex::new(r"\.ts$").unwrap();
    assert!(check(vec![regex.into()], MatcherConfig::new(), "awesome.ts"));

    let combined = vec![
        "*.ts".into(),
        Regex::new(r"\.ts$").unwrap().into(),
        MatchPattern::predicate(|file| file.ends_with(".ts")),
    ];
    assert!(check(combined, MatcherConfig::new(), "awesome.ts"));
}

#[test]
fn test_empty_list() {
    let matcher = Matcher::new(Vec::<MatchPattern>::new(), &MatcherConfig::new()).unwrap();
    assert!(matcher.is_empty());
    assert!(!matcher.matches(""));
    assert!(!matcher.matches("a.ts"));

    let all = MatcherConfig::new().add_flags(MatchFlag::DOT | MatchFlag::JUNK);
    let matcher = Matcher::new(["", ""], &all).unwrap();
    assert!(matcher.is_empty());
    assert!(!matcher.matches("anything"));
}

#[test]
fn test_negation() {
    let patterns = || -> Vec<MatchPattern> { vec!["**/*.ts".into(), "!**/*.d.ts".into()] };
    assert!(!check(patterns(), MatcherConfig::new(), "x.d.ts"));
    assert!(!check(patterns(), MatcherConfig::new(), "hello/this/is/file.d.ts"));
    assert!(check(patterns(), MatcherConfig::new(), "x.ts"));

    let disabled = MatcherConfig::new().add_flags(MatchFlag::DISABLE_NEGATION);
    assert!(check(patterns(), disabled.clone(), "x.d.ts"));
    assert!(check(patterns(), disabled, "hello/this/is/file.d.ts"));

    // a veto wins regardless of the order
    let reversed: Vec<MatchPattern> = vec!["!**/*.d.ts".into(), "**/*.ts".into()];
    assert!(!check(reversed, MatcherConfig::new(), "x.d.ts"));

    // a lone negation never matches positively
    assert!(!check(vec!["!*.md".into()], MatcherConfig::new(), "a.ts"));
}

#[test]
fn test_prefilters() {
    assert!(!check(vec!["*".into()], MatcherConfig::new(), ".hidden"));
    assert!(!check(vec!["**/*".into()], MatcherConfig::new(), "sub/.git/config"));
    let dot = MatcherConfig::new().add_flags(MatchFlag::DOT);
    assert!(check(vec!["*".into()], dot.clone(), ".hidden"));
    assert!(check(vec!["**/*".into()], dot, "sub/.git/config"));

    assert!(!check(vec!["**/*".into()], MatcherConfig::new(), "sub/Thumbs.db"));
    let junk = MatcherConfig::new().add_flags(MatchFlag::JUNK);
    assert!(check(vec!["**/*".into()], junk, "sub/Thumbs.db"));

    let ts = MatcherConfig::new().extensions([".ts"]);
    assert!(!check(vec!["**/*".into()], ts.clone(), "a.js"));
    assert!(check(vec!["**/*".into()], ts.clone(), "a.ts"));
    assert!(!check(vec!["**/*".into()], ts, ""));

    let without_dot = MatcherConfig::new().extensions(["ts"]);
    assert_eq!(without_dot.extension_list(), Some(&[".ts".to_string()][..]));
    assert!(check(vec!["**/*".into()], without_dot.clone(), "sub/c.ts"));
    assert!(!check(vec!["**/*".into()], without_dot, "sub/cats"));

    let none = MatcherConfig::new().extensions(Vec::<String>::new());
    assert_eq!(none.extension_list(), None);
    assert!(check(vec!["**/*".into()], none, "b.md"));
}

#[test]
fn test_glob_options() {
    let pattern = || -> Vec<MatchPattern> { vec!["?(ba[zr]|qux)baz.*".into()] };
    assert!(check(pattern(), MatcherConfig::new(), "bazbaz.txt"));
    let plain = MatcherConfig::new().add_flags(MatchFlag::DISABLE_EXTENDED_GLOBBING);
    assert!(!check(pattern(), plain, "bazbaz.txt"));

    assert!(check(vec!["this/".into()], MatcherConfig::new(), "this/is/a/long/file/path.txt"));
    assert!(check(vec!["dir/".into()], MatcherConfig::new(), "dir/sub/file.txt"));
    let unexpanded = MatcherConfig::new().add_flags(MatchFlag::DISABLE_GLOB_EXPANSION);
    assert!(!check(vec!["dir/".into()], unexpanded.clone(), "dir/sub/file.txt"));
    assert!(check(vec!["dir/".into()], unexpanded, "dir"));

    assert!(!check(vec!["SRC/*.RS".into()], MatcherConfig::new(), "src/main.rs"));
    let ignore_case = MatcherConfig::new().add_flags(MatchFlag::CASE_INSENSITIVE);
    assert!(check(vec!["SRC/*.RS".into()], ignore_case, "src/main.rs"));
}

#[test]
fn test_malformed_glob() {
    let err = Matcher::new(["ok/*", "bad[glob"], &MatcherConfig::new()).unwrap_err();
    match err {
        ConfigError::Pattern { pattern, source } => {
            assert_eq!(pattern, "bad[glob");
            assert_eq!(source, crate::ParseError::UnclosedCharacterClass(3));
        }
        other => panic!("unexpected error: {other}"),
    }

    // negated and expanded globs are reported unchanged
    for bad in ["!bad[glob/", "bad[glob/", "!bad[glob"] {
        match Matcher::new([bad], &MatcherConfig::new()).unwrap_err() {
            ConfigError::Pattern { pattern, .. } => assert_eq!(pattern, bad),
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn test_long_segments() {
    let matcher = Matcher::new(["**/*a*b*c.rs"], &MatcherConfig::new()).unwrap();
    let path = format!("{}/xaybzc.rs", "ab".repeat(120));
    assert!(matcher.matches(&path));
    assert!(!matcher.matches(&format!("{path}.bak")));
}

#[test]
fn test_shared_between_threads() {
    let matcher = create_matcher(["**/*.rs"], &MatcherConfig::new()).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let matcher = matcher.clone();
            std::thread::spawn(move || matcher(&format!("src/mod{i}.rs")))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
