//! Glob compilation and matching for slash separated paths.
//!
//! A glob is split into path segments. A segment consisting of only `**` matches any number of
//! whole path segments, everything else is matched against exactly one segment of the input, so
//! `*` and `?` never match a slash.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::RangeInclusive;

use bitflags::bitflags;

bitflags! {
    /// Flags affecting how a glob is compiled.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct GlobFlag: u8 {
        /// Ignore upper/lower case on both the pattern and the matched text.
        const IGNORE_CASE = 0x01;

        /// Enable bash-style extended globbing: `?(..)`, `*(..)`, `+(..)`, `@(..)`, `!(..)` and
        /// brace alternation `{a,b}`.
        const EXTENDED = 0x02;
    }
}

/// Error cases which may happen while parsing a glob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    EmptyPattern,
    TrailingBackslash,
    UnclosedCharacterClass(usize),
    MalformedNamedCharacterClass(usize),
    UnclosedGroup(usize),
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::EmptyPattern => write!(f, "empty pattern"),
            ParseError::TrailingBackslash => write!(f, "trailing backslash in pattern"),
            ParseError::UnclosedCharacterClass(begin) => write!(
                f,
                "unclosed character class in pattern, starting at character {}",
                begin
            ),
            ParseError::MalformedNamedCharacterClass(begin) => write!(
                f,
                "malformed named character class in pattern, starting at character {}",
                begin
            ),
            ParseError::UnclosedGroup(begin) => write!(
                f,
                "unclosed pattern group, starting at character {}",
                begin
            ),
        }
    }
}

/// A character class can be a list of characters `[abc]`, ranges of characters `[a-z]`, or named
/// classes `[[:digit:]]`, or a combination of them all. Additionally they can be negated with a
/// `!` or `^` at the beginning.
#[derive(Clone, Debug, Default)]
struct CharacterClass {
    negated: bool,
    named: Vec<fn(char) -> bool>,
    listed: Vec<char>,
    ranges: Vec<RangeInclusive<char>>,
}

impl CharacterClass {
    fn matches(&self, ch: char) -> bool {
        self.matches_do(ch) != self.negated
    }

    fn matches_do(&self, ch: char) -> bool {
        self.listed.contains(&ch)
            || self.ranges.iter().any(|range| range.contains(&ch))
            || self.named.iter().any(|func| func(ch))
    }
}

/// How often the alternatives of an extended group may repeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GroupKind {
    /// `?(a|b)`
    ZeroOrOne,
    /// `*(a|b)`
    ZeroOrMore,
    /// `+(a|b)`
    OneOrMore,
    /// `@(a|b)` and `{a,b}`
    ExactlyOne,
    /// `!(a|b)`
    Not,
}

/// One component of a path segment.
#[derive(Clone, Debug)]
enum Component {
    /// A literal match. The `a` and `.txt` in `a*.txt`.
    Literal(Vec<char>),

    /// Exactly one character.
    QuestionMark,

    /// Any number of characters within the segment.
    Star,

    /// A character class matches one character out of a set of allowed or disallowed ones.
    Class(CharacterClass),

    /// An extended glob group with its alternatives.
    Group(GroupKind, Vec<Vec<Component>>),
}

#[derive(Clone, Debug)]
enum Segment {
    /// A lone `**`, matching zero or more whole segments.
    Globstar,
    Components(Vec<Component>),
}

/// Where a component sequence stops while parsing.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// At the next `/`.
    Segment,
    /// At `|` or `)`.
    Paren,
    /// At `,` or `}`.
    Brace,
}

/// A compiled glob.
///
/// ```
/// # use globber::{Glob, GlobFlag};
/// let glob = Glob::new("src/**/*.@(rs|toml)", GlobFlag::EXTENDED).unwrap();
/// assert!(glob.matches("src/main.rs"));
/// assert!(glob.matches("src/a/b/Cargo.toml"));
/// assert!(!glob.matches("src/main.c"));
/// assert!(!glob.matches("main.rs"));
/// ```
#[derive(Clone, Debug)]
pub struct Glob {
    /// Original glob the user provided.
    glob: String,

    segments: Vec<Segment>,

    flags: GlobFlag,
}

impl Glob {
    /// Compile a glob.
    pub fn new(glob: &str, flags: GlobFlag) -> Result<Self, ParseError> {
        if glob.is_empty() {
            return Err(ParseError::EmptyPattern);
        }

        let chars: Vec<char> = glob.chars().collect();
        let mut parser = Parser {
            chars: &chars,
            pos: 0,
            flags,
        };

        Ok(Self {
            glob: glob.to_string(),
            segments: parser.parse_segments()?,
            flags,
        })
    }

    /// Get the original glob.
    pub fn pattern(&self) -> &str {
        &self.glob
    }

    pub fn flags(&self) -> GlobFlag {
        self.flags
    }

    /// Check whether this glob matches a slash separated path.
    pub fn matches(&self, text: &str) -> bool {
        let text = if self.flags.intersects(GlobFlag::IGNORE_CASE) {
            Cow::Owned(text.chars().flat_map(char::to_lowercase).collect::<String>())
        } else {
            Cow::Borrowed(text)
        };

        let parts: Vec<Vec<char>> = split_segments(&text)
            .into_iter()
            .map(|part| part.chars().collect())
            .collect();

        MatchState::default().segments(&self.segments, &parts)
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.glob)
    }
}

/// Split a path into segments. Repeated and trailing slashes are ignored, a leading slash yields
/// an empty first segment.
fn split_segments(text: &str) -> Vec<&str> {
    let trimmed = text.trim_end_matches('/');
    if trimmed.is_empty() && !text.is_empty() {
        // the path consisted of slashes only
        return vec![""];
    }

    let mut parts = trimmed.split('/');
    let mut segments = Vec::new();
    if let Some(first) = parts.next() {
        segments.push(first);
    }
    segments.extend(parts.filter(|part| !part.is_empty()));
    segments
}

struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
    flags: GlobFlag,
}

impl Parser<'_> {
    fn fold(&self, ch: char) -> char {
        if self.flags.intersects(GlobFlag::IGNORE_CASE) {
            ch.to_lowercase().next().unwrap_or(ch)
        } else {
            ch
        }
    }

    fn extended(&self) -> bool {
        self.flags.intersects(GlobFlag::EXTENDED)
    }

    fn parse_segments(&mut self) -> Result<Vec<Segment>, ParseError> {
        // strip trailing slashes:
        let len = match self.chars.iter().rposition(|&c| c != '/') {
            Some(pos) => pos + 1,
            None => 1,
        };
        let chars: &[char] = self.chars;
        self.chars = &chars[..len];

        let mut segments = Vec::new();
        loop {
            let begin = self.pos;
            let components = self.parse_sequence(Stop::Segment)?;
            let raw = &self.chars[begin..self.pos];
            if raw.len() >= 2 && raw.iter().all(|&c| c == '*') {
                segments.push(Segment::Globstar);
            } else {
                segments.push(Segment::Components(components));
            }

            if self.pos == self.chars.len() {
                break;
            }

            // swallow the separator and any repeated ones:
            while self.chars.get(self.pos) == Some(&'/') {
                self.pos += 1;
            }
            if self.pos == self.chars.len() {
                break;
            }
        }

        Ok(segments)
    }

    fn parse_sequence(&mut self, stop: Stop) -> Result<Vec<Component>, ParseError> {
        let mut components = Vec::new();
        let mut literal = Vec::new();

        fn push_literal(literal: &mut Vec<char>, components: &mut Vec<Component>) {
            if !literal.is_empty() {
                components.push(Component::Literal(std::mem::take(literal)));
            }
        }

        while self.pos != self.chars.len() {
            let ch = self.chars[self.pos];
            match ch {
                '/' if stop == Stop::Segment => break,
                '|' | ')' if stop == Stop::Paren => break,
                ',' | '}' if stop == Stop::Brace => break,
                '\\' => {
                    self.pos += 1;
                    let escaped = *self
                        .chars
                        .get(self.pos)
                        .ok_or(ParseError::TrailingBackslash)?;
                    literal.extend(self.fold_all(escaped));
                }
                '?' | '*' | '+' | '@' | '!'
                    if self.extended() && self.chars.get(self.pos + 1) == Some(&'(') =>
                {
                    push_literal(&mut literal, &mut components);
                    let kind = match ch {
                        '?' => GroupKind::ZeroOrOne,
                        '*' => GroupKind::ZeroOrMore,
                        '+' => GroupKind::OneOrMore,
                        '@' => GroupKind::ExactlyOne,
                        _ => GroupKind::Not,
                    };
                    let begin = self.pos;
                    self.pos += 2;
                    let alternatives = self.parse_alternatives(begin, Stop::Paren)?;
                    components.push(Component::Group(kind, alternatives));
                    // `parse_alternatives` leaves us past the closing parenthesis
                    continue;
                }
                '{' if self.extended() => {
                    push_literal(&mut literal, &mut components);
                    let begin = self.pos;
                    self.pos += 1;
                    let alternatives = self.parse_alternatives(begin, Stop::Brace)?;
                    components.push(Component::Group(GroupKind::ExactlyOne, alternatives));
                    continue;
                }
                '?' => {
                    push_literal(&mut literal, &mut components);
                    components.push(Component::QuestionMark);
                }
                '*' => {
                    push_literal(&mut literal, &mut components);
                    // swallow following stars as well, unless one opens a `*(..)` group:
                    while self.chars.get(self.pos + 1) == Some(&'*')
                        && !(self.extended() && self.chars.get(self.pos + 2) == Some(&'('))
                    {
                        self.pos += 1;
                    }
                    components.push(Component::Star);
                }
                '[' => {
                    push_literal(&mut literal, &mut components);
                    components.push(self.parse_char_class()?);
                }
                ch => literal.extend(self.fold_all(ch)),
            }

            self.pos += 1;
        }

        push_literal(&mut literal, &mut components);
        Ok(components)
    }

    fn fold_all(&self, ch: char) -> Vec<char> {
        if self.flags.intersects(GlobFlag::IGNORE_CASE) {
            ch.to_lowercase().collect()
        } else {
            vec![ch]
        }
    }

    /// Parse the alternatives of a group. `self.pos` points right after the opening bracket and
    /// is left right after the closing one.
    fn parse_alternatives(
        &mut self,
        begin: usize,
        stop: Stop,
    ) -> Result<Vec<Vec<Component>>, ParseError> {
        let (separator, close) = match stop {
            Stop::Brace => (',', '}'),
            _ => ('|', ')'),
        };

        let mut alternatives = Vec::new();
        loop {
            alternatives.push(self.parse_sequence(stop)?);
            match self.chars.get(self.pos) {
                Some(&c) if c == separator => self.pos += 1,
                Some(&c) if c == close => {
                    self.pos += 1;
                    return Ok(alternatives);
                }
                _ => return Err(ParseError::UnclosedGroup(begin)),
            }
        }
    }

    /// Parse a character class. `self.pos` points at the opening bracket and is left at the
    /// closing one.
    fn parse_char_class(&mut self) -> Result<Component, ParseError> {
        let begin = self.pos;
        let pattern = self.chars;
        let mut i = begin + 1;

        let negated = if matches!(pattern.get(i), Some('^') | Some('!')) {
            i += 1;
            true
        } else {
            false
        };

        let mut class = CharacterClass {
            negated,
            ..Default::default()
        };

        // a `]` right at the start is taken literally
        if pattern.get(i) == Some(&']') {
            class.listed.push(']');
            i += 1;
        }

        let mut prev = None;
        loop {
            let Some(&ch) = pattern.get(i) else {
                return Err(ParseError::UnclosedCharacterClass(begin));
            };

            let mut new_prev = None;
            match ch {
                ']' => break,
                '[' if pattern.get(i + 1) == Some(&':') => {
                    let name_len = pattern[(i + 2)..]
                        .windows(2)
                        .position(|w| w == [':', ']'])
                        .ok_or(ParseError::MalformedNamedCharacterClass(begin))?;
                    let name: String = pattern[(i + 2)..(i + 2 + name_len)].iter().collect();
                    class.named.push(self.named_class(&name, begin)?);
                    // leave `i` on the `]` closing the name
                    i += 2 + name_len + 1;
                }
                '\\' => {
                    i += 1;
                    let ch = self.fold(*pattern.get(i).ok_or(ParseError::TrailingBackslash)?);
                    class.listed.push(ch);
                    new_prev = Some(ch);
                }
                '-' => match prev {
                    Some(beg) if pattern.get(i + 1).is_some_and(|&c| c != ']') => {
                        // The previous character was also pushed to `class.listed`, so remove it:
                        class.listed.pop();

                        i += 1;
                        let mut end = pattern[i];
                        if end == '\\' {
                            i += 1;
                            end = *pattern
                                .get(i)
                                .ok_or(ParseError::UnclosedCharacterClass(begin))?;
                        }
                        let end = self.fold(end);

                        if beg <= end {
                            class.ranges.push(beg..=end);
                        } else {
                            class.ranges.push(end..=beg);
                        }
                    }
                    _ => {
                        new_prev = Some('-');
                        class.listed.push('-');
                    }
                },
                ch => {
                    let ch = self.fold(ch);
                    new_prev = Some(ch);
                    class.listed.push(ch);
                }
            }
            prev = new_prev;
            i += 1;
        }

        self.pos = i;
        Ok(Component::Class(class))
    }

    fn named_class(&self, name: &str, begin: usize) -> Result<fn(char) -> bool, ParseError> {
        let ignore_case = self.flags.intersects(GlobFlag::IGNORE_CASE);
        let func: fn(char) -> bool = match name {
            "alnum" => |c: char| c.is_alphanumeric(),
            "alpha" => |c: char| c.is_alphabetic(),
            "blank" => |c: char| c == ' ' || c == '\t',
            "cntrl" => |c: char| c.is_control(),
            "digit" => |c: char| c.is_ascii_digit(),
            "graph" => |c: char| c.is_ascii_graphic(),
            "lower" => |c: char| c.is_lowercase(),
            "print" => |c: char| c.is_ascii_graphic() || c == ' ',
            "punct" => |c: char| c.is_ascii_punctuation(),
            "space" => |c: char| c.is_whitespace(),
            // the text is lower case already when ignoring case
            "upper" if ignore_case => |c: char| c.is_lowercase(),
            "upper" => |c: char| c.is_uppercase(),
            "xdigit" => |c: char| c.is_ascii_hexdigit(),
            _ => return Err(ParseError::MalformedNamedCharacterClass(begin)),
        };
        Ok(func)
    }
}

/// Identifies a pattern slice together with a text slice. Both borrow from data which outlives
/// the [`MatchState`], so equal addresses and lengths mean equal contents.
type Key = (usize, usize, usize, usize);

fn key<A, B>(pattern: &[A], text: &[B]) -> Key {
    (
        pattern.as_ptr() as usize,
        pattern.len(),
        text.as_ptr() as usize,
        text.len(),
    )
}

fn cached<K: Eq + Hash>(
    results: &RefCell<HashMap<K, bool>>,
    key: K,
    compute: impl FnOnce() -> bool,
) -> bool {
    if let Some(&known) = results.borrow().get(&key) {
        return known;
    }
    let result = compute();
    results.borrow_mut().insert(key, result);
    result
}

/// Results of already attempted (pattern, text) pairs. Every pair is evaluated once, which keeps
/// backtracking over stars and groups polynomial.
#[derive(Default)]
struct MatchState {
    segment_results: RefCell<HashMap<Key, bool>>,
    component_results: RefCell<HashMap<Key, bool>>,
    repeat_results: RefCell<HashMap<(usize, Key), bool>>,
}

impl MatchState {
    fn segments(&self, segments: &[Segment], parts: &[Vec<char>]) -> bool {
        cached(&self.segment_results, key(segments, parts), || {
            self.segments_do(segments, parts)
        })
    }

    /// Match a component sequence against the complete text.
    fn components(&self, components: &[Component], text: &[char]) -> bool {
        cached(&self.component_results, key(components, text), || {
            self.components_do(components, text)
        })
    }

    fn segments_do(&self, segments: &[Segment], parts: &[Vec<char>]) -> bool {
        match segments.split_first() {
            None => parts.is_empty(),
            Some((Segment::Globstar, rest)) => {
                (0..=parts.len()).any(|skip| self.segments(rest, &parts[skip..]))
            }
            Some((Segment::Components(components), rest)) => match parts.split_first() {
                Some((part, tail)) => {
                    self.components(components, part) && self.segments(rest, tail)
                }
                None => false,
            },
        }
    }

    fn components_do(&self, components: &[Component], text: &[char]) -> bool {
        let Some((first, rest)) = components.split_first() else {
            return text.is_empty();
        };

        match first {
            Component::Literal(literal) => {
                text.starts_with(literal) && self.components(rest, &text[literal.len()..])
            }
            Component::QuestionMark => !text.is_empty() && self.components(rest, &text[1..]),
            Component::Class(class) => match text.split_first() {
                Some((&ch, tail)) => class.matches(ch) && self.components(rest, tail),
                None => false,
            },
            Component::Star => {
                if rest.is_empty() {
                    return true;
                }
                (0..=text.len()).any(|skip| self.components(rest, &text[skip..]))
            }
            Component::Group(kind, alternatives) => match kind {
                GroupKind::ExactlyOne => (0..=text.len()).any(|end| {
                    self.any_alternative(alternatives, &text[..end])
                        && self.components(rest, &text[end..])
                }),
                GroupKind::ZeroOrOne => {
                    self.components(rest, text)
                        || (0..=text.len()).any(|end| {
                            self.any_alternative(alternatives, &text[..end])
                                && self.components(rest, &text[end..])
                        })
                }
                GroupKind::ZeroOrMore => self.repeat(alternatives, rest, text),
                GroupKind::OneOrMore => {
                    (self.any_alternative(alternatives, &[]) && self.components(rest, text))
                        || (1..=text.len()).any(|end| {
                            self.any_alternative(alternatives, &text[..end])
                                && self.repeat(alternatives, rest, &text[end..])
                        })
                }
                GroupKind::Not => (0..=text.len()).any(|end| {
                    !self.any_alternative(alternatives, &text[..end])
                        && self.components(rest, &text[end..])
                }),
            },
        }
    }

    /// Zero or more non-empty repetitions of the alternatives followed by `rest`.
    fn repeat(&self, alternatives: &[Vec<Component>], rest: &[Component], text: &[char]) -> bool {
        let key = (alternatives.as_ptr() as usize, key(rest, text));
        cached(&self.repeat_results, key, || {
            self.components(rest, text)
                || (1..=text.len()).any(|end| {
                    self.any_alternative(alternatives, &text[..end])
                        && self.repeat(alternatives, rest, &text[end..])
                })
        })
    }

    fn any_alternative(&self, alternatives: &[Vec<Component>], text: &[char]) -> bool {
        alternatives
            .iter()
            .any(|alternative| self.components(alternative, text))
    }
}

#[test]
fn test_basic() {
    let glob = Glob::new("/hey/*/you", GlobFlag::empty()).unwrap();
    assert!(glob.matches("/hey/asdf/you"));
    assert!(!glob.matches("/hey/asdf/more/you"));
    assert!(!glob.matches("/heyasdf/you"));
    assert!(!glob.matches("/hey/asdfyou"));
    assert!(!glob.matches("/hey/you"));
    assert!(!glob.matches("hey/asdf/you"));

    let glob = Glob::new("/hey/**/you", GlobFlag::empty()).unwrap();
    assert!(glob.matches("/hey/asdf/you"));
    assert!(glob.matches("/hey/asdf/more/you"));
    assert!(glob.matches("/hey/you"));
    assert!(!glob.matches("/heyasdf/you"));
    assert!(!glob.matches("/hey/asdfyou"));

    let glob = Glob::new("/he[yx]/**/you", GlobFlag::empty()).unwrap();
    assert!(glob.matches("/hey/asdf/you"));
    assert!(glob.matches("/hex/asdf/more/you"));
    assert!(glob.matches("/hex/you"));
    assert!(!glob.matches("/hez/asdf/you"));

    let glob = Glob::new("/he[^yx]/**/you", GlobFlag::empty()).unwrap();
    assert!(!glob.matches("/hey/asdf/you"));
    assert!(glob.matches("/hez/asdf/you"));
    assert!(glob.matches("/hez/you"));

    let glob = Glob::new("/tes[a-t]/a?a", GlobFlag::empty()).unwrap();
    assert!(!glob.matches("/tesu/aaa"));
    assert!(!glob.matches("/test/a"));
    assert!(glob.matches("/test/aba"));
    assert!(!glob.matches("/test/a/a"));

    let glob = Glob::new("a*b*c", GlobFlag::empty()).unwrap();
    assert!(glob.matches("axxbxxc"));
    assert!(!glob.matches("axxbxxcxx"));
    assert!(glob.matches("axxbxxbxxcxxc"));

    // `**` which is not a whole segment is a plain star
    let glob = Glob::new("a/b**/c", GlobFlag::empty()).unwrap();
    assert!(glob.matches("a/bxx/c"));
    assert!(!glob.matches("a/bxx/yy/c"));
}

#[test]
fn test_globstar() {
    let glob = Glob::new("**/*", GlobFlag::empty()).unwrap();
    assert!(glob.matches(""));
    assert!(glob.matches("a.ts"));
    assert!(glob.matches("sub/c.ts"));
    assert!(glob.matches("very/deep/path/file"));

    let glob = Glob::new("**/*.d.ts", GlobFlag::empty()).unwrap();
    assert!(glob.matches("x.d.ts"));
    assert!(glob.matches("hello/this/is/file.d.ts"));
    assert!(!glob.matches("hello/file.ts"));

    let glob = Glob::new("sub/**", GlobFlag::empty()).unwrap();
    assert!(glob.matches("sub"));
    assert!(glob.matches("sub/c.ts"));
    assert!(glob.matches("sub/deeper/c.ts"));
    assert!(!glob.matches("other/c.ts"));
    assert!(!glob.matches("subway"));
}

#[test]
fn test_separators() {
    let glob = Glob::new("dir//sub/", GlobFlag::empty()).unwrap();
    assert!(glob.matches("dir/sub"));
    assert!(glob.matches("dir/sub/"));
    assert!(glob.matches("dir///sub"));
    assert!(!glob.matches("dir/sub/file"));

    let glob = Glob::new("/", GlobFlag::empty()).unwrap();
    assert!(glob.matches("/"));
    assert!(!glob.matches("a"));
}

#[test]
fn test_classes() {
    let glob = Glob::new(
        "aB[c-fX-Z][[:upper:]][[:lower:]][[:digit:]k]",
        GlobFlag::IGNORE_CASE,
    )
    .unwrap();
    assert!(glob.matches("aBcUl3"));
    assert!(glob.matches("AbCuL9"));
    assert!(!glob.matches("aBgUl3"));
    assert!(!glob.matches("aBcUlx"));
    assert!(glob.matches("abculk"));
    assert!(glob.matches("abxulk"));
    assert!(!glob.matches("abxul"));

    let glob = Glob::new("[]a]", GlobFlag::empty()).unwrap();
    assert!(glob.matches("]"));
    assert!(glob.matches("a"));
    assert!(!glob.matches("b"));

    let glob = Glob::new("[!a-c-]", GlobFlag::empty()).unwrap();
    assert!(glob.matches("d"));
    assert!(!glob.matches("b"));
    assert!(!glob.matches("-"));

    let glob = Glob::new("[a-z]", GlobFlag::empty()).unwrap();
    assert!(!glob.matches("/"));
}

#[test]
fn test_extended() {
    let glob = Glob::new("?(ba[zr]|qux)baz.*", GlobFlag::EXTENDED).unwrap();
    assert!(glob.matches("bazbaz.txt"));
    assert!(glob.matches("quxbaz.md"));
    assert!(glob.matches("baz.md"));
    assert!(!glob.matches("foobaz.md"));

    let glob = Glob::new("?(ba[zr]|qux)baz.*", GlobFlag::empty()).unwrap();
    assert!(!glob.matches("bazbaz.txt"));
    assert!(glob.matches("x(baz|qux)baz.txt"));

    let glob = Glob::new("a*(xy|z)b", GlobFlag::EXTENDED).unwrap();
    assert!(glob.matches("ab"));
    assert!(glob.matches("axyzxyb"));
    assert!(!glob.matches("axb"));

    let glob = Glob::new("a+(xy|z)b", GlobFlag::EXTENDED).unwrap();
    assert!(!glob.matches("ab"));
    assert!(glob.matches("azb"));
    assert!(glob.matches("axyzb"));

    let glob = Glob::new("@(foo|bar).rs", GlobFlag::EXTENDED).unwrap();
    assert!(glob.matches("foo.rs"));
    assert!(!glob.matches("foobar.rs"));

    let glob = Glob::new("!(*.js)", GlobFlag::EXTENDED).unwrap();
    assert!(glob.matches("main.ts"));
    assert!(!glob.matches("main.js"));

    let glob = Glob::new("*.{json,yaml}", GlobFlag::EXTENDED).unwrap();
    assert!(glob.matches("config.json"));
    assert!(glob.matches("config.yaml"));
    assert!(!glob.matches("config.toml"));

    let glob = Glob::new("*.{json,yaml}", GlobFlag::empty()).unwrap();
    assert!(glob.matches("config.{json,yaml}"));
    assert!(!glob.matches("config.json"));
}

#[test]
fn test_ignore_case() {
    let glob = Glob::new("SRC/*.RS", GlobFlag::IGNORE_CASE).unwrap();
    assert!(glob.matches("src/main.rs"));
    assert!(glob.matches("Src/Main.Rs"));

    let glob = Glob::new("SRC/*.RS", GlobFlag::empty()).unwrap();
    assert!(!glob.matches("src/main.rs"));
}

#[test]
fn test_parse_errors() {
    assert_eq!(
        Glob::new("", GlobFlag::empty()).unwrap_err(),
        ParseError::EmptyPattern
    );
    assert_eq!(
        Glob::new("abc\\", GlobFlag::empty()).unwrap_err(),
        ParseError::TrailingBackslash
    );
    assert_eq!(
        Glob::new("ab[cd", GlobFlag::empty()).unwrap_err(),
        ParseError::UnclosedCharacterClass(2)
    );
    assert_eq!(
        Glob::new("[[:nope:]]", GlobFlag::empty()).unwrap_err(),
        ParseError::MalformedNamedCharacterClass(0)
    );
    assert_eq!(
        Glob::new("a@(b|c", GlobFlag::EXTENDED).unwrap_err(),
        ParseError::UnclosedGroup(1)
    );
    // without extended globbing the parenthesis is a literal
    assert!(Glob::new("a@(b|c", GlobFlag::empty()).is_ok());
}

#[test]
fn test_backtracking() {
    let glob = Glob::new(&format!("{}b", "*(a|aa)".repeat(20)), GlobFlag::EXTENDED).unwrap();
    assert!(!glob.matches(&"a".repeat(60)));
    assert!(glob.matches(&format!("{}b", "a".repeat(60))));

    // long segments which a star has to backtrack over must still match
    let glob = Glob::new("**/*a*b*c.rs", GlobFlag::EXTENDED).unwrap();
    for repeat in [20, 60, 120, 500] {
        let path = format!("{}/xaybzc.rs", "ab".repeat(repeat));
        assert!(glob.matches(&path), "repeat: {repeat}");
        assert!(!glob.matches(&format!("{path}x")), "repeat: {repeat}");
    }
}

#[test]
fn test_star_before_group() {
    let glob = Glob::new("**(a|b)", GlobFlag::EXTENDED).unwrap();
    assert!(glob.matches("ab"));
    assert!(glob.matches("xyz"));
    assert!(!glob.matches("a/b"));

    let glob = Glob::new("x**(ab)y", GlobFlag::EXTENDED).unwrap();
    assert!(glob.matches("xy"));
    assert!(glob.matches("xzzababy"));

    // without extended globbing the parenthesis stays literal
    let glob = Glob::new("**(a|b)", GlobFlag::empty()).unwrap();
    assert!(glob.matches("x(a|b)"));
    assert!(!glob.matches("ab"));
}
