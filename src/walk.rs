//! Lazy, depth-first directory traversal.
//!
//! A [`Walk`] keeps an explicit stack of open directory listings and only touches the filesystem
//! when the next entry is requested. Dropping it early leaves no work behind.

use std::fs;
use std::io;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::error::{ConfigError, Error, TraversalError};
use crate::matcher::{MatchFlag, MatchPattern, Matcher, MatcherConfig};
use crate::normalize::{basename, get_path, join, normalize, normalize_directory, relative};

/// The file type of a path as reported by the filesystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileStat {
    pub is_file: bool,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl FileStat {
    pub const fn file() -> Self {
        Self {
            is_file: true,
            is_dir: false,
            is_symlink: false,
        }
    }

    pub const fn dir() -> Self {
        Self {
            is_file: false,
            is_dir: true,
            is_symlink: false,
        }
    }

    pub const fn symlink() -> Self {
        Self {
            is_file: false,
            is_dir: false,
            is_symlink: true,
        }
    }
}

impl From<fs::FileType> for FileStat {
    fn from(ty: fs::FileType) -> Self {
        Self {
            is_file: ty.is_file(),
            is_dir: ty.is_dir(),
            is_symlink: ty.is_symlink(),
        }
    }
}

/// An immediate child of a directory, without following symlinks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub stat: FileStat,
}

/// Filesystem operations needed by a [`Walk`].
///
/// Paths are normalized, absolute and use `/` as separator.
pub trait WalkFs {
    type ReadDir: Iterator<Item = io::Result<DirEntryInfo>>;

    /// List the immediate children of a directory. The listing may be consumed lazily.
    fn read_dir(&self, path: &str) -> io::Result<Self::ReadDir>;

    /// Get the file type of `path`, following symlinks.
    fn stat(&self, path: &str) -> io::Result<FileStat>;

    /// Resolve all symlinks in `path`.
    fn real_path(&self, path: &str) -> io::Result<String>;
}

impl<T: WalkFs + ?Sized> WalkFs for &T {
    type ReadDir = T::ReadDir;

    fn read_dir(&self, path: &str) -> io::Result<Self::ReadDir> {
        (**self).read_dir(path)
    }

    fn stat(&self, path: &str) -> io::Result<FileStat> {
        (**self).stat(path)
    }

    fn real_path(&self, path: &str) -> io::Result<String> {
        (**self).real_path(path)
    }
}

/// The host filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealFs;

/// Directory listing of [`RealFs`].
#[derive(Debug)]
pub struct RealReadDir(fs::ReadDir);

impl Iterator for RealReadDir {
    type Item = io::Result<DirEntryInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.0.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err)),
            };
            // paths are strings, a name which is not UTF-8 has no representation
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    debug!("skipping non UTF-8 name {name:?} in {:?}", entry.path().parent());
                    continue;
                }
            };
            return Some(entry.file_type().map(|file_type| DirEntryInfo {
                name,
                stat: file_type.into(),
            }));
        }
    }
}

impl WalkFs for RealFs {
    type ReadDir = RealReadDir;

    fn read_dir(&self, path: &str) -> io::Result<Self::ReadDir> {
        fs::read_dir(path).map(RealReadDir)
    }

    fn stat(&self, path: &str) -> io::Result<FileStat> {
        Ok(fs::metadata(path)?.file_type().into())
    }

    fn real_path(&self, path: &str) -> io::Result<String> {
        let real = fs::canonicalize(path)?;
        Ok(normalize(&real.to_string_lossy(), true))
    }
}

/// Options for a single [`Walk`].
///
/// ```
/// # use globber::{MatchFlag, WalkOptions};
/// let options = WalkOptions::new("/srv/project")
///     .include(["src/", "Cargo.toml"])
///     .exclude(["target"])
///     .add_flags(MatchFlag::DOT)
///     .max_depth(8);
/// ```
#[derive(Clone, Debug)]
pub struct WalkOptions {
    cwd: PathBuf,
    max_depth: Option<usize>,
    follow_symlinks: bool,
    exclude_directories: bool,
    exclude_files: bool,
    trailing_slash: bool,
    include: Vec<MatchPattern>,
    exclude: Vec<MatchPattern>,
    config: MatcherConfig,
}

impl WalkOptions {
    /// Walk `cwd`, which may also be a `file:` URL. Relative paths are made absolute.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            max_depth: None,
            follow_symlinks: true,
            exclude_directories: false,
            exclude_files: false,
            trailing_slash: true,
            include: vec![MatchPattern::from("**/*")],
            exclude: Vec::new(),
            config: MatcherConfig::default(),
        }
    }

    /// Builder method to limit how many directory levels below `cwd` are entered. `0` only
    /// considers `cwd` itself.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Builder method to control whether symlinks are resolved or skipped.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Builder method to stop yielding directories. They are still descended into.
    pub fn exclude_directories(mut self, exclude: bool) -> Self {
        self.exclude_directories = exclude;
        self
    }

    /// Builder method to stop yielding files.
    pub fn exclude_files(mut self, exclude: bool) -> Self {
        self.exclude_files = exclude;
        self
    }

    /// Builder method to control whether directory entries end with a `/`.
    pub fn trailing_slash(mut self, trailing_slash: bool) -> Self {
        self.trailing_slash = trailing_slash;
        self
    }

    /// Builder method to replace the include patterns. The default includes everything.
    pub fn include<I, P>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<MatchPattern>,
    {
        self.include = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to replace the exclude patterns. An excluded directory is not entered.
    pub fn exclude<I, P>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<MatchPattern>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to replace the matcher configuration shared by include and exclude.
    pub fn matcher(mut self, config: MatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder method to set the match flags to a specific value.
    pub fn flags(mut self, flags: MatchFlag) -> Self {
        self.config = self.config.flags(flags);
        self
    }

    /// Builder method to add match flag bits to the already present ones.
    pub fn add_flags(mut self, flags: MatchFlag) -> Self {
        self.config = self.config.add_flags(flags);
        self
    }

    /// Builder method to only match paths ending in one of `extensions`.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config = self.config.extensions(extensions);
        self
    }

    fn resolve_cwd(&self) -> Result<String, ConfigError> {
        let cwd = get_path(&self.cwd.to_string_lossy());
        if Path::new(&cwd).is_absolute() {
            return Ok(normalize(&cwd, true));
        }

        let absolute = std::path::absolute(&cwd).map_err(|source| ConfigError::Cwd {
            path: self.cwd.clone(),
            source,
        })?;
        Ok(normalize(&absolute.to_string_lossy(), true))
    }
}

/// Whether an [`Entry`] is a file or a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A file or directory found by a [`Walk`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    name: String,
    absolute: String,
    relative: String,
    kind: EntryKind,
    is_symlink: bool,
}

impl Entry {
    /// The last path segment. Directories carry the configured trailing slash.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized absolute path.
    pub fn absolute(&self) -> &str {
        &self.absolute
    }

    /// The path relative to the walked directory, which itself is `./`.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.absolute)
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Whether the entry was reached through a followed symlink. Its paths are the resolved ones.
    pub fn is_symlink(&self) -> bool {
        self.is_symlink
    }
}

/// A directory whose children are still to be visited.
struct Frame<R> {
    dir: String,
    /// Resolved path, used to detect symlink cycles. Filled in when the listing is opened.
    real: Option<String>,
    /// Remaining depth for the children.
    budget: Option<usize>,
    entries: Option<R>,
}

/// Start walking with the host filesystem.
///
/// Configuration errors are reported right away, filesystem errors by the iterator.
pub fn walk(options: WalkOptions) -> Result<Walk, Error> {
    Walk::new(options)
}

/// Iterator over the entries below a directory, see [`walk`].
///
/// After returning an error the iterator is finished.
pub struct Walk<F: WalkFs = RealFs> {
    fs: F,
    cwd: String,
    max_depth: Option<usize>,
    follow_symlinks: bool,
    exclude_directories: bool,
    exclude_files: bool,
    trailing_slash: bool,
    include: Matcher,
    exclude: Matcher,
    stack: Vec<Frame<F::ReadDir>>,
    started: bool,
    done: bool,
}

impl Walk<RealFs> {
    pub fn new(options: WalkOptions) -> Result<Self, Error> {
        Self::with_fs(options, RealFs)
    }
}

impl<F: WalkFs> Walk<F> {
    /// Walk using a custom filesystem implementation.
    pub fn with_fs(options: WalkOptions, fs: F) -> Result<Self, Error> {
        if options.exclude_directories && options.exclude_files {
            return Err(ConfigError::ExcludeBoth.into());
        }

        let cwd = options.resolve_cwd()?;
        let include = Matcher::new(options.include, &options.config)?;
        let exclude = Matcher::new(options.exclude, &options.config)?;

        Ok(Self {
            fs,
            cwd,
            max_depth: options.max_depth,
            follow_symlinks: options.follow_symlinks,
            exclude_directories: options.exclude_directories,
            exclude_files: options.exclude_files,
            trailing_slash: options.trailing_slash,
            include,
            exclude,
            stack: Vec::new(),
            started: false,
            done: false,
        })
    }

    /// The normalized absolute directory being walked.
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    fn should_include(&self, relative: &str) -> bool {
        !self.exclude.matches(relative) && self.include.matches(relative)
    }

    fn pull(&mut self) -> Result<Option<Entry>, Error> {
        if !self.started {
            self.started = true;
            let cwd = self.cwd.clone();
            if let Some(entry) = self.enter(cwd, None, self.max_depth, false) {
                return Ok(Some(entry));
            }
        }

        while let Some(frame) = self.stack.last_mut() {
            if frame.entries.is_none() {
                trace!("reading directory {:?}", frame.dir);
                if frame.real.is_none() {
                    let real = self
                        .fs
                        .real_path(&frame.dir)
                        .map_err(|err| TraversalError::wrap(err, &frame.dir))?;
                    frame.real = Some(real);
                }
                let entries = self
                    .fs
                    .read_dir(&frame.dir)
                    .map_err(|err| TraversalError::wrap(err, &frame.dir))?;
                frame.entries = Some(entries);
            }

            let info = match frame.entries.as_mut().and_then(|entries| entries.next()) {
                Some(Ok(info)) => info,
                Some(Err(err)) => return Err(TraversalError::wrap(err, &frame.dir).into()),
                None => {
                    self.stack.pop();
                    continue;
                }
            };

            let absolute = join(&frame.dir, &info.name);
            let real = join(frame.real.as_deref().unwrap_or(&frame.dir), &info.name);
            let budget = frame.budget;

            match self.visit(info, absolute, real, budget) {
                Ok(Some(entry)) => return Ok(Some(entry)),
                Ok(None) => (),
                Err(err) => {
                    let root = self.stack.last().map_or(self.cwd.as_str(), |f| f.dir.as_str());
                    return Err(TraversalError::wrap(err, root).into());
                }
            }
        }

        Ok(None)
    }

    /// Consider a directory: returns its entry if it should be yielded and queues its listing
    /// unless it is pruned. `budget` is the remaining depth of the directory itself.
    fn enter(
        &mut self,
        dir: String,
        real: Option<String>,
        budget: Option<usize>,
        via_symlink: bool,
    ) -> Option<Entry> {
        let relative = relative(&self.cwd, &dir);

        let entry = if !self.exclude_directories && self.should_include(&relative) {
            Some(Entry {
                name: normalize_directory(basename(&dir), self.trailing_slash),
                absolute: normalize_directory(&dir, self.trailing_slash),
                relative: normalize_directory(&relative, self.trailing_slash),
                kind: EntryKind::Directory,
                is_symlink: via_symlink,
            })
        } else {
            None
        };

        if budget == Some(0) {
            debug!("not descending into {dir:?}, maximum depth reached");
        } else if self.exclude.matches(&relative) {
            debug!("pruning excluded directory {dir:?}");
        } else {
            self.stack.push(Frame {
                dir,
                real,
                budget: budget.map(|depth| depth - 1),
                entries: None,
            });
        }

        entry
    }

    /// Consider a child of the directory on top of the stack.
    fn visit(
        &mut self,
        info: DirEntryInfo,
        absolute: String,
        real: String,
        budget: Option<usize>,
    ) -> io::Result<Option<Entry>> {
        let (path, real, stat, via_symlink) = if info.stat.is_symlink {
            if !self.follow_symlinks {
                trace!("skipping symlink {absolute:?}");
                return Ok(None);
            }
            let target = self.fs.real_path(&absolute)?;
            let stat = self.fs.stat(&target)?;
            (target.clone(), target, stat, true)
        } else {
            (absolute, real, info.stat, false)
        };

        if stat.is_dir {
            if via_symlink
                && self
                    .stack
                    .iter()
                    .any(|frame| frame.real.as_deref() == Some(real.as_str()))
            {
                debug!("not following symlink to {real:?}, it is already being walked");
                return Ok(None);
            }
            return Ok(self.enter(path, Some(real), budget, via_symlink));
        }

        if self.exclude_files {
            return Ok(None);
        }

        let relative = relative(&self.cwd, &path);
        if !self.should_include(&relative) {
            return Ok(None);
        }

        Ok(Some(Entry {
            name: basename(&path).to_string(),
            absolute: path,
            relative,
            kind: EntryKind::File,
            is_symlink: via_symlink,
        }))
    }
}

impl<F: WalkFs> Iterator for Walk<F> {
    type Item = Result<Entry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.pull() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                self.stack.clear();
                Some(Err(err))
            }
        }
    }
}

impl<F: WalkFs> FusedIterator for Walk<F> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    enum Node {
        Dir(Vec<String>),
        File,
        Symlink(String),
        Unreadable,
    }

    impl Node {
        fn lstat(&self) -> FileStat {
            match self {
                Node::Dir(_) | Node::Unreadable => FileStat::dir(),
                Node::File => FileStat::file(),
                Node::Symlink(_) => FileStat::symlink(),
            }
        }
    }

    /// In-memory filesystem counting directory reads.
    struct MemoryFs {
        nodes: HashMap<String, Node>,
        reads: Cell<usize>,
    }

    impl MemoryFs {
        fn new() -> Self {
            let mut nodes = HashMap::new();
            nodes.insert("/".to_string(), Node::Dir(Vec::new()));
            Self {
                nodes,
                reads: Cell::new(0),
            }
        }

        /// Add a node, its parent directory must exist already.
        fn add(&mut self, path: &str, node: Node) {
            let (parent, name) = path.rsplit_once('/').unwrap();
            let parent = if parent.is_empty() { "/" } else { parent };
            match self.nodes.get_mut(parent) {
                Some(Node::Dir(children)) => children.push(name.to_string()),
                _ => panic!("no parent directory for {path}"),
            }
            self.nodes.insert(path.to_string(), node);
        }

        fn dir(&mut self, path: &str) {
            self.add(path, Node::Dir(Vec::new()));
        }

        fn file(&mut self, path: &str) {
            self.add(path, Node::File);
        }

        fn symlink(&mut self, path: &str, target: &str) {
            self.add(path, Node::Symlink(target.to_string()));
        }

        /// A child which is listed but gone by the time it is looked at.
        fn ghost(&mut self, path: &str) {
            self.add(path, Node::File);
            self.nodes.remove(path);
        }

        fn resolve(&self, path: &str) -> io::Result<(String, &Node)> {
            let mut path = path.to_string();
            for _ in 0..40 {
                match self.nodes.get(&path) {
                    Some(Node::Symlink(target)) => path = target.clone(),
                    Some(node) => return Ok((path, node)),
                    None => return Err(io::Error::new(io::ErrorKind::NotFound, path)),
                }
            }
            Err(io::Error::other("too many levels of symbolic links"))
        }
    }

    impl WalkFs for MemoryFs {
        type ReadDir = std::vec::IntoIter<io::Result<DirEntryInfo>>;

        fn read_dir(&self, path: &str) -> io::Result<Self::ReadDir> {
            self.reads.set(self.reads.get() + 1);
            let children = match self.resolve(path)?.1 {
                Node::Dir(children) => children,
                Node::Unreadable => return Err(io::ErrorKind::PermissionDenied.into()),
                _ => return Err(io::Error::other("not a directory")),
            };

            let entries: Vec<_> = children
                .iter()
                .map(|name| match self.nodes.get(&join(path, name)) {
                    Some(node) => Ok(DirEntryInfo {
                        name: name.clone(),
                        stat: node.lstat(),
                    }),
                    None => Err(io::Error::new(io::ErrorKind::NotFound, name.clone())),
                })
                .collect();
            Ok(entries.into_iter())
        }

        fn stat(&self, path: &str) -> io::Result<FileStat> {
            Ok(self.resolve(path)?.1.lstat())
        }

        fn real_path(&self, path: &str) -> io::Result<String> {
            Ok(self.resolve(path)?.0)
        }
    }

    /// `/root/{a.ts, b.md, sub/{c.ts, .hidden}}`
    fn project() -> MemoryFs {
        let mut fs = MemoryFs::new();
        fs.dir("/root");
        fs.file("/root/a.ts");
        fs.file("/root/b.md");
        fs.dir("/root/sub");
        fs.file("/root/sub/c.ts");
        fs.file("/root/sub/.hidden");
        fs
    }

    fn relatives(walk: Walk<&MemoryFs>) -> Vec<String> {
        walk.map(|entry| entry.unwrap().relative().to_string()).collect()
    }

    fn walk_fs(options: WalkOptions, fs: &MemoryFs) -> Walk<&MemoryFs> {
        Walk::with_fs(options, fs).unwrap()
    }

    #[test]
    fn test_default_walk() {
        let fs = project();
        let entries: Vec<Entry> = walk_fs(WalkOptions::new("/root"), &fs)
            .collect::<Result<_, _>>()
            .unwrap();

        let relative: Vec<&str> = entries.iter().map(Entry::relative).collect();
        assert_eq!(relative, ["./", "a.ts", "b.md", "sub/", "sub/c.ts"]);

        assert_eq!(entries[0].name(), "root/");
        assert_eq!(entries[0].absolute(), "/root/");
        assert!(entries[0].is_dir());

        let sub = &entries[3];
        assert_eq!(sub.name(), "sub/");
        assert_eq!(sub.absolute(), "/root/sub/");
        assert_eq!(sub.kind(), EntryKind::Directory);

        let c = &entries[4];
        assert_eq!(c.name(), "c.ts");
        assert_eq!(c.absolute(), "/root/sub/c.ts");
        assert_eq!(c.path(), Path::new("/root/sub/c.ts"));
        assert!(c.is_file() && !c.is_dir() && !c.is_symlink());
    }

    #[test]
    fn test_extensions() {
        let fs = project();
        let options = WalkOptions::new("/root").extensions([".ts"]);
        assert_eq!(relatives(walk_fs(options, &fs)), ["a.ts", "sub/c.ts"]);

        let options = WalkOptions::new("file:///root/").extensions(["ts"]);
        assert_eq!(relatives(walk_fs(options, &fs)), ["a.ts", "sub/c.ts"]);
    }

    #[test]
    fn test_exclude_directories() {
        let fs = project();
        let options = WalkOptions::new("/root")
            .exclude_directories(true)
            .exclude(["sub/**"]);
        assert_eq!(relatives(walk_fs(options, &fs)), ["a.ts", "b.md"]);
        // `sub` was pruned without being listed
        assert_eq!(fs.reads.get(), 1);
    }

    #[test]
    fn test_exclude_files() {
        let fs = project();
        let options = WalkOptions::new("/root").exclude_files(true);
        assert_eq!(relatives(walk_fs(options, &fs)), ["./", "sub/"]);
    }

    #[test]
    fn test_exclude_both() {
        let fs = project();
        let options = WalkOptions::new("/root")
            .exclude_directories(true)
            .exclude_files(true);
        let err = Walk::with_fs(options, &fs).err();
        assert!(matches!(err, Some(Error::Config(ConfigError::ExcludeBoth))));
        assert_eq!(fs.reads.get(), 0);
    }

    #[test]
    fn test_bad_pattern() {
        let fs = project();
        let options = WalkOptions::new("/root").include(["[oops"]);
        let err = Walk::with_fs(options, &fs).err();
        assert!(matches!(err, Some(Error::Config(ConfigError::Pattern { .. }))));
    }

    #[test]
    fn test_pruning_wins_over_include() {
        let fs = project();
        let options = WalkOptions::new("/root")
            .include(["**/*.ts"])
            .exclude(["sub"]);
        assert_eq!(relatives(walk_fs(options, &fs)), ["a.ts"]);
        assert_eq!(fs.reads.get(), 1);
    }

    #[test]
    fn test_max_depth() {
        let fs = project();
        let walk = walk_fs(WalkOptions::new("/root").max_depth(0), &fs);
        assert_eq!(relatives(walk), ["./"]);
        assert_eq!(fs.reads.get(), 0);

        let mut fs = MemoryFs::new();
        fs.dir("/root");
        fs.dir("/root/a");
        fs.dir("/root/a/b");
        fs.dir("/root/a/b/c");
        fs.file("/root/a/b/c/d.ts");
        let walk = walk_fs(WalkOptions::new("/root").max_depth(2), &fs);
        assert_eq!(relatives(walk), ["./", "a/", "a/b/"]);
        assert_eq!(fs.reads.get(), 2);
    }

    #[test]
    fn test_trailing_slash() {
        let fs = project();
        let entries: Vec<Entry> = walk_fs(WalkOptions::new("/root").trailing_slash(false), &fs)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(entries[0].relative(), ".");
        assert_eq!(entries[0].absolute(), "/root");
        let sub = entries.iter().find(|entry| entry.name() == "sub").unwrap();
        assert_eq!(sub.relative(), "sub");
        assert_eq!(sub.absolute(), "/root/sub");
    }

    #[test]
    fn test_lazy() {
        let fs = project();
        let mut walk = walk_fs(WalkOptions::new("/root"), &fs);
        assert_eq!(fs.reads.get(), 0);

        assert_eq!(walk.next().unwrap().unwrap().relative(), "./");
        assert_eq!(fs.reads.get(), 0);

        assert_eq!(walk.next().unwrap().unwrap().relative(), "a.ts");
        assert_eq!(fs.reads.get(), 1);

        drop(walk);
        assert_eq!(fs.reads.get(), 1);
    }

    #[test]
    fn test_unreadable_directory() {
        let mut fs = MemoryFs::new();
        fs.dir("/root");
        fs.file("/root/a.ts");
        fs.add("/root/locked", Node::Unreadable);
        fs.file("/root/z.ts");

        let mut walk = walk_fs(WalkOptions::new("/root"), &fs);
        let mut seen = Vec::new();
        let err = loop {
            match walk.next().unwrap() {
                Ok(entry) => seen.push(entry.relative().to_string()),
                Err(err) => break err,
            }
        };

        assert_eq!(seen, ["./", "a.ts", "locked/"]);
        match err {
            Error::Traversal(err) => {
                assert_eq!(err.root(), "/root/locked");
                assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(walk.next().is_none());
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_vanished_entry() {
        let mut fs = MemoryFs::new();
        fs.dir("/root");
        fs.file("/root/a.ts");
        fs.ghost("/root/gone.ts");

        let results: Vec<_> = walk_fs(WalkOptions::new("/root").exclude_directories(true), &fs)
            .collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().relative(), "a.ts");
        match &results[1] {
            Err(Error::Traversal(err)) => {
                assert_eq!(err.root(), "/root");
                assert_eq!(err.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    /// `/root/{dir/{f.ts, up -> /root}, alias.ts -> /root/dir/f.ts}`
    fn linked() -> MemoryFs {
        let mut fs = MemoryFs::new();
        fs.dir("/root");
        fs.dir("/root/dir");
        fs.file("/root/dir/f.ts");
        fs.symlink("/root/dir/up", "/root");
        fs.symlink("/root/alias.ts", "/root/dir/f.ts");
        fs
    }

    #[test]
    fn test_follow_symlinks() {
        let fs = linked();
        let entries: Vec<Entry> = walk_fs(WalkOptions::new("/root").exclude_directories(true), &fs)
            .collect::<Result<_, _>>()
            .unwrap();

        let found: Vec<(&str, bool)> = entries
            .iter()
            .map(|entry| (entry.relative(), entry.is_symlink()))
            .collect();
        // `up` leads back into the walk and is skipped
        assert_eq!(found, [("dir/f.ts", false), ("dir/f.ts", true)]);
    }

    #[test]
    fn test_skip_symlinks() {
        let fs = linked();
        let options = WalkOptions::new("/root")
            .exclude_directories(true)
            .follow_symlinks(false);
        assert_eq!(relatives(walk_fs(options, &fs)), ["dir/f.ts"]);
    }

    #[test]
    fn test_followed_directory() {
        let mut fs = MemoryFs::new();
        fs.dir("/root");
        fs.dir("/root/real");
        fs.file("/root/real/x.ts");
        fs.dir("/root/links");
        fs.symlink("/root/links/to-real", "/root/real");

        let entries: Vec<Entry> = walk_fs(WalkOptions::new("/root"), &fs)
            .collect::<Result<_, _>>()
            .unwrap();

        let found: Vec<(&str, bool)> = entries
            .iter()
            .map(|entry| (entry.relative(), entry.is_symlink()))
            .collect();
        // a followed symlink is reported under its resolved path
        assert_eq!(
            found,
            [
                ("./", false),
                ("real/", false),
                ("real/x.ts", false),
                ("links/", false),
                ("real/", true),
                ("real/x.ts", false),
            ]
        );
        assert_eq!(entries[4].absolute(), "/root/real/");
    }

    #[test]
    fn test_broken_symlink() {
        let mut fs = MemoryFs::new();
        fs.dir("/root");
        fs.symlink("/root/broken", "/nowhere");

        let mut walk = walk_fs(WalkOptions::new("/root").exclude_directories(true), &fs);
        match walk.next() {
            Some(Err(Error::Traversal(err))) => {
                assert_eq!(err.root(), "/root");
                assert_eq!(err.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_relative_cwd() {
        let walk = Walk::new(WalkOptions::new("some/dir/..")).unwrap();
        let expected = std::env::current_dir().unwrap().join("some");
        assert_eq!(walk.cwd(), normalize(&expected.to_string_lossy(), true));
    }
}
