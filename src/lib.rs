//! Glob based file searching.
//!
//! A [`Matcher`] combines globs, regular expressions and predicates into a single decision about a
//! slash separated path. A [`Walk`] lazily enumerates a directory tree and yields the entries
//! whose path relative to the walked directory passes an include and an exclude matcher.
//!
//! Here's a rather long matching example:
//!
//! ```
//! # use globber::*;
//! # fn test() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
//! let shop = Matcher::new(["things/shop/", "!things/shop/bananas/"], &MatcherConfig::new())?;
//! assert!(!shop.matches("things/file1.dat"));
//! assert!(shop.matches("things/shop/info.txt"));
//! assert!(shop.matches("things/shop/apples/gala.txt"));
//!
//! // the negated glob vetoes everything below `bananas`, but not the directory itself
//! assert!(shop.matches("things/shop/bananas"));
//! assert!(!shop.matches("things/shop/bananas/curved.txt"));
//!
//! // dot files are only matched on request
//! assert!(!shop.matches("things/shop/.index"));
//! let config = MatcherConfig::new().add_flags(MatchFlag::DOT);
//! let dotted = Matcher::new(["things/shop/"], &config)?;
//! assert!(dotted.matches("things/shop/.index"));
//!
//! // and so are junk files
//! assert!(!dotted.matches("things/shop/Thumbs.db"));
//!
//! // globs, regular expressions and predicates can be mixed:
//! let mixed = Matcher::new(
//!     [
//!         MatchPattern::from("**/*.txt"),
//!         MatchPattern::from(regex::Regex::new(r"\.dat$")?),
//!         MatchPattern::predicate(|path| path.starts_with("things/shop/apples/")),
//!     ],
//!     &MatcherConfig::new().extensions(["txt", "bak"]),
//! )?;
//! assert!(mixed.matches("things/shop/bananas/curved.txt"));
//! assert!(mixed.matches("things/shop/apples/gala.bak"));
//! assert!(!mixed.matches("things/shop/bananas/curved.bak"));
//! // the extension filter applies before any pattern is tried
//! assert!(!mixed.matches("things/file1.dat"));
//! # Ok(())
//! # }
//! # test().unwrap()
//! ```
//!
//! Walking a directory uses the same matching rules on the relative paths of its entries:
//!
//! ```no_run
//! # use globber::{WalkOptions, walk};
//! # fn test() -> Result<(), globber::Error> {
//! let options = WalkOptions::new("/srv/project")
//!     .extensions(["rs"])
//!     .exclude(["target"]);
//!
//! for entry in walk(options)? {
//!     println!("{}", entry?.relative());
//! }
//! # Ok(())
//! # }
//! # test().unwrap()
//! ```

mod error;
mod glob;
mod junk;
mod matcher;
mod normalize;
mod walk;

#[doc(inline)]
pub use error::{ConfigError, Error, TraversalError};

#[doc(inline)]
pub use glob::{Glob, GlobFlag, ParseError};

#[doc(inline)]
pub use junk::{is_junk, is_not_junk};

#[doc(inline)]
pub use matcher::{MatchFlag, MatchFn, MatchPattern, Matcher, MatcherConfig, create_matcher};

#[doc(inline)]
pub use normalize::{SEPARATOR, get_path, normalize, normalize_directory, normalize_path};

#[doc(inline)]
pub use walk::{
    DirEntryInfo, Entry, EntryKind, FileStat, RealFs, RealReadDir, Walk, WalkFs, WalkOptions,
    walk,
};
