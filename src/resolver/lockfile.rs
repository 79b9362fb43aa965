//! Reader for the yarn classic (v1) lockfile format.
//!
//! ```text
//! # yarn lockfile v1
//!
//! "@babel/code-frame@^7.0.0", "@babel/code-frame@^7.10.4":
//!   version "7.12.13"
//!   resolved "https://registry.yarnpkg.com/@babel/code-frame/-/code-frame-7.12.13.tgz#dcfc826b"
//!   integrity sha512-...
//!   dependencies:
//!     "@babel/highlight" "^7.12.13"
//! ```
//!
//! Only the fields the resolver needs are kept.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use nom::branch::alt;
use nom::bytes::complete::{take_till, take_till1};
use nom::character::complete::{char, space0, space1};
use nom::combinator::{all_consuming, rest};
use nom::multi::separated_list1;
use nom::sequence::{delimited, separated_pair};
use nom::{IResult, Parser};

use crate::resolver::errors::ResolveError;

/// Marker present in every yarn classic lockfile.
pub const YARN_CLASSIC_MARKER: &str = "yarn lockfile v1";

/// One entry of `yarn.lock`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockfileEntry {
    /// `name@range` keys sharing this resolution
    pub specifiers: Vec<String>,
    pub version: String,
    pub resolved: Option<String>,
    pub integrity: Option<String>,
    pub dependencies: BTreeMap<String, String>,
    pub optional_dependencies: BTreeMap<String, String>,
}

impl LockfileEntry {
    /// The first specifier, used to name the entry.
    pub fn primary_specifier(&self) -> &str {
        self.specifiers.first().map(String::as_str).unwrap_or("")
    }

    /// All `(name, range)` dependency edges, optional ones included.
    pub fn all_dependencies(&self) -> impl Iterator<Item = (&String, &String)> {
        self.dependencies
            .iter()
            .chain(self.optional_dependencies.iter())
    }
}

/// A parsed `yarn.lock`.
#[derive(Debug, Clone, Default)]
pub struct YarnLock {
    entries: Vec<LockfileEntry>,
    index: HashMap<String, usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Dependencies,
    OptionalDependencies,
    Ignored,
}

impl YarnLock {
    /// Read and parse a lockfile.
    pub fn from_file(path: &Path) -> Result<Self, ResolveError> {
        let text = std::fs::read_to_string(path).map_err(|source| ResolveError::ReadLockfile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse lockfile text.
    pub fn parse(text: &str) -> Result<Self, ResolveError> {
        let mut lock = YarnLock::default();
        let mut current: Option<LockfileEntry> = None;
        let mut section = Section::None;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let malformed = |message: &str| ResolveError::MalformedLockfile {
                line,
                message: message.to_string(),
            };

            let raw = raw.trim_end();
            let content = raw.trim_start();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }

            match raw.len() - content.len() {
                0 => {
                    if let Some(entry) = current.take() {
                        lock.push(entry, line)?;
                    }
                    let key = content
                        .strip_suffix(':')
                        .ok_or_else(|| malformed("expected `:` after entry key"))?;
                    let (_, specifiers) = specifier_list(key)
                        .map_err(|_| malformed("malformed entry key"))?;
                    current = Some(LockfileEntry {
                        specifiers: specifiers.into_iter().map(str::to_string).collect(),
                        ..LockfileEntry::default()
                    });
                    section = Section::None;
                }
                2 => {
                    let entry = current
                        .as_mut()
                        .ok_or_else(|| malformed("property outside of an entry"))?;

                    if let Some(name) = content.strip_suffix(':') {
                        let name = quoted(name).map(|(_, n)| n).unwrap_or(name);
                        section = match name {
                            "dependencies" => Section::Dependencies,
                            "optionalDependencies" => Section::OptionalDependencies,
                            _ => Section::Ignored,
                        };
                        continue;
                    }

                    section = Section::None;
                    let (_, (key, value)) =
                        key_value(content).map_err(|_| malformed("expected `key value`"))?;
                    match key {
                        "version" => entry.version = value.to_string(),
                        "resolved" => entry.resolved = Some(value.to_string()),
                        "integrity" => entry.integrity = Some(value.to_string()),
                        _ => {}
                    }
                }
                4 => {
                    let entry = current
                        .as_mut()
                        .ok_or_else(|| malformed("dependency outside of an entry"))?;
                    let (_, (name, range)) =
                        key_value(content).map_err(|_| malformed("expected `name range`"))?;
                    match section {
                        Section::Dependencies => {
                            entry
                                .dependencies
                                .insert(name.to_string(), range.to_string());
                        }
                        Section::OptionalDependencies => {
                            entry
                                .optional_dependencies
                                .insert(name.to_string(), range.to_string());
                        }
                        Section::Ignored => {}
                        Section::None => return Err(malformed("dependency outside of a section")),
                    }
                }
                _ => return Err(malformed("unexpected indentation")),
            }
        }

        if let Some(entry) = current.take() {
            let last_line = text.lines().count();
            lock.push(entry, last_line)?;
        }

        Ok(lock)
    }

    fn push(&mut self, entry: LockfileEntry, line: usize) -> Result<(), ResolveError> {
        if entry.version.is_empty() {
            return Err(ResolveError::MalformedLockfile {
                line,
                message: format!("entry `{}` has no version", entry.primary_specifier()),
            });
        }

        let idx = self.entries.len();
        for specifier in &entry.specifiers {
            self.index.insert(specifier.clone(), idx);
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[LockfileEntry] {
        &self.entries
    }

    /// Index of the entry resolving `name@range`.
    pub fn find(&self, name: &str, range: &str) -> Option<usize> {
        self.index.get(&format!("{}@{}", name, range)).copied()
    }
}

/// Split `name@range`, keeping the leading `@` of scoped names.
pub fn split_specifier(specifier: &str) -> (&str, &str) {
    match specifier.get(1..).and_then(|rest| rest.find('@')) {
        Some(i) => (&specifier[..i + 1], &specifier[i + 2..]),
        None => (specifier, ""),
    }
}

/// A double-quoted string, without the quotes.
fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c: char| c == '"'), char('"')).parse(input)
}

/// The comma-separated specifiers of an entry key, trailing `:` removed.
fn specifier_list(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(separated_list1(
        (char(','), space0),
        alt((quoted, take_till1(|c: char| c == ','))),
    ))
    .parse(input)
}

/// `key value`, either side optionally quoted.
fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
    all_consuming(separated_pair(
        alt((quoted, take_till1(|c: char| c.is_whitespace()))),
        space1,
        alt((quoted, rest)),
    ))
    .parse(input)
}
