//! Read-only hierarchical configuration views.
//!
//! The resolver only needs three things from a source: look up a key's text,
//! open a named sub-section, and tell whether that sub-section exists. Anything
//! that can answer those questions implements [`ConfigSource`].
//!
//! Two sources ship with the crate:
//!
//! - [`toml::Table`] — sub-tables are sections, scalars render as text.
//! - [`MemorySource`] — an owned tree built from flat `Section:Key` pairs or
//!   from TOML. A node can carry a value *and* children at the same time.
//!
//! Key comparison is ASCII case-insensitive in both. For a `Table`, an exact
//! match wins over a case-folded one.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::error::SourceError;

/// Separator between path segments in [`MemorySource`] pair keys.
pub const SECTION_SEPARATOR: char = ':';

/// A read-only, hierarchical, string-keyed configuration view.
pub trait ConfigSource {
    /// Direct lookup of `key` in this view. `None` means not present.
    fn get(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Open the sub-section `name`, or `None` if it does not exist.
    fn section(&self, name: &str) -> Option<Box<dyn ConfigSource + '_>>;

    fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }
}

impl<S: ConfigSource + ?Sized> ConfigSource for &S {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        (**self).get(key)
    }

    fn section(&self, name: &str) -> Option<Box<dyn ConfigSource + '_>> {
        (**self).section(name)
    }

    fn has_section(&self, name: &str) -> bool {
        (**self).has_section(name)
    }
}

impl ConfigSource for Table {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        table_lookup(self, key).and_then(scalar_text)
    }

    fn section(&self, name: &str) -> Option<Box<dyn ConfigSource + '_>> {
        let sub = table_lookup(self, name)?.as_table()?;
        Some(Box::new(sub))
    }
}

fn table_lookup<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    table.get(key).or_else(|| {
        table
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// Render a scalar TOML value as configuration text. Tables and arrays are not
/// scalars and have no text form.
fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Integer(i) => Some(Cow::Owned(i.to_string())),
        Value::Float(f) => Some(Cow::Owned(f.to_string())),
        Value::Boolean(b) => Some(Cow::Owned(b.to_string())),
        Value::Datetime(d) => Some(Cow::Owned(d.to_string())),
        Value::Array(_) | Value::Table(_) => None,
    }
}

/// An owned configuration tree.
///
/// Built from flat pairs whose keys use `:` between segments:
///
/// ```
/// use enforcevars::{ConfigSource, MemorySource};
///
/// let source = MemorySource::from_pairs([
///     ("Port", "8080"),
///     ("Database:Url", "postgres://db"),
/// ]);
/// assert_eq!(source.get("port").as_deref(), Some("8080"));
/// assert!(source.has_section("Database"));
/// ```
///
/// Keys containing `__` are stored literally, so a flat `Section__Key` entry is
/// found by direct lookup before any nested interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySource {
    value: Option<String>,
    children: Vec<(String, MemorySource)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from `(path, value)` pairs. Later pairs win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut source = Self::new();
        for (key, value) in pairs {
            source.insert(key.as_ref(), value);
        }
        source
    }

    /// Build a tree from a TOML table. Arrays become sections keyed by index
    /// (`servers:0`, `servers:1`, ...).
    pub fn from_table(table: &Table) -> Self {
        let mut source = Self::new();
        for (key, value) in table {
            source.child_mut(key).absorb(value);
        }
        source
    }

    /// Parse TOML text into a tree.
    pub fn from_toml_str(content: &str) -> Result<Self, SourceError> {
        Self::parse(content, PathBuf::from("<string>"))
    }

    /// Read and parse a TOML file into a tree.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SourceError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path.to_path_buf())
    }

    fn parse(content: &str, path: PathBuf) -> Result<Self, SourceError> {
        let table: Table =
            toml::from_str(content).map_err(|e| SourceError::Parse { path, source: e })?;
        Ok(Self::from_table(&table))
    }

    /// Set the value at a `:`-separated path, creating sections as needed.
    pub fn insert(&mut self, path: &str, value: impl Into<String>) {
        let mut current = self;
        for segment in path.split(SECTION_SEPARATOR) {
            current = current.child_mut(segment);
        }
        current.value = Some(value.into());
    }

    /// Chaining form of [`insert`](Self::insert).
    pub fn with(mut self, path: &str, value: impl Into<String>) -> Self {
        self.insert(path, value);
        self
    }

    /// The value held directly by this node, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn exists(&self) -> bool {
        self.value.is_some() || !self.children.is_empty()
    }

    fn child(&self, key: &str) -> Option<&MemorySource> {
        self.children
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, child)| child)
    }

    fn child_mut(&mut self, key: &str) -> &mut MemorySource {
        let index = match self
            .children
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some(index) => index,
            None => {
                self.children.push((key.to_string(), MemorySource::new()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }

    fn absorb(&mut self, value: &Value) {
        match value {
            Value::Table(table) => {
                for (key, value) in table {
                    self.child_mut(key).absorb(value);
                }
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.child_mut(&index.to_string()).absorb(item);
                }
            }
            scalar => self.value = scalar_text(scalar).map(Cow::into_owned),
        }
    }
}

impl ConfigSource for MemorySource {
    fn get(&self, key: &str) -> Option<Cow<'_, str>> {
        self.child(key)?.value().map(Cow::Borrowed)
    }

    fn section(&self, name: &str) -> Option<Box<dyn ConfigSource + '_>> {
        let child = self.child(name).filter(|child| child.exists())?;
        Some(Box::new(child))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for MemorySource {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}
