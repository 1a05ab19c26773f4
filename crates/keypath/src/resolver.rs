//! Dotted key-path resolution
//!
//! A key path such as `author.firstName` or `orders.1.id` is split on `.`.
//! The first segment selects a top-level binding, every further segment
//! selects an object member or, for arrays, a decimal index.

use crate::bindings::Bindings;
use crate::error::{KeyPathError, Result};
use serde_json::{Map, Value};

/// A parsed, non-empty key path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dotted path; empty paths and empty segments are rejected
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(KeyPathError::InvalidPath(path.to_string()));
        }
        Ok(Self { segments })
    }

    /// The top-level binding key
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Segments after the root
    pub fn rest(&self) -> &[String] {
        &self.segments[1..]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Resolves key paths against a binding table
///
/// A miss at any segment, including a malformed path, yields `None`.
pub trait KeyPathResolver {
    fn resolve<'a>(&self, path: &str, root: &'a Bindings, case_insensitive: bool) -> Option<&'a Value>;
}

impl<R: KeyPathResolver + ?Sized> KeyPathResolver for &R {
    fn resolve<'a>(&self, path: &str, root: &'a Bindings, case_insensitive: bool) -> Option<&'a Value> {
        (**self).resolve(path, root, case_insensitive)
    }
}

impl<R: KeyPathResolver + ?Sized> KeyPathResolver for Box<R> {
    fn resolve<'a>(&self, path: &str, root: &'a Bindings, case_insensitive: bool) -> Option<&'a Value> {
        (**self).resolve(path, root, case_insensitive)
    }
}

/// Default resolver traversing JSON objects and arrays
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl PathResolver {
    pub fn new() -> Self {
        Self
    }
}

impl KeyPathResolver for PathResolver {
    fn resolve<'a>(&self, path: &str, root: &'a Bindings, case_insensitive: bool) -> Option<&'a Value> {
        let key_path = KeyPath::parse(path).ok()?;

        let mut current = if case_insensitive {
            root.get_ignore_case(key_path.root())?
        } else {
            root.get(key_path.root())?
        };

        for segment in key_path.rest() {
            current = step(current, segment, case_insensitive)?;
        }

        Some(current)
    }
}

fn step<'a>(value: &'a Value, segment: &str, case_insensitive: bool) -> Option<&'a Value> {
    match value {
        Value::Object(map) => member(map, segment, case_insensitive),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn member<'a>(map: &'a Map<String, Value>, key: &str, case_insensitive: bool) -> Option<&'a Value> {
    match map.get(key) {
        Some(value) => Some(value),
        None if case_insensitive => map
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v),
        None => None,
    }
}
