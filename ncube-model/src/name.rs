use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};

use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Value;

/// A case-insensitive name: axis names, coordinate keys and meta-property
/// keys are all compared and hashed ignoring ASCII case (spec invariant 1,
/// §4.4 "case-insensitive keys"), while still remembering the originally
/// supplied casing for display.
///
/// `folded` is kept alongside `original` rather than derived on the fly so
/// that [`Hash`] and [`Borrow<str>`] agree on the exact bytes hashed — the
/// `Borrow` contract requires `k.hash() == k.borrow().hash()`, which a
/// case-sensitive `Borrow<str>` over `original` would break for any
/// differently-cased lookup key.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Name {
    original: String,
    folded: String,
}

impl Name {
    /// Wraps a string as a case-insensitive name.
    pub fn new(value: impl Into<String>) -> Self {
        let original = value.into();
        let folded = original.to_ascii_lowercase();
        Self { original, folded }
    }

    /// The original-case string.
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.folded
    }
}

/// A case-insensitive `String -> Value` map, used for meta-properties
/// (cube/axis/column level) and for coordinates (spec §3, §4.4).
///
/// Backed by an [`IndexMap`] so insertion order survives for deterministic
/// enumeration (the out-of-scope JSON formatter, §6, depends on stable
/// ordering when it round-trips a cube).
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NameMap(IndexMap<Name, Value>);

impl NameMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Inserts or replaces the value for `key`, returning the previous value
    /// if the key (case-insensitively) was already present.
    pub fn insert(&mut self, key: impl Into<Name>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key.to_ascii_lowercase().as_str())
    }

    /// Case-insensitive removal.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key.to_ascii_lowercase().as_str())
    }

    /// Case-insensitive containment check.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key.to_ascii_lowercase().as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(Name, Value)> for NameMap {
    fn from_iter<T: IntoIterator<Item = (Name, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
