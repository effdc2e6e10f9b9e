//! Interned identifiers.
//!
//! A `StringTable` maps text to a canonical shared `Name`. Both readers intern
//! every identifier and map key through the table they are handed, so names
//! produced during one session share storage and compare by pointer. Equality
//! falls back to content comparison, which keeps names from different tables
//! interoperable.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// A canonical, cheaply clonable identifier.
#[derive(Clone)]
pub struct Name(Arc<str>);

impl Name {
    /// Creates a name outside of any table. Prefer `StringTable::intern`.
    pub fn new(text: &str) -> Self {
        Name(Arc::from(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when both names are the same interned instance.
    pub fn ptr_eq(&self, other: &Name) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `str`'s hash for `Borrow<str>` lookups.
        self.as_str().hash(state)
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Interning table. One instance is created per parse/validation session and
/// passed by reference to the readers.
#[derive(Debug, Default)]
pub struct StringTable {
    names: HashSet<Name>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical name for `text`, inserting it on first use.
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(existing) = self.names.get(text) {
            return existing.clone();
        }
        let name = Name::new(text);
        self.names.insert(name.clone());
        name
    }

    /// Returns the canonical name for `text` without inserting it.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.names.get(text).cloned()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.names.contains(text)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_returns_shared_instance() {
        let mut table = StringTable::new();
        let a = table.intern("field");
        let b = table.intern("field");
        assert!(a.ptr_eq(&b));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn names_from_different_tables_compare_by_content() {
        let mut left = StringTable::new();
        let mut right = StringTable::new();
        let a = left.intern("key");
        let b = right.intern("key");
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn lookup_by_str_without_inserting() {
        let mut table = StringTable::new();
        table.intern("present");
        assert!(table.get("present").is_some());
        assert!(table.get("absent").is_none());
        assert!(!table.contains("absent"));
        assert_eq!(table.len(), 1);
    }
}
