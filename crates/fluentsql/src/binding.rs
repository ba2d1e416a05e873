//! Binding table and statement parameters.
//!
//! Every value a builder receives is stored here under a generated name and
//! referenced from SQL text as `:name`. Names come from a per-builder counter
//! that only moves forward, so two allocations never share a name, even
//! across nested condition scopes.

use crate::value::Value;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Name prefixes, one per call-site kind. Purely cosmetic: uniqueness comes
/// from the counter.
pub(crate) mod prefix {
    pub const WHERE: &str = "w";
    pub const IN_LIST: &str = "in";
    pub const INSERT: &str = "i";
    pub const UPDATE: &str = "u";
}

/// Render a binding name as an SQL placeholder.
pub fn placeholder(name: &str) -> String {
    format!(":{name}")
}

/// Ordered mapping from parameter name to bound value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
    counter: u32,
}

impl Bindings {
    /// Create an empty binding table.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty table whose counter continues after this one.
    ///
    /// Names allocated from the continuation never collide with names
    /// already handed out here.
    pub fn continuation(&self) -> Self {
        Self {
            entries: Vec::new(),
            counter: self.counter,
        }
    }

    /// Store `value` under a fresh name and return the name.
    pub fn allocate(&mut self, prefix: &str, value: impl Into<Value>) -> String {
        self.counter += 1;
        let name = format!("{prefix}{}", self.counter);
        self.entries.push((name.clone(), value.into()));
        name
    }

    /// Store a caller-named value as-is. An existing entry with the same
    /// name is replaced in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Merge caller-named values (raw fragments).
    pub fn merge(&mut self, bindings: &[(&str, Value)]) {
        for (name, value) in bindings {
            self.insert(*name, value.clone());
        }
    }

    /// Look up a value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Number of stored bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of names allocated so far (never decreases).
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterate over binding names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

impl Serialize for Bindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Parameters handed to the driver together with SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// Bound by name (`:name` placeholders).
    Named(Vec<(String, Value)>),
    /// Bound by 1-based position (`?` placeholders).
    Positional(Vec<Value>),
}

impl Params {
    /// No parameters.
    pub fn none() -> Self {
        Params::Positional(Vec::new())
    }

    /// Named parameters from `(name, value)` pairs.
    pub fn named<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        Params::Named(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Positional parameters.
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Params::Positional(values.into_iter().collect())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        match self {
            Params::Named(entries) => entries.len(),
            Params::Positional(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a named parameter. Always `None` for positional parameters.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Params::Named(entries) => entries.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            Params::Positional(_) => None,
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::none()
    }
}

impl From<Bindings> for Params {
    fn from(bindings: Bindings) -> Self {
        Params::Named(bindings.entries)
    }
}

impl From<&Bindings> for Params {
    fn from(bindings: &Bindings) -> Self {
        Params::Named(bindings.entries.clone())
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Params::Named(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (name, value) in entries {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Params::Positional(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}
