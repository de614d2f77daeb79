//! Filter parameter binding.
//!
//! Each bind call assigns a freshly numbered named parameter; values are
//! never deduplicated, so two filters carrying equal literals keep
//! separate slots. The compiler binds each filter once and reuses the
//! returned name wherever that filter's predicate appears.

use indexmap::IndexMap;

/// Accumulates `filter{n}` name-to-literal bindings for one compilation.
///
/// The counter is local to the instance, so concurrent compilations never
/// interfere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParameters {
    params: IndexMap<String, serde_json::Value>,
}

impl FilterParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a literal, returning the freshly assigned parameter name.
    pub fn bind(&mut self, value: &serde_json::Value) -> String {
        let name = format!("filter{}", self.params.len());
        self.params.insert(name.clone(), value.clone());
        name
    }

    /// Parameter names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Look up the literal bound to a name.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.params.get(name)
    }

    /// Name-to-literal pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
