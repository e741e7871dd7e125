//! The resolver's output: build variables for a native build generator.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::options::OptionValue;
use crate::resolver::ResolveError;
use crate::util::hash::Fingerprint;

/// Value of a build variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    Bool(bool),
    Path(PathBuf),
    String(String),
}

impl VariableValue {
    pub fn as_path(&self) -> Option<&PathBuf> {
        match self {
            VariableValue::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VariableValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn kind_tag(&self) -> &'static str {
        match self {
            VariableValue::Bool(_) => "bool",
            VariableValue::Path(_) => "path",
            VariableValue::String(_) => "string",
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Bool(b) => write!(f, "{}", b),
            VariableValue::Path(p) => write!(f, "{}", p.display()),
            VariableValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&OptionValue> for VariableValue {
    fn from(value: &OptionValue) -> Self {
        match value {
            OptionValue::Bool(b) => VariableValue::Bool(*b),
            OptionValue::Enum(s) => VariableValue::String(s.clone()),
        }
    }
}

/// Build variables keyed by name.
///
/// Keys are unique and iterate in sorted order, so identical inputs always
/// serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableSet {
    vars: BTreeMap<String, VariableValue>,
}

impl VariableSet {
    pub fn new() -> Self {
        VariableSet::default()
    }

    /// Insert a variable.
    ///
    /// Re-inserting an identical value is a no-op; a different value for an
    /// existing key is a `DuplicateVariable` error.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: VariableValue,
    ) -> Result<(), ResolveError> {
        let key = key.into();
        match self.vars.get(&key) {
            Some(existing) if *existing == value => Ok(()),
            Some(existing) => Err(ResolveError::DuplicateVariable {
                key,
                first: existing.to_string(),
                second: value.to_string(),
            }),
            None => {
                self.vars.insert(key, value);
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&VariableValue> {
        self.vars.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableValue)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Serialize as a JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Stable fingerprint of keys, value kinds and values.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        for (key, value) in &self.vars {
            fp.update_str(key)
                .update_str(value.kind_tag())
                .update_str(&value.to_string());
        }
        fp.finish_short()
    }
}

impl<'a> IntoIterator for &'a VariableSet {
    type Item = (&'a String, &'a VariableValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, VariableValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}
