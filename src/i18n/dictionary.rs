//! Translation dictionaries

use serde::Deserialize;
use serde_json::{Map, Value};

/// A namespace's translations: a JSON object of arbitrarily nested strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Dictionary(Map<String, Value>);

impl Dictionary {
    /// Parse a dictionary from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or its root is not an object.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build a dictionary from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Resolve a dotted key path (`a.b.c`) to its string.
    ///
    /// Returns `None` when a segment is missing or the path ends on
    /// something other than a string.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let mut node = self.0.get(segments.next()?)?;

        for segment in segments {
            node = node.get(segment)?;
        }

        node.as_str()
    }

    /// Number of top-level entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
