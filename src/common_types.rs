//! Common Types Module
//!
//! Shared data model for the template pipeline: raw directory values as
//! handed over by the search collaborator, their decoded display forms and
//! the per-template record produced by the enumerator.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Loosely-typed value of a single directory attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Integer syntax (flags, revisions, USNs)
    Integer(i64),
    /// Octet-string syntax (key usage, FILETIME periods)
    Bytes(Vec<u8>),
    /// Any single-valued string
    Text(String),
    /// Multi-valued attribute, in server order
    List(Vec<String>),
}

impl RawValue {
    /// Returns the integer payload, if this is an integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RawValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// First textual value suitable for an identity field.
    ///
    /// Empty strings and empty lists count as absent.
    pub fn identity_text(&self) -> Option<String> {
        let text = match self {
            RawValue::Text(s) => s.clone(),
            RawValue::List(values) => values.first()?.clone(),
            RawValue::Integer(value) => value.to_string(),
            RawValue::Bytes(_) => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Integer(value) => write!(f, "{}", value),
            RawValue::Bytes(bytes) => f.write_str(&to_hex(bytes)),
            RawValue::Text(s) => f.write_str(s),
            RawValue::List(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// Lowercase hexadecimal rendering of a byte sequence
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Display form of one attribute after decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DecodedValue {
    Text(String),
    List(Vec<String>),
}

impl DecodedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedValue::Text(s) => Some(s),
            DecodedValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            DecodedValue::List(values) => Some(values),
            DecodedValue::Text(_) => None,
        }
    }
}

impl From<&str> for DecodedValue {
    fn from(s: &str) -> Self {
        DecodedValue::Text(s.to_string())
    }
}

impl From<String> for DecodedValue {
    fn from(s: String) -> Self {
        DecodedValue::Text(s)
    }
}

/// Value stored in a template record's attribute map: either a decoded
/// directory attribute or a derived security property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AttributeValue::Flag(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<DecodedValue> for AttributeValue {
    fn from(value: DecodedValue) -> Self {
        match value {
            DecodedValue::Text(s) => AttributeValue::Text(s),
            DecodedValue::List(values) => AttributeValue::List(values),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Flag(value)
    }
}

/// Insertion-ordered attribute map.
///
/// Template objects carry a few dozen attributes, so lookups are linear.
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> AttributeMap<V> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: V) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Entries ordered by key, for display
    pub fn sorted(&self) -> Vec<(&str, &V)> {
        let mut entries: Vec<(&str, &V)> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for AttributeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for AttributeMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for AttributeMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Raw attributes of one template object, as returned by the search
pub type RawAttributeSet = AttributeMap<RawValue>;

/// Decoded view of one certificate template.
///
/// Built once by the enumerator; fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateRecord {
    name: String,
    display_name: String,
    distinguished_name: String,
    attributes: AttributeMap<AttributeValue>,
}

impl TemplateRecord {
    pub(crate) fn new(
        name: String,
        display_name: String,
        distinguished_name: String,
        attributes: AttributeMap<AttributeValue>,
    ) -> Self {
        Self {
            name,
            display_name,
            distinguished_name,
            attributes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn distinguished_name(&self) -> &str {
        &self.distinguished_name
    }

    pub fn attributes(&self) -> &AttributeMap<AttributeValue> {
        &self.attributes
    }

    /// Shorthand for looking up one attribute or security property
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}
