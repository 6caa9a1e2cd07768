//! Property bags
//!
//! Strongly typed mapping from property key to an ordered set of string values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Well-known property keys
pub mod keys {
    pub const CATEGORY: &str = "Category";
    pub const PARALLEL_SCOPE: &str = "ParallelScope";
    pub const DESCRIPTION: &str = "Description";
}

/// Ordered key -> ordered-set-of-values mapping
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, OneOrMany>", into = "IndexMap<String, Vec<String>>")]
pub struct PropertyBag {
    entries: IndexMap<String, Vec<String>>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value under `key`; values already present are ignored
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let values = self.entries.entry(key.into()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Builder-style [`PropertyBag::add`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Union of `self` and `other`.
    ///
    /// Per key, `self`'s values come first followed by `other`'s values not
    /// already present. Keys keep `self`'s order, then `other`'s new keys.
    pub fn merge(&self, other: &PropertyBag) -> PropertyBag {
        let mut merged = self.clone();
        for (key, values) in &other.entries {
            merged.entries.entry(key.clone()).or_default();
            for value in values {
                merged.add(key.clone(), value.clone());
            }
        }
        merged
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyBag
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = PropertyBag::new();
        for (key, value) in iter {
            bag.add(key, value);
        }
        bag
    }
}

/// A property value written either as a single string or a list
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<IndexMap<String, OneOrMany>> for PropertyBag {
    fn from(raw: IndexMap<String, OneOrMany>) -> Self {
        let mut bag = PropertyBag::new();
        for (key, values) in raw {
            let values = match values {
                OneOrMany::One(v) => vec![v],
                OneOrMany::Many(v) => v,
            };
            // keep keys declared with an empty list
            bag.entries.entry(key.clone()).or_default();
            for value in values {
                bag.add(key.clone(), value);
            }
        }
        bag
    }
}

impl From<PropertyBag> for IndexMap<String, Vec<String>> {
    fn from(bag: PropertyBag) -> Self {
        bag.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_set_semantics() {
        let mut bag = PropertyBag::new();
        bag.add("Category", "Smoke");
        bag.add("Category", "Smoke");
        bag.add("Category", "Login");
        assert_eq!(bag.get("Category").unwrap(), ["Smoke", "Login"]);
    }

    #[test]
    fn test_merge_order() {
        let a = PropertyBag::new()
            .with("Category", "Smoke")
            .with("Owner", "qa");
        let b = PropertyBag::new()
            .with("Category", "Login")
            .with("Category", "Smoke")
            .with("Priority", "1");

        let merged = a.merge(&b);
        let keys: Vec<_> = merged.keys().collect();
        assert_eq!(keys, vec!["Category", "Owner", "Priority"]);
        assert_eq!(merged.get("Category").unwrap(), ["Smoke", "Login"]);
        assert_eq!(merged.first("Priority"), Some("1"));
    }

    #[test]
    fn test_merge_with_empty() {
        let a = PropertyBag::new().with("Owner", "qa");
        assert_eq!(a.merge(&PropertyBag::new()), a);
        assert_eq!(PropertyBag::new().merge(&a), a);
    }

    #[test]
    fn test_deserialize_one_or_many() {
        let bag: PropertyBag =
            serde_yaml::from_str("Category: [Smoke, Login]\nOwner: qa\nEmpty: []\n").unwrap();
        assert_eq!(bag.get("Category").unwrap(), ["Smoke", "Login"]);
        assert_eq!(bag.get("Owner").unwrap(), ["qa"]);
        assert_eq!(bag.get("Empty").unwrap().len(), 0);
    }

    #[test]
    fn test_serialize_as_lists() {
        let bag: PropertyBag = [("Owner", "qa")].into_iter().collect();
        let json = serde_json::to_string(&bag).unwrap();
        assert_eq!(json, r#"{"Owner":["qa"]}"#);
    }
}
