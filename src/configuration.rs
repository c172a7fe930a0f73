//! Per-version and merged configuration containers
//!
//! A [`Configuration`] holds the properties of exactly one version snapshot.
//! A [`MergedConfiguration`] indexes every distinct variant of each key seen
//! across all versions of a diff run.
//!
//! Both use ordered collections so that iteration order, and with it the
//! order of reported differences, is deterministic.

use crate::property::Property;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// The ordered set of properties belonging to one version
#[derive(Debug, Clone, Default, Serialize)]
pub struct Configuration {
    version: String,
    properties: BTreeSet<Property>,
}

impl Configuration {
    /// Create an empty configuration for the given version label
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            properties: BTreeSet::new(),
        }
    }

    /// Version label this configuration was loaded under
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Insert a property, returning `false` if an equal one was already present
    pub fn add_property(&mut self, property: Property) -> bool {
        self.properties.insert(property)
    }

    /// First property with the given key
    pub fn get_property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key() == key)
    }

    /// First property whose description is set and equal to `description`
    ///
    /// This is the lookup behind rename detection: a renamed key is assumed
    /// to keep its description verbatim.
    pub fn get_property_by_description(&self, description: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.description() == Some(description))
    }

    /// All distinct keys, ascending
    pub fn keys(&self) -> BTreeSet<String> {
        self.properties.iter().map(|p| p.key().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl Extend<Property> for Configuration {
    fn extend<I: IntoIterator<Item = Property>>(&mut self, iter: I) {
        for property in iter {
            self.add_property(property);
        }
    }
}

/// Cross-version index from key to the distinct variants seen for it
///
/// Variants compare over `(key, value, description)`, so a key that is the
/// same in every version has exactly one variant regardless of how many
/// versions contain it. The first version to contribute a variant is the
/// one whose `source` is kept.
#[derive(Debug, Clone, Default)]
pub struct MergedConfiguration {
    properties: BTreeMap<String, BTreeSet<Property>>,
}

impl MergedConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a variant for the property's key
    pub fn add_property(&mut self, property: Property) {
        self.properties
            .entry(property.key().to_string())
            .or_default()
            .insert(property);
    }

    /// All variants recorded for `key`, in natural order
    pub fn variants(&self, key: &str) -> Option<&BTreeSet<Property>> {
        self.properties.get(key)
    }

    /// Number of distinct variants recorded for `key` (0 if unknown)
    pub fn size_for_key(&self, key: &str) -> usize {
        self.properties.get(key).map_or(0, BTreeSet::len)
    }

    /// Keys with their variants, in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<Property>)> {
        self.properties.iter()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
