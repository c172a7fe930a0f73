//! Cross-version configuration diff
//!
//! This module compares an ordered list of versioned configurations and
//! reports what changed.
//!
//! ## Overview
//!
//! The comparison runs in two passes over the input:
//!
//! 1. **Sequential pass**: each non-empty version is compared against the
//!    previous non-empty one. Keys that appear are reported as `Added`, or as
//!    `Renamed` when the previous version holds a property with the exact
//!    same description. Keys that disappear are reported as `Removed`. While
//!    walking the versions, every property is fed into a
//!    [`MergedConfiguration`].
//! 2. **Merged pass**: every key whose merged variant set holds more than one
//!    `(value, description)` combination is reported as one `Baseline`
//!    followed by one `Changed` per further variant.
//!
//! The computation is pure. It performs no I/O, keeps no state between
//! calls, and always runs to completion.
//!
//! ## Examples
//!
//! ```rust
//! use confdiff::{diff, Configuration, DiffAction, Property};
//!
//! # fn main() -> confdiff::Result<()> {
//! let mut v1 = Configuration::new("v1");
//! v1.add_property(Property::new("x", Some("10".into()), None, "v1")?);
//! let mut v2 = Configuration::new("v2");
//! v2.add_property(Property::new("x", Some("20".into()), None, "v2")?);
//!
//! let report = diff(&[v1, v2]);
//! let actions: Vec<DiffAction> = report.events().map(|e| e.action).collect();
//! assert_eq!(actions, vec![DiffAction::Baseline, DiffAction::Changed]);
//! # Ok(())
//! # }
//! ```

use crate::configuration::{Configuration, MergedConfiguration};
use crate::property::Property;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// What happened to a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiffAction {
    /// Key is new in this version
    Added,
    /// Key is new in this version and replaces a key with the same description
    Renamed,
    /// Key disappeared in this version
    Removed,
    /// Another variant of a key that differs across versions
    Changed,
    /// First variant of a key that differs across versions
    Baseline,
}

impl fmt::Display for DiffAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiffAction::Added => "Added",
            DiffAction::Renamed => "Renamed",
            DiffAction::Removed => "Removed",
            DiffAction::Changed => "Changed",
            DiffAction::Baseline => "Baseline",
        };
        f.write_str(name)
    }
}

/// One reported difference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEvent {
    /// Kind of difference
    pub action: DiffAction,
    /// The property the event is about
    pub property: Property,
    /// For `Renamed`, the property of the previous version it was renamed from
    pub previous: Option<Property>,
}

impl DiffEvent {
    fn new(action: DiffAction, property: &Property) -> Self {
        Self {
            action,
            property: property.clone(),
            previous: None,
        }
    }

    fn renamed(property: &Property, from: &Property) -> Self {
        Self {
            action: DiffAction::Renamed,
            property: property.clone(),
            previous: Some(from.clone()),
        }
    }
}

/// Differences between two consecutive non-empty versions
#[derive(Debug, Clone, Default, Serialize)]
pub struct VersionTransition {
    /// Label of the earlier version
    pub from_version: String,
    /// Label of the later version
    pub to_version: String,
    /// `Added` and `Renamed` events, by ascending key
    pub added: Vec<DiffEvent>,
    /// `Removed` events, by ascending key
    pub removed: Vec<DiffEvent>,
    /// Keys present in the later version only
    pub added_keys: BTreeSet<String>,
    /// Keys present in the earlier version only
    pub removed_keys: BTreeSet<String>,
    /// Added or renamed keys without a declared type
    pub missing_type: BTreeSet<String>,
}

impl VersionTransition {
    /// Number of keys reported as `Added`
    pub fn added_count(&self) -> usize {
        self.count(DiffAction::Added)
    }

    /// Number of keys reported as `Renamed`
    pub fn renamed_count(&self) -> usize {
        self.count(DiffAction::Renamed)
    }

    /// Number of keys reported as `Removed`
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    fn count(&self, action: DiffAction) -> usize {
        self.added.iter().filter(|e| e.action == action).count()
    }
}

/// All variants of one key that differs across versions
#[derive(Debug, Clone, Serialize)]
pub struct KeyDivergence {
    pub key: String,
    /// One `Baseline` event followed by one `Changed` event per further variant
    pub events: Vec<DiffEvent>,
}

/// Complete result of a diff run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiffReport {
    /// Number of configurations compared, empty ones included
    pub versions_compared: usize,
    /// Sequential pass results, one per version transition
    pub transitions: Vec<VersionTransition>,
    /// Merged pass results, one per divergent key
    pub divergences: Vec<KeyDivergence>,
}

impl DiffReport {
    /// All events in report order
    ///
    /// Sequential pass events come first, grouped by transition with added
    /// and renamed keys before removed ones. Merged pass events follow by
    /// ascending key.
    pub fn events(&self) -> impl Iterator<Item = &DiffEvent> {
        let sequential = self
            .transitions
            .iter()
            .flat_map(|t| t.added.iter().chain(t.removed.iter()));
        let merged = self.divergences.iter().flat_map(|d| d.events.iter());
        sequential.chain(merged)
    }

    /// Number of events with the given action
    pub fn count(&self, action: DiffAction) -> usize {
        self.events().filter(|e| e.action == action).count()
    }

    /// Number of keys whose value or description differs across versions
    pub fn difference_count(&self) -> usize {
        self.divergences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events().next().is_none()
    }
}

/// Compare configurations given in chronological order
///
/// Configurations without properties are skipped by the sequential pass.
/// They neither act as the "previous" version nor produce a transition.
pub fn diff(configs: &[Configuration]) -> DiffReport {
    let mut merged = MergedConfiguration::new();
    let mut transitions = Vec::new();
    let mut previous: Option<(&Configuration, BTreeSet<String>)> = None;

    for config in configs {
        if config.is_empty() {
            debug!("Skipping empty configuration {}", config.version());
            continue;
        }

        let mut keys = BTreeSet::new();
        for property in config.iter() {
            merged.add_property(property.clone());
            keys.insert(property.key().to_string());
        }

        if let Some((prev_config, prev_keys)) = &previous {
            let transition = compare_versions(prev_config, prev_keys, config, &keys);
            debug!(
                "{} -> {}: {} added, {} renamed, {} removed",
                transition.from_version,
                transition.to_version,
                transition.added_count(),
                transition.renamed_count(),
                transition.removed_count()
            );
            transitions.push(transition);
        }

        previous = Some((config, keys));
    }

    DiffReport {
        versions_compared: configs.len(),
        transitions,
        divergences: merged_differences(&merged),
    }
}

/// Sequential pass for one pair of versions
fn compare_versions(
    prev: &Configuration,
    prev_keys: &BTreeSet<String>,
    current: &Configuration,
    current_keys: &BTreeSet<String>,
) -> VersionTransition {
    let added_keys: BTreeSet<String> = current_keys.difference(prev_keys).cloned().collect();
    let removed_keys: BTreeSet<String> = prev_keys.difference(current_keys).cloned().collect();

    let mut added = Vec::with_capacity(added_keys.len());
    let mut missing_type = BTreeSet::new();
    let mut renamed_from = BTreeSet::new();

    for key in &added_keys {
        let Some(property) = current.get_property(key) else {
            continue;
        };
        // A rename is assumed to keep the description verbatim
        let origin = property
            .description()
            .and_then(|desc| prev.get_property_by_description(desc));

        match origin {
            Some(from) => {
                renamed_from.insert(from.key().to_string());
                added.push(DiffEvent::renamed(property, from));
            }
            None => added.push(DiffEvent::new(DiffAction::Added, property)),
        }
        if property.property_type().is_none() {
            missing_type.insert(key.clone());
        }
    }

    let removed = removed_keys
        .iter()
        .filter(|key| !renamed_from.contains(*key))
        .filter_map(|key| prev.get_property(key))
        .map(|p| DiffEvent::new(DiffAction::Removed, p))
        .collect();

    VersionTransition {
        from_version: prev.version().to_string(),
        to_version: current.version().to_string(),
        added,
        removed,
        added_keys,
        removed_keys,
        missing_type,
    }
}

/// Merged pass: report every key with more than one variant
fn merged_differences(merged: &MergedConfiguration) -> Vec<KeyDivergence> {
    merged
        .iter()
        .filter(|(_, variants)| variants.len() > 1)
        .map(|(key, variants)| {
            let events = variants
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let action = if i == 0 {
                        DiffAction::Baseline
                    } else {
                        DiffAction::Changed
                    };
                    DiffEvent::new(action, p)
                })
                .collect();
            KeyDivergence {
                key: key.clone(),
                events,
            }
        })
        .collect()
}
