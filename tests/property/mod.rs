//! Property-based testing for confdiff
//!
//! Uses proptest to verify the diff invariants across randomly generated
//! configuration histories.

use ::confdiff::*;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// One generated entry: (key, value, description)
type Entry = (String, Option<String>, Option<String>);

/// Small key space so versions overlap
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "hbase\\.[a-d]".prop_map(|s| s),
        "hadoop\\.[a-c]\\.size".prop_map(|s| s),
    ]
}

fn value_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[0-9]{0,3}")
}

/// Few distinct descriptions so the rename heuristic actually fires
fn description_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("Max size".to_string()),
        Just("Timeout".to_string()),
        "[a-z ]{1,12}".prop_map(|s| s),
    ])
}

/// One snapshot; each key appears at most once, as in a loaded file
fn version_strategy() -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::btree_map(key_strategy(), (value_strategy(), description_strategy()), 0..8)
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(key, (value, desc))| (key, value, desc))
                .collect()
        })
}

fn history_strategy() -> impl Strategy<Value = Vec<Vec<Entry>>> {
    prop::collection::vec(version_strategy(), 1..5)
}

fn build(history: &[Vec<Entry>]) -> Vec<Configuration> {
    history
        .iter()
        .enumerate()
        .map(|(i, entries)| {
            let version = format!("v{}", i);
            let mut conf = Configuration::new(&version);
            for (key, value, desc) in entries {
                conf.add_property(
                    Property::new(key.clone(), value.clone(), desc.clone(), &version).unwrap(),
                );
            }
            conf
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_transitions_follow_set_laws(history in history_strategy()) {
        let configs = build(&history);
        let non_empty: Vec<&Configuration> = configs.iter().filter(|c| !c.is_empty()).collect();
        let report = diff(&configs);

        prop_assert_eq!(report.transitions.len(), non_empty.len().saturating_sub(1));
        for (transition, pair) in report.transitions.iter().zip(non_empty.windows(2)) {
            let (a, b) = (pair[0].keys(), pair[1].keys());
            let added: BTreeSet<String> = b.difference(&a).cloned().collect();
            let removed: BTreeSet<String> = a.difference(&b).cloned().collect();
            prop_assert_eq!(&transition.added_keys, &added);
            prop_assert_eq!(&transition.removed_keys, &removed);

            // Every added key yields exactly one Added or Renamed event, in key order
            let event_keys: Vec<&str> = transition.added.iter().map(|e| e.property.key()).collect();
            let added_keys: Vec<&str> = added.iter().map(String::as_str).collect();
            prop_assert_eq!(event_keys, added_keys);

            // Removed events cover removed keys that were not renamed away
            for event in &transition.removed {
                prop_assert!(removed.contains(event.property.key()));
                prop_assert_eq!(event.property.source(), pair[0].version());
            }
        }
    }

    #[test]
    fn prop_renames_match_descriptions(history in history_strategy()) {
        let configs = build(&history);
        let non_empty: Vec<&Configuration> = configs.iter().filter(|c| !c.is_empty()).collect();
        let report = diff(&configs);

        for (transition, pair) in report.transitions.iter().zip(non_empty.windows(2)) {
            for event in &transition.added {
                let description = event.property.description();
                let origin = description.and_then(|d| pair[0].get_property_by_description(d));
                match event.action {
                    DiffAction::Renamed => {
                        prop_assert!(origin.is_some());
                        prop_assert_eq!(event.previous.as_ref(), origin);
                    }
                    DiffAction::Added => {
                        prop_assert!(origin.is_none());
                        prop_assert!(event.previous.is_none());
                    }
                    other => prop_assert!(false, "unexpected action {:?}", other),
                }
            }
        }
    }

    #[test]
    fn prop_merged_cardinality(history in history_strategy()) {
        let configs = build(&history);
        let report = diff(&configs);

        let mut variants: BTreeMap<String, BTreeSet<(Option<String>, Option<String>)>> = BTreeMap::new();
        for conf in &configs {
            for p in conf.iter() {
                variants
                    .entry(p.key().to_string())
                    .or_default()
                    .insert((p.value().map(String::from), p.description().map(String::from)));
            }
        }

        let expected: Vec<&String> = variants
            .iter()
            .filter(|(_, v)| v.len() > 1)
            .map(|(k, _)| k)
            .collect();
        let reported: Vec<&String> = report.divergences.iter().map(|d| &d.key).collect();
        prop_assert_eq!(reported, expected);

        for divergence in &report.divergences {
            prop_assert_eq!(divergence.events.len(), variants[&divergence.key].len());
            prop_assert_eq!(divergence.events[0].action, DiffAction::Baseline);
            prop_assert!(divergence.events[1..].iter().all(|e| e.action == DiffAction::Changed));
        }
    }

    #[test]
    fn prop_repeating_a_version_adds_nothing(entries in version_strategy(), copies in 2..5usize) {
        let history = vec![entries; copies];
        let report = diff(&build(&history));

        prop_assert_eq!(report.count(DiffAction::Added), 0);
        prop_assert_eq!(report.count(DiffAction::Removed), 0);
        prop_assert_eq!(report.count(DiffAction::Changed), 0);
    }

    #[test]
    fn prop_diff_is_deterministic(history in history_strategy()) {
        let configs = build(&history);
        let first: Vec<DiffEvent> = diff(&configs).events().cloned().collect();
        let second: Vec<DiffEvent> = diff(&configs).events().cloned().collect();
        prop_assert_eq!(first, second);
    }
}
