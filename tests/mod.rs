//! Main test module for confdiff
//!
//! This module includes all test suites:
//! - Integration tests loading real XML files from disk
//! - Property-based tests for the diff invariants

pub mod integration;
pub mod property;

#[cfg(test)]
mod edge_cases {
    use ::confdiff::*;

    fn conf(version: &str, entries: &[(&str, Option<&str>, Option<&str>)]) -> Configuration {
        let mut conf = Configuration::new(version);
        for (key, value, desc) in entries {
            conf.add_property(
                Property::new(*key, value.map(String::from), desc.map(String::from), version)
                    .unwrap(),
            );
        }
        conf
    }

    #[test]
    fn test_unset_versus_empty_value() {
        let v1 = conf("v1", &[("a", None, None)]);
        let v2 = conf("v2", &[("a", Some(""), None)]);

        let report = diff(&[v1, v2]);
        assert_eq!(report.difference_count(), 1);
        let values: Vec<Option<&str>> = report.divergences[0]
            .events
            .iter()
            .map(|e| e.property.value())
            .collect();
        assert_eq!(values, vec![None, Some("")]);
    }

    #[test]
    fn test_key_reappearing_after_removal() {
        let v1 = conf("v1", &[("a", Some("1"), None), ("b", Some("1"), None)]);
        let v2 = conf("v2", &[("a", Some("1"), None)]);
        let v3 = conf("v3", &[("a", Some("1"), None), ("b", Some("1"), None)]);

        let report = diff(&[v1, v2, v3]);
        let sequence: Vec<(DiffAction, &str, &str)> = report
            .events()
            .map(|e| (e.action, e.property.key(), e.property.source()))
            .collect();
        assert_eq!(
            sequence,
            vec![
                (DiffAction::Removed, "b", "v1"),
                (DiffAction::Added, "b", "v3"),
            ]
        );
    }

    #[test]
    fn test_leading_empty_versions() {
        let report = diff(&[
            Configuration::new("v0"),
            Configuration::new("v0.5"),
            conf("v1", &[("a", Some("1"), None)]),
            conf("v2", &[("a", Some("1"), None), ("b", Some("2"), None)]),
        ]);
        assert_eq!(report.transitions.len(), 1);
        assert_eq!(report.transitions[0].from_version, "v1");
        assert_eq!(report.count(DiffAction::Added), 1);
    }

    #[test]
    fn test_rename_with_edited_description_is_add_and_remove() {
        let v1 = conf("v1", &[("old.key", Some("1"), Some("Max size"))]);
        let v2 = conf("v2", &[("new.key", Some("1"), Some("Maximum size"))]);

        let report = diff(&[v1, v2]);
        assert_eq!(report.count(DiffAction::Renamed), 0);
        assert_eq!(report.count(DiffAction::Added), 1);
        assert_eq!(report.count(DiffAction::Removed), 1);
    }

    #[test]
    fn test_three_variants_of_one_key() {
        let report = diff(&[
            conf("v1", &[("k", Some("b"), None)]),
            conf("v2", &[("k", Some("a"), None)]),
            conf("v3", &[("k", Some("b"), Some("documented"))]),
        ]);

        let divergence = &report.divergences[0];
        assert_eq!(divergence.key, "k");
        let seen: Vec<(DiffAction, Option<&str>, Option<&str>)> = divergence
            .events
            .iter()
            .map(|e| (e.action, e.property.value(), e.property.description()))
            .collect();
        assert_eq!(
            seen,
            vec![
                (DiffAction::Baseline, Some("a"), None),
                (DiffAction::Changed, Some("b"), None),
                (DiffAction::Changed, Some("b"), Some("documented")),
            ]
        );
    }
}
