//! Property-based tests for the merge rules.

use super::merger::ConfigurationMerger;
use super::schema::{ConfigurationFile, StringList};
use proptest::prelude::*;

fn path_strategy() -> impl Strategy<Value = String> {
    "/[a-z]{1,12}(/[a-z0-9]{1,8}){0,3}"
}

fn list_strategy() -> impl Strategy<Value = Option<StringList>> {
    prop::option::of(prop::collection::vec("[a-z/:]{1,10}", 0..4).prop_map(StringList::Strings))
}

fn file_strategy() -> impl Strategy<Value = ConfigurationFile> {
    (
        list_strategy(),
        list_strategy(),
        prop::option::of(path_strategy()),
        prop::option::of(path_strategy()),
        prop::option::of("[0-9a-f]{6,12}"),
        prop::option::of(0i64..64),
        prop::collection::vec(path_strategy(), 0..3),
        any::<bool>(),
    )
        .prop_map(
            |(
                source_directories,
                targets,
                binary,
                typeshed,
                version,
                workers,
                search_path,
                disabled,
            )| ConfigurationFile {
                source_directories,
                targets,
                binary,
                typeshed,
                version,
                workers,
                search_path,
                disabled,
                ..Default::default()
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // A field set by a higher-priority file is never replaced.
    #[test]
    fn first_non_empty_value_wins(files in prop::collection::vec(file_strategy(), 1..4)) {
        let merged = ConfigurationMerger::merge(files.clone());

        let expected_binary = files.iter().find_map(|f| f.binary.clone().filter(|b| !b.is_empty()));
        prop_assert_eq!(merged.binary, expected_binary);

        let expected_version = files.iter().find_map(|f| f.version.clone());
        prop_assert_eq!(merged.version_hash, expected_version);

        let expected_workers = files.iter().find_map(|f| f.workers.filter(|w| *w != 0));
        prop_assert_eq!(merged.workers, expected_workers);

        let expected_targets = files
            .iter()
            .find_map(|f| f.targets.clone().filter(|t| !t.is_empty()))
            .unwrap_or_default();
        prop_assert_eq!(merged.targets, expected_targets);
    }

    // Search path entries from every file survive, in read order.
    #[test]
    fn search_path_concatenates(files in prop::collection::vec(file_strategy(), 1..4)) {
        let merged = ConfigurationMerger::merge(files.clone());
        let expected: Vec<String> = files.iter().flat_map(|f| f.search_path.clone()).collect();
        prop_assert_eq!(merged.search_directories, expected);
    }

    // Disabled is the OR of every file.
    #[test]
    fn disabled_is_monotonic(files in prop::collection::vec(file_strategy(), 1..4)) {
        let merged = ConfigurationMerger::merge(files.clone());
        prop_assert_eq!(merged.disabled, files.iter().any(|f| f.disabled));
    }
}
