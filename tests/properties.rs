//! Property-based tests for the unique column combination search.
//!
//! Tables are generated with a handful of columns and a small value domain, so that uniqueness is
//! neither trivial nor impossible. Cells are randomly padded with whitespace to exercise value
//! normalization.

mod common;

use common::{is_unique, minimal_uccs, table};
use proptest::prelude::*;
use std::collections::BTreeSet;
use ucc_profiler::{AttributeCombination, ColumnId, PositionListIndex, ProfilerConfig, UccProfiler};

fn rows_strategy() -> impl Strategy<Value = (usize, Vec<Vec<String>>)> {
    (1usize..=5).prop_flat_map(|width| {
        let cell = (0u8..3, any::<bool>()).prop_map(|(value, padded)| {
            if padded {
                format!(" {} ", value)
            } else {
                value.to_string()
            }
        });
        (
            Just(width),
            prop::collection::vec(prop::collection::vec(cell, width), 0..10),
        )
    })
}

fn combination_strategy(width: usize) -> impl Strategy<Value = AttributeCombination> {
    prop::collection::vec(0..width as ColumnId, 1..=width)
        .prop_map(|columns| columns.into_iter().collect())
}

fn column_pli(t: &ucc_profiler::Table, column: ColumnId) -> PositionListIndex {
    PositionListIndex::from_column(
        AttributeCombination::singleton(column),
        t.column_keys(column).unwrap().iter(),
    )
}

proptest! {
    #[test]
    fn finds_exactly_the_minimal_uccs((width, rows) in rows_strategy()) {
        let t = table(width, &rows);
        let uccs = UccProfiler::default().profile(&t).unwrap();
        let found: BTreeSet<_> = uccs.iter().map(|ucc| ucc.combination().clone()).collect();

        prop_assert_eq!(found.len(), uccs.len());
        prop_assert_eq!(found, minimal_uccs(&t));
    }

    #[test]
    fn results_are_unique_and_minimal((width, rows) in rows_strategy()) {
        let t = table(width, &rows);
        let uccs = UccProfiler::default().profile(&t).unwrap();
        for ucc in uccs.iter() {
            prop_assert!(is_unique(&t, ucc.combination()));
            for other in uccs.iter() {
                if other.combination() != ucc.combination() {
                    prop_assert!(!other.combination().is_subset(ucc.combination()));
                }
            }
        }
    }

    #[test]
    fn strategies_agree_and_runs_repeat((width, rows) in rows_strategy()) {
        let t = table(width, &rows);
        let refinement = UccProfiler::default().profile(&t).unwrap();
        prop_assert_eq!(&refinement, &UccProfiler::default().profile(&t).unwrap());

        let hashing = UccProfiler::new(ProfilerConfig {
            strategy: ucc_profiler::Strategy::RowHashing,
            ..ProfilerConfig::default()
        })
        .profile(&t)
        .unwrap();
        prop_assert_eq!(refinement, hashing);
    }

    #[test]
    fn refinement_matches_direct_construction(
        ((width, rows), x, y) in rows_strategy().prop_flat_map(|(width, rows)| {
            (
                Just((width, rows)),
                combination_strategy(width),
                combination_strategy(width),
            )
        })
    ) {
        let t = table(width, &rows);
        let build = |combination: &AttributeCombination| {
            let mut columns = combination.iter().map(|column| column_pli(&t, column));
            let first = columns.next().unwrap();
            columns.fold(first, |pli, column| pli.intersect(&column).unwrap())
        };

        let refined = build(&x).intersect(&build(&y)).unwrap();
        let direct = PositionListIndex::for_columns(&t, x.union(&y)).unwrap();
        prop_assert_eq!(&refined, &direct);
        prop_assert_eq!(refined.is_unique(), is_unique(&t, &x.union(&y)));
    }
}
