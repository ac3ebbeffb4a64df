mod common;

use common::{minimal_uccs, table};
use std::collections::BTreeSet;
use ucc_profiler::{
    AttributeCombination, ProfilerConfig, Strategy, Table, TableBuilder, Ucc, UccProfiler,
};

fn profile(table: &Table, strategy: Strategy) -> Vec<Ucc<'_>> {
    UccProfiler::new(ProfilerConfig {
        strategy,
        ..ProfilerConfig::default()
    })
    .profile(table)
    .unwrap()
}

fn found(table: &Table) -> Vec<AttributeCombination> {
    let uccs = profile(table, Strategy::PartitionRefinement);
    assert_eq!(uccs, profile(table, Strategy::RowHashing));
    uccs.into_iter().map(|ucc| ucc.combination().clone()).collect()
}

fn combinations(list: &[&[u16]]) -> Vec<AttributeCombination> {
    list.iter().map(|c| AttributeCombination::new(c)).collect()
}

fn rows(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

#[test]
fn pair_is_unique_but_neither_column_is() {
    let t = table(2, &rows(&[&["1", "x"], &["1", "y"], &["2", "x"]]));
    assert_eq!(found(&t), combinations(&[&[0, 1]]));
}

#[test]
fn unique_columns_stop_the_search() {
    let t = table(2, &rows(&[&["1", "x"], &["2", "y"], &["3", "z"]]));
    assert_eq!(found(&t), combinations(&[&[0], &[1]]));
}

#[test]
fn single_row() {
    let t = table(3, &rows(&[&["1", "1", "1"]]));
    assert_eq!(found(&t), combinations(&[&[0], &[1], &[2]]));
}

#[test]
fn no_rows() {
    let t = table(2, &[]);
    assert_eq!(found(&t), combinations(&[&[0], &[1]]));
}

#[test]
fn identical_rows() {
    let t = table(3, &rows(&[&["1", "x", "p"], &["1", "x", "p"], &["2", "y", "q"]]));
    assert!(found(&t).is_empty());
}

#[test]
fn supersets_are_not_reported() {
    let t = table(3, &rows(&[&["1", "x", "p"], &["1", "y", "q"], &["2", "x", "p"]]));
    assert_eq!(found(&t), combinations(&[&[0, 1], &[0, 2]]));
}

#[test]
fn no_columns() {
    let t = TableBuilder::new("t", Vec::<String>::new()).unwrap().build();
    assert!(found(&t).is_empty());
}

#[test]
fn missing_cells_equal_empty_cells() {
    let t = table(2, &rows(&[&["1", ""], &["1"], &["2", " "]]));
    assert!(found(&t).is_empty());
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let t = table(2, &rows(&[&["x", "1"], &[" x ", "2"], &["y", "2"]]));
    assert_eq!(found(&t), combinations(&[&[0, 1]]));
}

#[test]
fn pruned_subsets_block_later_levels() {
    // {a,b} is unique, so {a,b,c,d} must not be reported even though none of its 3-subsets is.
    let t = table(
        4,
        &rows(&[
            &["1", "1", "0", "0"],
            &["1", "2", "0", "0"],
            &["2", "1", "0", "0"],
            &["2", "2", "0", "0"],
        ]),
    );
    assert_eq!(found(&t), combinations(&[&[0, 1]]));
}

/// Linear congruential generator with a fixed seed per width.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

macro_rules! check_size {
    ($($name:ident)*) => {
        $(
        #[test]
        fn $name() {
            check(stringify!($name).as_bytes().last().unwrap() - b'0');
        }
        )*
    }
}

check_size! {
    lattice_over_1
    lattice_over_2
    lattice_over_3
    lattice_over_4
    lattice_over_5
    lattice_over_6
    lattice_over_7
    lattice_over_8
}

fn check(width: u8) {
    let width = usize::from(width);
    let mut rng = Lcg(width as u64);
    for _ in 0..20 {
        let height = rng.next(3 * width as u64 + 4) as usize;
        let domain = rng.next(4) + 2;
        let rows: Vec<Vec<String>> = (0..height)
            .map(|_| (0..width).map(|_| rng.next(domain).to_string()).collect())
            .collect();
        let t = table(width, &rows);

        let uccs = found(&t);
        let unique: BTreeSet<_> = uccs.iter().cloned().collect();
        // Each combination is reported exactly once.
        assert_eq!(unique.len(), uccs.len());
        assert_eq!(unique, minimal_uccs(&t), "rows: {:?}", rows);
        // Level by level.
        assert!(uccs.windows(2).all(|w| w[0].len() <= w[1].len()));
    }
}
