use std::collections::{BTreeSet, HashSet};
use ucc_profiler::{AttributeCombination, ColumnId, Table};

/// Builds a table with columns named `a`, `b`, `c`, ...
pub fn table(width: usize, rows: &[Vec<String>]) -> Table {
    let attributes: Vec<String> = (0..width)
        .map(|idx| ((b'a' + idx as u8) as char).to_string())
        .collect();
    Table::new("t", &attributes, rows).unwrap()
}

pub fn is_unique(table: &Table, combination: &AttributeCombination) -> bool {
    let mut seen = HashSet::new();
    (0..table.row_count()).all(|row| {
        let values = table.row(row).unwrap();
        let projection: Vec<&str> = combination
            .iter()
            .map(|column| values[usize::from(column)])
            .collect();
        seen.insert(projection)
    })
}

/// Every minimal unique column combination, found by testing every subset of the columns.
pub fn minimal_uccs(table: &Table) -> BTreeSet<AttributeCombination> {
    let width = table.column_count();
    let uniques: Vec<AttributeCombination> = (1u32..1 << width)
        .map(|mask| {
            (0..width)
                .filter(|column| mask & (1 << column) != 0)
                .map(|column| column as ColumnId)
                .collect::<AttributeCombination>()
        })
        .filter(|combination| is_unique(table, combination))
        .collect();

    uniques
        .iter()
        .filter(|u| !uniques.iter().any(|s| s != *u && s.is_subset(u)))
        .cloned()
        .collect()
}
