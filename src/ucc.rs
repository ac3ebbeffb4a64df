use crate::{AttributeCombination, ColumnId, PositionListIndex, Result, Table};
use lasso::Spur;
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::mem::take;
use std::ops::ControlFlow;
use tracing::{debug, info, trace};

/// A minimal unique column combination of a table: no two rows agree on all of its columns, and
/// that is not true of any smaller subset of its columns.
#[derive(Clone, Debug)]
pub struct Ucc<'t> {
    table: &'t Table,
    combination: AttributeCombination,
}

impl<'t> Ucc<'t> {
    /// The profiled table.
    pub fn table(&self) -> &'t Table {
        self.table
    }

    /// The unique columns.
    pub fn combination(&self) -> &AttributeCombination {
        &self.combination
    }

    /// The names of the unique columns, in column order.
    pub fn column_names(&self) -> Vec<&'t str> {
        let attributes = self.table.attributes();
        self.combination
            .as_slice()
            .iter()
            .map(|&column| attributes[usize::from(column)].as_str())
            .collect()
    }
}

impl PartialEq for Ucc<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.table, other.table) && self.combination == other.combination
    }
}

impl Eq for Ucc<'_> {}

impl std::hash::Hash for Ucc<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.table, state);
        self.combination.hash(state);
    }
}

impl std::fmt::Display for Ucc<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: [{}]", self.table.name(), self.column_names().join(", "))
    }
}

/// Decides whether column combinations are unique.
///
/// The profiler only ever asks about combinations in lattice order: first every single column,
/// then level by level, each candidate described as a combination from the previous level's
/// non-unique frontier extended by one larger column. Implementations may cache whatever they
/// computed for non-unique combinations until [`finish_level`][Self::finish_level] is called for
/// the level after the one they were validated in.
pub trait UniquenessValidator {
    /// Tests a single column.
    fn validate_column(&mut self, column: ColumnId) -> Result<bool>;

    /// Tests `parent ∪ {extension}`, where `parent` was found not to be unique on the previous
    /// level and `extension` is larger than every column in `parent`.
    fn validate_extension(
        &mut self,
        parent: &AttributeCombination,
        extension: ColumnId,
    ) -> Result<bool>;

    /// Called after every candidate of a level has been validated.
    fn finish_level(&mut self) {}
}

/// Validates candidates by intersecting position list indexes.
///
/// Single-column indexes are built once up front. The index of every non-unique candidate is
/// kept for one level so that the next level's candidates, which extend it by one column, need
/// exactly one intersection each.
pub struct PartitionRefinement<'t> {
    table: &'t Table,
    columns: Vec<PositionListIndex>,
    previous: HashMap<AttributeCombination, PositionListIndex>,
    current: HashMap<AttributeCombination, PositionListIndex>,
}

impl<'t> PartitionRefinement<'t> {
    /// Builds the position list index of every column in `table`.
    pub fn new(table: &'t Table) -> Result<Self> {
        let columns = (0..table.column_count())
            .map(|column| -> Result<PositionListIndex> {
                let column = column as ColumnId;
                Ok(PositionListIndex::from_column(
                    AttributeCombination::singleton(column),
                    table.column_keys(column)?.iter(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PartitionRefinement {
            table,
            columns,
            previous: HashMap::new(),
            current: HashMap::new(),
        })
    }

    fn column(&self, column: ColumnId) -> Result<&PositionListIndex> {
        // Checking against the table gives the same error a direct lookup would.
        self.table.column_keys(column)?;
        Ok(&self.columns[usize::from(column)])
    }
}

impl UniquenessValidator for PartitionRefinement<'_> {
    fn validate_column(&mut self, column: ColumnId) -> Result<bool> {
        Ok(self.column(column)?.is_unique())
    }

    fn validate_extension(
        &mut self,
        parent: &AttributeCombination,
        extension: ColumnId,
    ) -> Result<bool> {
        let extension = self.column(extension)?;
        let refined = match parent.as_slice() {
            [single] => self.column(*single)?.intersect(extension)?,
            _ => match self.previous.get(parent) {
                Some(pli) => pli.intersect(extension)?,
                None => {
                    PositionListIndex::for_columns(self.table, parent.clone())?.intersect(extension)?
                }
            },
        };

        if refined.is_unique() {
            Ok(true)
        } else {
            self.current.insert(refined.combination().clone(), refined);
            Ok(false)
        }
    }

    fn finish_level(&mut self) {
        self.previous = take(&mut self.current);
    }
}

/// Validates candidates by hashing the projection of every row, stopping at the first repeated
/// projection. Needs no memory between candidates but rescans the table for each one.
pub struct RowHashing<'t> {
    table: &'t Table,
}

impl<'t> RowHashing<'t> {
    /// Creates a validator for `table`.
    pub fn new(table: &'t Table) -> Self {
        RowHashing { table }
    }

    fn is_unique(&self, combination: &AttributeCombination) -> Result<bool> {
        let columns = combination
            .iter()
            .map(|column| self.table.column_keys(column))
            .collect::<Result<Vec<_>>>()?;

        let mut seen: HashSet<SmallVec<[Spur; 4]>> = HashSet::with_capacity(self.table.row_count());
        for row in 0..self.table.row_count() {
            if !seen.insert(columns.iter().map(|column| column[row]).collect()) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl UniquenessValidator for RowHashing<'_> {
    fn validate_column(&mut self, column: ColumnId) -> Result<bool> {
        self.is_unique(&AttributeCombination::singleton(column))
    }

    fn validate_extension(
        &mut self,
        parent: &AttributeCombination,
        extension: ColumnId,
    ) -> Result<bool> {
        self.is_unique(&parent.union(&AttributeCombination::singleton(extension)))
    }
}

/// How the profiler decides whether a candidate is unique.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Intersect position list indexes ([`PartitionRefinement`]).
    PartitionRefinement,
    /// Hash projected rows ([`RowHashing`]).
    RowHashing,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::PartitionRefinement
    }
}

/// Settings for a [`UccProfiler`].
#[derive(Clone, Debug, Default)]
pub struct ProfilerConfig {
    /// The largest combination to consider. `None` searches the whole lattice.
    pub max_combination_size: Option<usize>,
    /// How candidates are validated.
    pub strategy: Strategy,
}

/// Progress report for one completed lattice level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct LevelSummary {
    /// The size of every combination on this level.
    pub level: usize,
    /// Combinations validated on this level.
    pub candidates: usize,
    /// Unique combinations found on this level.
    pub uniques: usize,
    /// Non-unique combinations carried to the next level.
    pub frontier: usize,
}

/// The non-unique combinations of one lattice level which contain no known unique combination.
///
/// Every minimal unique combination one level up consists entirely of frontier members: each of
/// its one-smaller subsets must be non-unique (or it wouldn't be minimal) and must not contain a
/// smaller unique combination (for the same reason).
#[derive(Clone, Debug, Default)]
struct Frontier {
    combinations: BTreeSet<AttributeCombination>,
}

impl Frontier {
    fn insert(&mut self, combination: AttributeCombination) {
        self.combinations.insert(combination);
    }

    fn len(&self) -> usize {
        self.combinations.len()
    }

    /// Generates the candidates for the next level.
    ///
    /// Two members that agree on everything but their last column are combined, which reaches
    /// every candidate whose subsets are all in the frontier exactly once. A candidate is kept only
    /// if all of its one-smaller subsets are frontier members; otherwise one of them is unique or
    /// contains a unique combination, and the candidate can't be minimal.
    fn candidates(&self) -> BTreeSet<AttributeCombination> {
        let members: Vec<&AttributeCombination> = self.combinations.iter().collect();
        let mut candidates = BTreeSet::new();

        let mut block_start = 0;
        while block_start < members.len() {
            // Members sharing a prefix are adjacent because the set is ordered.
            let block_end = members[block_start..]
                .iter()
                .position(|member| !member.shares_prefix(members[block_start]))
                .map_or(members.len(), |offset| block_start + offset);

            let block = &members[block_start..block_end];
            for (idx, a) in block.iter().enumerate() {
                for b in block[idx + 1..].iter() {
                    let candidate = a.union(b);
                    if candidate
                        .subsets_without_one()
                        .all(|subset| self.combinations.contains(&subset))
                    {
                        candidates.insert(candidate);
                    }
                }
            }
            block_start = block_end;
        }
        candidates
    }
}

/// Discovers every minimal unique column combination of a table.
///
/// The search walks the lattice of column combinations level by level, starting with single
/// columns. Unique combinations are reported and never extended; non-unique ones form the
/// frontier from which the next level's candidates are generated.
///
/// ```
/// use ucc_profiler::{AttributeCombination, Table, UccProfiler};
///
/// let table = Table::new("t", &["a", "b"], &[["1", "x"], ["1", "y"], ["2", "x"]]).unwrap();
/// let uccs = UccProfiler::default().profile(&table).unwrap();
///
/// assert_eq!(uccs.len(), 1);
/// assert_eq!(uccs[0].combination(), &AttributeCombination::new(&[0, 1]));
/// assert_eq!(uccs[0].to_string(), "t: [a, b]");
/// ```
#[derive(Clone, Debug, Default)]
pub struct UccProfiler {
    config: ProfilerConfig,
}

impl UccProfiler {
    /// Creates a profiler with the given settings.
    pub fn new(config: ProfilerConfig) -> Self {
        UccProfiler { config }
    }

    /// The profiler's settings.
    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Returns every minimal unique column combination of `table`.
    ///
    /// Results are ordered by size and then by columns.
    pub fn profile<'t>(&self, table: &'t Table) -> Result<Vec<Ucc<'t>>> {
        self.profile_with(table, |_| ControlFlow::Continue(()))
    }

    /// Like [`profile`][Self::profile], but calls `observer` after each lattice level. Returning
    /// `ControlFlow::Break` stops the search with [`Error::Cancelled`][crate::Error::Cancelled].
    pub fn profile_with<'t, F>(&self, table: &'t Table, observer: F) -> Result<Vec<Ucc<'t>>>
    where
        F: FnMut(&LevelSummary) -> ControlFlow<()>,
    {
        match self.config.strategy {
            Strategy::PartitionRefinement => {
                let validator = PartitionRefinement::new(table)?;
                self.profile_using(table, validator, observer)
            }
            Strategy::RowHashing => self.profile_using(table, RowHashing::new(table), observer),
        }
    }

    /// Runs the lattice search with a caller-supplied validator.
    pub fn profile_using<'t, V, F>(
        &self,
        table: &'t Table,
        mut validator: V,
        mut observer: F,
    ) -> Result<Vec<Ucc<'t>>>
    where
        V: UniquenessValidator,
        F: FnMut(&LevelSummary) -> ControlFlow<()>,
    {
        let columns = table.column_count();
        let max_size = self
            .config
            .max_combination_size
            .map_or(columns, |max| max.min(columns));
        info!(
            table = table.name(),
            columns,
            rows = table.row_count(),
            max_size,
            "profiling unique column combinations"
        );

        let mut uccs = Vec::new();
        if max_size == 0 {
            return Ok(uccs);
        }

        let mut accept = |combination: AttributeCombination| {
            trace!(table = table.name(), ?combination, "found unique column combination");
            uccs.push(Ucc { table, combination });
        };

        let mut frontier = Frontier::default();
        let mut uniques = 0;
        for column in 0..columns {
            let column = column as ColumnId;
            if validator.validate_column(column)? {
                accept(AttributeCombination::singleton(column));
                uniques += 1;
            } else {
                frontier.insert(AttributeCombination::singleton(column));
            }
        }
        validator.finish_level();
        report(
            &mut observer,
            LevelSummary {
                level: 1,
                candidates: columns,
                uniques,
                frontier: frontier.len(),
            },
        )?;

        let mut level = 1;
        while level < max_size {
            let candidates = frontier.candidates();
            if candidates.is_empty() {
                break;
            }
            level += 1;

            let mut next = Frontier::default();
            let mut uniques = 0;
            let count = candidates.len();
            for candidate in candidates {
                let (parent, extension) = match candidate.split_last() {
                    Some(split) => split,
                    None => continue,
                };
                if validator.validate_extension(&parent, extension)? {
                    accept(candidate);
                    uniques += 1;
                } else {
                    next.insert(candidate);
                }
            }
            validator.finish_level();
            report(
                &mut observer,
                LevelSummary {
                    level,
                    candidates: count,
                    uniques,
                    frontier: next.len(),
                },
            )?;
            frontier = next;
        }

        info!(table = table.name(), uccs = uccs.len(), levels = level, "profiling finished");
        Ok(uccs)
    }
}

fn report<F>(observer: &mut F, summary: LevelSummary) -> Result<()>
where
    F: FnMut(&LevelSummary) -> ControlFlow<()>,
{
    debug!(
        level = summary.level,
        candidates = summary.candidates,
        uniques = summary.uniques,
        frontier = summary.frontier,
        "finished lattice level"
    );
    match observer(&summary) {
        ControlFlow::Continue(()) => Ok(()),
        ControlFlow::Break(()) => Err(crate::Error::Cancelled {
            level: summary.level,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combinations(list: &[&[ColumnId]]) -> BTreeSet<AttributeCombination> {
        list.iter().map(|c| AttributeCombination::new(c)).collect()
    }

    #[test]
    fn candidates_need_every_subset_in_the_frontier() {
        let mut frontier = Frontier::default();
        for c in combinations(&[&[0, 1], &[0, 2], &[1, 2], &[0, 3]]) {
            frontier.insert(c);
        }
        // {0,1,3} and {0,2,3} lack {1,3} and {2,3}.
        assert_eq!(frontier.candidates(), combinations(&[&[0, 1, 2]]));
    }

    #[test]
    fn singletons_pair_up() {
        let mut frontier = Frontier::default();
        for c in combinations(&[&[0], &[2], &[3]]) {
            frontier.insert(c);
        }
        assert_eq!(
            frontier.candidates(),
            combinations(&[&[0, 2], &[0, 3], &[2, 3]])
        );
    }

    #[test]
    fn cancellation() {
        let table = Table::new("t", &["a", "b"], &[["1", "x"], ["1", "y"], ["2", "x"]]).unwrap();
        let mut levels = Vec::new();
        let result = UccProfiler::default().profile_with(&table, |summary| {
            levels.push(summary.level);
            ControlFlow::Break(())
        });
        assert!(matches!(result, Err(crate::Error::Cancelled { level: 1 })));
        assert_eq!(levels, vec![1]);
    }

    #[test]
    fn level_summaries() {
        let table = Table::new("t", &["a", "b"], &[["1", "x"], ["1", "y"], ["2", "x"]]).unwrap();
        let mut summaries = Vec::new();
        UccProfiler::default()
            .profile_with(&table, |summary| {
                summaries.push(*summary);
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(
            summaries,
            vec![
                LevelSummary {
                    level: 1,
                    candidates: 2,
                    uniques: 0,
                    frontier: 2
                },
                LevelSummary {
                    level: 2,
                    candidates: 1,
                    uniques: 1,
                    frontier: 0
                },
            ]
        );
    }

    #[test]
    fn tables_are_compared_by_identity() {
        let first = Table::new("t", &["a"], &[["1"], ["2"]]).unwrap();
        let second = Table::new("t", &["a"], &[["3"], ["4"]]).unwrap();
        let profiler = UccProfiler::default();
        let a = profiler.profile(&first).unwrap();
        let b = profiler.profile(&second).unwrap();
        assert_eq!(a, profiler.profile(&first).unwrap());
        assert_ne!(a, b);
        assert_eq!(a[0].to_string(), b[0].to_string());

        let set: HashSet<_> = a.iter().chain(b.iter()).cloned().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn size_limit() {
        let table = Table::new("t", &["a", "b"], &[["1", "x"], ["1", "y"], ["2", "x"]]).unwrap();
        let profiler = UccProfiler::new(ProfilerConfig {
            max_combination_size: Some(1),
            ..ProfilerConfig::default()
        });
        assert!(profiler.profile(&table).unwrap().is_empty());
    }
}
