use smallvec::SmallVec;
use sorted_iter::assume::AssumeSortedByItemExt;
use sorted_iter::sorted_iterator::SortedByItem;
use sorted_iter::SortedIterator;
use std::iter;

/// Position of a column within a [`Table`][crate::Table].
pub type ColumnId = u16;

/// With the `union` feature, SmallVec's heap pointer and length overlap the inline array, so
/// combinations have minimum size if this array occupies the same number of bytes.
type InlineColumns = [ColumnId; 2 * std::mem::size_of::<usize>() / std::mem::size_of::<ColumnId>()];

/// A set of columns of one table.
///
/// The columns are kept sorted and free of duplicates, so two combinations compare equal (and hash
/// identically) exactly when they contain the same columns, regardless of the order they were
/// built in. Combinations of up to eight columns (on 64-bit targets) don't allocate.
#[derive(Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AttributeCombination(SmallVec<InlineColumns>);

impl AttributeCombination {
    /// Creates a combination containing the specified columns.
    ///
    /// It's okay if the provided slice contains duplicates.
    pub fn new(columns: &[ColumnId]) -> Self {
        let mut v = SmallVec::from_slice(columns);
        v.sort_unstable();
        v.dedup();
        AttributeCombination(v)
    }

    /// Creates a combination of exactly one column.
    pub fn singleton(column: ColumnId) -> Self {
        AttributeCombination(iter::once(column).collect())
    }

    /// The number of columns in the combination.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the empty combination.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the columns in ascending order.
    ///
    /// ```
    /// use ucc_profiler::AttributeCombination;
    ///
    /// let abc = AttributeCombination::new(&[2, 3, 1]);
    /// let mut it = abc.iter();
    /// assert_eq!(it.next(), Some(1));
    /// assert_eq!(it.next(), Some(2));
    /// assert_eq!(it.next(), Some(3));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = ColumnId> + SortedByItem + Clone + '_ {
        self.0.iter().copied().assume_sorted_by_item()
    }

    /// Returns `true` if `column` is part of this combination.
    pub fn contains(&self, column: ColumnId) -> bool {
        self.0.binary_search(&column).is_ok()
    }

    /// The largest column in the combination.
    pub fn last(&self) -> Option<ColumnId> {
        self.0.last().copied()
    }

    /// Returns a combination containing every column from either `self` or `other`.
    ///
    /// ```
    /// use ucc_profiler::AttributeCombination;
    ///
    /// let ab = AttributeCombination::new(&[0, 1]);
    /// let bc = AttributeCombination::new(&[1, 2]);
    /// assert_eq!(ab.union(&bc), AttributeCombination::new(&[0, 1, 2]));
    /// assert_eq!(ab.union(&ab), ab);
    /// ```
    pub fn union(&self, other: &Self) -> Self {
        let mut v = SmallVec::with_capacity(self.len() + other.len());
        v.extend(self.iter().union(other.iter()));
        AttributeCombination(v)
    }

    /// Returns a copy of this combination without `column`. Removing a column which isn't part of
    /// the combination returns an unchanged copy.
    ///
    /// ```
    /// use ucc_profiler::AttributeCombination;
    ///
    /// let abc = AttributeCombination::new(&[0, 1, 2]);
    /// assert_eq!(abc.remove(1), AttributeCombination::new(&[0, 2]));
    /// assert_eq!(abc.remove(7), abc);
    /// ```
    pub fn remove(&self, column: ColumnId) -> Self {
        let mut copy = self.clone();
        if let Ok(at) = copy.0.binary_search(&column) {
            copy.0.remove(at);
        }
        copy
    }

    /// Returns `true` if `other` contains every column that `self` does.
    ///
    /// ```
    /// use ucc_profiler::AttributeCombination;
    /// let nil = AttributeCombination::new(&[]);
    /// let one = AttributeCombination::new(&[1]);
    ///
    /// assert!(nil.is_subset(&one));
    /// assert!(nil.is_subset(&nil));
    /// assert!(one.is_subset(&one));
    /// assert!(!one.is_subset(&nil));
    /// ```
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().intersection(other.iter()).eq(self.iter())
    }

    /// Returns `true` if `self` contains every column that `other` does.
    ///
    /// ```
    /// use ucc_profiler::AttributeCombination;
    /// let nil = AttributeCombination::new(&[]);
    /// let one = AttributeCombination::new(&[1]);
    ///
    /// assert!(!nil.is_superset(&one));
    /// assert!(nil.is_superset(&nil));
    /// assert!(one.is_superset(&one));
    /// assert!(one.is_superset(&nil));
    /// ```
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Returns an iterator over every subset of this combination that has one column less in it.
    ///
    /// ```
    /// use ucc_profiler::AttributeCombination;
    ///
    /// let abc = AttributeCombination::new(&[0, 1, 2]);
    /// let subsets: Vec<_> = abc.subsets_without_one().collect();
    /// assert_eq!(subsets, vec![
    ///     AttributeCombination::new(&[0, 1]),
    ///     AttributeCombination::new(&[0, 2]),
    ///     AttributeCombination::new(&[1, 2]),
    /// ]);
    /// ```
    pub fn subsets_without_one(
        &self,
    ) -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator + iter::FusedIterator + '_ {
        // Working from the end backward produces the subsets in ascending order.
        (0..self.len()).rev().map(move |remove_idx| {
            let mut selected = AttributeCombination(SmallVec::with_capacity(self.len() - 1));
            selected.0.extend_from_slice(&self.0[..remove_idx]);
            selected.0.extend_from_slice(&self.0[remove_idx + 1..]);
            selected
        })
    }

    /// Splits off the largest column, returning the remaining prefix and that column.
    ///
    /// Returns `None` for the empty combination.
    pub fn split_last(&self) -> Option<(Self, ColumnId)> {
        let (last, prefix) = self.0.split_last()?;
        Some((AttributeCombination(SmallVec::from_slice(prefix)), *last))
    }

    /// Returns `true` if both combinations have the same length and agree on every column but
    /// their last one.
    pub(crate) fn shares_prefix(&self, other: &Self) -> bool {
        let len = self.len();
        len > 0 && len == other.len() && self.0[..len - 1] == other.0[..len - 1]
    }

    pub(crate) fn as_slice(&self) -> &[ColumnId] {
        &self.0
    }
}

impl std::fmt::Debug for AttributeCombination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

impl iter::FromIterator<ColumnId> for AttributeCombination {
    /// Creates a combination containing the specified columns.
    ///
    /// It's okay if the provided iterator contains duplicates.
    fn from_iter<I: IntoIterator<Item = ColumnId>>(iter: I) -> Self {
        let mut v: SmallVec<InlineColumns> = iter.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        AttributeCombination(v)
    }
}
