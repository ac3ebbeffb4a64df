use crate::{AttributeCombination, Error, Result, Table};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::hash::Hash;

/// A position list index: the partition of a table's rows into classes of rows which agree on
/// every column of some [`AttributeCombination`].
///
/// Only classes ("clusters") with at least two rows are stored. Every other row is implicitly in a
/// class of its own, and a singleton class can never violate uniqueness, so dropping them loses
/// nothing and keeps refinement cheap once most rows have been separated.
///
/// Clusters are stored in a canonical order: rows ascending within each cluster, and clusters
/// ordered by their first row. Two indexes describing the same partition are therefore equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionListIndex {
    combination: AttributeCombination,
    row_count: usize,
    clusters: Vec<Vec<usize>>,
}

impl PositionListIndex {
    /// Builds the index of a single column by grouping rows with equal values.
    ///
    /// `keys` yields one value per row, in row order. For columns of a [`Table`], pass
    /// [`Table::column_keys`] so that values are compared after normalization.
    ///
    /// ```
    /// use ucc_profiler::{AttributeCombination, PositionListIndex};
    ///
    /// let pli = PositionListIndex::from_column(
    ///     AttributeCombination::singleton(0),
    ///     ["a", "b", "a", "c", "b"].iter(),
    /// );
    /// assert_eq!(pli.clusters(), &[vec![0, 2], vec![1, 4]]);
    /// assert!(!pli.is_unique());
    /// ```
    pub fn from_column<I, K>(combination: AttributeCombination, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Hash + Eq,
    {
        let mut row_count = 0;
        let mut classes: HashMap<K, Vec<usize>> = HashMap::new();
        for (row, key) in keys.into_iter().enumerate() {
            classes.entry(key).or_insert_with(Vec::new).push(row);
            row_count = row + 1;
        }

        let mut clusters: Vec<Vec<usize>> = classes
            .into_iter()
            .map(|(_, rows)| rows)
            .filter(|rows| rows.len() > 1)
            .collect();
        clusters.sort_unstable_by_key(|rows| rows[0]);

        PositionListIndex {
            combination,
            row_count,
            clusters,
        }
    }

    /// Builds the index of any combination directly from the table's values, hashing the
    /// projection of every row onto the combination's columns.
    ///
    /// This is the reference construction; [`intersect`][Self::intersect] computes the same
    /// partition from smaller indexes without touching the table again.
    pub fn for_columns(table: &Table, combination: AttributeCombination) -> Result<Self> {
        let columns = combination
            .iter()
            .map(|column| table.column_keys(column))
            .collect::<Result<Vec<_>>>()?;

        let projections = (0..table.row_count()).map(|row| {
            columns
                .iter()
                .map(|column| column[row])
                .collect::<SmallVec<[_; 4]>>()
        });
        let mut pli = PositionListIndex::from_column(combination, projections);
        pli.row_count = table.row_count();
        Ok(pli)
    }

    /// The combination this index partitions by.
    pub fn combination(&self) -> &AttributeCombination {
        &self.combination
    }

    /// The number of rows in the partitioned table.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// The classes with two or more rows, in canonical order.
    pub fn clusters(&self) -> &[Vec<usize>] {
        &self.clusters
    }

    /// The number of classes with two or more rows.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// The number of rows that would have to be removed for this combination to become unique.
    pub fn duplicate_rows(&self) -> usize {
        self.clusters.iter().map(|rows| rows.len() - 1).sum()
    }

    /// Returns `true` if no two rows agree on every column of the combination.
    ///
    /// Tables with zero or one rows are unique for every combination.
    pub fn is_unique(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Refines this partition by `other`, producing the index of the union of both combinations.
    ///
    /// Two rows stay together only if they share a cluster in both inputs. This takes time roughly
    /// proportional to the number of rows covered by clusters, never comparing rows pairwise.
    ///
    /// ```
    /// use ucc_profiler::{AttributeCombination, PositionListIndex};
    ///
    /// let a = PositionListIndex::from_column(AttributeCombination::singleton(0), [1, 1, 2, 2].iter());
    /// let b = PositionListIndex::from_column(AttributeCombination::singleton(1), [7, 8, 8, 8].iter());
    ///
    /// let ab = a.intersect(&b).unwrap();
    /// assert_eq!(ab.combination(), &AttributeCombination::new(&[0, 1]));
    /// assert_eq!(ab.clusters(), &[vec![2, 3]]);
    /// ```
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        if self.row_count != other.row_count {
            return Err(Error::RowCountMismatch {
                expected: self.row_count,
                found: other.row_count,
            });
        }

        let probe = other.probe_table();
        let mut clusters = Vec::new();

        // Reuse the same map for every cluster to avoid hammering the allocator.
        let mut refined: HashMap<usize, Vec<usize>> = HashMap::new();
        for cluster in self.clusters.iter() {
            for &row in cluster.iter() {
                if let Some(class) = probe[row] {
                    refined.entry(class).or_insert_with(Vec::new).push(row);
                }
            }
            clusters.extend(refined.drain().map(|(_, rows)| rows).filter(|rows| rows.len() > 1));
        }
        clusters.sort_unstable_by_key(|rows| rows[0]);

        Ok(PositionListIndex {
            combination: self.combination.union(&other.combination),
            row_count: self.row_count,
            clusters,
        })
    }

    /// Maps every row to the cluster containing it, or `None` for rows in singleton classes.
    fn probe_table(&self) -> Vec<Option<usize>> {
        let mut probe = vec![None; self.row_count];
        for (class, rows) in self.clusters.iter().enumerate() {
            for &row in rows.iter() {
                probe[row] = Some(class);
            }
        }
        probe
    }
}
