#![warn(missing_docs)]
#![doc(test(no_crate_inject))]
#![doc(test(attr(deny(unused, future_incompatible))))]

//! This crate discovers unique column combinations (UCCs) in relational tables: minimal sets of
//! columns whose combined values tell every row apart. Such combinations are the candidate keys
//! of a table, which makes them a starting point for data integration and schema reverse
//! engineering.
//!
//! The search walks the lattice of column combinations bottom-up, one level at a time, in the
//! style of Apriori and TANE:
//!
//! - Heise et al., [Scalable Discovery of Unique Column Combinations][ducc], 2013
//! - Huhtala et al., [TANE: An Efficient Algorithm for Discovering Functional and Approximate
//!   Dependencies][tane], 1999
//!
//! [ducc]: https://www.vldb.org/pvldb/vol7/p301-heise.pdf
//! [tane]: https://doi.org/10.1093/comjnl/42.2.100
//!
//! Uniqueness of a combination is checked with [`PositionListIndex`]es: the partition of rows
//! induced by one column is computed once, and partitions of larger combinations are derived by
//! refining smaller ones instead of rescanning the table.
//!
//! The crate also finds unary inclusion dependencies between tables, and reads tables from
//! delimited text.
//!
//! ```
//! use ucc_profiler::{Table, UccProfiler};
//!
//! let table = Table::new(
//!     "people",
//!     &["first", "last", "city"],
//!     &[
//!         ["Ada", "Lovelace", "London"],
//!         ["Ada", "Byron", "London"],
//!         ["Alan", "Turing", "London"],
//!     ],
//! )
//! .unwrap();
//!
//! let uccs: Vec<String> = UccProfiler::default()
//!     .profile(&table)
//!     .unwrap()
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(uccs, vec!["people: [last]"]);
//! ```

pub use sorted_iter;

mod combination;
mod error;
mod ind;
mod load;
mod pli;
mod table;
mod ucc;

pub use combination::{AttributeCombination, ColumnId};
pub use error::{Error, Result};
pub use ind::{discover_unary_inds, ColumnRef, InclusionDependency};
pub use load::{load_path, load_table, LoadOptions};
pub use pli::PositionListIndex;
pub use table::{Table, TableBuilder};
pub use ucc::{
    LevelSummary, PartitionRefinement, ProfilerConfig, RowHashing, Strategy, Ucc, UccProfiler,
    UniquenessValidator,
};
