use thiserror::Error;

/// Errors reported while building tables or profiling them.
///
/// None of these are transient: each one means the input or the caller's use of the API is
/// inconsistent, so retrying the same call will fail the same way.
#[derive(Debug, Error)]
pub enum Error {
    /// A column id refers past the end of the table's attribute list.
    #[error("column {column} is out of range for table `{table}` with {columns} columns")]
    ColumnOutOfRange {
        /// The table's name.
        table: String,
        /// The offending column id.
        column: usize,
        /// The table's column count.
        columns: usize,
    },
    /// A row id refers past the end of the table.
    #[error("row {row} is out of range for table `{table}` with {rows} rows")]
    RowOutOfRange {
        /// The table's name.
        table: String,
        /// The offending row.
        row: usize,
        /// The table's row count.
        rows: usize,
    },
    /// A row has more cells than the table has attributes.
    #[error("row {row} of table `{table}` has {found} cells, but the table has {expected} columns")]
    RowWidth {
        /// The table's name.
        table: String,
        /// The offending row.
        row: usize,
        /// The size the table requires.
        expected: usize,
        /// The size actually supplied.
        found: usize,
    },
    /// Column-wise construction got a different number of columns than attributes.
    #[error("table `{table}` has {expected} attributes but {found} columns of values")]
    ColumnCount {
        /// The table's name.
        table: String,
        /// The size the table requires.
        expected: usize,
        /// The size actually supplied.
        found: usize,
    },
    /// A column's value sequence doesn't match the table's row count.
    #[error("column `{column}` of table `{table}` has {found} values, expected {expected}")]
    ColumnLength {
        /// The table's name.
        table: String,
        /// The attribute name of the column.
        column: String,
        /// The size the table requires.
        expected: usize,
        /// The size actually supplied.
        found: usize,
    },
    /// Two partitions over differently sized tables can't be intersected.
    #[error("cannot intersect a partition of {expected} rows with one of {found} rows")]
    RowCountMismatch {
        /// Rows in the partition being refined.
        expected: usize,
        /// Rows in the partition refining it.
        found: usize,
    },
    /// Attribute names must be unique within a table.
    #[error("table `{table}` declares attribute `{name}` more than once")]
    DuplicateAttribute {
        /// The table's name.
        table: String,
        /// The repeated attribute.
        name: String,
    },
    /// Column ids are 16 bits wide.
    #[error("table `{table}` has {columns} columns, at most {max} are supported")]
    TooManyColumns {
        /// The table's name.
        table: String,
        /// The table's column count.
        columns: usize,
        /// The largest supported column count.
        max: usize,
    },
    /// Delimited input could not be decoded.
    #[error("line {line}: {message}")]
    Parse {
        /// Line of the input the problem was found on.
        line: u64,
        /// What went wrong.
        message: String,
    },
    /// Reading input failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The level observer asked the profiler to stop.
    #[error("profiling cancelled after lattice level {level}")]
    Cancelled {
        /// The last level that was completed.
        level: usize,
    },
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;
