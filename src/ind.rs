use crate::{ColumnId, Result, Table};
use std::collections::HashSet;
use tracing::debug;

/// One column of one table.
#[derive(Clone, Copy, Debug)]
pub struct ColumnRef<'t> {
    table: &'t Table,
    column: ColumnId,
}

impl<'t> ColumnRef<'t> {
    /// Refers to `column` of `table`, which must be in range.
    pub fn new(table: &'t Table, column: ColumnId) -> Result<Self> {
        table.attribute(column)?;
        Ok(ColumnRef { table, column })
    }

    /// The table owning the column.
    pub fn table(&self) -> &'t Table {
        self.table
    }

    /// The column's position.
    pub fn column(&self) -> ColumnId {
        self.column
    }

    /// The column's attribute name.
    pub fn name(&self) -> &'t str {
        // Only constructed for columns in range.
        &self.table.attributes()[usize::from(self.column)]
    }
}

impl std::fmt::Display for ColumnRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.table.name(), self.name())
    }
}

/// A unary inclusion dependency: every value of `dependent` also occurs in `referenced`.
#[derive(Clone, Copy, Debug)]
pub struct InclusionDependency<'t> {
    /// The included column.
    pub dependent: ColumnRef<'t>,
    /// The including column.
    pub referenced: ColumnRef<'t>,
}

impl std::fmt::Display for InclusionDependency<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ⊆ {}", self.dependent, self.referenced)
    }
}

/// Finds every unary inclusion dependency between columns of different tables.
///
/// Values are compared after the same normalization tables apply when they're built. Columns of
/// the same table are never paired. Results are ordered by dependent table and column, then by
/// referenced table and column, with tables identified by their position in `tables`.
///
/// ```
/// use ucc_profiler::{discover_unary_inds, Table};
///
/// let orders = Table::new("orders", &["customer"], &[["1"], ["2"], ["1"]]).unwrap();
/// let customers = Table::new("customers", &["id"], &[["1"], ["2"], ["3"]]).unwrap();
///
/// let inds = discover_unary_inds(&[&orders, &customers]).unwrap();
/// assert_eq!(inds.len(), 1);
/// assert_eq!(inds[0].to_string(), "orders[customer] ⊆ customers[id]");
/// ```
pub fn discover_unary_inds<'t>(tables: &[&'t Table]) -> Result<Vec<InclusionDependency<'t>>> {
    let value_sets = tables
        .iter()
        .map(|table| column_value_sets(table))
        .collect::<Result<Vec<_>>>()?;

    let mut inds = Vec::new();
    for (dep_table, dep_columns) in value_sets.iter().enumerate() {
        for (dep_column, dep_values) in dep_columns.iter().enumerate() {
            for (ref_table, ref_columns) in value_sets.iter().enumerate() {
                if ref_table == dep_table {
                    continue;
                }
                for (ref_column, ref_values) in ref_columns.iter().enumerate() {
                    if dep_values.len() <= ref_values.len() && dep_values.is_subset(ref_values) {
                        inds.push(InclusionDependency {
                            dependent: ColumnRef {
                                table: tables[dep_table],
                                column: dep_column as ColumnId,
                            },
                            referenced: ColumnRef {
                                table: tables[ref_table],
                                column: ref_column as ColumnId,
                            },
                        });
                    }
                }
            }
        }
    }

    debug!(tables = tables.len(), inds = inds.len(), "discovered unary inclusion dependencies");
    Ok(inds)
}

fn column_value_sets(table: &Table) -> Result<Vec<HashSet<&str>>> {
    let mut sets = Vec::with_capacity(table.column_count());
    for column in 0..table.column_count() {
        sets.push(table.column_values(column as ColumnId)?.collect());
    }
    Ok(sets)
}
