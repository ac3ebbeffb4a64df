use crate::{ColumnId, Error, Result};
use lasso::{Rodeo, RodeoResolver, Spur};
use smallvec::SmallVec;
use std::collections::HashSet;

/// An immutable, fully materialized relation.
///
/// Cells are normalized when the table is built: surrounding whitespace is trimmed, and a cell
/// missing from the end of a short row is treated as the empty string. Every distinct normalized
/// value is interned once, so a column is stored as a sequence of small integer keys and comparing
/// two cells never touches string data.
pub struct Table {
    name: String,
    attributes: Vec<String>,
    columns: Vec<Vec<Spur>>,
    rows: usize,
    values: RodeoResolver,
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("rows", &self.rows)
            .finish()
    }
}

fn normalize(cell: &str) -> &str {
    cell.trim()
}

const MAX_COLUMNS: usize = ColumnId::MAX as usize + 1;

impl Table {
    /// Builds a table from a list of rows.
    ///
    /// ```
    /// use ucc_profiler::Table;
    ///
    /// let table = Table::new("t", &["a", "b"], &[&["1", " x "][..], &["2"]]).unwrap();
    /// assert_eq!(table.row_count(), 2);
    /// assert_eq!(table.row(0).unwrap(), vec!["1", "x"]);
    /// assert_eq!(table.row(1).unwrap(), vec!["2", ""]);
    /// ```
    pub fn new<A, R, S>(name: &str, attributes: &[A], rows: &[R]) -> Result<Table>
    where
        A: AsRef<str>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut builder = TableBuilder::new(name, attributes.iter().map(AsRef::<str>::as_ref))?;
        for row in rows {
            builder.push_row(AsRef::<[S]>::as_ref(row))?;
        }
        Ok(builder.build())
    }

    /// Builds a table from one value sequence per attribute.
    ///
    /// Every column must hold the same number of values.
    pub fn from_columns<A, S>(name: &str, attributes: &[A], columns: &[Vec<S>]) -> Result<Table>
    where
        A: AsRef<str>,
        S: AsRef<str>,
    {
        let mut builder = TableBuilder::new(name, attributes.iter().map(AsRef::<str>::as_ref))?;
        if columns.len() != attributes.len() {
            return Err(Error::ColumnCount {
                table: name.to_string(),
                expected: attributes.len(),
                found: columns.len(),
            });
        }

        let rows = columns.first().map_or(0, Vec::len);
        for (attribute, values) in attributes.iter().zip(columns) {
            if values.len() != rows {
                return Err(Error::ColumnLength {
                    table: name.to_string(),
                    column: AsRef::<str>::as_ref(attribute).to_string(),
                    expected: rows,
                    found: values.len(),
                });
            }
        }

        let interner = &mut builder.values;
        for (column, values) in builder.columns.iter_mut().zip(columns) {
            column.extend(
                values
                    .iter()
                    .map(|cell| interner.get_or_intern(normalize(cell.as_ref()))),
            );
        }
        builder.rows = rows;
        Ok(builder.build())
    }

    /// The table's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attribute names, in column order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// The name of a single column.
    pub fn attribute(&self, column: ColumnId) -> Result<&str> {
        let idx = self.check_column(column)?;
        Ok(&self.attributes[idx])
    }

    /// Looks up a column by name.
    pub fn column_id(&self, name: &str) -> Option<ColumnId> {
        self.attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|idx| idx as ColumnId)
    }

    /// The number of columns.
    pub fn column_count(&self) -> usize {
        self.attributes.len()
    }

    /// The number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Returns an iterator over the normalized values of one column, in row order.
    pub fn column_values(&self, column: ColumnId) -> Result<impl Iterator<Item = &str> + '_> {
        Ok(self
            .column_keys(column)?
            .iter()
            .map(move |key| self.values.resolve(key)))
    }

    /// Returns the normalized values of one row, in column order.
    pub fn row(&self, row: usize) -> Result<Vec<&str>> {
        if row >= self.rows {
            return Err(Error::RowOutOfRange {
                table: self.name.clone(),
                row,
                rows: self.rows,
            });
        }
        Ok(self
            .columns
            .iter()
            .map(|column| self.values.resolve(&column[row]))
            .collect())
    }

    /// The interned keys of one column, in row order. Equal keys mean equal normalized values.
    pub fn column_keys(&self, column: ColumnId) -> Result<&[Spur]> {
        let idx = self.check_column(column)?;
        Ok(&self.columns[idx])
    }

    fn check_column(&self, column: ColumnId) -> Result<usize> {
        let idx = usize::from(column);
        if idx < self.columns.len() {
            Ok(idx)
        } else {
            Err(Error::ColumnOutOfRange {
                table: self.name.clone(),
                column: idx,
                columns: self.columns.len(),
            })
        }
    }
}

/// Accumulates rows for a [`Table`].
pub struct TableBuilder {
    name: String,
    attributes: Vec<String>,
    columns: Vec<Vec<Spur>>,
    rows: usize,
    values: Rodeo,
}

impl TableBuilder {
    /// Starts a table with the given attribute names, which must be unique once surrounding
    /// whitespace is trimmed.
    pub fn new<I, S>(name: &str, attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let attributes: Vec<String> = attributes
            .into_iter()
            .map(|attribute| normalize(attribute.as_ref()).to_string())
            .collect();

        if attributes.len() > MAX_COLUMNS {
            return Err(Error::TooManyColumns {
                table: name.to_string(),
                columns: attributes.len(),
                max: MAX_COLUMNS,
            });
        }

        let mut seen = HashSet::with_capacity(attributes.len());
        for attribute in attributes.iter() {
            if !seen.insert(attribute.as_str()) {
                return Err(Error::DuplicateAttribute {
                    table: name.to_string(),
                    name: attribute.clone(),
                });
            }
        }

        Ok(TableBuilder {
            name: name.to_string(),
            columns: vec![Vec::new(); attributes.len()],
            attributes,
            rows: 0,
            values: Rodeo::new(),
        })
    }

    /// Appends a row.
    ///
    /// A row may be shorter than the attribute list; the missing cells are empty. A longer row is
    /// rejected before any of its cells are interned, and leaves the builder unchanged.
    pub fn push_row<I, S>(&mut self, cells: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cells: SmallVec<[S; 16]> = cells.into_iter().collect();
        if cells.len() > self.columns.len() {
            return Err(Error::RowWidth {
                table: self.name.clone(),
                row: self.rows,
                expected: self.columns.len(),
                found: cells.len(),
            });
        }

        let mut row: SmallVec<[Spur; 16]> = SmallVec::with_capacity(self.columns.len());
        for cell in cells.iter() {
            row.push(
                self.values
                    .get_or_intern(normalize(AsRef::<str>::as_ref(cell))),
            );
        }

        if row.len() < self.columns.len() {
            let missing = self.values.get_or_intern_static("");
            row.resize(self.columns.len(), missing);
        }

        for (column, key) in self.columns.iter_mut().zip(row) {
            column.push(key);
        }
        self.rows += 1;
        Ok(self)
    }

    /// The number of rows pushed so far.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Finishes the table.
    pub fn build(mut self) -> Table {
        for column in self.columns.iter_mut() {
            column.shrink_to_fit();
        }
        Table {
            name: self.name,
            attributes: self.attributes,
            columns: self.columns,
            rows: self.rows,
            values: self.values.into_resolver(),
        }
    }
}
