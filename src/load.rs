use crate::{Error, Result, Table, TableBuilder};
use csv_core::{ReadFieldResult, ReaderBuilder};
use std::fs::File;
use std::io;
use std::path::Path;
use std::str;
use tracing::debug;

/// How delimited text is split into fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field separator.
    pub delimiter: u8,
    /// Quote character.
    pub quote: u8,
    /// Whether the first record names the attributes. Without a header, attributes are named
    /// `column_0`, `column_1`, … and the first record decides how many there are.
    pub has_header: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            delimiter: b',',
            quote: b'"',
            has_header: true,
        }
    }
}

impl LoadOptions {
    /// Semicolon-separated fields with a header line.
    pub fn semicolon() -> Self {
        LoadOptions {
            delimiter: b';',
            ..LoadOptions::default()
        }
    }
}

/// Reads a table from delimited text.
///
/// ```
/// use ucc_profiler::{load_table, LoadOptions};
///
/// let input = "id;name\n1;\"Smith; John\"\n2; Doe \n";
/// let table = load_table(input.as_bytes(), "people", &LoadOptions::semicolon()).unwrap();
/// assert_eq!(table.attributes(), &["id", "name"]);
/// assert_eq!(table.row(0).unwrap(), vec!["1", "Smith; John"]);
/// assert_eq!(table.row(1).unwrap(), vec!["2", "Doe"]);
/// ```
pub fn load_table<R: io::Read>(mut input: R, name: &str, options: &LoadOptions) -> Result<Table> {
    let mut inputbuf = [0; 16384];
    let mut fieldbuf = vec![0; 1024];
    let mut fieldlen = 0;
    let mut record: Vec<String> = Vec::new();
    let mut builder: Option<TableBuilder> = None;
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .quote(options.quote)
        .build();

    loop {
        let read = input.read(&mut inputbuf)?;
        let mut bytes = &inputbuf[..read];
        loop {
            let (result, nin, nout) = reader.read_field(bytes, &mut fieldbuf[fieldlen..]);
            bytes = &bytes[nin..];
            fieldlen += nout;
            match result {
                ReadFieldResult::InputEmpty => break,
                ReadFieldResult::OutputFull => {
                    // Fields may be arbitrarily long; grow and keep going.
                    let len = fieldbuf.len();
                    fieldbuf.resize(len * 2, 0);
                }
                ReadFieldResult::Field { record_end } => {
                    let field = str::from_utf8(&fieldbuf[..fieldlen]).map_err(|e| Error::Parse {
                        line: reader.line(),
                        message: e.to_string(),
                    })?;
                    record.push(field.to_string());
                    fieldlen = 0;

                    if record_end {
                        match builder.as_mut() {
                            Some(builder) => {
                                builder.push_row(record.drain(..))?;
                            }
                            None if options.has_header => {
                                builder = Some(TableBuilder::new(name, record.drain(..))?);
                            }
                            None => {
                                let names = (0..record.len()).map(|idx| format!("column_{}", idx));
                                let mut first = TableBuilder::new(name, names)?;
                                first.push_row(record.drain(..))?;
                                builder = Some(first);
                            }
                        }
                    }
                }
                ReadFieldResult::End => {
                    let table = match builder {
                        Some(builder) => builder.build(),
                        None => TableBuilder::new(name, Vec::<String>::new())?.build(),
                    };
                    debug!(
                        table = table.name(),
                        columns = table.column_count(),
                        rows = table.row_count(),
                        "loaded table"
                    );
                    return Ok(table);
                }
            }
        }
    }
}

/// Reads a table from a file, naming it after the file's stem.
pub fn load_path<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Table> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let file = File::open(path)?;
    load_table(io::BufReader::new(file), &name, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_header() {
        let table = load_table("id; name\n1; a\n".as_bytes(), "t", &LoadOptions::semicolon())
            .unwrap();
        assert_eq!(table.attributes(), &["id", "name"]);
        assert_eq!(table.row(0).unwrap(), vec!["1", "a"]);
    }

    #[test]
    fn headerless() {
        let table = load_table(
            "1,a\n2,b\n".as_bytes(),
            "t",
            &LoadOptions {
                has_header: false,
                ..LoadOptions::default()
            },
        )
        .unwrap();
        assert_eq!(table.attributes(), &["column_0", "column_1"]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn missing_final_newline_and_short_rows() {
        let table = load_table("a,b,c\n1,2\n3,4,5".as_bytes(), "t", &LoadOptions::default())
            .unwrap();
        assert_eq!(table.row(0).unwrap(), vec!["1", "2", ""]);
        assert_eq!(table.row(1).unwrap(), vec!["3", "4", "5"]);
    }

    #[test]
    fn long_rows_fail() {
        let result = load_table("a\n1,2\n".as_bytes(), "t", &LoadOptions::default());
        assert!(matches!(result, Err(Error::RowWidth { row: 0, found: 2, .. })));
    }

    #[test]
    fn long_fields() {
        let long = "x".repeat(5000);
        let input = format!("a\n{}\n", long);
        let table = load_table(input.as_bytes(), "t", &LoadOptions::default()).unwrap();
        assert_eq!(table.row(0).unwrap(), vec![long.as_str()]);
    }

    #[test]
    fn invalid_utf8() {
        let result = load_table(&b"a\n\xff\n"[..], "t", &LoadOptions::default());
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn empty_input() {
        let table = load_table(io::empty(), "t", &LoadOptions::default()).unwrap();
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }
}
