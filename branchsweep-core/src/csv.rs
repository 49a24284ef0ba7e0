//! Minimal CSV codec for the report and the deletion log
//!
//! Every field is written quote-wrapped with embedded quotes doubled. Fields
//! never contain line breaks, so a line that ends inside a quoted field is a
//! partial write from an interrupted run: it is dropped and parsing resumes on
//! the next line. Rows whose field count does not match the header (such as
//! the summary block after the data) are skipped. A blank line ends the data
//! section.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Quote-wrap a single field
pub fn escape_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Encode one record, terminated by a newline
pub fn encode_record<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// One parsed line of CSV input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A complete record
    Fields(Vec<String>),
    /// An empty line
    Blank,
    /// A line or the input ended inside a quoted field
    Truncated,
}

/// Split CSV text into records
pub fn parse_records(text: &str) -> Vec<Record> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut chars = text.chars().peekable();

    'lines: while chars.peek().is_some() {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut saw_quote = false;

        loop {
            let Some(c) = chars.next() else {
                if in_quotes {
                    records.push(Record::Truncated);
                    return records;
                }
                break;
            };

            if in_quotes {
                if c == '\n' {
                    records.push(Record::Truncated);
                    continue 'lines;
                }
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    field.push(c);
                }
                continue;
            }

            match c {
                '"' => {
                    in_quotes = true;
                    saw_quote = true;
                }
                ',' => fields.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => break,
                other => field.push(other),
            }
        }

        fields.push(field);
        if fields.len() == 1 && fields[0].is_empty() && !saw_quote {
            records.push(Record::Blank);
        } else {
            records.push(Record::Fields(fields));
        }
    }

    records
}

/// Column name to position map built once per file
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    path: PathBuf,
    columns: HashMap<String, usize>,
    width: usize,
}

impl HeaderIndex {
    /// Build the index from a header record
    pub fn new(path: impl Into<PathBuf>, header: &[String]) -> Self {
        let columns = header
            .iter()
            .enumerate()
            .rev()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();

        Self {
            path: path.into(),
            columns,
            width: header.len(),
        }
    }

    /// Number of columns in the header
    pub fn width(&self) -> usize {
        self.width
    }

    /// Position of a column, if present
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.get(column).copied()
    }

    /// Position of a required column; a missing one is fatal
    pub fn require(&self, column: &str) -> Result<usize> {
        self.position(column).ok_or_else(|| Error::MissingColumn {
            column: column.to_string(),
            path: self.path.clone(),
        })
    }
}

/// The data section of a CSV file: header plus well-formed rows
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub header: HeaderIndex,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read a CSV file that must exist
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(path, &text)
    }

    /// Parse CSV text; `path` is only used in error messages
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut records = parse_records(text).into_iter();

        let header = loop {
            match records.next() {
                Some(Record::Fields(fields)) => break fields,
                Some(Record::Blank) => continue,
                Some(Record::Truncated) | None => {
                    return Err(Error::Csv(format!("{} has no header row", path.display())))
                }
            }
        };
        let header = HeaderIndex::new(path, &header);

        let mut rows = Vec::new();
        for (line, record) in records.enumerate() {
            match record {
                Record::Fields(fields) if fields.len() == header.width() => rows.push(fields),
                Record::Fields(fields) => {
                    tracing::warn!(
                        file = %path.display(),
                        row = line + 1,
                        "Skipping row with {} fields (expected {})",
                        fields.len(),
                        header.width()
                    );
                }
                Record::Blank => break,
                Record::Truncated => {
                    tracing::warn!(
                        file = %path.display(),
                        row = line + 1,
                        "Ignoring truncated row"
                    );
                }
            }
        }

        Ok(Self { header, rows })
    }
}
