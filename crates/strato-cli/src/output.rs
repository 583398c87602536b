//! Output rendering for CLI commands.
//!
//! Commands produce either a [`ShowOutput`] (one resource as parallel
//! columns and values) or a [`ListOutput`] (headers plus a lazy row
//! iterator). [`OutputFormat`] renders either as a table, JSON, or bare
//! values.

use std::io::Write;

use serde_json::{Map, Value};

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles table, JSON and value output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Write a single resource.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_show<W: Write>(&self, writer: &mut W, show: &ShowOutput) -> Result<(), CliError> {
        match self.format {
            Format::Json => {
                let object = to_object(&show.columns, &show.values);
                serde_json::to_writer_pretty(&mut *writer, &object)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                let rows = show
                    .columns
                    .iter()
                    .zip(&show.values)
                    .map(|(c, v)| vec![c.clone(), v.clone()]);
                write_table(writer, &["Field".to_string(), "Value".to_string()], rows)?;
            }
            Format::Value => {
                for value in &show.values {
                    writeln!(writer, "{value}")?;
                }
            }
        }
        Ok(())
    }

    /// Write a listing, consuming its rows.
    ///
    /// JSON and value output stream rows as they are produced; table output
    /// buffers them to size the columns.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_list<W, I>(&self, writer: &mut W, list: ListOutput<I>) -> Result<(), CliError>
    where
        W: Write,
        I: Iterator<Item = Vec<String>>,
    {
        let ListOutput { headers, rows } = list;
        match self.format {
            Format::Json => {
                write!(writer, "[")?;
                for (i, row) in rows.enumerate() {
                    if i > 0 {
                        write!(writer, ",")?;
                    }
                    write!(writer, "\n  ")?;
                    serde_json::to_writer(&mut *writer, &to_object(&headers, &row))
                        .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                }
                writeln!(writer, "\n]")?;
            }
            Format::Table => {
                write_table(writer, &headers, rows)?;
            }
            Format::Value => {
                for row in rows {
                    writeln!(writer, "{}", row.join(" "))?;
                }
            }
        }
        Ok(())
    }
}

/// One resource as parallel column labels and display values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowOutput {
    /// Column labels.
    pub columns: Vec<String>,
    /// Display values, one per column.
    pub values: Vec<String>,
}

impl ShowOutput {
    /// Look up the display value under a column label.
    #[must_use]
    pub fn value_of(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }
}

/// Headers plus a row iterator that is consumed exactly once.
#[derive(Debug)]
pub struct ListOutput<I> {
    /// Column headers.
    pub headers: Vec<String>,
    /// Rows, each parallel to `headers`.
    pub rows: I,
}

impl<I: Iterator<Item = Vec<String>>> ListOutput<I> {
    /// Create a listing.
    pub fn new<H: Into<String>>(headers: impl IntoIterator<Item = H>, rows: I) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows,
        }
    }
}

fn to_object(columns: &[String], values: &[String]) -> Value {
    let map: Map<String, Value> = columns
        .iter()
        .zip(values)
        .map(|(c, v)| (c.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(map)
}

fn write_table<W: Write>(
    writer: &mut W,
    headers: &[String],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<(), CliError> {
    let rows: Vec<Vec<String>> = rows.collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(writer, headers, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    write_row(writer, &rule, &widths)?;
    for row in &rows {
        write_row(writer, row, &widths)?;
    }
    Ok(())
}

fn write_row<W: Write>(writer: &mut W, cells: &[String], widths: &[usize]) -> Result<(), CliError> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(writer, "{}", line.trim_end())?;
    Ok(())
}
