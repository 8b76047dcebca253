//! Untyped rows for dumping variables without writing a record type
//!
//! [`row_schema`] builds a [`SchemaBinding`] over [`Row`]s straight from
//! variable names, picking each setter from the type stored in the file.
//! [`write_rows`] then streams the rows of a cube out as CSV or JSON lines.

use crate::errors::{BindingError, Result};
use crate::field::{describe_variable_type, FieldBinding, FieldType};
use crate::hypercube::Hypercube;
use crate::schema::SchemaBinding;
use netcdf::File;
use rayon::prelude::*;
use serde_json::{Map, Value};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// One record of named values, columns in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Row with every column set to `null`
    #[must_use]
    pub fn empty(columns: Arc<[String]>) -> Self {
        let values = vec![Value::Null; columns.len()];
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of the first column called `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|column| column == name)
            .and_then(|i| self.values.get(i))
    }

    fn set(&mut self, column: usize, value: Value) {
        if let Some(slot) = self.values.get_mut(column) {
            *slot = value;
        }
    }

    /// The row as a JSON object
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .columns
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect();
        Value::Object(map)
    }
}

/// Build a row schema over `coordinates` plus `(dimension, variable)` pairs.
///
/// Columns are the dimension variables in the order given, followed by the
/// coordinate variables.
///
/// # Errors
///
/// Returns a [`BindingError`] if a variable is missing from the file or its
/// type can't be bound. Everything else is left to validation when the
/// schema is applied to a file.
pub fn row_schema(
    file: &File,
    coordinates: &[String],
    dimensions: &[(String, String)],
) -> Result<SchemaBinding<Row>> {
    let columns: Arc<[String]> = dimensions
        .iter()
        .map(|(_, variable)| variable.clone())
        .chain(coordinates.iter().cloned())
        .collect();

    let mut builder = SchemaBinding::builder();
    for (column, (dimension, variable)) in dimensions.iter().enumerate() {
        let binding = column_binding(file, variable, column)?;
        builder = builder.dimension_variable(dimension.as_str(), variable.as_str(), binding);
    }
    for (i, variable) in coordinates.iter().enumerate() {
        let binding = column_binding(file, variable, dimensions.len() + i)?;
        builder = builder.coordinate_variable(variable.as_str(), binding);
    }

    debug!("Built row schema with columns {:?}", columns);
    builder
        .record_initializer(move || Ok(Row::empty(Arc::clone(&columns))))
        .build()
}

macro_rules! numeric_column {
    ($constructor:ident, $column:expr) => {{
        let column = $column;
        FieldBinding::$constructor(move |row: &mut Row, v| row.set(column, Value::from(v)))
    }};
}

fn column_binding(file: &File, variable: &str, column: usize) -> Result<FieldBinding<Row>> {
    let var = file
        .variable(variable)
        .ok_or_else(|| BindingError::MissingVariable {
            variable: variable.to_string(),
        })?;
    let vartype = var.vartype();
    let field_type =
        FieldType::from_variable_type(&vartype).ok_or_else(|| BindingError::UnhandledVariableType {
            variable: variable.to_string(),
            data_type: describe_variable_type(&vartype),
        })?;

    Ok(match field_type {
        FieldType::I8 => numeric_column!(i8, column),
        FieldType::U8 => numeric_column!(u8, column),
        FieldType::I16 => numeric_column!(i16, column),
        FieldType::U16 => numeric_column!(u16, column),
        FieldType::I32 => numeric_column!(i32, column),
        FieldType::U32 => numeric_column!(u32, column),
        FieldType::I64 => numeric_column!(i64, column),
        FieldType::U64 => numeric_column!(u64, column),
        // non-finite floats become null
        FieldType::F32 => numeric_column!(f32, column),
        FieldType::F64 => numeric_column!(f64, column),
        FieldType::Char => FieldBinding::char(move |row: &mut Row, v| {
            row.set(column, Value::String(v.to_string()));
        }),
    })
}

/// Output format for [`write_rows`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowFormat {
    /// Header line of column names, then one line per row
    #[default]
    Csv,
    /// One JSON object per line
    JsonLines,
}

impl FromStr for RowFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "jsonl" | "json-lines" | "ndjson" => Ok(Self::JsonLines),
            other => Err(format!("Unknown row format '{other}', expected 'csv' or 'jsonl'")),
        }
    }
}

impl fmt::Display for RowFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::JsonLines => f.write_str("jsonl"),
        }
    }
}

/// Write every row of `cube` in row-major order, returning the row count.
///
/// # Errors
///
/// Fails on the first record that can't be read or written.
pub fn write_rows<C, W>(cube: &C, format: RowFormat, writer: W) -> Result<usize>
where
    C: Hypercube<Record = Row>,
    W: Write,
{
    write_records(cube.records(), format, writer)
}

/// Like [`write_rows`] for any stream of rows, e.g. a truncated one.
///
/// For CSV the header comes from the first row, so an empty stream writes nothing.
///
/// # Errors
///
/// Fails on the first record that can't be read or written.
pub fn write_records<I, W>(records: I, format: RowFormat, writer: W) -> Result<usize>
where
    I: IntoIterator<Item = Result<Row>>,
    W: Write,
{
    let mut rows = RowWriter::new(format, writer);
    for record in records {
        rows.write(&record?)?;
    }
    rows.finish()
}

/// Rows built per parallel chunk by [`write_rows_parallel`]
pub const DEFAULT_CHUNK_ROWS: usize = 4096;

/// Write the first `limit` rows of `cube` (all when `None`), building each
/// chunk of `chunk_rows` rows in parallel and writing chunks in row-major order.
///
/// At most one chunk of rows is held in memory at a time.
///
/// # Errors
///
/// Fails on the first record that can't be read or written, without building
/// any chunk after it.
pub fn write_rows_parallel<C, W>(
    cube: &C,
    format: RowFormat,
    writer: W,
    limit: Option<usize>,
    chunk_rows: usize,
) -> Result<usize>
where
    C: Hypercube<Record = Row> + Sync,
    W: Write,
{
    let count = limit.map_or(cube.len(), |limit| limit.min(cube.len()));
    let chunk_rows = chunk_rows.max(1);

    let mut rows = RowWriter::new(format, writer);
    let mut start = 0;
    while start < count {
        let end = (start + chunk_rows).min(count);
        let chunk: Vec<Result<Row>> = (start..end)
            .into_par_iter()
            .map(|offset| cube.read_offset(offset))
            .collect();
        for record in chunk {
            rows.write(&record?)?;
        }
        start = end;
    }
    rows.finish()
}

/// Incremental row writer in one of the [`RowFormat`]s
pub struct RowWriter<W: Write> {
    sink: RowSink<W>,
    count: usize,
    format: RowFormat,
}

enum RowSink<W: Write> {
    Csv(csv::Writer<W>),
    JsonLines(W),
}

impl<W: Write> RowWriter<W> {
    pub fn new(format: RowFormat, writer: W) -> Self {
        let sink = match format {
            RowFormat::Csv => RowSink::Csv(csv::Writer::from_writer(writer)),
            RowFormat::JsonLines => RowSink::JsonLines(writer),
        };
        Self {
            sink,
            count: 0,
            format,
        }
    }

    /// Write one row. CSV writes the header before the first row.
    ///
    /// # Errors
    ///
    /// Fails if serialization or the underlying writer fails.
    pub fn write(&mut self, row: &Row) -> Result<()> {
        match &mut self.sink {
            RowSink::Csv(csv_writer) => {
                if self.count == 0 {
                    csv_writer.write_record(row.columns())?;
                }
                csv_writer.write_record(row.values().iter().map(csv_cell))?;
            }
            RowSink::JsonLines(writer) => {
                serde_json::to_writer(&mut *writer, &row.to_json())?;
                writer.write_all(b"\n")?;
            }
        }
        self.count += 1;
        Ok(())
    }

    /// Rows written so far
    pub fn count(&self) -> usize {
        self.count
    }

    /// Flush and return the number of rows written
    ///
    /// # Errors
    ///
    /// Fails if flushing the underlying writer fails.
    pub fn finish(mut self) -> Result<usize> {
        match &mut self.sink {
            RowSink::Csv(csv_writer) => csv_writer.flush()?,
            RowSink::JsonLines(writer) => writer.flush()?,
        }
        debug!("Wrote {} rows as {}", self.count, self.format);
        Ok(self.count)
    }
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
