//! Centralized error handling for ncschema
//!
//! Two layers: [`BindingError`] describes why a schema can't be applied to a
//! particular file, and [`NcSchemaError`] is the crate-wide error returned by
//! every fallible operation.

use crate::field::FieldType;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use thiserror::Error;

/// Reasons a [`SchemaBinding`](crate::schema::SchemaBinding) is inconsistent
/// with the file it was validated against.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The file has no variable with the requested name
    #[error("File missing requested variable: {variable}")]
    MissingVariable { variable: String },

    /// Variables of this type can't be bound to record fields
    #[error("Binding to records of {data_type} variable types not supported. Requested variable was: {variable}.")]
    UnhandledVariableType { variable: String, data_type: String },

    /// The setter doesn't accept the type the variable is stored as
    #[error("Provided setter {setter_type} doesn't match the variable data type in the file {file_type} for variable {variable}.")]
    IncorrectVariableType {
        variable: String,
        file_type: FieldType,
        setter_type: &'static str,
    },

    /// The schema binds no coordinate variables, so there is no grid to read
    #[error("At least one coordinate variable must be bound to read records")]
    NoCoordinateVariables,

    /// Coordinate variables vary over different dimension lists, keyed by the
    /// comma-joined dimension names
    #[error("{}", describe_mismatched_coordinates(.groups))]
    MismatchedCoordinateVariableDimensions {
        groups: BTreeMap<String, BTreeSet<String>>,
    },

    /// A dimension variable varies over a dimension the coordinates don't use
    #[error("Dimension variable {variable} with dimension {dimension} doesn't vary over one of the coordinate dimensions {}", join(.coordinate_dimensions))]
    MismatchedDimensionVariableDimensions {
        variable: String,
        dimension: String,
        coordinate_dimensions: BTreeSet<String>,
    },

    /// Dimension variables must vary over exactly one dimension
    #[error("The requested dimension variable {variable} doesn't vary over a single dimension, it varies over [{dimensions}]")]
    NonScalarDimensionVariable { variable: String, dimensions: String },

    /// Grids of this many dimensions can't be read
    #[error("Coordinate variables over {dimension_count} dimensions are not supported (1 to {max} are). The requested variables were: {}.", join(.variables), max = crate::validation::MAX_DIMENSIONS)]
    UnsupportedCoordinateVariableDimensionality {
        dimension_count: usize,
        variables: BTreeSet<String>,
    },

    /// Several independent problems found in one pass
    #[error("{}", describe_combined(.0))]
    Combined(Vec<BindingError>),
}

impl BindingError {
    /// Collapse a list of errors: `None` when empty, the error itself when
    /// there's only one, [`BindingError::Combined`] otherwise.
    pub fn combine(mut errors: Vec<BindingError>) -> Option<BindingError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(BindingError::Combined(errors)),
        }
    }

    /// Flattened view of the individual errors
    pub fn errors(&self) -> Vec<&BindingError> {
        match self {
            BindingError::Combined(errors) => errors.iter().flat_map(BindingError::errors).collect(),
            other => vec![other],
        }
    }
}

fn join<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names.into_iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

fn describe_mismatched_coordinates(groups: &BTreeMap<String, BTreeSet<String>>) -> String {
    let mut message = String::from("Coordinates do not vary over the same dimensions...");
    for (dimensions, variables) in groups {
        message.push_str(&format!(
            "\n\tDimensions: {}; Variables: {}",
            dimensions,
            join(variables)
        ));
    }
    message
}

fn describe_combined(errors: &[BindingError]) -> String {
    let mut message = format!(
        "Errors({}) found when applying the provided schema bindings to the given file.",
        errors.len()
    );
    for error in errors {
        message.push_str(&format!("\n  - {error}"));
    }
    message
}

/// Which user hook failed while building a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStage {
    Initialize,
    Finalize,
}

impl fmt::Display for RecordStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStage::Initialize => write!(f, "initializing"),
            RecordStage::Finalize => write!(f, "finalizing"),
        }
    }
}

/// Main error type for ncschema operations
#[derive(Debug, Error)]
pub enum NcSchemaError {
    /// NetCDF library errors
    #[error("NetCDF error: {0}")]
    NetCDFError(#[from] netcdf::Error),

    /// I/O errors outside of record hooks
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Array shape errors while loading variable data
    #[error("Array error: {0}")]
    ArrayError(#[from] ndarray::ShapeError),

    /// The schema doesn't fit the file
    #[error("Invalid schema binding: {0}")]
    BindingError(#[from] BindingError),

    /// A schema was built without a record initializer
    #[error("A record initializer is required to build a schema binding")]
    MissingInitializer,

    /// The record initializer or finalizer returned an error
    #[error("Error {stage} record: {source}")]
    RecordCreation {
        stage: RecordStage,
        #[source]
        source: io::Error,
    },

    /// Index arity or bounds don't match the cube
    #[error("Index {index:?} out of bounds for hypercube of shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },

    /// Flat offset past the end of the cube
    #[error("Offset {offset} out of bounds for hypercube of {len} records")]
    OffsetOutOfBounds { offset: usize, len: usize },

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    /// JSON lines serialization errors from the dump writer
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV serialization errors from the dump writer
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Result type alias for ncschema operations
pub type Result<T> = std::result::Result<T, NcSchemaError>;
