//! Hypercubes built from a [`SchemaBinding`]
//!
//! All bound variables are read into memory up front, so the cube no longer
//! needs the file once it's built.

use crate::array::{ColumnData, IndexBinding};
use crate::errors::{NcSchemaError, Result};
use crate::hypercube::{index_of, Hypercube};
use crate::schema::SchemaBinding;
use crate::validation::{validate, ValidatedBinding};
use netcdf::File;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// A [`Hypercube`] producing records of type `T` from bound variables
pub struct SchemaBoundCube<T> {
    schema: SchemaBinding<T>,
    shape: Vec<usize>,
    dimension_names: Vec<String>,
    /// One binding per grid axis, fed the index along that axis
    axis_bindings: Vec<IndexBinding<T>>,
    /// Fed the row-major offset of the whole index
    coordinate_binding: IndexBinding<T>,
}

impl<T: 'static> SchemaBoundCube<T> {
    /// Validate `schema` against `file` and load the bound variables
    ///
    /// # Errors
    ///
    /// Returns an error if the schema doesn't fit the file or a variable can't be read.
    pub fn from_file(file: &File, schema: &SchemaBinding<T>) -> Result<Self> {
        Self::load(validate(file, schema)?)
    }

    /// Open the NetCDF file at `path` and build a cube from it
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be opened or [`Self::from_file`] fails.
    pub fn open(path: impl AsRef<Path>, schema: &SchemaBinding<T>) -> Result<Self> {
        let file = netcdf::open(path.as_ref())?;
        Self::from_file(&file, schema)
    }

    /// Load the variables of an already validated binding
    ///
    /// # Errors
    ///
    /// Returns an error if reading any bound variable fails.
    pub fn load(binding: ValidatedBinding<'_, T>) -> Result<Self> {
        let file = binding.file();
        let schema = binding.schema();

        let mut coordinates = Vec::with_capacity(schema.coordinate_variables().len());
        for (name, field) in schema.coordinate_variables() {
            coordinates.push(read_column(file, name)?.bind(name, field)?);
        }

        let mut axis_bindings = Vec::with_capacity(binding.ndim());
        for axis in 0..binding.ndim() {
            let mut bindings = Vec::new();
            for (name, field) in binding.dimension_variables(axis) {
                bindings.push(read_column(file, name)?.bind(name, field)?);
            }
            axis_bindings.push(IndexBinding::compose(bindings));
        }

        let shape = binding.shape();
        let dimension_names = binding.dimensions().iter().map(|d| d.name.clone()).collect();

        debug!(
            "Loaded schema-bound hypercube with shape {:?} ({} records)",
            shape,
            shape.iter().product::<usize>()
        );

        Ok(Self {
            schema: schema.clone(),
            shape,
            dimension_names,
            axis_bindings,
            coordinate_binding: IndexBinding::compose(coordinates),
        })
    }
}

impl<T> SchemaBoundCube<T> {
    /// The schema records are built with
    pub fn schema(&self) -> &SchemaBinding<T> {
        &self.schema
    }
}

fn read_column(file: &File, name: &str) -> Result<ColumnData> {
    let variable = file
        .variable(name)
        .ok_or_else(|| crate::errors::BindingError::MissingVariable {
            variable: name.to_string(),
        })?;
    ColumnData::read(&variable)
}

impl<T> Hypercube for SchemaBoundCube<T> {
    type Record = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn dimension_names(&self) -> &[String] {
        &self.dimension_names
    }

    fn read_offset(&self, offset: usize) -> Result<T> {
        let len = self.len();
        if offset >= len {
            return Err(NcSchemaError::OffsetOutOfBounds { offset, len });
        }

        let mut record = self.schema.initialize()?;

        // innermost axis first
        let index = index_of(&self.shape, offset);
        for (binding, i) in self.axis_bindings.iter().zip(&index).rev() {
            binding.set(&mut record, *i);
        }
        self.coordinate_binding.set(&mut record, offset);

        self.schema.finalize(&mut record)?;
        Ok(record)
    }
}

impl<T> fmt::Debug for SchemaBoundCube<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBoundCube")
            .field("shape", &self.shape)
            .field("dimension_names", &self.dimension_names)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
