//! Record readers: files in, records out

use crate::errors::Result;
use crate::hypercube::{Hypercube, IntoRecords};
use crate::schema::SchemaBinding;
use crate::schema_bound::SchemaBoundCube;
use netcdf::File;
use std::path::Path;

/// Reads records of type `T` out of NetCDF files
pub trait RecordReader<T> {
    type Records: Iterator<Item = Result<T>>;

    /// Read all records from an open file
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read with this reader's schema.
    fn read(&self, file: &File) -> Result<Self::Records>;

    /// Open the file at `path` and read all records from it
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be opened or read.
    fn read_path(&self, path: impl AsRef<Path>) -> Result<Self::Records>
    where
        Self: Sized,
    {
        let file = netcdf::open(path.as_ref())?;
        self.read(&file)
    }
}

/// Record reader generating records through a [`SchemaBinding`]
#[derive(Debug)]
pub struct SchemaBoundRecordReader<T> {
    binding: SchemaBinding<T>,
}

impl<T> Clone for SchemaBoundRecordReader<T> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
        }
    }
}

impl<T: 'static> SchemaBoundRecordReader<T> {
    #[must_use]
    pub fn new(binding: SchemaBinding<T>) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> &SchemaBinding<T> {
        &self.binding
    }
}

impl<T: 'static> RecordReader<T> for SchemaBoundRecordReader<T> {
    type Records = IntoRecords<SchemaBoundCube<T>>;

    fn read(&self, file: &File) -> Result<Self::Records> {
        Ok(SchemaBoundCube::from_file(file, &self.binding)?.into_records())
    }
}

/// Shorthand for [`SchemaBoundRecordReader::new`]
#[must_use]
pub fn schema_bound<T: 'static>(binding: SchemaBinding<T>) -> SchemaBoundRecordReader<T> {
    SchemaBoundRecordReader::new(binding)
}
