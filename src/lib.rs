//! ncschema: read NetCDF variables into typed records
//!
//! Scientific datasets stored as NetCDF usually lay their variables out on a
//! grid: a handful of 1-D variables along each dimension (latitude, longitude,
//! level, time) and many N-D variables with a value at every grid point. This
//! crate flattens a chosen sub-schema of those variables into one record per
//! grid point, with caller-supplied setters deciding where each value lands.
//!
//! ## Key Features
//!
//! - **Schema Bindings**: Declare the variables to read and typed setters for each
//! - **Validation**: Every way a schema can mismatch a file is reported, all at once
//! - **Hypercubes**: Random access and row-major iteration over 1 to 4 dimensional grids
//! - **Parallel Reads**: Records can be built concurrently through Rayon
//! - **Record Hooks**: Initializers and finalizers for stream-style records
//!
//! ## Module Organization
//!
//! - [`field`]: Primitive field types and typed setters
//! - [`schema`]: Schema bindings and their builder
//! - [`validation`]: Checking a schema against a concrete file
//! - [`array`]: Loading variable data and binding it to setters
//! - [`hypercube`]: The grid abstraction and its iterators
//! - [`schema_bound`]: Hypercubes built from schema bindings
//! - [`reader`]: File to records readers
//! - [`inspect`]: Which variables of a file can be bound, and how
//! - [`dump`]: Untyped rows and CSV/JSON lines output
//! - [`parallel`]: Parallel processing configuration
//! - [`errors`]: Centralized error handling
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ncschema::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//!     temperature: f32,
//! }
//!
//! let schema = SchemaBinding::builder()
//!     .record_initializer(|| Ok(Point::default()))
//!     .i32_dimension("x", |p: &mut Point, v| p.x = v)
//!     .i32_dimension("y", |p: &mut Point, v| p.y = v)
//!     .f32_coordinate_variable("temperature", |p: &mut Point, v| p.temperature = v)
//!     .build()
//!     .unwrap();
//!
//! let reader = SchemaBoundRecordReader::new(schema);
//! for point in reader.read_path("grid.nc").unwrap() {
//!     println!("{:?}", point.unwrap());
//! }
//! ```

pub mod array;
pub mod dump;
pub mod errors;
pub mod field;
pub mod hypercube;
pub mod inspect;
pub mod parallel;
pub mod reader;
pub mod schema;
pub mod schema_bound;
pub mod validation;

// Direct re-exports for the public API
pub use errors::*;
pub use field::{FieldBinding, FieldType, Setter};
pub use hypercube::{Hypercube, IntoRecords, Records, Transformed};
pub use parallel::ParallelConfig;
pub use reader::{schema_bound, RecordReader, SchemaBoundRecordReader};
pub use schema::{RecordFinalizer, RecordInitializer, SchemaBinding, SchemaBindingBuilder};
pub use schema_bound::SchemaBoundCube;
pub use validation::{find_errors, validate, ValidatedBinding, MAX_DIMENSIONS};

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::errors::{BindingError, NcSchemaError, Result};
    pub use crate::field::{FieldBinding, FieldType};
    pub use crate::hypercube::Hypercube;
    pub use crate::parallel::ParallelConfig;
    pub use crate::reader::{RecordReader, SchemaBoundRecordReader};
    pub use crate::schema::SchemaBinding;
    pub use crate::schema_bound::SchemaBoundCube;
}
