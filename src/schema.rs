//! Schema bindings: which variables go into which record fields
//!
//! A [`SchemaBinding`] distinguishes two kinds of variables:
//!
//! - **Dimension variables** are 1-D variables varying along a single
//!   dimension, e.g. `latitude(x)`.
//! - **Coordinate variables** have a value at every point of a grid, e.g.
//!   `temperature(x, y, z)`.
//!
//! Take a file with dimensions `x`, `y`, `z` and variables
//! `latitude(x)`, `longitude(y)`, `level(z)`, `temperature(x, y, z)` and
//! `pressure(x, y, z)`. Binding all five yields one record per `(x, y, z)`
//! grid point carrying the latitude/longitude/level of that point along with
//! its temperature and pressure.
//!
//! In a complete schema all coordinate variables share the same ordered
//! dimensions, and every dimension variable varies along one of them. Those
//! rules are checked against a concrete file by
//! [`validate`](crate::validation::validate).
//!
//! ```rust,no_run
//! use ncschema::prelude::*;
//!
//! #[derive(Default)]
//! struct Measurement {
//!     latitude: f64,
//!     level: i32,
//!     temperature: f32,
//! }
//!
//! let binding = SchemaBinding::builder()
//!     .record_initializer(|| Ok(Measurement::default()))
//!     .f64_dimension_variable("x", "latitude", |m: &mut Measurement, v| m.latitude = v)
//!     .i32_dimension_variable("z", "level", |m: &mut Measurement, v| m.level = v)
//!     .f32_coordinate_variable("temperature", |m: &mut Measurement, v| m.temperature = v)
//!     .build()
//!     .unwrap();
//! ```

use crate::errors::{NcSchemaError, RecordStage, Result};
use crate::field::FieldBinding;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use std::sync::Arc;

/// Creates a fresh record for every grid point
pub type RecordInitializer<T> = Arc<dyn Fn() -> io::Result<T> + Send + Sync>;

/// Runs after all setters, before the record is handed out
pub type RecordFinalizer<T> = Arc<dyn Fn(&mut T) -> io::Result<()> + Send + Sync>;

/// Bindings from variables in a NetCDF file to fields of records of type `T`
pub struct SchemaBinding<T> {
    record_initializer: RecordInitializer<T>,
    dimension_to_variables: BTreeMap<String, BTreeSet<String>>,
    dimension_variables: BTreeMap<String, FieldBinding<T>>,
    coordinate_variables: BTreeMap<String, FieldBinding<T>>,
    record_finalizer: RecordFinalizer<T>,
}

impl<T> SchemaBinding<T> {
    #[must_use]
    pub fn builder() -> SchemaBindingBuilder<T> {
        SchemaBindingBuilder::new()
    }

    /// Declared dimension name to the dimension variables bound under it
    pub fn dimension_to_variables(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.dimension_to_variables
    }

    /// Dimension variables declared under `dimension`, empty if none
    pub fn variables_for(&self, dimension: &str) -> impl Iterator<Item = &str> {
        self.dimension_to_variables
            .get(dimension)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn dimension_variables(&self) -> &BTreeMap<String, FieldBinding<T>> {
        &self.dimension_variables
    }

    /// Binding for the named dimension variable, [`FieldBinding::Noop`] when unbound
    pub fn dimension_variable_binding(&self, variable: &str) -> FieldBinding<T> {
        self.dimension_variables
            .get(variable)
            .cloned()
            .unwrap_or(FieldBinding::Noop)
    }

    pub fn coordinate_variables(&self) -> &BTreeMap<String, FieldBinding<T>> {
        &self.coordinate_variables
    }

    /// Binding for the named coordinate variable, [`FieldBinding::Noop`] when unbound
    pub fn coordinate_variable_binding(&self, variable: &str) -> FieldBinding<T> {
        self.coordinate_variables
            .get(variable)
            .cloned()
            .unwrap_or(FieldBinding::Noop)
    }

    /// Every bound variable name, coordinates first
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.coordinate_variables
            .keys()
            .chain(self.dimension_variables.keys())
            .map(String::as_str)
    }

    /// Run the record initializer
    ///
    /// # Errors
    ///
    /// Returns [`NcSchemaError::RecordCreation`] if the initializer fails.
    pub fn initialize(&self) -> Result<T> {
        (self.record_initializer)().map_err(|source| NcSchemaError::RecordCreation {
            stage: RecordStage::Initialize,
            source,
        })
    }

    /// Run the record finalizer
    ///
    /// # Errors
    ///
    /// Returns [`NcSchemaError::RecordCreation`] if the finalizer fails.
    pub fn finalize(&self, record: &mut T) -> Result<()> {
        (self.record_finalizer)(record).map_err(|source| NcSchemaError::RecordCreation {
            stage: RecordStage::Finalize,
            source,
        })
    }
}

impl<T> Clone for SchemaBinding<T> {
    fn clone(&self) -> Self {
        Self {
            record_initializer: Arc::clone(&self.record_initializer),
            dimension_to_variables: self.dimension_to_variables.clone(),
            dimension_variables: self.dimension_variables.clone(),
            coordinate_variables: self.coordinate_variables.clone(),
            record_finalizer: Arc::clone(&self.record_finalizer),
        }
    }
}

impl<T> fmt::Debug for SchemaBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBinding")
            .field("dimension_to_variables", &self.dimension_to_variables)
            .field("dimension_variables", &self.dimension_variables)
            .field("coordinate_variables", &self.coordinate_variables)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SchemaBinding`]
pub struct SchemaBindingBuilder<T> {
    record_initializer: Option<RecordInitializer<T>>,
    dimension_to_variables: BTreeMap<String, BTreeSet<String>>,
    dimension_variables: BTreeMap<String, FieldBinding<T>>,
    coordinate_variables: BTreeMap<String, FieldBinding<T>>,
    record_finalizer: RecordFinalizer<T>,
}

impl<T> SchemaBindingBuilder<T> {
    fn new() -> Self {
        Self {
            record_initializer: None,
            dimension_to_variables: BTreeMap::new(),
            dimension_variables: BTreeMap::new(),
            coordinate_variables: BTreeMap::new(),
            record_finalizer: Arc::new(|_| Ok(())),
        }
    }

    /// Produces a new record for the variable setters to populate.
    ///
    /// Usually `|| Ok(Record::default())`. For records that stream straight
    /// into a writer this may hand out a handle to the same shared sink.
    #[must_use]
    pub fn record_initializer(
        mut self,
        initializer: impl Fn() -> io::Result<T> + Send + Sync + 'static,
    ) -> Self {
        self.record_initializer = Some(Arc::new(initializer));
        self
    }

    /// Bind `variable`, varying along `dimension`, with an untyped setter.
    ///
    /// Prefer the typed shorthands like [`Self::f64_dimension_variable`].
    /// Re-binding a variable replaces its previous setter.
    #[must_use]
    pub fn dimension_variable(
        mut self,
        dimension: impl Into<String>,
        variable: impl Into<String>,
        binding: FieldBinding<T>,
    ) -> Self {
        let variable = variable.into();
        for variables in self.dimension_to_variables.values_mut() {
            variables.remove(&variable);
        }
        self.dimension_to_variables.retain(|_, variables| !variables.is_empty());
        self.dimension_to_variables
            .entry(dimension.into())
            .or_default()
            .insert(variable.clone());
        self.dimension_variables.insert(variable, binding);
        self
    }

    /// Bind `variable` as a coordinate variable with an untyped setter.
    ///
    /// Prefer the typed shorthands like [`Self::f32_coordinate_variable`].
    #[must_use]
    pub fn coordinate_variable(mut self, variable: impl Into<String>, binding: FieldBinding<T>) -> Self {
        self.coordinate_variables.insert(variable.into(), binding);
        self
    }

    /// Optional hook run after the variable setters, before the record is
    /// yielded. Mostly useful for stream-style records that need a record
    /// terminator, e.g. a newline or a closing brace.
    #[must_use]
    pub fn record_finalizer(
        mut self,
        finalizer: impl Fn(&mut T) -> io::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.record_finalizer = Arc::new(finalizer);
        self
    }

    /// # Errors
    ///
    /// Returns [`NcSchemaError::MissingInitializer`] if no record initializer was configured.
    pub fn build(self) -> Result<SchemaBinding<T>> {
        let record_initializer = self.record_initializer.ok_or(NcSchemaError::MissingInitializer)?;
        Ok(SchemaBinding {
            record_initializer,
            dimension_to_variables: self.dimension_to_variables,
            dimension_variables: self.dimension_variables,
            coordinate_variables: self.coordinate_variables,
            record_finalizer: self.record_finalizer,
        })
    }
}

macro_rules! typed_builder_methods {
    ($($ty:ident: $dimension_variable:ident, $dimension:ident, $coordinate_variable:ident;)*) => {
        impl<T> SchemaBindingBuilder<T> {
            $(
                #[doc = concat!("Bind a `", stringify!($ty), "` dimension variable varying along `dimension`.")]
                #[must_use]
                pub fn $dimension_variable(
                    self,
                    dimension: impl Into<String>,
                    variable: impl Into<String>,
                    setter: impl Fn(&mut T, $ty) + Send + Sync + 'static,
                ) -> Self {
                    self.dimension_variable(dimension, variable, FieldBinding::$ty(setter))
                }

                #[doc = concat!("Bind a `", stringify!($ty), "` dimension variable named after its dimension.")]
                #[must_use]
                pub fn $dimension(
                    self,
                    dimension: impl Into<String>,
                    setter: impl Fn(&mut T, $ty) + Send + Sync + 'static,
                ) -> Self {
                    let dimension = dimension.into();
                    self.dimension_variable(dimension.clone(), dimension, FieldBinding::$ty(setter))
                }

                #[doc = concat!("Bind a `", stringify!($ty), "` coordinate variable.")]
                #[must_use]
                pub fn $coordinate_variable(
                    self,
                    variable: impl Into<String>,
                    setter: impl Fn(&mut T, $ty) + Send + Sync + 'static,
                ) -> Self {
                    self.coordinate_variable(variable, FieldBinding::$ty(setter))
                }
            )*
        }
    };
}

typed_builder_methods! {
    i8: i8_dimension_variable, i8_dimension, i8_coordinate_variable;
    u8: u8_dimension_variable, u8_dimension, u8_coordinate_variable;
    i16: i16_dimension_variable, i16_dimension, i16_coordinate_variable;
    u16: u16_dimension_variable, u16_dimension, u16_coordinate_variable;
    i32: i32_dimension_variable, i32_dimension, i32_coordinate_variable;
    u32: u32_dimension_variable, u32_dimension, u32_coordinate_variable;
    i64: i64_dimension_variable, i64_dimension, i64_coordinate_variable;
    u64: u64_dimension_variable, u64_dimension, u64_coordinate_variable;
    f32: f32_dimension_variable, f32_dimension, f32_coordinate_variable;
    f64: f64_dimension_variable, f64_dimension, f64_coordinate_variable;
    char: char_dimension_variable, char_dimension, char_coordinate_variable;
}
