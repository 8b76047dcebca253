//! Validation of a [`SchemaBinding`] against a concrete NetCDF file
//!
//! A [`ValidatedBinding`] is a schema proven consistent with a file: every
//! bound variable exists with the setter's type, the coordinate variables
//! share their dimensions and the dimension variables line up with them.
//! Downstream code relies on those guarantees instead of re-checking.

use crate::errors::{BindingError, Result};
use crate::field::{describe_variable_type, FieldBinding, FieldType};
use crate::schema::SchemaBinding;
use netcdf::File;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

/// Largest grid dimensionality records can be read over
pub const MAX_DIMENSIONS: usize = 4;

/// A named dimension of the record grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDimension {
    pub name: String,
    pub len: usize,
}

/// A [`SchemaBinding`] checked against the file it will read from
pub struct ValidatedBinding<'f, T> {
    file: &'f File,
    schema: SchemaBinding<T>,
    dimensions: Vec<GridDimension>,
    axis_variables: Vec<Vec<String>>,
}

impl<'f, T> ValidatedBinding<'f, T> {
    /// The file the schema was validated against
    pub fn file(&self) -> &'f File {
        self.file
    }

    pub fn schema(&self) -> &SchemaBinding<T> {
        &self.schema
    }

    /// Grid dimensions in the order the coordinate variables declare them
    pub fn dimensions(&self) -> &[GridDimension] {
        &self.dimensions
    }

    pub fn ndim(&self) -> usize {
        self.dimensions.len()
    }

    /// Length of each grid axis
    pub fn shape(&self) -> Vec<usize> {
        self.dimensions.iter().map(|d| d.len).collect()
    }

    /// Dimension variables that vary along the grid axis at `axis`
    pub fn dimension_variables(&self, axis: usize) -> Vec<(&str, &FieldBinding<T>)> {
        let bindings = self.schema.dimension_variables();
        self.axis_variables
            .get(axis)
            .into_iter()
            .flatten()
            .filter_map(|name| bindings.get(name).map(|binding| (name.as_str(), binding)))
            .collect()
    }
}

impl<T> fmt::Debug for ValidatedBinding<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedBinding")
            .field("schema", &self.schema)
            .field("dimensions", &self.dimensions)
            .field("axis_variables", &self.axis_variables)
            .finish_non_exhaustive()
    }
}

/// Check `schema` against `file`
///
/// # Errors
///
/// Returns [`NcSchemaError::BindingError`](crate::errors::NcSchemaError::BindingError)
/// describing every problem found in the first failing stage.
pub fn validate<'f, T>(file: &'f File, schema: &SchemaBinding<T>) -> Result<ValidatedBinding<'f, T>> {
    Ok(Validator { file, schema }.validate()?)
}

/// Collect the problems applying `schema` to `file` would run into, without
/// building a [`ValidatedBinding`].
pub fn find_errors<T>(file: &File, schema: &SchemaBinding<T>) -> Option<BindingError> {
    Validator { file, schema }.validate().err()
}

struct Validator<'a, 'f, T> {
    file: &'f File,
    schema: &'a SchemaBinding<T>,
}

/// Dimension names of a variable the validator has already confirmed exists
struct VariableShape {
    dimensions: Vec<GridDimension>,
}

impl VariableShape {
    fn key(&self) -> String {
        self.dimensions
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<'a, 'f, T> Validator<'a, 'f, T> {
    fn validate(&self) -> std::result::Result<ValidatedBinding<'f, T>, BindingError> {
        // if every variable exists the dimension checks can't hit a missing one
        if let Some(error) = self.check_variables() {
            return Err(error);
        }
        self.check_dimensions()
    }

    fn check_variables(&self) -> Option<BindingError> {
        let errors = self
            .schema
            .coordinate_variables()
            .iter()
            .chain(self.schema.dimension_variables())
            .filter_map(|(name, binding)| self.check_variable(name, binding))
            .collect();
        BindingError::combine(errors)
    }

    fn check_variable(&self, name: &str, binding: &FieldBinding<T>) -> Option<BindingError> {
        let Some(variable) = self.file.variable(name) else {
            return Some(BindingError::MissingVariable {
                variable: name.to_string(),
            });
        };

        let vartype = variable.vartype();
        let Some(file_type) = FieldType::from_variable_type(&vartype) else {
            return Some(BindingError::UnhandledVariableType {
                variable: name.to_string(),
                data_type: describe_variable_type(&vartype),
            });
        };

        if binding.field_type() != Some(file_type) {
            return Some(BindingError::IncorrectVariableType {
                variable: name.to_string(),
                file_type,
                setter_type: binding.type_name(),
            });
        }

        None
    }

    fn shape_of(&self, name: &str) -> Option<VariableShape> {
        let variable = self.file.variable(name)?;
        let dimensions = variable
            .dimensions()
            .iter()
            .map(|d| GridDimension {
                name: d.name().to_string(),
                len: d.len(),
            })
            .collect();
        Some(VariableShape { dimensions })
    }

    fn check_dimensions(&self) -> std::result::Result<ValidatedBinding<'f, T>, BindingError> {
        let coordinates = self.schema.coordinate_variables();
        if coordinates.is_empty() {
            return Err(BindingError::NoCoordinateVariables);
        }

        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut grid: Option<Vec<GridDimension>> = None;

        for name in coordinates.keys() {
            let shape = self.shape_of(name).ok_or_else(|| BindingError::MissingVariable {
                variable: name.clone(),
            })?;
            groups.entry(shape.key()).or_default().insert(name.clone());
            grid.get_or_insert(shape.dimensions);
        }

        if groups.len() > 1 {
            return Err(BindingError::MismatchedCoordinateVariableDimensions { groups });
        }

        let dimensions = grid.unwrap_or_default();
        let grid_names: BTreeSet<String> = dimensions.iter().map(|d| d.name.clone()).collect();

        let mut errors = Vec::new();
        let mut axis_variables = vec![Vec::new(); dimensions.len()];

        for name in self.schema.dimension_variables().keys() {
            let shape = self.shape_of(name).ok_or_else(|| BindingError::MissingVariable {
                variable: name.clone(),
            })?;

            if shape.dimensions.len() != 1 {
                errors.push(BindingError::NonScalarDimensionVariable {
                    variable: name.clone(),
                    dimensions: shape.key(),
                });
                continue;
            }

            let dimension = &shape.dimensions[0].name;
            match dimensions.iter().position(|d| &d.name == dimension) {
                Some(axis) => {
                    self.warn_on_declared_dimension(name, dimension);
                    axis_variables[axis].push(name.clone());
                }
                None => errors.push(BindingError::MismatchedDimensionVariableDimensions {
                    variable: name.clone(),
                    dimension: dimension.clone(),
                    coordinate_dimensions: grid_names.clone(),
                }),
            }
        }

        if let Some(error) = BindingError::combine(errors) {
            return Err(error);
        }

        if dimensions.is_empty() || dimensions.len() > MAX_DIMENSIONS {
            return Err(BindingError::UnsupportedCoordinateVariableDimensionality {
                dimension_count: dimensions.len(),
                variables: coordinates.keys().cloned().collect(),
            });
        }

        debug!(
            "Validated schema over dimensions [{}] with {} coordinate and {} dimension variables",
            grid_names.iter().cloned().collect::<Vec<_>>().join(","),
            coordinates.len(),
            self.schema.dimension_variables().len()
        );

        Ok(ValidatedBinding {
            file: self.file,
            schema: self.schema.clone(),
            dimensions,
            axis_variables,
        })
    }

    // The file decides which axis a dimension variable belongs to, the
    // declared dimension is informational.
    fn warn_on_declared_dimension(&self, variable: &str, actual: &str) {
        let declared = self
            .schema
            .dimension_to_variables()
            .iter()
            .find(|(_, variables)| variables.contains(variable))
            .map(|(dimension, _)| dimension.as_str());

        if let Some(declared) = declared.filter(|declared| *declared != actual) {
            warn!(
                "Dimension variable '{}' was declared along '{}' but varies along '{}' in the file",
                variable, declared, actual
            );
        }
    }
}
