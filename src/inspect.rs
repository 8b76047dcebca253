//! File inspection from the point of view of a schema author
//!
//! Lists every variable with the field type it can be bound as and the
//! dimensions it varies over, so it's clear which variables can act as
//! dimension variables and which coordinate variables line up.

use crate::field::{describe_variable_type, FieldType};
use netcdf::File;

/// Information about a dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionInfo {
    pub name: String,
    pub length: usize,
    pub is_unlimited: bool,
}

/// A variable as seen by the schema builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSummary {
    pub name: String,
    /// `None` when the variable's type can't be bound
    pub field_type: Option<FieldType>,
    /// NetCDF type name, set for every variable
    pub data_type: String,
    pub dimensions: Vec<DimensionInfo>,
}

impl VariableSummary {
    /// Bindable as a dimension variable: one dimension and a handled type
    #[must_use]
    pub fn is_dimension_candidate(&self) -> bool {
        self.field_type.is_some() && self.dimensions.len() == 1
    }

    /// Comma-joined dimension names, the same key coordinate variables are grouped by
    #[must_use]
    pub fn dimension_key(&self) -> String {
        self.dimensions
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    #[must_use]
    pub fn total_elements(&self) -> usize {
        self.dimensions.iter().map(|d| d.length).product()
    }
}

/// Summaries of every variable in the root group, sorted by name
pub fn summarize(file: &File) -> Vec<VariableSummary> {
    let mut summaries: Vec<VariableSummary> = file
        .variables()
        .map(|var| {
            let vartype = var.vartype();
            VariableSummary {
                name: var.name().to_string(),
                field_type: FieldType::from_variable_type(&vartype),
                data_type: describe_variable_type(&vartype),
                dimensions: var
                    .dimensions()
                    .iter()
                    .map(|d| DimensionInfo {
                        name: d.name().to_string(),
                        length: d.len(),
                        is_unlimited: d.is_unlimited(),
                    })
                    .collect(),
            }
        })
        .collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}

/// Prints the dimensions and bindable variables of a file.
pub fn print_summary(file: &File) {
    println!("\n Dimensions");
    println!("==============");

    let mut dimensions: Vec<_> = file.dimensions().collect();
    dimensions.sort_by(|a, b| a.name().cmp(&b.name()));

    if dimensions.is_empty() {
        println!("   (No dimensions found)");
    }
    for dim in dimensions {
        let length_info = if dim.is_unlimited() {
            format!("{} (unlimited)", dim.len())
        } else {
            dim.len().to_string()
        };
        println!("    {} = {}", dim.name(), length_info);
    }

    println!("\n Variables");
    println!("=============");

    let summaries = summarize(file);
    if summaries.is_empty() {
        println!("   (No variables found)");
    }
    for summary in &summaries {
        let binding = match summary.field_type {
            Some(field_type) if summary.is_dimension_candidate() => {
                format!("{field_type}, dimension or coordinate")
            }
            Some(field_type) => format!("{field_type}, coordinate"),
            None => format!("{}, not bindable", summary.data_type),
        };

        if summary.dimensions.is_empty() {
            println!("    {} ({}): scalar", summary.name, binding);
        } else {
            let shape: Vec<String> = summary.dimensions.iter().map(|d| d.length.to_string()).collect();
            println!(
                "    {} ({}): [{}] = ({})",
                summary.name,
                binding,
                summary.dimension_key(),
                shape.join(" x ")
            );
        }
    }
}
