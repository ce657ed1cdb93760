//! Named collections of arrays.
//!
//! A [`Dataset`] is the in-memory form of a NetCDF file: variables with named
//! dimensions and attributes. Grid coordinates are looked up through the
//! [`GridDescription`] trait, which both a [`Dataset`] and a plain
//! name-to-array map implement.

use ndarray::{ArrayD, ArrayViewD};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{RegridError, Result};
use crate::labeled::{Coordinate, LabeledArray};

/// Possible attribute values in NetCDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// String attribute
    Text(String),
    /// Numeric attribute (stored as f64 for simplicity)
    Number(f64),
    /// Array of numbers
    NumberArray(Vec<f64>),
}

/// A named array with its dimension names
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Name of the variable
    pub name: String,
    /// Dimensions of the variable, one per axis
    pub dimensions: Vec<String>,
    /// Variable values
    pub data: ArrayD<f64>,
    /// Variable attributes
    pub attributes: HashMap<String, AttributeValue>,
}

impl Variable {
    /// Create a variable, checking that every axis has a dimension name
    pub fn new(
        name: impl Into<String>,
        dimensions: Vec<String>,
        data: ArrayD<f64>,
    ) -> Result<Self> {
        let name = name.into();
        if dimensions.len() != data.ndim() {
            return Err(RegridError::shape_mismatch(
                format!("dimension names of variable {}", name),
                &[data.ndim()],
                &[dimensions.len()],
            ));
        }
        Ok(Self {
            name,
            dimensions,
            data,
            attributes: HashMap::new(),
        })
    }

    /// Shape of the variable (dimension sizes)
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}

/// A collection of variables sharing dimensions, e.g. one NetCDF file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// File-level attributes
    pub attributes: HashMap<String, AttributeValue>,
    /// Variables keyed by name
    pub variables: HashMap<String, Variable>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, replacing any variable of the same name
    pub fn insert(&mut self, variable: Variable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Builder-style [`Dataset::insert`] for a freshly created variable
    pub fn with_variable(
        mut self,
        name: &str,
        dimensions: &[&str],
        data: ArrayD<f64>,
    ) -> Result<Self> {
        let dims = dimensions.iter().map(|d| d.to_string()).collect();
        self.insert(Variable::new(name, dims, data)?);
        Ok(self)
    }

    /// Get a variable
    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Get a variable with error handling
    pub fn get_variable_checked(&self, name: &str) -> Result<&Variable> {
        self.variables
            .get(name)
            .ok_or_else(|| RegridError::MissingVariable {
                name: name.to_string(),
            })
    }

    /// Size of a dimension, taken from the first variable that uses it
    pub fn dimension_size(&self, dim: &str) -> Option<usize> {
        self.variables.values().find_map(|var| {
            var.dimensions
                .iter()
                .position(|d| d == dim)
                .map(|axis| var.data.shape()[axis])
        })
    }

    /// Extract a data variable as a labeled array.
    ///
    /// Every other variable whose dimensions are a subset of the data
    /// variable's dimensions is attached as a coordinate.
    pub fn labeled_array(&self, name: &str) -> Result<LabeledArray> {
        let var = self.get_variable_checked(name)?;
        let mut array = LabeledArray::new(var.data.clone(), var.dimensions.clone())?
            .with_name(name);

        for (coord_name, coord) in &self.variables {
            if coord_name == name || coord.dimensions.is_empty() {
                continue;
            }
            if coord.dimensions.iter().all(|d| var.dimensions.contains(d)) {
                array.coords.insert(
                    coord_name.clone(),
                    Coordinate::new(coord.dimensions.clone(), coord.data.clone()),
                );
            }
        }

        Ok(array)
    }
}

/// Key-addressable source of grid coordinates.
///
/// Implemented by [`Dataset`] (which knows dimension names) and by plain
/// `HashMap<String, ArrayD<f64>>` maps (which do not).
pub trait GridDescription {
    /// Whether a field of this name exists
    fn contains(&self, name: &str) -> bool;

    /// Values of a field
    fn values(&self, name: &str) -> Option<ArrayViewD<'_, f64>>;

    /// Native dimension names of a field, if the container records them
    fn dims(&self, _name: &str) -> Option<&[String]> {
        None
    }

    /// Values of a field with error handling
    fn values_checked(&self, name: &str) -> Result<ArrayViewD<'_, f64>> {
        self.values(name).ok_or_else(|| RegridError::MissingVariable {
            name: name.to_string(),
        })
    }
}

impl GridDescription for Dataset {
    fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    fn values(&self, name: &str) -> Option<ArrayViewD<'_, f64>> {
        self.variables.get(name).map(|var| var.data.view())
    }

    fn dims(&self, name: &str) -> Option<&[String]> {
        self.variables
            .get(name)
            .map(|var| var.dimensions.as_slice())
    }
}

impl GridDescription for HashMap<String, ArrayD<f64>> {
    fn contains(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn values(&self, name: &str) -> Option<ArrayViewD<'_, f64>> {
        self.get(name).map(|a| a.view())
    }
}
