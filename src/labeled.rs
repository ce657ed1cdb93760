//! Labeled arrays: numeric data with named dimensions, coordinates and attributes.

use ndarray::ArrayD;
use std::collections::HashMap;

use crate::dataset::AttributeValue;
use crate::error::{RegridError, Result};

/// Coordinate values together with the dimensions they vary along
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub dims: Vec<String>,
    pub values: ArrayD<f64>,
}

impl Coordinate {
    pub fn new(dims: Vec<String>, values: ArrayD<f64>) -> Self {
        Self { dims, values }
    }
}

/// An n-dimensional array whose axes carry names
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    /// Variable name, if any
    pub name: Option<String>,
    /// Numeric values
    pub data: ArrayD<f64>,
    /// One dimension name per axis of `data`
    pub dims: Vec<String>,
    /// Coordinates keyed by name
    pub coords: HashMap<String, Coordinate>,
    /// Descriptive attributes
    pub attrs: HashMap<String, AttributeValue>,
}

impl LabeledArray {
    /// Create a labeled array without coordinates
    pub fn new(data: ArrayD<f64>, dims: Vec<String>) -> Result<Self> {
        if dims.len() != data.ndim() {
            return Err(RegridError::shape_mismatch(
                "dimension names of labeled array",
                &[data.ndim()],
                &[dims.len()],
            ));
        }
        Ok(Self {
            name: None,
            data,
            dims,
            coords: HashMap::new(),
            attrs: HashMap::new(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a coordinate, checking its length against the named dimensions
    pub fn with_coord(
        mut self,
        name: impl Into<String>,
        dims: &[&str],
        values: ArrayD<f64>,
    ) -> Result<Self> {
        let name = name.into();
        let dims: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
        let expected: Vec<usize> = dims
            .iter()
            .map(|d| self.dim_size(d).unwrap_or(0))
            .collect();
        if expected.as_slice() != values.shape() {
            return Err(RegridError::shape_mismatch(
                format!("coordinate {}", name),
                &expected,
                values.shape(),
            ));
        }
        self.coords.insert(name, Coordinate::new(dims, values));
        Ok(self)
    }

    /// Size of a named dimension
    pub fn dim_size(&self, dim: &str) -> Option<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .map(|axis| self.data.shape()[axis])
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}
