//! NetCDF data loading and writing.
//!
//! Grid descriptions and input fields are read into a [`Dataset`]; regridded
//! labeled arrays are written back out as self-describing NetCDF files.

use chrono::Utc;
use ndarray::{Array, IxDyn};
use netcdf::{self, Attribute, Variable as NetCDFVariable};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::dataset::{AttributeValue, Dataset, Variable};
use crate::error::{RegridError, Result};
use crate::labeled::LabeledArray;

/// Name given to unnamed labeled arrays on output
pub const DEFAULT_VARIABLE_NAME: &str = "data";

/// Load every numeric variable of a NetCDF file into memory
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let file = open(path)?;

    let mut dataset = Dataset::new();
    for attr in file.attributes() {
        let value = convert_attribute(&attr)?;
        dataset.attributes.insert(attr.name().to_string(), value);
    }

    for var in file.variables() {
        // Skip variables we can't handle (non-numeric types)
        if !is_supported_variable(&var) {
            warn!("Skipping unsupported variable: {}", var.name());
            continue;
        }
        dataset.insert(read_variable(&var)?);
    }

    debug!(
        "Loaded {} variables from {}",
        dataset.variables.len(),
        path.display()
    );
    Ok(dataset)
}

/// Load one data variable of a NetCDF file as a labeled array, with every
/// variable sharing its dimensions attached as a coordinate
pub fn load_labeled_array(path: &Path, name: &str) -> Result<LabeledArray> {
    {
        let file = open(path)?;
        let var = file
            .variable(name)
            .ok_or_else(|| RegridError::MissingVariable {
                name: name.to_string(),
            })?;
        if !is_supported_variable(&var) {
            return Err(RegridError::UnsupportedInputType {
                kind: format!("variable {} has non-numeric type {:?}", name, var.vartype()),
            });
        }
    }

    load_dataset(path)?.labeled_array(name)
}

/// Write a labeled array and its coordinates to a new NetCDF file.
///
/// A `history` attribute records when the file was written.
pub fn write_labeled_array(path: &Path, array: &LabeledArray) -> Result<()> {
    let name = array.name.as_deref().unwrap_or(DEFAULT_VARIABLE_NAME);
    let mut file = netcdf::create(path)?;

    let mut sizes: HashMap<&str, usize> = HashMap::new();
    for (dim, &size) in array.dims.iter().zip(array.shape()) {
        sizes.insert(dim.as_str(), size);
    }
    for coord in array.coords.values() {
        for (dim, &size) in coord.dims.iter().zip(coord.values.shape()) {
            sizes.entry(dim.as_str()).or_insert(size);
        }
    }
    for (dim, size) in &sizes {
        file.add_dimension(dim, *size)?;
    }

    for (coord_name, coord) in &array.coords {
        if coord_name == name {
            continue;
        }
        let dims: Vec<&str> = coord.dims.iter().map(String::as_str).collect();
        let mut var = file.add_variable::<f64>(coord_name, &dims)?;
        var.put_values(&standard_values(&coord.values), ..)?;
    }

    {
        let dims: Vec<&str> = array.dims.iter().map(String::as_str).collect();
        let mut var = file.add_variable::<f64>(name, &dims)?;
        for (attr_name, value) in &array.attrs {
            match value {
                AttributeValue::Text(text) => var.put_attribute(attr_name, text.as_str())?,
                AttributeValue::Number(n) => var.put_attribute(attr_name, *n)?,
                AttributeValue::NumberArray(values) => {
                    var.put_attribute(attr_name, values.clone())?
                }
            };
        }
        var.put_values(&standard_values(&array.data), ..)?;
    }

    let history = format!(
        "{}: regridded {} with regrid v{}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        name,
        env!("CARGO_PKG_VERSION")
    );
    file.add_attribute("history", history.as_str())?;

    info!("Wrote {} to {}", name, path.display());
    Ok(())
}

fn open(path: &Path) -> Result<netcdf::File> {
    if !path.exists() {
        return Err(RegridError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }
    let file = netcdf::open(path)?;
    info!("Opened NetCDF file: {}", path.display());
    Ok(file)
}

fn standard_values(array: &Array<f64, IxDyn>) -> Vec<f64> {
    array.iter().copied().collect()
}

/// Check if a variable has a supported type that we can work with
fn is_supported_variable(var: &NetCDFVariable) -> bool {
    use netcdf::types::{BasicType, VariableType};

    matches!(
        var.vartype(),
        VariableType::Basic(BasicType::Byte)
            | VariableType::Basic(BasicType::Short)
            | VariableType::Basic(BasicType::Int)
            | VariableType::Basic(BasicType::Float)
            | VariableType::Basic(BasicType::Double)
    )
}

fn read_variable(var: &NetCDFVariable) -> Result<Variable> {
    let dimensions: Vec<String> = var
        .dimensions()
        .iter()
        .map(|dim| dim.name().to_string())
        .collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|dim| dim.len()).collect();

    let data = Array::from_shape_vec(IxDyn(&shape), read_values(var)?)?;
    let mut variable = Variable::new(var.name(), dimensions, data)?;
    for attr in var.attributes() {
        let value = convert_attribute(&attr)?;
        variable.attributes.insert(attr.name().to_string(), value);
    }
    Ok(variable)
}

/// Read a numeric variable, widening every type to f64
fn read_values(var: &NetCDFVariable) -> Result<Vec<f64>> {
    use netcdf::types::{BasicType, VariableType};

    match var.vartype() {
        VariableType::Basic(BasicType::Byte) => {
            let values: Vec<i8> = var.get_values::<i8, _>(..)?;
            Ok(values.into_iter().map(f64::from).collect())
        }
        VariableType::Basic(BasicType::Short) => {
            let values: Vec<i16> = var.get_values::<i16, _>(..)?;
            Ok(values.into_iter().map(f64::from).collect())
        }
        VariableType::Basic(BasicType::Int) => {
            let values: Vec<i32> = var.get_values::<i32, _>(..)?;
            Ok(values.into_iter().map(f64::from).collect())
        }
        VariableType::Basic(BasicType::Float) => {
            let values: Vec<f32> = var.get_values::<f32, _>(..)?;
            Ok(values.into_iter().map(f64::from).collect())
        }
        VariableType::Basic(BasicType::Double) => Ok(var.get_values::<f64, _>(..)?),
        other => Err(RegridError::UnsupportedInputType {
            kind: format!("variable {} has non-numeric type {:?}", var.name(), other),
        }),
    }
}

/// Convert a NetCDF attribute to our AttributeValue enum
fn convert_attribute(attr: &Attribute) -> Result<AttributeValue> {
    use netcdf::AttributeValue as NcAttributeValue;

    let value = attr.value()?;

    let converted = match value {
        NcAttributeValue::Str(s) => AttributeValue::Text(s),

        NcAttributeValue::Uchar(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Schar(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Short(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Int(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Float(v) => AttributeValue::Number(v as f64),
        NcAttributeValue::Double(v) => AttributeValue::Number(v),

        NcAttributeValue::Shorts(v) => {
            AttributeValue::NumberArray(v.into_iter().map(f64::from).collect())
        }
        NcAttributeValue::Ints(v) => {
            AttributeValue::NumberArray(v.into_iter().map(f64::from).collect())
        }
        NcAttributeValue::Floats(v) => {
            AttributeValue::NumberArray(v.into_iter().map(f64::from).collect())
        }
        NcAttributeValue::Doubles(v) => AttributeValue::NumberArray(v),

        other => AttributeValue::Text(format!("{:?}", other)),
    };
    Ok(converted)
}
