//! Error types for regrid.
//!
//! Every structural problem (coordinate conventions, mesh shapes, input
//! kinds) is reported through [`RegridError`] at the earliest point it can be
//! detected. Failures coming from the weight generator, the weight-file codec
//! or the filesystem are passed through without being rewrapped.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for regrid operations.
#[derive(Error, Debug)]
pub enum RegridError {
    /// Neither the COARDS (`lat`/`lon`) nor the CF 1.6 (`latitude`/`longitude`)
    /// naming convention matched the grid description
    #[error(
        "Coordinate convention not recognized: expected {} (COARDS) or {} (CF 1.6)",
        coards_names(.boundary),
        cf_names(.boundary)
    )]
    ConventionNotRecognized { boundary: bool },

    /// Two shapes that must agree do not
    #[error("Shape mismatch in {what}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        what: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Coordinate arrays are neither both 1-D nor both 2-D
    #[error("Unsupported grid rank: lon is {lon_ndim}-D and lat is {lat_ndim}-D, both must be 1-D or 2-D")]
    UnsupportedGridRank { lon_ndim: usize, lat_ndim: usize },

    /// Input kind cannot be regridded
    #[error("Unsupported input type: {kind}, input must be an array or a labeled array")]
    UnsupportedInputType { kind: String },

    /// Requested operation is not available
    #[error("Not implemented: {feature}")]
    NotImplemented { feature: String },

    /// A named field is absent from a grid description or dataset
    #[error("Variable not found: {name}")]
    MissingVariable { name: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// The weight generator failed
    #[error("Weight generation error: {message}")]
    WeightGeneration { message: String },

    /// A weight file is missing, unreadable or inconsistent with the grids
    #[error("Weight file error ({}): {message}", .path.display())]
    WeightFile { path: PathBuf, message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// NetCDF file operation errors
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Array shape errors raised by ndarray
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegridError {
    /// Shorthand for [`RegridError::ShapeMismatch`].
    pub fn shape_mismatch(what: impl Into<String>, expected: &[usize], found: &[usize]) -> Self {
        RegridError::ShapeMismatch {
            what: what.into(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}

fn coards_names(boundary: &bool) -> &'static str {
    if *boundary {
        "`lat_b`/`lon_b`"
    } else {
        "`lat`/`lon`"
    }
}

fn cf_names(boundary: &bool) -> &'static str {
    if *boundary {
        "`latitude_b`/`longitude_b`"
    } else {
        "`latitude`/`longitude`"
    }
}

/// Convenience type alias for Results with RegridError
pub type Result<T> = std::result::Result<T, RegridError>;
