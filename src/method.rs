//! Regridding methods.
//!
//! The weights themselves are produced by an external generator; this module
//! only names the methods, maps them to the generator's vocabulary and records
//! which ones need cell corners.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{RegridError, Result};

/// Interpolation method used to build the weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "bilinear")]
    Bilinear,
    /// First-order conservative remapping, needs cell corners on both grids
    #[serde(rename = "conservative")]
    Conservative,
    #[serde(rename = "patch")]
    Patch,
    #[serde(rename = "nearest_s2d", alias = "nearest_source_to_destination")]
    NearestSourceToDestination,
    #[serde(rename = "nearest_d2s", alias = "nearest_destination_to_source")]
    NearestDestinationToSource,
}

impl Method {
    /// All supported methods
    pub const ALL: [Method; 5] = [
        Method::Bilinear,
        Method::Conservative,
        Method::Patch,
        Method::NearestSourceToDestination,
        Method::NearestDestinationToSource,
    ];

    /// Canonical short name, used in weight file names and output attributes
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Bilinear => "bilinear",
            Method::Conservative => "conservative",
            Method::Patch => "patch",
            Method::NearestSourceToDestination => "nearest_s2d",
            Method::NearestDestinationToSource => "nearest_d2s",
        }
    }

    /// Name understood by `ESMF_RegridWeightGen -m`
    pub fn esmf_name(&self) -> &'static str {
        match self {
            Method::Bilinear => "bilinear",
            Method::Conservative => "conserve",
            Method::Patch => "patch",
            Method::NearestSourceToDestination => "neareststod",
            Method::NearestDestinationToSource => "nearestdtos",
        }
    }

    /// Whether cell corner coordinates are required on both grids
    pub fn needs_bounds(&self) -> bool {
        matches!(self, Method::Conservative)
    }

    /// Whether the method supports a periodic (wrapping) source grid.
    ///
    /// Corner arrays are exactly one larger than the cell arrays, which does
    /// not hold for a wrapped longitude axis.
    pub fn allows_periodic(&self) -> bool {
        !self.needs_bounds()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RegridError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "bilinear" => Ok(Method::Bilinear),
            "conservative" => Ok(Method::Conservative),
            "patch" => Ok(Method::Patch),
            "nearest_s2d" | "nearest_source_to_destination" => {
                Ok(Method::NearestSourceToDestination)
            }
            "nearest_d2s" | "nearest_destination_to_source" => {
                Ok(Method::NearestDestinationToSource)
            }
            _ => Err(RegridError::InvalidParameter {
                param: "method".to_string(),
                message: format!(
                    "Unknown regridding method: {}. Must be one of: bilinear, conservative, patch, nearest_s2d, nearest_d2s",
                    name
                ),
            }),
        }
    }
}
