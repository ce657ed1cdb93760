//! 2-D mesh normalization.
//!
//! Coordinates arrive either as 1-D axis vectors (rectilinear grids) or as
//! full 2-D fields (curvilinear grids). Both are turned into a pair of
//! `(Ny, Nx)` arrays.

use ndarray::{Array2, ArrayViewD, Ix1, Ix2};

use crate::error::{RegridError, Result};

/// Longitude and latitude values of every grid point, both shaped `(Ny, Nx)`
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    lon: Array2<f64>,
    lat: Array2<f64>,
}

impl Mesh {
    /// Pair up two 2-D arrays of identical shape
    pub fn new(lon: Array2<f64>, lat: Array2<f64>) -> Result<Self> {
        if lon.shape() != lat.shape() {
            return Err(RegridError::shape_mismatch(
                "lon/lat mesh",
                lon.shape(),
                lat.shape(),
            ));
        }
        Ok(Self { lon, lat })
    }

    /// Expand axis vectors into a mesh: row `j` of `lon` is the longitude
    /// vector, column `i` of `lat` is the latitude vector.
    pub fn from_axes(lon: &[f64], lat: &[f64]) -> Self {
        let shape = (lat.len(), lon.len());
        Self {
            lon: Array2::from_shape_fn(shape, |(_, i)| lon[i]),
            lat: Array2::from_shape_fn(shape, |(j, _)| lat[j]),
        }
    }

    /// `(Ny, Nx)`
    pub fn shape(&self) -> (usize, usize) {
        self.lon.dim()
    }

    pub fn lon(&self) -> &Array2<f64> {
        &self.lon
    }

    pub fn lat(&self) -> &Array2<f64> {
        &self.lat
    }

    pub fn into_parts(self) -> (Array2<f64>, Array2<f64>) {
        (self.lon, self.lat)
    }
}

/// Normalize raw longitude/latitude arrays into a 2-D mesh
pub fn as_2d_mesh(lon: ArrayViewD<'_, f64>, lat: ArrayViewD<'_, f64>) -> Result<Mesh> {
    match (lon.ndim(), lat.ndim()) {
        (2, 2) => {
            let lon = lon.into_dimensionality::<Ix2>()?.to_owned();
            let lat = lat.into_dimensionality::<Ix2>()?.to_owned();
            Mesh::new(lon, lat)
        }
        (1, 1) => {
            let lon = lon.into_dimensionality::<Ix1>()?.to_vec();
            let lat = lat.into_dimensionality::<Ix1>()?.to_vec();
            Ok(Mesh::from_axes(&lon, &lat))
        }
        (lon_ndim, lat_ndim) => Err(RegridError::UnsupportedGridRank { lon_ndim, lat_ndim }),
    }
}
