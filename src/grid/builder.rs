//! Conversion of grid descriptions into the weight generator's grid layout.
//!
//! Arrays in this crate are row-major with `Ny` as the first axis. The weight
//! generator works on Fortran-ordered `(Nx, Ny)` grids, so the axes are
//! reversed here and nowhere else.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::dataset::GridDescription;
use crate::error::{RegridError, Result};
use crate::grid::locator::{locate_coordinates, CoordinateNames};
use crate::grid::mesh::{as_2d_mesh, Mesh};

/// Explicit coordinate field names for one grid.
///
/// A pair given in full is used as is. If only one name of a pair is given,
/// the other comes from the detected naming convention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateOverrides {
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
    #[serde(default)]
    pub lat_b: Option<String>,
    #[serde(default)]
    pub lon_b: Option<String>,
}

impl CoordinateOverrides {
    /// Names of the cell center fields
    pub fn resolve_centers<G>(&self, grid: &G) -> Result<CoordinateNames>
    where
        G: GridDescription + ?Sized,
    {
        resolve_pair(grid, self.lat.as_deref(), self.lon.as_deref(), false)
    }

    /// Names of the cell corner fields
    pub fn resolve_bounds<G>(&self, grid: &G) -> Result<CoordinateNames>
    where
        G: GridDescription + ?Sized,
    {
        resolve_pair(grid, self.lat_b.as_deref(), self.lon_b.as_deref(), true)
    }
}

fn resolve_pair<G>(
    grid: &G,
    lat: Option<&str>,
    lon: Option<&str>,
    boundary: bool,
) -> Result<CoordinateNames>
where
    G: GridDescription + ?Sized,
{
    if let (Some(lat), Some(lon)) = (lat, lon) {
        return Ok(CoordinateNames::new(lat, lon));
    }
    let located = locate_coordinates(grid, boundary)?;
    Ok(CoordinateNames {
        lat: lat.map(str::to_string).unwrap_or(located.lat),
        lon: lon.map(str::to_string).unwrap_or(located.lon),
    })
}

/// A grid in the layout the weight generator consumes.
///
/// All arrays are indexed `[i, j]` with `i` along x (longitude-like) and `j`
/// along y, i.e. shaped `(Nx, Ny)` for centers and `(Nx + 1, Ny + 1)` for
/// corners.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalGrid {
    center_lon: Array2<f64>,
    center_lat: Array2<f64>,
    corners: Option<(Array2<f64>, Array2<f64>)>,
    periodic: bool,
}

impl CanonicalGrid {
    /// Wrap a cell center mesh, reversing its axes
    pub fn from_mesh(mesh: Mesh, periodic: bool) -> Self {
        let (lon, lat) = mesh.into_parts();
        Self {
            center_lon: lon.reversed_axes(),
            center_lat: lat.reversed_axes(),
            corners: None,
            periodic,
        }
    }

    /// Attach a corner mesh, which must be one larger than the cells on both axes
    pub fn add_corners(&mut self, corners: Mesh) -> Result<()> {
        let (ny, nx) = self.shape();
        let (ny_b, nx_b) = corners.shape();
        if (ny_b, nx_b) != (ny + 1, nx + 1) {
            return Err(RegridError::shape_mismatch(
                "cell corners",
                &[ny + 1, nx + 1],
                &[ny_b, nx_b],
            ));
        }
        let (lon, lat) = corners.into_parts();
        self.corners = Some((lon.reversed_axes(), lat.reversed_axes()));
        Ok(())
    }

    /// Cell shape `(Ny, Nx)` in array order
    pub fn shape(&self) -> (usize, usize) {
        let (nx, ny) = self.center_lon.dim();
        (ny, nx)
    }

    /// Number of cells
    pub fn size(&self) -> usize {
        self.center_lon.len()
    }

    pub fn periodic(&self) -> bool {
        self.periodic
    }

    /// Center longitudes, shaped `(Nx, Ny)`
    pub fn center_lon(&self) -> &Array2<f64> {
        &self.center_lon
    }

    /// Center latitudes, shaped `(Nx, Ny)`
    pub fn center_lat(&self) -> &Array2<f64> {
        &self.center_lat
    }

    /// Corner longitudes and latitudes, shaped `(Nx + 1, Ny + 1)`
    pub fn corners(&self) -> Option<(&Array2<f64>, &Array2<f64>)> {
        self.corners.as_ref().map(|(lon, lat)| (lon, lat))
    }

    /// Flatten a `(Nx, Ny)` array with x varying fastest
    pub fn fortran_values(array: &Array2<f64>) -> Vec<f64> {
        let (nx, ny) = array.dim();
        let mut values = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                values.push(array[[i, j]]);
            }
        }
        values
    }
}

/// Build the generator-side grid for one grid description.
///
/// Returns the grid together with its cell shape `(Ny, Nx)`.
pub fn build_grid<G>(
    grid: &G,
    need_bounds: bool,
    names: &CoordinateOverrides,
    periodic: bool,
) -> Result<(CanonicalGrid, (usize, usize))>
where
    G: GridDescription + ?Sized,
{
    let centers = names.resolve_centers(grid)?;
    let mesh = as_2d_mesh(
        grid.values_checked(&centers.lon)?,
        grid.values_checked(&centers.lat)?,
    )?;
    let shape = mesh.shape();
    let mut canonical = CanonicalGrid::from_mesh(mesh, periodic);

    if need_bounds {
        let bounds = names.resolve_bounds(grid)?;
        let corners = as_2d_mesh(
            grid.values_checked(&bounds.lon)?,
            grid.values_checked(&bounds.lat)?,
        )?;
        canonical.add_corners(corners)?;
    }

    Ok((canonical, shape))
}
