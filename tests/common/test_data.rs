//! Test data generation utilities.
//!
//! Grid descriptions with known coordinates, in memory and as NetCDF files.

use ndarray::{arr1, Array2, Array3, ArrayD};
use regrid::Dataset;
use std::collections::HashMap;
use std::path::Path;

// Use the netcdf crate's error type directly
use netcdf::Error;
type Result<T> = std::result::Result<T, Error>;

/// Source grid: 3 latitudes by 4 longitudes
pub const SOURCE_LON: [f64; 4] = [0.0, 10.0, 20.0, 30.0];
pub const SOURCE_LAT: [f64; 3] = [0.0, 10.0, 20.0];
pub const SOURCE_LON_B: [f64; 5] = [-5.0, 5.0, 15.0, 25.0, 35.0];
pub const SOURCE_LAT_B: [f64; 4] = [-5.0, 5.0, 15.0, 25.0];

/// Destination grid: 2 latitudes by 2 longitudes
pub const DESTINATION_LON: [f64; 2] = [8.0, 28.0];
pub const DESTINATION_LAT: [f64; 2] = [1.0, 19.0];
pub const DESTINATION_LON_B: [f64; 3] = [-2.0, 18.0, 38.0];
pub const DESTINATION_LAT_B: [f64; 3] = [-8.0, 10.0, 28.0];

/// Source cells nearest to each destination cell, as `j * 4 + i`
pub const NEAREST_SOURCE_CELLS: [[f64; 2]; 2] = [[1.0, 3.0], [9.0, 11.0]];

/// Rectilinear grid with COARDS names and 1-D coordinates
pub fn rectilinear_grid(lon: &[f64], lat: &[f64]) -> Dataset {
    Dataset::new()
        .with_variable("lon", &["lon"], arr1(lon).into_dyn())
        .unwrap()
        .with_variable("lat", &["lat"], arr1(lat).into_dyn())
        .unwrap()
}

/// Rectilinear grid with COARDS names, including cell corners
pub fn rectilinear_grid_with_bounds(
    lon: &[f64],
    lat: &[f64],
    lon_b: &[f64],
    lat_b: &[f64],
) -> Dataset {
    rectilinear_grid(lon, lat)
        .with_variable("lon_b", &["lon_b"], arr1(lon_b).into_dyn())
        .unwrap()
        .with_variable("lat_b", &["lat_b"], arr1(lat_b).into_dyn())
        .unwrap()
}

pub fn source_grid() -> Dataset {
    rectilinear_grid_with_bounds(&SOURCE_LON, &SOURCE_LAT, &SOURCE_LON_B, &SOURCE_LAT_B)
}

pub fn destination_grid() -> Dataset {
    rectilinear_grid_with_bounds(
        &DESTINATION_LON,
        &DESTINATION_LAT,
        &DESTINATION_LON_B,
        &DESTINATION_LAT_B,
    )
}

/// The destination grid as a curvilinear CF grid: 2-D `latitude`/`longitude` on `(nj, ni)`
pub fn curvilinear_destination_grid() -> Dataset {
    let lon = Array2::from_shape_fn((2, 2), |(_, i)| DESTINATION_LON[i]).into_dyn();
    let lat = Array2::from_shape_fn((2, 2), |(j, _)| DESTINATION_LAT[j]).into_dyn();
    Dataset::new()
        .with_variable("longitude", &["nj", "ni"], lon)
        .unwrap()
        .with_variable("latitude", &["nj", "ni"], lat)
        .unwrap()
}

/// Plain name-to-array grid description
pub fn grid_map(lon: &[f64], lat: &[f64]) -> HashMap<String, ArrayD<f64>> {
    let mut grid = HashMap::new();
    grid.insert("lon".to_string(), arr1(lon).into_dyn());
    grid.insert("lat".to_string(), arr1(lat).into_dyn());
    grid
}

/// Field on the source grid whose value is the flattened cell index `j * 4 + i`,
/// shifted by `100 * t` for each leading index `t`
pub fn cell_index_field(levels: usize) -> ArrayD<f64> {
    Array3::from_shape_fn((levels, SOURCE_LAT.len(), SOURCE_LON.len()), |(t, j, i)| {
        (100 * t + j * SOURCE_LON.len() + i) as f64
    })
    .into_dyn()
}

/// Creates a NetCDF file holding a `tas(time, lat, lon)` field on the source
/// grid, together with its coordinate variables.
pub fn create_source_field_nc(path: &Path, times: &[f64]) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("lon", SOURCE_LON.len())?;
    file.add_dimension("lat", SOURCE_LAT.len())?;
    file.add_dimension("time", times.len())?;
    file.add_attribute("title", "Cell Index Test Data")?;

    {
        let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_values(&SOURCE_LON, ..)?;
    }
    {
        let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_values(&SOURCE_LAT, ..)?;
    }
    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "hours since 2000-01-01")?;
        time_var.put_values(times, ..)?;
    }
    {
        let values: Vec<f32> = cell_index_field(times.len())
            .iter()
            .map(|v| *v as f32)
            .collect();
        let mut tas = file.add_variable::<f32>("tas", &["time", "lat", "lon"])?;
        tas.put_attribute("units", "K")?;
        tas.put_values(&values, ..)?;
    }

    Ok(())
}

/// Creates a NetCDF grid file with 1-D COARDS coordinates
pub fn create_grid_nc(path: &Path, lon: &[f64], lat: &[f64]) -> Result<()> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("lon", lon.len())?;
    file.add_dimension("lat", lat.len())?;

    {
        let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
        lon_var.put_values(lon, ..)?;
    }
    {
        let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
        lat_var.put_values(lat, ..)?;
    }

    Ok(())
}
