//! Weight generation through the `ESMF_RegridWeightGen` command-line tool.
//!
//! Each grid is written as a SCRIP grid file into a scratch directory, the
//! tool writes the weight file to its final location, and the scratch
//! directory is removed on release.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing::debug;

use crate::error::{RegridError, Result};
use crate::grid::CanonicalGrid;
use crate::method::Method;
use crate::weights::{WeightGenerator, DEFAULT_ESMF_BINARY};

/// Runs `ESMF_RegridWeightGen` to produce weight files
#[derive(Debug, Clone)]
pub struct EsmfCliGenerator {
    binary: PathBuf,
    ignore_unmapped: bool,
}

/// Scratch directory holding the SCRIP grid files of one generation run
#[derive(Debug)]
pub struct EsmfScratch {
    dir: TempDir,
}

impl EsmfScratch {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl EsmfCliGenerator {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ignore_unmapped: false,
        }
    }

    /// Leave destination cells outside the source grid unmapped instead of failing
    pub fn with_ignore_unmapped(mut self, ignore: bool) -> Self {
        self.ignore_unmapped = ignore;
        self
    }

    /// Command-line arguments for one run
    pub fn arguments(
        &self,
        source: &Path,
        destination: &Path,
        weights: &Path,
        method: Method,
        source_periodic: bool,
        destination_periodic: bool,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-s".into(),
            source.into(),
            "-d".into(),
            destination.into(),
            "-w".into(),
            weights.into(),
            "-m".into(),
            method.esmf_name().into(),
            "--src_type".into(),
            "SCRIP".into(),
            "--dst_type".into(),
            "SCRIP".into(),
        ];
        if !source_periodic {
            args.push("--src_regional".into());
        }
        if !destination_periodic {
            args.push("--dst_regional".into());
        }
        if self.ignore_unmapped {
            args.push("-i".into());
        }
        args.push("--no_log".into());
        args
    }
}

impl Default for EsmfCliGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ESMF_BINARY)
    }
}

impl WeightGenerator for EsmfCliGenerator {
    type Handle = EsmfScratch;

    fn build_weights(
        &self,
        grid_in: &CanonicalGrid,
        grid_out: &CanonicalGrid,
        method: Method,
        destination: &Path,
    ) -> Result<EsmfScratch> {
        let scratch = EsmfScratch {
            dir: tempfile::Builder::new().prefix("regrid-esmf-").tempdir()?,
        };
        let source_file = scratch.path().join("source_grid.nc");
        let destination_file = scratch.path().join("destination_grid.nc");
        write_scrip(&source_file, grid_in, "source grid")?;
        write_scrip(&destination_file, grid_out, "destination grid")?;

        let args = self.arguments(
            &source_file,
            &destination_file,
            destination,
            method,
            grid_in.periodic(),
            grid_out.periodic(),
        );
        debug!(binary = %self.binary.display(), ?args, "Running weight generator");

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|e| RegridError::WeightGeneration {
                message: format!("failed to run {}: {}", self.binary.display(), e),
            })?;

        if !output.status.success() {
            return Err(RegridError::WeightGeneration {
                message: format!(
                    "{} exited with {}: stderr: {} stdout: {}",
                    self.binary.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim(),
                    String::from_utf8_lossy(&output.stdout).trim()
                ),
            });
        }

        Ok(scratch)
    }

    fn release(&self, handle: EsmfScratch) -> Result<()> {
        handle.dir.close()?;
        Ok(())
    }
}

/// Write a grid in the SCRIP layout: flattened cells with x varying fastest,
/// and four counterclockwise corners per cell when corners are known.
pub fn write_scrip(path: &Path, grid: &CanonicalGrid, title: &str) -> Result<()> {
    let (nx, ny) = grid.center_lon().dim();
    let size = nx * ny;
    let dims = [to_i32(nx)?, to_i32(ny)?];
    let center_lon = CanonicalGrid::fortran_values(grid.center_lon());
    let center_lat = CanonicalGrid::fortran_values(grid.center_lat());

    let mut file = netcdf::create(path)?;
    file.add_dimension("grid_size", size)?;
    file.add_dimension("grid_rank", 2)?;
    file.add_attribute("title", title)?;

    {
        let mut var = file.add_variable::<i32>("grid_dims", &["grid_rank"])?;
        var.put_values(&dims, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("grid_center_lat", &["grid_size"])?;
        var.put_attribute("units", "degrees")?;
        var.put_values(&center_lat, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("grid_center_lon", &["grid_size"])?;
        var.put_attribute("units", "degrees")?;
        var.put_values(&center_lon, ..)?;
    }
    {
        let mut var = file.add_variable::<i32>("grid_imask", &["grid_size"])?;
        var.put_values(&vec![1i32; size], ..)?;
    }

    if let Some((lon_b, lat_b)) = grid.corners() {
        file.add_dimension("grid_corners", 4)?;
        let mut corner_lon = Vec::with_capacity(size * 4);
        let mut corner_lat = Vec::with_capacity(size * 4);
        for j in 0..ny {
            for i in 0..nx {
                let mut cell = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
                // descending axes give clockwise cells
                if signed_area(&cell.map(|c| (lon_b[c], lat_b[c]))) < 0.0 {
                    cell.reverse();
                }
                for c in cell {
                    corner_lon.push(lon_b[c]);
                    corner_lat.push(lat_b[c]);
                }
            }
        }
        {
            let mut var =
                file.add_variable::<f64>("grid_corner_lat", &["grid_size", "grid_corners"])?;
            var.put_attribute("units", "degrees")?;
            var.put_values(&corner_lat, ..)?;
        }
        {
            let mut var =
                file.add_variable::<f64>("grid_corner_lon", &["grid_size", "grid_corners"])?;
            var.put_attribute("units", "degrees")?;
            var.put_values(&corner_lon, ..)?;
        }
    }

    Ok(())
}

/// Shoelace area in (lon, lat) space, positive for counterclockwise corners
fn signed_area(corners: &[(f64, f64); 4]) -> f64 {
    let mut twice_area = 0.0;
    for k in 0..4 {
        let (x0, y0) = corners[k];
        let (x1, y1) = corners[(k + 1) % 4];
        twice_area += x0 * y1 - x1 * y0;
    }
    twice_area / 2.0
}

fn to_i32(n: usize) -> Result<i32> {
    i32::try_from(n).map_err(|_| RegridError::InvalidParameter {
        param: "grid_dims".to_string(),
        message: format!("{} cells do not fit a SCRIP grid", n),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Mesh;

    fn grid_with_corners() -> CanonicalGrid {
        let mut grid = CanonicalGrid::from_mesh(Mesh::from_axes(&[5.0, 15.0], &[2.5]), false);
        grid.add_corners(Mesh::from_axes(&[0.0, 10.0, 20.0], &[0.0, 5.0]))
            .unwrap();
        grid
    }

    #[test]
    fn test_arguments() {
        let generator = EsmfCliGenerator::default().with_ignore_unmapped(true);
        let args = generator.arguments(
            Path::new("src.nc"),
            Path::new("dst.nc"),
            Path::new("w.nc"),
            Method::Conservative,
            false,
            false,
        );
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(&args[..8], &["-s", "src.nc", "-d", "dst.nc", "-w", "w.nc", "-m", "conserve"]);
        assert!(args.contains(&"--src_regional".to_string()));
        assert!(args.contains(&"--dst_regional".to_string()));
        assert!(args.contains(&"-i".to_string()));
    }

    #[test]
    fn test_periodic_source_is_global() {
        let args = EsmfCliGenerator::default().arguments(
            Path::new("src.nc"),
            Path::new("dst.nc"),
            Path::new("w.nc"),
            Method::Bilinear,
            true,
            false,
        );
        assert!(!args.contains(&OsString::from("--src_regional")));
        assert!(args.contains(&OsString::from("--dst_regional")));
    }

    #[test]
    fn test_write_scrip_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.nc");
        write_scrip(&path, &grid_with_corners(), "test").unwrap();

        let file = netcdf::open(&path).unwrap();
        let dims: Vec<i32> = file
            .variable("grid_dims")
            .unwrap()
            .get_values::<i32, _>(..)
            .unwrap();
        assert_eq!(dims, vec![2, 1]);

        let corner_lon: Vec<f64> = file
            .variable("grid_corner_lon")
            .unwrap()
            .get_values::<f64, _>(..)
            .unwrap();
        assert_eq!(&corner_lon[..4], &[0.0, 10.0, 10.0, 0.0]);
        assert_eq!(&corner_lon[4..], &[10.0, 20.0, 20.0, 10.0]);

        let corner_lat: Vec<f64> = file
            .variable("grid_corner_lat")
            .unwrap()
            .get_values::<f64, _>(..)
            .unwrap();
        assert_eq!(&corner_lat[..4], &[0.0, 0.0, 5.0, 5.0]);
    }

    #[test]
    fn test_write_scrip_descending_latitude_is_counterclockwise() {
        let mut grid = CanonicalGrid::from_mesh(Mesh::from_axes(&[5.0], &[2.5, -2.5]), false);
        grid.add_corners(Mesh::from_axes(&[0.0, 10.0], &[5.0, 0.0, -5.0]))
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.nc");
        write_scrip(&path, &grid, "test").unwrap();

        let file = netcdf::open(&path).unwrap();
        let corner_lon: Vec<f64> = file
            .variable("grid_corner_lon")
            .unwrap()
            .get_values::<f64, _>(..)
            .unwrap();
        let corner_lat: Vec<f64> = file
            .variable("grid_corner_lat")
            .unwrap()
            .get_values::<f64, _>(..)
            .unwrap();

        for cell in 0..2 {
            let mut corners = [(0.0, 0.0); 4];
            for k in 0..4 {
                corners[k] = (corner_lon[cell * 4 + k], corner_lat[cell * 4 + k]);
            }
            assert!(signed_area(&corners) > 0.0, "cell {} is clockwise", cell);
        }
        assert_eq!(&corner_lat[..4], &[0.0, 0.0, 5.0, 5.0]);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_run_labels_output_streams() {
        let generator = EsmfCliGenerator::new("false");
        let dir = tempfile::tempdir().unwrap();
        let grid = grid_with_corners();

        match generator.build_weights(&grid, &grid, Method::Bilinear, &dir.path().join("w.nc")) {
            Err(RegridError::WeightGeneration { message }) => {
                assert!(message.contains("stderr: "), "{}", message);
                assert!(message.contains(" stdout: "), "{}", message);
            }
            other => panic!("Expected weight generation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_binary_is_a_generation_error() {
        let generator = EsmfCliGenerator::new("/nonexistent/ESMF_RegridWeightGen");
        let dir = tempfile::tempdir().unwrap();
        let grid = grid_with_corners();

        let result = generator.build_weights(&grid, &grid, Method::Bilinear, &dir.path().join("w.nc"));
        assert!(matches!(result, Err(RegridError::WeightGeneration { .. })));
    }
}
