//! ESMF weight files.
//!
//! The files written by `ESMF_RegridWeightGen` store the operator as
//! coordinate triplets: `S` (weights), `row` (destination index) and `col`
//! (source index), both indices one-based. The `n_a` and `n_b` dimensions,
//! when present, hold the source and destination cell counts.

use ndarray::{ArrayD, ArrayViewD};
use std::path::Path;
use tracing::debug;

use crate::error::{RegridError, Result};
use crate::weights::sparse::SparseOperator;
use crate::weights::WeightCodec;

/// Reads and writes ESMF-format weight files
#[derive(Debug, Clone, Copy, Default)]
pub struct NetcdfWeightCodec;

impl NetcdfWeightCodec {
    /// Write an operator in the ESMF layout
    pub fn save(&self, path: &Path, operator: &SparseOperator) -> Result<()> {
        let (n_out, n_in) = operator.shape();
        let mut rows = Vec::with_capacity(operator.nnz());
        let mut cols = Vec::with_capacity(operator.nnz());
        let mut weights = Vec::with_capacity(operator.nnz());
        for (row, col, weight) in operator.triplets() {
            rows.push(to_one_based(row, path)?);
            cols.push(to_one_based(col, path)?);
            weights.push(weight);
        }

        let mut file = netcdf::create(path)?;
        file.add_dimension("n_a", n_in)?;
        file.add_dimension("n_b", n_out)?;
        file.add_dimension("n_s", operator.nnz())?;
        file.add_attribute("title", "regrid weights")?;

        {
            let mut var = file.add_variable::<f64>("S", &["n_s"])?;
            var.put_values(&weights, ..)?;
        }
        {
            let mut var = file.add_variable::<i32>("row", &["n_s"])?;
            var.put_values(&rows, ..)?;
        }
        {
            let mut var = file.add_variable::<i32>("col", &["n_s"])?;
            var.put_values(&cols, ..)?;
        }

        Ok(())
    }
}

impl WeightCodec for NetcdfWeightCodec {
    type Operator = SparseOperator;

    fn load(&self, path: &Path, n_in: usize, n_out: usize) -> Result<SparseOperator> {
        if !path.exists() {
            return Err(RegridError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Weight file not found: {}", path.display()),
            )));
        }

        let file = netcdf::open(path)?;

        for (dim, expected) in [("n_a", n_in), ("n_b", n_out)] {
            if let Some(found) = file.dimension(dim).map(|d| d.len()) {
                if found != expected {
                    return Err(RegridError::WeightFile {
                        path: path.to_path_buf(),
                        message: format!(
                            "dimension {} is {}, expected {} for these grids",
                            dim, found, expected
                        ),
                    });
                }
            }
        }

        let weights: Vec<f64> = variable(&file, "S", path)?.get_values::<f64, _>(..)?;
        let rows: Vec<i64> = variable(&file, "row", path)?.get_values::<i64, _>(..)?;
        let cols: Vec<i64> = variable(&file, "col", path)?.get_values::<i64, _>(..)?;
        let rows = to_zero_based(rows, "row", path)?;
        let cols = to_zero_based(cols, "col", path)?;

        debug!(
            path = %path.display(),
            nnz = weights.len(),
            n_in = n_in,
            n_out = n_out,
            "Read weight triplets"
        );

        SparseOperator::from_triplets(n_out, n_in, &rows, &cols, &weights).map_err(|e| {
            RegridError::WeightFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })
    }

    fn apply(
        &self,
        operator: &SparseOperator,
        data: ArrayViewD<'_, f64>,
        ny_out: usize,
        nx_out: usize,
    ) -> Result<ArrayD<f64>> {
        operator.apply(data, ny_out, nx_out)
    }
}

fn variable<'f>(file: &'f netcdf::File, name: &str, path: &Path) -> Result<netcdf::Variable<'f>> {
    file.variable(name).ok_or_else(|| RegridError::WeightFile {
        path: path.to_path_buf(),
        message: format!("missing variable {}", name),
    })
}

fn to_zero_based(indices: Vec<i64>, name: &str, path: &Path) -> Result<Vec<usize>> {
    indices
        .into_iter()
        .map(|i| {
            i.checked_sub(1)
                .and_then(|zero_based| usize::try_from(zero_based).ok())
                .ok_or_else(|| RegridError::WeightFile {
                    path: path.to_path_buf(),
                    message: format!("{} index {} is not one-based", name, i),
                })
        })
        .collect()
}

fn to_one_based(index: usize, path: &Path) -> Result<i32> {
    i32::try_from(index + 1).map_err(|_| RegridError::WeightFile {
        path: path.to_path_buf(),
        message: format!("index {} does not fit a 32-bit weight file", index),
    })
}
