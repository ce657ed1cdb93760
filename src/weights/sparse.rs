//! Compressed sparse row operator for applying weights.

use ndarray::{ArrayD, ArrayViewD, IxDyn};

use crate::error::{RegridError, Result};

/// Sparse linear map from `n_in` flattened source cells to `n_out`
/// flattened destination cells, stored row by row
#[derive(Debug, Clone, PartialEq)]
pub struct SparseOperator {
    n_out: usize,
    n_in: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseOperator {
    /// Build from zero-based `(row, col, value)` triplets.
    ///
    /// Duplicate entries are kept and contribute additively.
    pub fn from_triplets(
        n_out: usize,
        n_in: usize,
        rows: &[usize],
        cols: &[usize],
        values: &[f64],
    ) -> Result<Self> {
        if rows.len() != values.len() || cols.len() != values.len() {
            return Err(RegridError::shape_mismatch(
                "sparse triplets (rows, cols, values)",
                &[values.len(), values.len(), values.len()],
                &[rows.len(), cols.len(), values.len()],
            ));
        }
        if let Some(&row) = rows.iter().find(|&&r| r >= n_out) {
            return Err(RegridError::InvalidParameter {
                param: "row".to_string(),
                message: format!("index {} out of range for {} destination cells", row, n_out),
            });
        }
        if let Some(&col) = cols.iter().find(|&&c| c >= n_in) {
            return Err(RegridError::InvalidParameter {
                param: "col".to_string(),
                message: format!("index {} out of range for {} source cells", col, n_in),
            });
        }

        let mut indptr = vec![0usize; n_out + 1];
        for &row in rows {
            indptr[row + 1] += 1;
        }
        for k in 0..n_out {
            indptr[k + 1] += indptr[k];
        }

        let mut next = indptr.clone();
        let mut indices = vec![0usize; values.len()];
        let mut data = vec![0.0; values.len()];
        for ((&row, &col), &value) in rows.iter().zip(cols).zip(values) {
            let slot = next[row];
            indices[slot] = col;
            data[slot] = value;
            next[row] += 1;
        }

        Ok(Self {
            n_out,
            n_in,
            indptr,
            indices,
            values: data,
        })
    }

    /// `(n_out, n_in)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_out, self.n_in)
    }

    /// Number of stored weights
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored weights as zero-based `(row, col, value)` in row order
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.n_out).flat_map(move |row| {
            (self.indptr[row]..self.indptr[row + 1])
                .map(move |k| (row, self.indices[k], self.values[k]))
        })
    }

    /// `y = A x` for one flattened field
    pub fn matvec(&self, x: &[f64], y: &mut [f64]) {
        for (row, out) in y.iter_mut().enumerate().take(self.n_out) {
            let start = self.indptr[row];
            let end = self.indptr[row + 1];
            *out = self.indices[start..end]
                .iter()
                .zip(&self.values[start..end])
                .map(|(&col, &w)| w * x[col])
                .sum();
        }
    }

    /// Apply to every slice over the trailing two axes of `data`.
    ///
    /// Leading axes are carried through unchanged; the trailing two become
    /// `(ny_out, nx_out)`.
    pub fn apply(
        &self,
        data: ArrayViewD<'_, f64>,
        ny_out: usize,
        nx_out: usize,
    ) -> Result<ArrayD<f64>> {
        let shape = data.shape();
        if shape.len() < 2 {
            return Err(RegridError::shape_mismatch(
                "rank of regridded data",
                &[2],
                &[shape.len()],
            ));
        }
        let (leading, horizontal) = shape.split_at(shape.len() - 2);
        if horizontal[0] * horizontal[1] != self.n_in {
            return Err(RegridError::shape_mismatch(
                "source cell count",
                &[self.n_in],
                &[horizontal[0] * horizontal[1]],
            ));
        }
        if ny_out * nx_out != self.n_out {
            return Err(RegridError::shape_mismatch(
                "destination cell count",
                &[self.n_out],
                &[ny_out * nx_out],
            ));
        }

        let n_extra: usize = leading.iter().product();
        let input: Vec<f64> = data.iter().copied().collect();
        let mut output = vec![0.0; n_extra * self.n_out];
        if self.n_in > 0 && self.n_out > 0 {
            for (x, y) in input
                .chunks_exact(self.n_in)
                .zip(output.chunks_exact_mut(self.n_out))
            {
                self.matvec(x, y);
            }
        }

        let mut out_shape = leading.to_vec();
        out_shape.extend([ny_out, nx_out]);
        Ok(ArrayD::from_shape_vec(IxDyn(&out_shape), output)?)
    }
}
