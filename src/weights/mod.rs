//! Interpolation weights.
//!
//! Weights are never derived here. Two collaborators do the work and are
//! modelled as traits so they can be swapped or faked:
//!
//! - a [`WeightGenerator`] turns two grids and a method into a weight file,
//! - a [`WeightCodec`] loads a weight file into an operator and applies it.
//!
//! [`artifact::WeightArtifact`] decides when the generator runs.

pub mod artifact;
#[cfg(feature = "netcdf")]
pub mod codec;
#[cfg(feature = "netcdf")]
pub mod esmf;
pub mod sparse;

use ndarray::{ArrayD, ArrayViewD};
use std::path::Path;

use crate::error::Result;
use crate::grid::CanonicalGrid;
use crate::method::Method;

pub use artifact::{WeightArtifact, WeightState};
#[cfg(feature = "netcdf")]
pub use codec::NetcdfWeightCodec;
#[cfg(feature = "netcdf")]
pub use esmf::EsmfCliGenerator;
pub use sparse::SparseOperator;

/// Default weight generator executable, looked up on `PATH`
pub const DEFAULT_ESMF_BINARY: &str = "ESMF_RegridWeightGen";

/// Produces weight files from a pair of grids
pub trait WeightGenerator {
    /// Transient resources held between generation and release
    type Handle;

    /// Compute the weights mapping `grid_in` onto `grid_out` and write them to `destination`
    fn build_weights(
        &self,
        grid_in: &CanonicalGrid,
        grid_out: &CanonicalGrid,
        method: Method,
        destination: &Path,
    ) -> Result<Self::Handle>;

    /// Free whatever the generation step left behind. The weight file stays.
    fn release(&self, handle: Self::Handle) -> Result<()>;
}

/// Reads weight files and applies the resulting operator
pub trait WeightCodec {
    /// In-memory form of a weight file
    type Operator;

    /// Load the operator stored at `path`, checking it maps `n_in` source
    /// cells onto `n_out` destination cells
    fn load(&self, path: &Path, n_in: usize, n_out: usize) -> Result<Self::Operator>;

    /// Apply the operator over the trailing two axes of `data`, returning an
    /// array whose trailing axes are `(ny_out, nx_out)`
    fn apply(
        &self,
        operator: &Self::Operator,
        data: ArrayViewD<'_, f64>,
        ny_out: usize,
        nx_out: usize,
    ) -> Result<ArrayD<f64>>;
}

/// Default weight file name: `{method}_{Ny_in}x{Nx_in}_{Ny_out}x{Nx_out}[_peri].nc`
pub fn default_filename(
    method: Method,
    shape_in: (usize, usize),
    shape_out: (usize, usize),
    periodic: bool,
) -> String {
    let mut filename = format!(
        "{}_{}x{}_{}x{}",
        method, shape_in.0, shape_in.1, shape_out.0, shape_out.1
    );
    if periodic {
        filename.push_str("_peri");
    }
    filename.push_str(".nc");
    filename
}
