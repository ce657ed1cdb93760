//! Collaborator doubles.
//!
//! The generator computes a nearest-center operator so regridded values can
//! be checked exactly, and writes it as a real ESMF weight file. Both doubles
//! count their calls.

use ndarray::{ArrayD, ArrayViewD};
use regrid::{
    CanonicalGrid, Method, NetcdfWeightCodec, RegridError, Result, SparseOperator, WeightCodec,
    WeightGenerator,
};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

/// Map every destination cell onto the source cell with the closest center
pub fn nearest_operator(grid_in: &CanonicalGrid, grid_out: &CanonicalGrid) -> SparseOperator {
    let lon_in = CanonicalGrid::fortran_values(grid_in.center_lon());
    let lat_in = CanonicalGrid::fortran_values(grid_in.center_lat());
    let lon_out = CanonicalGrid::fortran_values(grid_out.center_lon());
    let lat_out = CanonicalGrid::fortran_values(grid_out.center_lat());

    let cols: Vec<usize> = lon_out
        .iter()
        .zip(&lat_out)
        .map(|(x, y)| {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (k, (xi, yi)) in lon_in.iter().zip(&lat_in).enumerate() {
                let distance = (x - xi).powi(2) + (y - yi).powi(2);
                if distance < best_distance {
                    best = k;
                    best_distance = distance;
                }
            }
            best
        })
        .collect();
    let rows: Vec<usize> = (0..cols.len()).collect();
    let values = vec![1.0; cols.len()];

    SparseOperator::from_triplets(grid_out.size(), grid_in.size(), &rows, &cols, &values).unwrap()
}

/// Generator double writing nearest-center weights
#[derive(Debug, Default)]
pub struct NearestGenerator {
    pub builds: Cell<usize>,
    pub releases: Cell<usize>,
    pub last_method: Cell<Option<Method>>,
    pub last_source_periodic: Cell<Option<bool>>,
    pub last_destination_periodic: Cell<Option<bool>>,
    pub last_had_corners: Cell<Option<bool>>,
}

impl WeightGenerator for NearestGenerator {
    type Handle = usize;

    fn build_weights(
        &self,
        grid_in: &CanonicalGrid,
        grid_out: &CanonicalGrid,
        method: Method,
        destination: &Path,
    ) -> Result<usize> {
        self.builds.set(self.builds.get() + 1);
        self.last_method.set(Some(method));
        self.last_source_periodic.set(Some(grid_in.periodic()));
        self.last_destination_periodic.set(Some(grid_out.periodic()));
        self.last_had_corners
            .set(Some(grid_in.corners().is_some() && grid_out.corners().is_some()));

        NetcdfWeightCodec.save(destination, &nearest_operator(grid_in, grid_out))?;
        Ok(self.builds.get())
    }

    fn release(&self, _handle: usize) -> Result<()> {
        self.releases.set(self.releases.get() + 1);
        Ok(())
    }
}

/// Generator double that always fails
#[derive(Debug, Default)]
pub struct FailingGenerator;

impl WeightGenerator for FailingGenerator {
    type Handle = ();

    fn build_weights(
        &self,
        _grid_in: &CanonicalGrid,
        _grid_out: &CanonicalGrid,
        _method: Method,
        _destination: &Path,
    ) -> Result<()> {
        Err(RegridError::WeightGeneration {
            message: "generator unavailable".to_string(),
        })
    }

    fn release(&self, _handle: ()) -> Result<()> {
        Ok(())
    }
}

/// Shared call counters of a [`CountingCodec`], readable after the codec moved
#[derive(Debug, Clone, Default)]
pub struct CodecCalls {
    pub loads: Rc<Cell<usize>>,
    pub applies: Rc<Cell<usize>>,
}

/// NetCDF codec that counts its calls
#[derive(Debug, Default)]
pub struct CountingCodec {
    calls: CodecCalls,
}

impl CountingCodec {
    pub fn new() -> (Self, CodecCalls) {
        let codec = Self::default();
        let calls = codec.calls.clone();
        (codec, calls)
    }
}

impl WeightCodec for CountingCodec {
    type Operator = SparseOperator;

    fn load(&self, path: &Path, n_in: usize, n_out: usize) -> Result<SparseOperator> {
        self.calls.loads.set(self.calls.loads.get() + 1);
        NetcdfWeightCodec.load(path, n_in, n_out)
    }

    fn apply(
        &self,
        operator: &SparseOperator,
        data: ArrayViewD<'_, f64>,
        ny_out: usize,
        nx_out: usize,
    ) -> Result<ArrayD<f64>> {
        self.calls.applies.set(self.calls.applies.get() + 1);
        NetcdfWeightCodec.apply(operator, data, ny_out, nx_out)
    }
}
