//! # regrid
//!
//! Regrid geophysical fields between latitude/longitude meshes.
//!
//! A [`Regridder`] is built once for a source grid, a destination grid and a
//! [`Method`]. Building it locates the coordinates of both grids, converts
//! them to the layout the weight generator expects, and makes sure a weight
//! file exists on disk (generating it or reusing a cached one). The weights
//! are then loaded as a sparse operator and applied to any number of arrays
//! on the source grid.
//!
//! ## Architecture
//!
//! - **Grids**: coordinate lookup (COARDS and CF 1.6 names), mesh
//!   normalization and the generator-side [`CanonicalGrid`]
//! - **Weights**: the [`WeightGenerator`] and [`WeightCodec`] collaborators
//!   and the weight-file lifecycle
//! - **Regridder**: orchestration and application to arrays and labeled arrays
//!
//! With the `netcdf` feature (on by default), weight files use the ESMF
//! layout, generation runs `ESMF_RegridWeightGen`, and datasets can be read
//! from and written to NetCDF files.

pub mod config;
#[cfg(feature = "netcdf")]
pub mod data_loader;
pub mod dataset;
pub mod error;
pub mod grid;
pub mod labeled;
pub mod logging;
pub mod method;
pub mod regridder;
pub mod weights;

pub use config::Config;
pub use dataset::{AttributeValue, Dataset, GridDescription, Variable};
pub use error::{RegridError, Result};
pub use grid::{CanonicalGrid, CoordinateOverrides};
pub use labeled::{Coordinate, LabeledArray};
pub use logging::{init_tracing, log_error, log_timed_operation};
pub use method::Method;
pub use regridder::{Field, Regridder, RegridderOptions};
#[cfg(feature = "netcdf")]
pub use weights::{EsmfCliGenerator, NetcdfWeightCodec};
pub use weights::{SparseOperator, WeightCodec, WeightGenerator, WeightState};
