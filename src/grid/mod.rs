//! Grid handling: coordinate name detection, mesh normalization and
//! conversion into the layout consumed by the weight generator.

pub mod builder;
pub mod locator;
pub mod mesh;

pub use builder::{build_grid, CanonicalGrid, CoordinateOverrides};
pub use locator::{locate_coordinates, CoordinateNames};
pub use mesh::{as_2d_mesh, Mesh};
