//! The regridder: built once per (source grid, destination grid, method),
//! then applied to any number of arrays on the source grid.

use ndarray::{ArrayD, ArrayViewD};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::dataset::{AttributeValue, Dataset, GridDescription};
use crate::error::{RegridError, Result};
use crate::grid::{build_grid, CanonicalGrid, CoordinateNames, CoordinateOverrides};
use crate::labeled::{Coordinate, LabeledArray};
use crate::method::Method;
use crate::weights::{default_filename, WeightArtifact, WeightCodec, WeightGenerator, WeightState};

/// Dimension names used for 2-D destination coordinates without native names
pub const DEFAULT_HORIZONTAL_DIMS: (&str, &str) = ("y", "x");

/// Attribute recording the method on regridded labeled arrays
pub const REGRID_METHOD_ATTR: &str = "regrid_method";

/// Construction options of a [`Regridder`]
#[derive(Debug, Clone, PartialEq)]
pub struct RegridderOptions {
    /// Longitude of the source grid wraps around. Ignored for conservative regridding.
    pub periodic: bool,
    /// Weight file name, replacing the default `{method}_{Ny_in}x{Nx_in}_{Ny_out}x{Nx_out}[_peri].nc`
    pub filename: Option<PathBuf>,
    /// Reuse an existing weight file instead of regenerating it
    pub reuse_weights: bool,
    /// Directory weight files are stored in
    pub weights_dir: PathBuf,
    /// Coordinate names of the source grid
    pub source_names: CoordinateOverrides,
    /// Coordinate names of the destination grid
    pub destination_names: CoordinateOverrides,
}

impl Default for RegridderOptions {
    fn default() -> Self {
        Self {
            periodic: false,
            filename: None,
            reuse_weights: false,
            weights_dir: PathBuf::from("."),
            source_names: CoordinateOverrides::default(),
            destination_names: CoordinateOverrides::default(),
        }
    }
}

impl RegridderOptions {
    pub fn with_periodic(mut self, periodic: bool) -> Self {
        self.periodic = periodic;
        self
    }

    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_reuse_weights(mut self, reuse: bool) -> Self {
        self.reuse_weights = reuse;
        self
    }

    pub fn with_weights_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.weights_dir = dir.into();
        self
    }

    pub fn with_source_names(mut self, names: CoordinateOverrides) -> Self {
        self.source_names = names;
        self
    }

    pub fn with_destination_names(mut self, names: CoordinateOverrides) -> Self {
        self.destination_names = names;
        self
    }
}

/// Anything the regridder can be asked to regrid
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Bare numeric array
    Array(ArrayD<f64>),
    /// Array with named dimensions and coordinates
    Labeled(LabeledArray),
    /// Multi-variable dataset, not supported
    Dataset(Dataset),
}

impl Field {
    pub fn kind(&self) -> &'static str {
        match self {
            Field::Array(_) => "array",
            Field::Labeled(_) => "labeled array",
            Field::Dataset(_) => "dataset",
        }
    }

    pub fn into_array(self) -> Result<ArrayD<f64>> {
        match self {
            Field::Array(array) => Ok(array),
            other => Err(RegridError::UnsupportedInputType {
                kind: format!("expected an array, found a {}", other.kind()),
            }),
        }
    }

    pub fn into_labeled(self) -> Result<LabeledArray> {
        match self {
            Field::Labeled(array) => Ok(array),
            other => Err(RegridError::UnsupportedInputType {
                kind: format!("expected a labeled array, found a {}", other.kind()),
            }),
        }
    }
}

impl From<ArrayD<f64>> for Field {
    fn from(array: ArrayD<f64>) -> Self {
        Field::Array(array)
    }
}

impl From<LabeledArray> for Field {
    fn from(array: LabeledArray) -> Self {
        Field::Labeled(array)
    }
}

impl From<Dataset> for Field {
    fn from(dataset: Dataset) -> Self {
        Field::Dataset(dataset)
    }
}

/// Dimension names attached to the destination coordinates on output
#[derive(Debug, Clone, PartialEq, Eq)]
struct HorizontalDims {
    lon: Vec<String>,
    lat: Vec<String>,
    /// (row, column) dimensions of regridded data
    horizontal: (String, String),
}

impl HorizontalDims {
    fn resolve<G>(grid: &G, names: &CoordinateNames, lon_ndim: usize) -> Self
    where
        G: GridDescription + ?Sized,
    {
        if lon_ndim == 2 {
            let dims = match grid.dims(&names.lon) {
                Some(dims) if dims.len() == 2 => dims.to_vec(),
                _ => vec![
                    DEFAULT_HORIZONTAL_DIMS.0.to_string(),
                    DEFAULT_HORIZONTAL_DIMS.1.to_string(),
                ],
            };
            Self {
                horizontal: (dims[0].clone(), dims[1].clone()),
                lon: dims.clone(),
                lat: dims,
            }
        } else {
            let native = |name: &str| match grid.dims(name) {
                Some(dims) if dims.len() == 1 => dims[0].clone(),
                _ => name.to_string(),
            };
            let lon = native(&names.lon);
            let lat = native(&names.lat);
            Self {
                horizontal: (lat.clone(), lon.clone()),
                lon: vec![lon],
                lat: vec![lat],
            }
        }
    }
}

/// Regrids arrays from a source grid onto a destination grid.
///
/// Construction resolves coordinates, builds both grids, obtains the weight
/// file (reusing or generating it) and loads the operator. The regridder owns
/// its grids and operator; only the weight file on disk can change afterwards,
/// through [`Regridder::discard_cached_weights`].
pub struct Regridder<C: WeightCodec> {
    method: Method,
    periodic: bool,
    need_bounds: bool,
    reuse_weights: bool,
    names_in: CoordinateOverrides,
    names_out: CoordinateOverrides,
    coords_out: CoordinateNames,
    grid_in: CanonicalGrid,
    grid_out: CanonicalGrid,
    shape_in: (usize, usize),
    shape_out: (usize, usize),
    lon_out: ArrayD<f64>,
    lat_out: ArrayD<f64>,
    dims_out: HorizontalDims,
    artifact: WeightArtifact,
    codec: C,
    operator: C::Operator,
}

impl<C: WeightCodec> Regridder<C> {
    /// Build a regridder, generating or reusing the weight file.
    pub fn new<S, D, W>(
        source: &S,
        destination: &D,
        method: Method,
        options: RegridderOptions,
        generator: &W,
        codec: C,
    ) -> Result<Self>
    where
        S: GridDescription + ?Sized,
        D: GridDescription + ?Sized,
        W: WeightGenerator + ?Sized,
    {
        let need_bounds = method.needs_bounds();
        let periodic = options.periodic && method.allows_periodic();
        if options.periodic && !periodic {
            debug!(method = %method, "Periodic longitude is not supported, building a regional grid");
        }

        let names_in = resolve_names(source, &options.source_names, need_bounds)?;
        let names_out = resolve_names(destination, &options.destination_names, need_bounds)?;

        let (grid_in, shape_in) = build_grid(source, need_bounds, &names_in, periodic)?;
        let (grid_out, shape_out) = build_grid(destination, need_bounds, &names_out, false)?;

        let coords_out = names_out.resolve_centers(destination)?;
        let lon_out = destination.values_checked(&coords_out.lon)?.to_owned();
        let lat_out = destination.values_checked(&coords_out.lat)?.to_owned();
        let dims_out = HorizontalDims::resolve(destination, &coords_out, lon_out.ndim());

        let filename = options
            .filename
            .clone()
            .unwrap_or_else(|| default_filename(method, shape_in, shape_out, periodic).into());
        let mut artifact = WeightArtifact::new(options.weights_dir.join(filename));

        artifact.resolve(options.reuse_weights, generator, &grid_in, &grid_out, method)?;
        let operator = artifact.load(&codec, grid_in.size(), grid_out.size())?;

        info!(
            method = %method,
            shape_in = ?shape_in,
            shape_out = ?shape_out,
            weights = %artifact.path().display(),
            "Regridder ready"
        );

        Ok(Self {
            method,
            periodic,
            need_bounds,
            reuse_weights: options.reuse_weights,
            names_in,
            names_out,
            coords_out,
            grid_in,
            grid_out,
            shape_in,
            shape_out,
            lon_out,
            lat_out,
            dims_out,
            artifact,
            codec,
            operator,
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Whether the source grid was built periodic
    pub fn periodic(&self) -> bool {
        self.periodic
    }

    pub fn need_bounds(&self) -> bool {
        self.need_bounds
    }

    pub fn reuse_weights(&self) -> bool {
        self.reuse_weights
    }

    /// Source cell shape `(Ny_in, Nx_in)`
    pub fn shape_in(&self) -> (usize, usize) {
        self.shape_in
    }

    /// Destination cell shape `(Ny_out, Nx_out)`
    pub fn shape_out(&self) -> (usize, usize) {
        self.shape_out
    }

    /// Resolved coordinate names of the source grid
    pub fn source_names(&self) -> &CoordinateOverrides {
        &self.names_in
    }

    /// Resolved coordinate names of the destination grid
    pub fn destination_names(&self) -> &CoordinateOverrides {
        &self.names_out
    }

    /// `(row, column)` dimension names of regridded labeled arrays
    pub fn horizontal_dims(&self) -> (&str, &str) {
        (&self.dims_out.horizontal.0, &self.dims_out.horizontal.1)
    }

    pub fn grid_in(&self) -> &CanonicalGrid {
        &self.grid_in
    }

    pub fn grid_out(&self) -> &CanonicalGrid {
        &self.grid_out
    }

    pub fn weight_path(&self) -> &Path {
        self.artifact.path()
    }

    pub fn weight_state(&self) -> WeightState {
        self.artifact.state()
    }

    /// Regrid an array, labeled array or dataset.
    ///
    /// The result has the same kind as the input. Datasets are rejected.
    pub fn apply(&self, input: impl Into<Field>) -> Result<Field> {
        match input.into() {
            Field::Array(array) => self.regrid_array(array.view()).map(Field::Array),
            Field::Labeled(array) => self.regrid_labeled(&array).map(Field::Labeled),
            Field::Dataset(dataset) => self.regrid_dataset(&dataset).map(Field::Dataset),
        }
    }

    /// Regrid a bare array whose trailing two axes are `(Ny_in, Nx_in)`.
    ///
    /// Leading axes keep their extents and order.
    pub fn regrid_array(&self, data: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>> {
        let shape = data.shape();
        let horizontal = &shape[shape.len().saturating_sub(2)..];
        if horizontal != [self.shape_in.0, self.shape_in.1] {
            return Err(RegridError::shape_mismatch(
                "horizontal shape of input data",
                &[self.shape_in.0, self.shape_in.1],
                horizontal,
            ));
        }

        self.codec
            .apply(&self.operator, data, self.shape_out.0, self.shape_out.1)
    }

    /// Regrid a labeled array, carrying its metadata over.
    ///
    /// Leading dimensions keep their names and coordinates. The horizontal
    /// dimensions and coordinates are those of the destination grid, and the
    /// method is recorded in the `regrid_method` attribute.
    pub fn regrid_labeled(&self, input: &LabeledArray) -> Result<LabeledArray> {
        if input.dims.len() != input.data.ndim() {
            return Err(RegridError::shape_mismatch(
                "dimension names of labeled array",
                &[input.data.ndim()],
                &[input.dims.len()],
            ));
        }
        let data = self.regrid_array(input.data.view())?;

        let extra_dims = &input.dims[..input.dims.len() - 2];
        let mut dims = extra_dims.to_vec();
        dims.push(self.dims_out.horizontal.0.clone());
        dims.push(self.dims_out.horizontal.1.clone());

        let mut output = LabeledArray::new(data, dims)?;
        output.name = input.name.clone();

        for (name, coord) in &input.coords {
            if !coord.dims.is_empty() && coord.dims.iter().all(|d| extra_dims.contains(d)) {
                output.coords.insert(name.clone(), coord.clone());
            }
        }
        output.coords.insert(
            self.coords_out.lon.clone(),
            Coordinate::new(self.dims_out.lon.clone(), self.lon_out.clone()),
        );
        output.coords.insert(
            self.coords_out.lat.clone(),
            Coordinate::new(self.dims_out.lat.clone(), self.lat_out.clone()),
        );

        output.attrs.insert(
            REGRID_METHOD_ATTR.to_string(),
            AttributeValue::Text(self.method.to_string()),
        );

        Ok(output)
    }

    /// Dataset-level regridding is not supported; regrid one variable at a time.
    pub fn regrid_dataset(&self, _dataset: &Dataset) -> Result<Dataset> {
        Err(RegridError::NotImplemented {
            feature: "regridding a whole dataset, regrid its variables one at a time".to_string(),
        })
    }

    /// Remove the weight file from disk. Returns whether a file was removed.
    ///
    /// The loaded operator stays usable.
    pub fn discard_cached_weights(&self) -> Result<bool> {
        self.artifact.discard()
    }

    /// Human-readable summary
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl<C: WeightCodec> fmt::Display for Regridder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Regridder")?;
        writeln!(f, "Regridding algorithm:       {}", self.method)?;
        writeln!(f, "Weight filename:            {}", self.artifact.path().display())?;
        writeln!(f, "Reuse pre-computed weights? {}", self.reuse_weights)?;
        writeln!(f, "Input grid shape:           {:?}", self.shape_in)?;
        writeln!(f, "Output grid shape:          {:?}", self.shape_out)?;
        writeln!(
            f,
            "Output grid dimension name: {:?}",
            (&self.dims_out.horizontal.0, &self.dims_out.horizontal.1)
        )?;
        write!(f, "Periodic in longitude?      {}", self.periodic)
    }
}

/// Fill in every coordinate name the grid will need
fn resolve_names<G>(
    grid: &G,
    overrides: &CoordinateOverrides,
    need_bounds: bool,
) -> Result<CoordinateOverrides>
where
    G: GridDescription + ?Sized,
{
    let centers = overrides.resolve_centers(grid)?;
    let mut resolved = CoordinateOverrides {
        lat: Some(centers.lat),
        lon: Some(centers.lon),
        lat_b: None,
        lon_b: None,
    };
    if need_bounds {
        let bounds = overrides.resolve_bounds(grid)?;
        resolved.lat_b = Some(bounds.lat);
        resolved.lon_b = Some(bounds.lon);
    }
    Ok(resolved)
}
