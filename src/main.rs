//! regrid - regrid one variable of a NetCDF file onto another grid
//!
//! This is the main entry point for the regrid command-line tool.

use tracing::{error, info};

use regrid::data_loader::{load_dataset, load_labeled_array, write_labeled_array};
use regrid::{init_tracing, log_error, Config, EsmfCliGenerator, NetcdfWeightCodec, Regridder, Result};

fn main() -> Result<()> {
    // Load configuration
    let (config, job) = Config::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?;

    init_tracing(&config.log_level);
    info!("Starting regrid v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    let method = config.method()?;

    info!("Loading source grid: {:?}", job.source_grid);
    let source = load_dataset(&job.source_grid).map_err(|e| {
        log_error(&e, "loading source grid");
        e
    })?;

    info!("Loading destination grid: {:?}", job.destination_grid);
    let destination = load_dataset(&job.destination_grid).map_err(|e| {
        log_error(&e, "loading destination grid");
        e
    })?;

    let generator =
        EsmfCliGenerator::new(&config.esmf_binary).with_ignore_unmapped(config.ignore_unmapped);
    let regridder = Regridder::new(
        &source,
        &destination,
        method,
        config.regridder_options(),
        &generator,
        NetcdfWeightCodec,
    )
    .map_err(|e| {
        log_error(&e, "building regridder");
        e
    })?;
    info!("\n{}", regridder.describe());

    let input = load_labeled_array(&job.input, &job.variable).map_err(|e| {
        log_error(&e, "loading input variable");
        e
    })?;
    info!(
        "Regridding {} with shape {:?}",
        job.variable,
        input.shape()
    );

    let output = regridder.regrid_labeled(&input).map_err(|e| {
        log_error(&e, "regridding");
        e
    })?;

    write_labeled_array(&job.output, &output).map_err(|e| {
        log_error(&e, "writing output");
        e
    })?;

    if job.clean_weights {
        regridder.discard_cached_weights()?;
    }

    Ok(())
}
