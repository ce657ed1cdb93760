//! Configuration management for regrid.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RegridError, Result};
use crate::grid::CoordinateOverrides;
use crate::method::Method;
use crate::regridder::RegridderOptions;
use crate::weights::DEFAULT_ESMF_BINARY;

/// Command-line arguments for regrid
#[derive(Parser, Debug)]
#[command(name = "regrid")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// NetCDF file describing the source grid
    pub source_grid: PathBuf,

    /// NetCDF file describing the destination grid
    pub destination_grid: PathBuf,

    /// NetCDF file holding the field to regrid
    pub input: PathBuf,

    /// Name of the variable to regrid
    #[arg(long, env = "REGRID_VARIABLE")]
    pub variable: String,

    /// Output NetCDF file
    #[arg(short, long, env = "REGRID_OUTPUT", default_value = "regridded.nc")]
    pub output: PathBuf,

    /// Regridding method (bilinear, conservative, patch, nearest_s2d, nearest_d2s)
    #[arg(short, long, env = "REGRID_METHOD")]
    pub method: Option<String>,

    /// Treat the source grid as periodic in longitude
    #[arg(long, env = "REGRID_PERIODIC")]
    pub periodic: bool,

    /// Reuse an existing weight file
    #[arg(long, env = "REGRID_REUSE_WEIGHTS")]
    pub reuse_weights: bool,

    /// Directory weight files are stored in
    #[arg(long, env = "REGRID_WEIGHTS_DIR")]
    pub weights_dir: Option<PathBuf>,

    /// Weight file name, replacing the generated one
    #[arg(long, env = "REGRID_FILENAME")]
    pub filename: Option<PathBuf>,

    /// Path to the ESMF_RegridWeightGen executable
    #[arg(long, env = "REGRID_ESMF_BIN")]
    pub esmf_bin: Option<PathBuf>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "REGRID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "REGRID_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Remove the weight file once the output is written
    #[arg(long, env = "REGRID_CLEAN_WEIGHTS")]
    pub clean_weights: bool,
}

/// What a single CLI run reads and writes
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub source_grid: PathBuf,
    pub destination_grid: PathBuf,
    pub input: PathBuf,
    pub variable: String,
    pub output: PathBuf,
    pub clean_weights: bool,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Regridding method
    #[serde(default = "default_method")]
    pub method: String,

    /// Source grid is periodic in longitude
    #[serde(default)]
    pub periodic: bool,

    /// Reuse existing weight files
    #[serde(default)]
    pub reuse_weights: bool,

    /// Directory weight files are stored in
    #[serde(default = "default_weights_dir")]
    pub weights_dir: PathBuf,

    /// Weight file name override
    #[serde(default)]
    pub filename: Option<PathBuf>,

    /// Weight generator executable
    #[serde(default = "default_esmf_binary")]
    pub esmf_binary: PathBuf,

    /// Let the generator leave destination cells outside the source grid unmapped
    #[serde(default)]
    pub ignore_unmapped: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Coordinate names of the source grid
    #[serde(default)]
    pub source: CoordinateOverrides,

    /// Coordinate names of the destination grid
    #[serde(default)]
    pub destination: CoordinateOverrides,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Job)> {
        Self::from_args(Args::parse())
    }

    /// Layer parsed arguments over the JSON file (if any) and the defaults
    pub fn from_args(args: Args) -> Result<(Self, Job)> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(method) = args.method {
            config.method = method;
        }
        if args.periodic {
            config.periodic = true;
        }
        if args.reuse_weights {
            config.reuse_weights = true;
        }
        if let Some(dir) = args.weights_dir {
            config.weights_dir = dir;
        }
        if args.filename.is_some() {
            config.filename = args.filename;
        }
        if let Some(binary) = args.esmf_bin {
            config.esmf_binary = binary;
        }
        if let Some(level) = args.log_level {
            config.log_level = level;
        }

        let job = Job {
            source_grid: args.source_grid,
            destination_grid: args.destination_grid,
            input: args.input,
            variable: args.variable,
            output: args.output,
            clean_weights: args.clean_weights,
        };

        Ok((config, job))
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        *self = other;
    }

    /// Parsed regridding method
    pub fn method(&self) -> Result<Method> {
        self.method.parse().map_err(|_| RegridError::Config {
            message: format!(
                "Invalid regridding method: {}. Must be one of: {}",
                self.method,
                Method::ALL.map(|m| m.as_str()).join(", ")
            ),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.method()?;

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(RegridError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        if self.weights_dir.as_os_str().is_empty() {
            return Err(RegridError::Config {
                message: "Weights directory cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Options for building a regridder from this configuration
    pub fn regridder_options(&self) -> RegridderOptions {
        RegridderOptions {
            periodic: self.periodic,
            filename: self.filename.clone(),
            reuse_weights: self.reuse_weights,
            weights_dir: self.weights_dir.clone(),
            source_names: self.source.clone(),
            destination_names: self.destination.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            method: default_method(),
            periodic: false,
            reuse_weights: false,
            weights_dir: default_weights_dir(),
            filename: None,
            esmf_binary: default_esmf_binary(),
            ignore_unmapped: false,
            log_level: default_log_level(),
            source: CoordinateOverrides::default(),
            destination: CoordinateOverrides::default(),
        }
    }
}

// Default value functions for serde
fn default_method() -> String {
    Method::Bilinear.as_str().to_string()
}

fn default_weights_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_esmf_binary() -> PathBuf {
    PathBuf::from(DEFAULT_ESMF_BINARY)
}

fn default_log_level() -> String {
    "info".to_string()
}
