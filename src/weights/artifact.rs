//! Weight file lifecycle.
//!
//! A weight file is identified only by its path. Whether an existing file is
//! reused is decided by the caller through `reuse_weights`; the file content
//! is never inspected to detect stale weights.
//!
//! ```text
//! Unresolved --(file exists, reuse)----------> Cached --load--> Ready { reused: true }
//! Unresolved --(file exists, no reuse: rm)---> Built  --load--> Ready { reused: false }
//! Unresolved --(no file)---------------------> Built
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{RegridError, Result};
use crate::grid::CanonicalGrid;
use crate::logging::log_timed_operation;
use crate::method::Method;
use crate::weights::{WeightCodec, WeightGenerator};

/// Where a weight file is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightState {
    /// Nothing decided yet
    Unresolved,
    /// An existing file will be reused
    Cached,
    /// The file was (re)generated
    Built,
    /// The operator has been loaded from the file
    Ready { reused: bool },
}

/// A weight file on disk and its lifecycle state
#[derive(Debug, Clone)]
pub struct WeightArtifact {
    path: PathBuf,
    state: WeightState,
}

impl WeightArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: WeightState::Unresolved,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> WeightState {
        self.state
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Make sure a weight file is present, reusing or regenerating it.
    ///
    /// Only acts in the `Unresolved` state; later calls return the current state.
    pub fn resolve<W>(
        &mut self,
        reuse_weights: bool,
        generator: &W,
        grid_in: &CanonicalGrid,
        grid_out: &CanonicalGrid,
        method: Method,
    ) -> Result<WeightState>
    where
        W: WeightGenerator + ?Sized,
    {
        if self.state != WeightState::Unresolved {
            return Ok(self.state);
        }

        if self.exists() {
            if reuse_weights {
                info!(path = %self.path.display(), "Reuse existing weight file");
                self.state = WeightState::Cached;
                return Ok(self.state);
            }
            warn!(
                path = %self.path.display(),
                "Overwrite existing weight file. Set reuse_weights to save computing time"
            );
            fs::remove_file(&self.path)?;
        } else {
            info!(path = %self.path.display(), "Create weight file");
        }

        self.generate(generator, grid_in, grid_out, method)?;
        self.state = WeightState::Built;
        Ok(self.state)
    }

    fn generate<W>(
        &self,
        generator: &W,
        grid_in: &CanonicalGrid,
        grid_out: &CanonicalGrid,
        method: Method,
    ) -> Result<()>
    where
        W: WeightGenerator + ?Sized,
    {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let handle = log_timed_operation("weight_generation", || {
            generator.build_weights(grid_in, grid_out, method, &self.path)
        })?;
        // only the file is kept, not whatever the generator held on to
        generator.release(handle)
    }

    /// Load the operator through the codec, moving to `Ready`
    pub fn load<C>(&mut self, codec: &C, n_in: usize, n_out: usize) -> Result<C::Operator>
    where
        C: WeightCodec + ?Sized,
    {
        let reused = match self.state {
            WeightState::Cached => true,
            WeightState::Built => false,
            WeightState::Ready { reused } => reused,
            WeightState::Unresolved => {
                return Err(RegridError::WeightFile {
                    path: self.path.clone(),
                    message: "weights must be resolved before loading".to_string(),
                })
            }
        };

        let operator =
            log_timed_operation("weight_load", || codec.load(&self.path, n_in, n_out))?;
        self.state = WeightState::Ready { reused };
        Ok(operator)
    }

    /// Remove the weight file from disk. Returns whether a file was removed.
    ///
    /// Operators already loaded from it are unaffected.
    pub fn discard(&self) -> Result<bool> {
        if self.exists() {
            info!(path = %self.path.display(), "Remove weight file");
            fs::remove_file(&self.path)?;
            Ok(true)
        } else {
            info!(path = %self.path.display(), "Weight file is already removed");
            Ok(false)
        }
    }
}
