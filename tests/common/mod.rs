//! Common test utilities for regrid.
//!
//! This module provides shared utilities for the integration tests: grid
//! fixtures, collaborator doubles and float assertions.

#![allow(dead_code)]

pub mod assertions;
pub mod fakes;
pub mod test_data;
