//! Core Potts model logic.
//!
//! This module contains the lattice geometry, cell locations, the energy
//! model, the connectivity test and the Metropolis stepper.
//! The FFI layer in `ffi/` calls into [`potts::Potts`].

pub mod cell;
pub mod connectivity;
pub mod geometry;
pub mod grid;
pub mod hamiltonian;
pub mod location;
pub mod potts;
pub mod region;
pub mod split;
pub mod stepping;
pub mod voxel;

/// Cell identifier on the lattice.
pub type CellId = u32;

/// Identifier of the medium (background) label.
pub const MEDIUM: CellId = 0;

pub use cell::{CellParams, PottsCell, RegionParams};
pub use geometry::Geometry;
pub use grid::{extract_ids, extract_tags};
pub use hamiltonian::CellTable;
pub use location::{Location, LocationContainer};
pub use potts::Potts;
pub use region::Region;
pub use stepping::{metropolis, Outcome, StepStats};
pub use voxel::Voxel;
