//! Voxel Potts - Cellular Potts Model engine
//!
//! Cells compete for the voxels of a 2-D or 3-D lattice. Each tick the
//! Metropolis stepper proposes voxel flips between neighboring cells and
//! accepts them by energy, while a local connectivity test keeps every cell
//! in one piece. Cells divide by splitting their location in two.
//!
//! The library is usable from Rust through [`Potts`] and from C through the
//! `vp_*` functions in [`ffi`].

pub mod automaton;
pub mod config;
pub mod error;
pub mod ffi;
pub mod state;

pub use automaton::{
    CellId, CellParams, Geometry, Location, LocationContainer, Outcome, Potts, PottsCell, Region,
    RegionParams, StepStats, Voxel, MEDIUM,
};
pub use config::PottsConfig;
pub use error::PottsError;
pub use state::Lattice;

#[cfg(test)]
mod tests;
