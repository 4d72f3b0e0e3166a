//! Error types for the Potts engine.

use thiserror::Error;

use crate::automaton::voxel::Voxel;
use crate::automaton::CellId;

/// Errors surfaced by the engine and its life-cycle operations.
///
/// Flip rejections are not errors; they are reported as
/// [`Outcome`](crate::automaton::stepping::Outcome) values.
#[derive(Error, Debug)]
pub enum PottsError {
    /// Configuration validation errors
    #[error("configuration error: {0}")]
    Config(String),

    /// A voxel outside the lattice was passed to a life-cycle operation
    #[error("voxel {0} is outside the lattice")]
    OutOfBounds(Voxel),

    /// A voxel is already owned by another cell
    #[error("voxel {voxel} is already occupied by cell {id}")]
    Occupied { voxel: Voxel, id: CellId },

    /// Caller referenced a cell id the engine does not know
    #[error("no cell with id {0}")]
    UnknownCell(CellId),

    /// Division requested for a cell that cannot be cut into two non-empty halves
    #[error("cell {0} is too small to divide")]
    Indivisible(CellId),

    /// A persisted location projection could not be rebuilt
    #[error("invalid location container: {0}")]
    InvalidContainer(String),

    /// Engine invariant violated (lattice and locations disagree)
    #[error("internal invariant violated: {0}")]
    Internal(String),

    /// JSON (de)serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PottsError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        PottsError::Config(message.into())
    }

    /// Creates an internal invariant error.
    pub fn internal(message: impl Into<String>) -> Self {
        PottsError::Internal(message.into())
    }

    /// True for errors that indicate a defect in the engine rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, PottsError::Internal(_))
    }
}
