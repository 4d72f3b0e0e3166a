//! C FFI layer.
//!
//! This module exports C ABI functions (`vp_*`) over an opaque
//! [`Simulation`] handle. All functions are marked with `#[no_mangle]` and
//! use `extern "C"`.
//!
//! The actual logic is in the `automaton` module. These functions are thin
//! wrappers that handle null checks, pointer safety and C-to-Rust
//! conversions. Errors are logged and mapped to sentinel return values.

use rand_chacha::ChaCha8Rng;

use crate::automaton::Potts;

pub mod cells;
pub mod grid;
pub mod lifecycle;
pub mod region;

/// Opaque handle: the engine plus the generator shared by all its ticks.
pub struct Simulation {
    pub(crate) potts: Potts,
    pub(crate) rng: ChaCha8Rng,
}

pub use cells::{
    vp_add_cell, vp_cell_surface, vp_cell_volume, vp_divide, vp_remove_cell, vp_set_targets,
};
pub use grid::{vp_get_id, vp_get_tag, vp_step};
pub use lifecycle::{vp_create, vp_destroy, vp_get_tick};
pub use region::{vp_extract_ids, vp_extract_tags};
