//! Window extraction FFI functions.

use super::Simulation;
use crate::automaton::{self, Voxel};

/// Number of values a caller buffer must hold for the box `[min, max)`.
fn window_len(min: Voxel, max: Voxel) -> usize {
    let width = (max.x - min.x).max(0) as usize;
    let height = (max.y - min.y).max(0) as usize;
    let depth = (max.z - min.z).max(0) as usize;
    width * height * depth
}

/// Extracts the cell ids of a rectangular box into a flat output buffer.
///
/// # Layout
/// The buffer is filled in z,y,x order (z changes slowest, x changes fastest).
/// The box is clamped to the lattice.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
/// - `out_buf` must point to a buffer with at least
///   `(max_x - min_x) * (max_y - min_y) * (max_z - min_z)` values
///
/// # Returns
/// Number of values written, or 0 on error.
#[no_mangle]
pub unsafe extern "C" fn vp_extract_ids(
    ptr: *const Simulation,
    out_buf: *mut u32,
    min_x: i32,
    min_y: i32,
    min_z: i32,
    max_x: i32,
    max_y: i32,
    max_z: i32,
) -> u64 {
    if ptr.is_null() || out_buf.is_null() {
        return 0;
    }

    let sim = &*ptr;
    let (min, max) = (Voxel::new(min_x, min_y, min_z), Voxel::new(max_x, max_y, max_z));
    let buf_slice = std::slice::from_raw_parts_mut(out_buf, window_len(min, max));
    automaton::extract_ids(sim.potts.lattice(), buf_slice, min, max)
}

/// Extracts the region tags of a rectangular box into a flat output buffer.
/// Same layout and clamping as `vp_extract_ids`.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
/// - `out_buf` must point to a buffer with at least
///   `(max_x - min_x) * (max_y - min_y) * (max_z - min_z)` values
///
/// # Returns
/// Number of values written, or 0 on error.
#[no_mangle]
pub unsafe extern "C" fn vp_extract_tags(
    ptr: *const Simulation,
    out_buf: *mut i8,
    min_x: i32,
    min_y: i32,
    min_z: i32,
    max_x: i32,
    max_y: i32,
    max_z: i32,
) -> u64 {
    if ptr.is_null() || out_buf.is_null() {
        return 0;
    }

    let sim = &*ptr;
    let (min, max) = (Voxel::new(min_x, min_y, min_z), Voxel::new(max_x, max_y, max_z));
    let buf_slice = std::slice::from_raw_parts_mut(out_buf, window_len(min, max));
    automaton::extract_tags(sim.potts.lattice(), buf_slice, min, max)
}
