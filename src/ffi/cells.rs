//! Cell placement, division, removal and per-cell queries.

use log::error;

use super::Simulation;
use crate::automaton::{CellParams, Voxel};

/// Places a new cell over a list of voxels.
///
/// # Layout
/// `voxels` holds `count` (x, y, z) triples, so `3 * count` values.
/// `adhesion` holds `adhesion_len` contact energies indexed by population
/// id, entry 0 being the medium. It may be null when `adhesion_len` is 0.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
/// - `voxels` must point to at least `3 * count` values
/// - `adhesion` must point to at least `adhesion_len` values, or be null
///
/// # Returns
/// The new cell id, or 0 on error (null pointer, voxel out of bounds or
/// already occupied).
#[no_mangle]
pub unsafe extern "C" fn vp_add_cell(
    ptr: *mut Simulation,
    voxels: *const i32,
    count: usize,
    population: u32,
    target_volume: f64,
    target_surface: f64,
    lambda_volume: f64,
    lambda_surface: f64,
    adhesion: *const f64,
    adhesion_len: usize,
) -> u32 {
    if ptr.is_null() || voxels.is_null() {
        return 0;
    }
    if adhesion.is_null() && adhesion_len > 0 {
        return 0;
    }

    let sim = &mut *ptr;
    let coords = std::slice::from_raw_parts(voxels, count * 3);
    let adhesion = if adhesion_len == 0 {
        Vec::new()
    } else {
        std::slice::from_raw_parts(adhesion, adhesion_len).to_vec()
    };

    let params = CellParams::new(population as usize, target_volume, target_surface)
        .with_lambdas(lambda_volume, lambda_surface)
        .with_adhesion(adhesion);
    let voxels = coords.chunks_exact(3).map(|c| Voxel::new(c[0], c[1], c[2]));

    match sim.potts.add_cell(params, voxels) {
        Ok(id) => id,
        Err(e) => {
            error!("vp_add_cell failed: {}", e);
            0
        }
    }
}

/// Gets the volume of a cell.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
///
/// # Returns
/// The volume, or -1 for a null pointer or unknown cell.
#[no_mangle]
pub unsafe extern "C" fn vp_cell_volume(ptr: *const Simulation, id: u32) -> i64 {
    if ptr.is_null() {
        return -1;
    }
    (*ptr).potts.cell(id).map_or(-1, |c| c.location.volume())
}

/// Gets the surface of a cell.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
///
/// # Returns
/// The surface, or -1 for a null pointer or unknown cell.
#[no_mangle]
pub unsafe extern "C" fn vp_cell_surface(ptr: *const Simulation, id: u32) -> i64 {
    if ptr.is_null() {
        return -1;
    }
    (*ptr).potts.cell(id).map_or(-1, |c| c.location.surface())
}

/// Replaces a cell's target volume and surface.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
///
/// # Returns
/// 0 on success, 1 on failure (null pointer or unknown cell).
#[no_mangle]
pub unsafe extern "C" fn vp_set_targets(
    ptr: *mut Simulation,
    id: u32,
    target_volume: f64,
    target_surface: f64,
) -> i32 {
    if ptr.is_null() {
        return 1;
    }

    let sim = &mut *ptr;
    match sim.potts.set_targets(id, target_volume, target_surface) {
        Ok(()) => 0,
        Err(e) => {
            error!("vp_set_targets failed: {}", e);
            1
        }
    }
}

/// Divides a cell, drawing from the simulation's generator.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
///
/// # Returns
/// The daughter cell id, or 0 on error (null pointer, unknown cell, or a
/// cell too small to divide).
#[no_mangle]
pub unsafe extern "C" fn vp_divide(ptr: *mut Simulation, id: u32) -> u32 {
    if ptr.is_null() {
        return 0;
    }

    let sim = &mut *ptr;
    match sim.potts.divide(id, &mut sim.rng) {
        Ok(daughter) => daughter,
        Err(e) => {
            error!("vp_divide failed: {}", e);
            0
        }
    }
}

/// Removes a cell; its voxels return to the medium.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
///
/// # Returns
/// 0 on success, 1 on failure (null pointer or unknown cell).
#[no_mangle]
pub unsafe extern "C" fn vp_remove_cell(ptr: *mut Simulation, id: u32) -> i32 {
    if ptr.is_null() {
        return 1;
    }

    let sim = &mut *ptr;
    match sim.potts.remove_cell(id) {
        Ok(_) => 0,
        Err(e) => {
            error!("vp_remove_cell failed: {}", e);
            1
        }
    }
}
