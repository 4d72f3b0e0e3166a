//! Lattice queries and stepping.

use log::error;

use super::Simulation;
use crate::automaton::region::NO_TAG;
use crate::automaton::{Voxel, MEDIUM};

/// Gets the cell id at a voxel (0 = medium).
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
///
/// # Returns
/// 0 if out of bounds, null pointer, or medium.
#[no_mangle]
pub unsafe extern "C" fn vp_get_id(ptr: *const Simulation, x: i32, y: i32, z: i32) -> u32 {
    if ptr.is_null() {
        return MEDIUM;
    }

    let sim = &*ptr;
    sim.potts.lattice().id(Voxel::new(x, y, z)).unwrap_or(MEDIUM)
}

/// Gets the region tag at a voxel (0 = none, negative = region code).
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
///
/// # Returns
/// 0 if out of bounds or null pointer.
#[no_mangle]
pub unsafe extern "C" fn vp_get_tag(ptr: *const Simulation, x: i32, y: i32, z: i32) -> i8 {
    if ptr.is_null() {
        return NO_TAG;
    }

    let sim = &*ptr;
    sim.potts.lattice().tag(Voxel::new(x, y, z)).unwrap_or(NO_TAG)
}

/// Advances the simulation by one tick.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
///
/// # Returns
/// Number of accepted flips, or -1 on null pointer or internal error.
#[no_mangle]
pub unsafe extern "C" fn vp_step(ptr: *mut Simulation) -> i64 {
    if ptr.is_null() {
        return -1;
    }

    let sim = &mut *ptr;
    match sim.potts.step(&mut sim.rng) {
        Ok(stats) => stats.accepted as i64,
        Err(e) => {
            error!("vp_step failed: {}", e);
            -1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::{cells, lifecycle};
    use std::ptr;

    #[test]
    fn test_new_lattice_is_medium() {
        unsafe {
            let sim = lifecycle::vp_create(4, 4, 4, 10.0, 3);
            for z in 0..4 {
                for y in 0..4 {
                    for x in 0..4 {
                        assert_eq!(vp_get_id(sim, x, y, z), 0);
                        assert_eq!(vp_get_tag(sim, x, y, z), 0);
                    }
                }
            }
            lifecycle::vp_destroy(sim);
        }
    }

    #[test]
    fn test_out_of_bounds_access() {
        unsafe {
            let sim = lifecycle::vp_create(4, 4, 1, 10.0, 3);
            assert_eq!(vp_get_id(sim, -1, 0, 0), 0);
            assert_eq!(vp_get_id(sim, 4, 0, 0), 0);
            assert_eq!(vp_get_tag(sim, 0, 0, 1), 0);
            lifecycle::vp_destroy(sim);
        }
    }

    #[test]
    fn test_step() {
        unsafe {
            let sim = lifecycle::vp_create(8, 8, 1, 10.0, 3);
            let voxels: Vec<i32> = (2..5)
                .flat_map(|x| (2..5).flat_map(move |y| [x, y, 0]))
                .collect();
            let id = cells::vp_add_cell(
                sim,
                voxels.as_ptr(),
                9,
                1,
                9.0,
                12.0,
                1.0,
                0.0,
                ptr::null(),
                0,
            );
            assert_eq!(id, 1);

            assert!(vp_step(sim) >= 0);
            assert!(vp_step(sim) >= 0);
            assert_eq!(lifecycle::vp_get_tick(sim), 2);

            lifecycle::vp_destroy(sim);
        }
    }

    #[test]
    fn test_null_pointer_handling() {
        unsafe {
            assert_eq!(vp_get_id(ptr::null(), 0, 0, 0), 0);
            assert_eq!(vp_get_tag(ptr::null(), 0, 0, 0), 0);
            assert_eq!(vp_step(ptr::null_mut()), -1);
        }
    }
}
