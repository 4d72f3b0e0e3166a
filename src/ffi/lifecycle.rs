//! Simulation creation, destruction, and tick queries.

use log::error;

use super::Simulation;
use crate::automaton::Potts;
use crate::config::PottsConfig;

/// Creates a new simulation with an all-medium lattice.
///
/// A depth of 1 gives a 2-D lattice. The generator is seeded from `seed`.
///
/// # Returns
/// A pointer to a new Simulation, or null if the parameters are invalid.
///
/// # Safety
/// The returned pointer must eventually be freed with `vp_destroy()`.
#[no_mangle]
pub extern "C" fn vp_create(
    width: i32,
    height: i32,
    depth: i32,
    temperature: f64,
    seed: u64,
) -> *mut Simulation {
    let config = PottsConfig {
        temperature,
        seed,
        ..PottsConfig::new(width, height, depth)
    };
    let rng = config.rng();

    match Potts::new(config) {
        Ok(potts) => Box::into_raw(Box::new(Simulation { potts, rng })),
        Err(e) => {
            error!("vp_create failed: {}", e);
            std::ptr::null_mut()
        }
    }
}

/// Destroys a simulation and frees its memory.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by `vp_create()`, or null
/// - `ptr` must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn vp_destroy(ptr: *mut Simulation) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

/// Gets the number of completed ticks.
///
/// # Safety
/// - `ptr` must be a valid pointer to a Simulation, or null
///
/// # Returns
/// The tick counter, or 0 if ptr is null.
#[no_mangle]
pub unsafe extern "C" fn vp_get_tick(ptr: *const Simulation) -> u64 {
    if ptr.is_null() {
        return 0;
    }
    (*ptr).potts.tick()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_create_and_destroy() {
        unsafe {
            let sim = vp_create(8, 8, 1, 10.0, 1);
            assert!(!sim.is_null());

            // Should not crash
            vp_destroy(sim);
        }
    }

    #[test]
    fn test_initial_tick() {
        unsafe {
            let sim = vp_create(4, 4, 4, 10.0, 1);
            assert_eq!(vp_get_tick(sim), 0);
            vp_destroy(sim);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(vp_create(0, 4, 1, 10.0, 1).is_null());
        assert!(vp_create(4, 4, 1, -1.0, 1).is_null());
        assert!(vp_create(4, 4, 1, f64::NAN, 1).is_null());
    }

    #[test]
    fn test_destroy_null() {
        unsafe {
            // Should not crash
            vp_destroy(ptr::null_mut());
            assert_eq!(vp_get_tick(ptr::null()), 0);
        }
    }
}
