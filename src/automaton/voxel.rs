//! Lattice coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An integer lattice coordinate.
///
/// Ordering is lexicographic on (x, y, z) and is the canonical iteration
/// order for every voxel set in the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Voxel {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Voxel {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Voxel { x, y, z }
    }

    /// Voxel displaced by an offset.
    #[inline]
    pub fn offset(self, (dx, dy, dz): (i32, i32, i32)) -> Voxel {
        Voxel::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Dot product of `self - origin` with a direction vector.
    #[inline]
    pub fn project(self, origin: Voxel, (nx, ny, nz): (i32, i32, i32)) -> i64 {
        (self.x - origin.x) as i64 * nx as i64
            + (self.y - origin.y) as i64 * ny as i64
            + (self.z - origin.z) as i64 * nz as i64
    }

    /// Squared euclidean distance.
    #[inline]
    pub fn distance_sq(self, other: Voxel) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }
}

impl fmt::Display for Voxel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
