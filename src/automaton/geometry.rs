//! Lattice geometries and their direction tables.
//!
//! Everything geometry-specific (neighbor offsets, split planes, the
//! connectivity rule) is looked up through [`Geometry`] so that the
//! location, split and stepping code stay dimension-agnostic.

use serde::{Deserialize, Serialize};

/// Offset from a voxel to one of its neighbors.
pub type Offset = (i32, i32, i32);

const FACES_2D: [Offset; 4] = [(-1, 0, 0), (1, 0, 0), (0, -1, 0), (0, 1, 0)];

const FACES_3D: [Offset; 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, -1),
    (0, 0, 1),
];

const MOORE_2D: [Offset; 8] = [
    (-1, -1, 0),
    (0, -1, 0),
    (1, -1, 0),
    (-1, 0, 0),
    (1, 0, 0),
    (-1, 1, 0),
    (0, 1, 0),
    (1, 1, 0),
];

const MOORE_3D: [Offset; 26] = moore_3d();

const fn moore_3d() -> [Offset; 26] {
    let mut out = [(0, 0, 0); 26];
    let mut n = 0;
    let mut dz = -1;
    while dz <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dx = -1;
            while dx <= 1 {
                if !(dx == 0 && dy == 0 && dz == 0) {
                    out[n] = (dx, dy, dz);
                    n += 1;
                }
                dx += 1;
            }
            dy += 1;
        }
        dz += 1;
    }
    out
}

/// A plane through a location's centroid, used to cut it in two at division.
///
/// Voxels are classified by the sign of their projection onto `normal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitPlane {
    pub name: &'static str,
    pub normal: Offset,
}

const PLANES_2D: [SplitPlane; 4] = [
    SplitPlane { name: "yz", normal: (1, 0, 0) },
    SplitPlane { name: "zx", normal: (0, 1, 0) },
    SplitPlane { name: "positive-xy", normal: (1, -1, 0) },
    SplitPlane { name: "negative-xy", normal: (1, 1, 0) },
];

const PLANES_3D: [SplitPlane; 9] = [
    SplitPlane { name: "yz", normal: (1, 0, 0) },
    SplitPlane { name: "zx", normal: (0, 1, 0) },
    SplitPlane { name: "xy", normal: (0, 0, 1) },
    SplitPlane { name: "positive-xy", normal: (1, -1, 0) },
    SplitPlane { name: "negative-xy", normal: (1, 1, 0) },
    SplitPlane { name: "positive-yz", normal: (0, 1, -1) },
    SplitPlane { name: "negative-yz", normal: (0, 1, 1) },
    SplitPlane { name: "positive-zx", normal: (-1, 0, 1) },
    SplitPlane { name: "negative-zx", normal: (1, 0, 1) },
];

/// Lattice dimensionality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    /// Square lattice, 4 face neighbors, 8 Moore neighbors.
    Grid2D,
    /// Cubic lattice, 6 face neighbors, 26 Moore neighbors.
    Grid3D,
}

impl Geometry {
    /// Geometry implied by a lattice depth.
    pub fn for_depth(depth: i32) -> Self {
        if depth <= 1 {
            Geometry::Grid2D
        } else {
            Geometry::Grid3D
        }
    }

    /// Face-adjacent offsets (the adjacency used for connectivity and surface).
    #[inline]
    pub fn faces(self) -> &'static [Offset] {
        match self {
            Geometry::Grid2D => &FACES_2D,
            Geometry::Grid3D => &FACES_3D,
        }
    }

    /// Full Moore neighborhood (the adjacency used for adhesion).
    #[inline]
    pub fn moore(self) -> &'static [Offset] {
        match self {
            Geometry::Grid2D => &MOORE_2D,
            Geometry::Grid3D => &MOORE_3D,
        }
    }

    /// Candidate division planes.
    #[inline]
    pub fn split_planes(self) -> &'static [SplitPlane] {
        match self {
            Geometry::Grid2D => &PLANES_2D,
            Geometry::Grid3D => &PLANES_3D,
        }
    }

    #[inline]
    pub fn face_count(self) -> i64 {
        self.faces().len() as i64
    }
}
