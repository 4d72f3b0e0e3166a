//! Lattice state store.
//!
//! Two parallel flat arrays over the bounding box: the owning cell id of
//! every voxel (0 = medium) and its region tag (0 = none). Both use the
//! same z/y/x row-major layout.

use crate::automaton::geometry::Geometry;
use crate::automaton::voxel::Voxel;
use crate::automaton::{CellId, MEDIUM};

/// The shared lattice. Owned by the engine; cells never hold a copy.
#[derive(Clone, Debug, PartialEq)]
pub struct Lattice {
    pub width: i32,
    pub height: i32,
    pub depth: i32,
    ids: Vec<CellId>,
    tags: Vec<i8>,
}

impl Lattice {
    /// Create an all-medium lattice. Dimensions must be positive.
    pub fn new(width: i32, height: i32, depth: i32) -> Self {
        let size = (width.max(0) as usize) * (height.max(0) as usize) * (depth.max(0) as usize);
        Lattice {
            width,
            height,
            depth,
            ids: vec![MEDIUM; size],
            tags: vec![0; size],
        }
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        Geometry::for_depth(self.depth)
    }

    /// Number of lattice sites.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Get the linear index for a 3D coordinate
    #[inline]
    pub fn index(&self, x: i32, y: i32, z: i32) -> usize {
        z as usize * self.height as usize * self.width as usize
            + y as usize * self.width as usize
            + x as usize
    }

    /// Inverse of [`Lattice::index`].
    #[inline]
    pub fn voxel_at(&self, idx: usize) -> Voxel {
        let w = self.width as usize;
        let h = self.height as usize;
        Voxel::new((idx % w) as i32, ((idx / w) % h) as i32, (idx / (w * h)) as i32)
    }

    #[inline]
    pub fn in_bounds(&self, v: Voxel) -> bool {
        (0..self.width).contains(&v.x)
            && (0..self.height).contains(&v.y)
            && (0..self.depth).contains(&v.z)
    }

    /// Cell id at a voxel, `None` outside the lattice.
    #[inline]
    pub fn id(&self, v: Voxel) -> Option<CellId> {
        if self.in_bounds(v) {
            Some(self.ids[self.index(v.x, v.y, v.z)])
        } else {
            None
        }
    }

    /// Region tag at a voxel, `None` outside the lattice.
    #[inline]
    pub fn tag(&self, v: Voxel) -> Option<i8> {
        if self.in_bounds(v) {
            Some(self.tags[self.index(v.x, v.y, v.z)])
        } else {
            None
        }
    }

    /// Set id and tag together. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, v: Voxel, id: CellId, tag: i8) {
        if self.in_bounds(v) {
            let idx = self.index(v.x, v.y, v.z);
            self.ids[idx] = id;
            self.tags[idx] = tag;
        }
    }

    /// Set only the tag. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set_tag(&mut self, v: Voxel, tag: i8) {
        if self.in_bounds(v) {
            let idx = self.index(v.x, v.y, v.z);
            self.tags[idx] = tag;
        }
    }

    /// Raw id array in z/y/x order.
    #[inline]
    pub fn ids(&self) -> &[CellId] {
        &self.ids
    }

    /// Raw tag array in z/y/x order.
    #[inline]
    pub fn tags(&self) -> &[i8] {
        &self.tags
    }

    /// Count sites labelled with `id`.
    pub fn count(&self, id: CellId) -> usize {
        self.ids.iter().filter(|&&c| c == id).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lattice_is_medium() {
        let lattice = Lattice::new(8, 8, 8);
        assert_eq!(lattice.len(), 512);
        assert_eq!(lattice.count(MEDIUM), 512);
        assert!(lattice.tags().iter().all(|&t| t == 0));
        assert_eq!(lattice.geometry(), Geometry::Grid3D);
    }

    #[test]
    fn test_index_of() {
        let lattice = Lattice::new(4, 4, 4);

        // First cell
        assert_eq!(lattice.index(0, 0, 0), 0);
        // Last cell
        assert_eq!(lattice.index(3, 3, 3), 63);
        // Various cells
        assert_eq!(lattice.index(1, 0, 0), 1);
        assert_eq!(lattice.index(0, 1, 0), 4);
        assert_eq!(lattice.index(0, 0, 1), 16);

        for idx in [0usize, 1, 4, 16, 37, 63] {
            let v = lattice.voxel_at(idx);
            assert_eq!(lattice.index(v.x, v.y, v.z), idx);
        }
    }

    #[test]
    fn test_in_bounds() {
        let lattice = Lattice::new(4, 4, 4);

        assert!(lattice.in_bounds(Voxel::new(0, 0, 0)));
        assert!(lattice.in_bounds(Voxel::new(3, 3, 3)));

        assert!(!lattice.in_bounds(Voxel::new(-1, 0, 0)));
        assert!(!lattice.in_bounds(Voxel::new(4, 0, 0)));
        assert!(!lattice.in_bounds(Voxel::new(0, -1, 0)));
        assert!(!lattice.in_bounds(Voxel::new(0, 4, 0)));
        assert!(!lattice.in_bounds(Voxel::new(0, 0, -1)));
        assert!(!lattice.in_bounds(Voxel::new(0, 0, 4)));
    }

    #[test]
    fn test_set_and_get() {
        let mut lattice = Lattice::new(5, 6, 1);
        let v = Voxel::new(2, 3, 0);
        lattice.set(v, 7, -2);
        assert_eq!(lattice.id(v), Some(7));
        assert_eq!(lattice.tag(v), Some(-2));
        lattice.set_tag(v, -1);
        assert_eq!(lattice.tag(v), Some(-1));

        // Out of bounds is ignored and reads as None
        lattice.set(Voxel::new(9, 0, 0), 3, 0);
        assert_eq!(lattice.id(Voxel::new(9, 0, 0)), None);
        assert_eq!(lattice.count(7), 1);
        assert_eq!(lattice.geometry(), Geometry::Grid2D);
    }
}
