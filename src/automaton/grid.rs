//! Neighborhood queries and window extraction over the lattice.

use super::connectivity::bit;
use super::geometry::Geometry;
use super::region::Region;
use super::voxel::Voxel;
use super::CellId;
use crate::state::Lattice;

/// Build the occupancy mask of the Moore neighborhood around `v`.
///
/// Bit `connectivity::bit(offset)` is set when the in-bounds neighbor at
/// `offset` satisfies `same(id, tag)`. Out-of-bounds neighbors are never set.
pub fn neighborhood<F>(lattice: &Lattice, geometry: Geometry, v: Voxel, mut same: F) -> u32
where
    F: FnMut(CellId, i8) -> bool,
{
    let ids = lattice.ids();
    let tags = lattice.tags();
    let mut mask = 0u32;

    for &o in geometry.moore() {
        let n = v.offset(o);
        if lattice.in_bounds(n) {
            let idx = lattice.index(n.x, n.y, n.z);
            if same(ids[idx], tags[idx]) {
                mask |= 1 << bit(o);
            }
        }
    }

    mask
}

/// Distinct cell ids among the face neighbors of `v` that differ from the id at `v`.
///
/// Sorted ascending so that target selection is reproducible.
pub fn unique_neighbor_ids(lattice: &Lattice, geometry: Geometry, v: Voxel) -> Vec<CellId> {
    let Some(own) = lattice.id(v) else {
        return Vec::new();
    };

    let mut out: Vec<CellId> = geometry
        .faces()
        .iter()
        .filter_map(|&o| lattice.id(v.offset(o)))
        .filter(|&id| id != own)
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Distinct regions among face neighbors in the same cell as `v` whose tag
/// differs from the tag at `v`.
pub fn unique_neighbor_regions(lattice: &Lattice, geometry: Geometry, v: Voxel) -> Vec<Region> {
    let (Some(own_id), Some(own_tag)) = (lattice.id(v), lattice.tag(v)) else {
        return Vec::new();
    };

    let mut out: Vec<Region> = geometry
        .faces()
        .iter()
        .map(|&o| v.offset(o))
        .filter(|&n| lattice.id(n) == Some(own_id))
        .filter_map(|n| lattice.tag(n))
        .filter(|&tag| tag != own_tag)
        .filter_map(Region::from_code)
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Clamp a half-open box `[min, max)` to the lattice.
/// Returns `None` if the clamped box is empty.
fn clamp_window(lattice: &Lattice, min: Voxel, max: Voxel) -> Option<(Voxel, Voxel)> {
    let min = Voxel::new(
        min.x.clamp(0, lattice.width),
        min.y.clamp(0, lattice.height),
        min.z.clamp(0, lattice.depth),
    );
    let max = Voxel::new(
        max.x.clamp(0, lattice.width),
        max.y.clamp(0, lattice.height),
        max.z.clamp(0, lattice.depth),
    );

    if min.x >= max.x || min.y >= max.y || min.z >= max.z {
        None
    } else {
        Some((min, max))
    }
}

/// Copy lattice ids in the half-open box `[min, max)` into `out`.
///
/// # Layout
/// The buffer is filled in z,y,x order (z changes slowest, x changes fastest).
/// The box is clamped to the lattice first.
///
/// # Returns
/// Number of values written, or 0 if the box is empty or `out` is too small.
pub fn extract_ids(lattice: &Lattice, out: &mut [CellId], min: Voxel, max: Voxel) -> u64 {
    extract_window(lattice, lattice.ids(), out, min, max)
}

/// Copy region tags in the half-open box `[min, max)` into `out`.
/// Same layout and clamping as [`extract_ids`].
pub fn extract_tags(lattice: &Lattice, out: &mut [i8], min: Voxel, max: Voxel) -> u64 {
    extract_window(lattice, lattice.tags(), out, min, max)
}

fn extract_window<T: Copy>(
    lattice: &Lattice,
    source: &[T],
    out: &mut [T],
    min: Voxel,
    max: Voxel,
) -> u64 {
    let Some((min, max)) = clamp_window(lattice, min, max) else {
        return 0;
    };

    let total_size = (max.x - min.x) as usize * (max.y - min.y) as usize * (max.z - min.z) as usize;
    if out.len() < total_size {
        return 0;
    }

    let mut offset = 0;
    for z in min.z..max.z {
        for y in min.y..max.y {
            for x in min.x..max.x {
                out[offset] = source[lattice.index(x, y, z)];
                offset += 1;
            }
        }
    }

    offset as u64
}
