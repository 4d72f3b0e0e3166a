//! Local connectivity test for voxel flips.
//!
//! Decides from the 3x3 (or 3x3x3) occupancy pattern around a voxel whether
//! changing that voxel keeps the surrounding same-label region simply
//! connected. The pattern is a bit mask: bit [`bit`]`(offset)` is set when
//! the neighbor at `offset` carries the label under test. The center bit is
//! ignored.

use super::geometry::{Geometry, Offset};

/// Bit position of a neighborhood offset.
#[inline]
pub const fn bit(o: Offset) -> u32 {
    ((o.2 + 1) * 9 + (o.1 + 1) * 3 + (o.0 + 1)) as u32
}

const CENTER: u32 = 13;

const fn decode(i: u32) -> (i32, i32, i32) {
    let i = i as i32;
    (i % 3 - 1, (i / 3) % 3 - 1, i / 9 - 1)
}

const fn abs(v: i32) -> i32 {
    if v < 0 {
        -v
    } else {
        v
    }
}

/// Adjacency tables over the 27 neighborhood positions, center excluded.
/// `chebyshev = false` gives 6-adjacency, `true` gives 26-adjacency.
const fn adjacency(chebyshev: bool) -> [u32; 27] {
    let mut table = [0u32; 27];
    let mut i = 0;
    while i < 27 {
        let mut j = 0;
        while j < 27 {
            if i != j && i != CENTER && j != CENTER {
                let a = decode(i as u32);
                let b = decode(j as u32);
                let dx = abs(a.0 - b.0);
                let dy = abs(a.1 - b.1);
                let dz = abs(a.2 - b.2);
                let adjacent = if chebyshev {
                    dx <= 1 && dy <= 1 && dz <= 1
                } else {
                    dx + dy + dz == 1
                };
                if adjacent {
                    table[i as usize] |= 1 << j;
                }
            }
            j += 1;
        }
        i += 1;
    }
    table
}

const fn shell(max_manhattan: i32) -> u32 {
    let mut mask = 0u32;
    let mut i = 0;
    while i < 27 {
        let o = decode(i);
        let d = abs(o.0) + abs(o.1) + abs(o.2);
        if d >= 1 && d <= max_manhattan {
            mask |= 1 << i;
        }
        i += 1;
    }
    mask
}

const ADJACENT_6: [u32; 27] = adjacency(false);
const ADJACENT_26: [u32; 27] = adjacency(true);
const FACES: u32 = shell(1);
const NEIGHBORS_18: u32 = shell(2);
const NEIGHBORS_26: u32 = shell(3);

/// Whether changing the center voxel preserves simple connectivity of the
/// label described by `mask`.
///
/// `background` marks labels for which enclosed holes are acceptable
/// (the medium, or the default region inside a cell).
#[inline]
pub fn is_connected(geometry: Geometry, mask: u32, background: bool) -> bool {
    match geometry {
        Geometry::Grid2D => planar(mask, background),
        Geometry::Grid3D => volumetric(mask, background),
    }
}

/// Square-lattice rule table over the four sides and four corner links.
fn planar(mask: u32, background: bool) -> bool {
    let has = |o: Offset| mask & (1 << bit(o)) != 0;

    let left = has((-1, 0, 0));
    let right = has((1, 0, 0));
    let down = has((0, -1, 0));
    let up = has((0, 1, 0));
    let sides = [left, right, down, up].iter().filter(|&&s| s).count();

    match sides {
        0 => false,
        1 => true,
        2 => {
            if (left && right) || (down && up) {
                return false;
            }
            let dx = if left { -1 } else { 1 };
            let dy = if down { -1 } else { 1 };
            has((dx, dy, 0))
        }
        3 => {
            // Both links must sit on the side opposite the gap
            if !left {
                has((1, -1, 0)) && has((1, 1, 0))
            } else if !right {
                has((-1, -1, 0)) && has((-1, 1, 0))
            } else if !down {
                has((-1, 1, 0)) && has((1, 1, 0))
            } else {
                has((-1, -1, 0)) && has((1, -1, 0))
            }
        }
        _ => background,
    }
}

/// Cubic-lattice simple-point rule.
///
/// The face neighbors must form a single 6-connected component inside the
/// 18-neighborhood. For non-background labels the complement inside the
/// 26-neighborhood must also be a single 26-connected component, otherwise
/// the change would open a tunnel. All six faces occupied is a cavity.
fn volumetric(mask: u32, background: bool) -> bool {
    let faces = mask & FACES;
    match faces.count_ones() {
        0 => return false,
        6 => return background,
        _ => {}
    }

    let reached = flood(faces.trailing_zeros(), mask & NEIGHBORS_18, &ADJACENT_6);
    if reached & faces != faces {
        return false;
    }
    if background {
        return true;
    }

    let empty = !mask & NEIGHBORS_26;
    flood(empty.trailing_zeros(), empty, &ADJACENT_26) == empty
}

fn flood(start: u32, within: u32, adjacent: &[u32; 27]) -> u32 {
    let mut seen = 1u32 << start;
    let mut frontier = seen;
    while frontier != 0 {
        let i = frontier.trailing_zeros() as usize;
        frontier &= frontier - 1;
        let next = adjacent[i] & within & !seen;
        seen |= next;
        frontier |= next;
    }
    seen
}
