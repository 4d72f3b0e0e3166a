//! Division of a location into two connected, size-balanced halves.
//!
//! The location is cut by the plane of smallest diameter through its
//! centroid. Disconnected fragments are then moved across the cut, and
//! boundary voxels are traded from the larger half to the smaller one
//! until the sizes are within [`BALANCE_TOLERANCE`]. Connectivity always
//! wins over balance: if no voxel can move without disconnecting the
//! larger half, the imbalance is accepted.

use std::collections::{BTreeSet, VecDeque};

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use super::geometry::{Geometry, SplitPlane};
use super::location::Location;
use super::voxel::Voxel;

/// Largest accepted size difference between the two halves.
pub const BALANCE_TOLERANCE: usize = 2;

impl Location {
    /// Split this location in two.
    ///
    /// `self` keeps one half (chosen by a coin flip) and the other half is
    /// returned as a new location. Regions are carried voxel by voxel.
    pub fn split<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Location {
        let geometry = self.geometry();
        let Some(center) = self.center() else {
            return self.subset(&BTreeSet::new());
        };

        let plane = choose_plane(self.voxels(), center, geometry, rng);
        let (mut first, mut second) = partition(self.voxels(), center, plane, rng);
        reconnect(&mut first, &mut second, geometry);
        balance(&mut first, &mut second, geometry, rng);

        let (kept, daughter) = if rng.gen_bool(0.5) {
            (first, second)
        } else {
            (second, first)
        };
        debug!(
            "split {} voxels along {} into {} + {}",
            self.volume(),
            plane.name,
            kept.len(),
            daughter.len()
        );

        let daughter = self.subset(&daughter);
        *self = self.subset(&kept);
        daughter
    }
}

/// Diameter of the voxels lying in `plane` through `center`: the largest
/// per-axis span among them. `None` if no voxel lies in the plane.
pub fn diameter(voxels: &BTreeSet<Voxel>, center: Voxel, plane: SplitPlane) -> Option<i32> {
    let mut min = [i32::MAX; 3];
    let mut max = [i32::MIN; 3];
    let mut any = false;

    for v in voxels.iter().filter(|v| v.project(center, plane.normal) == 0) {
        any = true;
        for (axis, value) in [v.x, v.y, v.z].into_iter().enumerate() {
            min[axis] = min[axis].min(value);
            max[axis] = max[axis].max(value);
        }
    }

    if !any {
        return None;
    }
    (0..3).map(|axis| max[axis] - min[axis] + 1).max()
}

/// Pick the plane with the smallest diameter, breaking ties uniformly.
fn choose_plane<R: Rng + ?Sized>(
    voxels: &BTreeSet<Voxel>,
    center: Voxel,
    geometry: Geometry,
    rng: &mut R,
) -> SplitPlane {
    let planes = geometry.split_planes();
    let measured: Vec<(SplitPlane, i32)> = planes
        .iter()
        .filter_map(|&p| diameter(voxels, center, p).map(|d| (p, d)))
        .collect();

    let tied: Vec<SplitPlane> = match measured.iter().map(|&(_, d)| d).min() {
        Some(smallest) => measured
            .iter()
            .filter(|&&(_, d)| d == smallest)
            .map(|&(p, _)| p)
            .collect(),
        None => planes.to_vec(),
    };

    if tied.len() > 1 {
        tied[rng.gen_range(0..tied.len())]
    } else {
        tied[0]
    }
}

/// Split voxels by the sign of their projection on the plane normal.
/// Voxels in the plane go to either side by an independent coin flip.
fn partition<R: Rng + ?Sized>(
    voxels: &BTreeSet<Voxel>,
    center: Voxel,
    plane: SplitPlane,
    rng: &mut R,
) -> (BTreeSet<Voxel>, BTreeSet<Voxel>) {
    let mut first = BTreeSet::new();
    let mut second = BTreeSet::new();

    for &v in voxels {
        let side = v.project(center, plane.normal);
        let to_first = match side {
            s if s < 0 => true,
            s if s > 0 => false,
            _ => rng.gen_bool(0.5),
        };
        if to_first {
            first.insert(v);
        } else {
            second.insert(v);
        }
    }

    (first, second)
}

/// Voxels reachable from `start` through face neighbors inside `voxels`.
pub fn reachable(voxels: &BTreeSet<Voxel>, start: Voxel, geometry: Geometry) -> BTreeSet<Voxel> {
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(v) = queue.pop_front() {
        for &o in geometry.faces() {
            let n = v.offset(o);
            if voxels.contains(&n) && seen.insert(n) {
                queue.push_back(n);
            }
        }
    }

    seen
}

/// True if `voxels` is empty or a single face-connected component.
pub fn is_connected(voxels: &BTreeSet<Voxel>, geometry: Geometry) -> bool {
    unconnected(voxels, geometry).is_none()
}

/// If `voxels` is disconnected, the smaller of (the component of its first
/// voxel, everything else).
fn unconnected(voxels: &BTreeSet<Voxel>, geometry: Geometry) -> Option<BTreeSet<Voxel>> {
    let &start = voxels.iter().next()?;
    let visited = reachable(voxels, start, geometry);
    if visited.len() == voxels.len() {
        return None;
    }

    let rest: BTreeSet<Voxel> = voxels.difference(&visited).copied().collect();
    if rest.len() <= visited.len() {
        Some(rest)
    } else {
        Some(visited)
    }
}

/// Move disconnected fragments of `from` into `to` until `from` is connected.
/// Each pass strictly shrinks `from`, so the cap is never reached for
/// inputs whose union is connected.
fn settle(from: &mut BTreeSet<Voxel>, to: &mut BTreeSet<Voxel>, geometry: Geometry) -> bool {
    let cap = from.len() + 1;
    for _ in 0..cap {
        match unconnected(from, geometry) {
            None => return true,
            Some(fragment) => {
                for v in fragment {
                    from.remove(&v);
                    to.insert(v);
                }
            }
        }
    }
    is_connected(from, geometry)
}

/// Make both halves connected. Returns false if the iteration cap was hit.
fn reconnect(
    first: &mut BTreeSet<Voxel>,
    second: &mut BTreeSet<Voxel>,
    geometry: Geometry,
) -> bool {
    let settled = settle(first, second, geometry) && settle(second, first, geometry);
    let connected = settled && is_connected(first, geometry);
    if !connected {
        warn!(
            "could not reconnect split halves of {} and {} voxels",
            first.len(),
            second.len()
        );
    }
    connected
}

/// Trade voxels from the larger half to the smaller one until balanced or
/// until no move keeps the larger half connected.
fn balance<R: Rng + ?Sized>(
    first: &mut BTreeSet<Voxel>,
    second: &mut BTreeSet<Voxel>,
    geometry: Geometry,
    rng: &mut R,
) {
    let cap = first.len() + second.len();

    for _ in 0..cap {
        let (from, to) = if first.len() > second.len() {
            (&mut *first, &mut *second)
        } else {
            (&mut *second, &mut *first)
        };
        if from.len() - to.len() <= BALANCE_TOLERANCE {
            break;
        }

        let mut candidates: Vec<Voxel> = if to.is_empty() {
            from.iter().copied().collect()
        } else {
            from.iter()
                .copied()
                .filter(|v| geometry.faces().iter().any(|&o| to.contains(&v.offset(o))))
                .collect()
        };
        candidates.shuffle(rng);

        let moved = candidates.into_iter().find(|v| {
            from.remove(v);
            let keeps = is_connected(from, geometry);
            if !keeps {
                from.insert(*v);
            }
            keeps
        });

        match moved {
            Some(v) => {
                to.insert(v);
            }
            None => {
                debug!(
                    "split left unbalanced at {} and {} voxels",
                    from.len(),
                    to.len()
                );
                break;
            }
        }
    }

    reconnect(first, second, geometry);
}
