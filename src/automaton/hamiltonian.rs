//! Energy terms of the Potts Hamiltonian.
//!
//! Every function here is pure: it reads the lattice and the cell table and
//! returns an energy or an energy difference. Nothing fails; missing table
//! entries and zero lambdas simply contribute nothing.

use std::collections::BTreeMap;

use super::cell::{PottsCell, RegionParams};
use super::region::Region;
use super::voxel::Voxel;
use super::{CellId, MEDIUM};
use crate::state::Lattice;

/// All cells on the lattice, keyed by id.
pub type CellTable = BTreeMap<CellId, PottsCell>;

/// Quadratic constraint `lambda * (value - target)^2`.
#[inline]
pub fn constraint_energy(value: f64, target: f64, lambda: f64) -> f64 {
    lambda * (value - target).powi(2)
}

/// Change in the constraint energy when `value` moves by `change`.
#[inline]
pub fn constraint_delta(value: f64, change: f64, target: f64, lambda: f64) -> f64 {
    constraint_energy(value + change, target, lambda) - constraint_energy(value, target, lambda)
}

/// Symmetrized contact energy between two labels.
///
/// Two cells average their stored entries toward each other's population;
/// a cell against the medium uses its medium entry.
pub fn contact(cells: &CellTable, a: CellId, b: CellId) -> f64 {
    if a == b {
        return 0.0;
    }
    match (cells.get(&a), cells.get(&b)) {
        (Some(ca), Some(cb)) => {
            (ca.params.adhesion_to(cb.params.population)
                + cb.params.adhesion_to(ca.params.population))
                / 2.0
        }
        (Some(c), None) | (None, Some(c)) => c.params.adhesion_to(0),
        (None, None) => 0.0,
    }
}

/// Adhesion energy of `label` at `v`: the contact energy with every
/// in-bounds Moore neighbor carrying a different label.
pub fn adhesion_energy(lattice: &Lattice, cells: &CellTable, label: CellId, v: Voxel) -> f64 {
    lattice
        .geometry()
        .moore()
        .iter()
        .filter_map(|&o| lattice.id(v.offset(o)))
        .filter(|&id| id != label)
        .map(|id| contact(cells, label, id))
        .sum()
}

/// Adhesion change for relabelling `v` from `source` to `target`.
pub fn adhesion_delta(
    lattice: &Lattice,
    cells: &CellTable,
    source: CellId,
    target: CellId,
    v: Voxel,
) -> f64 {
    adhesion_energy(lattice, cells, target, v) - adhesion_energy(lattice, cells, source, v)
}

/// Face neighbors of `v` for which `member` holds.
fn face_members<F>(lattice: &Lattice, v: Voxel, mut member: F) -> i64
where
    F: FnMut(Voxel) -> bool,
{
    lattice
        .geometry()
        .faces()
        .iter()
        .map(|&o| v.offset(o))
        .filter(|&n| lattice.in_bounds(n) && member(n))
        .count() as i64
}

/// Surface change of a voxel set losing `v`, where `members` face
/// neighbors of `v` belong to the set. Lattice-edge faces count as exposed.
#[inline]
fn surface_loss(lattice: &Lattice, members: i64) -> i64 {
    2 * members - lattice.geometry().face_count()
}

/// Surface change of a voxel set gaining `v`.
#[inline]
fn surface_gain(lattice: &Lattice, members: i64) -> i64 {
    lattice.geometry().face_count() - 2 * members
}

/// Local surface change of cell `id` if `v` leaves it.
pub fn surface_change_source(lattice: &Lattice, id: CellId, v: Voxel) -> i64 {
    surface_loss(lattice, face_members(lattice, v, |n| lattice.id(n) == Some(id)))
}

/// Local surface change of cell `id` if `v` joins it.
pub fn surface_change_target(lattice: &Lattice, id: CellId, v: Voxel) -> i64 {
    surface_gain(lattice, face_members(lattice, v, |n| lattice.id(n) == Some(id)))
}

/// Volume energy change of cell `id` when its volume moves by `change`.
pub fn volume_delta(cells: &CellTable, id: CellId, change: i64) -> f64 {
    if id == MEDIUM {
        return 0.0;
    }
    cells.get(&id).map_or(0.0, |cell| {
        let p = &cell.params;
        constraint_delta(
            cell.location.volume() as f64,
            change as f64,
            p.target_volume,
            p.lambda_volume,
        )
    })
}

/// Surface energy change of cell `id` when its surface moves by `change`.
pub fn surface_delta(cells: &CellTable, id: CellId, change: i64) -> f64 {
    if id == MEDIUM {
        return 0.0;
    }
    cells.get(&id).map_or(0.0, |cell| {
        let p = &cell.params;
        constraint_delta(
            cell.location.surface() as f64,
            change as f64,
            p.target_surface,
            p.lambda_surface,
        )
    })
}

/// Total energy change of relabelling `v` from `source` to `target`.
pub fn delta(
    lattice: &Lattice,
    cells: &CellTable,
    source: CellId,
    target: CellId,
    v: Voxel,
) -> f64 {
    let adhesion = adhesion_delta(lattice, cells, source, target, v);

    let volume = volume_delta(cells, source, -1) + volume_delta(cells, target, 1);

    let surface = surface_delta(cells, source, surface_change_source(lattice, source, v))
        + surface_delta(cells, target, surface_change_target(lattice, target, v));

    adhesion + volume + surface
}

/// Symmetrized contact energy between two regions of the same cell.
pub fn region_contact(cell: &PottsCell, a: Region, b: Region) -> f64 {
    if a == b {
        return 0.0;
    }
    let toward = |from: Region, to: Region| {
        cell.params
            .regions
            .get(&from)
            .map_or(0.0, |p| p.adhesion_to(to))
    };
    (toward(a, b) + toward(b, a)) / 2.0
}

/// Region adhesion energy of `region` at `v`: contact with every in-bounds
/// Moore neighbor of the same cell whose region differs.
pub fn region_adhesion_energy(
    lattice: &Lattice,
    cell: &PottsCell,
    region: Region,
    v: Voxel,
) -> f64 {
    lattice
        .geometry()
        .moore()
        .iter()
        .map(|&o| v.offset(o))
        .filter(|&n| lattice.id(n) == Some(cell.id))
        .filter_map(|n| lattice.tag(n).and_then(Region::from_code))
        .filter(|&r| r != region)
        .map(|r| region_contact(cell, region, r))
        .sum()
}

fn region_params(cell: &PottsCell, region: Region) -> Option<&RegionParams> {
    cell.params.regions.get(&region)
}

/// Local surface change of `region` within `cell` if `v` leaves it.
pub fn region_surface_change_source(
    lattice: &Lattice,
    cell: CellId,
    region: Region,
    v: Voxel,
) -> i64 {
    let code = region.code();
    surface_loss(
        lattice,
        face_members(lattice, v, |n| {
            lattice.id(n) == Some(cell) && lattice.tag(n) == Some(code)
        }),
    )
}

/// Local surface change of `region` within `cell` if `v` joins it.
pub fn region_surface_change_target(
    lattice: &Lattice,
    cell: CellId,
    region: Region,
    v: Voxel,
) -> i64 {
    let code = region.code();
    surface_gain(
        lattice,
        face_members(lattice, v, |n| {
            lattice.id(n) == Some(cell) && lattice.tag(n) == Some(code)
        }),
    )
}

/// Volume and surface energy change of one region.
fn region_constraint_delta(cell: &PottsCell, region: Region, volume: i64, surface: i64) -> f64 {
    let Some(p) = region_params(cell, region) else {
        return 0.0;
    };
    let location = &cell.location;
    constraint_delta(
        location.region_volume(region) as f64,
        volume as f64,
        p.target_volume,
        p.lambda_volume,
    ) + constraint_delta(
        location.region_surface(region) as f64,
        surface as f64,
        p.target_surface,
        p.lambda_surface,
    )
}

/// Total energy change of moving `v` from region `source` to region
/// `target` inside `cell`.
///
/// The parent cell keeps its volume and surface, so only region terms apply.
pub fn region_delta(
    lattice: &Lattice,
    cell: &PottsCell,
    source: Region,
    target: Region,
    v: Voxel,
) -> f64 {
    let adhesion = region_adhesion_energy(lattice, cell, target, v)
        - region_adhesion_energy(lattice, cell, source, v);

    let source_surface = region_surface_change_source(lattice, cell.id, source, v);
    let target_surface = region_surface_change_target(lattice, cell.id, target, v);

    adhesion
        + region_constraint_delta(cell, source, -1, source_surface)
        + region_constraint_delta(cell, target, 1, target_surface)
}
