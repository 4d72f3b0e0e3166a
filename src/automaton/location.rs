//! Voxel sets with incrementally maintained volume and surface.
//!
//! A [`Location`] is the spatial extent of one cell. Region-aware locations
//! additionally partition their voxels into per-[`Region`] sub-locations;
//! the parent's counters always describe the union.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::geometry::Geometry;
use super::region::Region;
use super::voxel::Voxel;
use super::CellId;
use crate::error::PottsError;

#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    geometry: Geometry,
    voxels: BTreeSet<Voxel>,
    volume: i64,
    surface: i64,
    regions: Option<BTreeMap<Region, Location>>,
}

/// Faces of `v` that would border a non-member if `v` were a member.
/// Adding `v` changes the surface by this amount, removing it by the negation.
#[inline]
fn exposure(voxels: &BTreeSet<Voxel>, geometry: Geometry, v: Voxel) -> i64 {
    let members = geometry
        .faces()
        .iter()
        .filter(|&&o| voxels.contains(&v.offset(o)))
        .count() as i64;
    geometry.face_count() - 2 * members
}

/// Surface of a voxel set by direct count of exposed faces.
pub fn count_surface(voxels: &BTreeSet<Voxel>, geometry: Geometry) -> i64 {
    voxels
        .iter()
        .map(|&v| {
            geometry
                .faces()
                .iter()
                .filter(|&&o| !voxels.contains(&v.offset(o)))
                .count() as i64
        })
        .sum()
}

impl Location {
    /// Empty location without regions.
    pub fn new(geometry: Geometry) -> Self {
        Location {
            geometry,
            voxels: BTreeSet::new(),
            volume: 0,
            surface: 0,
            regions: None,
        }
    }

    /// Empty region-aware location. The default region always exists.
    pub fn with_regions(geometry: Geometry) -> Self {
        let mut regions = BTreeMap::new();
        regions.insert(Region::Default, Location::new(geometry));
        Location {
            regions: Some(regions),
            ..Location::new(geometry)
        }
    }

    /// Location holding the given voxels (duplicates collapse).
    pub fn from_voxels<I>(geometry: Geometry, voxels: I) -> Self
    where
        I: IntoIterator<Item = Voxel>,
    {
        let mut location = Location::new(geometry);
        for v in voxels {
            location.add(v);
        }
        location
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[inline]
    pub fn has_regions(&self) -> bool {
        self.regions.is_some()
    }

    #[inline]
    pub fn volume(&self) -> i64 {
        self.volume
    }

    #[inline]
    pub fn surface(&self) -> i64 {
        self.surface
    }

    /// Volume of one region; 0 if the region is absent.
    pub fn region_volume(&self, region: Region) -> i64 {
        self.region(region).map_or(0, Location::volume)
    }

    /// Surface of one region; 0 if the region is absent.
    pub fn region_surface(&self, region: Region) -> i64 {
        self.region(region).map_or(0, Location::surface)
    }

    #[inline]
    pub fn voxels(&self) -> &BTreeSet<Voxel> {
        &self.voxels
    }

    #[inline]
    pub fn contains(&self, v: Voxel) -> bool {
        self.voxels.contains(&v)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    pub fn region(&self, region: Region) -> Option<&Location> {
        self.regions.as_ref().and_then(|r| r.get(&region))
    }

    /// Regions in canonical order; empty for locations without regions.
    pub fn regions(&self) -> impl Iterator<Item = (Region, &Location)> {
        self.regions.iter().flat_map(|r| r.iter().map(|(&k, v)| (k, v)))
    }

    /// Region containing `v`, if the location is region-aware and owns `v`.
    pub fn region_of(&self, v: Voxel) -> Option<Region> {
        self.regions
            .as_ref()?
            .iter()
            .find(|(_, sub)| sub.contains(v))
            .map(|(&region, _)| region)
    }

    /// Component-wise mean of the voxels, rounded to the nearest voxel.
    pub fn center(&self) -> Option<Voxel> {
        if self.voxels.is_empty() {
            return None;
        }
        let n = self.voxels.len() as f64;
        let (sx, sy, sz) = self.voxels.iter().fold((0i64, 0i64, 0i64), |(x, y, z), v| {
            (x + v.x as i64, y + v.y as i64, z + v.z as i64)
        });
        Some(Voxel::new(
            (sx as f64 / n).round() as i32,
            (sy as f64 / n).round() as i32,
            (sz as f64 / n).round() as i32,
        ))
    }

    /// Insert into this set only, updating the counters.
    fn insert(&mut self, v: Voxel) -> bool {
        if self.voxels.contains(&v) {
            return false;
        }
        self.surface += exposure(&self.voxels, self.geometry, v);
        self.voxels.insert(v);
        self.volume += 1;
        true
    }

    /// Remove from this set only, updating the counters.
    fn erase(&mut self, v: Voxel) -> bool {
        if !self.voxels.remove(&v) {
            return false;
        }
        self.surface -= exposure(&self.voxels, self.geometry, v);
        self.volume -= 1;
        true
    }

    /// Add a voxel. Region-aware locations put it in the default region.
    /// Returns false (and changes nothing) if the voxel is already present.
    pub fn add(&mut self, v: Voxel) -> bool {
        self.add_to(Region::Default, v)
    }

    /// Add a voxel to a specific region. For locations without regions the
    /// region is ignored.
    pub fn add_to(&mut self, region: Region, v: Voxel) -> bool {
        if !self.insert(v) {
            return false;
        }
        if let Some(regions) = self.regions.as_mut() {
            let geometry = self.geometry;
            regions
                .entry(region)
                .or_insert_with(|| Location::new(geometry))
                .insert(v);
        }
        true
    }

    /// Remove a voxel (from its region too). Returns false if absent.
    pub fn remove(&mut self, v: Voxel) -> bool {
        if !self.erase(v) {
            return false;
        }
        if let Some(regions) = self.regions.as_mut() {
            for sub in regions.values_mut() {
                if sub.erase(v) {
                    break;
                }
            }
        }
        true
    }

    /// Move a member voxel into `region`. The parent counters do not change.
    /// Returns false if the voxel is absent, the location has no regions, or
    /// the voxel is already in `region`.
    pub fn retag(&mut self, v: Voxel, region: Region) -> bool {
        let Some(from) = self.region_of(v) else {
            return false;
        };
        if from == region {
            return false;
        }
        let geometry = self.geometry;
        if let Some(regions) = self.regions.as_mut() {
            if let Some(sub) = regions.get_mut(&from) {
                sub.erase(v);
            }
            regions
                .entry(region)
                .or_insert_with(|| Location::new(geometry))
                .insert(v);
        }
        true
    }

    /// Volume and surface recomputed from the voxel set.
    pub fn recount(&self) -> (i64, i64) {
        (self.voxels.len() as i64, count_surface(&self.voxels, self.geometry))
    }

    /// Verify the counters (and region partition) against a recount.
    pub fn check(&self) -> Result<(), PottsError> {
        let (volume, surface) = self.recount();
        if volume != self.volume || surface != self.surface {
            return Err(PottsError::internal(format!(
                "location counters ({}, {}) disagree with recount ({}, {})",
                self.volume, self.surface, volume, surface
            )));
        }

        if let Some(regions) = &self.regions {
            let mut covered = 0usize;
            for (region, sub) in regions {
                sub.check()?;
                if let Some(stray) = sub.voxels.iter().find(|v| !self.voxels.contains(v)) {
                    return Err(PottsError::internal(format!(
                        "{} region voxel {} is not in its parent location",
                        region, stray
                    )));
                }
                covered += sub.voxels.len();
            }
            if covered != self.voxels.len() {
                return Err(PottsError::internal(format!(
                    "regions cover {} voxels but the location holds {}",
                    covered,
                    self.voxels.len()
                )));
            }
        }

        Ok(())
    }

    /// Re-form `region` as the `count` voxels reached first by a
    /// breadth-first search from the member voxel nearest the center.
    ///
    /// Voxels previously in `region` return to the default region first.
    /// Returns the number of voxels assigned.
    pub fn assign_region(&mut self, region: Region, count: usize) -> usize {
        if region == Region::Default || !self.has_regions() {
            return 0;
        }

        let previous: Vec<Voxel> = self
            .region(region)
            .map(|sub| sub.voxels.iter().copied().collect())
            .unwrap_or_default();
        for v in previous {
            self.retag(v, Region::Default);
        }

        let Some(center) = self.center() else {
            return 0;
        };
        let Some(start) = self
            .voxels
            .iter()
            .copied()
            .min_by_key(|v| v.distance_sq(center))
        else {
            return 0;
        };

        let mut selected = Vec::with_capacity(count);
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            if selected.len() >= count {
                break;
            }
            selected.push(v);
            for &o in self.geometry.faces() {
                let n = v.offset(o);
                if self.voxels.contains(&n) && seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        for &v in &selected {
            self.retag(v, region);
        }
        selected.len()
    }

    /// New location over `voxels` (a subset of this one) with the same
    /// region mode; each voxel keeps its current region.
    pub fn subset(&self, voxels: &BTreeSet<Voxel>) -> Location {
        let mut out = if self.has_regions() {
            Location::with_regions(self.geometry)
        } else {
            Location::new(self.geometry)
        };
        for &v in voxels {
            let region = self.region_of(v).unwrap_or(Region::Default);
            out.add_to(region, v);
        }
        out
    }

    /// Projection for the persistence boundary.
    pub fn convert(&self, id: CellId) -> LocationContainer {
        LocationContainer {
            id,
            center: self.center(),
            voxels: self.voxels.iter().copied().collect(),
            regions: self.regions.as_ref().map(|regions| {
                regions
                    .iter()
                    .map(|(&region, sub)| (region, sub.voxels.iter().copied().collect()))
                    .collect()
            }),
        }
    }
}

/// Serialized form of a location: id, centroid, ordered voxels and, for
/// region-aware locations, the voxels of every region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationContainer {
    pub id: CellId,
    pub center: Option<Voxel>,
    pub voxels: Vec<Voxel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<BTreeMap<Region, Vec<Voxel>>>,
}

impl LocationContainer {
    /// Rebuild the location this container was projected from.
    ///
    /// Voxels not listed under any region land in the default region.
    pub fn into_location(&self, geometry: Geometry) -> Result<Location, PottsError> {
        let all: BTreeSet<Voxel> = self.voxels.iter().copied().collect();
        if all.len() != self.voxels.len() {
            return Err(PottsError::InvalidContainer(format!(
                "cell {} lists duplicate voxels",
                self.id
            )));
        }

        let Some(regions) = &self.regions else {
            return Ok(Location::from_voxels(geometry, all));
        };

        let mut assigned: BTreeMap<Voxel, Region> = BTreeMap::new();
        for (&region, voxels) in regions {
            for &v in voxels {
                if !all.contains(&v) {
                    return Err(PottsError::InvalidContainer(format!(
                        "cell {} {} region voxel {} is not a cell voxel",
                        self.id, region, v
                    )));
                }
                if assigned.insert(v, region).is_some() {
                    return Err(PottsError::InvalidContainer(format!(
                        "cell {} voxel {} is listed in two regions",
                        self.id, v
                    )));
                }
            }
        }

        let mut location = Location::with_regions(geometry);
        if let Some(subs) = location.regions.as_mut() {
            for &region in regions.keys() {
                subs.entry(region).or_insert_with(|| Location::new(geometry));
            }
        }
        for v in all {
            location.add_to(assigned.get(&v).copied().unwrap_or(Region::Default), v);
        }
        Ok(location)
    }
}
