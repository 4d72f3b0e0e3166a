//! Metropolis stepping of the Potts lattice.
//!
//! One tick makes `round(mcs * sites)` proposals. Each proposal picks a
//! random site, picks a differing face-neighbor label as target, checks
//! connectivity of every affected label, scores the flip and accepts it by
//! the Metropolis rule.

use log::debug;
use rand::Rng;

use super::connectivity::is_connected;
use super::geometry::Geometry;
use super::grid::{neighborhood, unique_neighbor_ids, unique_neighbor_regions};
use super::hamiltonian::{self, CellTable};
use super::potts::Potts;
use super::region::{Region, NO_TAG};
use super::voxel::Voxel;
use super::{CellId, MEDIUM};
use crate::error::PottsError;

/// Result of a single flip proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    /// The flip would break the connectivity of a cell or region.
    RejectedTopology,
    /// The Metropolis rule declined the energy change.
    RejectedEnergy,
}

/// Proposal counts for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    pub proposals: u64,
    /// Sites with no differing neighbor; nothing to flip.
    pub interior: u64,
    pub accepted: u64,
    pub rejected_topology: u64,
    pub rejected_energy: u64,
}

impl StepStats {
    fn record(&mut self, outcome: Option<Outcome>) {
        self.proposals += 1;
        match outcome {
            None => self.interior += 1,
            Some(Outcome::Accepted) => self.accepted += 1,
            Some(Outcome::RejectedTopology) => self.rejected_topology += 1,
            Some(Outcome::RejectedEnergy) => self.rejected_energy += 1,
        }
    }
}

/// Metropolis acceptance for energy change `delta` with uniform draw `r`
/// in `[0, 1)`. Non-positive changes always pass; at temperature 0 every
/// positive change fails.
#[inline]
pub fn metropolis(delta: f64, temperature: f64, r: f64) -> bool {
    if delta <= 0.0 {
        return true;
    }
    if temperature <= 0.0 {
        return false;
    }
    r < (-delta / temperature).exp()
}

impl Potts {
    /// Run one tick (Monte Carlo step) and return its proposal counts.
    ///
    /// Draw order per proposal: x, y, z (3-D only), the acceptance uniform,
    /// then the target index when the site has a target.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<StepStats, PottsError> {
        if self.config.audit_each_tick {
            self.audit()?;
        }

        let geometry = self.geometry();
        let proposals = (self.config.mcs * self.lattice.len() as f64).round() as u64;
        let mut stats = StepStats::default();

        for _ in 0..proposals {
            let x = rng.gen_range(0..self.lattice.width);
            let y = rng.gen_range(0..self.lattice.height);
            let z = match geometry {
                Geometry::Grid3D => rng.gen_range(0..self.lattice.depth),
                Geometry::Grid2D => 0,
            };
            let r: f64 = rng.gen();
            let outcome = self.propose(Voxel::new(x, y, z), r, rng)?;
            stats.record(outcome);
        }

        self.tick += 1;
        debug!(
            "tick {}: {} proposals, {} accepted, {} rejected by topology, {} by energy, \
             {} interior",
            self.tick,
            stats.proposals,
            stats.accepted,
            stats.rejected_topology,
            stats.rejected_energy,
            stats.interior
        );
        Ok(stats)
    }

    /// Pick a target for `v` and try the flip. `None` if `v` has no target.
    fn propose<R: Rng + ?Sized>(
        &mut self,
        v: Voxel,
        r: f64,
        rng: &mut R,
    ) -> Result<Option<Outcome>, PottsError> {
        let geometry = self.geometry();
        let source = self
            .lattice
            .id(v)
            .ok_or_else(|| {
                PottsError::internal(format!("proposal site {} is off the lattice", v))
            })?;

        let targets = unique_neighbor_ids(&self.lattice, geometry, v);
        if !targets.is_empty() {
            let target = targets[rng.gen_range(0..targets.len())];
            return self.change(source, target, v, r).map(Some);
        }

        let region_aware = self.cells.get(&source).map_or(false, |c| c.has_regions());
        if !region_aware {
            return Ok(None);
        }

        let regions = unique_neighbor_regions(&self.lattice, geometry, v);
        if regions.is_empty() {
            return Ok(None);
        }
        let target = regions[rng.gen_range(0..regions.len())];
        let current = self.region_at(v)?;
        self.change_region(source, current, target, v, r).map(Some)
    }

    /// Region of a region-aware cell's voxel, from its lattice tag.
    fn region_at(&self, v: Voxel) -> Result<Region, PottsError> {
        self.lattice
            .tag(v)
            .and_then(Region::from_code)
            .ok_or_else(|| {
                PottsError::internal(format!(
                    "voxel {} of a region-aware cell has no region tag",
                    v
                ))
            })
    }

    /// True if `v` can change label without breaking `label`'s connectivity.
    fn keeps_connected<F>(&self, v: Voxel, background: bool, same: F) -> bool
    where
        F: FnMut(CellId, i8) -> bool,
    {
        let geometry = self.geometry();
        let mask = neighborhood(&self.lattice, geometry, v, same);
        is_connected(geometry, mask, background)
    }

    /// Try to relabel `v` from cell `source` to cell `target` with
    /// acceptance uniform `r`.
    ///
    /// Both labels are checked for connectivity (the medium is never
    /// checked), then the energy change is scored and the Metropolis rule
    /// applied. Accepted flips are committed to the lattice and to both
    /// locations.
    pub fn change(
        &mut self,
        source: CellId,
        target: CellId,
        v: Voxel,
        r: f64,
    ) -> Result<Outcome, PottsError> {
        if self.lattice.id(v) != Some(source) {
            return Err(PottsError::internal(format!(
                "proposal source {} does not own {} (lattice has {:?})",
                source,
                v,
                self.lattice.id(v)
            )));
        }
        if source == target {
            return Err(PottsError::internal(format!(
                "proposal at {} has identical source and target {}",
                v, source
            )));
        }

        if source != MEDIUM {
            let cell = self.cells.get(&source).ok_or_else(|| {
                PottsError::internal(format!(
                    "lattice voxel {} points to missing cell {}",
                    v, source
                ))
            })?;
            if !self.keeps_connected(v, false, |id, _| id == source) {
                return Ok(Outcome::RejectedTopology);
            }
            if cell.has_regions() {
                let region = self.region_at(v)?;
                let code = region.code();
                let background = region.is_background();
                if !self.keeps_connected(v, background, |id, tag| id == source && tag == code) {
                    return Ok(Outcome::RejectedTopology);
                }
            }
        }

        let target_regions = if target != MEDIUM {
            let cell = self
                .cells
                .get(&target)
                .ok_or_else(|| {
                    PottsError::internal(format!("target cell {} does not exist", target))
                })?;
            if !self.keeps_connected(v, false, |id, _| id == target) {
                return Ok(Outcome::RejectedTopology);
            }
            if cell.has_regions() {
                let code = Region::Default.code();
                if !self.keeps_connected(v, true, |id, tag| id == target && tag == code) {
                    return Ok(Outcome::RejectedTopology);
                }
            }
            cell.has_regions()
        } else {
            false
        };

        let delta = hamiltonian::delta(&self.lattice, &self.cells, source, target, v);
        if !metropolis(delta, self.config.temperature, r) {
            return Ok(Outcome::RejectedEnergy);
        }

        let held = |cells: &CellTable, id: CellId| {
            cells.get(&id).map_or(false, |c| c.location.contains(v))
        };
        if source != MEDIUM && !held(&self.cells, source) {
            return Err(PottsError::internal(format!(
                "cell {} did not hold voxel {}",
                source, v
            )));
        }
        if target != MEDIUM && held(&self.cells, target) {
            return Err(PottsError::internal(format!(
                "cell {} already held voxel {}",
                target, v
            )));
        }

        let tag = if target_regions {
            Region::Default.code()
        } else {
            NO_TAG
        };
        self.lattice.set(v, target, tag);
        if let Some(cell) = self.cells.get_mut(&source) {
            cell.location.remove(v);
        }
        if let Some(cell) = self.cells.get_mut(&target) {
            cell.location.add(v);
        }

        Ok(Outcome::Accepted)
    }

    /// Try to move `v` between two regions of cell `id` with acceptance
    /// uniform `r`. The cell's own volume and surface do not change.
    pub fn change_region(
        &mut self,
        id: CellId,
        source: Region,
        target: Region,
        v: Voxel,
        r: f64,
    ) -> Result<Outcome, PottsError> {
        if self.lattice.id(v) != Some(id) || self.lattice.tag(v) != Some(source.code()) {
            return Err(PottsError::internal(format!(
                "region proposal expects cell {} {} at {}, lattice has {:?}/{:?}",
                id,
                source,
                v,
                self.lattice.id(v),
                self.lattice.tag(v)
            )));
        }
        if source == target {
            return Err(PottsError::internal(format!(
                "region proposal at {} has identical source and target {}",
                v, source
            )));
        }

        let (source_code, target_code) = (source.code(), target.code());
        let in_source = |i: CellId, tag: i8| i == id && tag == source_code;
        if !self.keeps_connected(v, source.is_background(), in_source) {
            return Ok(Outcome::RejectedTopology);
        }
        let in_target = |i: CellId, tag: i8| i == id && tag == target_code;
        if !self.keeps_connected(v, target.is_background(), in_target) {
            return Ok(Outcome::RejectedTopology);
        }

        let cell = self
            .cells
            .get(&id)
            .ok_or_else(|| {
                PottsError::internal(format!(
                    "lattice voxel {} points to missing cell {}",
                    v, id
                ))
            })?;
        let delta = hamiltonian::region_delta(&self.lattice, cell, source, target, v);
        if !metropolis(delta, self.config.temperature, r) {
            return Ok(Outcome::RejectedEnergy);
        }

        self.lattice.set_tag(v, target_code);
        let moved = self
            .cells
            .get_mut(&id)
            .map_or(false, |cell| cell.location.retag(v, target));
        if !moved {
            return Err(PottsError::internal(format!(
                "cell {} could not move voxel {} from {} to {}",
                id, v, source, target
            )));
        }

        Ok(Outcome::Accepted)
    }
}
