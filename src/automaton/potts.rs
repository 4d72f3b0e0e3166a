//! The Potts engine: lattice, cells and their life cycle.
//!
//! [`Potts`] owns the lattice and every cell. All mutation of either goes
//! through its methods, so the lattice and the cell locations always agree.
//! Stepping lives in [`stepping`](super::stepping).

use log::info;
use rand::Rng;
use rayon::prelude::*;

use super::cell::{CellParams, PottsCell};
use super::geometry::Geometry;
use super::hamiltonian::CellTable;
use super::location::Location;
use super::region::{Region, NO_TAG};
use super::voxel::Voxel;
use super::{CellId, MEDIUM};
use crate::config::PottsConfig;
use crate::error::PottsError;
use crate::state::Lattice;

pub struct Potts {
    pub(crate) config: PottsConfig,
    pub(crate) lattice: Lattice,
    pub(crate) cells: CellTable,
    next_id: CellId,
    pub(crate) tick: u64,
    /// Rayon thread pool for the audit.
    pool: rayon::ThreadPool,
}

/// Lattice tag for a member voxel of `location`.
#[inline]
pub(crate) fn tag_for(location: &Location, v: Voxel) -> i8 {
    location.region_of(v).map_or(NO_TAG, Region::code)
}

impl Potts {
    /// Create an engine with an all-medium lattice.
    pub fn new(config: PottsConfig) -> Result<Self, PottsError> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.audit_threads)
            .build()
            .map_err(|e| PottsError::config(format!("cannot build audit pool: {}", e)))?;

        let lattice = Lattice::new(config.width, config.height, config.depth);
        info!(
            "potts lattice {}x{}x{} ({:?}) at temperature {}",
            config.width,
            config.height,
            config.depth,
            lattice.geometry(),
            config.temperature
        );

        Ok(Potts {
            config,
            lattice,
            cells: CellTable::new(),
            next_id: 1,
            tick: 0,
            pool,
        })
    }

    #[inline]
    pub fn config(&self) -> &PottsConfig {
        &self.config
    }

    #[inline]
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    #[inline]
    pub fn cells(&self) -> &CellTable {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, id: CellId) -> Option<&PottsCell> {
        self.cells.get(&id)
    }

    /// Number of completed ticks.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.lattice.geometry()
    }

    /// Place a cell with a caller-chosen id.
    ///
    /// The location's region mode is made to follow `params`: region-aware
    /// parameters get a region-aware location (unassigned voxels in the
    /// default region), plain parameters a plain one.
    pub fn place_cell(
        &mut self,
        id: CellId,
        params: CellParams,
        location: Location,
    ) -> Result<(), PottsError> {
        if id == MEDIUM {
            return Err(PottsError::config("cell id 0 is reserved for the medium"));
        }
        if self.cells.contains_key(&id) {
            return Err(PottsError::config(format!("cell id {} is already in use", id)));
        }
        if location.geometry() != self.geometry() {
            return Err(PottsError::config(format!(
                "location is {:?} but the lattice is {:?}",
                location.geometry(),
                self.geometry()
            )));
        }
        for &v in location.voxels() {
            match self.lattice.id(v) {
                None => return Err(PottsError::OutOfBounds(v)),
                Some(MEDIUM) => {}
                Some(owner) => return Err(PottsError::Occupied { voxel: v, id: owner }),
            }
        }

        let location = match (params.has_regions(), location.has_regions()) {
            (true, false) => {
                let mut upgraded = Location::with_regions(location.geometry());
                for &v in location.voxels() {
                    upgraded.add(v);
                }
                upgraded
            }
            (false, true) => {
                Location::from_voxels(location.geometry(), location.voxels().iter().copied())
            }
            _ => location,
        };

        for &v in location.voxels() {
            self.lattice.set(v, id, tag_for(&location, v));
        }
        self.cells.insert(id, PottsCell { id, params, location });
        self.next_id = self.next_id.max(id + 1);
        Ok(())
    }

    /// Place a new cell over `voxels` and return its id.
    ///
    /// For region-aware parameters every non-default region is formed
    /// around the centre with its target volume.
    pub fn add_cell<I>(&mut self, params: CellParams, voxels: I) -> Result<CellId, PottsError>
    where
        I: IntoIterator<Item = Voxel>,
    {
        let geometry = self.geometry();
        let mut location = if params.has_regions() {
            Location::with_regions(geometry)
        } else {
            Location::new(geometry)
        };
        for v in voxels {
            location.add(v);
        }
        for (&region, region_params) in &params.regions {
            if region != Region::Default {
                let volume = region_params.target_volume.max(0.0).round() as usize;
                location.assign_region(region, volume);
            }
        }

        let id = self.next_id;
        self.place_cell(id, params, location)?;
        Ok(id)
    }

    /// Remove a cell; its voxels return to the medium.
    pub fn remove_cell(&mut self, id: CellId) -> Result<PottsCell, PottsError> {
        let cell = self.cells.remove(&id).ok_or(PottsError::UnknownCell(id))?;
        for &v in cell.location.voxels() {
            self.lattice.set(v, MEDIUM, NO_TAG);
        }
        Ok(cell)
    }

    /// Replace a cell's critical volume and surface.
    pub fn set_targets(
        &mut self,
        id: CellId,
        target_volume: f64,
        target_surface: f64,
    ) -> Result<(), PottsError> {
        let cell = self.cells.get_mut(&id).ok_or(PottsError::UnknownCell(id))?;
        cell.set_targets(target_volume, target_surface);
        Ok(())
    }

    /// Divide a cell in two and return the daughter's id.
    ///
    /// The daughter copies the parent's parameters. Each non-default region
    /// is re-formed in both halves with half the parent's region volume.
    pub fn divide<R: Rng + ?Sized>(
        &mut self,
        id: CellId,
        rng: &mut R,
    ) -> Result<CellId, PottsError> {
        let daughter_id = self.next_id;
        let parent = self.cells.get_mut(&id).ok_or(PottsError::UnknownCell(id))?;
        if parent.location.volume() < 2 {
            return Err(PottsError::Indivisible(id));
        }

        let region_volumes: Vec<(Region, i64)> = parent
            .location
            .regions()
            .filter(|&(region, _)| region != Region::Default)
            .map(|(region, sub)| (region, sub.volume()))
            .collect();

        let original = parent.location.clone();
        let mut daughter = parent.location.split(rng);
        if daughter.is_empty() || parent.location.is_empty() {
            parent.location = original;
            return Err(PottsError::Indivisible(id));
        }
        for &(region, volume) in &region_volumes {
            let volume = volume.max(0) as usize;
            parent.location.assign_region(region, volume - volume / 2);
            daughter.assign_region(region, volume / 2);
        }

        let params = parent.params.clone();
        for &v in parent.location.voxels() {
            self.lattice.set_tag(v, tag_for(&parent.location, v));
        }
        for &v in daughter.voxels() {
            self.lattice.set(v, daughter_id, tag_for(&daughter, v));
        }

        info!(
            "cell {} divided into {} ({} voxels) and {} ({} voxels)",
            id,
            id,
            parent.location.volume(),
            daughter_id,
            daughter.volume()
        );

        self.cells.insert(
            daughter_id,
            PottsCell {
                id: daughter_id,
                params,
                location: daughter,
            },
        );
        self.next_id = daughter_id + 1;
        Ok(daughter_id)
    }

    /// Re-derive every piece of bookkeeping and compare.
    ///
    /// Checks each cell's counters against a recount, that each cell voxel
    /// carries the cell's id and region tag, and that each labelled lattice
    /// site belongs to the location of its cell. Runs on the audit pool.
    pub fn audit(&self) -> Result<(), PottsError> {
        let lattice = &self.lattice;
        let cells = &self.cells;

        self.pool.install(|| {
            cells.par_iter().try_for_each(|(&id, cell)| {
                if cell.id != id {
                    return Err(PottsError::internal(format!(
                        "cell stored under {} reports id {}",
                        id, cell.id
                    )));
                }
                cell.location.check()?;
                for &v in cell.location.voxels() {
                    let found = (lattice.id(v), lattice.tag(v));
                    let expected = (Some(id), Some(tag_for(&cell.location, v)));
                    if found != expected {
                        return Err(PottsError::internal(format!(
                            "voxel {} of cell {} is labelled {:?} on the lattice",
                            v, id, found
                        )));
                    }
                }
                Ok(())
            })?;

            lattice
                .ids()
                .par_iter()
                .enumerate()
                .try_for_each(|(idx, &id)| {
                    if id == MEDIUM {
                        return Ok(());
                    }
                    let v = lattice.voxel_at(idx);
                    match cells.get(&id) {
                        None => Err(PottsError::internal(format!(
                            "lattice voxel {} points to missing cell {}",
                            v, id
                        ))),
                        Some(cell) if !cell.location.contains(v) => Err(PottsError::internal(
                            format!("lattice voxel {} is not in the location of cell {}", v, id),
                        )),
                        Some(_) => Ok(()),
                    }
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::cell::RegionParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn engine(width: i32, height: i32, depth: i32) -> Potts {
        Potts::new(PottsConfig::new(width, height, depth)).unwrap()
    }

    fn block(x0: i32, y0: i32, w: i32, h: i32) -> Vec<Voxel> {
        let mut out = Vec::new();
        for x in x0..x0 + w {
            for y in y0..y0 + h {
                out.push(Voxel::new(x, y, 0));
            }
        }
        out
    }

    fn nucleated() -> CellParams {
        let nucleus = RegionParams {
            target_volume: 4.0,
            ..RegionParams::default()
        };
        CellParams::new(1, 36.0, 24.0)
            .with_region(Region::Default, RegionParams::default())
            .with_region(Region::Nucleus, nucleus)
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(Potts::new(PottsConfig::new(0, 4, 1)).is_err());
    }

    #[test]
    fn test_add_cell_labels_lattice() {
        let mut potts = engine(10, 10, 1);
        let id = potts.add_cell(CellParams::new(1, 4.0, 8.0), block(2, 2, 2, 2)).unwrap();
        assert_eq!(id, 1);
        assert_eq!(potts.lattice().count(1), 4);
        assert_eq!(potts.lattice().tag(Voxel::new(2, 2, 0)), Some(NO_TAG));
        assert_eq!(potts.cell(1).unwrap().location.surface(), 8);

        let second = potts.add_cell(CellParams::new(1, 4.0, 8.0), block(5, 5, 1, 1)).unwrap();
        assert_eq!(second, 2);
        potts.audit().unwrap();
    }

    #[test]
    fn test_add_cell_rejects_conflicts() {
        let mut potts = engine(6, 6, 1);
        potts.add_cell(CellParams::new(1, 4.0, 8.0), block(0, 0, 2, 2)).unwrap();

        let err = potts
            .add_cell(CellParams::new(1, 4.0, 8.0), block(1, 1, 2, 2))
            .unwrap_err();
        assert!(matches!(err, PottsError::Occupied { id: 1, .. }));

        let err = potts
            .add_cell(CellParams::new(1, 4.0, 8.0), [Voxel::new(6, 0, 0)])
            .unwrap_err();
        assert!(matches!(err, PottsError::OutOfBounds(_)));

        // Nothing was written by the failed placements
        assert_eq!(potts.lattice().count(MEDIUM), 32);
        potts.audit().unwrap();
    }

    #[test]
    fn test_place_cell_checks_id() {
        let mut potts = engine(6, 6, 1);
        let location = Location::from_voxels(Geometry::Grid2D, block(0, 0, 1, 1));
        assert!(potts.place_cell(MEDIUM, CellParams::new(1, 1.0, 4.0), location.clone()).is_err());
        potts.place_cell(7, CellParams::new(1, 1.0, 4.0), location.clone()).unwrap();
        assert!(potts.place_cell(7, CellParams::new(1, 1.0, 4.0), location).is_err());
        // Ids continue after the largest placed id
        let next = potts.add_cell(CellParams::new(1, 1.0, 4.0), block(3, 3, 1, 1)).unwrap();
        assert_eq!(next, 8);
    }

    #[test]
    fn test_add_region_cell_forms_nucleus() {
        let mut potts = engine(10, 10, 1);
        let id = potts.add_cell(nucleated(), block(2, 2, 5, 5)).unwrap();
        let cell = potts.cell(id).unwrap();
        assert_eq!(cell.location.region_volume(Region::Nucleus), 4);
        assert_eq!(cell.location.region_volume(Region::Default), 21);
        assert_eq!(potts.lattice().tag(Voxel::new(4, 4, 0)), Some(Region::Nucleus.code()));
        potts.audit().unwrap();
    }

    #[test]
    fn test_remove_cell_returns_voxels_to_medium() {
        let mut potts = engine(8, 8, 1);
        let id = potts.add_cell(nucleated(), block(1, 1, 4, 4)).unwrap();
        let cell = potts.remove_cell(id).unwrap();
        assert_eq!(cell.location.volume(), 16);
        assert_eq!(potts.lattice().count(MEDIUM), 64);
        assert!(potts.lattice().tags().iter().all(|&t| t == NO_TAG));
        assert!(matches!(potts.remove_cell(id), Err(PottsError::UnknownCell(_))));
    }

    #[test]
    fn test_set_targets() {
        let mut potts = engine(8, 8, 1);
        let id = potts.add_cell(CellParams::new(1, 4.0, 8.0), block(1, 1, 2, 2)).unwrap();
        potts.set_targets(id, 8.0, 12.0).unwrap();
        assert_eq!(potts.cell(id).unwrap().params.target_volume, 8.0);
        assert!(potts.set_targets(99, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_divide_conserves_voxels() {
        let mut potts = engine(12, 12, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let id = potts.add_cell(CellParams::new(1, 36.0, 24.0), block(3, 3, 6, 6)).unwrap();

        let daughter = potts.divide(id, &mut rng).unwrap();
        let a = potts.cell(id).unwrap().location.volume();
        let b = potts.cell(daughter).unwrap().location.volume();
        assert_eq!(a + b, 36);
        assert!((a - b).abs() <= 2);
        assert_eq!(potts.lattice().count(daughter) as i64, b);
        potts.audit().unwrap();
    }

    #[test]
    fn test_divide_splits_regions() {
        let mut potts = engine(12, 12, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let id = potts.add_cell(nucleated(), block(3, 3, 6, 6)).unwrap();

        let daughter = potts.divide(id, &mut rng).unwrap();
        let parent = &potts.cell(id).unwrap().location;
        let child = &potts.cell(daughter).unwrap().location;
        assert_eq!(parent.region_volume(Region::Nucleus), 2);
        assert_eq!(child.region_volume(Region::Nucleus), 2);
        potts.audit().unwrap();
    }

    #[test]
    fn test_divide_errors() {
        let mut potts = engine(6, 6, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let id = potts.add_cell(CellParams::new(1, 1.0, 4.0), block(0, 0, 1, 1)).unwrap();
        assert!(matches!(potts.divide(id, &mut rng), Err(PottsError::Indivisible(_))));
        assert!(matches!(potts.divide(42, &mut rng), Err(PottsError::UnknownCell(42))));
    }

    #[test]
    fn test_audit_detects_stray_label() {
        let mut potts = engine(6, 6, 1);
        potts.add_cell(CellParams::new(1, 4.0, 8.0), block(0, 0, 2, 2)).unwrap();
        potts.lattice.set(Voxel::new(5, 5, 0), 1, NO_TAG);
        assert!(potts.audit().unwrap_err().is_internal());

        potts.lattice.set(Voxel::new(5, 5, 0), 9, NO_TAG);
        assert!(potts.audit().unwrap_err().is_internal());
    }

    #[test]
    fn test_audit_detects_counter_drift() {
        let mut potts = engine(6, 6, 1);
        let id = potts.add_cell(CellParams::new(1, 4.0, 8.0), block(0, 0, 2, 2)).unwrap();
        // Location gains a voxel the lattice never saw
        if let Some(cell) = potts.cells.get_mut(&id) {
            cell.location.add(Voxel::new(2, 0, 0));
        }
        assert!(potts.audit().unwrap_err().is_internal());
    }
}
