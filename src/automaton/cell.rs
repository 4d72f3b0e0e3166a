//! Cells and their energy parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::location::Location;
use super::region::Region;
use super::CellId;

/// Energy parameters of one region inside a cell.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionParams {
    pub target_volume: f64,
    pub target_surface: f64,
    pub lambda_volume: f64,
    pub lambda_surface: f64,
    /// Contact energy with other regions of the same cell.
    pub adhesion: BTreeMap<Region, f64>,
}

impl RegionParams {
    /// Stored contact coefficient toward `other`; missing entries are 0.
    #[inline]
    pub fn adhesion_to(&self, other: Region) -> f64 {
        self.adhesion.get(&other).copied().unwrap_or(0.0)
    }
}

/// Energy parameters shared by every cell of a population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellParams {
    /// Population identifier, 1-based; 0 is reserved for the medium.
    pub population: usize,
    pub target_volume: f64,
    pub target_surface: f64,
    #[serde(default)]
    pub lambda_volume: f64,
    #[serde(default)]
    pub lambda_surface: f64,
    /// Contact energy indexed by population id; entry 0 is the medium.
    #[serde(default)]
    pub adhesion: Vec<f64>,
    /// Per-region parameters; non-empty marks the cell as region-aware.
    #[serde(default)]
    pub regions: BTreeMap<Region, RegionParams>,
}

impl CellParams {
    pub fn new(population: usize, target_volume: f64, target_surface: f64) -> Self {
        CellParams {
            population,
            target_volume,
            target_surface,
            lambda_volume: 0.0,
            lambda_surface: 0.0,
            adhesion: Vec::new(),
            regions: BTreeMap::new(),
        }
    }

    pub fn with_lambdas(mut self, lambda_volume: f64, lambda_surface: f64) -> Self {
        self.lambda_volume = lambda_volume;
        self.lambda_surface = lambda_surface;
        self
    }

    pub fn with_adhesion(mut self, adhesion: Vec<f64>) -> Self {
        self.adhesion = adhesion;
        self
    }

    pub fn with_region(mut self, region: Region, params: RegionParams) -> Self {
        self.regions.insert(region, params);
        self
    }

    /// Stored contact coefficient toward a population; missing entries are 0.
    #[inline]
    pub fn adhesion_to(&self, population: usize) -> f64 {
        self.adhesion.get(population).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn has_regions(&self) -> bool {
        !self.regions.is_empty()
    }
}

/// A cell on the lattice: identity, parameters and spatial extent.
#[derive(Clone, Debug)]
pub struct PottsCell {
    pub id: CellId,
    pub params: CellParams,
    pub location: Location,
}

impl PottsCell {
    #[inline]
    pub fn has_regions(&self) -> bool {
        self.location.has_regions()
    }

    /// Replace the critical volume and surface.
    pub fn set_targets(&mut self, target_volume: f64, target_surface: f64) {
        self.params.target_volume = target_volume;
        self.params.target_surface = target_surface;
    }
}
