//! Engine configuration.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::automaton::geometry::Geometry;
use crate::error::PottsError;

/// Lattice size, temperature and run controls.
///
/// A depth of 1 selects the 2-D geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PottsConfig {
    pub width: i32,
    pub height: i32,
    pub depth: i32,
    /// Metropolis temperature; 0 accepts only non-positive energy changes.
    pub temperature: f64,
    /// Monte Carlo steps per tick. Each step is one proposal per lattice site.
    pub mcs: f64,
    /// Seed for the shared generator built by [`PottsConfig::rng`].
    pub seed: u64,
    /// Run the full invariant audit at the start of every tick.
    pub audit_each_tick: bool,
    /// Worker threads for the audit pool.
    pub audit_threads: usize,
}

impl Default for PottsConfig {
    fn default() -> Self {
        PottsConfig {
            width: 100,
            height: 100,
            depth: 1,
            temperature: 10.0,
            mcs: 1.0,
            seed: 0,
            audit_each_tick: false,
            audit_threads: 1,
        }
    }
}

impl PottsConfig {
    /// Default configuration for a lattice of the given size.
    pub fn new(width: i32, height: i32, depth: i32) -> Self {
        PottsConfig {
            width,
            height,
            depth,
            ..PottsConfig::default()
        }
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, PottsError> {
        let config: PottsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PottsError> {
        if self.width <= 0 || self.height <= 0 || self.depth <= 0 {
            return Err(PottsError::config(format!(
                "lattice dimensions must be positive, got {}x{}x{}",
                self.width, self.height, self.depth
            )));
        }
        if (self.width as u64) * (self.height as u64) * (self.depth as u64) > u32::MAX as u64 {
            return Err(PottsError::config("lattice has too many sites"));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(PottsError::config(format!(
                "temperature must be finite and non-negative, got {}",
                self.temperature
            )));
        }
        if !self.mcs.is_finite() || self.mcs <= 0.0 {
            return Err(PottsError::config(format!(
                "mcs must be finite and positive, got {}",
                self.mcs
            )));
        }
        if self.audit_threads == 0 {
            return Err(PottsError::config("audit_threads must be at least 1"));
        }
        Ok(())
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        Geometry::for_depth(self.depth)
    }

    /// Fresh generator seeded from `seed`.
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }
}
