//! Sub-cellular regions.
//!
//! Region-aware cells partition their voxels into compartments. On the
//! lattice a region is stored as a small negative tag next to the cell id;
//! tag 0 means the voxel carries no region.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A compartment inside a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Cytoplasm; every voxel not claimed by another region.
    Default,
    Nucleus,
}

/// Lattice tag for voxels without a region.
pub const NO_TAG: i8 = 0;

impl Region {
    pub const ALL: [Region; 2] = [Region::Default, Region::Nucleus];

    /// Lattice tag code.
    #[inline]
    pub fn code(self) -> i8 {
        match self {
            Region::Default => -1,
            Region::Nucleus => -2,
        }
    }

    /// Region for a lattice tag, `None` for [`NO_TAG`] or unknown codes.
    #[inline]
    pub fn from_code(code: i8) -> Option<Region> {
        match code {
            -1 => Some(Region::Default),
            -2 => Some(Region::Nucleus),
            _ => None,
        }
    }

    /// The default region plays the role of background inside a cell.
    #[inline]
    pub fn is_background(self) -> bool {
        self == Region::Default
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Default => write!(f, "default"),
            Region::Nucleus => write!(f, "nucleus"),
        }
    }
}
