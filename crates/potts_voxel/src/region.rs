//! Sub-cellular region tags.

use serde::{Deserialize, Serialize};

/// Named sub-partition of a location's voxels.
///
/// Ordering follows the lattice tag, so maps keyed by region iterate
/// `Default` first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum Region {
  /// Holds every voxel not claimed by another region (cytoplasm).
  Default,
  Nucleus,
}

impl Region {
  pub const ALL: [Region; 2] = [Region::Default, Region::Nucleus];

  /// Value written into the lattice region array (0 = no region).
  pub const fn tag(self) -> i32 {
    match self {
      Region::Default => 1,
      Region::Nucleus => 2,
    }
  }

  /// Region for a lattice tag, or None for 0 and unknown tags.
  pub fn from_tag(tag: i32) -> Option<Self> {
    Self::ALL.into_iter().find(|region| region.tag() == tag)
  }
}
