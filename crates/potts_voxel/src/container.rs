//! Serialization boundary for locations.
//!
//! A container carries an id, a representative center and the voxel list,
//! plus per-region voxel lists for regioned locations. Factory-made
//! containers hold candidate neighborhoods instead (regions then overlap the
//! main list); converted locations hold an exact partition.

use serde::{Deserialize, Serialize};

use crate::config::LocationConfig;
use crate::geometry::Geometry;
use crate::location::Location;
use crate::region::Region;
use crate::regions::RegionedLocation;
use crate::voxel::Voxel;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationContainer {
  pub id: i32,
  pub center: Voxel,
  pub voxels: Vec<Voxel>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub regions: Option<Vec<(Region, Vec<Voxel>)>>,
}

impl LocationContainer {
  pub fn new(id: i32, center: Voxel, voxels: Vec<Voxel>) -> Self {
    Self {
      id,
      center,
      voxels,
      regions: None,
    }
  }

  pub fn with_regions(mut self, regions: Vec<(Region, Vec<Voxel>)>) -> Self {
    self.regions = Some(regions);
    self
  }

  /// Voxel list stored for a region, if any.
  pub fn region_voxels(&self, region: Region) -> Option<&[Voxel]> {
    self
      .regions
      .as_ref()?
      .iter()
      .find(|(r, _)| *r == region)
      .map(|(_, voxels)| voxels.as_slice())
  }

  /// Rebuild a plain location from the voxel list.
  pub fn to_location<G: Geometry>(&self, geometry: G, config: LocationConfig) -> Location<G> {
    Location::with_config(geometry, config, self.voxels.iter().copied())
  }

  /// Rebuild a regioned location. Region lists are applied in order; main
  /// voxels not named by any region stay in the default region.
  pub fn to_regioned_location<G: Geometry>(
    &self,
    geometry: G,
    config: LocationConfig,
  ) -> RegionedLocation<G> {
    let mut location = RegionedLocation::with_config(geometry, config, self.voxels.iter().copied());
    for (region, voxels) in self.regions.iter().flatten() {
      location.register(*region);
      for voxel in voxels {
        location.claim(*region, *voxel);
      }
    }
    location
  }
}

#[cfg(test)]
#[path = "container_test.rs"]
mod container_test;
