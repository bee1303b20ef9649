//! LocationFactory - initial, non-overlapping cell placement.
//!
//! The lattice is tiled into equal boxes sized from the largest population
//! so that every box can hold any cell. Each box becomes a container whose
//! voxel list is the candidate neighborhood; a container is then realized
//! to a concrete location of the requested volume.
//!
//! ```text
//! margin+1
//!   |<-side->|<-side->|<-side->|
//!   +--------+--------+--------+
//!   |   c1   |   c2   |   c3   |   c = tile center
//!   +--------+--------+--------+   regions: (side - 2) box around c
//! ```
//!
//! Sizing:
//!
//! ```text
//! convert(v, h) = odd(ceil(sqrt(v / h)))
//! height_range  = max over populations of geometry.height_range(H, critical_height)
//! side_range    = max over populations of convert(2 * critical_volume, height_range) + padding
//! ```

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::LocationConfig;
use crate::connectivity::check_voxels;
use crate::container::LocationContainer;
use crate::geometry::Geometry;
use crate::location::Location;
use crate::region::Region;
use crate::regions::RegionedLocation;
use crate::selection::{decrease, get_selected, increase};
use crate::voxel::Voxel;
use crate::voxel_set::VoxelSet;

/// Sizing inputs for one cell population.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
  /// Mean critical volume in voxels.
  pub critical_volume: f64,
  /// Mean critical height in voxels (ignored in 2D).
  pub critical_height: f64,
  /// Extra voxels added to the tile side.
  #[serde(default)]
  pub padding: usize,
  /// Fraction of the cell volume held by each region.
  #[serde(default)]
  pub regions: Vec<(Region, f64)>,
}

impl PopulationConfig {
  pub fn new(critical_volume: f64, critical_height: f64) -> Self {
    Self {
      critical_volume,
      critical_height,
      padding: 0,
      regions: Vec::new(),
    }
  }

  pub fn with_padding(mut self, padding: usize) -> Self {
    self.padding = padding;
    self
  }

  pub fn with_region(mut self, region: Region, fraction: f64) -> Self {
    self.regions.push((region, fraction));
    self
  }

  /// Per-region voxel targets for a cell of `volume` voxels.
  pub fn region_targets(&self, volume: usize) -> Vec<(Region, usize)> {
    self
      .regions
      .iter()
      .map(|(region, fraction)| {
        let target = (fraction.max(0.0) * volume as f64).round() as usize;
        (*region, target.min(volume))
      })
      .collect()
  }
}

/// Lattice dimensions and the populations to place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactoryConfig {
  pub length: usize,
  pub width: usize,
  pub height: usize,
  /// Cells left empty on each x/y border (in addition to the 1-voxel rim).
  #[serde(default)]
  pub margin: usize,
  #[serde(default)]
  pub populations: Vec<PopulationConfig>,
}

impl FactoryConfig {
  pub fn new(length: usize, width: usize, height: usize) -> Self {
    Self {
      length,
      width,
      height,
      margin: 0,
      populations: Vec::new(),
    }
  }

  pub fn with_margin(mut self, margin: usize) -> Self {
    self.margin = margin;
    self
  }

  pub fn with_population(mut self, population: PopulationConfig) -> Self {
    self.populations.push(population);
    self
  }
}

/// Builds initial locations for a geometry.
#[derive(Clone, Debug)]
pub struct LocationFactory<G: Geometry> {
  geometry: G,
  config: LocationConfig,
}

impl<G: Geometry> LocationFactory<G> {
  pub fn new(geometry: G) -> Self {
    Self::with_config(geometry, LocationConfig::DEFAULT)
  }

  /// `config` is handed to every location the factory builds.
  pub fn with_config(geometry: G, config: LocationConfig) -> Self {
    Self { geometry, config }
  }

  pub fn geometry(&self) -> &G {
    &self.geometry
  }

  /// Odd side length of a square prism of `height` layers holding `volume`.
  pub fn convert(volume: f64, height: usize) -> usize {
    let side = (volume.max(0.0) / height.max(1) as f64).sqrt().ceil() as usize;
    if side % 2 == 0 {
      side + 1
    } else {
      side
    }
  }

  /// Tile height shared by every population.
  pub fn voxels_per_height(&self, config: &FactoryConfig) -> usize {
    config
      .populations
      .iter()
      .map(|population| {
        self
          .geometry
          .height_range(config.height, population.critical_height)
      })
      .max()
      .unwrap_or(1)
      .max(1)
  }

  /// Tile side shared by every population; 0 without populations.
  pub fn voxels_per_side(&self, config: &FactoryConfig, height_range: usize) -> usize {
    config
      .populations
      .iter()
      .map(|population| {
        Self::convert(2.0 * population.critical_volume, height_range) + population.padding
      })
      .max()
      .unwrap_or(0)
  }

  /// One container per tile, ids from 1, ordered by z layer.
  ///
  /// Returns nothing (and logs) when there are no populations or the
  /// lattice holds no tile.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "factory::create_locations"))]
  pub fn create_locations<R: Rng>(&self, config: &FactoryConfig, rng: &mut R) -> Vec<LocationContainer> {
    let height = self.voxels_per_height(config);
    let side = self.voxels_per_side(config, height);
    if side == 0 {
      #[cfg(feature = "tracing")]
      tracing::debug!(populations = config.populations.len(), "no tile size, nothing created");
      return Vec::new();
    }

    let mut centers = self.geometry.centers(
      config.length,
      config.width,
      config.height,
      config.margin,
      side,
      height,
    );
    if centers.is_empty() {
      #[cfg(feature = "tracing")]
      tracing::debug!(side, height, "lattice holds no tile, nothing created");
      return Vec::new();
    }
    centers.shuffle(rng);
    centers.sort_by_key(|center| center.z);

    let regions: BTreeSet<Region> = config
      .populations
      .iter()
      .flat_map(|population| population.regions.iter().map(|(region, _)| *region))
      .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(count = centers.len(), side, height, regions = regions.len(), "tiles created");

    centers
      .into_iter()
      .zip(1..)
      .map(|(center, id)| {
        let voxels = self.geometry.possible(center, side, height);
        let container = LocationContainer::new(id, center, voxels);
        if regions.is_empty() {
          return container;
        }
        let region_side = side.saturating_sub(2);
        container.with_regions(
          regions
            .iter()
            .map(|region| (*region, self.geometry.possible(center, region_side, height)))
            .collect(),
        )
      })
      .collect()
  }

  /// Rebuild locations from containers, keyed by id.
  pub fn load_locations(
    &self,
    containers: impl IntoIterator<Item = LocationContainer>,
  ) -> BTreeMap<i32, Location<G>> {
    containers
      .into_iter()
      .map(|container| {
        let location = container.to_location(self.geometry.clone(), self.config);
        (container.id, location)
      })
      .collect()
  }

  pub fn load_regioned_locations(
    &self,
    containers: impl IntoIterator<Item = LocationContainer>,
  ) -> BTreeMap<i32, RegionedLocation<G>> {
    containers
      .into_iter()
      .map(|container| {
        let location = container.to_regioned_location(self.geometry.clone(), self.config);
        (container.id, location)
      })
      .collect()
  }

  /// Connected selection of about `target` voxels from `pool`, nearest to
  /// `focus` first.
  fn select<R: Rng>(&self, pool: &[Voxel], focus: Voxel, target: usize, rng: &mut R) -> VoxelSet {
    let candidates: VoxelSet = pool.iter().copied().collect();
    if target >= candidates.len() {
      return candidates;
    }

    let mut selected: VoxelSet = get_selected(pool, focus, target).into_iter().collect();
    while check_voxels(&self.geometry, &mut selected, rng, true).is_some() {}

    if selected.len() < target {
      increase(
        &self.geometry,
        |voxel| candidates.contains(voxel),
        &mut selected,
        target,
        self.config.max_growth_iterations,
        rng,
      );
    } else {
      decrease(&self.geometry, &mut selected, target, rng);
    }
    selected
  }

  /// Location of `target` voxels taken from the container's neighborhood
  /// around its center.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "factory::realize"))]
  pub fn realize<R: Rng>(&self, container: &LocationContainer, target: usize, rng: &mut R) -> Location<G> {
    let voxels = self.select(&container.voxels, container.center, target, rng);
    Location::with_config(self.geometry.clone(), self.config, voxels)
  }

  /// Regioned location of `target` voxels. Each listed region then claims
  /// its target from its own neighborhood (the main one if the container
  /// has none), restricted to voxels still in the default region.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "factory::realize_regioned"))]
  pub fn realize_regioned<R: Rng>(
    &self,
    container: &LocationContainer,
    target: usize,
    region_targets: &[(Region, usize)],
    rng: &mut R,
  ) -> RegionedLocation<G> {
    let voxels = self.select(&container.voxels, container.center, target, rng);
    let mut location = RegionedLocation::with_config(self.geometry.clone(), self.config, voxels);

    for (region, region_target) in region_targets {
      location.register(*region);
      if *region == Region::Default {
        continue;
      }

      let neighborhood = container
        .region_voxels(*region)
        .unwrap_or(container.voxels.as_slice());
      let pool: Vec<Voxel> = neighborhood
        .iter()
        .filter(|voxel| location.region_of(voxel) == Some(Region::Default))
        .copied()
        .collect();
      for voxel in self.select(&pool, container.center, *region_target, rng) {
        location.claim(*region, voxel);
      }
    }

    location
  }
}

#[cfg(test)]
#[path = "factory_test.rs"]
mod factory_test;
