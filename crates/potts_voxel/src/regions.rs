//! RegionedLocation - a location partitioned into sub-cellular regions.
//!
//! The voxel-to-region map is the single source of truth. Each registered
//! region also keeps a nested [`Location`] holding exactly its voxels, so
//! per-region volume, surface, height and centroid stay incremental. Those
//! nested locations are only ever changed through [`RegionedLocation::move_voxel`]
//! and the add/remove paths, which keep them in step with the map.
//!
//! ```text
//! outer:      ##########        assignment: voxel -> Region
//! Default:    ###....###        regions:    Region -> Location (derived)
//! Nucleus:    ...####...
//! ```

use std::collections::{BTreeMap, HashMap};

use glam::DVec3;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::config::LocationConfig;
use crate::connectivity::check_voxels;
use crate::container::LocationContainer;
use crate::error::{LocationError, Result};
use crate::geometry::Geometry;
use crate::lattice::Lattice;
use crate::location::{Location, SplitOptions};
use crate::region::Region;
use crate::selection::{decrease, increase};
use crate::voxel::Voxel;
use crate::voxel_set::VoxelSet;

/// Location whose voxels are partitioned among named regions.
#[derive(Clone, Debug)]
pub struct RegionedLocation<G: Geometry> {
  location: Location<G>,
  assignment: HashMap<Voxel, Region>,
  regions: BTreeMap<Region, Location<G>>,
}

impl<G: Geometry> RegionedLocation<G> {
  /// All voxels start in the default region.
  pub fn new(geometry: G, voxels: impl IntoIterator<Item = Voxel>) -> Self {
    Self::with_config(geometry, LocationConfig::DEFAULT, voxels)
  }

  pub fn with_config(
    geometry: G,
    config: LocationConfig,
    voxels: impl IntoIterator<Item = Voxel>,
  ) -> Self {
    Self::from_location(Location::with_config(geometry, config, voxels))
  }

  /// Wrap a location, placing every voxel in the default region.
  fn from_location(location: Location<G>) -> Self {
    let assignment = location
      .voxels()
      .iter()
      .map(|voxel| (*voxel, Region::Default))
      .collect();
    let default = location.spawn(location.voxels().clone());
    Self {
      location,
      assignment,
      regions: BTreeMap::from([(Region::Default, default)]),
    }
  }

  /// Register an (initially empty) region. No-op if already registered.
  pub fn register(&mut self, region: Region) {
    if !self.regions.contains_key(&region) {
      let empty = self.location.spawn(VoxelSet::new());
      self.regions.insert(region, empty);
    }
  }

  pub fn with_region(mut self, region: Region) -> Self {
    self.register(region);
    self
  }

  /// Registered regions, default first.
  pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
    self.regions.keys().copied()
  }

  pub fn is_registered(&self, region: Region) -> bool {
    self.regions.contains_key(&region)
  }

  fn ensure_registered(&self, region: Region) -> Result<()> {
    if self.is_registered(region) {
      Ok(())
    } else {
      Err(LocationError::UnregisteredRegion(region))
    }
  }

  // =========================================================================
  // Whole-location accessors
  // =========================================================================

  /// The outer location covering every region.
  pub fn location(&self) -> &Location<G> {
    &self.location
  }

  pub fn voxels(&self) -> &VoxelSet {
    self.location.voxels()
  }

  pub fn contains(&self, voxel: &Voxel) -> bool {
    self.location.contains(voxel)
  }

  pub fn volume(&self) -> usize {
    self.location.volume()
  }

  pub fn surface(&self) -> usize {
    self.location.surface()
  }

  pub fn height(&self) -> usize {
    self.location.height()
  }

  pub fn centroid(&self) -> Option<DVec3> {
    self.location.centroid()
  }

  pub fn center(&self) -> Option<Voxel> {
    self.location.center()
  }

  /// Region currently holding a voxel.
  pub fn region_of(&self, voxel: &Voxel) -> Option<Region> {
    self.assignment.get(voxel).copied()
  }

  // =========================================================================
  // Per-region accessors
  // =========================================================================

  /// Nested location holding exactly one region's voxels.
  pub fn region(&self, region: Region) -> Result<&Location<G>> {
    self
      .regions
      .get(&region)
      .ok_or(LocationError::UnregisteredRegion(region))
  }

  pub fn region_volume(&self, region: Region) -> Result<usize> {
    self.region(region).map(Location::volume)
  }

  pub fn region_surface(&self, region: Region) -> Result<usize> {
    self.region(region).map(Location::surface)
  }

  pub fn region_height(&self, region: Region) -> Result<usize> {
    self.region(region).map(Location::height)
  }

  pub fn region_centroid(&self, region: Region) -> Result<Option<DVec3>> {
    self.region(region).map(Location::centroid)
  }

  pub fn region_center(&self, region: Region) -> Result<Option<Voxel>> {
    self.region(region).map(Location::center)
  }

  pub fn region_voxels(&self, region: Region) -> Result<&VoxelSet> {
    self.region(region).map(Location::voxels)
  }

  // =========================================================================
  // Mutation
  // =========================================================================

  /// Add a voxel to the default region.
  pub fn add(&mut self, x: i32, y: i32, z: i32) -> bool {
    self.insert(Region::Default, Voxel::new(x, y, z))
  }

  /// Add a voxel directly into a region. No-op if the voxel is already
  /// part of the location (in any region).
  pub fn add_to_region(&mut self, region: Region, x: i32, y: i32, z: i32) -> Result<bool> {
    self.ensure_registered(region)?;
    Ok(self.insert(region, Voxel::new(x, y, z)))
  }

  fn insert(&mut self, region: Region, voxel: Voxel) -> bool {
    if !self.location.add_voxel(voxel) {
      return false;
    }
    self.assignment.insert(voxel, region);
    if let Some(nested) = self.regions.get_mut(&region) {
      nested.add_voxel(voxel);
    }
    true
  }

  /// Remove a voxel from whichever region holds it.
  pub fn remove(&mut self, x: i32, y: i32, z: i32) -> bool {
    let voxel = Voxel::new(x, y, z);
    if !self.location.remove_voxel(voxel) {
      return false;
    }
    if let Some(region) = self.assignment.remove(&voxel) {
      if let Some(nested) = self.regions.get_mut(&region) {
        nested.remove_voxel(voxel);
      }
    }
    true
  }

  /// Remove a voxel only if it belongs to `region`.
  pub fn remove_from_region(&mut self, region: Region, x: i32, y: i32, z: i32) -> Result<bool> {
    self.ensure_registered(region)?;
    if self.assignment.get(&Voxel::new(x, y, z)) != Some(&region) {
      return Ok(false);
    }
    Ok(self.remove(x, y, z))
  }

  /// Move a voxel into `region`.
  ///
  /// No-op (Ok(false)) if the voxel is not part of the location or is
  /// already in that region.
  pub fn assign(&mut self, region: Region, voxel: Voxel) -> Result<bool> {
    self.ensure_registered(region)?;
    Ok(self.move_voxel(voxel, region))
  }

  /// Register `region` if needed and move the voxel into it.
  pub(crate) fn claim(&mut self, region: Region, voxel: Voxel) -> bool {
    self.register(region);
    self.move_voxel(voxel, region)
  }

  /// Move a voxel between nested locations and update the map.
  fn move_voxel(&mut self, voxel: Voxel, region: Region) -> bool {
    let Some(current) = self.assignment.get(&voxel).copied() else {
      return false;
    };
    if current == region || !self.regions.contains_key(&region) {
      return false;
    }

    if let Some(nested) = self.regions.get_mut(&current) {
      nested.remove_voxel(voxel);
    }
    if let Some(nested) = self.regions.get_mut(&region) {
      nested.add_voxel(voxel);
    }
    self.assignment.insert(voxel, region);
    true
  }

  /// Reassign voxels so that `region` holds about `target` voxels grown
  /// around its current center (or the default region's center if it is
  /// empty).
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "regions::distribute"))]
  pub fn distribute<R: Rng>(&mut self, region: Region, target: usize, rng: &mut R) -> Result<()> {
    self.ensure_registered(region)?;
    if region == Region::Default {
      return Ok(());
    }

    let seed = self
      .region(region)?
      .adjusted_center()
      .or_else(|| self.regions.get(&Region::Default).and_then(Location::adjusted_center));
    let Some(seed) = seed else {
      return Ok(());
    };

    self.release(region);
    self.grow_region(region, seed, target, rng);
    Ok(())
  }

  /// Return every voxel of `region` to the default region.
  fn release(&mut self, region: Region) {
    let voxels: Vec<Voxel> = match self.regions.get(&region) {
      Some(nested) => nested.voxels().as_slice().to_vec(),
      None => return,
    };
    for voxel in voxels {
      self.move_voxel(voxel, Region::Default);
    }
  }

  /// Select about `target` default-region voxels around `seed` and move
  /// them into `region`.
  ///
  /// Voxels within the geometry's selection radius are taken first,
  /// detached pieces are dropped, then the selection is grown or shrunk to
  /// the target.
  fn grow_region<R: Rng>(&mut self, region: Region, seed: Voxel, target: usize, rng: &mut R) {
    if target == 0 {
      return;
    }
    let Some(pool) = self.regions.get(&Region::Default) else {
      return;
    };
    let pool = pool.voxels().clone();
    if !pool.contains(&seed) {
      return;
    }

    let geometry = self.location.geometry().clone();
    let radius_squared = geometry.selection_radius_squared(target as f64, self.location.height());
    let mut selected: VoxelSet = pool
      .iter()
      .filter(|voxel| geometry.within_radius(**voxel, seed, radius_squared))
      .copied()
      .collect();
    selected.insert(seed);
    while check_voxels(&geometry, &mut selected, rng, true).is_some() {}

    let max_rounds = self.location.config().max_growth_iterations;
    let reached = if selected.len() < target {
      increase(&geometry, |v| pool.contains(v), &mut selected, target, max_rounds, rng)
    } else {
      decrease(&geometry, &mut selected, target, rng)
    };

    if !reached {
      #[cfg(feature = "tracing")]
      tracing::debug!(?region, selected = selected.len(), target, "region target not reached");
    }

    for voxel in selected {
      self.move_voxel(voxel, region);
    }
  }

  // =========================================================================
  // Split
  // =========================================================================

  pub fn split<R: Rng>(&mut self, rng: &mut R) -> Result<Self> {
    self.split_with(rng, &SplitOptions::default())
  }

  /// Split the outer voxels, then regrow every non-default region in both
  /// halves so that each keeps its share of the parent.
  ///
  /// Region counts across the two halves add up to the parent's count
  /// unless a half is too small or growth is capped.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "regions::split"))]
  pub fn split_with<R: Rng>(&mut self, rng: &mut R, options: &SplitOptions) -> Result<Self> {
    let (a, b) = self.location.partition(rng, options)?;
    let (kept, given) = self.location.choose_halves(rng, options, a, b);

    let total = self.volume();
    let shares: Vec<(Region, usize, Option<Voxel>)> = self
      .regions
      .iter()
      .filter(|(region, _)| **region != Region::Default)
      .map(|(region, nested)| (*region, nested.volume(), nested.adjusted_center()))
      .collect();
    let registered: Vec<Region> = self.regions().collect();

    let mut daughter = Self::from_location(self.location.spawn(given));
    *self = Self::from_location(self.location.spawn(kept));
    for region in registered {
      self.register(region);
      daughter.register(region);
    }

    for (region, count, center) in shares {
      let fraction = count as f64 / total as f64;
      let (own, other) = share_targets(count, fraction, self.volume(), daughter.volume());
      self.seed_region(region, center, own, rng);
      daughter.seed_region(region, center, other, rng);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(kept = self.volume(), given = daughter.volume(), "regioned location split");

    Ok(daughter)
  }

  /// Grow a region from `center` if it lies in the default pool, otherwise
  /// from a random default voxel.
  fn seed_region<R: Rng>(&mut self, region: Region, center: Option<Voxel>, target: usize, rng: &mut R) {
    let Some(pool) = self.regions.get(&Region::Default) else {
      return;
    };
    let seed = center
      .filter(|voxel| pool.contains(voxel))
      .or_else(|| pool.voxels().as_slice().choose(rng).copied());
    if let Some(seed) = seed {
      self.grow_region(region, seed, target, rng);
    }
  }

  // =========================================================================
  // Lattice and serialization
  // =========================================================================

  /// Zero lattice ids and region tags for every voxel and empty all regions.
  pub fn clear(&mut self, lattice: &mut Lattice) {
    self.location.clear(lattice);
    self.assignment.clear();
    for nested in self.regions.values_mut() {
      nested.replace_voxels(VoxelSet::new());
    }
  }

  /// Write `id` and each voxel's region tag into the lattice.
  pub fn update(&self, id: i32, lattice: &mut Lattice) {
    for voxel in self.location.voxels() {
      let tag = self.assignment.get(voxel).map_or(0, |region| region.tag());
      lattice.set(*voxel, id, tag);
    }
  }

  /// Container with one voxel list per registered region.
  pub fn convert(&self, id: i32) -> LocationContainer {
    let regions = self
      .regions
      .iter()
      .map(|(region, nested)| (*region, nested.voxels().as_slice().to_vec()))
      .collect();
    self.location.convert(id).with_regions(regions)
  }
}

/// Split a region's `count` voxels between halves of `own_volume` and
/// `other_volume`, giving the first half `round(fraction * own_volume)`.
fn share_targets(count: usize, fraction: f64, own_volume: usize, other_volume: usize) -> (usize, usize) {
  let own = ((fraction * own_volume as f64).round() as usize).min(own_volume).min(count);
  let other = (count - own).min(other_volume);
  let own = (count - other).min(own_volume);
  (own, other)
}

#[cfg(test)]
#[path = "regions_test.rs"]
mod regions_test;
