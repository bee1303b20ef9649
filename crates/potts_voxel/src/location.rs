//! Location - the voxel footprint of one cell.
//!
//! A location owns its voxel set and keeps volume, surface, height and
//! centroid current on every single-voxel add/remove, so lattice dynamics
//! never pay for a full recount. Bulk replacement (after a split)
//! recomputes everything from scratch.
//!
//! # Surface delta
//!
//! ```text
//! add v:    surface += (open faces of v) - (faces of v touching the set)
//! remove v: surface += (faces touching the rest) - (open faces of v)
//! ```
//!
//! Both only look at v's neighborhood, so updates are O(neighbors).
//!
//! # Split pipeline
//!
//! ```text
//! direction -> plane through center/point -> partition by signed distance
//!           -> connect (always) -> balance (center cuts only) -> pick side
//! ```

use std::collections::BTreeMap;

use glam::{DVec3, IVec3};
use rand::seq::IndexedRandom;
use rand::Rng;
use smallvec::SmallVec;

use crate::bounds::VoxelBounds;
use crate::config::{LocationConfig, SplitRule};
use crate::connectivity::{balance_voxels, connect_voxels};
use crate::container::LocationContainer;
use crate::error::{LocationError, Result};
use crate::geometry::{Diameters, Direction, Geometry, Neighbors};
use crate::lattice::Lattice;
use crate::plane::{Plane, Side};
use crate::voxel::Voxel;
use crate::voxel_set::VoxelSet;

/// Optional overrides for a split.
///
/// With no overrides the plane passes through the center along the
/// measured direction and the halves are balanced. Supplying a point or
/// offset skips balancing, since balancing only makes sense for a cut
/// through the middle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitOptions {
  pub point: Option<Voxel>,
  /// Per-axis percentages into the bounding box (see [`Location::offset`]).
  pub offset: Option<Vec<i32>>,
  /// Plane normal given as a lattice direction.
  pub direction: Option<Direction>,
  /// Plane normal given as an arbitrary vector. Takes precedence over
  /// `direction`.
  pub normal: Option<DVec3>,
  /// Probability that the splitting location keeps the negative half.
  pub probability: Option<f64>,
}

impl SplitOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_point(mut self, point: Voxel) -> Self {
    self.point = Some(point);
    self
  }

  pub fn with_offset(mut self, percents: &[i32]) -> Self {
    self.offset = Some(percents.to_vec());
    self
  }

  pub fn with_direction(mut self, direction: Direction) -> Self {
    self.direction = Some(direction);
    self
  }

  pub fn with_normal(mut self, normal: DVec3) -> Self {
    self.normal = Some(normal);
    self
  }

  pub fn with_probability(mut self, probability: f64) -> Self {
    self.probability = Some(probability);
    self
  }

  /// Whether the plane passes through the location's center.
  pub fn is_center_cut(&self) -> bool {
    self.point.is_none() && self.offset.is_none()
  }
}

/// Voxel footprint of one cell with incremental bookkeeping.
#[derive(Clone, Debug)]
pub struct Location<G: Geometry> {
  geometry: G,
  config: LocationConfig,
  voxels: VoxelSet,
  surface: usize,
  /// Voxel count per occupied z layer.
  layers: BTreeMap<i32, usize>,
  centroid: DVec3,
}

impl<G: Geometry> Location<G> {
  pub fn new(geometry: G, voxels: impl IntoIterator<Item = Voxel>) -> Self {
    Self::with_config(geometry, LocationConfig::DEFAULT, voxels)
  }

  pub fn with_config(
    geometry: G,
    config: LocationConfig,
    voxels: impl IntoIterator<Item = Voxel>,
  ) -> Self {
    let mut location = Self {
      geometry,
      config,
      voxels: VoxelSet::new(),
      surface: 0,
      layers: BTreeMap::new(),
      centroid: DVec3::ZERO,
    };
    location.replace_voxels(voxels.into_iter().collect());
    location
  }

  /// Empty location sharing this location's geometry and config.
  pub(crate) fn spawn(&self, voxels: VoxelSet) -> Self {
    let mut location = Self {
      geometry: self.geometry.clone(),
      config: self.config,
      voxels: VoxelSet::new(),
      surface: 0,
      layers: BTreeMap::new(),
      centroid: DVec3::ZERO,
    };
    location.replace_voxels(voxels);
    location
  }

  pub fn geometry(&self) -> &G {
    &self.geometry
  }

  pub fn config(&self) -> &LocationConfig {
    &self.config
  }

  pub fn voxels(&self) -> &VoxelSet {
    &self.voxels
  }

  #[inline]
  pub fn contains(&self, voxel: &Voxel) -> bool {
    self.voxels.contains(voxel)
  }

  #[inline]
  pub fn volume(&self) -> usize {
    self.voxels.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.voxels.is_empty()
  }

  #[inline]
  pub fn surface(&self) -> usize {
    self.surface
  }

  #[inline]
  pub fn height(&self) -> usize {
    self.geometry.height(&self.layers)
  }

  /// Mean voxel position, or None when empty.
  pub fn centroid(&self) -> Option<DVec3> {
    (!self.is_empty()).then_some(self.centroid)
  }

  /// Lattice neighbors of a voxel (occupied or not).
  pub fn neighbors(&self, voxel: Voxel) -> Neighbors {
    self.geometry.neighbors(voxel)
  }

  // =========================================================================
  // Incremental bookkeeping
  // =========================================================================

  pub fn add(&mut self, x: i32, y: i32, z: i32) -> bool {
    self.add_voxel(Voxel::new(x, y, z))
  }

  pub fn remove(&mut self, x: i32, y: i32, z: i32) -> bool {
    self.remove_voxel(Voxel::new(x, y, z))
  }

  /// Add a voxel. Returns false (and changes nothing) if already present.
  pub fn add_voxel(&mut self, voxel: Voxel) -> bool {
    if self.voxels.contains(&voxel) {
      return false;
    }

    let (touching, open) = self.face_counts(voxel);
    self.voxels.insert(voxel);
    self.surface = self.surface + open - touching;
    *self.layers.entry(voxel.z).or_insert(0) += 1;

    let volume = self.voxels.len() as f64;
    self.centroid = (self.centroid * (volume - 1.0) + voxel.as_dvec3()) / volume;
    true
  }

  /// Remove a voxel. Returns false (and changes nothing) if absent.
  pub fn remove_voxel(&mut self, voxel: Voxel) -> bool {
    if !self.voxels.remove(&voxel) {
      return false;
    }

    let (touching, open) = self.face_counts(voxel);
    self.surface = self.surface + touching - open;
    if let Some(count) = self.layers.get_mut(&voxel.z) {
      *count -= 1;
      if *count == 0 {
        self.layers.remove(&voxel.z);
      }
    }

    let volume = self.voxels.len() as f64;
    self.centroid = if self.voxels.is_empty() {
      DVec3::ZERO
    } else {
      (self.centroid * (volume + 1.0) - voxel.as_dvec3()) / volume
    };
    true
  }

  /// Faces of `voxel` touching the current set and faces left open.
  fn face_counts(&self, voxel: Voxel) -> (usize, usize) {
    let neighbors = self.geometry.neighbors(voxel);
    let touching = neighbors.iter().filter(|n| self.voxels.contains(n)).count();
    (touching, neighbors.len() - touching)
  }

  /// Replace every voxel and recompute all measures from scratch.
  pub(crate) fn replace_voxels(&mut self, voxels: VoxelSet) {
    self.voxels = voxels;
    self.surface = self.calculate_surface();
    self.layers = self.calculate_layers();
    self.centroid = self.calculate_centroid().unwrap_or(DVec3::ZERO);
  }

  /// Boundary face count recomputed from scratch.
  pub fn calculate_surface(&self) -> usize {
    self
      .voxels
      .iter()
      .map(|voxel| self.face_counts(*voxel).1)
      .sum()
  }

  /// Height recomputed from scratch.
  pub fn calculate_height(&self) -> usize {
    self.geometry.height(&self.calculate_layers())
  }

  fn calculate_layers(&self) -> BTreeMap<i32, usize> {
    let mut layers = BTreeMap::new();
    for voxel in &self.voxels {
      *layers.entry(voxel.z).or_insert(0) += 1;
    }
    layers
  }

  /// Exact mean position recomputed from scratch.
  pub fn calculate_centroid(&self) -> Option<DVec3> {
    if self.voxels.is_empty() {
      return None;
    }
    let sum = self
      .voxels
      .iter()
      .fold(DVec3::ZERO, |sum, voxel| sum + voxel.as_dvec3());
    Some(sum / self.voxels.len() as f64)
  }

  // =========================================================================
  // Reference points
  // =========================================================================

  /// Centroid rounded to the nearest voxel. The voxel may be unoccupied.
  pub fn center(&self) -> Option<Voxel> {
    self.centroid().map(Voxel::round)
  }

  /// The voxel itself if occupied, otherwise the nearest occupied voxel
  /// (first found on ties). None when empty.
  pub fn adjust(&self, voxel: Voxel) -> Option<Voxel> {
    if self.voxels.contains(&voxel) {
      return Some(voxel);
    }
    self
      .voxels
      .iter()
      .min_by_key(|candidate| candidate.distance_squared(voxel))
      .copied()
  }

  /// Occupied voxel closest to the center.
  pub fn adjusted_center(&self) -> Option<Voxel> {
    self.center().and_then(|center| self.adjust(center))
  }

  pub fn bounds(&self) -> Option<VoxelBounds> {
    VoxelBounds::enclosing(&self.voxels)
  }

  /// Point at per-axis percentages into the bounding box.
  ///
  /// One value applies to every axis, two give x and y (z at 0%), three
  /// give x, y and z.
  pub fn offset(&self, percents: &[i32]) -> Result<Voxel> {
    let percents = match *percents {
      [all] => IVec3::splat(all),
      [x, y] => IVec3::new(x, y, 0),
      [x, y, z] => IVec3::new(x, y, z),
      _ => return Err(LocationError::InvalidOffset(percents.len())),
    };
    let bounds = self.bounds().ok_or(LocationError::EmptyLocation)?;
    Ok(bounds.offset(percents))
  }

  // =========================================================================
  // Orientation
  // =========================================================================

  /// Extent along each geometry direction, measured on the line through
  /// the center. A direction whose line holds no voxel measures 0.
  pub fn diameters(&self) -> Diameters {
    let directions = self.geometry.directions();
    let Some(focus) = self.center() else {
      return directions.iter().map(|direction| (*direction, 0)).collect();
    };

    let mut extents: SmallVec<[Option<(i32, i32)>; 9]> = directions.iter().map(|_| None).collect();
    for voxel in &self.voxels {
      let delta = voxel.delta_from(focus);
      for (direction, extent) in directions.iter().zip(extents.iter_mut()) {
        if let Some(t) = direction.steps(delta) {
          *extent = Some(match *extent {
            Some((low, high)) => (low.min(t), high.max(t)),
            None => (t, t),
          });
        }
      }
    }

    directions
      .iter()
      .zip(extents)
      .map(|(direction, extent)| {
        (*direction, extent.map_or(0, |(low, high)| (high - low + 1) as usize))
      })
      .collect()
  }

  /// Plane normal direction for a split.
  ///
  /// With [`SplitRule::LongestAxis`] the normal is a direction whose
  /// diameter is within `diameter_ratio` of the longest, so the cut runs
  /// across the long axis. With [`SplitRule::ShortestAxis`] the shortest
  /// measured direction is mapped through the geometry's legacy table.
  /// Ties are broken uniformly at random; with nothing measured a random
  /// direction is used.
  pub fn direction<R: Rng>(&self, rng: &mut R) -> Direction {
    let diameters = self.diameters();
    let fallback = Direction::X;

    let candidates: SmallVec<[Direction; 9]> = match self.config.split_rule {
      SplitRule::LongestAxis => {
        let longest = diameters.iter().map(|(_, d)| *d).max().unwrap_or(0);
        if longest == 0 {
          SmallVec::new()
        } else {
          let threshold = self.config.diameter_ratio * longest as f64;
          diameters
            .iter()
            .filter(|(_, d)| *d as f64 >= threshold)
            .map(|(direction, _)| *direction)
            .collect()
        }
      }
      SplitRule::ShortestAxis => {
        let shortest = diameters.iter().map(|(_, d)| *d).filter(|d| *d > 0).min();
        diameters
          .iter()
          .filter(|(_, d)| Some(*d) == shortest)
          .map(|(direction, _)| *direction)
          .collect()
      }
    };

    let Some(&chosen) = candidates.choose(rng) else {
      return self
        .geometry
        .directions()
        .choose(rng)
        .copied()
        .unwrap_or(fallback);
    };

    match self.config.split_rule {
      SplitRule::LongestAxis => chosen,
      SplitRule::ShortestAxis => self.geometry.legacy_normal(chosen, &diameters),
    }
  }

  // =========================================================================
  // Split
  // =========================================================================

  /// Split through the center along the measured direction.
  ///
  /// This location keeps one half; the other is returned. Both halves are
  /// connected for a connected input. The returned half may be empty when
  /// connectivity repair could not keep both sides populated.
  pub fn split<R: Rng>(&mut self, rng: &mut R) -> Result<Self> {
    self.split_with(rng, &SplitOptions::default())
  }

  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "location::split"))]
  pub fn split_with<R: Rng>(&mut self, rng: &mut R, options: &SplitOptions) -> Result<Self> {
    let (a, b) = self.partition(rng, options)?;
    let (kept, given) = self.choose_halves(rng, options, a, b);

    #[cfg(feature = "tracing")]
    tracing::debug!(kept = kept.len(), given = given.len(), "location split");

    self.replace_voxels(kept);
    Ok(self.spawn(given))
  }

  /// Order the halves as (kept, given) using the split probability.
  pub(crate) fn choose_halves<R: Rng>(
    &self,
    rng: &mut R,
    options: &SplitOptions,
    a: VoxelSet,
    b: VoxelSet,
  ) -> (VoxelSet, VoxelSet) {
    let probability = options.probability.unwrap_or(self.config.split_probability);
    if rng.random::<f64>() < probability {
      (a, b)
    } else {
      (b, a)
    }
  }

  /// Partition the voxels into two connected halves without modifying the
  /// location.
  pub(crate) fn partition<R: Rng>(
    &self,
    rng: &mut R,
    options: &SplitOptions,
  ) -> Result<(VoxelSet, VoxelSet)> {
    if self.volume() < 2 {
      return Err(LocationError::TooFewVoxels {
        volume: self.volume(),
      });
    }

    let point = match (options.point, options.offset.as_deref()) {
      (Some(point), _) => point,
      (None, Some(percents)) => self.offset(percents)?,
      (None, None) => self.center().ok_or(LocationError::EmptyLocation)?,
    };
    let normal = match (options.normal, options.direction) {
      (Some(normal), _) => normal,
      (None, Some(direction)) => direction.unit(),
      (None, None) => self.direction(rng).unit(),
    };
    let plane = Plane::through(point, normal);

    let mut a = VoxelSet::with_capacity(self.volume());
    let mut b = VoxelSet::with_capacity(self.volume());
    for voxel in &self.voxels {
      let negative = match plane.side(*voxel) {
        Side::Negative => true,
        Side::Positive => false,
        Side::On => rng.random::<f64>() < 0.5,
      };
      if negative {
        a.insert(*voxel);
      } else {
        b.insert(*voxel);
      }
    }

    {
      #[cfg(feature = "tracing")]
      let _span = tracing::debug_span!("repair", a = a.len(), b = b.len()).entered();

      connect_voxels(&self.geometry, &mut a, &mut b, rng, self.config.max_connect_iterations);
      if options.is_center_cut() {
        balance_voxels(&self.geometry, &mut a, &mut b, rng, &self.config);
      }
    }

    Ok((a, b))
  }

  // =========================================================================
  // Lattice and serialization
  // =========================================================================

  /// Zero this location's lattice entries and drop all voxels.
  pub fn clear(&mut self, lattice: &mut Lattice) {
    for voxel in &self.voxels {
      lattice.set(*voxel, 0, 0);
    }
    self.replace_voxels(VoxelSet::new());
  }

  /// Write `id` into the lattice at every owned voxel.
  pub fn update(&self, id: i32, lattice: &mut Lattice) {
    for voxel in &self.voxels {
      lattice.set_id(*voxel, id);
    }
  }

  /// Container holding the voxel list and the adjusted center.
  pub fn convert(&self, id: i32) -> LocationContainer {
    LocationContainer::new(
      id,
      self.adjusted_center().unwrap_or_default(),
      self.voxels.as_slice().to_vec(),
    )
  }
}

#[cfg(test)]
#[path = "location_test.rs"]
mod location_test;
