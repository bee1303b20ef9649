//! Shared id/region lattice.
//!
//! Two dense arrays with one entry per grid point: the occupying cell id
//! (0 = empty) and its region tag (0 = none). Locations only write here;
//! the simulation owns the lattice and serializes access to it.
//!
//! # Memory Layout
//!
//! ```text
//! Indexed [z][x][y], y innermost:
//!
//! index = (z * length + x) * width + y
//! ```

use crate::voxel::Voxel;

/// Dense cell-id and region-tag arrays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lattice {
  length: usize,
  width: usize,
  height: usize,
  ids: Vec<i32>,
  regions: Vec<i32>,
}

impl Lattice {
  /// Create an empty lattice of `length` (x) by `width` (y) by `height` (z).
  pub fn new(length: usize, width: usize, height: usize) -> Self {
    let size = length * width * height;
    Self {
      length,
      width,
      height,
      ids: vec![0; size],
      regions: vec![0; size],
    }
  }

  /// (length, width, height)
  pub fn dimensions(&self) -> (usize, usize, usize) {
    (self.length, self.width, self.height)
  }

  /// Flat index for a voxel, or None outside the lattice.
  #[inline]
  pub fn index(&self, voxel: Voxel) -> Option<usize> {
    let x = usize::try_from(voxel.x).ok().filter(|x| *x < self.length)?;
    let y = usize::try_from(voxel.y).ok().filter(|y| *y < self.width)?;
    let z = usize::try_from(voxel.z).ok().filter(|z| *z < self.height)?;
    Some((z * self.length + x) * self.width + y)
  }

  /// Cell id at a voxel (0 when empty or outside).
  pub fn id(&self, voxel: Voxel) -> i32 {
    self.index(voxel).map_or(0, |i| self.ids[i])
  }

  /// Region tag at a voxel (0 when unset or outside).
  pub fn region(&self, voxel: Voxel) -> i32 {
    self.index(voxel).map_or(0, |i| self.regions[i])
  }

  /// Write a cell id. Returns false for voxels outside the lattice.
  pub fn set_id(&mut self, voxel: Voxel, id: i32) -> bool {
    match self.index(voxel) {
      Some(i) => {
        self.ids[i] = id;
        true
      }
      None => false,
    }
  }

  /// Write both the cell id and the region tag.
  pub fn set(&mut self, voxel: Voxel, id: i32, region: i32) -> bool {
    match self.index(voxel) {
      Some(i) => {
        self.ids[i] = id;
        self.regions[i] = region;
        true
      }
      None => false,
    }
  }

  /// Number of grid points holding `id`.
  pub fn count(&self, id: i32) -> usize {
    self.ids.iter().filter(|value| **value == id).count()
  }
}
