//! Voxel - immutable integer grid coordinate.
//!
//! The atomic unit of occupied space on the lattice. Equality and hashing
//! are by coordinate, so voxels can be used directly as set/map keys.
//! In 2D configurations `z` is always 0.

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

/// Integer lattice coordinate.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub struct Voxel {
  pub x: i32,
  pub y: i32,
  pub z: i32,
}

impl Voxel {
  /// Create a voxel at the given coordinates.
  #[inline]
  pub const fn new(x: i32, y: i32, z: i32) -> Self {
    Self { x, y, z }
  }

  /// Voxel displaced by an integer offset.
  #[inline]
  pub fn offset(self, delta: IVec3) -> Self {
    Self::new(self.x + delta.x, self.y + delta.y, self.z + delta.z)
  }

  /// Integer vector from `origin` to this voxel.
  #[inline]
  pub fn delta_from(self, origin: Voxel) -> IVec3 {
    IVec3::new(self.x - origin.x, self.y - origin.y, self.z - origin.z)
  }

  /// Position as a double-precision point.
  #[inline]
  pub fn as_dvec3(self) -> DVec3 {
    DVec3::new(self.x as f64, self.y as f64, self.z as f64)
  }

  /// Voxel nearest to a floating point position (halves round away from zero).
  #[inline]
  pub fn round(point: DVec3) -> Self {
    Self::new(
      point.x.round() as i32,
      point.y.round() as i32,
      point.z.round() as i32,
    )
  }

  /// Squared Euclidean distance to another voxel.
  #[inline]
  pub fn distance_squared(self, other: Voxel) -> i64 {
    let dx = (self.x - other.x) as i64;
    let dy = (self.y - other.y) as i64;
    let dz = (self.z - other.z) as i64;
    dx * dx + dy * dy + dz * dz
  }

  /// Squared distance ignoring the z axis.
  #[inline]
  pub fn planar_distance_squared(self, other: Voxel) -> i64 {
    let dx = (self.x - other.x) as i64;
    let dy = (self.y - other.y) as i64;
    dx * dx + dy * dy
  }
}

impl From<IVec3> for Voxel {
  fn from(v: IVec3) -> Self {
    Self::new(v.x, v.y, v.z)
  }
}

impl From<Voxel> for IVec3 {
  fn from(v: Voxel) -> Self {
    IVec3::new(v.x, v.y, v.z)
  }
}

impl From<(i32, i32, i32)> for Voxel {
  fn from((x, y, z): (i32, i32, i32)) -> Self {
    Self::new(x, y, z)
  }
}

#[cfg(test)]
#[path = "voxel_test.rs"]
mod voxel_test;
