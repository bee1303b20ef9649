//! Division plane through a reference point.

use glam::{DQuat, DVec3};

use crate::voxel::Voxel;

/// Distances smaller than this are treated as lying on the plane.
const ON_PLANE_EPSILON: f64 = 1e-9;

/// Which side of a plane a voxel falls on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
  Negative,
  On,
  Positive,
}

/// Plane defined by a point and a unit normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
  pub point: DVec3,
  /// Unit-length normal.
  pub normal: DVec3,
}

impl Plane {
  /// Create a plane. The normal is normalized; a zero normal falls back to +X.
  pub fn new(point: DVec3, normal: DVec3) -> Self {
    Self {
      point,
      normal: normal.try_normalize().unwrap_or(DVec3::X),
    }
  }

  /// Plane through the given voxel.
  pub fn through(voxel: Voxel, normal: DVec3) -> Self {
    Self::new(voxel.as_dvec3(), normal)
  }

  /// Signed distance from `point` to the plane (positive along the normal).
  #[inline]
  pub fn signed_distance(&self, point: DVec3) -> f64 {
    (point - self.point).dot(self.normal)
  }

  pub fn side(&self, voxel: Voxel) -> Side {
    let distance = self.signed_distance(voxel.as_dvec3());
    if distance.abs() < ON_PLANE_EPSILON {
      Side::On
    } else if distance < 0.0 {
      Side::Negative
    } else {
      Side::Positive
    }
  }

  /// Rotate a normal around an axis by `degrees` (right-hand rule).
  ///
  /// Used to tilt a division plane away from a reference orientation.
  pub fn rotate_normal(normal: DVec3, axis: DVec3, degrees: f64) -> DVec3 {
    let Some(axis) = axis.try_normalize() else {
      return normal;
    };
    DQuat::from_axis_angle(axis, degrees.to_radians()) * normal
  }
}
