//! Lattice geometry strategies.
//!
//! A [`Location`](crate::Location) is generic over a small geometry
//! capability rather than subclassed per dimensionality. The geometry
//! supplies everything that differs between 2D and 3D lattices:
//!
//! | Concern            | 2D                     | 3D                          |
//! |--------------------|------------------------|-----------------------------|
//! | Neighborhood       | 4 (xy plane)           | 6 (faces)                   |
//! | Diameter axes      | X, Y, 2 xy diagonals   | X, Y, Z, 6 face diagonals   |
//! | Height             | 1 if occupied          | z-span                      |
//! | Selection radius   | `sqrt(n / pi)`         | `sqrt(n / h / pi)` in xy    |
//! | Tile height        | 1 (z = 0)              | from critical height        |
//!
//! Surface and volume bookkeeping are dimension independent once the
//! neighborhood is known, so they live on `Location` itself.

use std::collections::BTreeMap;
use std::fmt;

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::voxel::Voxel;

/// Neighbor list, sized for the largest (6-)neighborhood.
pub type Neighbors = SmallVec<[Voxel; 6]>;

/// Measured extent per candidate direction, in direction order.
pub type Diameters = SmallVec<[(Direction, usize); 9]>;

/// Candidate directions for measuring a location's extent.
///
/// Diagonals are named by the plane they lie in and the sign relating their
/// two nonzero components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum Direction {
  X,
  Y,
  Z,
  /// (1, 1, 0)
  PosXY,
  /// (1, -1, 0)
  NegXY,
  /// (0, 1, 1)
  PosYZ,
  /// (0, 1, -1)
  NegYZ,
  /// (1, 0, 1)
  PosZX,
  /// (-1, 0, 1)
  NegZX,
}

impl Direction {
  pub const ALL: [Direction; 9] = [
    Direction::X,
    Direction::Y,
    Direction::Z,
    Direction::PosXY,
    Direction::NegXY,
    Direction::PosYZ,
    Direction::NegYZ,
    Direction::PosZX,
    Direction::NegZX,
  ];

  /// Integer step along this direction.
  pub const fn vector(self) -> IVec3 {
    match self {
      Direction::X => IVec3::new(1, 0, 0),
      Direction::Y => IVec3::new(0, 1, 0),
      Direction::Z => IVec3::new(0, 0, 1),
      Direction::PosXY => IVec3::new(1, 1, 0),
      Direction::NegXY => IVec3::new(1, -1, 0),
      Direction::PosYZ => IVec3::new(0, 1, 1),
      Direction::NegYZ => IVec3::new(0, 1, -1),
      Direction::PosZX => IVec3::new(1, 0, 1),
      Direction::NegZX => IVec3::new(-1, 0, 1),
    }
  }

  /// Unit-length vector along this direction.
  pub fn unit(self) -> DVec3 {
    self.vector().as_dvec3().normalize()
  }

  /// Signed number of steps along this direction if `delta` lies on the
  /// line through the origin, otherwise None.
  pub fn steps(self, delta: IVec3) -> Option<i32> {
    let step = self.vector();
    let t = if step.x != 0 {
      delta.x * step.x
    } else if step.y != 0 {
      delta.y * step.y
    } else {
      delta.z * step.z
    };
    (step * t == delta).then_some(t)
  }
}

/// Look up one direction's diameter (0 if not measured).
pub fn diameter(diameters: &Diameters, direction: Direction) -> usize {
  diameters
    .iter()
    .find(|(d, _)| *d == direction)
    .map_or(0, |(_, value)| *value)
}

/// Dimension-specific lattice rules.
pub trait Geometry: Clone + fmt::Debug {
  /// Unit offsets to face-adjacent voxels.
  fn neighbor_offsets(&self) -> &'static [IVec3];

  /// Directions along which diameters are measured.
  fn directions(&self) -> &'static [Direction];

  /// Height from a histogram of occupied z layers.
  fn height(&self, layers: &BTreeMap<i32, usize>) -> usize;

  /// Plane normal for the older shortest-axis split rule, given the
  /// direction of minimum diameter.
  fn legacy_normal(&self, direction: Direction, diameters: &Diameters) -> Direction;

  /// Squared selection radius for picking roughly `n` voxels around a
  /// focus in a location of the given height.
  fn selection_radius_squared(&self, n: f64, height: usize) -> f64;

  /// Tile height derived from the lattice height and a critical height.
  fn height_range(&self, lattice_height: usize, critical_height: f64) -> usize;

  /// Evenly spaced tile centers for a lattice, `side` apart in x/y and
  /// `height` apart in z.
  fn centers(
    &self,
    length: usize,
    width: usize,
    lattice_height: usize,
    margin: usize,
    side: usize,
    height: usize,
  ) -> Vec<Voxel>;

  /// Box of candidate voxels centred on `focus`.
  fn possible(&self, focus: Voxel, side: usize, height: usize) -> Vec<Voxel>;

  fn neighbors(&self, voxel: Voxel) -> Neighbors {
    self
      .neighbor_offsets()
      .iter()
      .map(|offset| voxel.offset(*offset))
      .collect()
  }

  /// Whether `voxel` lies inside the selection radius around `focus`.
  fn within_radius(&self, voxel: Voxel, focus: Voxel, radius_squared: f64) -> bool {
    (voxel.planar_distance_squared(focus) as f64) < radius_squared
  }
}

const OFFSETS_2D: [IVec3; 4] = [
  IVec3::new(1, 0, 0),
  IVec3::new(-1, 0, 0),
  IVec3::new(0, 1, 0),
  IVec3::new(0, -1, 0),
];

const OFFSETS_3D: [IVec3; 6] = [
  IVec3::new(1, 0, 0),
  IVec3::new(-1, 0, 0),
  IVec3::new(0, 1, 0),
  IVec3::new(0, -1, 0),
  IVec3::new(0, 0, 1),
  IVec3::new(0, 0, -1),
];

const DIRECTIONS_2D: [Direction; 4] = [
  Direction::X,
  Direction::Y,
  Direction::PosXY,
  Direction::NegXY,
];

/// Count of tiles of size `side` fitting in `available` cells.
fn tile_count(available: usize, side: usize) -> usize {
  if side == 0 {
    0
  } else {
    available / side
  }
}

/// Single-layer lattice in the xy plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Geometry2D;

impl Geometry for Geometry2D {
  fn neighbor_offsets(&self) -> &'static [IVec3] {
    &OFFSETS_2D
  }

  fn directions(&self) -> &'static [Direction] {
    &DIRECTIONS_2D
  }

  fn height(&self, layers: &BTreeMap<i32, usize>) -> usize {
    usize::from(!layers.is_empty())
  }

  fn legacy_normal(&self, direction: Direction, _diameters: &Diameters) -> Direction {
    match direction {
      Direction::X => Direction::Y,
      Direction::Y => Direction::X,
      other => other,
    }
  }

  fn selection_radius_squared(&self, n: f64, _height: usize) -> f64 {
    n / std::f64::consts::PI
  }

  fn height_range(&self, _lattice_height: usize, _critical_height: f64) -> usize {
    1
  }

  fn centers(
    &self,
    length: usize,
    width: usize,
    _lattice_height: usize,
    margin: usize,
    side: usize,
    _height: usize,
  ) -> Vec<Voxel> {
    let nx = tile_count(length.saturating_sub(2 + 2 * margin), side);
    let ny = tile_count(width.saturating_sub(2 + 2 * margin), side);
    let base = (margin + 1 + side / 2) as i32;
    let mut centers = Vec::with_capacity(nx * ny);
    for i in 0..nx {
      for j in 0..ny {
        centers.push(Voxel::new(
          base + (i * side) as i32,
          base + (j * side) as i32,
          0,
        ));
      }
    }
    centers
  }

  fn possible(&self, focus: Voxel, side: usize, _height: usize) -> Vec<Voxel> {
    let half = (side / 2) as i32;
    let side = side as i32;
    let mut voxels = Vec::with_capacity((side * side) as usize);
    for i in 0..side {
      for j in 0..side {
        voxels.push(Voxel::new(focus.x - half + i, focus.y - half + j, 0));
      }
    }
    voxels
  }
}

/// Full 3D lattice with a 6-neighborhood.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Geometry3D;

impl Geometry for Geometry3D {
  fn neighbor_offsets(&self) -> &'static [IVec3] {
    &OFFSETS_3D
  }

  fn directions(&self) -> &'static [Direction] {
    &Direction::ALL
  }

  fn height(&self, layers: &BTreeMap<i32, usize>) -> usize {
    match (layers.keys().next(), layers.keys().next_back()) {
      (Some(min), Some(max)) => (max - min + 1) as usize,
      _ => 0,
    }
  }

  /// Axes cut across themselves. A diagonal cuts across itself when it is
  /// at least as long as the axis perpendicular to its plane, otherwise
  /// across that axis.
  fn legacy_normal(&self, direction: Direction, diameters: &Diameters) -> Direction {
    let perpendicular = match direction {
      Direction::X | Direction::Y | Direction::Z => return direction,
      Direction::PosXY | Direction::NegXY => Direction::Z,
      Direction::PosYZ | Direction::NegYZ => Direction::X,
      Direction::PosZX | Direction::NegZX => Direction::Y,
    };
    if diameter(diameters, direction) >= diameter(diameters, perpendicular) {
      direction
    } else {
      perpendicular
    }
  }

  fn selection_radius_squared(&self, n: f64, height: usize) -> f64 {
    n / height.max(1) as f64 / std::f64::consts::PI
  }

  fn height_range(&self, lattice_height: usize, critical_height: f64) -> usize {
    let capped = (critical_height.ceil().max(0.0) as usize).min(lattice_height.saturating_sub(2));
    capped.max(1)
  }

  fn centers(
    &self,
    length: usize,
    width: usize,
    lattice_height: usize,
    margin: usize,
    side: usize,
    height: usize,
  ) -> Vec<Voxel> {
    let nx = tile_count(length.saturating_sub(2 + 2 * margin), side);
    let ny = tile_count(width.saturating_sub(2 + 2 * margin), side);
    let nz = tile_count(lattice_height.saturating_sub(2), height);
    let base = (margin + 1 + side / 2) as i32;
    let base_z = (1 + height / 2) as i32;
    let mut centers = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
      for i in 0..nx {
        for j in 0..ny {
          centers.push(Voxel::new(
            base + (i * side) as i32,
            base + (j * side) as i32,
            base_z + (k * height) as i32,
          ));
        }
      }
    }
    centers
  }

  fn possible(&self, focus: Voxel, side: usize, height: usize) -> Vec<Voxel> {
    let half = (side / 2) as i32;
    let half_z = (height / 2) as i32;
    let (side, height) = (side as i32, height as i32);
    let mut voxels = Vec::with_capacity((side * side * height) as usize);
    for k in 0..height {
      for i in 0..side {
        for j in 0..side {
          voxels.push(Voxel::new(
            focus.x - half + i,
            focus.y - half + j,
            focus.z - half_z + k,
          ));
        }
      }
    }
    voxels
  }
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;
