use std::collections::HashSet;

use super::*;

fn layers(zs: &[i32]) -> BTreeMap<i32, usize> {
  let mut map = BTreeMap::new();
  for z in zs {
    *map.entry(*z).or_insert(0) += 1;
  }
  map
}

// =========================================================================
// Direction
// =========================================================================

#[test]
fn test_direction_steps_on_line() {
  assert_eq!(Direction::X.steps(IVec3::new(-3, 0, 0)), Some(-3));
  assert_eq!(Direction::NegXY.steps(IVec3::new(2, -2, 0)), Some(2));
  assert_eq!(Direction::NegZX.steps(IVec3::new(-2, 0, 2)), Some(2));
  assert_eq!(Direction::PosYZ.steps(IVec3::ZERO), Some(0));
}

#[test]
fn test_direction_steps_off_line() {
  assert_eq!(Direction::X.steps(IVec3::new(1, 1, 0)), None);
  assert_eq!(Direction::PosXY.steps(IVec3::new(2, -2, 0)), None);
  assert_eq!(Direction::Z.steps(IVec3::new(1, 0, 3)), None);
}

#[test]
fn test_direction_unit_is_normalized() {
  for direction in Direction::ALL {
    assert!((direction.unit().length() - 1.0).abs() < 1e-12);
  }
}

// =========================================================================
// Neighborhoods
// =========================================================================

#[test]
fn test_neighbors_2d() {
  let neighbors = Geometry2D.neighbors(Voxel::new(0, 0, 0));
  let set: HashSet<_> = neighbors.iter().copied().collect();

  assert_eq!(neighbors.len(), 4);
  assert!(set.contains(&Voxel::new(1, 0, 0)));
  assert!(set.contains(&Voxel::new(0, -1, 0)));
  assert!(neighbors.iter().all(|v| v.z == 0));
}

#[test]
fn test_neighbors_3d() {
  let neighbors = Geometry3D.neighbors(Voxel::new(5, 5, 5));
  let set: HashSet<_> = neighbors.iter().copied().collect();

  assert_eq!(set.len(), 6);
  assert!(set.contains(&Voxel::new(5, 5, 4)));
  assert!(set.contains(&Voxel::new(5, 5, 6)));
}

// =========================================================================
// Height
// =========================================================================

#[test]
fn test_height_2d_is_occupancy_flag() {
  assert_eq!(Geometry2D.height(&layers(&[])), 0);
  assert_eq!(Geometry2D.height(&layers(&[0, 0, 0])), 1);
}

#[test]
fn test_height_3d_is_z_span() {
  assert_eq!(Geometry3D.height(&layers(&[])), 0);
  assert_eq!(Geometry3D.height(&layers(&[4])), 1);
  assert_eq!(Geometry3D.height(&layers(&[2, 3, 7, 7])), 6);
}

// =========================================================================
// Legacy split rule
// =========================================================================

#[test]
fn test_legacy_normal_2d_swaps_axes() {
  let diameters = Diameters::new();
  assert_eq!(Geometry2D.legacy_normal(Direction::X, &diameters), Direction::Y);
  assert_eq!(Geometry2D.legacy_normal(Direction::Y, &diameters), Direction::X);
  assert_eq!(Geometry2D.legacy_normal(Direction::PosXY, &diameters), Direction::PosXY);
}

#[test]
fn test_legacy_normal_3d_compares_with_perpendicular_axis() {
  let diameters: Diameters = [(Direction::Z, 4), (Direction::PosXY, 5), (Direction::NegXY, 3)]
    .into_iter()
    .collect();

  assert_eq!(Geometry3D.legacy_normal(Direction::Y, &diameters), Direction::Y);
  assert_eq!(Geometry3D.legacy_normal(Direction::PosXY, &diameters), Direction::PosXY);
  assert_eq!(Geometry3D.legacy_normal(Direction::NegXY, &diameters), Direction::Z);
}

// =========================================================================
// Tiling
// =========================================================================

#[test]
fn test_height_range_3d_is_capped() {
  assert_eq!(Geometry3D.height_range(10, 4.2), 5);
  assert_eq!(Geometry3D.height_range(5, 4.2), 3);
  assert_eq!(Geometry3D.height_range(2, 4.2), 1);
  assert_eq!(Geometry3D.height_range(10, 0.0), 1);
  assert_eq!(Geometry2D.height_range(1, 12.0), 1);
}

#[test]
fn test_centers_2d_layout() {
  // (20 - 2 - 2) / 5 = 3 tiles per axis, first center at 1 + 1 + 2 = 4.
  let centers = Geometry2D.centers(20, 20, 1, 1, 5, 1);

  assert_eq!(centers.len(), 9);
  assert_eq!(centers[0], Voxel::new(4, 4, 0));
  assert_eq!(centers[8], Voxel::new(14, 14, 0));
}

#[test]
fn test_centers_3d_layout() {
  // z: (8 - 2) / 3 = 2 layers at 1 + 1 = 2 and 5.
  let centers = Geometry3D.centers(12, 12, 8, 0, 5, 3);
  let zs: HashSet<_> = centers.iter().map(|c| c.z).collect();

  assert_eq!(centers.len(), 2 * 2 * 2);
  assert_eq!(zs, HashSet::from([2, 5]));
}

#[test]
fn test_centers_zero_side_is_empty() {
  assert!(Geometry3D.centers(12, 12, 8, 0, 0, 3).is_empty());
}

/// Possible boxes around neighboring centers never overlap.
#[test]
fn test_possible_boxes_tile_without_overlap() {
  let geometry = Geometry3D;
  let centers = geometry.centers(20, 20, 10, 1, 5, 3);
  let mut seen = HashSet::new();

  for center in &centers {
    let possible = geometry.possible(*center, 5, 3);
    assert_eq!(possible.len(), 5 * 5 * 3);
    assert!(possible.contains(center));
    for voxel in possible {
      assert!(seen.insert(voxel), "voxel {voxel:?} claimed twice");
    }
  }
}

#[test]
fn test_selection_radius() {
  let r2 = Geometry2D.selection_radius_squared(std::f64::consts::PI * 4.0, 1);
  assert!((r2 - 4.0).abs() < 1e-12);

  let r2 = Geometry3D.selection_radius_squared(std::f64::consts::PI * 8.0, 2);
  assert!((r2 - 4.0).abs() < 1e-12);

  assert!(Geometry3D.within_radius(Voxel::new(1, 1, 9), Voxel::new(0, 0, 0), 4.0));
  assert!(!Geometry3D.within_radius(Voxel::new(2, 0, 0), Voxel::new(0, 0, 0), 4.0));
}
