use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::connectivity::is_connected;
use crate::geometry::{diameter, Geometry2D, Geometry3D};
use crate::selection::increase;

fn block2d(length: i32, width: i32) -> Location<Geometry2D> {
  let mut voxels = Vec::new();
  for x in 0..length {
    for y in 0..width {
      voxels.push(Voxel::new(x, y, 0));
    }
  }
  Location::new(Geometry2D, voxels)
}

fn block3d(length: i32, width: i32, height: i32) -> Location<Geometry3D> {
  let mut voxels = Vec::new();
  for x in 0..length {
    for y in 0..width {
      for z in 0..height {
        voxels.push(Voxel::new(x, y, z));
      }
    }
  }
  Location::new(Geometry3D, voxels)
}

fn line(range: std::ops::Range<i32>) -> Location<Geometry2D> {
  Location::new(Geometry2D, range.map(|x| Voxel::new(x, 0, 0)))
}

/// Random connected 3D blob grown from the origin.
fn blob(volume: usize, rng: &mut StdRng) -> Location<Geometry3D> {
  let mut voxels: VoxelSet = [Voxel::new(0, 0, 0)].into_iter().collect();
  increase(&Geometry3D, |_| true, &mut voxels, volume, 0, rng);
  Location::new(Geometry3D, voxels)
}

fn assert_measures_exact<G: Geometry>(location: &Location<G>) {
  assert_eq!(location.surface(), location.calculate_surface());
  assert_eq!(location.height(), location.calculate_height());
  match (location.centroid(), location.calculate_centroid()) {
    (Some(running), Some(exact)) => assert!((running - exact).length() < 1e-9),
    (None, None) => {}
    (running, exact) => panic!("centroid mismatch: {running:?} vs {exact:?}"),
  }
}

// =========================================================================
// Incremental bookkeeping
// =========================================================================

#[test]
fn test_measures_match_recount_under_random_moves() {
  let mut rng = StdRng::seed_from_u64(21);
  let mut location = Location::new(Geometry3D, Vec::<Voxel>::new());

  for _ in 0..400 {
    let (x, y, z) = (
      rng.random_range(0..5),
      rng.random_range(0..5),
      rng.random_range(0..5),
    );
    if location.contains(&Voxel::new(x, y, z)) {
      assert!(location.remove(x, y, z));
    } else {
      assert!(location.add(x, y, z));
    }
    assert_measures_exact(&location);
  }
}

#[test]
fn test_add_and_remove_are_idempotent() {
  let mut location = block2d(2, 2);

  assert!(!location.add(0, 0, 0));
  assert!(!location.remove(5, 5, 0));
  assert_eq!(location.volume(), 4);
  assert_eq!(location.surface(), 8);
}

#[test]
fn test_surface_counts_open_faces() {
  assert_eq!(block2d(3, 3).surface(), 12);
  assert_eq!(block3d(2, 2, 2).surface(), 24);
  assert_eq!(line(0..4).surface(), 10);
}

#[test]
fn test_height_per_geometry() {
  assert_eq!(block2d(3, 3).height(), 1);
  assert_eq!(Location::new(Geometry2D, Vec::<Voxel>::new()).height(), 0);

  let mut column = Location::new(Geometry3D, [Voxel::new(0, 0, 0), Voxel::new(0, 0, 3)]);
  assert_eq!(column.height(), 4);
  column.remove(0, 0, 3);
  assert_eq!(column.height(), 1);
}

#[test]
fn test_removing_last_voxel_resets_centroid() {
  let mut location = Location::new(Geometry2D, [Voxel::new(4, 4, 0)]);
  assert!(location.remove(4, 4, 0));

  assert_eq!(location.centroid(), None);
  assert_eq!(location.center(), None);
  assert!(location.add(1, 2, 0));
  assert_eq!(location.centroid(), Some(DVec3::new(1.0, 2.0, 0.0)));
}

// =========================================================================
// Reference points
// =========================================================================

#[test]
fn test_adjust_finds_nearest_occupied() {
  let ring = Location::new(
    Geometry2D,
    [(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)]
      .into_iter()
      .map(|(x, y)| Voxel::new(x, y, 0)),
  );

  assert_eq!(ring.center(), Some(Voxel::new(1, 1, 0)));
  assert!(!ring.contains(&Voxel::new(1, 1, 0)));
  // First of the four equally near voxels.
  assert_eq!(ring.adjusted_center(), Some(Voxel::new(0, 1, 0)));
  assert_eq!(ring.adjust(Voxel::new(2, 2, 0)), Some(Voxel::new(2, 2, 0)));
  assert_eq!(Location::new(Geometry2D, Vec::<Voxel>::new()).adjusted_center(), None);
}

#[test]
fn test_offset_percentages() {
  let location = block2d(10, 10);

  assert_eq!(location.offset(&[50]), Ok(Voxel::new(5, 5, 0)));
  assert_eq!(location.offset(&[0, 100]), Ok(Voxel::new(0, 9, 0)));
  assert_eq!(location.offset(&[100, 100, 100]), Ok(Voxel::new(9, 9, 0)));
}

#[test]
fn test_offset_errors() {
  let location = block2d(3, 3);

  assert_eq!(location.offset(&[]), Err(LocationError::InvalidOffset(0)));
  assert_eq!(location.offset(&[1, 2, 3, 4]), Err(LocationError::InvalidOffset(4)));
  assert_eq!(
    Location::new(Geometry2D, Vec::<Voxel>::new()).offset(&[50]),
    Err(LocationError::EmptyLocation)
  );
}

// =========================================================================
// Orientation
// =========================================================================

#[test]
fn test_diameters_3d() {
  let diameters = block3d(5, 3, 1).diameters();

  assert_eq!(diameters.len(), 9);
  assert_eq!(diameter(&diameters, Direction::X), 5);
  assert_eq!(diameter(&diameters, Direction::Y), 3);
  assert_eq!(diameter(&diameters, Direction::Z), 1);
  assert_eq!(diameter(&diameters, Direction::PosXY), 3);
  assert_eq!(diameter(&diameters, Direction::NegXY), 3);
  assert_eq!(diameter(&diameters, Direction::PosYZ), 1);
  assert_eq!(diameter(&diameters, Direction::NegZX), 1);
}

#[test]
fn test_diameters_empty() {
  let diameters = Location::new(Geometry2D, Vec::<Voxel>::new()).diameters();
  assert_eq!(diameters.len(), 4);
  assert!(diameters.iter().all(|(_, d)| *d == 0));
}

#[test]
fn test_longest_axis_direction() {
  let location = block2d(7, 3);
  for seed in 0..20 {
    let mut rng = StdRng::seed_from_u64(seed);
    assert_eq!(location.direction(&mut rng), Direction::X);
  }
}

/// The legacy rule picks among the shortest extents and maps X and Y to
/// each other.
#[test]
fn test_shortest_axis_direction() {
  let config = LocationConfig::DEFAULT.with_split_rule(SplitRule::ShortestAxis);
  let location = Location::with_config(Geometry2D, config, (0..7).map(|x| Voxel::new(x, 0, 0)));

  for seed in 0..20 {
    let mut rng = StdRng::seed_from_u64(seed);
    let direction = location.direction(&mut rng);
    assert!(
      matches!(direction, Direction::X | Direction::PosXY | Direction::NegXY),
      "{direction:?}"
    );
  }
}

#[test]
fn test_direction_of_empty_location_is_random() {
  let mut rng = StdRng::seed_from_u64(0);
  let direction = Location::new(Geometry2D, Vec::<Voxel>::new()).direction(&mut rng);
  assert!(Geometry2D.directions().contains(&direction));
}

// =========================================================================
// Split
// =========================================================================

/// A six-voxel line cut across X always ends up three and three.
#[test]
fn test_split_line_in_half() {
  let low: VoxelSet = (0..3).map(|x| Voxel::new(x, 0, 0)).collect();
  let high: VoxelSet = (3..6).map(|x| Voxel::new(x, 0, 0)).collect();

  for seed in 0..20 {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut location = line(0..6);
    let options = SplitOptions::new().with_direction(Direction::X);

    let daughter = location.split_with(&mut rng, &options).unwrap();

    let halves = (location.voxels().clone(), daughter.voxels().clone());
    assert!(
      halves == (low.clone(), high.clone()) || halves == (high.clone(), low.clone()),
      "seed {seed}: {halves:?}"
    );
    assert_measures_exact(&location);
    assert_measures_exact(&daughter);
  }
}

#[test]
fn test_split_blobs_stay_connected() {
  for seed in 0..30 {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut location = blob(40, &mut rng);
    let before = location.voxels().clone();

    let daughter = location.split(&mut rng).unwrap();

    assert_eq!(location.volume() + daughter.volume(), 40, "seed {seed}");
    assert!(!location.is_empty() && !daughter.is_empty(), "seed {seed}");
    assert!(is_connected(&Geometry3D, location.voxels()), "seed {seed}");
    assert!(is_connected(&Geometry3D, daughter.voxels()), "seed {seed}");
    assert!(daughter.voxels().iter().all(|voxel| before.contains(voxel)));
    assert!(daughter.voxels().iter().all(|voxel| !location.contains(voxel)));
    assert_measures_exact(&location);
    assert_measures_exact(&daughter);
  }
}

#[test]
fn test_split_block_is_balanced() {
  for seed in 0..10 {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut location = block3d(6, 4, 4);

    let daughter = location.split(&mut rng).unwrap();

    // ceil(96 * 0.05)
    assert!(location.volume().abs_diff(daughter.volume()) <= 5, "seed {seed}");
  }
}

#[test]
fn test_split_needs_two_voxels() {
  let mut rng = StdRng::seed_from_u64(0);
  let mut single = Location::new(Geometry2D, [Voxel::new(0, 0, 0)]);

  assert_eq!(
    single.split(&mut rng).unwrap_err(),
    LocationError::TooFewVoxels { volume: 1 }
  );
  assert_eq!(single.volume(), 1);

  let mut empty = Location::new(Geometry2D, Vec::<Voxel>::new());
  assert_eq!(
    empty.split(&mut rng).unwrap_err(),
    LocationError::TooFewVoxels { volume: 0 }
  );
}

/// Cuts away from the center are not rebalanced.
#[test]
fn test_offset_split_skips_balance() {
  for seed in 0..10 {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut location = line(0..10);
    let options = SplitOptions::new()
      .with_offset(&[20])
      .with_direction(Direction::X)
      .with_probability(1.0);

    let daughter = location.split_with(&mut rng, &options).unwrap();

    assert!(matches!(location.volume(), 2 | 3), "seed {seed}");
    assert_eq!(daughter.volume(), 10 - location.volume());
    assert!(location.contains(&Voxel::new(0, 0, 0)));
  }
}

#[test]
fn test_point_split_keeps_positive_side() {
  let mut rng = StdRng::seed_from_u64(3);
  let mut location = line(0..10);
  let options = SplitOptions::new()
    .with_point(Voxel::new(7, 0, 0))
    .with_normal(DVec3::X)
    .with_probability(0.0);

  let daughter = location.split_with(&mut rng, &options).unwrap();

  assert!(location.contains(&Voxel::new(9, 0, 0)));
  assert!(daughter.contains(&Voxel::new(0, 0, 0)));
  assert!(matches!(location.volume(), 2 | 3));
}

#[test]
fn test_split_with_explicit_normal() {
  let mut rng = StdRng::seed_from_u64(12);
  let mut location = block2d(4, 4);
  let options = SplitOptions::new().with_normal(DVec3::new(0.0, 2.0, 0.0));

  let daughter = location.split_with(&mut rng, &options).unwrap();

  assert_eq!(location.volume(), 8);
  assert_eq!(daughter.volume(), 8);
  assert!(is_connected(&Geometry2D, location.voxels()));
  assert!(is_connected(&Geometry2D, daughter.voxels()));
}

// =========================================================================
// Lattice and serialization
// =========================================================================

#[test]
fn test_update_writes_ids_only() {
  let location = block2d(2, 2);
  let mut lattice = Lattice::new(3, 3, 1);
  lattice.set(Voxel::new(0, 0, 0), 9, 2);

  location.update(3, &mut lattice);

  assert_eq!(lattice.count(3), 4);
  assert_eq!(lattice.region(Voxel::new(0, 0, 0)), 2);
  assert_eq!(lattice.id(Voxel::new(2, 2, 0)), 0);
}

#[test]
fn test_clear_zeroes_lattice() {
  let mut location = block2d(2, 2);
  let mut lattice = Lattice::new(3, 3, 1);
  location.update(3, &mut lattice);
  lattice.set(Voxel::new(1, 1, 0), 3, 1);

  location.clear(&mut lattice);

  assert_eq!(lattice.count(3), 0);
  assert_eq!(lattice.region(Voxel::new(1, 1, 0)), 0);
  assert!(location.is_empty());
  assert_eq!(location.surface(), 0);
}

#[test]
fn test_convert_uses_adjusted_center() {
  let location = line(0..4);
  let container = location.convert(6);

  assert_eq!(container.id, 6);
  // centroid 1.5 rounds to 2
  assert_eq!(container.center, Voxel::new(2, 0, 0));
  assert_eq!(container.voxels, location.voxels().as_slice());
  assert!(container.regions.is_none());
}
