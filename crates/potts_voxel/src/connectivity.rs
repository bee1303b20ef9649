//! Connectivity repair and size balancing for split halves.
//!
//! Both halves of a split must be single connected components. After a
//! plane partition each half is flood-filled from a random seed; any
//! fragment cut off from the rest is migrated to the other half. Balancing
//! then moves boundary voxels from the larger half to the smaller one, one
//! at a time, keeping only moves that leave the donor connected.
//!
//! ```text
//!   A: ##.##      check A -> fragment {##} (smaller side of the fill)
//!   B: ..#..      move to B, re-check B, repeat until both fill fully
//! ```
//!
//! Every loop is capped. Reaching a cap is not an error: connectivity is
//! kept and balance is given up.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{within_cap, LocationConfig};
use crate::geometry::Geometry;
use crate::voxel::Voxel;
use crate::voxel_set::VoxelSet;

/// Breadth-first fill of `voxels` starting at `seed`.
///
/// Returns the reached voxels in visiting order. A seed outside the set
/// reaches nothing.
pub fn flood_fill<G: Geometry>(geometry: &G, voxels: &VoxelSet, seed: Voxel) -> VoxelSet {
  let mut visited = VoxelSet::with_capacity(voxels.len());
  if !voxels.contains(&seed) {
    return visited;
  }

  let mut queue = VecDeque::from([seed]);
  visited.insert(seed);
  while let Some(voxel) = queue.pop_front() {
    for neighbor in geometry.neighbors(voxel) {
      if voxels.contains(&neighbor) && visited.insert(neighbor) {
        queue.push_back(neighbor);
      }
    }
  }
  visited
}

/// Whether the voxels form a single connected component (empty sets count).
pub fn is_connected<G: Geometry>(geometry: &G, voxels: &VoxelSet) -> bool {
  match voxels.get(0) {
    Some(seed) => flood_fill(geometry, voxels, seed).len() == voxels.len(),
    None => true,
  }
}

/// Check a voxel list for connectedness from a random seed.
///
/// Returns None if connected. Otherwise returns the smaller of the reached
/// and unreached parts (the unreached part on a tie), removing it from
/// `voxels` when `update` is set. Lists with several detached pieces may
/// need repeated checks.
pub fn check_voxels<G, R>(
  geometry: &G,
  voxels: &mut VoxelSet,
  rng: &mut R,
  update: bool,
) -> Option<Vec<Voxel>>
where
  G: Geometry,
  R: Rng,
{
  if voxels.is_empty() {
    return None;
  }

  let seed = voxels.get(rng.random_range(0..voxels.len()))?;
  let visited = flood_fill(geometry, voxels, seed);
  if visited.len() == voxels.len() {
    return None;
  }

  let unvisited: Vec<Voxel> = voxels
    .iter()
    .filter(|voxel| !visited.contains(voxel))
    .copied()
    .collect();
  let fragment = if unvisited.len() > visited.len() {
    visited.into_vec()
  } else {
    unvisited
  };

  if update {
    voxels.remove_all(&fragment);
  }
  Some(fragment)
}

/// Move detached fragments between the halves until both are connected.
///
/// Returns false if the iteration cap was reached. In that case every
/// voxel is merged into the larger half and the other half is left empty,
/// so connectivity still holds for a connected input.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "connectivity::connect"))]
pub fn connect_voxels<G, R>(
  geometry: &G,
  a: &mut VoxelSet,
  b: &mut VoxelSet,
  rng: &mut R,
  max_iterations: usize,
) -> bool
where
  G: Geometry,
  R: Rng,
{
  let mut unconnected_a = check_voxels(geometry, a, rng, true);
  let mut unconnected_b = check_voxels(geometry, b, rng, true);
  let mut iterations = 0;

  while unconnected_a.is_some() || unconnected_b.is_some() {
    if !within_cap(max_iterations, iterations) {
      b.extend(unconnected_a.take().into_iter().flatten());
      a.extend(unconnected_b.take().into_iter().flatten());
      merge_into_larger(a, b);

      #[cfg(feature = "tracing")]
      tracing::warn!(
        iterations,
        merged = a.len() + b.len(),
        "connect cap reached, halves merged"
      );
      return false;
    }
    iterations += 1;

    if let Some(fragment) = unconnected_a.take() {
      b.extend(fragment);
    }
    let next_b = check_voxels(geometry, b, rng, true);

    if let Some(fragment) = unconnected_b.take() {
      a.extend(fragment);
    }
    let next_a = check_voxels(geometry, a, rng, true);

    unconnected_a = next_a;
    unconnected_b = next_b;
  }

  true
}

fn merge_into_larger(a: &mut VoxelSet, b: &mut VoxelSet) {
  if a.len() >= b.len() {
    a.extend(std::mem::take(b));
  } else {
    b.extend(std::mem::take(a));
  }
}

/// Voxels of `from` that touch `to`, in discovery order.
fn boundary<G: Geometry>(geometry: &G, from: &VoxelSet, to: &VoxelSet) -> Vec<Voxel> {
  let mut found = VoxelSet::new();
  for voxel in to {
    for neighbor in geometry.neighbors(*voxel) {
      if from.contains(&neighbor) {
        found.insert(neighbor);
      }
    }
  }
  found.into_vec()
}

/// Shift boundary voxels from the larger half to the smaller half until the
/// size gap is within tolerance.
///
/// A move is kept only if the donor stays connected. If no boundary voxel
/// can move, balancing stops and connect runs once more. Returns whether the
/// halves ended up within tolerance.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "connectivity::balance"))]
pub fn balance_voxels<G, R>(
  geometry: &G,
  a: &mut VoxelSet,
  b: &mut VoxelSet,
  rng: &mut R,
  config: &LocationConfig,
) -> bool
where
  G: Geometry,
  R: Rng,
{
  let mut moves = 0;

  loop {
    let total = a.len() + b.len();
    if a.len().abs_diff(b.len()) <= config.balance_limit(total) {
      return true;
    }
    if !within_cap(config.max_balance_iterations, moves) {
      #[cfg(feature = "tracing")]
      tracing::debug!(moves, a = a.len(), b = b.len(), "balance cap reached");
      return false;
    }

    let (from, to) = if a.len() > b.len() { (&mut *a, &mut *b) } else { (&mut *b, &mut *a) };

    let mut candidates = if to.is_empty() {
      from.as_slice().to_vec()
    } else {
      boundary(geometry, from, to)
    };
    candidates.shuffle(rng);

    let moved = candidates.into_iter().find(|voxel| {
      from.remove(voxel);
      if is_connected(geometry, from) {
        to.insert(*voxel);
        true
      } else {
        from.insert(*voxel);
        false
      }
    });

    if moved.is_none() {
      #[cfg(feature = "tracing")]
      tracing::debug!(a = a.len(), b = b.len(), "no connected move left, balance abandoned");
      connect_voxels(geometry, a, b, rng, config.max_connect_iterations);
      return false;
    }
    moves += 1;
  }
}

#[cfg(test)]
#[path = "connectivity_test.rs"]
mod connectivity_test;
