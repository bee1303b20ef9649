//! Voxel selection utilities shared by the factory and regioned locations.
//!
//! - [`get_selected`]: the n candidates nearest a focus.
//! - [`increase`]: grow a selection through neighboring candidates.
//! - [`decrease`]: shrink a selection without disconnecting it.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::within_cap;
use crate::connectivity::is_connected;
use crate::geometry::Geometry;
use crate::voxel::Voxel;
use crate::voxel_set::VoxelSet;

/// The `n` candidates closest to `focus`.
///
/// Equal distances keep their input order, so the result is deterministic.
pub fn get_selected(candidates: &[Voxel], focus: Voxel, n: usize) -> Vec<Voxel> {
  let mut sorted = candidates.to_vec();
  sorted.sort_by_key(|voxel| voxel.distance_squared(focus));
  sorted.truncate(n);
  sorted
}

/// Grow `selected` toward `target` by adding shuffled unselected neighbors
/// that satisfy `in_candidates`, one frontier ring per round.
///
/// Returns whether the target was reached. Stops early when no candidate
/// neighbor is left or after `max_rounds` rounds (0 = unlimited).
pub fn increase<G, R, F>(
  geometry: &G,
  in_candidates: F,
  selected: &mut VoxelSet,
  target: usize,
  max_rounds: usize,
  rng: &mut R,
) -> bool
where
  G: Geometry,
  R: Rng,
  F: Fn(&Voxel) -> bool,
{
  let mut rounds = 0;

  while selected.len() < target {
    if !within_cap(max_rounds, rounds) {
      #[cfg(feature = "tracing")]
      tracing::debug!(rounds, selected = selected.len(), target, "growth cap reached");
      return false;
    }
    rounds += 1;

    let mut frontier = VoxelSet::new();
    for voxel in selected.iter() {
      for neighbor in geometry.neighbors(*voxel) {
        if !selected.contains(&neighbor) && in_candidates(&neighbor) {
          frontier.insert(neighbor);
        }
      }
    }
    if frontier.is_empty() {
      return false;
    }

    let mut frontier = frontier.into_vec();
    frontier.shuffle(rng);
    let needed = target - selected.len();
    selected.extend(frontier.into_iter().take(needed));
  }

  true
}

/// Whether removing `voxel` would leave one of its selected neighbors with
/// no other selected neighbor.
fn strands_neighbor<G: Geometry>(geometry: &G, selected: &VoxelSet, voxel: Voxel) -> bool {
  geometry
    .neighbors(voxel)
    .into_iter()
    .filter(|neighbor| selected.contains(neighbor))
    .any(|neighbor| {
      geometry
        .neighbors(neighbor)
        .iter()
        .all(|other| *other == voxel || !selected.contains(other))
    })
}

/// Voxels with at least one unselected neighbor.
fn boundary<G: Geometry>(geometry: &G, selected: &VoxelSet) -> Vec<Voxel> {
  selected
    .iter()
    .filter(|voxel| {
      geometry
        .neighbors(**voxel)
        .iter()
        .any(|neighbor| !selected.contains(neighbor))
    })
    .copied()
    .collect()
}

/// Remove `voxel` unless that strands a neighbor or splits the selection.
fn try_remove<G: Geometry>(geometry: &G, selected: &mut VoxelSet, voxel: Voxel) -> bool {
  if selected.len() <= 2 {
    return selected.remove(&voxel);
  }
  if strands_neighbor(geometry, selected, voxel) {
    return false;
  }
  selected.remove(&voxel);
  if is_connected(geometry, selected) {
    true
  } else {
    selected.insert(voxel);
    false
  }
}

/// Shrink `selected` to `target` by removing random voxels, boundary
/// voxels first.
///
/// A removal is rejected if it would strand a neighbor or split the rest
/// of the selection; the last two voxels may go freely. Returns whether the
/// target was reached.
pub fn decrease<G, R>(geometry: &G, selected: &mut VoxelSet, target: usize, rng: &mut R) -> bool
where
  G: Geometry,
  R: Rng,
{
  while selected.len() > target {
    let mut candidates = boundary(geometry, selected);
    candidates.shuffle(rng);
    if candidates.into_iter().any(|voxel| try_remove(geometry, selected, voxel)) {
      continue;
    }

    let mut candidates = selected.as_slice().to_vec();
    candidates.shuffle(rng);
    if candidates.into_iter().any(|voxel| try_remove(geometry, selected, voxel)) {
      continue;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(selected = selected.len(), target, "no removable voxel left");
    return false;
  }

  true
}

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;
