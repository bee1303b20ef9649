//! VoxelSet - insertion-ordered voxel collection with O(1) membership.
//!
//! Locations need set semantics (no duplicates, fast `contains`) but every
//! randomized algorithm also needs a reproducible iteration order so that a
//! fixed seed replays the same result. A plain `HashSet` gives the former but
//! not the latter, so the set keeps a dense `Vec` for ordering plus an index
//! map for lookup.
//!
//! ```text
//! items: [a, b, c, d]        index: {a:0, b:1, c:2, d:3}
//! remove(b) -> swap_remove
//! items: [a, d, c]           index: {a:0, d:1, c:2}
//! ```

use std::collections::HashMap;

use crate::voxel::Voxel;

/// Ordered set of voxels.
#[derive(Clone, Debug, Default)]
pub struct VoxelSet {
  items: Vec<Voxel>,
  index: HashMap<Voxel, usize>,
}

impl VoxelSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      items: Vec::with_capacity(capacity),
      index: HashMap::with_capacity(capacity),
    }
  }

  /// Insert a voxel. Returns false if it was already present.
  pub fn insert(&mut self, voxel: Voxel) -> bool {
    if self.index.contains_key(&voxel) {
      return false;
    }
    self.index.insert(voxel, self.items.len());
    self.items.push(voxel);
    true
  }

  /// Remove a voxel. Returns false if it was absent.
  ///
  /// The last voxel takes the removed voxel's slot, so ordering changes
  /// deterministically.
  pub fn remove(&mut self, voxel: &Voxel) -> bool {
    let Some(slot) = self.index.remove(voxel) else {
      return false;
    };
    self.items.swap_remove(slot);
    if let Some(moved) = self.items.get(slot) {
      self.index.insert(*moved, slot);
    }
    true
  }

  #[inline]
  pub fn contains(&self, voxel: &Voxel) -> bool {
    self.index.contains_key(voxel)
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.items.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  #[inline]
  pub fn get(&self, slot: usize) -> Option<Voxel> {
    self.items.get(slot).copied()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Voxel> {
    self.items.iter()
  }

  pub fn as_slice(&self) -> &[Voxel] {
    &self.items
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.index.clear();
  }

  pub fn into_vec(self) -> Vec<Voxel> {
    self.items
  }

  /// Remove every voxel contained in `other`.
  pub fn remove_all<'a>(&mut self, other: impl IntoIterator<Item = &'a Voxel>) {
    for voxel in other {
      self.remove(voxel);
    }
  }
}

impl PartialEq for VoxelSet {
  /// Set equality; insertion order is ignored.
  fn eq(&self, other: &Self) -> bool {
    self.len() == other.len() && self.items.iter().all(|v| other.contains(v))
  }
}

impl Eq for VoxelSet {}

impl FromIterator<Voxel> for VoxelSet {
  fn from_iter<I: IntoIterator<Item = Voxel>>(iter: I) -> Self {
    let mut set = Self::new();
    set.extend(iter);
    set
  }
}

impl Extend<Voxel> for VoxelSet {
  fn extend<I: IntoIterator<Item = Voxel>>(&mut self, iter: I) {
    for voxel in iter {
      self.insert(voxel);
    }
  }
}

impl<'a> IntoIterator for &'a VoxelSet {
  type Item = &'a Voxel;
  type IntoIter = std::slice::Iter<'a, Voxel>;

  fn into_iter(self) -> Self::IntoIter {
    self.items.iter()
  }
}

impl IntoIterator for VoxelSet {
  type Item = Voxel;
  type IntoIter = std::vec::IntoIter<Voxel>;

  fn into_iter(self) -> Self::IntoIter {
    self.items.into_iter()
  }
}

#[cfg(test)]
#[path = "voxel_set_test.rs"]
mod voxel_set_test;
