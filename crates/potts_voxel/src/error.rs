//! Caller contract violations.
//!
//! Degenerate but valid outcomes (an unbalanced split, an empty daughter
//! after connectivity repair, a factory that yields nothing) are returned as
//! values, not errors.

use thiserror::Error;

use crate::region::Region;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
  #[error("cannot split a location with {volume} voxel(s); at least 2 are required")]
  TooFewVoxels { volume: usize },

  #[error("location has no voxels")]
  EmptyLocation,

  #[error("offset needs 1, 2 or 3 percentages, got {0}")]
  InvalidOffset(usize),

  #[error("region {0:?} is not registered on this location")]
  UnregisteredRegion(Region),
}

pub type Result<T, E = LocationError> = std::result::Result<T, E>;
