//! Integer axis-aligned bounding box over voxels.

use glam::IVec3;

use crate::voxel::Voxel;

/// Inclusive integer bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelBounds {
  /// Minimum corner (inclusive).
  pub min: IVec3,
  /// Maximum corner (inclusive).
  pub max: IVec3,
}

impl VoxelBounds {
  /// Create bounds from min and max corners.
  ///
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: IVec3, max: IVec3) -> Self {
    debug_assert!(
      min.x <= max.x && min.y <= max.y && min.z <= max.z,
      "bounds min must be <= max on all axes"
    );
    Self { min, max }
  }

  /// Tightest bounds around the given voxels, or None if there are none.
  pub fn enclosing<'a>(voxels: impl IntoIterator<Item = &'a Voxel>) -> Option<Self> {
    let mut iter = voxels.into_iter();
    let first = IVec3::from(*iter.next()?);
    let (min, max) = iter.fold((first, first), |(min, max), v| {
      let p = IVec3::from(*v);
      (min.min(p), max.max(p))
    });
    Some(Self { min, max })
  }

  /// Number of voxels spanned along each axis.
  #[inline]
  pub fn extent(&self) -> IVec3 {
    self.max - self.min + IVec3::ONE
  }

  #[inline]
  pub fn contains(&self, voxel: Voxel) -> bool {
    voxel.x >= self.min.x
      && voxel.x <= self.max.x
      && voxel.y >= self.min.y
      && voxel.y <= self.max.y
      && voxel.z >= self.min.z
      && voxel.z <= self.max.z
  }

  /// Voxel at the given per-axis percentages between min and max.
  ///
  /// Each coordinate is `round(min + (max - min) * pct / 100)`.
  pub fn offset(&self, percents: IVec3) -> Voxel {
    let lerp = |min: i32, max: i32, pct: i32| {
      (min as f64 + (max - min) as f64 * (pct as f64 / 100.0)).round() as i32
    };
    Voxel::new(
      lerp(self.min.x, self.max.x, percents.x),
      lerp(self.min.y, self.max.y, percents.y),
      lerp(self.min.z, self.max.z, percents.z),
    )
  }
}
