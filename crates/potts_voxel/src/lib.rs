//! potts_voxel - Discrete spatial engine for cellular Potts simulations
//!
//! Each simulated cell owns a set of lattice voxels. This crate keeps that
//! footprint's measures current under single-voxel moves, divides it with a
//! plane while keeping both halves connected and balanced, optionally
//! partitions it into sub-cellular regions, and places initial cells on an
//! empty lattice.
//!
//! # Features
//!
//! - **Incremental bookkeeping**: volume, surface, height and centroid
//!   updated in O(neighbors) per add/remove
//! - **Plane split**: direction from measured diameters, connectivity
//!   repair and size balancing
//! - **Regions**: nested per-region locations with fraction-preserving split
//! - **Factory**: non-overlapping tiling of the lattice and realization of
//!   containers to target volumes
//! - **2D and 3D** through the [`Geometry`] strategy
//!
//! # Example
//!
//! ```ignore
//! use potts_voxel::{Geometry3D, Lattice, Location, Voxel};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut lattice = Lattice::new(20, 20, 20);
//!
//! let mut cell = Location::new(Geometry3D, (0..8).map(|x| Voxel::new(x + 5, 5, 5)));
//! let daughter = cell.split(&mut rng)?;
//!
//! cell.update(1, &mut lattice);
//! daughter.update(2, &mut lattice);
//! ```

pub mod bounds;
pub mod config;
pub mod connectivity;
pub mod container;
pub mod error;
pub mod factory;
pub mod geometry;
pub mod lattice;
pub mod location;
pub mod plane;
pub mod region;
pub mod regions;
pub mod selection;
pub mod voxel;
pub mod voxel_set;

// Re-export commonly used items
pub use bounds::VoxelBounds;
pub use config::{LocationConfig, SplitRule};
pub use connectivity::{balance_voxels, check_voxels, connect_voxels, is_connected};
pub use container::LocationContainer;
pub use error::{LocationError, Result};
pub use factory::{FactoryConfig, LocationFactory, PopulationConfig};
pub use geometry::{Direction, Geometry, Geometry2D, Geometry3D};
pub use lattice::Lattice;
pub use location::{Location, SplitOptions};
pub use plane::{Plane, Side};
pub use region::Region;
pub use regions::RegionedLocation;
pub use selection::{decrease, get_selected, increase};
pub use voxel::Voxel;
pub use voxel_set::VoxelSet;
