//! # isomesh
//!
//! Isosurface extraction from seeded noise fields.
//!
//! This is the umbrella crate that provides convenient access to all isomesh
//! functionality. You can use this crate to get everything in one place, or
//! use the individual crates for more granular control over dependencies.
//!
//! ## Crates
//!
//! - **Core**: shared data types (points, triangle soups, meshes, the
//!   scalar field trait, errors)
//! - **Extraction**: noise field, grid, triangulation table and the
//!   last-request-wins rebuild session
//!
//! ## Quick Start
//!
//! ```rust
//! use isomesh::prelude::*;
//!
//! let params = GridParams { x: 4, y: 4, z: 4, ..Default::default() };
//! let config = GridConfig::try_from(&params).unwrap();
//! let grid = Grid::build(config, &NoiseField::new(DEFAULT_SEED)).unwrap();
//!
//! let soup = grid.triangle_soup();
//! assert_eq!(soup.as_flat().len(), soup.len() * 3);
//! ```

// Re-export core functionality
pub use isomesh_core::*;

// Re-export sub-crates
pub use isomesh_extraction as extraction;

/// Convenient imports for common use cases
pub mod prelude {
    pub use isomesh_core::*;
    pub use isomesh_extraction::*;
}
