//! # isomesh extraction
//!
//! Isosurface extraction from procedural scalar fields with a modified
//! marching cubes.
//!
//! The field is sampled at the corners of a regular lattice of unit cells,
//! each corner is classified against a threshold, and a fixed 256-row table
//! turns every cell's configuration into triangles whose vertices are the
//! midpoints of the cube edges. The output is a flat triangle soup ready to
//! upload as a position buffer.
//!
//! ```rust
//! use isomesh_extraction::{extract_surface, GridConfig, NoiseField, DEFAULT_SEED};
//!
//! let config = GridConfig::new(8, 8, 8).with_threshold(0.0).with_resolution(0.3);
//! let soup = extract_surface(config, &NoiseField::new(DEFAULT_SEED)).unwrap();
//! assert_eq!(soup.len() % 3, 0);
//! ```

pub mod cell;
pub mod config;
pub mod grid;
pub mod noise_field;
pub mod parallel;
pub mod session;
pub mod tables;

// Re-export commonly used items
pub use cell::*;
pub use config::*;
pub use grid::*;
pub use noise_field::*;
pub use session::*;
pub use tables::{triangle_count, triangle_edges, TRIANGLE_TABLE};
