//! Core data structures and traits for isomesh
//! 
//! This crate provides the fundamental types shared by the extraction
//! pipeline and its consumers: points, triangle soups and indexed meshes,
//! the scalar field abstraction, and the common error type.

pub mod point;
pub mod mesh;
pub mod traits;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

// Type aliases for easier imports
pub type Point = Point3f;
pub type Mesh = TriangleMesh;
