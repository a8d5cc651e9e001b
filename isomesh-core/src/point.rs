//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Widen a render-space point to the double precision used for field sampling
pub fn to_point3d(p: &Point3f) -> Point3d {
    Point3d::new(f64::from(p.x), f64::from(p.y), f64::from(p.z))
}
