//! Mesh data structures and functionality

use crate::error::Result;
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// A flat triangle-soup vertex stream.
///
/// Every consecutive triple of vertices is one triangle. Triangles never
/// share vertices, so there is no index buffer and no deduplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleSoup {
    pub vertices: Vec<Point3f>,
}

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
}

impl TriangleSoup {
    /// Create a new empty soup
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing vertex stream. The length must be a multiple of 3.
    pub fn from_vertices(vertices: Vec<Point3f>) -> Self {
        debug_assert_eq!(vertices.len() % 3, 0, "triangle soup must hold whole triangles");
        Self { vertices }
    }

    /// Number of vertices in the stream
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the soup holds no triangles
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of triangles in the stream
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Iterate over the triangles as vertex triples
    pub fn triangles(&self) -> impl Iterator<Item = [Point3f; 3]> + '_ {
        self.vertices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
    }

    /// View the vertices as a flat `x, y, z, x, y, z, ...` float buffer
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Convert to an indexed mesh with faces `[3i, 3i + 1, 3i + 2]`.
    ///
    /// Vertices are copied as-is; no welding takes place.
    pub fn to_indexed_mesh(&self) -> TriangleMesh {
        let faces = (0..self.triangle_count())
            .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
            .collect();
        TriangleMesh::from_vertices_and_faces(self.vertices.clone(), faces)
    }

    /// Write the soup as Wavefront OBJ text
    pub fn write_obj<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "# isomesh triangle soup")?;
        writeln!(writer, "# {} vertices, {} faces", self.len(), self.triangle_count())?;
        for v in &self.vertices {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }
        // OBJ indices are 1-based
        for t in 0..self.triangle_count() {
            let base = 3 * t + 1;
            writeln!(writer, "f {} {} {}", base, base + 1, base + 2)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Calculate face normals
    ///
    /// Degenerate faces yield a zero vector instead of NaN components.
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                edge1
                    .cross(&edge2)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }
}

impl From<TriangleSoup> for TriangleMesh {
    fn from(soup: TriangleSoup) -> Self {
        let faces = (0..soup.triangle_count())
            .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
            .collect();
        TriangleMesh::from_vertices_and_faces(soup.vertices, faces)
    }
}
