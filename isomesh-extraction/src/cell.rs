//! Grid cells: corner sampling and configuration classification

use crate::config::GridConfig;
use crate::tables::{triangle_edges, CORNER_OFFSETS, EDGE_OFFSETS};
use isomesh_core::{Error, Point3f, Result, ScalarField};

/// Corner positions of the cell centered at `(x, y, z)`
pub fn corner_positions(x: usize, y: usize, z: usize) -> [Point3f; 8] {
    offset_points(x, y, z, &CORNER_OFFSETS)
}

/// Edge midpoint positions of the cell centered at `(x, y, z)`
pub fn edge_positions(x: usize, y: usize, z: usize) -> [Point3f; 12] {
    offset_points(x, y, z, &EDGE_OFFSETS)
}

fn offset_points<const N: usize>(
    x: usize,
    y: usize,
    z: usize,
    offsets: &[[f32; 3]; N],
) -> [Point3f; N] {
    let center = Point3f::new(x as f32, y as f32, z as f32);
    std::array::from_fn(|i| {
        let [dx, dy, dz] = offsets[i];
        Point3f::new(center.x + dx, center.y + dy, center.z + dz)
    })
}

/// Evaluate the field at a lattice position, rejecting non-finite values
pub fn sample_field<F>(field: &F, config: &GridConfig, position: &Point3f) -> Result<f64>
where
    F: ScalarField + ?Sized,
{
    let [x, y, z] = config.sample_coordinates(position);
    let value = field.sample(x, y, z);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::FieldEvaluation { x, y, z, value })
    }
}

/// Pack the inside/outside state of 8 corner charges into a configuration index.
///
/// Corner `i` sets bit `i` when its charge is strictly greater than the
/// threshold; a charge equal to the threshold counts as outside.
pub fn configuration_index(charges: &[f64; 8], threshold: f64) -> u8 {
    charges
        .iter()
        .enumerate()
        .filter(|(_, charge)| **charge > threshold)
        .fold(0u8, |index, (corner, _)| index | (1 << corner))
}

/// One lattice cube with its sampled corner charges
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    x: usize,
    y: usize,
    z: usize,
    charges: [f64; 8],
    configuration: u8,
}

impl GridCell {
    /// Build a cell from already sampled corner charges
    pub fn from_charges(x: usize, y: usize, z: usize, charges: [f64; 8], threshold: f64) -> Self {
        Self {
            x,
            y,
            z,
            configuration: configuration_index(&charges, threshold),
            charges,
        }
    }

    /// Sample the 8 corners of the cell at `(x, y, z)` and classify them
    pub fn sample<F>(x: usize, y: usize, z: usize, config: &GridConfig, field: &F) -> Result<Self>
    where
        F: ScalarField + ?Sized,
    {
        let corners = corner_positions(x, y, z);
        let mut charges = [0.0; 8];
        for (charge, corner) in charges.iter_mut().zip(corners.iter()) {
            *charge = sample_field(field, config, corner)?;
        }
        Ok(Self::from_charges(x, y, z, charges, config.threshold))
    }

    /// Lattice coordinates of the cell
    pub fn coordinates(&self) -> (usize, usize, usize) {
        (self.x, self.y, self.z)
    }

    /// Cell center
    pub fn center(&self) -> Point3f {
        Point3f::new(self.x as f32, self.y as f32, self.z as f32)
    }

    pub fn corner_positions(&self) -> [Point3f; 8] {
        corner_positions(self.x, self.y, self.z)
    }

    pub fn edge_positions(&self) -> [Point3f; 12] {
        edge_positions(self.x, self.y, self.z)
    }

    /// Field values at the 8 corners
    pub fn charges(&self) -> &[f64; 8] {
        &self.charges
    }

    /// Inside flags of the 8 corners
    pub fn corner_flags(&self) -> [bool; 8] {
        std::array::from_fn(|corner| self.configuration & (1 << corner) != 0)
    }

    /// Configuration index in `0..=255`
    pub fn configuration(&self) -> u8 {
        self.configuration
    }

    /// Append this cell's triangle vertices (fixed edge midpoints) to `out`
    pub fn emit_vertices(&self, out: &mut Vec<Point3f>) {
        if self.configuration == 0 || self.configuration == u8::MAX {
            return;
        }
        let edges = self.edge_positions();
        out.extend(triangle_edges(self.configuration).map(|edge| edges[edge]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomesh_core::ConstantField;
    use std::collections::HashSet;

    fn point_key(p: &Point3f) -> [u32; 3] {
        [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
    }

    #[test]
    fn test_corner_positions_are_distinct_sign_flips() {
        let center = Point3f::new(3.0, 4.0, 5.0);
        let corners = corner_positions(3, 4, 5);
        let unique: HashSet<_> = corners.iter().map(point_key).collect();
        assert_eq!(unique.len(), 8);
        for corner in &corners {
            let d = corner - center;
            assert!(d.iter().all(|c| c.abs() == 0.5));
        }
        assert_eq!(corners[0], Point3f::new(2.5, 3.5, 5.5));
        assert_eq!(corners[7], Point3f::new(3.5, 4.5, 4.5));
    }

    #[test]
    fn test_edge_positions_offset_on_two_axes() {
        let center = Point3f::new(1.0, 0.0, 2.0);
        let edges = edge_positions(1, 0, 2);
        let unique: HashSet<_> = edges.iter().map(point_key).collect();
        assert_eq!(unique.len(), 12);
        for edge in &edges {
            let d = edge - center;
            assert_eq!(d.iter().filter(|c| c.abs() == 0.5).count(), 2);
            assert_eq!(d.iter().filter(|c| **c == 0.0).count(), 1);
        }
    }

    #[test]
    fn test_configuration_bits_follow_corner_order() {
        let mut charges = [0.0; 8];
        charges[1] = 1.0;
        charges[6] = 1.0;
        assert_eq!(configuration_index(&charges, 0.5), 0b0100_0010);
        assert_eq!(configuration_index(&[1.0; 8], 0.5), 255);
        assert_eq!(configuration_index(&[0.0; 8], 0.5), 0);
    }

    #[test]
    fn test_threshold_comparison_is_strict() {
        assert_eq!(configuration_index(&[0.25; 8], 0.25), 0);
    }

    #[test]
    fn test_raising_threshold_only_clears_flags() {
        let charges = [-0.9, -0.4, -0.1, 0.0, 0.2, 0.35, 0.7, 0.95];
        let thresholds = [-1.0, -0.5, -0.2, 0.0, 0.1, 0.5, 0.9, 1.0];
        for pair in thresholds.windows(2) {
            let low = configuration_index(&charges, pair[0]);
            let high = configuration_index(&charges, pair[1]);
            assert_eq!(high & !low, 0, "threshold {} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_sample_reads_absolute_corner_positions() {
        let config = GridConfig::new(4, 4, 4).with_resolution(1.0);
        // Inside wherever sampled x is positive
        let field = |x: f64, _y: f64, _z: f64| x;
        let cell = GridCell::sample(0, 0, 0, &config, &field).unwrap();
        assert_eq!(cell.charges()[0], -0.5);
        assert_eq!(cell.charges()[1], 0.5);
        assert_eq!(
            cell.corner_flags(),
            [false, true, false, true, false, true, false, true]
        );
        assert_eq!(cell.configuration(), 0b1010_1010);
    }

    #[test]
    fn test_sample_rejects_non_finite_field() {
        let config = GridConfig::new(1, 1, 1);
        let field = |_x: f64, _y: f64, _z: f64| f64::NAN;
        let result = GridCell::sample(0, 0, 0, &config, &field);
        assert!(matches!(result, Err(Error::FieldEvaluation { .. })));
    }

    #[test]
    fn test_uniform_cells_emit_nothing() {
        let config = GridConfig::new(1, 1, 1).with_threshold(0.0);
        let mut out = Vec::new();
        GridCell::sample(0, 0, 0, &config, &ConstantField(1.0))
            .unwrap()
            .emit_vertices(&mut out);
        GridCell::sample(0, 0, 0, &config, &ConstantField(-1.0))
            .unwrap()
            .emit_vertices(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_corner_emits_adjacent_midpoints() {
        let mut charges = [0.0; 8];
        charges[0] = 1.0;
        let cell = GridCell::from_charges(2, 2, 2, charges, 0.5);
        let mut out = Vec::new();
        cell.emit_vertices(&mut out);
        assert_eq!(out.len(), 3);
        let corner = cell.corner_positions()[0];
        for p in &out {
            // Each midpoint is half a unit from corner 0 along one axis
            assert_eq!((p - corner).iter().map(|c| c.abs()).sum::<f32>(), 0.5);
        }
    }
}
