//! Grid orchestration for the modified marching cubes
//!
//! A [`Grid`] is built eagerly from a [`GridConfig`] and a [`ScalarField`]:
//! every corner of every cell is sampled once, every cell is classified, and
//! the result is immutable. Changing any parameter means building a new grid.
//!
//! Adjacent cells share corner positions, so the field is sampled on a
//! shared corner lattice of `(width + 1) x (height + 1) x (depth + 1)` points
//! and each cell reads its 8 charges from there. Lattice point `(i, j, k)`
//! sits at `(i - 0.5, j - 0.5, k - 0.5)`, exactly where the corresponding
//! cell corners are, so the output is identical to sampling cell by cell.
//!
//! Triangle vertices are fixed edge midpoints. No interpolation toward the
//! threshold crossing takes place.

use crate::cell::{sample_field, GridCell};
use crate::config::GridConfig;
use crate::parallel;
use crate::tables::CORNER_OFFSETS;
use isomesh_core::{Error, Point3f, Result, ScalarField, TriangleSoup};
use ndarray::Array3;

/// A sampled corner and its field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerSample {
    pub position: Point3f,
    pub charge: f64,
}

/// A fully built grid of classified cells
#[derive(Debug, Clone)]
pub struct Grid {
    config: GridConfig,
    /// Cells indexed `[x, y, z]` in standard layout
    cells: Array3<GridCell>,
}

fn never_cancelled() -> bool {
    false
}

/// Coordinates of a flat standard-layout index into a `(nx, ny, nz)` array
fn unravel(index: usize, (_, ny, nz): (usize, usize, usize)) -> (usize, usize, usize) {
    (index / (ny * nz), (index / nz) % ny, index % nz)
}

/// Lattice index offset (0 or 1 per axis) of each cell corner
fn corner_lattice_offset(corner: usize) -> [usize; 3] {
    CORNER_OFFSETS[corner].map(|offset| usize::from(offset > 0.0))
}

impl Grid {
    /// Build a grid, sampling the field at every cell corner
    pub fn build<F>(config: GridConfig, field: &F) -> Result<Self>
    where
        F: ScalarField + ?Sized,
    {
        Self::build_with_cancel(config, field, &never_cancelled)
    }

    /// Build a grid, giving up with [`Error::Cancelled`] once `cancelled` returns true.
    ///
    /// A failed or cancelled build never yields a partial grid.
    pub fn build_with_cancel<F>(
        config: GridConfig,
        field: &F,
        cancelled: &(dyn Fn() -> bool + Sync),
    ) -> Result<Self>
    where
        F: ScalarField + ?Sized,
    {
        if let Err(e) = config.validate() {
            tracing::warn!(error = %e, "rejected grid configuration");
            return Err(e);
        }

        let shape = config.dimensions();
        let (width, height, depth) = shape;
        let lattice_shape = (width + 1, height + 1, depth + 1);

        let lattice_len = lattice_shape.0 * lattice_shape.1 * lattice_shape.2;
        let charges = parallel::parallel_try_map_range(lattice_len, |index| {
            if cancelled() {
                return Err(Error::Cancelled);
            }
            let (i, j, k) = unravel(index, lattice_shape);
            let position = Point3f::new(i as f32 - 0.5, j as f32 - 0.5, k as f32 - 0.5);
            sample_field(field, &config, &position)
        })?;
        let lattice = Array3::from_shape_vec(lattice_shape, charges)
            .map_err(|e| Error::Algorithm(format!("corner lattice shape: {}", e)))?;

        if cancelled() {
            return Err(Error::Cancelled);
        }

        let cells = parallel::parallel_map_range(config.cell_count(), |index| {
            let (x, y, z) = unravel(index, shape);
            let charges = std::array::from_fn(|corner| {
                let [dx, dy, dz] = corner_lattice_offset(corner);
                lattice[[x + dx, y + dy, z + dz]]
            });
            GridCell::from_charges(x, y, z, charges, config.threshold)
        });
        let cells = Array3::from_shape_vec(shape, cells)
            .map_err(|e| Error::Algorithm(format!("cell array shape: {}", e)))?;

        tracing::debug!(
            width,
            height,
            depth,
            field_evaluations = lattice.len(),
            "built grid"
        );

        Ok(Self { config, cells })
    }

    /// Build a grid with every cell sampling its own 8 corners.
    ///
    /// Produces the same grid as [`Grid::build`] at roughly eight times the
    /// number of field evaluations.
    pub fn build_per_cell<F>(config: GridConfig, field: &F) -> Result<Self>
    where
        F: ScalarField + ?Sized,
    {
        config.validate()?;
        let shape = config.dimensions();
        let cells = parallel::parallel_try_map_range(config.cell_count(), |index| {
            let (x, y, z) = unravel(index, shape);
            GridCell::sample(x, y, z, &config, field)
        })?;
        let cells = Array3::from_shape_vec(shape, cells)
            .map_err(|e| Error::Algorithm(format!("cell array shape: {}", e)))?;
        Ok(Self { config, cells })
    }

    /// The configuration this grid was built from
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at lattice coordinates, if in bounds
    pub fn cell(&self, x: usize, y: usize, z: usize) -> Option<&GridCell> {
        self.cells.get([x, y, z])
    }

    /// All cells, x outermost and z innermost
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> + '_ {
        self.cells.iter()
    }

    /// Cells whose corners straddle the threshold
    pub fn active_cell_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| !matches!(cell.configuration(), 0 | u8::MAX))
            .count()
    }

    /// Center point of every cell
    pub fn cell_centers(&self) -> Vec<Point3f> {
        self.cells.iter().map(GridCell::center).collect()
    }

    /// Every cell's 8 corner positions with their charges, in cell order
    pub fn corner_samples(&self) -> Vec<CornerSample> {
        self.cells
            .iter()
            .flat_map(|cell| {
                cell.corner_positions()
                    .into_iter()
                    .zip(cell.charges().iter().copied())
                    .map(|(position, charge)| CornerSample { position, charge })
            })
            .collect()
    }

    /// Triangle vertices of the whole grid as a flat stream.
    ///
    /// Cells are visited x outermost and z innermost; each consecutive
    /// triple of points is one triangle.
    pub fn emit_triangle_vertices(&self) -> Vec<Point3f> {
        let mut vertices = Vec::new();
        for cell in self.cells.iter() {
            cell.emit_vertices(&mut vertices);
        }
        vertices
    }

    /// [`Grid::emit_triangle_vertices`] wrapped as a [`TriangleSoup`]
    pub fn triangle_soup(&self) -> TriangleSoup {
        TriangleSoup::from_vertices(self.emit_triangle_vertices())
    }
}

/// Build a grid and emit its triangle soup in one call
pub fn extract_surface<F>(config: GridConfig, field: &F) -> Result<TriangleSoup>
where
    F: ScalarField + ?Sized,
{
    let grid = Grid::build(config, field)?;
    let soup = grid.triangle_soup();
    tracing::debug!(
        cells = grid.len(),
        active_cells = grid.active_cell_count(),
        triangles = soup.triangle_count(),
        "extracted surface"
    );
    Ok(soup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::NoiseField;
    use isomesh_core::ConstantField;

    #[test]
    fn test_unravel_matches_standard_layout() {
        let shape = (3, 4, 5);
        let array = Array3::from_shape_fn(shape, |(x, y, z)| (x, y, z));
        for (index, coords) in array.iter().enumerate() {
            assert_eq!(unravel(index, shape), *coords);
        }
    }

    #[test]
    fn test_corner_lattice_offsets() {
        assert_eq!(corner_lattice_offset(0), [0, 0, 1]);
        assert_eq!(corner_lattice_offset(3), [1, 1, 1]);
        assert_eq!(corner_lattice_offset(4), [0, 0, 0]);
        assert_eq!(corner_lattice_offset(7), [1, 1, 0]);
    }

    #[test]
    fn test_build_allocates_every_cell() {
        let grid = Grid::build(GridConfig::new(3, 4, 5), &ConstantField(0.0)).unwrap();
        assert_eq!(grid.len(), 60);
        assert!(!grid.is_empty());
        assert_eq!(grid.cell(2, 3, 4).unwrap().coordinates(), (2, 3, 4));
        assert!(grid.cell(3, 0, 0).is_none());
    }

    #[test]
    fn test_cells_iterate_x_outer_z_inner() {
        let grid = Grid::build(GridConfig::new(2, 2, 2), &ConstantField(0.0)).unwrap();
        let order: Vec<_> = grid.cells().map(GridCell::coordinates).collect();
        assert_eq!(
            order,
            vec![
                (0, 0, 0),
                (0, 0, 1),
                (0, 1, 0),
                (0, 1, 1),
                (1, 0, 0),
                (1, 0, 1),
                (1, 1, 0),
                (1, 1, 1),
            ]
        );
    }

    #[test]
    fn test_shared_lattice_matches_per_cell_sampling() {
        let config = GridConfig::new(4, 3, 5)
            .with_resolution(0.37)
            .with_threshold(0.05)
            .with_shift(1.5, -2.25, 0.75);
        let field = NoiseField::default();
        let shared = Grid::build(config.clone(), &field).unwrap();
        let per_cell = Grid::build_per_cell(config, &field).unwrap();
        for (a, b) in shared.cells().zip(per_cell.cells()) {
            assert_eq!(a, b);
        }
        assert_eq!(shared.emit_triangle_vertices(), per_cell.emit_triangle_vertices());
    }

    #[test]
    fn test_invalid_config_builds_nothing() {
        let result = Grid::build(GridConfig::new(0, 2, 2), &ConstantField(0.0));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        let config = GridConfig::new(2, 2, 2).with_resolution(0.0);
        let result = Grid::build_per_cell(config, &ConstantField(0.0));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_non_finite_field_fails_build() {
        let field = |x: f64, _y: f64, _z: f64| if x > 0.2 { f64::INFINITY } else { 0.0 };
        let config = GridConfig::new(3, 1, 1).with_resolution(1.0);
        let shared = Grid::build(config.clone(), &field);
        assert!(matches!(shared, Err(Error::FieldEvaluation { .. })));
        let per_cell = Grid::build_per_cell(config, &field);
        assert!(matches!(per_cell, Err(Error::FieldEvaluation { .. })));
    }

    #[test]
    fn test_cancelled_build() {
        let config = GridConfig::new(2, 2, 2);
        let result = Grid::build_with_cancel(config, &ConstantField(0.0), &|| true);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_horizontal_plane() {
        // Inside above y = 0.25 in field space
        let field = |_x: f64, y: f64, _z: f64| y;
        let config = GridConfig::new(2, 2, 2).with_resolution(1.0).with_threshold(0.25);
        let grid = Grid::build(config, &field).unwrap();

        // Bottom row straddles the plane with its +y corners inside
        assert_eq!(grid.cell(0, 0, 0).unwrap().configuration(), 0b1100_1100);
        assert_eq!(grid.cell(0, 1, 0).unwrap().configuration(), 255);
        assert_eq!(grid.active_cell_count(), 4);

        let vertices = grid.emit_triangle_vertices();
        assert_eq!(vertices.len(), 4 * 2 * 3);
        assert!(vertices.iter().all(|v| v.y == 0.0));
    }

    #[test]
    fn test_cell_centers_and_corner_samples() {
        let field = |x: f64, y: f64, z: f64| x + y + z;
        let grid = Grid::build(GridConfig::new(2, 1, 1).with_resolution(1.0), &field).unwrap();
        assert_eq!(
            grid.cell_centers(),
            vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0)]
        );
        let samples = grid.corner_samples();
        assert_eq!(samples.len(), 16);
        for sample in &samples {
            let p = sample.position;
            assert_eq!(sample.charge, f64::from(p.x + p.y + p.z));
        }
    }

    #[test]
    fn test_extract_surface_uniform_field_is_empty() {
        for threshold in [1.0, -1.0] {
            let config = GridConfig::new(3, 3, 3).with_threshold(threshold);
            let soup = extract_surface(config, &ConstantField(0.0)).unwrap();
            assert!(soup.is_empty());
        }
    }
}
