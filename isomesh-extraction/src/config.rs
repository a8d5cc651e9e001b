//! Grid configuration
//!
//! [`GridConfig`] is the validated, immutable description of one grid build.
//! [`GridParams`] is the flat parameter record an interactive front end
//! edits (`X`, `Y`, `Z`, `resolution`, `threshold`, `shiftnoiseX/Y/Z`); it
//! converts into a `GridConfig` using the renderer's Y-up convention, where
//! the user's `Z` extent becomes the grid's vertical `height`.

use isomesh_core::{to_point3d, Error, Point3f, Result};
use serde::{Deserialize, Serialize};

/// Parameters of a single grid build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of cells along x
    pub width: usize,
    /// Number of cells along y
    pub height: usize,
    /// Number of cells along z
    pub depth: usize,
    /// Corners with a field value strictly above this are inside
    pub threshold: f64,
    /// Scale from lattice coordinates to field coordinates
    pub resolution: f64,
    /// Field-space offset, named by the user-facing axes `(x, y, z)`
    pub shift: [f64; 3],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 40,
            depth: 20,
            threshold: -0.3,
            resolution: 0.15,
            shift: [0.0; 3],
        }
    }
}

impl GridConfig {
    /// Create a configuration with the given cell counts and default field parameters
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
            ..Default::default()
        }
    }

    /// Set the classification threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the lattice-to-field scale
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the field offset
    pub fn with_shift(mut self, x: f64, y: f64, z: f64) -> Self {
        self.shift = [x, y, z];
        self
    }

    /// Grid shape as `(width, height, depth)`
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Reject configurations that cannot produce a grid
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(Error::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}x{}",
                self.width, self.height, self.depth
            )));
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "resolution must be positive and finite, got {}",
                self.resolution
            )));
        }
        if !self.threshold.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if self.shift.iter().any(|s| !s.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "shift must be finite, got {:?}",
                self.shift
            )));
        }
        // The corner lattice is one larger than the cell grid on every axis
        let lattice = [self.width, self.height, self.depth]
            .iter()
            .try_fold(1usize, |acc, n| n.checked_add(1).and_then(|n| acc.checked_mul(n)));
        if lattice.is_none() {
            return Err(Error::InvalidConfig(format!(
                "grid {}x{}x{} is too large",
                self.width, self.height, self.depth
            )));
        }
        Ok(())
    }

    /// Field coordinates sampled for a lattice position.
    ///
    /// The vertical y axis is offset by the user's z shift and the z axis by
    /// the user's y shift, matching the Y-up mapping of [`GridParams`].
    pub fn sample_coordinates(&self, position: &Point3f) -> [f64; 3] {
        let [shift_x, shift_y, shift_z] = self.shift;
        let p = to_point3d(position) * self.resolution;
        [p.x + shift_x, p.y + shift_z, p.z + shift_y]
    }
}

/// User-facing parameter record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    #[serde(rename = "X")]
    pub x: i64,
    #[serde(rename = "Y")]
    pub y: i64,
    #[serde(rename = "Z")]
    pub z: i64,
    pub resolution: f64,
    pub threshold: f64,
    #[serde(rename = "shiftnoiseX")]
    pub shift_noise_x: f64,
    #[serde(rename = "shiftnoiseY")]
    pub shift_noise_y: f64,
    #[serde(rename = "shiftnoiseZ")]
    pub shift_noise_z: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            x: 20,
            y: 20,
            z: 40,
            resolution: 0.15,
            threshold: -0.3,
            shift_noise_x: 0.0,
            shift_noise_y: 0.0,
            shift_noise_z: 0.0,
        }
    }
}

fn positive_extent(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| Error::InvalidConfig(format!("{} must be positive, got {}", name, value)))
}

impl TryFrom<&GridParams> for GridConfig {
    type Error = Error;

    fn try_from(params: &GridParams) -> Result<Self> {
        let config = GridConfig {
            width: positive_extent("X", params.x)?,
            height: positive_extent("Z", params.z)?,
            depth: positive_extent("Y", params.y)?,
            threshold: params.threshold,
            resolution: params.resolution,
            shift: [params.shift_noise_x, params.shift_noise_y, params.shift_noise_z],
        };
        config.validate()?;
        Ok(config)
    }
}

impl TryFrom<GridParams> for GridConfig {
    type Error = Error;

    fn try_from(params: GridParams) -> Result<Self> {
        GridConfig::try_from(&params)
    }
}
