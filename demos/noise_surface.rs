//! Extract a noise isosurface and optionally save it as Wavefront OBJ
//!
//! ```text
//! noise_surface -X 20 -Y 20 -Z 40 --threshold -0.3 --obj surface.obj
//! ```
//!
//! Set `RUST_LOG=debug` to see grid sampling details.

use anyhow::{Context, Result};
use clap::Parser;
use isomesh_extraction::{Grid, GridConfig, GridParams, NoiseField, DEFAULT_SEED};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Extract a noise isosurface with modified marching cubes")]
struct Args {
    /// Cells along x
    #[arg(short = 'X', long = "x", default_value_t = 20)]
    x: i64,
    /// Cells along the horizontal depth axis
    #[arg(short = 'Y', long = "y", default_value_t = 20)]
    y: i64,
    /// Cells along the vertical axis
    #[arg(short = 'Z', long = "z", default_value_t = 40)]
    z: i64,
    #[arg(long, default_value_t = 0.15)]
    resolution: f64,
    #[arg(long, default_value_t = -0.3, allow_hyphen_values = true)]
    threshold: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    shift_x: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    shift_y: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    shift_z: f64,
    /// Noise seed string
    #[arg(long, default_value = DEFAULT_SEED)]
    seed: String,
    /// Write the surface to this OBJ file
    #[arg(long)]
    obj: Option<PathBuf>,
}

impl From<&Args> for GridParams {
    fn from(args: &Args) -> Self {
        GridParams {
            x: args.x,
            y: args.y,
            z: args.z,
            resolution: args.resolution,
            threshold: args.threshold,
            shift_noise_x: args.shift_x,
            shift_noise_y: args.shift_y,
            shift_noise_z: args.shift_z,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config =
        GridConfig::try_from(GridParams::from(&args)).context("invalid grid parameters")?;
    let field = NoiseField::new(&args.seed);

    let grid = Grid::build(config, &field).context("failed to build grid")?;
    let soup = grid.triangle_soup();
    tracing::info!(
        seed = %args.seed,
        cells = grid.len(),
        active = grid.active_cell_count(),
        triangles = soup.triangle_count(),
        "extracted surface"
    );

    if let Some(path) = &args.obj {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        soup.write_obj(&mut writer)?;
        writer.flush()?;
        tracing::info!(path = %path.display(), "wrote OBJ");
    }

    Ok(())
}
