//! Integration tests for isomesh-extraction
//!
//! These tests run the whole pipeline (field, grid, table, vertex stream)
//! and the rebuild session from the outside, the way a renderer uses them.

use isomesh_core::{ConstantField, Error, Point3f, ScalarField};
use isomesh_extraction::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};

/// Signed distance-like field of a sphere, positive inside
fn sphere_field(center: [f64; 3], radius: f64) -> impl ScalarField {
    move |x: f64, y: f64, z: f64| {
        let [cx, cy, cz] = center;
        let d = ((x - cx).powi(2) + (y - cy).powi(2) + (z - cz).powi(2)).sqrt();
        radius - d
    }
}

fn reference_config() -> GridConfig {
    GridConfig::new(2, 2, 2)
        .with_threshold(-0.3)
        .with_resolution(0.15)
        .with_shift(0.0, 0.0, 0.0)
}

#[test]
fn test_reference_scenario_baseline() {
    let grid = Grid::build(reference_config(), &NoiseField::new(DEFAULT_SEED)).unwrap();
    let configurations: Vec<u8> = grid.cells().map(|cell| cell.configuration()).collect();
    assert_eq!(configurations, vec![255, 255, 63, 255, 255, 255, 63, 255]);

    let soup = grid.triangle_soup();
    assert!(!soup.is_empty());
    assert_eq!(soup.len(), 12);
    assert_eq!(soup.triangle_count(), 4);
}

#[test]
fn test_reference_params_match_baseline() {
    let params = GridParams {
        x: 2,
        y: 2,
        z: 2,
        ..Default::default()
    };
    let config = GridConfig::try_from(&params).unwrap();
    let soup = extract_surface(config, &NoiseField::new(DEFAULT_SEED)).unwrap();
    assert_eq!(soup.len(), 12);
}

#[test]
fn test_reference_scenario_is_reproducible() {
    let first = extract_surface(reference_config(), &NoiseField::new(DEFAULT_SEED)).unwrap();
    let second = extract_surface(reference_config(), &NoiseField::new(DEFAULT_SEED)).unwrap();

    assert!(!first.is_empty());
    let bits = |soup: &isomesh_core::TriangleSoup| -> Vec<u32> {
        soup.as_flat().iter().map(|v| v.to_bits()).collect()
    };
    assert_eq!(bits(&first), bits(&second));
}

#[test]
fn test_noise_surface_properties() {
    let field = NoiseField::default();
    let config = GridConfig::new(12, 10, 8).with_threshold(0.0).with_resolution(0.2);
    let grid = Grid::build(config, &field).unwrap();

    assert_eq!(grid.len(), 12 * 10 * 8);
    let vertices = grid.emit_triangle_vertices();
    assert_eq!(vertices.len() % 3, 0);

    // Every vertex is an edge midpoint of some cell inside the grid bounds
    for v in &vertices {
        assert!(v.x >= -0.5 && v.x <= 11.5);
        assert!(v.y >= -0.5 && v.y <= 9.5);
        assert!(v.z >= -0.5 && v.z <= 7.5);
        let halves = [v.x, v.y, v.z]
            .iter()
            .filter(|c| (*c * 2.0).rem_euclid(2.0) == 1.0)
            .count();
        assert_eq!(halves, 2);
    }

    // Uniform cells contribute nothing
    for cell in grid.cells() {
        let mut out = Vec::new();
        cell.emit_vertices(&mut out);
        if matches!(cell.configuration(), 0 | 255) {
            assert!(out.is_empty());
        }
        assert_eq!(out.len(), triangle_count(cell.configuration()) * 3);
    }
}

#[test]
fn test_single_cell_below_threshold_is_empty() {
    let config = GridConfig::new(1, 1, 1).with_threshold(1.0);
    let soup = extract_surface(config, &ConstantField(0.0)).unwrap();
    assert!(soup.is_empty());
}

#[test]
fn test_field_above_threshold_is_empty() {
    let config = GridConfig::new(1, 1, 1).with_threshold(-1.0);
    let grid = Grid::build(config, &ConstantField(0.0)).unwrap();
    assert_eq!(grid.cell(0, 0, 0).unwrap().configuration(), 255);
    assert!(grid.emit_triangle_vertices().is_empty());
}

#[test]
fn test_invalid_params_build_nothing() {
    let params = GridParams { x: 0, ..Default::default() };
    let result = GridConfig::try_from(&params)
        .and_then(|config| extract_surface(config, &NoiseField::default()));
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

#[test]
fn test_sphere_is_closed_inside_grid() {
    let field = sphere_field([4.0, 4.0, 4.0], 2.5);
    let config = GridConfig::new(9, 9, 9).with_resolution(1.0).with_threshold(0.0);
    let grid = Grid::build(config, &field).unwrap();
    let soup = grid.triangle_soup();

    assert!(!soup.is_empty());
    // Border cells lie entirely outside the sphere
    for cell in grid.cells() {
        let (x, y, z) = cell.coordinates();
        if [x, y, z].iter().any(|c| *c == 0 || *c == 8) {
            assert_eq!(cell.configuration(), 0);
        }
    }
    // All vertices stay near the sphere surface
    let center = Point3f::new(4.0, 4.0, 4.0);
    for v in &soup.vertices {
        let d = (v - center).norm();
        assert!((1.0..=4.0).contains(&d), "vertex {:?} at distance {}", v, d);
    }

    let mesh = soup.to_indexed_mesh();
    assert_eq!(mesh.face_count(), soup.triangle_count());
    assert_eq!(mesh.calculate_face_normals().len(), mesh.face_count());
}

#[test]
fn test_raising_threshold_shrinks_inside_set() {
    let field = NoiseField::new("monotone");
    let base = GridConfig::new(6, 6, 6).with_resolution(0.25);
    let low = Grid::build(base.clone().with_threshold(-0.2), &field).unwrap();
    let high = Grid::build(base.with_threshold(0.3), &field).unwrap();
    for (a, b) in low.cells().zip(high.cells()) {
        assert_eq!(b.configuration() & !a.configuration(), 0);
    }
}

#[test]
fn test_params_drive_y_up_sampling() {
    // The user's Z extent is the vertical axis and shiftnoiseZ moves it
    let params = GridParams {
        x: 2,
        y: 3,
        z: 4,
        resolution: 1.0,
        threshold: 0.0,
        shift_noise_z: 10.0,
        ..Default::default()
    };
    let config = GridConfig::try_from(&params).unwrap();
    assert_eq!(config.dimensions(), (2, 4, 3));

    let field = |_x: f64, y: f64, _z: f64| y - 11.0;
    let grid = Grid::build(config, &field).unwrap();
    // Sampled y = lattice y + 10, so the surface sits at lattice y = 1
    let vertices = grid.emit_triangle_vertices();
    assert!(!vertices.is_empty());
    assert!(vertices.iter().all(|v| v.y == 1.0));
}

#[test]
fn test_session_last_request_wins() {
    let gate = Arc::new(AtomicBool::new(true));
    let started = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));

    let field = {
        let (gate, started, release) = (gate.clone(), started.clone(), release.clone());
        move |_x: f64, y: f64, _z: f64| {
            if gate.swap(false, Ordering::SeqCst) {
                started.wait();
                release.wait();
            }
            y
        }
    };
    let session = SurfaceSession::new(field);
    let slow = GridConfig::new(1, 1, 1).with_resolution(1.0).with_threshold(0.0);
    let fast = GridConfig::new(2, 2, 2).with_resolution(1.0).with_threshold(0.25);

    std::thread::scope(|s| {
        let stale = s.spawn(|| session.rebuild(slow.clone()));

        // The first build is parked inside its first field sample
        started.wait();
        let fresh = session.rebuild(fast.clone()).unwrap();
        assert_eq!(fresh.generation, 2);
        release.wait();

        let stale = stale.join().unwrap();
        assert!(matches!(stale, Err(Error::Cancelled)));
    });

    let current = session.current().unwrap();
    assert_eq!(current.generation, 2);
    assert_eq!(current.config, fast);
}

#[test]
fn test_session_concurrent_rebuilds_settle_on_latest() {
    let session = SurfaceSession::new(NoiseField::default());
    let thresholds = [-0.4, -0.2, 0.0, 0.2, 0.4, 0.6];

    std::thread::scope(|s| {
        for threshold in thresholds {
            let session = &session;
            s.spawn(move || {
                let config = GridConfig::new(6, 6, 6).with_threshold(threshold);
                match session.rebuild(config) {
                    Ok(surface) => assert_eq!(surface.soup.len() % 3, 0),
                    Err(e) => assert!(e.is_cancelled()),
                }
            });
        }
    });

    let current = session.current().unwrap();
    assert_eq!(current.generation, session.latest_generation());
    assert_eq!(session.latest_generation(), thresholds.len() as u64);
}
