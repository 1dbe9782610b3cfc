//! Integration tests for the viscous step driver.
//!
//! These tests verify:
//! 1. Momentum budget of a wind-driven column with a free-slip bed
//! 2. Conservation and smoothing with horizontal diffusion enabled
//! 3. Long runs with the surface coupling stay finite and bounded

use approx::assert_relative_eq;
use layered_rs::config::{BoundaryFields, ViscosityConfig};
use layered_rs::diagnostics::{ContentTracker, FieldDiagnostics};
use layered_rs::grid::{EdgeRule, Grid2D, LayerField, SurfaceField};
use layered_rs::vertical::VerticalScheme;
use layered_rs::viscous::{LayeredState, ViscousStep};

const DRY: f64 = 1e-10;

fn periodic_grid(nx: usize, ny: usize, nl: usize, delta: f64) -> Grid2D {
    Grid2D::new(nx, ny, nl, delta)
        .unwrap()
        .with_edges(EdgeRule::Periodic)
}

fn momentum(grid: &Grid2D, state: &LayeredState) -> f64 {
    FieldDiagnostics::compute(grid, &state.h, &state.u.x, DRY)
        .unwrap()
        .content
}

#[test]
fn test_wind_stress_momentum_budget() {
    let grid = periodic_grid(4, 4, 6, 1.0);
    let mut state = LayeredState::at_rest(&grid, 3.0);
    let mut bc = BoundaryFields::zeros(&grid);
    let wind = 0.02;
    bc.dut.x = SurfaceField::filled(&grid, wind);

    let nu = 1e-2;
    let dt = 0.5;
    let config = ViscosityConfig::new(nu)
        .with_surface_coupling(false)
        .with_scheme(VerticalScheme::NeumannNeumann);
    let step = ViscousStep::new(config).unwrap();

    let before = momentum(&grid, &state);
    let n_steps = 10;
    for _ in 0..n_steps {
        step.advance(&grid, &mut state, &mut bc, dt).unwrap();
    }
    let after = momentum(&grid, &state);

    // Each column gains ν·dt·dut per step, over a cell area of Δ².
    let expected = n_steps as f64 * nu * dt * wind * grid.n_columns() as f64;
    assert_relative_eq!(after - before, expected, max_relative = 1e-10);

    let col = grid.column_index(1, 2);
    let u = state.u.x.column(col);
    assert!(u.windows(2).all(|p| p[0] < p[1]), "{u:?}");
    assert_eq!(bc.dut.x.max_abs(), wind);
}

#[test]
fn test_horizontal_diffusion_smooths_shear() {
    let grid = periodic_grid(8, 16, 3, 0.25);
    let mut state = LayeredState::at_rest(&grid, 0.6);
    let k = 2.0 * std::f64::consts::PI / (16.0 * 0.25);
    state.u.x = LayerField::from_fn(&grid, |c, _| (k * grid.center(c).1).sin());
    let mut bc = BoundaryFields::zeros(&grid);

    let config = ViscosityConfig::new(1e-2)
        .with_horizontal_diffusion(true)
        .with_surface_coupling(false)
        .with_scheme(VerticalScheme::NeumannNeumann);
    let step = ViscousStep::new(config).unwrap();

    let mut tracker =
        ContentTracker::new(FieldDiagnostics::compute(&grid, &state.h, &state.u.x, DRY).unwrap());
    for _ in 0..20 {
        let report = step.advance(&grid, &mut state, &mut bc, 0.1).unwrap();
        assert!(report.viscous.horizontal);
        tracker.update(FieldDiagnostics::compute(&grid, &state.h, &state.u.x, DRY).unwrap());
    }

    assert!(tracker.content_error() < 1e-10);
    assert!(tracker.variance_change() < 0.0);
    assert!(tracker.current().max < 1.0);
}

#[test]
fn test_coupled_run_stays_bounded() {
    let grid = periodic_grid(12, 12, 4, 0.1);
    let mut state = LayeredState::at_rest(&grid, 0.2);
    state.u.x = LayerField::from_fn(&grid, |c, l| {
        let (x, y) = grid.center(c);
        0.05 * (l.get() as f64 + 1.0) * (5.0 * x).sin() * (5.0 * y).cos()
    });
    state.w = LayerField::from_fn(&grid, |c, _| 0.001 * (5.0 * grid.center(c).1).sin());
    state.eta = SurfaceField::from_fn(&grid, |c| 0.002 * (5.0 * grid.center(c).0).cos());
    let mut bc = BoundaryFields::zeros(&grid).with_slip_length(&grid, 0.01);

    let step = ViscousStep::new(ViscosityConfig::new(1e-4)).unwrap();
    let initial = FieldDiagnostics::compute(&grid, &state.h, &state.u.x, DRY).unwrap();

    for _ in 0..25 {
        let report = step.advance(&grid, &mut state, &mut bc, 0.01).unwrap();
        assert!(report.phi_max.is_some_and(f64::is_finite));
        assert_eq!(report.relaxation.map(|r| r.x.sweeps), Some(10));
    }

    let last = FieldDiagnostics::compute(&grid, &state.h, &state.u.x, DRY).unwrap();
    assert!(last.is_finite());
    assert!(last.max <= initial.max + 1e-3);
    assert!(last.min >= initial.min - 1e-3);
    assert!(state.ha.x.as_slice().iter().all(|v| v.is_finite()));
    assert!(bc.dut.x.as_slice().iter().all(|v| v.is_finite()));
}
