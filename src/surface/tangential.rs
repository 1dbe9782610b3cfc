//! Tangential stress continuity at the free surface.
//!
//! The surface gradient of the velocity `du_nu` satisfies an implicit
//! relation coupling each point to its two neighbours along the same
//! direction. It is solved by Jacobi relaxation starting from zero: every
//! sweep reads only the previous sweep's values, so a sweep can run in
//! parallel without ordering between points.

use log::trace;

use crate::config::RelaxationConfig;
use crate::error::Result;
use crate::grid::{Grid2D, LayerField, SurfaceField, for_each_point};
use crate::types::{ColumnIndex, Direction, Horizontal};

/// Free-surface slope along `dir`, centred.
#[inline]
pub(crate) fn surface_slope(grid: &Grid2D, eta: &SurfaceField, col: ColumnIndex, dir: Direction) -> f64 {
    let m = grid.neighbor(col, dir, -1);
    let p = grid.neighbor(col, dir, 1);
    (eta.get(p) - eta.get(m)) / (2.0 * grid.delta())
}

/// Coefficients of the relaxation at one point:
/// `du_nu = explicit + alpha·du_nu[+1] + gamma·du_nu[-1] - beta·du_nu[0]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StressCoefficients {
    pub explicit: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl StressCoefficients {
    /// Coefficients at `col` along `dir`, from the top layer of `h`, the
    /// velocity component `u` along `dir`, `w` and `eta`.
    pub fn at(
        grid: &Grid2D,
        h: &LayerField,
        u: &LayerField,
        w: &LayerField,
        eta: &SurfaceField,
        col: ColumnIndex,
        dir: Direction,
    ) -> Self {
        let delta = grid.delta();
        let delta2 = delta * delta;
        let m = grid.neighbor(col, dir, -1);
        let p = grid.neighbor(col, dir, 1);

        let (hm, hc, hp) = (h.top(m), h.top(col), h.top(p));
        let (um, uc, up) = (u.top(m), u.top(col), u.top(p));
        let ex = surface_slope(grid, eta, col, dir);
        let g = ex / (1.0 - ex * ex);

        let explicit = -(w.top(p) - w.top(m)) / (2.0 * delta)
            + 4.0 * (up - um) / (2.0 * delta) * g
            + (hp * up - (hp + hc) * uc + hc * um) / (2.0 * delta2);

        Self {
            explicit,
            alpha: hp * hp / (4.0 * delta2) + g * hp / delta,
            beta: hp * hc / (4.0 * delta2),
            gamma: hc * hm / (4.0 * delta2) - g * hm / delta,
        }
    }

    /// One relaxation update from the neighbour values of the previous sweep.
    #[inline]
    pub fn relax(&self, minus: f64, centre: f64, plus: f64) -> f64 {
        self.explicit + self.alpha * plus + self.gamma * minus - self.beta * centre
    }
}

/// Outcome of one relaxation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RelaxationReport {
    /// Sweeps performed.
    pub sweeps: usize,
    /// Largest change during the last sweep.
    pub residual: f64,
}

/// Surface stress along both directions with the relaxation reports.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceStress {
    pub du_nu: Horizontal<SurfaceField>,
    pub reports: Horizontal<RelaxationReport>,
}

/// Coefficients at every point along `dir`, in column order.
pub fn stress_coefficients(
    grid: &Grid2D,
    h: &LayerField,
    u: &LayerField,
    w: &LayerField,
    eta: &SurfaceField,
    dir: Direction,
) -> Vec<StressCoefficients> {
    grid.columns()
        .map(|col| StressCoefficients::at(grid, h, u, w, eta, col, dir))
        .collect()
}

/// Jacobi relaxation along `dir` starting from zero.
///
/// # Panics
///
/// Panics if `coefficients` does not hold one entry per grid point.
pub fn relax(
    grid: &Grid2D,
    coefficients: &[StressCoefficients],
    dir: Direction,
    config: &RelaxationConfig,
) -> (SurfaceField, RelaxationReport) {
    assert_eq!(coefficients.len(), grid.n_columns(), "one coefficient set per point");

    let mut current = SurfaceField::zeros(grid);
    let mut next = SurfaceField::zeros(grid);
    let mut report = RelaxationReport::default();

    for sweep in 1..=config.max_sweeps {
        {
            let previous = &current;
            for_each_point(&mut next, |col, value| {
                let minus = previous.get(grid.neighbor(col, dir, -1));
                let plus = previous.get(grid.neighbor(col, dir, 1));
                *value = coefficients[col].relax(minus, previous.get(col), plus);
            });
        }
        let residual = next
            .as_slice()
            .iter()
            .zip(current.as_slice())
            .fold(0.0_f64, |m, (a, b)| m.max((a - b).abs()));
        std::mem::swap(&mut current, &mut next);

        report = RelaxationReport { sweeps: sweep, residual };
        trace!("surface stress {dir}: sweep {sweep}, residual {residual:.3e}");

        if config.tolerance.is_some_and(|tol| residual <= tol) {
            break;
        }
    }

    (current, report)
}

/// Solve the tangential stress condition along both directions.
///
/// The result is the new surface gradient `dut` of the velocity.
///
/// # Errors
///
/// Fails if a field does not match `grid` or `config` is invalid.
pub fn tangential_stress(
    grid: &Grid2D,
    h: &LayerField,
    u: &Horizontal<LayerField>,
    w: &LayerField,
    eta: &SurfaceField,
    config: &RelaxationConfig,
) -> Result<SurfaceStress> {
    h.check_shape(grid, "h")?;
    u.check_shape(grid, "u")?;
    w.check_shape(grid, "w")?;
    eta.check_shape(grid, "eta")?;
    config.validate()?;

    let solve = |dir: Direction| {
        let coefficients = stress_coefficients(grid, h, u.get(dir), w, eta, dir);
        relax(grid, &coefficients, dir, config)
    };
    let (du_x, report_x) = solve(Direction::X);
    let (du_y, report_y) = solve(Direction::Y);

    Ok(SurfaceStress {
        du_nu: Horizontal::new(du_x, du_y),
        reports: Horizontal::new(report_x, report_y),
    })
}
