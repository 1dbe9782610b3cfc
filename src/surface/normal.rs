//! Normal stress continuity at the free surface.
//!
//! The viscous part of the normal stress shows up as a pressure deviation
//! `phiNu` driven by the surface divergence of the top-layer velocity,
//! corrected for the surface slope. It is constant down each column and
//! enters the momentum balance through its horizontal gradient.

use super::pressure::PressureGradient;
use super::tangential::surface_slope;
use crate::error::{LayeredError, Result};
use crate::grid::{FaceField, Grid2D, LayerField, SurfaceField, for_each_point};
use crate::types::{Direction, Horizontal};

/// Surface pressure deviation `phiNu` at every point.
///
/// `phiNu = -Σ 2ν·(1+ex²)/(1-ex²)·(u[1] - u[-1] + h[1]/2·dut[1] - h[-1]/2·dut[-1])/(2Δ)`
/// summed over both directions, with `ex` the centred surface slope and
/// top-layer `u` and `h`.
///
/// # Errors
///
/// Fails if a field does not match `grid`.
pub fn pressure_deviation(
    grid: &Grid2D,
    h: &LayerField,
    u: &Horizontal<LayerField>,
    dut: &Horizontal<SurfaceField>,
    eta: &SurfaceField,
    nu: f64,
) -> Result<SurfaceField> {
    h.check_shape(grid, "h")?;
    u.check_shape(grid, "u")?;
    dut.check_shape(grid, "dut")?;
    eta.check_shape(grid, "eta")?;

    let two_delta = 2.0 * grid.delta();
    let mut phi = SurfaceField::zeros(grid);
    for_each_point(&mut phi, |col, phi| {
        let mut phi0 = 0.0;
        for dir in Direction::ALL {
            let m = grid.neighbor(col, dir, -1);
            let p = grid.neighbor(col, dir, 1);
            let (u, dut) = (u.get(dir), dut.get(dir));
            let ex = surface_slope(grid, eta, col, dir);
            let ex2 = ex * ex;
            phi0 -= nu * 2.0 * (1.0 + ex2) / (1.0 - ex2)
                * (u.top(p) - u.top(m) + h.top(p) / 2.0 * dut.get(p) - h.top(m) / 2.0 * dut.get(m))
                / two_delta;
        }
        *phi = phi0;
    });
    Ok(phi)
}

/// Repeat a per-point value over every layer of its column.
pub fn replicate(grid: &Grid2D, phi: &SurfaceField) -> LayerField {
    LayerField::from_fn(grid, |col, _| phi.get(col))
}

/// Compute `phiNu` and add its gradient to the face acceleration `ha`.
///
/// Returns the per-point pressure deviation.
///
/// # Errors
///
/// Fails if a field does not match `grid` or `nu` is negative.
#[allow(clippy::too_many_arguments)]
pub fn apply_normal_stress(
    grid: &Grid2D,
    gradient: &dyn PressureGradient,
    h: &LayerField,
    hf: &FaceField,
    u: &Horizontal<LayerField>,
    dut: &Horizontal<SurfaceField>,
    eta: &SurfaceField,
    nu: f64,
    ha: &mut FaceField,
) -> Result<SurfaceField> {
    if !(nu.is_finite() && nu >= 0.0) {
        return Err(LayeredError::InvalidConfig(format!(
            "viscosity must be non-negative, got {nu}"
        )));
    }
    hf.check_shape(grid, "hf")?;
    ha.check_shape(grid, "ha")?;

    let phi = pressure_deviation(grid, h, u, dut, eta, nu)?;
    gradient.add_gradient(grid, &replicate(grid, &phi), hf, ha);
    Ok(phi)
}
