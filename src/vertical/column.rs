//! Implicit vertical diffusion of one water column.
//!
//! The diffusion of a quantity `s` with diffusivity `D` is discretised
//! implicitly as
//!
//! ```text
//! ((h s)_l^{n+1} - (h s)_l^*) / Δt = D ((s_{l+1} - s_l)/h_{l+1/2} - (s_l - s_{l-1})/h_{l-1/2})^{n+1}
//! ```
//!
//! with `h_{l±1/2}` the average of adjacent thicknesses. The result is the
//! tridiagonal system `M·s^{n+1} = rhs` with `rhs_l = (h s)_l^*` and
//!
//! ```text
//! a_l = -2 D Δt / (h_{l-1} + h_l)
//! c_l = -2 D Δt / (h_l + h_{l+1})
//! b_l = h_l - a_l - c_l
//! ```
//!
//! The free surface carries a Neumann condition `∂_z s|_t = dst`. The bottom
//! carries either a prescribed flux `dsb` ([`VerticalScheme::NeumannNeumann`])
//! or a Navier slip law `s|_b = s_b + λ_b ∂_z s|_b` discretised to third
//! order on the two lowest layers ([`VerticalScheme::NeumannNavier`]).
//!
//! The two schemes close the top layer differently: the flux scheme uses
//! the two-layer average `h_{nl-3/2}` for `a_{nl-1}`, the Navier scheme uses
//! `h_{nl-1}` alone. Both forms are kept as they are.
//!
//! Thicknesses must be strictly positive; a dry layer makes a pivot vanish
//! and the column fills with non-finite values.

use super::tridiagonal::TridiagonalSystem;

/// Bottom closure of the vertical diffusion system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalScheme {
    /// Prescribed fluxes at the surface and at the bottom.
    NeumannNeumann,
    /// Prescribed surface flux, Navier slip at the bottom.
    #[default]
    NeumannNavier,
}

/// Bottom boundary condition for one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BottomBoundary {
    /// Prescribed gradient `∂_z s|_b = dsb`.
    Flux { dsb: f64 },
    /// Navier slip `s|_b = s_b + λ_b ∂_z s|_b`; `lambda_b = 0` is no-slip.
    NavierSlip { s_b: f64, lambda_b: f64 },
}

impl BottomBoundary {
    /// Scheme implied by this closure.
    #[inline]
    pub fn scheme(&self) -> VerticalScheme {
        match self {
            BottomBoundary::Flux { .. } => VerticalScheme::NeumannNeumann,
            BottomBoundary::NavierSlip { .. } => VerticalScheme::NeumannNavier,
        }
    }
}

/// Boundary conditions for one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnBoundary {
    /// Surface gradient `∂_z s|_t`.
    pub top_flux: f64,
    /// Bottom closure.
    pub bottom: BottomBoundary,
}

impl ColumnBoundary {
    /// Neumann conditions at both ends.
    pub fn neumann(dst: f64, dsb: f64) -> Self {
        Self {
            top_flux: dst,
            bottom: BottomBoundary::Flux { dsb },
        }
    }

    /// Neumann surface, Navier slip bottom.
    pub fn navier(dst: f64, s_b: f64, lambda_b: f64) -> Self {
        Self {
            top_flux: dst,
            bottom: BottomBoundary::NavierSlip { s_b, lambda_b },
        }
    }

    /// Zero fluxes at both ends.
    pub fn insulated() -> Self {
        Self::neumann(0.0, 0.0)
    }
}

/// Vertical diffusion with prescribed fluxes at both ends, in place.
///
/// # Arguments
///
/// * `h` - Layer thicknesses at time n+1, bottom first
/// * `s` - Layer values, overwritten with the diffused values
/// * `dt` - Time step
/// * `d` - Diffusivity
/// * `dst` - Surface gradient
/// * `dsb` - Bottom gradient
///
/// # Example
///
/// ```
/// use layered_rs::vertical::vertical_diffusion_neumann_neumann;
///
/// let h = [1.0, 1.0, 1.0];
/// let mut s = [0.0, 0.0, 0.0];
/// vertical_diffusion_neumann_neumann(&h, &mut s, 0.1, 1.0, 1.0, 0.0);
/// assert!(s[2] > s[1] && s[1] > s[0] && s[0] >= 0.0);
/// ```
pub fn vertical_diffusion_neumann_neumann(
    h: &[f64],
    s: &mut [f64],
    dt: f64,
    d: f64,
    dst: f64,
    dsb: f64,
) {
    let mut system = TridiagonalSystem::new(h.len());
    solve_column(&mut system, h, s, dt, d, &ColumnBoundary::neumann(dst, dsb));
}

/// Vertical diffusion with a surface flux and Navier slip at the bottom,
/// in place.
///
/// # Arguments
///
/// * `h` - Layer thicknesses at time n+1, bottom first
/// * `s` - Layer values, overwritten with the diffused values
/// * `dt` - Time step
/// * `d` - Diffusivity
/// * `dst` - Surface gradient
/// * `s_b` - Bottom reference value
/// * `lambda_b` - Slip length (0 for no-slip)
pub fn vertical_diffusion_neumann_navier(
    h: &[f64],
    s: &mut [f64],
    dt: f64,
    d: f64,
    dst: f64,
    s_b: f64,
    lambda_b: f64,
) {
    let mut system = TridiagonalSystem::new(h.len());
    solve_column(
        &mut system,
        h,
        s,
        dt,
        d,
        &ColumnBoundary::navier(dst, s_b, lambda_b),
    );
}

/// Vertical diffusion of one column with the scheme chosen by `bc`.
pub fn vertical_diffusion(h: &[f64], s: &mut [f64], dt: f64, d: f64, bc: &ColumnBoundary) {
    let mut system = TridiagonalSystem::new(h.len());
    solve_column(&mut system, h, s, dt, d, bc);
}

/// Assemble and solve one column, reusing `system` as scratch space.
///
/// # Panics
///
/// Panics if `h` is empty or `h` and `s` differ in length.
pub fn solve_column(
    system: &mut TridiagonalSystem,
    h: &[f64],
    s: &mut [f64],
    dt: f64,
    d: f64,
    bc: &ColumnBoundary,
) {
    assemble_column(system, h, s, dt, d, bc);
    system.solve_into(s);
}

/// Fill `system` with the vertical diffusion matrix of one column.
///
/// For a single layer the missing neighbour thicknesses are taken equal to
/// the layer itself, and the bottom and top closures are folded into one
/// row: `b_0 += c_0`, `rhs_0 += (-c_0 h_0 - D Δt) dst`. With flux boundaries
/// this gives `s' = s + D Δt (dst - dsb) / h`.
///
/// # Panics
///
/// Panics if `h` is empty or `h` and `s` differ in length.
pub fn assemble_column(
    system: &mut TridiagonalSystem,
    h: &[f64],
    s: &[f64],
    dt: f64,
    d: f64,
    bc: &ColumnBoundary,
) {
    let nl = h.len();
    assert!(nl > 0, "column must have at least one layer");
    assert_eq!(s.len(), nl, "thickness and value columns differ in length");

    system.resize(nl);
    let (a, b, c, rhs) = system.parts_mut();
    let ddt = d * dt;

    for l in 0..nl {
        rhs[l] = s[l] * h[l];
    }

    for l in 1..nl.saturating_sub(1) {
        a[l] = -2.0 * ddt / (h[l - 1] + h[l]);
        c[l] = -2.0 * ddt / (h[l] + h[l + 1]);
        b[l] = h[l] - a[l] - c[l];
    }

    // Ghost thicknesses mirror the layer itself when it has no neighbour.
    let top = nl - 1;
    let below_top = if nl > 1 { h[nl - 2] } else { h[top] };
    let h0 = h[0];
    let h1 = if nl > 1 { h[1] } else { h0 };

    // Surface: ghost value s_nl = s_{nl-1} + dst h_{nl-1}
    a[top] = match bc.bottom {
        BottomBoundary::Flux { .. } => -2.0 * ddt / (below_top + h[top]),
        BottomBoundary::NavierSlip { .. } => -2.0 * ddt / h[top],
    };
    b[top] = h[top] - a[top];
    rhs[top] += ddt * bc.top_flux;

    match bc.bottom {
        BottomBoundary::Flux { dsb } => {
            c[0] = -2.0 * ddt / (h0 + h1);
            b[0] = h0 - c[0];
            rhs[0] -= ddt * dsb;
        }
        BottomBoundary::NavierSlip { s_b, lambda_b } => {
            let den = h0 * (h0 + h1).powi(2)
                + 2.0 * lambda_b * (3.0 * h0 * h1 + 2.0 * h0 * h0 + h1 * h1);
            b[0] = h0
                + 2.0 * dt * d * (1.0 / (h0 + h1) + (h1 * h1 + 3.0 * h0 * h1 + 3.0 * h0 * h0) / den);
            c[0] = -2.0 * dt * d * (1.0 / (h0 + h1) + h0 * h0 / den);
            rhs[0] += 2.0 * dt * d * s_b * (h1 * h1 + 3.0 * h0 * h1 + 2.0 * h0 * h0) / den;
        }
    }

    if nl == 1 {
        b[0] += c[0];
        rhs[0] += (-c[0] * h0 - ddt) * bc.top_flux;
    }
}
