//! Viscous stress continuity at the free surface.
//!
//! Projecting the stress balance of a free surface (no surface tension)
//! onto its normal and tangent gives two conditions:
//!
//! - **Normal**: a pressure deviation `phiNu` proportional to the surface
//!   divergence of the top-layer velocity ([`pressure_deviation`]). Its
//!   gradient is added to the face acceleration through a
//!   [`PressureGradient`].
//! - **Tangential**: an implicit relation for the surface velocity
//!   gradient `du_nu`, coupling neighbouring points, solved by Jacobi
//!   relaxation ([`tangential_stress`]). The result becomes the surface
//!   flux `dut` of the vertical solve.
//!
//! In the small-slope limit these reduce to `phi = -2ν ∂x u` and
//! `∂z u = -∂x w` at the surface.

mod normal;
mod pressure;
mod tangential;

pub use normal::{apply_normal_stress, pressure_deviation, replicate};
pub use pressure::{FacePressureGradient, PressureGradient};
pub use tangential::{
    RelaxationReport, StressCoefficients, SurfaceStress, relax, stress_coefficients,
    tangential_stress,
};
