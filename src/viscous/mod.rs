//! Per-timestep viscous update of the layered solver.
//!
//! [`ViscousStep::advance`] runs, in order:
//!
//! 1. Normal stress: `phiNu` and its gradient into the face acceleration
//! 2. Tangential stress: relaxation of the surface gradient `dut`
//! 3. [`viscous_term`]: implicit vertical diffusion of the velocity with
//!    the previous acceleration folded in, then optional horizontal
//!    diffusion
//!
//! Steps 1 and 2 only run when the surface coupling is enabled, and the
//! whole step is skipped for zero viscosity.

mod state;
mod step;
mod tracer;

pub use state::LayeredState;
pub use step::{StepReport, ViscousStep, ViscousTermReport, cell_acceleration, viscous_term};
pub use tracer::TracerDiffusion;
