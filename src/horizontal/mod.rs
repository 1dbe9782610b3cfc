//! Explicit horizontal diffusion across the grid.
//!
//! The update for each layer is a flat 5-point Laplacian plus a correction
//! accounting for the slope of the layer interfaces, which follow the bed
//! and the free surface in a terrain-following layered model. At the top
//! layer the surface gradient `dst` replaces the missing layer above.
//!
//! The scheme is explicit: `dt` must stay below roughly `Δ²/D`, see
//! [`stable_timestep`].

mod stencil;

pub use stencil::{horizontal_diffusion, interface_heights, stable_timestep};
