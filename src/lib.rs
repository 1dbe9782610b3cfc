//! # layered-rs
//!
//! Viscous diffusion for multilayer free-surface solvers.
//!
//! The water column at each grid point is split into `nl` stacked layers
//! (layer 0 at the bed). This crate provides the diffusive sub-step of such
//! a solver:
//! - Implicit vertical diffusion per column (Thomas algorithm) with a
//!   Neumann or Navier-slip bottom
//! - Explicit horizontal diffusion with a correction for sloping layers
//! - Tangential stress continuity at the free surface, by Jacobi relaxation
//! - Normal stress continuity as a pressure deviation fed into the face
//!   acceleration
//! - A driver running all of the above once per time step
//!
//! The host solver owns the grid fields and calls in with layer thickness,
//! velocity, free surface, bed and acceleration. Fields are diffused in
//! place.
//!
//! # Features
//!
//! - `parallel`: per-column work runs on rayon
//! - `serde`: (de)serialisation of the configuration types
//!
//! # Example
//!
//! ```
//! use layered_rs::{BoundaryFields, Grid2D, LayerField, LayeredState, ViscosityConfig, ViscousStep};
//!
//! let grid = Grid2D::new(16, 16, 5, 0.05).unwrap();
//! let mut state = LayeredState::at_rest(&grid, 0.5);
//! state.u.x = LayerField::filled(&grid, 0.1);
//! let mut bc = BoundaryFields::zeros(&grid);
//!
//! let step = ViscousStep::new(ViscosityConfig::new(1e-3)).unwrap();
//! step.advance(&grid, &mut state, &mut bc, 1e-2).unwrap();
//!
//! // The no-slip bed has slowed the bottom layer.
//! let col = grid.column_index(8, 8);
//! assert!(state.u.x.get(col, 0) < state.u.x.get(col, 4));
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grid;
pub mod horizontal;
pub mod surface;
pub mod types;
pub mod vertical;
pub mod viscous;

// Re-export main types for convenience
pub use config::{BoundaryFields, RelaxationConfig, ViscosityConfig};
pub use diagnostics::{ContentTracker, FieldDiagnostics};
pub use error::{LayeredError, Result};
pub use grid::{EdgeRule, FaceField, Grid2D, LayerField, SurfaceField};
pub use horizontal::{horizontal_diffusion, stable_timestep};
pub use surface::{
    FacePressureGradient, PressureGradient, RelaxationReport, pressure_deviation,
    tangential_stress,
};
pub use types::{ColumnIndex, Direction, Horizontal, LayerIndex};
pub use vertical::{
    BottomBoundary, ColumnBoundary, TridiagonalSystem, VerticalScheme, diffuse_columns,
    vertical_diffusion, vertical_diffusion_neumann_navier, vertical_diffusion_neumann_neumann,
};
pub use viscous::{LayeredState, StepReport, TracerDiffusion, ViscousStep, viscous_term};
