//! Implicit vertical diffusion across the layers of each water column.
//!
//! Each column yields one tridiagonal system, solved directly with the
//! Thomas algorithm. Two bottom closures are available:
//!
//! - [`VerticalScheme::NeumannNeumann`]: prescribed surface and bottom fluxes
//! - [`VerticalScheme::NeumannNavier`]: prescribed surface flux, Navier slip
//!   at the bottom (third-order on the two lowest layers)
//!
//! Columns are independent, so [`diffuse_columns`] runs them through
//! [`for_each_column`](crate::grid::for_each_column).
//!
//! # Example
//!
//! ```
//! use layered_rs::vertical::{ColumnBoundary, vertical_diffusion};
//!
//! // Wind stress at the surface, no-slip bed
//! let h = [0.5, 0.5, 0.5, 0.5];
//! let mut u = [0.0; 4];
//! vertical_diffusion(&h, &mut u, 0.01, 1e-2, &ColumnBoundary::navier(1.0, 0.0, 0.0));
//! assert!(u[3] > u[0]);
//! ```

mod column;
mod field;
mod tridiagonal;

pub use column::{
    BottomBoundary, ColumnBoundary, VerticalScheme, assemble_column, solve_column,
    vertical_diffusion, vertical_diffusion_neumann_navier, vertical_diffusion_neumann_neumann,
};
pub use field::{BottomField, VerticalSweep, diffuse_columns};
pub use tridiagonal::TridiagonalSystem;
