//! Horizontal grid, layered fields and per-column iteration.
//!
//! The grid is a uniform Cartesian `nx × ny` mesh with spacing Δ and a fixed
//! number of layers `nl` per point. Neighbour access is bounds-checked and
//! resolved through an [`EdgeRule`] at the domain edges, so stencils never
//! index outside their fields.
//!
//! # Example
//!
//! ```
//! use layered_rs::grid::{EdgeRule, Grid2D, LayerField, SurfaceField};
//!
//! let grid = Grid2D::new(16, 8, 5, 0.1).unwrap().with_edges(EdgeRule::Periodic);
//!
//! // Uniform 0.2 m layers and a flat free surface
//! let h = LayerField::filled(&grid, 0.2);
//! let eta = SurfaceField::filled(&grid, 1.0);
//! assert_eq!(h.n_columns(), eta.len());
//! ```

mod field;
mod grid2d;
mod parallel;

pub use field::{FaceField, LayerField, SurfaceField};
pub use grid2d::{EdgeRule, Grid2D};
pub use parallel::{for_each_column, for_each_column_init, for_each_point};
