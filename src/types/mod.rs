//! Strongly-typed domain types.
//!
//! - **Index newtypes**: [`ColumnIndex`] and [`LayerIndex`] cannot be mixed up
//! - **Direction pairs**: [`Horizontal`] holds one value per [`Direction`]
//!
//! # Example
//!
//! ```
//! use layered_rs::types::{ColumnIndex, Direction, Horizontal, LayerIndex};
//!
//! let col = ColumnIndex::new(3);
//! let layers: Vec<_> = LayerIndex::iter(10).collect();
//! assert_eq!(layers[9].get(), 9);
//!
//! let slip = Horizontal::splat(0.0_f64);
//! assert_eq!(*slip.get(Direction::X), 0.0);
//! # let _ = col;
//! ```

mod direction;
mod indices;

pub use direction::{Direction, Horizontal};
pub use indices::{ColumnIndex, LayerIndex};
