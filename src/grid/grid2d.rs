//! Uniform Cartesian grid with a fixed number of layers per column.

use crate::error::{LayeredError, Result};
use crate::types::{ColumnIndex, Direction, Horizontal};

/// How neighbour lookups past the domain edge are resolved.
///
/// This stands in for the host solver's halo exchange: every stencil in
/// the crate reads neighbours through [`Grid2D::neighbor`], so the edge
/// rule is the only boundary treatment the kernels see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeRule {
    /// Wrap around to the opposite edge.
    Periodic,
    /// Reuse the nearest interior cell (symmetric, zero normal gradient).
    #[default]
    ZeroGradient,
}

impl EdgeRule {
    #[inline]
    fn resolve(self, index: isize, n: usize) -> usize {
        let n = n as isize;
        match self {
            EdgeRule::Periodic => index.rem_euclid(n) as usize,
            EdgeRule::ZeroGradient => index.clamp(0, n - 1) as usize,
        }
    }
}

/// Horizontal grid of `nx × ny` square cells of side `delta`, each holding
/// a stack of `n_layers` layers.
///
/// # Example
///
/// ```
/// use layered_rs::grid::{EdgeRule, Grid2D};
/// use layered_rs::types::Direction;
///
/// let grid = Grid2D::new(8, 4, 3, 0.5).unwrap().with_edges(EdgeRule::Periodic);
/// let col = grid.column_index(0, 2);
/// let west = grid.neighbor(col, Direction::X, -1);
/// assert_eq!(grid.coords(west), (7, 2));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2D {
    nx: usize,
    ny: usize,
    n_layers: usize,
    delta: f64,
    edges: Horizontal<EdgeRule>,
}

impl Grid2D {
    /// Create a grid with zero-gradient edges.
    ///
    /// # Errors
    ///
    /// Fails when a dimension or the layer count is zero, or when `delta`
    /// is not a positive finite number.
    pub fn new(nx: usize, ny: usize, n_layers: usize, delta: f64) -> Result<Self> {
        if n_layers == 0 {
            return Err(LayeredError::NoLayers);
        }
        if nx == 0 || ny == 0 {
            return Err(LayeredError::InvalidGrid(format!(
                "dimensions must be non-zero, got {nx}x{ny}"
            )));
        }
        if !(delta.is_finite() && delta > 0.0) {
            return Err(LayeredError::InvalidGrid(format!(
                "spacing must be positive, got {delta}"
            )));
        }
        Ok(Self {
            nx,
            ny,
            n_layers,
            delta,
            edges: Horizontal::splat(EdgeRule::default()),
        })
    }

    /// Use the same edge rule in both directions.
    pub fn with_edges(mut self, rule: EdgeRule) -> Self {
        self.edges = Horizontal::splat(rule);
        self
    }

    /// Set the edge rule along one direction.
    pub fn with_edge(mut self, dir: Direction, rule: EdgeRule) -> Self {
        *self.edges.get_mut(dir) = rule;
        self
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Number of layers per column.
    #[inline]
    pub fn n_layers(&self) -> usize {
        self.n_layers
    }

    /// Cell size Δ.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Number of horizontal points.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.nx * self.ny
    }

    /// Edge rule along `dir`.
    #[inline]
    pub fn edge(&self, dir: Direction) -> EdgeRule {
        *self.edges.get(dir)
    }

    /// Flattened index of cell `(i, j)`.
    #[inline]
    pub fn column_index(&self, i: usize, j: usize) -> ColumnIndex {
        debug_assert!(i < self.nx && j < self.ny, "cell ({i}, {j}) outside grid");
        ColumnIndex::new(i + self.nx * j)
    }

    /// Cell coordinates `(i, j)` of a column.
    #[inline]
    pub fn coords(&self, col: ColumnIndex) -> (usize, usize) {
        (col.get() % self.nx, col.get() / self.nx)
    }

    /// Column `offset` cells away from `col` along `dir`, resolved through
    /// the edge rule when it falls outside the domain.
    #[inline]
    pub fn neighbor(&self, col: ColumnIndex, dir: Direction, offset: isize) -> ColumnIndex {
        let (i, j) = self.coords(col);
        match dir {
            Direction::X => {
                let i = self.edges.x.resolve(i as isize + offset, self.nx);
                ColumnIndex::new(i + self.nx * j)
            }
            Direction::Y => {
                let j = self.edges.y.resolve(j as isize + offset, self.ny);
                ColumnIndex::new(i + self.nx * j)
            }
        }
    }

    /// Iterate over all columns.
    pub fn columns(&self) -> impl ExactSizeIterator<Item = ColumnIndex> {
        ColumnIndex::iter(self.n_columns())
    }

    /// Cell-centre coordinates of a column, origin at the lower-left corner.
    #[inline]
    pub fn center(&self, col: ColumnIndex) -> (f64, f64) {
        let (i, j) = self.coords(col);
        ((i as f64 + 0.5) * self.delta, (j as f64 + 0.5) * self.delta)
    }

    /// Shape description used in error messages.
    pub(crate) fn shape_label(&self, layered: bool) -> String {
        if layered {
            format!("{}x{}x{}", self.nx, self.ny, self.n_layers)
        } else {
            format!("{}x{}", self.nx, self.ny)
        }
    }
}
