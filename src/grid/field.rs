//! Field storage on a [`Grid2D`].
//!
//! # Memory Layout
//!
//! [`LayerField`] stores every column contiguously: the `n_layers` values of
//! column `c` live at `data[c * n_layers..(c + 1) * n_layers]`, bottom layer
//! first. A column is therefore a plain slice, which is what the vertical
//! solver works on, and columns can be handed out as disjoint mutable chunks
//! for data-parallel updates.
//!
//! [`SurfaceField`] stores one value per column.
//!
//! Face-centred quantities (face thickness `hf`, face acceleration `ha`) use
//! a [`FaceField`]: one [`LayerField`] per direction where the value stored
//! at column `c` belongs to the lower-index face of that cell (its west face
//! for x, its south face for y). The opposite face of `c` is the value stored
//! at the `+1` neighbour.

use super::grid2d::Grid2D;
use crate::error::{LayeredError, Result};
use crate::types::{ColumnIndex, Horizontal, LayerIndex};

/// A scalar with one value per layer per column.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerField {
    n_columns: usize,
    n_layers: usize,
    data: Vec<f64>,
}

impl LayerField {
    /// Field filled with `value`.
    pub fn filled(grid: &Grid2D, value: f64) -> Self {
        Self {
            n_columns: grid.n_columns(),
            n_layers: grid.n_layers(),
            data: vec![value; grid.n_columns() * grid.n_layers()],
        }
    }

    /// Zero field.
    pub fn zeros(grid: &Grid2D) -> Self {
        Self::filled(grid, 0.0)
    }

    /// Field initialised from `f(column, layer)`.
    pub fn from_fn(grid: &Grid2D, mut f: impl FnMut(ColumnIndex, LayerIndex) -> f64) -> Self {
        let n_layers = grid.n_layers();
        let mut data = Vec::with_capacity(grid.n_columns() * n_layers);
        for col in grid.columns() {
            for l in LayerIndex::iter(n_layers) {
                data.push(f(col, l));
            }
        }
        Self {
            n_columns: grid.n_columns(),
            n_layers,
            data,
        }
    }

    /// Field with the same profile `values` in every column.
    ///
    /// # Errors
    ///
    /// Fails when `values.len()` differs from the grid's layer count.
    pub fn from_profile(grid: &Grid2D, values: &[f64]) -> Result<Self> {
        if values.len() != grid.n_layers() {
            return Err(LayeredError::shape_mismatch(
                "profile",
                grid.n_layers().to_string(),
                values.len().to_string(),
            ));
        }
        Ok(Self::from_fn(grid, |_, l| values[l.get()]))
    }

    #[inline]
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    #[inline]
    pub fn n_layers(&self) -> usize {
        self.n_layers
    }

    /// Layer values of one column, bottom first.
    #[inline]
    pub fn column(&self, col: ColumnIndex) -> &[f64] {
        let start = col.get() * self.n_layers;
        &self.data[start..start + self.n_layers]
    }

    /// Value at `(col, layer)`.
    #[inline]
    pub fn get(&self, col: ColumnIndex, layer: usize) -> f64 {
        self.data[col.get() * self.n_layers + layer]
    }

    /// Set the value at `(col, layer)`.
    #[inline]
    pub fn set(&mut self, col: ColumnIndex, layer: usize, value: f64) {
        self.data[col.get() * self.n_layers + layer] = value;
    }

    /// Top-layer value of a column.
    #[inline]
    pub fn top(&self, col: ColumnIndex) -> f64 {
        self.data[(col.get() + 1) * self.n_layers - 1]
    }

    /// Raw storage, column by column.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable raw storage.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Iterate over columns.
    pub fn columns(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_layers)
    }

    /// Overwrite this field with the contents of `other`.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn copy_from(&mut self, other: &LayerField) {
        assert_eq!(self.data.len(), other.data.len(), "field shape mismatch");
        self.data.copy_from_slice(&other.data);
    }

    /// Check that this field lives on `grid`.
    pub fn check_shape(&self, grid: &Grid2D, name: &'static str) -> Result<()> {
        if self.n_columns != grid.n_columns() || self.n_layers != grid.n_layers() {
            return Err(LayeredError::shape_mismatch(
                name,
                grid.shape_label(true),
                format!("{} columns x {} layers", self.n_columns, self.n_layers),
            ));
        }
        Ok(())
    }
}

/// A scalar with one value per column (free surface, bed, boundary data).
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceField {
    data: Vec<f64>,
}

impl SurfaceField {
    /// Field filled with `value`.
    pub fn filled(grid: &Grid2D, value: f64) -> Self {
        Self {
            data: vec![value; grid.n_columns()],
        }
    }

    /// Zero field.
    pub fn zeros(grid: &Grid2D) -> Self {
        Self::filled(grid, 0.0)
    }

    /// Field initialised from `f(column)`.
    pub fn from_fn(grid: &Grid2D, f: impl FnMut(ColumnIndex) -> f64) -> Self {
        Self {
            data: grid.columns().map(f).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, col: ColumnIndex) -> f64 {
        self.data[col]
    }

    #[inline]
    pub fn set(&mut self, col: ColumnIndex, value: f64) {
        self.data[col] = value;
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Largest absolute value (0 for an empty field).
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    /// Check that this field lives on `grid`.
    pub fn check_shape(&self, grid: &Grid2D, name: &'static str) -> Result<()> {
        if self.data.len() != grid.n_columns() {
            return Err(LayeredError::shape_mismatch(
                name,
                grid.shape_label(false),
                format!("{} columns", self.data.len()),
            ));
        }
        Ok(())
    }
}

/// Face-centred layered values, one [`LayerField`] per direction.
pub type FaceField = Horizontal<LayerField>;

impl Horizontal<LayerField> {
    /// Zero field in both directions.
    pub fn zeros(grid: &Grid2D) -> Self {
        Horizontal::new(LayerField::zeros(grid), LayerField::zeros(grid))
    }

    /// Check both components against `grid`.
    pub fn check_shape(&self, grid: &Grid2D, name: &'static str) -> Result<()> {
        self.x.check_shape(grid, name)?;
        self.y.check_shape(grid, name)
    }
}

impl Horizontal<SurfaceField> {
    /// Zero field in both directions.
    pub fn zeros(grid: &Grid2D) -> Self {
        Horizontal::new(SurfaceField::zeros(grid), SurfaceField::zeros(grid))
    }

    /// Check both components against `grid`.
    pub fn check_shape(&self, grid: &Grid2D, name: &'static str) -> Result<()> {
        self.x.check_shape(grid, name)?;
        self.y.check_shape(grid, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid2D {
        Grid2D::new(3, 2, 4, 1.0).unwrap()
    }

    #[test]
    fn test_layer_field_layout() {
        let grid = grid();
        let field = LayerField::from_fn(&grid, |c, l| (c.get() * 10 + l.get()) as f64);
        let col = ColumnIndex::new(2);
        assert_eq!(field.column(col), &[20.0, 21.0, 22.0, 23.0]);
        assert_eq!(field.get(col, 1), 21.0);
        assert_eq!(field.top(col), 23.0);
        assert_eq!(field.columns().len(), 6);
    }

    #[test]
    fn test_from_profile() {
        let grid = grid();
        let field = LayerField::from_profile(&grid, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        for col in field.columns() {
            assert_eq!(col, &[1.0, 2.0, 3.0, 4.0]);
        }
        assert!(LayerField::from_profile(&grid, &[1.0]).is_err());
    }

    #[test]
    fn test_shape_checks() {
        let grid = grid();
        let other = Grid2D::new(3, 2, 5, 1.0).unwrap();
        let field = LayerField::zeros(&grid);
        assert!(field.check_shape(&grid, "h").is_ok());
        assert!(matches!(
            field.check_shape(&other, "h"),
            Err(LayeredError::ShapeMismatch { field: "h", .. })
        ));

        let surface = SurfaceField::zeros(&grid);
        assert!(surface.check_shape(&other, "eta").is_ok());
        let small = Grid2D::new(2, 2, 4, 1.0).unwrap();
        assert!(surface.check_shape(&small, "eta").is_err());
    }

    #[test]
    fn test_surface_field() {
        let grid = grid();
        let mut eta = SurfaceField::from_fn(&grid, |c| -(c.get() as f64));
        assert_eq!(eta.len(), 6);
        assert_eq!(eta.max_abs(), 5.0);
        eta.set(ColumnIndex::new(0), 9.0);
        assert_eq!(eta.get(ColumnIndex::new(0)), 9.0);
    }

    #[test]
    fn test_copy_from() {
        let grid = grid();
        let mut a = LayerField::zeros(&grid);
        let b = LayerField::filled(&grid, 2.0);
        a.copy_from(&b);
        assert_eq!(a, b);
    }
}
