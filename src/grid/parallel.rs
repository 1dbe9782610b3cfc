//! Per-column and per-point iteration primitives.
//!
//! These are the concurrency boundary of the crate: every column (or point)
//! is written by exactly one invocation of the closure, and closures may only
//! read other columns through shared references captured from the caller.
//! With the `parallel` feature the work is distributed with rayon, otherwise
//! it runs serially in column order.

use super::field::{LayerField, SurfaceField};
use crate::types::ColumnIndex;

/// Run `f` on every column of `field`.
///
/// # Example
///
/// ```
/// use layered_rs::grid::{Grid2D, LayerField, for_each_column};
///
/// let grid = Grid2D::new(4, 4, 3, 1.0).unwrap();
/// let mut s = LayerField::zeros(&grid);
/// for_each_column(&mut s, |_, column| {
///     for (l, v) in column.iter_mut().enumerate() {
///         *v = l as f64;
///     }
/// });
/// assert!(s.columns().all(|c| c == [0.0, 1.0, 2.0]));
/// ```
#[cfg(not(feature = "parallel"))]
pub fn for_each_column<F>(field: &mut LayerField, f: F)
where
    F: Fn(ColumnIndex, &mut [f64]) + Send + Sync,
{
    let n_layers = field.n_layers();
    field
        .as_mut_slice()
        .chunks_exact_mut(n_layers)
        .enumerate()
        .for_each(|(c, column)| f(ColumnIndex::new(c), column));
}

/// Run `f` on every column of `field`, in parallel.
#[cfg(feature = "parallel")]
pub fn for_each_column<F>(field: &mut LayerField, f: F)
where
    F: Fn(ColumnIndex, &mut [f64]) + Send + Sync,
{
    use rayon::prelude::*;

    let n_layers = field.n_layers();
    field
        .as_mut_slice()
        .par_chunks_exact_mut(n_layers)
        .enumerate()
        .for_each(|(c, column)| f(ColumnIndex::new(c), column));
}

/// Run `f` on every column of `field` with a scratch value built by `init`.
///
/// The scratch value is created once and reused for every column.
#[cfg(not(feature = "parallel"))]
pub fn for_each_column_init<T, I, F>(field: &mut LayerField, init: I, f: F)
where
    I: Fn() -> T + Send + Sync,
    F: Fn(&mut T, ColumnIndex, &mut [f64]) + Send + Sync,
{
    let n_layers = field.n_layers();
    let mut scratch = init();
    field
        .as_mut_slice()
        .chunks_exact_mut(n_layers)
        .enumerate()
        .for_each(|(c, column)| f(&mut scratch, ColumnIndex::new(c), column));
}

/// Run `f` on every column of `field` in parallel, with one scratch value
/// per rayon work split.
#[cfg(feature = "parallel")]
pub fn for_each_column_init<T, I, F>(field: &mut LayerField, init: I, f: F)
where
    I: Fn() -> T + Send + Sync,
    F: Fn(&mut T, ColumnIndex, &mut [f64]) + Send + Sync,
{
    use rayon::prelude::*;

    let n_layers = field.n_layers();
    field
        .as_mut_slice()
        .par_chunks_exact_mut(n_layers)
        .enumerate()
        .for_each_init(init, |scratch, (c, column)| {
            f(scratch, ColumnIndex::new(c), column)
        });
}

/// Run `f` on every point of `field`.
#[cfg(not(feature = "parallel"))]
pub fn for_each_point<F>(field: &mut SurfaceField, f: F)
where
    F: Fn(ColumnIndex, &mut f64) + Send + Sync,
{
    field
        .as_mut_slice()
        .iter_mut()
        .enumerate()
        .for_each(|(c, value)| f(ColumnIndex::new(c), value));
}

/// Run `f` on every point of `field`, in parallel.
#[cfg(feature = "parallel")]
pub fn for_each_point<F>(field: &mut SurfaceField, f: F)
where
    F: Fn(ColumnIndex, &mut f64) + Send + Sync,
{
    use rayon::prelude::*;

    field
        .as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .for_each(|(c, value)| f(ColumnIndex::new(c), value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid2D;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_every_column_visited_once() {
        let grid = Grid2D::new(5, 3, 2, 1.0).unwrap();
        let mut field = LayerField::zeros(&grid);
        for_each_column(&mut field, |c, column| {
            column[0] += c.get() as f64;
            column[1] += 1.0;
        });
        for col in grid.columns() {
            assert_eq!(field.get(col, 0), col.get() as f64);
            assert_eq!(field.get(col, 1), 1.0);
        }
    }

    #[test]
    fn test_scratch_is_reused_across_columns() {
        let grid = Grid2D::new(4, 3, 3, 1.0).unwrap();
        let mut field = LayerField::zeros(&grid);
        let created = AtomicUsize::new(0);
        for_each_column_init(
            &mut field,
            || {
                created.fetch_add(1, Ordering::Relaxed);
                Vec::<f64>::new()
            },
            |scratch, c, column| {
                scratch.clear();
                scratch.extend((0..column.len()).map(|l| (c.get() * 10 + l) as f64));
                column.copy_from_slice(scratch);
            },
        );
        for col in grid.columns() {
            assert_eq!(field.get(col, 2), (col.get() * 10 + 2) as f64);
        }
        let created = created.load(Ordering::Relaxed);
        assert!((1..=grid.n_columns()).contains(&created));
        #[cfg(not(feature = "parallel"))]
        assert_eq!(created, 1);
    }

    #[test]
    fn test_for_each_point_reads_shared_input() {
        let grid = Grid2D::new(4, 2, 1, 1.0).unwrap();
        let source = SurfaceField::from_fn(&grid, |c| c.get() as f64);
        let mut target = SurfaceField::zeros(&grid);
        for_each_point(&mut target, |c, v| *v = 2.0 * source.get(c));
        assert_eq!(target.get(ColumnIndex::new(3)), 6.0);
    }
}
