//! Runtime diagnostics for layered fields.
//!
//! Provides the quantities the diffusion operators are expected to respect:
//! - Content `Σ h·s` (conserved by zero-flux diffusion)
//! - Thickness-weighted variance (never increased by zero-flux diffusion)
//! - Bounds and a count of non-finite values
//!
//! # Example
//!
//! ```
//! use layered_rs::diagnostics::{ContentTracker, FieldDiagnostics};
//! use layered_rs::grid::{Grid2D, LayerField};
//!
//! let grid = Grid2D::new(4, 4, 2, 1.0).unwrap();
//! let h = LayerField::filled(&grid, 0.5);
//! let s = LayerField::from_fn(&grid, |c, _| c.get() as f64);
//!
//! let diag = FieldDiagnostics::compute(&grid, &h, &s, 1e-10).unwrap();
//! let mut tracker = ContentTracker::new(diag.clone());
//! tracker.update(diag);
//! assert_eq!(tracker.content_error(), 0.0);
//! ```

use log::warn;

use crate::error::Result;
use crate::grid::{Grid2D, LayerField};

/// Content `Σ h·s` of one column.
#[inline]
pub fn column_content(h: &[f64], s: &[f64]) -> f64 {
    h.iter().zip(s).map(|(h, s)| h * s).sum()
}

/// Thickness-weighted variance of one column about its mean.
///
/// Zero for an empty or zero-thickness column.
pub fn column_variance(h: &[f64], s: &[f64]) -> f64 {
    let depth: f64 = h.iter().sum();
    if depth <= 0.0 {
        return 0.0;
    }
    let mean = column_content(h, s) / depth;
    h.iter()
        .zip(s)
        .map(|(h, s)| h * (s - mean) * (s - mean))
        .sum::<f64>()
        / depth
}

/// Summary quantities of a layered field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDiagnostics {
    /// Integral of `h·s` over the domain.
    pub content: f64,
    /// Integral of `h` over the domain.
    pub volume: f64,
    /// Smallest value in wet layers.
    pub min: f64,
    /// Largest value in wet layers.
    pub max: f64,
    /// Thickness-weighted variance about the domain mean.
    pub variance: f64,
    /// Number of NaN or infinite values.
    pub non_finite: usize,
}

impl FieldDiagnostics {
    /// Compute diagnostics of `s` on layers of thickness `h`.
    ///
    /// # Arguments
    /// * `grid` - Grid the fields live on, sets the cell area
    /// * `h` - Layer thicknesses
    /// * `s` - Field to inspect
    /// * `dry` - Layers with `h <= dry` are ignored for the bounds
    ///
    /// # Errors
    ///
    /// Fails if a field does not match `grid`.
    pub fn compute(grid: &Grid2D, h: &LayerField, s: &LayerField, dry: f64) -> Result<Self> {
        h.check_shape(grid, "h")?;
        s.check_shape(grid, "s")?;

        let area = grid.delta() * grid.delta();
        let mut content = 0.0;
        let mut volume = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut non_finite = 0;

        for (&hl, &sl) in h.as_slice().iter().zip(s.as_slice()) {
            if !sl.is_finite() {
                non_finite += 1;
                continue;
            }
            content += hl * sl * area;
            volume += hl * area;
            if hl > dry {
                min = min.min(sl);
                max = max.max(sl);
            }
        }

        let variance = if volume > 0.0 {
            let mean = content / volume;
            h.as_slice()
                .iter()
                .zip(s.as_slice())
                .filter(|(_, s)| s.is_finite())
                .map(|(h, s)| h * (s - mean) * (s - mean) * area)
                .sum::<f64>()
                / volume
        } else {
            0.0
        };

        // Fully dry domain
        if min > max {
            min = 0.0;
            max = 0.0;
        }

        if non_finite > 0 {
            warn!("{non_finite} non-finite values in layered field");
        }

        Ok(Self {
            content,
            volume,
            min,
            max,
            variance,
            non_finite,
        })
    }

    /// Whether every value is finite.
    pub fn is_finite(&self) -> bool {
        self.non_finite == 0
    }

    /// Format diagnostics as a single-line summary.
    pub fn summary_line(&self) -> String {
        format!(
            "C={:.6e} V={:.4e} s=[{:.4},{:.4}] var={:.4e} nan={}",
            self.content, self.volume, self.min, self.max, self.variance, self.non_finite
        )
    }
}

/// Track content and variance of a field over time.
#[derive(Clone, Debug)]
pub struct ContentTracker {
    initial: FieldDiagnostics,
    current: FieldDiagnostics,
    n_updates: usize,
}

impl ContentTracker {
    pub fn new(initial: FieldDiagnostics) -> Self {
        Self {
            current: initial.clone(),
            initial,
            n_updates: 0,
        }
    }

    pub fn update(&mut self, diag: FieldDiagnostics) {
        self.n_updates += 1;
        self.current = diag;
    }

    /// Relative change of content since the first record.
    pub fn content_error(&self) -> f64 {
        let c0 = self.initial.content;
        if c0.abs() > 1e-14 {
            (self.current.content - c0).abs() / c0.abs()
        } else {
            (self.current.content - c0).abs()
        }
    }

    /// Relative change of variance, negative when the field has smoothed.
    pub fn variance_change(&self) -> f64 {
        let v0 = self.initial.variance;
        if v0.abs() > 1e-14 {
            (self.current.variance - v0) / v0
        } else {
            0.0
        }
    }

    pub fn current(&self) -> &FieldDiagnostics {
        &self.current
    }

    pub fn initial(&self) -> &FieldDiagnostics {
        &self.initial
    }

    pub fn n_updates(&self) -> usize {
        self.n_updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_column_helpers() {
        let h = [1.0, 2.0, 1.0];
        let s = [1.0, 2.0, 3.0];
        assert_relative_eq!(column_content(&h, &s), 8.0);
        // mean 2, variance (1 + 0 + 1)/4
        assert_relative_eq!(column_variance(&h, &s), 0.5);
        assert_eq!(column_variance(&[0.0, 0.0], &s[..2]), 0.0);
    }

    #[test]
    fn test_uniform_field() {
        let grid = Grid2D::new(3, 2, 2, 0.5).unwrap();
        let h = LayerField::filled(&grid, 2.0);
        let s = LayerField::filled(&grid, 3.0);
        let diag = FieldDiagnostics::compute(&grid, &h, &s, 1e-10).unwrap();
        // 12 layers of area 0.25, thickness 2
        assert_relative_eq!(diag.volume, 6.0);
        assert_relative_eq!(diag.content, 18.0);
        assert_eq!((diag.min, diag.max), (3.0, 3.0));
        assert_relative_eq!(diag.variance, 0.0);
        assert!(diag.is_finite());
    }

    #[test]
    fn test_non_finite_counted() {
        let grid = Grid2D::new(2, 1, 2, 1.0).unwrap();
        let h = LayerField::filled(&grid, 1.0);
        let mut s = LayerField::filled(&grid, 1.0);
        s.set(grid.column_index(1, 0), 1, f64::NAN);
        let diag = FieldDiagnostics::compute(&grid, &h, &s, 0.0).unwrap();
        assert_eq!(diag.non_finite, 1);
        assert!(!diag.is_finite());
        assert_relative_eq!(diag.content, 3.0);
        assert!(diag.summary_line().contains("nan=1"));
    }

    #[test]
    fn test_dry_layers_excluded_from_bounds() {
        let grid = Grid2D::new(2, 1, 1, 1.0).unwrap();
        let h = LayerField::from_fn(&grid, |c, _| c.get() as f64);
        let s = LayerField::from_fn(&grid, |c, _| 10.0 - c.get() as f64);
        let diag = FieldDiagnostics::compute(&grid, &h, &s, 1e-10).unwrap();
        assert_eq!((diag.min, diag.max), (9.0, 9.0));
    }

    #[test]
    fn test_tracker() {
        let grid = Grid2D::new(2, 2, 1, 1.0).unwrap();
        let h = LayerField::filled(&grid, 1.0);
        let s0 = LayerField::from_fn(&grid, |c, _| c.get() as f64);
        let s1 = LayerField::filled(&grid, 1.5);

        let mut tracker = ContentTracker::new(FieldDiagnostics::compute(&grid, &h, &s0, 0.0).unwrap());
        tracker.update(FieldDiagnostics::compute(&grid, &h, &s1, 0.0).unwrap());
        assert_eq!(tracker.n_updates(), 1);
        assert_relative_eq!(tracker.content_error(), 0.0);
        assert_relative_eq!(tracker.variance_change(), -1.0);
    }
}
