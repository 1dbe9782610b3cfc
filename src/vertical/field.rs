//! Vertical diffusion over every column of a layered field.

use super::column::{BottomBoundary, ColumnBoundary, solve_column};
use super::tridiagonal::TridiagonalSystem;
use crate::error::Result;
use crate::grid::{Grid2D, LayerField, SurfaceField, for_each_column_init};
use crate::types::ColumnIndex;

/// Bottom boundary data for a whole field.
#[derive(Clone, Copy, Debug)]
pub enum BottomField<'a> {
    /// Prescribed bottom gradient per column.
    Flux(&'a SurfaceField),
    /// Navier slip with a reference value and a slip length per column.
    NavierSlip {
        value: &'a SurfaceField,
        slip_length: &'a SurfaceField,
    },
}

impl BottomField<'_> {
    #[inline]
    fn at(&self, col: ColumnIndex) -> BottomBoundary {
        match self {
            BottomField::Flux(dsb) => BottomBoundary::Flux { dsb: dsb.get(col) },
            BottomField::NavierSlip { value, slip_length } => BottomBoundary::NavierSlip {
                s_b: value.get(col),
                lambda_b: slip_length.get(col),
            },
        }
    }

    fn check_shape(&self, grid: &Grid2D) -> Result<()> {
        match self {
            BottomField::Flux(dsb) => dsb.check_shape(grid, "dsb"),
            BottomField::NavierSlip { value, slip_length } => {
                value.check_shape(grid, "s_b")?;
                slip_length.check_shape(grid, "lambda_b")
            }
        }
    }
}

/// Outcome of a field-wide vertical solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerticalSweep {
    /// Columns that were solved.
    pub solved: usize,
    /// Columns skipped as dry.
    pub skipped: usize,
}

/// Diffuse `s` vertically in every column.
///
/// # Arguments
///
/// * `grid` - Grid both fields live on
/// * `h` - Layer thicknesses at time n+1
/// * `s` - Field to diffuse, overwritten in place
/// * `dt` - Time step
/// * `d` - Diffusivity
/// * `top_flux` - Surface gradient per column
/// * `bottom` - Bottom closure per column
/// * `dry` - When set, columns with any layer thickness at or below this
///   threshold are left untouched
///
/// # Errors
///
/// Fails if a field does not match `grid`.
#[allow(clippy::too_many_arguments)]
pub fn diffuse_columns(
    grid: &Grid2D,
    h: &LayerField,
    s: &mut LayerField,
    dt: f64,
    d: f64,
    top_flux: &SurfaceField,
    bottom: BottomField<'_>,
    dry: Option<f64>,
) -> Result<VerticalSweep> {
    h.check_shape(grid, "h")?;
    s.check_shape(grid, "s")?;
    top_flux.check_shape(grid, "dst")?;
    bottom.check_shape(grid)?;

    let skipped = match dry {
        Some(threshold) => h
            .columns()
            .filter(|column| column.iter().any(|&hl| hl <= threshold))
            .count(),
        None => 0,
    };

    let n_layers = grid.n_layers();
    for_each_column_init(
        s,
        || TridiagonalSystem::new(n_layers),
        |system, col, column| {
            let hc = h.column(col);
            if let Some(threshold) = dry {
                if hc.iter().any(|&hl| hl <= threshold) {
                    return;
                }
            }
            let bc = ColumnBoundary {
                top_flux: top_flux.get(col),
                bottom: bottom.at(col),
            };
            solve_column(system, hc, column, dt, d, &bc);
        },
    );

    Ok(VerticalSweep {
        solved: grid.n_columns() - skipped,
        skipped,
    })
}
