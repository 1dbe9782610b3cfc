//! Fields of the layered solver read and written by the viscous step.

use crate::error::Result;
use crate::grid::{FaceField, Grid2D, LayerField, SurfaceField};
use crate::types::Horizontal;

/// Layered state owned by the host solver.
///
/// Face fields follow the convention of [`FaceField`]: the value stored at
/// a column belongs to its lower-index face along that direction.
#[derive(Clone, Debug, PartialEq)]
pub struct LayeredState {
    /// Layer thicknesses at time n+1.
    pub h: LayerField,
    /// Face thicknesses.
    pub hf: FaceField,
    /// Horizontal velocity per layer.
    pub u: Horizontal<LayerField>,
    /// Vertical velocity per layer, only the top layer is read.
    pub w: LayerField,
    /// Free-surface elevation.
    pub eta: SurfaceField,
    /// Bed elevation.
    pub zb: SurfaceField,
    /// Face acceleration of the previous step.
    pub ha: FaceField,
}

impl LayeredState {
    /// Dry, motionless state on `grid`.
    pub fn zeros(grid: &Grid2D) -> Self {
        Self {
            h: LayerField::zeros(grid),
            hf: FaceField::zeros(grid),
            u: FaceField::zeros(grid),
            w: LayerField::zeros(grid),
            eta: SurfaceField::zeros(grid),
            zb: SurfaceField::zeros(grid),
            ha: FaceField::zeros(grid),
        }
    }

    /// Water at rest over a flat bed at `-depth`, split into equal layers.
    pub fn at_rest(grid: &Grid2D, depth: f64) -> Self {
        let layer = depth / grid.n_layers() as f64;
        Self {
            h: LayerField::filled(grid, layer),
            hf: FaceField::from_fn(|_| LayerField::filled(grid, layer)),
            zb: SurfaceField::filled(grid, -depth),
            ..Self::zeros(grid)
        }
    }

    /// Check every field against `grid`.
    pub fn check_shape(&self, grid: &Grid2D) -> Result<()> {
        self.h.check_shape(grid, "h")?;
        self.hf.check_shape(grid, "hf")?;
        self.u.check_shape(grid, "u")?;
        self.w.check_shape(grid, "w")?;
        self.eta.check_shape(grid, "eta")?;
        self.zb.check_shape(grid, "zb")?;
        self.ha.check_shape(grid, "ha")
    }
}
