//! Coupling of a layered pressure field into the face acceleration.

use crate::config::DEFAULT_DRY;
use crate::grid::{FaceField, Grid2D, LayerField, for_each_column};
use crate::types::Direction;

/// Adds the horizontal gradient of a pressure-like field `phi` to the face
/// acceleration `ha`.
///
/// Implementations are expected to be stateless so that one instance can
/// be shared between threads.
pub trait PressureGradient: Send + Sync {
    /// Increment `ha` with the contribution of `phi`, given the face
    /// thicknesses `hf`.
    fn add_gradient(&self, grid: &Grid2D, phi: &LayerField, hf: &FaceField, ha: &mut FaceField);

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Face-thickness weighted centred gradient.
///
/// On the face between cells `[-1]` and `[0]` of layer `l`:
/// `ha += -hf·(φ[0] - φ[-1])/Δ`, skipped where `hf <= dry`.
///
/// For a `phi` that is constant along each column this is the discrete
/// form of `-∇(hφ) + φ∇z` in every layer. A vertically varying `phi` is
/// differenced layer by layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FacePressureGradient {
    pub dry: f64,
}

impl Default for FacePressureGradient {
    fn default() -> Self {
        Self { dry: DEFAULT_DRY }
    }
}

impl FacePressureGradient {
    pub fn new(dry: f64) -> Self {
        Self { dry }
    }
}

impl PressureGradient for FacePressureGradient {
    fn add_gradient(&self, grid: &Grid2D, phi: &LayerField, hf: &FaceField, ha: &mut FaceField) {
        let inv_delta = 1.0 / grid.delta();
        let dry = self.dry;
        for dir in Direction::ALL {
            let hf = hf.get(dir);
            for_each_column(ha.get_mut(dir), |col, column| {
                let behind = grid.neighbor(col, dir, -1);
                let (phi_c, phi_m) = (phi.column(col), phi.column(behind));
                for (l, ha) in column.iter_mut().enumerate() {
                    let hf = hf.get(col, l);
                    if hf > dry {
                        *ha -= hf * (phi_c[l] - phi_m[l]) * inv_delta;
                    }
                }
            });
        }
    }

    fn name(&self) -> &'static str {
        "face-pressure-gradient"
    }
}
