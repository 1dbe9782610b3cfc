//! Diffusion of tracers carried by the layers (temperature, salinity,
//! passive scalars).
//!
//! Tracers use the same operators as the velocity but with their own
//! diffusivity and flux boundaries at both ends, and without any surface
//! stress coupling.

use crate::config::DEFAULT_DRY;
use crate::error::{LayeredError, Result};
use crate::grid::{Grid2D, LayerField, SurfaceField};
use crate::horizontal::horizontal_diffusion;
use crate::vertical::{BottomField, VerticalSweep, diffuse_columns};

use super::state::LayeredState;

/// Diffusion settings for one tracer.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TracerDiffusion {
    /// Diffusivity.
    pub d: f64,
    /// Apply horizontal diffusion after the vertical solve.
    pub horizontal: bool,
    /// Dry thickness threshold.
    pub dry: f64,
}

impl TracerDiffusion {
    pub fn new(d: f64) -> Self {
        Self {
            d,
            horizontal: false,
            dry: DEFAULT_DRY,
        }
    }

    pub fn with_horizontal(mut self, enabled: bool) -> Self {
        self.horizontal = enabled;
        self
    }

    pub fn with_dry(mut self, dry: f64) -> Self {
        self.dry = dry;
        self
    }

    /// Diffuse `s` over the layers of `state`.
    ///
    /// # Arguments
    /// * `surface_flux` - Gradient of `s` at the free surface
    /// * `bottom_flux` - Gradient of `s` at the bed
    ///
    /// # Errors
    ///
    /// Fails on a negative diffusivity or time step, or on a field that
    /// does not match `grid`.
    pub fn apply(
        &self,
        grid: &Grid2D,
        state: &LayeredState,
        s: &mut LayerField,
        dt: f64,
        surface_flux: &SurfaceField,
        bottom_flux: &SurfaceField,
    ) -> Result<VerticalSweep> {
        if !(self.d.is_finite() && self.d >= 0.0) {
            return Err(LayeredError::InvalidConfig(format!(
                "diffusivity must be non-negative, got {}",
                self.d
            )));
        }
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(LayeredError::InvalidConfig(format!(
                "time step must be non-negative, got {dt}"
            )));
        }
        if self.d == 0.0 {
            s.check_shape(grid, "s")?;
            return Ok(VerticalSweep::default());
        }

        let sweep = diffuse_columns(
            grid,
            &state.h,
            s,
            dt,
            self.d,
            surface_flux,
            BottomField::Flux(bottom_flux),
            Some(self.dry),
        )?;
        if self.horizontal {
            horizontal_diffusion(grid, &state.h, &state.zb, s, self.d, dt, surface_flux, self.dry)?;
        }
        Ok(sweep)
    }
}
