//! Configuration for the viscous step.
//!
//! The layered solver keeps its viscosity, toggles and boundary coefficient
//! fields as process-wide state. Here they are plain values threaded through
//! every call: [`ViscosityConfig`] for scalars and switches,
//! [`BoundaryFields`] for the per-point boundary data.

use crate::error::{LayeredError, Result};
use crate::grid::{Grid2D, SurfaceField};
use crate::types::{Direction, Horizontal};
use crate::vertical::VerticalScheme;

/// Default dry thickness threshold.
pub const DEFAULT_DRY: f64 = 1e-10;

/// Default number of relaxation sweeps for the surface stress.
pub const DEFAULT_SWEEPS: usize = 10;

/// Stopping rule of the surface stress relaxation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RelaxationConfig {
    /// Upper bound on the number of Jacobi sweeps.
    pub max_sweeps: usize,
    /// Stop early once the largest change between two sweeps drops below
    /// this value. `None` always runs `max_sweeps` sweeps.
    pub tolerance: Option<f64>,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            max_sweeps: DEFAULT_SWEEPS,
            tolerance: None,
        }
    }
}

impl RelaxationConfig {
    /// Fixed number of sweeps, no early exit.
    pub fn fixed(sweeps: usize) -> Self {
        Self {
            max_sweeps: sweeps,
            tolerance: None,
        }
    }

    /// Set the early-exit tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Fails on a zero sweep count or a negative or non-finite tolerance.
    pub fn validate(&self) -> Result<()> {
        if self.max_sweeps == 0 {
            return Err(LayeredError::InvalidConfig(
                "relaxation needs at least one sweep".into(),
            ));
        }
        if let Some(tol) = self.tolerance {
            if !(tol.is_finite() && tol >= 0.0) {
                return Err(LayeredError::InvalidConfig(format!(
                    "relaxation tolerance must be non-negative, got {tol}"
                )));
            }
        }
        Ok(())
    }
}

/// Scalars and switches of the viscous step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViscosityConfig {
    /// Kinematic viscosity. Zero disables the viscous step entirely.
    pub nu: f64,
    /// Thickness at or below which a layer counts as dry.
    pub dry: f64,
    /// Apply horizontal diffusion after the vertical solve.
    pub horizontal_diffusion: bool,
    /// Couple the free-surface normal and tangential stresses.
    pub surface_coupling: bool,
    /// Bottom closure of the vertical solve.
    pub scheme: VerticalScheme,
    /// Leave columns containing a dry layer untouched in the vertical solve.
    pub skip_dry_columns: bool,
    /// Surface stress relaxation.
    pub relaxation: RelaxationConfig,
}

impl Default for ViscosityConfig {
    fn default() -> Self {
        Self {
            nu: 0.0,
            dry: DEFAULT_DRY,
            horizontal_diffusion: false,
            surface_coupling: true,
            scheme: VerticalScheme::default(),
            skip_dry_columns: true,
            relaxation: RelaxationConfig::default(),
        }
    }
}

impl ViscosityConfig {
    /// Default configuration with viscosity `nu`.
    pub fn new(nu: f64) -> Self {
        Self {
            nu,
            ..Self::default()
        }
    }

    pub fn with_dry(mut self, dry: f64) -> Self {
        self.dry = dry;
        self
    }

    pub fn with_horizontal_diffusion(mut self, enabled: bool) -> Self {
        self.horizontal_diffusion = enabled;
        self
    }

    pub fn with_surface_coupling(mut self, enabled: bool) -> Self {
        self.surface_coupling = enabled;
        self
    }

    pub fn with_scheme(mut self, scheme: VerticalScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_skip_dry_columns(mut self, skip: bool) -> Self {
        self.skip_dry_columns = skip;
        self
    }

    pub fn with_relaxation(mut self, relaxation: RelaxationConfig) -> Self {
        self.relaxation = relaxation;
        self
    }

    /// Whether the viscous step does anything at all.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.nu > 0.0
    }

    /// Whether the surface stress terms are computed.
    #[inline]
    pub fn couples_surface(&self) -> bool {
        self.surface_coupling && self.is_active()
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Fails on negative or non-finite viscosity or dry threshold, or an
    /// invalid relaxation setting.
    pub fn validate(&self) -> Result<()> {
        if !(self.nu.is_finite() && self.nu >= 0.0) {
            return Err(LayeredError::InvalidConfig(format!(
                "viscosity must be non-negative, got {}",
                self.nu
            )));
        }
        if !(self.dry.is_finite() && self.dry >= 0.0) {
            return Err(LayeredError::InvalidConfig(format!(
                "dry threshold must be non-negative, got {}",
                self.dry
            )));
        }
        self.relaxation.validate()
    }
}

/// Per-point boundary data of the vertical velocity solve.
///
/// All fields default to zero: a free-slip surface and a no-slip bed.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryFields {
    /// Surface gradient of the velocity (`∂z u` at the top).
    pub dut: Horizontal<SurfaceField>,
    /// Bed velocity of the Navier slip condition.
    pub u_b: Horizontal<SurfaceField>,
    /// Slip length of the Navier condition, zero for no-slip.
    pub lambda_b: Horizontal<SurfaceField>,
    /// Bottom gradient of the velocity for the flux closure.
    pub dub: Horizontal<SurfaceField>,
}

impl BoundaryFields {
    /// All-zero boundary data on `grid`.
    pub fn zeros(grid: &Grid2D) -> Self {
        Self {
            dut: Horizontal::<SurfaceField>::zeros(grid),
            u_b: Horizontal::<SurfaceField>::zeros(grid),
            lambda_b: Horizontal::<SurfaceField>::zeros(grid),
            dub: Horizontal::<SurfaceField>::zeros(grid),
        }
    }

    /// Uniform slip length in both directions.
    pub fn with_slip_length(mut self, grid: &Grid2D, lambda_b: f64) -> Self {
        self.lambda_b = Horizontal::splat(SurfaceField::filled(grid, lambda_b));
        self
    }

    /// Surface gradient along `dir`.
    #[inline]
    pub fn dut(&self, dir: Direction) -> &SurfaceField {
        self.dut.get(dir)
    }

    /// Check every field against `grid`.
    pub fn check_shape(&self, grid: &Grid2D) -> Result<()> {
        self.dut.check_shape(grid, "dut")?;
        self.u_b.check_shape(grid, "u_b")?;
        self.lambda_b.check_shape(grid, "lambda_b")?;
        self.dub.check_shape(grid, "dub")
    }
}
