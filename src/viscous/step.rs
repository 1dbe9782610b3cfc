//! The viscous step of the layered solver.
//!
//! Vertical viscosity is applied right after advection, before the
//! pressure gradient of the current step is known. To let the implicit
//! solve see the pressure forcing, the acceleration of the previous step is
//! added first, the velocity is diffused, and the same acceleration is
//! removed again.

use log::debug;

use super::state::LayeredState;
use crate::config::{BoundaryFields, ViscosityConfig};
use crate::error::{LayeredError, Result};
use crate::grid::{FaceField, Grid2D, LayerField, SurfaceField, for_each_column};
use crate::horizontal::horizontal_diffusion;
use crate::surface::{
    FacePressureGradient, PressureGradient, RelaxationReport, apply_normal_stress,
    tangential_stress,
};
use crate::types::{Direction, Horizontal};
use crate::vertical::{BottomField, VerticalScheme, VerticalSweep, diffuse_columns};

fn check_timestep(dt: f64) -> Result<()> {
    if !(dt.is_finite() && dt >= 0.0) {
        return Err(LayeredError::InvalidConfig(format!(
            "time step must be non-negative, got {dt}"
        )));
    }
    Ok(())
}

/// Cell-centred acceleration along `dir`, averaged from the two faces of
/// each cell: `(ha[0] + ha[1]) / (hf[0] + hf[1] + dry)`.
pub fn cell_acceleration(
    grid: &Grid2D,
    hf: &FaceField,
    ha: &FaceField,
    dir: Direction,
    dry: f64,
) -> LayerField {
    let (hf, ha) = (hf.get(dir), ha.get(dir));
    let mut acc = LayerField::zeros(grid);
    for_each_column(&mut acc, |col, column| {
        let next = grid.neighbor(col, dir, 1);
        for (l, a) in column.iter_mut().enumerate() {
            *a = (ha.get(col, l) + ha.get(next, l)) / (hf.get(col, l) + hf.get(next, l) + dry);
        }
    });
    acc
}

fn add_scaled(target: &mut LayerField, source: &LayerField, factor: f64) {
    for (t, s) in target.as_mut_slice().iter_mut().zip(source.as_slice()) {
        *t += factor * s;
    }
}

/// What [`viscous_term`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViscousTermReport {
    /// False when the viscosity is zero and nothing was touched.
    pub active: bool,
    /// Vertical solve per velocity component.
    pub vertical: Horizontal<VerticalSweep>,
    /// Whether horizontal diffusion ran.
    pub horizontal: bool,
}

/// Diffuse the layered velocity with viscosity `config.nu`.
///
/// 1. Add the previous acceleration: `u += dt·(ha[0] + ha[1])/(hf[0] + hf[1] + dry)`
/// 2. Vertical diffusion of each component with surface gradient `dut` and
///    the configured bottom closure
/// 3. Horizontal diffusion of each component, if enabled
/// 4. Remove the acceleration added in step 1
///
/// Does nothing when `config.nu` is zero.
///
/// # Errors
///
/// Fails on an invalid configuration or time step, or on a field that does
/// not match `grid`.
pub fn viscous_term(
    grid: &Grid2D,
    config: &ViscosityConfig,
    bc: &BoundaryFields,
    state: &mut LayeredState,
    dt: f64,
) -> Result<ViscousTermReport> {
    config.validate()?;
    check_timestep(dt)?;
    state.check_shape(grid)?;
    bc.check_shape(grid)?;

    if !config.is_active() {
        return Ok(ViscousTermReport::default());
    }

    let acc =
        Horizontal::from_fn(|dir| cell_acceleration(grid, &state.hf, &state.ha, dir, config.dry));
    for dir in Direction::ALL {
        add_scaled(state.u.get_mut(dir), acc.get(dir), dt);
    }

    let dry = config.skip_dry_columns.then_some(config.dry);
    let mut report = ViscousTermReport {
        active: true,
        ..Default::default()
    };
    for dir in Direction::ALL {
        let bottom = match config.scheme {
            VerticalScheme::NeumannNeumann => BottomField::Flux(bc.dub.get(dir)),
            VerticalScheme::NeumannNavier => BottomField::NavierSlip {
                value: bc.u_b.get(dir),
                slip_length: bc.lambda_b.get(dir),
            },
        };
        *report.vertical.get_mut(dir) = diffuse_columns(
            grid,
            &state.h,
            state.u.get_mut(dir),
            dt,
            config.nu,
            bc.dut(dir),
            bottom,
            dry,
        )?;
    }

    if config.horizontal_diffusion {
        for dir in Direction::ALL {
            horizontal_diffusion(
                grid,
                &state.h,
                &state.zb,
                state.u.get_mut(dir),
                config.nu,
                dt,
                bc.dut(dir),
                config.dry,
            )?;
        }
        report.horizontal = true;
    }

    for dir in Direction::ALL {
        add_scaled(state.u.get_mut(dir), acc.get(dir), -dt);
    }

    Ok(report)
}

/// Summary of one [`ViscousStep::advance`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Largest `|phiNu|`, when the normal stress was applied.
    pub phi_max: Option<f64>,
    /// Relaxation reports, when the tangential stress was solved.
    pub relaxation: Option<Horizontal<RelaxationReport>>,
    pub viscous: ViscousTermReport,
}

impl StepReport {
    /// Format the report as a single line.
    pub fn summary_line(&self) -> String {
        let phi = self
            .phi_max
            .map_or_else(|| "-".to_string(), |p| format!("{p:.3e}"));
        let relax = self.relaxation.map_or_else(
            || "-".to_string(),
            |r| {
                format!(
                    "{}/{} sweeps, res=({:.2e},{:.2e})",
                    r.x.sweeps, r.y.sweeps, r.x.residual, r.y.residual
                )
            },
        );
        let v = &self.viscous.vertical;
        format!(
            "|phi|={phi} relax=[{relax}] cols={}/{} skipped={}/{} hdiff={}",
            v.x.solved, v.y.solved, v.x.skipped, v.y.skipped, self.viscous.horizontal
        )
    }
}

/// Viscous step with free-surface stress coupling.
///
/// # Example
///
/// ```
/// use layered_rs::config::{BoundaryFields, ViscosityConfig};
/// use layered_rs::grid::{EdgeRule, Grid2D};
/// use layered_rs::viscous::{LayeredState, ViscousStep};
///
/// let grid = Grid2D::new(8, 8, 4, 0.1).unwrap().with_edges(EdgeRule::Periodic);
/// let mut state = LayeredState::at_rest(&grid, 1.0);
/// let mut bc = BoundaryFields::zeros(&grid);
///
/// let step = ViscousStep::new(ViscosityConfig::new(1e-3)).unwrap();
/// let report = step.advance(&grid, &mut state, &mut bc, 1e-3).unwrap();
/// assert!(report.viscous.active);
/// ```
#[derive(Clone, Debug)]
pub struct ViscousStep<P: PressureGradient = FacePressureGradient> {
    config: ViscosityConfig,
    gradient: P,
}

impl ViscousStep {
    /// Viscous step using [`FacePressureGradient`] with the configured dry
    /// threshold.
    ///
    /// # Errors
    ///
    /// Fails if `config` is invalid.
    pub fn new(config: ViscosityConfig) -> Result<Self> {
        let gradient = FacePressureGradient::new(config.dry);
        Self::with_gradient(config, gradient)
    }
}

impl<P: PressureGradient> ViscousStep<P> {
    /// Viscous step using a custom pressure-gradient coupling.
    ///
    /// # Errors
    ///
    /// Fails if `config` is invalid.
    pub fn with_gradient(config: ViscosityConfig, gradient: P) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, gradient })
    }

    pub fn config(&self) -> &ViscosityConfig {
        &self.config
    }

    pub fn gradient(&self) -> &P {
        &self.gradient
    }

    /// Add the gradient of the surface pressure deviation to `state.ha`.
    ///
    /// Returns `phiNu`, or `None` when the coupling is off or `nu` is zero.
    ///
    /// # Errors
    ///
    /// Fails on a field that does not match `grid`.
    pub fn apply_normal_stress(
        &self,
        grid: &Grid2D,
        state: &mut LayeredState,
        bc: &BoundaryFields,
    ) -> Result<Option<SurfaceField>> {
        if !self.config.couples_surface() {
            return Ok(None);
        }
        let phi = apply_normal_stress(
            grid,
            &self.gradient,
            &state.h,
            &state.hf,
            &state.u,
            &bc.dut,
            &state.eta,
            self.config.nu,
            &mut state.ha,
        )?;
        Ok(Some(phi))
    }

    /// Solve the tangential stress condition and store it in `bc.dut`.
    ///
    /// Returns the relaxation reports, or `None` when the coupling is off
    /// or `nu` is zero, in which case `bc.dut` is left as it is.
    ///
    /// # Errors
    ///
    /// Fails on a field that does not match `grid`.
    pub fn update_surface_stress(
        &self,
        grid: &Grid2D,
        state: &LayeredState,
        bc: &mut BoundaryFields,
    ) -> Result<Option<Horizontal<RelaxationReport>>> {
        if !self.config.couples_surface() {
            return Ok(None);
        }
        bc.dut.check_shape(grid, "dut")?;
        let stress = tangential_stress(
            grid,
            &state.h,
            &state.u,
            &state.w,
            &state.eta,
            &self.config.relaxation,
        )?;
        bc.dut = stress.du_nu;
        Ok(Some(stress.reports))
    }

    /// See [`viscous_term`].
    ///
    /// # Errors
    ///
    /// Fails on an invalid time step or a field that does not match `grid`.
    pub fn viscous_term(
        &self,
        grid: &Grid2D,
        state: &mut LayeredState,
        bc: &BoundaryFields,
        dt: f64,
    ) -> Result<ViscousTermReport> {
        viscous_term(grid, &self.config, bc, state, dt)
    }

    /// Normal stress, then tangential stress, then the viscous term.
    ///
    /// # Errors
    ///
    /// Fails on an invalid time step or a field that does not match `grid`.
    /// Nothing is modified in that case.
    pub fn advance(
        &self,
        grid: &Grid2D,
        state: &mut LayeredState,
        bc: &mut BoundaryFields,
        dt: f64,
    ) -> Result<StepReport> {
        check_timestep(dt)?;
        state.check_shape(grid)?;
        bc.check_shape(grid)?;

        let phi = self.apply_normal_stress(grid, state, bc)?;
        let relaxation = self.update_surface_stress(grid, state, bc)?;
        let viscous = self.viscous_term(grid, state, bc, dt)?;

        let report = StepReport {
            phi_max: phi.map(|p| p.max_abs()),
            relaxation,
            viscous,
        };
        debug!("viscous step [{}]: {}", self.gradient.name(), report.summary_line());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::EdgeRule;
    use approx::assert_relative_eq;

    fn grid() -> Grid2D {
        Grid2D::new(6, 5, 3, 0.2)
            .unwrap()
            .with_edges(EdgeRule::Periodic)
    }

    #[test]
    fn test_inactive_without_viscosity() {
        let grid = grid();
        let mut state = LayeredState::at_rest(&grid, 1.0);
        state.u.x = LayerField::from_fn(&grid, |c, l| (c.get() + l.get()) as f64);
        state.ha.x = LayerField::filled(&grid, 1.0);
        let before = state.clone();
        let mut bc = BoundaryFields::zeros(&grid);

        let step = ViscousStep::new(ViscosityConfig::default()).unwrap();
        let report = step.advance(&grid, &mut state, &mut bc, 0.1).unwrap();
        assert_eq!(report.phi_max, None);
        assert_eq!(report.relaxation, None);
        assert!(!report.viscous.active);
        assert_eq!(state, before);
    }

    #[test]
    fn test_acceleration_round_trip() {
        // Uniform flow with a uniform acceleration: with zero surface
        // stress and a free-slip bed the velocity comes back unchanged.
        let grid = grid();
        let mut state = LayeredState::at_rest(&grid, 1.0);
        state.u.x = LayerField::filled(&grid, 0.3);
        state.ha.x = LayerField::filled(&grid, 0.05);
        let bc = BoundaryFields::zeros(&grid);
        let config = ViscosityConfig::new(1e-4).with_scheme(VerticalScheme::NeumannNeumann);

        viscous_term(&grid, &config, &bc, &mut state, 0.01).unwrap();
        for v in state.u.x.as_slice() {
            assert_relative_eq!(*v, 0.3, max_relative = 1e-12);
        }
        assert!(state.u.y.as_slice().iter().all(|&v| v.abs() < 1e-15));
    }

    #[test]
    fn test_cell_acceleration() {
        let grid = Grid2D::new(3, 1, 1, 1.0).unwrap();
        let hf = FaceField::from_fn(|_| LayerField::filled(&grid, 0.5));
        let mut ha = FaceField::zeros(&grid);
        ha.x = LayerField::from_fn(&grid, |c, _| c.get() as f64);

        let acc = cell_acceleration(&grid, &hf, &ha, Direction::X, 0.0);
        assert_relative_eq!(acc.get(grid.column_index(0, 0), 0), 1.0);
        assert_relative_eq!(acc.get(grid.column_index(1, 0), 0), 3.0);
        // Clamped edge: the last cell sees its own face twice.
        assert_relative_eq!(acc.get(grid.column_index(2, 0), 0), 4.0);
    }

    #[test]
    fn test_no_slip_bed_slows_bottom_layer() {
        let grid = grid();
        let mut state = LayeredState::at_rest(&grid, 0.3);
        state.u.x = LayerField::filled(&grid, 1.0);
        let mut bc = BoundaryFields::zeros(&grid);

        let step = ViscousStep::new(ViscosityConfig::new(1e-2)).unwrap();
        let report = step.advance(&grid, &mut state, &mut bc, 0.1).unwrap();
        assert_eq!(report.viscous.vertical.x.solved, grid.n_columns());

        let col = grid.column_index(2, 2);
        let u = state.u.x.column(col);
        assert!(u[0] < u[1] && u[1] < u[2] && u[2] <= 1.0);
        assert_eq!(bc.dut.x.max_abs(), 0.0);
    }

    #[test]
    fn test_surface_stress_published() {
        let grid = grid();
        let mut state = LayeredState::at_rest(&grid, 0.3);
        state.w = LayerField::from_fn(&grid, |c, _| 0.01 * (5.0 * grid.center(c).0).sin());
        let mut bc = BoundaryFields::zeros(&grid);

        let step = ViscousStep::new(ViscosityConfig::new(1e-3)).unwrap();
        let report = step.advance(&grid, &mut state, &mut bc, 1e-3).unwrap();
        let relax = report.relaxation.unwrap();
        assert_eq!(relax.x.sweeps, 10);
        assert!(bc.dut.x.max_abs() > 0.0);
        assert!(report.summary_line().contains("10/10 sweeps"));
    }

    #[test]
    fn test_coupling_toggle() {
        let grid = grid();
        let mut state = LayeredState::at_rest(&grid, 0.3);
        state.u.x = LayerField::from_fn(&grid, |c, _| grid.center(c).0.sin());
        let mut bc = BoundaryFields::zeros(&grid);

        let step =
            ViscousStep::new(ViscosityConfig::new(1e-3).with_surface_coupling(false)).unwrap();
        let report = step.advance(&grid, &mut state, &mut bc, 1e-3).unwrap();
        assert!(report.phi_max.is_none());
        assert!(report.relaxation.is_none());
        assert!(state.ha.x.as_slice().iter().all(|&v| v == 0.0));
        assert!(report.viscous.active);
    }

    #[test]
    fn test_dry_columns_left_alone() {
        let grid = grid();
        let mut state = LayeredState::at_rest(&grid, 0.3);
        let dry = grid.column_index(1, 1);
        state.h.set(dry, 0, 0.0);
        state.u.x = LayerField::filled(&grid, 1.0);
        let bc = BoundaryFields::zeros(&grid);

        let report = viscous_term(&grid, &ViscosityConfig::new(1e-2), &bc, &mut state, 0.1).unwrap();
        assert_eq!(report.vertical.x.skipped, 1);
        assert!(state.u.x.column(dry).iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let grid = grid();
        let mut state = LayeredState::at_rest(&grid, 0.3);
        let mut bc = BoundaryFields::zeros(&grid);
        let step = ViscousStep::new(ViscosityConfig::new(1e-3)).unwrap();

        assert!(step.advance(&grid, &mut state, &mut bc, -1.0).is_err());
        assert!(step.advance(&grid, &mut state, &mut bc, f64::NAN).is_err());

        let other = Grid2D::new(4, 4, 3, 0.2).unwrap();
        let mut wrong = BoundaryFields::zeros(&other);
        assert!(matches!(
            step.advance(&grid, &mut state, &mut wrong, 0.1),
            Err(LayeredError::ShapeMismatch { .. })
        ));
        assert!(ViscousStep::new(ViscosityConfig::new(-1.0)).is_err());
    }
}
