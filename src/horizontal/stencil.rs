//! Layer-slope-aware explicit diffusion stencil.

use crate::error::{LayeredError, Result};
use crate::grid::{Grid2D, LayerField, SurfaceField, for_each_column};
use crate::types::{ColumnIndex, Direction};

/// Heights of the lower interface of every layer: `zb` plus the thickness
/// of all layers below.
pub fn interface_heights(grid: &Grid2D, h: &LayerField, zb: &SurfaceField) -> LayerField {
    let mut zl = LayerField::zeros(grid);
    for_each_column(&mut zl, |col, column| {
        let mut z = zb.get(col);
        for (zl, hl) in column.iter_mut().zip(h.column(col)) {
            *zl = z;
            z += hl;
        }
    });
    zl
}

/// Largest explicit time step for which the 5-point Laplacian stays stable.
///
/// Returns infinity when `d` is not positive.
pub fn stable_timestep(delta: f64, d: f64) -> f64 {
    if d > 0.0 {
        delta * delta / (4.0 * d)
    } else {
        f64::INFINITY
    }
}

/// Read-only view of the inputs of one stencil evaluation along one
/// direction.
struct Stencil<'a> {
    s: &'a LayerField,
    h: &'a LayerField,
    zl: &'a LayerField,
    dst: &'a SurfaceField,
    m: ColumnIndex,
    c: ColumnIndex,
    p: ColumnIndex,
}

impl Stencil<'_> {
    #[inline]
    fn flat(&self, l: usize) -> f64 {
        self.s.get(self.m, l) - 2.0 * self.s.get(self.c, l) + self.s.get(self.p, l)
    }

    /// Correction for sloping layers, before division by `Δ²` and `h`.
    fn slope(&self, l: usize, n_layers: usize) -> f64 {
        let (s, h, zl) = (self.s, self.h, self.zl);
        let (m, c, p) = (self.m, self.c, self.p);

        let dh = h.get(p, l) - h.get(m, l);
        let d2h = h.get(p, l) - 2.0 * h.get(c, l) + h.get(m, l);
        let dz = zl.get(p, l) - zl.get(m, l);
        let d2z = zl.get(p, l) - 2.0 * zl.get(c, l) + zl.get(m, l);

        let mut b = 0.0;
        if l + 1 < n_layers {
            b += (s.get(p, l) - s.get(m, l) - s.get(p, l + 1) + s.get(m, l + 1)) * dh / 4.0;
            b += (s.get(c, l) - s.get(c, l + 1)) * d2h / 2.0;
            if l > 0 {
                b -= (s.get(p, l + 1) - s.get(m, l + 1) - s.get(p, l - 1) + s.get(m, l - 1)) * dz
                    / 4.0;
                b -= (s.get(c, l + 1) - s.get(c, l - 1)) * d2z / 2.0;
            }
        } else {
            // The surface gradient stands in for the missing layer above.
            let (dm, dc, dp) = (self.dst.get(m), self.dst.get(c), self.dst.get(p));
            b += (-dp * h.get(p, l) + dm * h.get(m, l)) * dh / 4.0;
            b += (-dc * h.get(c, l)) * d2h / 2.0;
            if l > 0 {
                b -= (s.get(p, l) + dp * h.get(p, l)
                    - s.get(m, l)
                    - dm * h.get(m, l)
                    - s.get(p, l - 1)
                    + s.get(m, l - 1))
                    * dz
                    / 4.0;
                b -= (s.get(c, l) + dp * h.get(p, l) - s.get(c, l - 1)) * d2z / 2.0;
            }
        }
        b
    }
}

/// Explicit horizontal diffusion of `s`, in place.
///
/// Every layer receives the flat 5-point Laplacian plus a correction for
/// the slope of its interfaces, both evaluated on the field as it was on
/// entry. Cells with `h <= dry` are left unchanged, and the call is a no-op
/// when `d <= 0`.
///
/// # Arguments
///
/// * `grid` - Grid carrying spacing and edge rules
/// * `h` - Layer thicknesses
/// * `zb` - Bed elevation
/// * `s` - Field to diffuse
/// * `d` - Diffusivity
/// * `dt` - Time step, stability is the caller's concern (see [`stable_timestep`])
/// * `dst` - Surface gradient of `s`, used in place of the layer above the top
/// * `dry` - Dry thickness threshold
///
/// # Errors
///
/// Fails if a field does not match `grid` or `dry` is negative.
#[allow(clippy::too_many_arguments)]
pub fn horizontal_diffusion(
    grid: &Grid2D,
    h: &LayerField,
    zb: &SurfaceField,
    s: &mut LayerField,
    d: f64,
    dt: f64,
    dst: &SurfaceField,
    dry: f64,
) -> Result<()> {
    h.check_shape(grid, "h")?;
    zb.check_shape(grid, "zb")?;
    s.check_shape(grid, "s")?;
    dst.check_shape(grid, "dst")?;
    if dry < 0.0 {
        return Err(LayeredError::InvalidConfig(format!(
            "dry threshold must be non-negative, got {dry}"
        )));
    }
    if d <= 0.0 {
        return Ok(());
    }

    let zl = interface_heights(grid, h, zb);
    let old = s.clone();
    let n_layers = grid.n_layers();
    let delta2 = grid.delta() * grid.delta();
    let dt_d = dt * d;

    for_each_column(s, |col, column| {
        let stencils = Direction::ALL.map(|dir| Stencil {
            s: &old,
            h,
            zl: &zl,
            dst,
            m: grid.neighbor(col, dir, -1),
            c: col,
            p: grid.neighbor(col, dir, 1),
        });
        let hc = h.column(col);
        for l in 0..n_layers {
            if hc[l] <= dry {
                continue;
            }
            let flat: f64 = stencils.iter().map(|st| st.flat(l)).sum::<f64>() / delta2;
            let slope: f64 = stencils.iter().map(|st| st.slope(l, n_layers)).sum::<f64>() / delta2;
            column[l] += dt_d * flat;
            column[l] += dt_d * slope / hc[l];
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::EdgeRule;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn periodic(nx: usize, ny: usize, nl: usize) -> Grid2D {
        Grid2D::new(nx, ny, nl, 0.1)
            .unwrap()
            .with_edges(EdgeRule::Periodic)
    }

    #[test]
    fn test_interface_heights() {
        let grid = Grid2D::new(2, 1, 3, 1.0).unwrap();
        let h = LayerField::from_profile(&grid, &[1.0, 2.0, 3.0]).unwrap();
        let zb = SurfaceField::filled(&grid, -10.0);
        let zl = interface_heights(&grid, &h, &zb);
        assert_eq!(zl.column(ColumnIndex::new(1)), &[-10.0, -9.0, -7.0]);
    }

    #[test]
    fn test_constant_field_unchanged() {
        let grid = Grid2D::new(6, 5, 3, 0.1).unwrap();
        let h = LayerField::from_fn(&grid, |c, l| 0.5 + 0.1 * c.get() as f64 + 0.05 * l.get() as f64);
        let zb = SurfaceField::from_fn(&grid, |c| -1.0 + 0.02 * c.get() as f64);
        let mut s = LayerField::filled(&grid, 3.0);
        let dst = SurfaceField::zeros(&grid);

        horizontal_diffusion(&grid, &h, &zb, &mut s, 0.5, 1e-3, &dst, 1e-10).unwrap();
        for v in s.as_slice() {
            assert_relative_eq!(*v, 3.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_zero_diffusivity_is_noop() {
        let grid = periodic(4, 4, 2);
        let h = LayerField::filled(&grid, 1.0);
        let zb = SurfaceField::zeros(&grid);
        let mut s = LayerField::from_fn(&grid, |c, _| c.get() as f64);
        let before = s.clone();
        let dst = SurfaceField::filled(&grid, 2.0);
        horizontal_diffusion(&grid, &h, &zb, &mut s, 0.0, 1.0, &dst, 0.0).unwrap();
        assert_eq!(s, before);
    }

    #[test]
    fn test_periodic_sine_decays_at_discrete_rate() {
        let nx = 16;
        let grid = periodic(nx, 1, 2);
        let h = LayerField::filled(&grid, 1.0);
        let zb = SurfaceField::zeros(&grid);
        let k = 2.0 * PI / (nx as f64 * grid.delta());
        let mut s = LayerField::from_fn(&grid, |c, _| (k * grid.center(c).0).sin());
        let before = s.clone();
        let dst = SurfaceField::zeros(&grid);
        let (d, dt) = (1.0, 1e-3);
        assert!(dt < stable_timestep(grid.delta(), d));

        horizontal_diffusion(&grid, &h, &zb, &mut s, d, dt, &dst, 1e-10).unwrap();

        let delta = grid.delta();
        let factor = 1.0 - dt * d * (2.0 - 2.0 * (k * delta).cos()) / (delta * delta);
        for (v, v0) in s.as_slice().iter().zip(before.as_slice()) {
            assert_relative_eq!(*v, factor * v0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_flat_layers_conserve_content() {
        let grid = periodic(5, 4, 3);
        let h = LayerField::filled(&grid, 0.3);
        let zb = SurfaceField::filled(&grid, -0.9);
        let mut s = LayerField::from_fn(&grid, |c, l| ((c.get() * 7 + l.get() * 3) % 5) as f64);
        let total_before: f64 = s.as_slice().iter().sum();
        let dst = SurfaceField::zeros(&grid);

        horizontal_diffusion(&grid, &h, &zb, &mut s, 0.1, 1e-2, &dst, 1e-10).unwrap();
        let total_after: f64 = s.as_slice().iter().sum();
        assert_relative_eq!(total_before, total_after, max_relative = 1e-12);
    }

    #[test]
    fn test_dry_cells_untouched() {
        let grid = periodic(4, 4, 2);
        let mut h = LayerField::filled(&grid, 1.0);
        let dry_col = grid.column_index(2, 1);
        h.set(dry_col, 1, 0.0);
        let zb = SurfaceField::zeros(&grid);
        let mut s = LayerField::from_fn(&grid, |c, l| (c.get() + 3 * l.get()) as f64);
        let before = s.get(dry_col, 1);
        let dst = SurfaceField::zeros(&grid);

        horizontal_diffusion(&grid, &h, &zb, &mut s, 1.0, 1e-3, &dst, 1e-10).unwrap();
        assert_eq!(s.get(dry_col, 1), before);
        // The periodic wrap makes the ramp non-linear at the first column.
        assert_ne!(s.get(ColumnIndex::ZERO, 0), 0.0);
    }

    #[test]
    fn test_surface_gradient_enters_top_layer() {
        // Single layer with a thickness bump: only the top-layer surface
        // term can act on a constant field.
        let grid = periodic(5, 1, 1);
        let h = LayerField::from_fn(&grid, |c, _| if c.get() == 2 { 2.0 } else { 1.0 });
        let zb = SurfaceField::zeros(&grid);
        let mut s = LayerField::filled(&grid, 1.0);
        let dst = SurfaceField::filled(&grid, 1.0);
        let (d, dt) = (1.0, 1e-4);

        horizontal_diffusion(&grid, &h, &zb, &mut s, d, dt, &dst, 1e-10).unwrap();

        // At the bump: dh = 0, d2h = -2, b = -(1·2)·(-2)/2 = 2 per direction
        // along x; y is degenerate (ny = 1) and contributes nothing.
        let bump = grid.column_index(2, 0);
        let delta2 = grid.delta() * grid.delta();
        assert_relative_eq!(s.get(bump, 0), 1.0 + dt * d * 2.0 / delta2 / 2.0, max_relative = 1e-12);
    }

    #[test]
    fn test_sloping_layers_interior_and_top() {
        // Three columns along x, periodic, so the centre column sees the
        // other two as its neighbours. ny = 1 makes every y term vanish.
        let grid = Grid2D::new(3, 1, 3, 1.0)
            .unwrap()
            .with_edges(EdgeRule::Periodic);
        let h_cols = [[1.0, 1.0, 1.0], [1.0, 1.5, 1.0], [2.0, 3.0, 3.0]];
        let s_cols = [[1.0, 2.0, 4.0], [0.0, 3.0, 5.0], [2.0, 1.0, 7.0]];
        let h = LayerField::from_fn(&grid, |c, l| h_cols[c.get()][l.get()]);
        let mut s = LayerField::from_fn(&grid, |c, l| s_cols[c.get()][l.get()]);
        let zb = SurfaceField::from_fn(&grid, |c| [0.0, 0.5, -0.5][c.get()]);
        let dst = SurfaceField::from_fn(&grid, |c| [0.5, 1.0, 2.0][c.get()]);
        let (d, dt) = (1.0, 0.01);

        horizontal_diffusion(&grid, &h, &zb, &mut s, d, dt, &dst, 1e-10).unwrap();
        let centre = grid.column_index(1, 0);

        // Interior layer 1: zl = (1, 1.5, 1.5) across (m, c, p).
        //   (1 - 2 - 7 + 4)·(3 - 1)/4          = -2
        //   (3 - 5)·(3 - 3 + 1)/2              = -1
        //   -(7 - 4 - 2 + 1)·(1.5 - 1)/4       = -0.25
        //   -(5 - 0)·(1.5 - 3 + 1)/2           = 1.25
        // slope = -2, flat = 2 - 6 + 1 = -3
        let interior = 3.0 + dt * d * (-3.0 + -2.0 / 1.5);
        assert_relative_eq!(s.get(centre, 1), interior, max_relative = 1e-12);

        // Top layer 2: zl = (2, 3, 4.5), dst = (0.5, 1, 2).
        //   (-2·3 + 0.5·1)·(3 - 1)/4                 = -2.75
        //   (-1·1)·(3 - 2 + 1)/2                     = -1
        //   -(7 + 2·3 - 4 - 0.5·1 - 1 + 2)·2.5/4     = -5.9375
        //   -(5 + 2·3 - 3)·(4.5 - 6 + 2)/2           = -2
        // slope = -11.6875, flat = 4 - 10 + 7 = 1
        let top = 5.0 + dt * d * (1.0 + -11.6875 / 1.0);
        assert_relative_eq!(s.get(centre, 2), top, max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_negative_dry() {
        let grid = periodic(2, 2, 1);
        let h = LayerField::filled(&grid, 1.0);
        let zb = SurfaceField::zeros(&grid);
        let mut s = LayerField::zeros(&grid);
        let dst = SurfaceField::zeros(&grid);
        assert!(matches!(
            horizontal_diffusion(&grid, &h, &zb, &mut s, 1.0, 0.1, &dst, -1.0),
            Err(LayeredError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_stable_timestep() {
        assert_relative_eq!(stable_timestep(0.1, 1.0), 0.0025);
        assert!(stable_timestep(0.1, 0.0).is_infinite());
    }
}
