//! Tridiagonal systems and the Thomas algorithm.
//!
//! A system `M·x = rhs` is stored by diagonals: `lower[l]` multiplies
//! `x[l-1]`, `diag[l]` multiplies `x[l]` and `upper[l]` multiplies `x[l+1]`.
//! `lower[0]` and `upper[n-1]` are never read.
//!
//! The solver performs forward elimination in place (the diagonal and the
//! right-hand side are overwritten) followed by back-substitution. There is
//! no pivoting and no guard against a vanishing pivot: the systems built by
//! the vertical diffusion operator are diagonally dominant as long as layer
//! thicknesses are positive.

use faer::Mat;

/// Coefficient storage for a tridiagonal system of size `n`.
///
/// The buffers can be reused across columns by calling [`resize`](Self::resize)
/// so that hot loops avoid per-column allocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TridiagonalSystem {
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
    rhs: Vec<f64>,
}

impl TridiagonalSystem {
    /// Zero system of size `n`.
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
            rhs: vec![0.0; n],
        }
    }

    /// Build a system from its diagonals.
    ///
    /// # Panics
    ///
    /// Panics if the four slices differ in length.
    pub fn from_diagonals(lower: &[f64], diag: &[f64], upper: &[f64], rhs: &[f64]) -> Self {
        let n = diag.len();
        assert!(
            lower.len() == n && upper.len() == n && rhs.len() == n,
            "diagonals must have equal lengths"
        );
        Self {
            lower: lower.to_vec(),
            diag: diag.to_vec(),
            upper: upper.to_vec(),
            rhs: rhs.to_vec(),
        }
    }

    /// Resize to `n` unknowns and zero every coefficient.
    pub fn resize(&mut self, n: usize) {
        for v in [
            &mut self.lower,
            &mut self.diag,
            &mut self.upper,
            &mut self.rhs,
        ] {
            v.clear();
            v.resize(n, 0.0);
        }
    }

    /// Number of unknowns.
    #[inline]
    pub fn len(&self) -> usize {
        self.diag.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    #[inline]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    #[inline]
    pub fn diag(&self) -> &[f64] {
        &self.diag
    }

    #[inline]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    #[inline]
    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// Mutable access to `(lower, diag, upper, rhs)` for assembly.
    #[inline]
    pub fn parts_mut(&mut self) -> (&mut [f64], &mut [f64], &mut [f64], &mut [f64]) {
        (
            &mut self.lower,
            &mut self.diag,
            &mut self.upper,
            &mut self.rhs,
        )
    }

    /// Solve the system with the Thomas algorithm, writing the solution to `x`.
    ///
    /// Forward elimination overwrites the diagonal and right-hand side, so the
    /// system is left in eliminated form.
    ///
    /// # Panics
    ///
    /// Panics if `x.len()` differs from the system size.
    pub fn solve_into(&mut self, x: &mut [f64]) {
        let n = self.len();
        assert_eq!(x.len(), n, "solution buffer has wrong length");
        if n == 0 {
            return;
        }

        let (a, b, c, rhs) = (&self.lower, &mut self.diag, &self.upper, &mut self.rhs);

        for l in 1..n {
            b[l] -= a[l] * c[l - 1] / b[l - 1];
            rhs[l] -= a[l] * rhs[l - 1] / b[l - 1];
        }

        x[n - 1] = rhs[n - 1] / b[n - 1];
        for l in (0..n - 1).rev() {
            x[l] = (rhs[l] - c[l] * x[l + 1]) / b[l];
        }
    }

    /// Solve and return the solution (allocating version).
    pub fn solve(mut self) -> Vec<f64> {
        let mut x = vec![0.0; self.len()];
        self.solve_into(&mut x);
        x
    }

    /// Apply the matrix to `x`, writing `M·x` into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `out` differ in length from the system size.
    pub fn apply_into(&self, x: &[f64], out: &mut [f64]) {
        let n = self.len();
        assert_eq!(x.len(), n, "input vector has wrong length");
        assert_eq!(out.len(), n, "output buffer has wrong length");
        for l in 0..n {
            let mut v = self.diag[l] * x[l];
            if l > 0 {
                v += self.lower[l] * x[l - 1];
            }
            if l + 1 < n {
                v += self.upper[l] * x[l + 1];
            }
            out[l] = v;
        }
    }

    /// Largest absolute entry of `M·x - rhs`.
    ///
    /// Only meaningful before [`solve_into`](Self::solve_into) has eliminated
    /// the system; clone first if both are needed.
    pub fn residual(&self, x: &[f64]) -> f64 {
        let mut mx = vec![0.0; self.len()];
        self.apply_into(x, &mut mx);
        mx.iter()
            .zip(&self.rhs)
            .fold(0.0_f64, |m, (v, r)| m.max((v - r).abs()))
    }

    /// Dense copy of the matrix.
    pub fn to_dense(&self) -> Mat<f64> {
        let n = self.len();
        let mut m = Mat::zeros(n, n);
        for l in 0..n {
            m[(l, l)] = self.diag[l];
            if l > 0 {
                m[(l, l - 1)] = self.lower[l];
            }
            if l + 1 < n {
                m[(l, l + 1)] = self.upper[l];
            }
        }
        m
    }
}
