//! Curve fitting through the trajectory anchors.

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A function `y = f(x)` fitted through a set of points.
pub trait Interpolant {
    /// Value of the function at `x`.
    fn eval(&self, x: f64) -> f64;

    /// First derivative of the function at `x`.
    fn slope(&self, x: f64) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A natural cubic spline, i.e. with zero curvature at both ends.
///
/// Outside the knots the spline is extended linearly along its end slopes.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,

    /// Second derivative at each knot
    m: Vec<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SplineError {
    #[error("Expected the same number of x and y values, found {0} and {1}")]
    LengthMismatch(usize, usize),

    #[error("At least 2 points are needed to fit a spline, found {0}")]
    TooFewPoints(usize),

    #[error("Point {0} is not finite")]
    NonFinitePoint(usize),

    #[error("Point {0} does not have a greater x than the one before it")]
    NonIncreasingX(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CubicSpline {
    /// Fit a spline through the given points, `x` must be strictly increasing.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self, SplineError> {
        if x.len() != y.len() {
            return Err(SplineError::LengthMismatch(x.len(), y.len()));
        }

        let n = x.len();
        if n < 2 {
            return Err(SplineError::TooFewPoints(n));
        }

        for i in 0..n {
            if !(x[i].is_finite() && y[i].is_finite()) {
                return Err(SplineError::NonFinitePoint(i));
            }
            if i > 0 && !(x[i] > x[i - 1]) {
                return Err(SplineError::NonIncreasingX(i));
            }
        }

        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        // Tridiagonal system for the interior second derivatives, solved with the Thomas
        // algorithm. The end second derivatives are zero.
        let mut m = vec![0.0; n];
        if n > 2 {
            let k = n - 2;
            let mut diag = vec![0.0; k];
            let mut upper = vec![0.0; k];
            let mut rhs = vec![0.0; k];

            for j in 0..k {
                let i = j + 1;
                diag[j] = 2.0 * (h[i - 1] + h[i]);
                upper[j] = h[i];
                rhs[j] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
            }

            // Forward sweep, the sub diagonal entry of row j is h[j]
            for j in 1..k {
                let w = h[j] / diag[j - 1];
                diag[j] -= w * upper[j - 1];
                rhs[j] -= w * rhs[j - 1];
            }

            // Back substitution
            m[k] = rhs[k - 1] / diag[k - 1];
            for j in (0..k - 1).rev() {
                m[j + 1] = (rhs[j] - upper[j] * m[j + 2]) / diag[j];
            }
        }

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    /// Index of the segment containing `x`, clamped to the first and last segments.
    fn segment(&self, x: f64) -> usize {
        let idx = self.x.partition_point(|&k| k <= x);
        idx.saturating_sub(1).min(self.x.len() - 2)
    }

    /// Slope at the start of segment `i`, and the segment's width.
    fn seg_coeffs(&self, i: usize) -> (f64, f64) {
        let h = self.x[i + 1] - self.x[i];
        let b = (self.y[i + 1] - self.y[i]) / h - h * (2.0 * self.m[i] + self.m[i + 1]) / 6.0;
        (b, h)
    }
}

impl Interpolant for CubicSpline {
    fn eval(&self, x: f64) -> f64 {
        let last = self.x.len() - 1;

        if x < self.x[0] {
            return self.y[0] + self.slope(self.x[0]) * (x - self.x[0]);
        }
        if x > self.x[last] {
            return self.y[last] + self.slope(self.x[last]) * (x - self.x[last]);
        }

        let i = self.segment(x);
        let (b, h) = self.seg_coeffs(i);
        let t = x - self.x[i];

        self.y[i]
            + b * t
            + 0.5 * self.m[i] * t * t
            + (self.m[i + 1] - self.m[i]) / (6.0 * h) * t * t * t
    }

    fn slope(&self, x: f64) -> f64 {
        let x = x.max(self.x[0]).min(self.x[self.x.len() - 1]);

        let i = self.segment(x);
        let (b, h) = self.seg_coeffs(i);
        let t = x - self.x[i];

        b + self.m[i] * t + 0.5 * (self.m[i + 1] - self.m[i]) / h * t * t
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
