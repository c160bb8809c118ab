use ndarray::Array1;

use crate::error::{Result, SimError};

// Knots closer than this are treated as the same knot.
const KNOT_TOLERANCE: f32 = 1e-6;

/**
Piecewise cubic Hermite interpolant with monotonicity preserving slopes (PCHIP).

The slopes at interior knots are the weighted harmonic mean of the neighbouring secants,
or zero where the data has a local extremum, so the interpolant never overshoots the
control points. End slopes use the one-sided three point estimate, limited the same way.
For the details see [1] and the reference implementation in [2].

Outside the knot range the end polynomials are extended.

[1] F. N. Fritsch and R. E. Carlson, "Monotone Piecewise Cubic Interpolation",
    SIAM J. Numer. Anal., 17(2), 238-246, 1980.
[2] https://github.com/scipy/scipy/blob/v1.7.1/scipy/interpolate/_cubic.py#L157-L296
*/
#[derive(Clone, Debug)]
pub struct Pchip {
    x: Vec<f32>,
    y: Vec<f32>,
    // Slope at each knot
    d: Vec<f32>,
}

impl Pchip {
    pub fn new(x: Vec<f32>, y: Vec<f32>) -> Result<Pchip> {
        if x.len() != y.len() {
            return Err(SimError::ArityMismatch {
                what: "interpolant ordinates",
                expected: x.len(),
                actual: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(SimError::ArityMismatch {
                what: "interpolant knots",
                expected: 2,
                actual: x.len(),
            });
        }
        if let Some(w) = x.windows(2).find(|w| !(w[1] > w[0])) {
            return Err(SimError::invalid(
                "interpolant knot",
                w[1],
                "knots must be strictly increasing",
            ));
        }

        let d = slopes(&x, &y);
        Ok(Pchip { x, y, d })
    }

    pub fn knots(&self) -> &[f32] {
        &self.x
    }

    // Index of the polynomial piece used for t. Values outside the knots use the end pieces.
    fn piece(&self, t: f32) -> usize {
        let n = self.x.len();
        self.x.partition_point(|&x| x <= t).saturating_sub(1).min(n - 2)
    }

    pub fn eval(&self, t: f32) -> f32 {
        let k = self.piece(t);
        let h = self.x[k + 1] - self.x[k];
        let s = (t - self.x[k]) / h;
        let (s2, s3) = (s * s, s * s * s);

        let h00 = 2. * s3 - 3. * s2 + 1.;
        let h10 = s3 - 2. * s2 + s;
        let h01 = -2. * s3 + 3. * s2;
        let h11 = s3 - s2;

        h00 * self.y[k] + h10 * h * self.d[k] + h01 * self.y[k + 1] + h11 * h * self.d[k + 1]
    }

    pub fn derivative(&self, t: f32) -> f32 {
        let k = self.piece(t);
        let h = self.x[k + 1] - self.x[k];
        let s = (t - self.x[k]) / h;
        let s2 = s * s;

        let dh00 = 6. * s2 - 6. * s;
        let dh10 = 3. * s2 - 4. * s + 1.;
        let dh01 = -6. * s2 + 6. * s;
        let dh11 = 3. * s2 - 2. * s;

        (dh00 * self.y[k] + dh01 * self.y[k + 1]) / h + dh10 * self.d[k] + dh11 * self.d[k + 1]
    }
}

fn slopes(x: &[f32], y: &[f32]) -> Vec<f32> {
    let n = x.len();
    let h: Vec<f32> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let δ: Vec<f32> = y
        .windows(2)
        .zip(h.iter())
        .map(|(w, h)| (w[1] - w[0]) / h)
        .collect();

    if n == 2 {
        return vec![δ[0], δ[0]];
    }

    let mut d = vec![0.; n];
    for k in 1..n - 1 {
        if δ[k - 1] * δ[k] > 0. {
            let w1 = 2. * h[k] + h[k - 1];
            let w2 = h[k] + 2. * h[k - 1];
            d[k] = (w1 + w2) / (w1 / δ[k - 1] + w2 / δ[k]);
        }
    }
    d[0] = edge_slope(h[0], h[1], δ[0], δ[1]);
    d[n - 1] = edge_slope(h[n - 2], h[n - 3], δ[n - 2], δ[n - 3]);

    d
}

// One sided three point estimate, kept shape preserving.
fn edge_slope(h0: f32, h1: f32, δ0: f32, δ1: f32) -> f32 {
    let d = ((2. * h0 + h1) * δ0 - h0 * δ1) / (h0 + h1);
    if signum(d) != signum(δ0) {
        0.
    } else if signum(δ0) != signum(δ1) && d.abs() > 3. * δ0.abs() {
        3. * δ0
    } else {
        d
    }
}

// Unlike f32::signum this maps zero to zero.
fn signum(x: f32) -> i8 {
    if x > 0. {
        1
    } else if x < 0. {
        -1
    } else {
        0
    }
}

/**
A curve over one period built from control points given for a single period.

The points are copied into the previous and the next period before the interpolant is
fitted, so the curve and its slope join up at the period boundary instead of being
clamped by the end conditions. Knots that coincide after the shift are merged, keeping
the first.
*/
#[derive(Clone, Debug)]
pub struct PeriodicCurve {
    interp: Pchip,
    period: f32,
}

impl PeriodicCurve {
    pub fn new(points: &[(f32, f32)]) -> Result<PeriodicCurve> {
        Self::with_period(points, 1.)
    }

    pub fn with_period(points: &[(f32, f32)], period: f32) -> Result<PeriodicCurve> {
        let mut tiled: Vec<(f32, f32)> = [-1., 0., 1.]
            .iter()
            .flat_map(|shift| points.iter().map(move |&(x, y)| (x + shift * period, y)))
            .collect();
        tiled.sort_by(|a, b| a.0.total_cmp(&b.0));
        tiled.dedup_by(|next, kept| (next.0 - kept.0).abs() < KNOT_TOLERANCE);

        let (x, y) = tiled.into_iter().unzip();

        Ok(PeriodicCurve {
            interp: Pchip::new(x, y)?,
            period,
        })
    }

    // Valid for phases in [-period, 2 period).
    pub fn eval(&self, phase: f32) -> f32 {
        self.interp.eval(phase)
    }

    pub fn derivative(&self, phase: f32) -> f32 {
        self.interp.derivative(phase)
    }

    // Samples the central period at `n` evenly spaced phases, starting at 0 and excluding the period end.
    pub fn sample(&self, n: usize) -> Array1<f32> {
        (0..n)
            .map(|i| self.eval(self.period * i as f32 / n as f32))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use crate::error::SimError;

    use super::{PeriodicCurve, Pchip};

    #[test]
    fn passes_through_knots() {
        let x = vec![0., 0.5, 1.2, 2., 3.];
        let y = vec![1., 4., -2., 0., 0.5];
        let p = Pchip::new(x.clone(), y.clone()).unwrap();

        for (x, y) in x.into_iter().zip(y) {
            assert_relative_eq!(p.eval(x), y, epsilon = 1e-5);
        }
    }

    #[test]
    fn linear_data_is_reproduced() {
        let p = Pchip::new(vec![0., 1., 3., 4.], vec![1., 3., 7., 9.]).unwrap();

        for t in [0.25f32, 1.5, 2.9, 3.7] {
            assert_relative_eq!(p.eval(t), 1. + 2. * t, epsilon = 1e-5);
            assert_relative_eq!(p.derivative(t), 2., epsilon = 1e-4);
        }
    }

    #[test]
    fn does_not_overshoot() {
        // Step like data, a natural spline would ring here.
        let p = Pchip::new(vec![0., 1., 2., 3., 4.], vec![0., 0., 1., 1., 1.]).unwrap();

        let mut last = p.eval(0.);
        for i in 1..=400 {
            let v = p.eval(i as f32 / 100.);
            assert!(v >= -1e-6 && v <= 1. + 1e-6);
            assert!(v >= last - 1e-6);
            last = v;
        }
    }

    #[test]
    fn extrema_have_flat_slope() {
        let p = Pchip::new(vec![0., 1., 2.], vec![0., 5., 0.]).unwrap();
        assert_relative_eq!(p.derivative(1.), 0.);
    }

    #[test]
    fn rejects_bad_knots() {
        assert!(matches!(
            Pchip::new(vec![0., 1., 1.], vec![0., 1., 2.]),
            Err(SimError::InvalidParameter { .. })
        ));
        assert!(matches!(
            Pchip::new(vec![0., 1.], vec![0.]),
            Err(SimError::ArityMismatch { expected: 2, actual: 1, .. })
        ));
        assert!(matches!(
            Pchip::new(vec![0.], vec![0.]),
            Err(SimError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn periodic_curve_joins_up() {
        let curve = PeriodicCurve::new(&[(0.17, 3.), (0.4, 3.), (0.75, 70.), (1., 3.)]).unwrap();

        assert_relative_eq!(curve.eval(0.), curve.eval(1.), epsilon = 1e-4);
        assert_relative_eq!(curve.derivative(0.), curve.derivative(1.), epsilon = 1e-2);
        assert_relative_eq!(curve.eval(0.75), 70., epsilon = 1e-4);
    }

    #[test]
    fn coincident_knots_are_merged() {
        // x1 + 1 == x3, the shifted copies land on each other.
        let curve = PeriodicCurve::new(&[(-0.1, 25.), (0.5, -15.), (0.9, 25.)]).unwrap();

        assert_eq!(curve.interp.knots().len(), 7);
        assert_relative_eq!(curve.eval(0.9), 25., epsilon = 1e-4);
        assert_relative_eq!(curve.eval(0.5), -15., epsilon = 1e-4);
    }

    #[test]
    fn samples_exclude_period_end() {
        let curve = PeriodicCurve::new(&[(0.1, 1.), (0.6, 2.)]).unwrap();
        let samples = curve.sample(8);

        assert_eq!(samples.len(), 8);
        assert_relative_eq!(samples[0], curve.eval(0.));
        assert_relative_eq!(samples[4], curve.eval(0.5));
    }
}
