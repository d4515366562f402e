//! Easing curves for the deceleration phase. Every curve maps progress in
//! `[0, 1]` onto `[0, 1]` with `f(0) = 0` and `f(1) = 1`, and never decreases,
//! so a reel driven by one only moves forward.

/// CSS-style `cubic-bezier(x1, y1, x2, y2)` timing function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 40;
const SOLVE_EPSILON: f64 = 1e-7;

// Bernstein form with P0 = 0 and P3 = 1.
#[inline]
fn bezier(a1: f64, a2: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * t * a1 + 3.0 * u * t * t * a2 + t * t * t
}

#[inline]
fn bezier_slope(a1: f64, a2: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * a1 + 6.0 * u * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
}

impl CubicBezier {
    /// Fast start, long soft landing. Used for reel stops.
    pub const REEL_STOP: CubicBezier = CubicBezier {
        x1: 0.22,
        y1: 1.0,
        x2: 0.36,
        y2: 1.0,
    };

    /// All four control coordinates are clamped into `[0, 1]`. Clamped `x`
    /// keeps the curve a function of time; clamped `y` rules out overshoot
    /// and anticipation, so the curve never decreases.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.clamp(0.0, 1.0),
            y1: y1.clamp(0.0, 1.0),
            x2: x2.clamp(0.0, 1.0),
            y2: y2.clamp(0.0, 1.0),
        }
    }

    fn solve_t(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let err = bezier(self.x1, self.x2, t) - x;
            if err.abs() < SOLVE_EPSILON {
                return t;
            }
            let slope = bezier_slope(self.x1, self.x2, t);
            if slope.abs() < 1e-6 {
                break;
            }
            t = (t - err / slope).clamp(0.0, 1.0);
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        t = x;
        for _ in 0..BISECTION_ITERATIONS {
            let value = bezier(self.x1, self.x2, t);
            if (value - x).abs() < SOLVE_EPSILON {
                break;
            }
            if value < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) * 0.5;
        }
        t
    }

    pub fn ease(&self, progress: f64) -> f64 {
        let x = progress.clamp(0.0, 1.0);
        if x == 0.0 || x == 1.0 {
            return x;
        }
        bezier(self.y1, self.y2, self.solve_t(x))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Easing {
    Linear,
    /// `p * (2 - p)`.
    OutQuad,
    #[default]
    ReelStop,
    Bezier(CubicBezier),
}

impl Easing {
    pub fn apply(&self, progress: f64) -> f64 {
        let p = progress.clamp(0.0, 1.0);
        match self {
            Easing::Linear => p,
            Easing::OutQuad => p * (2.0 - p),
            Easing::ReelStop => CubicBezier::REEL_STOP.ease(p),
            Easing::Bezier(curve) => curve.ease(p),
        }
    }
}
