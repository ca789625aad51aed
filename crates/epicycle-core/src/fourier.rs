//! # Fourier Coefficients
//!
//! Discrete Fourier coefficients of a sampled closed path, one signed
//! frequency at a time.
//!
//! Samples are treated as a complex signal `z(t) = u(t) + i v(t)` on
//! `t in [0, 1)`. For frequency `n` the coefficient is
//! `c_n = sum z(t) e^(-2 pi i n t) dt`, so the path is rebuilt by
//! `z(t) = sum c_n e^(2 pi i n t)`.
//!
//! Arrows are ordered by frequency `0, -1, 1, -2, 2, ...`; see
//! [`frequency_for_index`].

use kurbo::{Point, Vec2};
use std::f64::consts::{PI, TAU};

/// Polar form of one coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Arrow {
    pub length: f64,
    /// Radians in `(-pi, pi]`.
    pub phase: f64,
}

impl Arrow {
    pub const ZERO: Arrow = Arrow {
        length: 0.0,
        phase: 0.0,
    };

    pub fn from_vec2(v: Vec2) -> Self {
        let mut phase = v.y.atan2(v.x);
        if phase <= -PI {
            phase += TAU;
        }
        Self {
            length: v.hypot(),
            phase,
        }
    }

    /// Vector of this arrow after `time` loops at `frequency`.
    pub fn at(&self, frequency: i64, time: f64) -> Vec2 {
        Vec2::from_angle(self.radians(frequency, time)) * self.length
    }

    pub fn radians(&self, frequency: i64, time: f64) -> f64 {
        self.phase + time * frequency as f64 * TAU
    }
}

/// Signed frequency of the arrow at `index`: `0, -1, 1, -2, 2, ...`.
pub fn frequency_for_index(index: usize) -> i64 {
    let half = index.div_ceil(2) as i64;
    if index % 2 == 0 {
        half
    } else {
        -half
    }
}

/// Coefficient of `samples` at `frequency`.
///
/// The last sample of a closed path repeats the first, so only the first
/// `N - 1` samples are integrated, at `t = i / (N - 1)`. Fewer than two
/// samples give a zero step and therefore a zero arrow.
pub fn coefficient(samples: &[Point], frequency: i64) -> Arrow {
    if samples.len() < 2 {
        return Arrow::ZERO;
    }
    let dt = 1.0 / (samples.len() - 1) as f64;
    let n = frequency.unsigned_abs() as f64;

    let (mut p, mut q, mut r, mut s) = (0.0, 0.0, 0.0, 0.0);
    for (i, sample) in samples[..samples.len() - 1].iter().enumerate() {
        let (sin, cos) = (TAU * n * i as f64 * dt).sin_cos();
        p += sample.x * cos * dt;
        q += sample.y * cos * dt;
        r += sample.x * sin * dt;
        s += sample.y * sin * dt;
    }

    let v = if frequency >= 0 {
        Vec2::new(p + s, q - r)
    } else {
        Vec2::new(p - s, q + r)
    };
    Arrow::from_vec2(v)
}

/// Tip of the arrow chain at `time`, i.e. the reconstructed point.
pub fn reconstruct(arrows: &[Arrow], time: f64) -> Point {
    arrows
        .iter()
        .enumerate()
        .fold(Point::ORIGIN, |tip, (index, arrow)| {
            tip + arrow.at(frequency_for_index(index), time)
        })
}

/// Mean squared distance between the samples and the chain's reconstruction.
pub fn reconstruction_error(samples: &[Point], arrows: &[Arrow]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let count = samples.len() - 1;
    let total: f64 = samples[..count]
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let t = i as f64 / count as f64;
            (reconstruct(arrows, t) - *sample).hypot2()
        })
        .sum();
    total / count as f64
}
