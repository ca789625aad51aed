//! Arc-length sampling of closed paths.

use kurbo::{BezPath, Line, ParamCurve, ParamCurveArclen, PathEl, PathSeg, Point};

/// Produces evenly spaced points along a path, measured by arc length.
///
/// The path is always traversed as a closed loop: when the last segment does
/// not end where the first one starts, a closing line is measured and sampled
/// too. Jumps between subpaths (`MoveTo` in the middle) are not part of the
/// traversal.
#[derive(Debug, Clone)]
pub struct PathSampler {
    segments: Vec<PathSeg>,
    /// Arc length at the start of each segment.
    offsets: Vec<f64>,
    lengths: Vec<f64>,
    total_length: f64,
    start: Option<Point>,
    accuracy: f64,
}

impl PathSampler {
    pub fn new(path: &BezPath, accuracy: f64) -> Self {
        let mut segments: Vec<PathSeg> = path.segments().collect();
        if let (Some(first), Some(last)) = (segments.first(), segments.last()) {
            let (start, end) = (first.start(), last.end());
            if start.distance(end) > 1e-12 {
                segments.push(PathSeg::Line(Line::new(end, start)));
            }
        }

        let mut offsets = Vec::with_capacity(segments.len());
        let mut lengths = Vec::with_capacity(segments.len());
        let mut total_length = 0.0;
        for seg in &segments {
            let length = seg.arclen(accuracy);
            offsets.push(total_length);
            lengths.push(length);
            total_length += length;
        }

        let start = segments.first().map(|seg| seg.start()).or_else(|| {
            path.elements().iter().find_map(|el| match el {
                PathEl::MoveTo(p) => Some(*p),
                _ => None,
            })
        });

        Self {
            segments,
            offsets,
            lengths,
            total_length,
            start,
            accuracy,
        }
    }

    /// Length of the closed loop.
    pub fn length(&self) -> f64 {
        self.total_length
    }

    /// Number of points `sample` yields at `rate` points per unit length.
    pub fn sample_count(&self, rate: f64) -> usize {
        if self.total_length <= 0.0 {
            return usize::from(self.start.is_some());
        }
        ((self.total_length * rate).round() as usize).max(2)
    }

    /// Point at arc-length fraction `fraction` of the loop.
    pub fn point_at(&self, fraction: f64) -> Option<Point> {
        if self.segments.is_empty() || self.total_length <= 0.0 {
            return self.start;
        }
        let distance = fraction.clamp(0.0, 1.0) * self.total_length;
        let index = self
            .offsets
            .partition_point(|&offset| offset <= distance)
            .saturating_sub(1)
            .min(self.segments.len() - 1);

        let seg = &self.segments[index];
        let length = self.lengths[index];
        let local = (distance - self.offsets[index]).clamp(0.0, length);
        let t = if length > 0.0 {
            seg.inv_arclen(local, self.accuracy)
        } else {
            0.0
        };
        Some(seg.eval(t))
    }

    /// `max(2, round(length * rate))` points at fractions evenly spread over
    /// `[0, 1]`. A zero-length path yields at most its start point.
    pub fn sample(&self, rate: f64) -> Vec<Point> {
        let count = self.sample_count(rate);
        if count < 2 {
            return self.start.into_iter().take(count).collect();
        }
        let last = (count - 1) as f64;
        (0..count)
            .filter_map(|i| self.point_at(i as f64 / last))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64, closed: bool) -> BezPath {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((side, 0.0));
        path.line_to((side, side));
        path.line_to((0.0, side));
        if closed {
            path.close_path();
        }
        path
    }

    #[test]
    fn open_path_is_measured_as_closed() {
        let open = PathSampler::new(&square(1.0, false), 1e-9);
        let closed = PathSampler::new(&square(1.0, true), 1e-9);
        assert!((open.length() - 4.0).abs() < 1e-9);
        assert!((closed.length() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn sample_count_follows_rate() {
        let sampler = PathSampler::new(&square(0.2, true), 1e-9);
        // perimeter 0.8 at 125 per unit
        assert_eq!(sampler.sample(125.0).len(), 100);
        assert_eq!(sampler.sample(0.1).len(), 2);
    }

    #[test]
    fn samples_are_evenly_spaced_and_loop_back() {
        let sampler = PathSampler::new(&square(1.0, true), 1e-9);
        let samples = sampler.sample(4.0 + 1e-9);
        // 4 units at rate 4 -> 16 points at fractions i/15
        assert_eq!(samples.len(), 16);
        let first = samples[0];
        let last = *samples.last().unwrap();
        assert!(first.distance(last) < 1e-9);

        let step = 4.0 / 15.0;
        let quarter = sampler.point_at(0.25).unwrap();
        assert!(quarter.distance(Point::new(1.0, 0.0)) < 1e-9);
        // Second sample lies one step along the bottom edge.
        assert!((samples[1].x - step).abs() < 1e-9);
        assert!(samples[1].y.abs() < 1e-9);
    }

    #[test]
    fn curves_are_sampled_by_arc_length() {
        let mut path = BezPath::new();
        path.move_to((1.0, 0.0));
        // Four cubic quarter arcs approximating a unit circle.
        let k = 0.552_284_749_8;
        path.curve_to((1.0, k), (k, 1.0), (0.0, 1.0));
        path.curve_to((-k, 1.0), (-1.0, k), (-1.0, 0.0));
        path.curve_to((-1.0, -k), (-k, -1.0), (0.0, -1.0));
        path.curve_to((k, -1.0), (1.0, -k), (1.0, 0.0));
        path.close_path();

        let sampler = PathSampler::new(&path, 1e-9);
        assert!((sampler.length() - std::f64::consts::TAU).abs() < 1e-2);
        for point in sampler.sample(20.0) {
            assert!((point.to_vec2().hypot() - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn degenerate_paths_yield_fewer_than_two_samples() {
        let mut dot = BezPath::new();
        dot.move_to((3.0, 4.0));
        let sampler = PathSampler::new(&dot, 1e-9);
        assert_eq!(sampler.sample(125.0), vec![Point::new(3.0, 4.0)]);

        let empty = PathSampler::new(&BezPath::new(), 1e-9);
        assert!(empty.sample(125.0).is_empty());
    }
}
