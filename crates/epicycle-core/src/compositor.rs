//! # Scene Compositor
//!
//! Turns the arrow chain at a given time into a backend-free draw list.
//!
//! ## Responsibilities
//! - **Chain Snapshot**: each arrow starts where the previous one ends; the
//!   first starts at the world origin.
//! - **Trail**: a FIFO of fading markers left at the chain tip while playing.
//! - **Camera**: shifts the scene by `-tip * lock_factor` and maps it into
//!   pixels through [`Viewport`].
//!
//! Draw order is trail, origin dot, then arrows in index order, so the
//! mechanism always sits on top of its own trace.

use crate::fourier::{frequency_for_index, reconstruct, Arrow};
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};
use std::collections::VecDeque;

const ORIGIN_DOT_RADIUS: f64 = 3.0;
const ARROW_HEAD_MAX: f64 = 10.0;
const ARROW_HEAD_RATIO: f64 = 0.25;
const ARROW_HEAD_SPREAD: f64 = 0.45;

/// One arrow of the chain, in normalized space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowSnapshot {
    pub origin: Point,
    pub head: Point,
    pub length: f64,
    pub radians: f64,
    pub frequency: i64,
}

/// A trail point left at the chain tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub offset: Point,
    pub alpha: f64,
}

/// Everything the compositor needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameParams<'a> {
    pub time: f64,
    pub arrows: &'a [Arrow],
    pub playing: bool,
    pub lock_factor: f64,
    pub zoom_factor: f64,
    pub fading_scale: f64,
    pub period_speed: f64,
}

/// Drawing primitives in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    TrailSegment {
        from: Point,
        to: Point,
        alpha: f64,
    },
    OriginDot {
        center: Point,
        radius: f64,
    },
    Arrow {
        /// Circle swept by the arrow head.
        guide_radius: f64,
        origin: Point,
        head: Point,
        left_wing: Point,
        right_wing: Point,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub tip: Point,
    pub commands: Vec<DrawCommand>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneCompositor {
    markers: VecDeque<Marker>,
}

/// Arrow chain at `time`.
pub fn snapshot(arrows: &[Arrow], time: f64) -> Vec<ArrowSnapshot> {
    let mut origin = Point::ORIGIN;
    arrows
        .iter()
        .enumerate()
        .map(|(index, arrow)| {
            let frequency = frequency_for_index(index);
            let radians = arrow.radians(frequency, time);
            let head = origin + Vec2::from_angle(radians) * arrow.length;
            let snap = ArrowSnapshot {
                origin,
                head,
                length: arrow.length,
                radians,
                frequency,
            };
            origin = head;
            snap
        })
        .collect()
}

impl SceneCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Drops the trail. Used on any time discontinuity.
    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    /// Decays every marker by `decay` alpha, drains the dead ones from the
    /// head, then records `tip` at full alpha.
    fn advance_trail(&mut self, tip: Point, decay: f64) {
        for marker in self.markers.iter_mut() {
            marker.alpha -= decay;
        }
        while self.markers.front().is_some_and(|m| m.alpha <= 0.0) {
            self.markers.pop_front();
        }
        self.markers.push_back(Marker {
            offset: tip,
            alpha: 1.0,
        });
    }

    /// Composes one animation frame. Each call while playing with at least
    /// two arrows is one trail step.
    pub fn compose(&mut self, params: FrameParams<'_>, viewport: &Viewport) -> Frame {
        let tip = reconstruct(params.arrows, params.time);

        if params.playing && params.arrows.len() >= 2 {
            self.advance_trail(tip, params.fading_scale * params.period_speed);
        }

        let camera = Point::ORIGIN + tip.to_vec2() * params.lock_factor;
        let affine = viewport.transform(params.zoom_factor, camera);
        let scale = viewport.scale(params.zoom_factor);

        let mut commands = Vec::with_capacity(self.markers.len() + params.arrows.len() + 1);

        let mut markers = self.markers.iter();
        if let Some(first) = markers.next() {
            let mut previous = first;
            for marker in markers {
                commands.push(DrawCommand::TrailSegment {
                    from: affine * previous.offset,
                    to: affine * marker.offset,
                    alpha: previous.alpha.clamp(0.0, 1.0),
                });
                previous = marker;
            }
        }

        commands.push(DrawCommand::OriginDot {
            center: affine * Point::ORIGIN,
            radius: ORIGIN_DOT_RADIUS,
        });

        for arrow in snapshot(params.arrows, params.time) {
            let origin = affine * arrow.origin;
            let head = affine * arrow.head;
            let shaft = head - origin;
            let shaft_length = shaft.hypot();
            let (left_wing, right_wing) = if shaft_length > 0.0 {
                let back = -shaft / shaft_length * (shaft_length * ARROW_HEAD_RATIO).min(ARROW_HEAD_MAX);
                let angle = back.atan2();
                let size = back.hypot();
                (
                    head + Vec2::from_angle(angle + ARROW_HEAD_SPREAD) * size,
                    head + Vec2::from_angle(angle - ARROW_HEAD_SPREAD) * size,
                )
            } else {
                (head, head)
            };
            commands.push(DrawCommand::Arrow {
                guide_radius: arrow.length * scale,
                origin,
                head,
                left_wing,
                right_wing,
            });
        }

        Frame {
            width: viewport.width,
            height: viewport.height,
            tip: affine * tip,
            commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn arrows() -> Vec<Arrow> {
        vec![
            Arrow {
                length: 0.5,
                phase: 0.0,
            },
            Arrow {
                length: 0.25,
                phase: FRAC_PI_2,
            },
        ]
    }

    fn params(arrows: &[Arrow], playing: bool) -> FrameParams<'_> {
        FrameParams {
            time: 0.0,
            arrows,
            playing,
            lock_factor: 0.0,
            zoom_factor: 1.0,
            fading_scale: 0.5,
            period_speed: 1.0,
        }
    }

    #[test]
    fn chain_heads_accumulate() {
        let chain = snapshot(&arrows(), 0.0);
        assert_eq!(chain[0].origin, Point::ORIGIN);
        assert!(chain[0].head.distance(Point::new(0.5, 0.0)) < 1e-12);
        assert_eq!(chain[1].origin, chain[0].head);
        assert!(chain[1].head.distance(Point::new(0.5, 0.25)) < 1e-12);
        assert_eq!(chain[1].frequency, -1);
    }

    #[test]
    fn draw_order_is_trail_origin_arrows() {
        let arrows = arrows();
        let viewport = Viewport::new(200.0, 200.0, 1.0);
        let mut compositor = SceneCompositor::new();
        compositor.compose(params(&arrows, true), &viewport);
        let frame = compositor.compose(params(&arrows, true), &viewport);

        let kinds: Vec<&str> = frame
            .commands
            .iter()
            .map(|c| match c {
                DrawCommand::TrailSegment { .. } => "trail",
                DrawCommand::OriginDot { .. } => "origin",
                DrawCommand::Arrow { .. } => "arrow",
            })
            .collect();
        assert_eq!(kinds, vec!["trail", "origin", "arrow", "arrow"]);
        assert!(frame.tip.distance(Point::new(150.0, 75.0)) < 1e-9);
    }

    #[test]
    fn markers_fade_and_drain_oldest_first() {
        let arrows = arrows();
        let viewport = Viewport::new(100.0, 100.0, 1.0);
        let mut compositor = SceneCompositor::new();
        // 0.5 alpha per frame: a marker survives one frame after its own.
        for _ in 0..5 {
            compositor.compose(params(&arrows, true), &viewport);
        }
        let alphas: Vec<f64> = compositor.markers().map(|m| m.alpha).collect();
        assert_eq!(alphas, vec![0.5, 1.0]);
    }

    #[test]
    fn each_frame_decays_by_fading_scale_times_speed() {
        let arrows = arrows();
        let viewport = Viewport::new(100.0, 100.0, 1.0);
        let mut compositor = SceneCompositor::new();
        let mut frame = params(&arrows, true);
        frame.fading_scale = 0.3;
        for _ in 0..3 {
            compositor.compose(frame, &viewport);
        }
        let alphas: Vec<f64> = compositor.markers().map(|m| m.alpha).collect();
        assert_eq!(alphas.len(), 3);
        assert!((alphas[0] - 0.4).abs() < 1e-9);
        assert!((alphas[1] - 0.7).abs() < 1e-9);
        assert_eq!(alphas[2], 1.0);

        // Double speed doubles the per-frame decay.
        frame.period_speed = 2.0;
        compositor.compose(frame, &viewport);
        let alphas: Vec<f64> = compositor.markers().map(|m| m.alpha).collect();
        assert_eq!(alphas.len(), 3);
        assert!((alphas[0] - 0.1).abs() < 1e-9);
        assert!((alphas[1] - 0.4).abs() < 1e-9);
    }

    #[test]
    fn paused_or_single_arrow_scenes_leave_no_trail() {
        let arrows = arrows();
        let viewport = Viewport::new(100.0, 100.0, 1.0);
        let mut compositor = SceneCompositor::new();
        compositor.compose(params(&arrows, false), &viewport);
        compositor.compose(params(&arrows[..1], true), &viewport);
        assert_eq!(compositor.marker_count(), 0);
    }

    #[test]
    fn lock_centers_the_tip() {
        let arrows = arrows();
        let viewport = Viewport::new(200.0, 200.0, 1.0);
        let mut compositor = SceneCompositor::new();
        let mut locked = params(&arrows, false);
        locked.lock_factor = 1.0;
        let frame = compositor.compose(locked, &viewport);
        assert!(frame.tip.distance(Point::new(100.0, 100.0)) < 1e-9);
    }
}
