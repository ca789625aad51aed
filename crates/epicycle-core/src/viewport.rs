use kurbo::{Affine, Point};

/// Pixel surface the scene is drawn into.
///
/// Normalized coordinates are mapped with a fixed aspect ratio: the shorter
/// pixel side spans `2 * half_extent / zoom` normalized units, the origin sits
/// at the center and y points up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub half_extent: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, half_extent: f64) -> Self {
        Self {
            width,
            height,
            half_extent,
        }
    }

    /// Pixels per normalized unit at `zoom`.
    pub fn scale(&self, zoom: f64) -> f64 {
        let visible = self.half_extent / zoom.max(1.0);
        if visible <= 0.0 {
            return 0.0;
        }
        self.width.min(self.height) / 2.0 / visible
    }

    /// Normalized space to pixels, with `camera` placed at the center.
    pub fn transform(&self, zoom: f64, camera: Point) -> Affine {
        let scale = self.scale(zoom);
        Affine::new([scale, 0.0, 0.0, -scale, self.width / 2.0, self.height / 2.0])
            * Affine::translate(-camera.to_vec2())
    }
}
