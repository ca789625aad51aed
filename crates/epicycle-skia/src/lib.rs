//! Skia backend for composed epicycle frames.

use epicycle_core::{DrawCommand, Frame};
use kurbo::Point;
use skia_safe::{Canvas, Color, EncodedImageFormat, Paint, PaintCap, PaintStyle};

/// Colors and stroke widths used when drawing a frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameStyle {
    pub background: Option<Color>,
    pub trail: Color,
    pub trail_width: f32,
    pub guide: Color,
    pub arrow: Color,
    pub arrow_width: f32,
    pub origin: Color,
}

impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            background: Some(Color::from_rgb(18, 18, 24)),
            trail: Color::from_rgb(255, 196, 0),
            trail_width: 2.5,
            guide: Color::from_argb(64, 200, 200, 220),
            arrow: Color::from_rgb(230, 230, 240),
            arrow_width: 1.5,
            origin: Color::from_rgb(230, 230, 240),
        }
    }
}

fn pt(p: Point) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

fn stroke(color: Color, width: f32) -> Paint {
    let mut paint = Paint::default();
    paint.set_anti_alias(true);
    paint.set_color(color);
    paint.set_style(PaintStyle::Stroke);
    paint.set_stroke_width(width);
    paint.set_stroke_cap(PaintCap::Round);
    paint
}

pub struct SkiaRenderer;

impl SkiaRenderer {
    /// Draws `frame` in command order onto `canvas`.
    pub fn draw(canvas: &Canvas, frame: &Frame, style: &FrameStyle) {
        if let Some(background) = style.background {
            canvas.clear(background);
        }

        let mut trail = stroke(style.trail, style.trail_width);
        let guide = stroke(style.guide, 1.0);
        let arrow = stroke(style.arrow, style.arrow_width);
        let mut origin = Paint::default();
        origin.set_anti_alias(true);
        origin.set_color(style.origin);

        for command in &frame.commands {
            match *command {
                DrawCommand::TrailSegment { from, to, alpha } => {
                    trail.set_alpha_f(alpha as f32);
                    canvas.draw_line(pt(from), pt(to), &trail);
                }
                DrawCommand::OriginDot { center, radius } => {
                    canvas.draw_circle(pt(center), radius as f32, &origin);
                }
                DrawCommand::Arrow {
                    guide_radius,
                    origin: start,
                    head,
                    left_wing,
                    right_wing,
                } => {
                    if guide_radius > 0.5 {
                        canvas.draw_circle(pt(start), guide_radius as f32, &guide);
                    }
                    canvas.draw_line(pt(start), pt(head), &arrow);
                    canvas.draw_line(pt(head), pt(left_wing), &arrow);
                    canvas.draw_line(pt(head), pt(right_wing), &arrow);
                }
            }
        }
    }

    /// Renders `frame` on a raster surface of its own size and encodes a PNG.
    pub fn render_png(frame: &Frame, style: &FrameStyle) -> Option<Vec<u8>> {
        let size = (frame.width.round() as i32, frame.height.round() as i32);
        let mut surface = skia_safe::surfaces::raster_n32_premul(size)?;
        Self::draw(surface.canvas(), frame, style);

        let image = surface.image_snapshot();
        let data = image.encode(None, EncodedImageFormat::PNG, 100)?;
        Some(data.as_bytes().to_vec())
    }
}
