//! Drawing primitives of the annotation overlay.
//!
//! Every primitive is immediate and silently does nothing while the overlay
//! has no drawing surface. Brushes and text layouts are created per call by
//! the surface, nothing is cached between primitives.

use crate::platform::{DrawSurface, RenderBackend, TextLayer, WindowSystem};
use crate::types::{colors, Color, PointF, RectF, SizeF};

use super::AnnotationOverlay;

/// Corner bracket length as a fraction of the side length
const CORNER_FRACTION: f32 = 4.0;

/// Halo passes for outlined text: eight 1px offsets in the inner outline
/// color, eight 2px offsets in the outer one, then the text itself.
pub fn outline_layers(origin: PointF, color: Color) -> Vec<TextLayer> {
    let mut layers = Vec::with_capacity(17);
    for (step, outline) in [(1.0, colors::TEXT_OUTLINE), (2.0, colors::TEXT_OUTLINE_FAR)] {
        for dx in [-step, 0.0, step] {
            for dy in [-step, 0.0, step] {
                if dx != 0.0 || dy != 0.0 {
                    layers.push(TextLayer {
                        origin: origin.offset(dx, dy),
                        color: outline,
                    });
                }
            }
        }
    }
    layers.push(TextLayer { origin, color });
    layers
}

/// Edges of a diamond inscribed in a circle of `radius`: top-right, right-bottom,
/// bottom-left, left-top.
pub fn diamond_segments(center: PointF, radius: f32) -> [(PointF, PointF); 4] {
    let top = center.offset(0.0, -radius);
    let right = center.offset(radius, 0.0);
    let bottom = center.offset(0.0, radius);
    let left = center.offset(-radius, 0.0);
    [(top, right), (right, bottom), (bottom, left), (left, top)]
}

/// Eight corner brackets, two per corner, each a quarter of its side long.
pub fn corner_box_segments(
    top_left: PointF,
    top_right: PointF,
    bottom_left: PointF,
    bottom_right: PointF,
) -> [(PointF, PointF); 8] {
    let top_near = top_left.x + (top_right.x - top_left.x) / CORNER_FRACTION;
    let top_far = top_right.x - (top_right.x - top_left.x) / CORNER_FRACTION;

    let right_near = top_right.y + (bottom_right.y - top_right.y) / CORNER_FRACTION;
    let right_far = bottom_right.y - (bottom_right.y - top_right.y) / CORNER_FRACTION;

    let bottom_near = bottom_left.x + (bottom_right.x - bottom_left.x) / CORNER_FRACTION;
    let bottom_far = bottom_right.x - (bottom_right.x - bottom_left.x) / CORNER_FRACTION;

    let left_near = top_left.y + (bottom_left.y - top_left.y) / CORNER_FRACTION;
    let left_far = bottom_left.y - (bottom_left.y - top_left.y) / CORNER_FRACTION;

    [
        (top_left, PointF::new(top_near, top_left.y)),
        (PointF::new(top_far, top_right.y), top_right),
        (top_right, PointF::new(top_right.x, right_near)),
        (PointF::new(bottom_right.x, right_far), bottom_right),
        (bottom_left, PointF::new(bottom_near, bottom_left.y)),
        (PointF::new(bottom_far, bottom_right.y), bottom_right),
        (top_left, PointF::new(top_left.x, left_near)),
        (PointF::new(bottom_left.x, left_far), bottom_left),
    ]
}

impl<W, B> AnnotationOverlay<W, B>
where
    W: WindowSystem + Clone,
    B: RenderBackend,
{
    /// Zero-length lines are skipped.
    pub fn draw_line(&mut self, start: PointF, end: PointF, stroke_width: f32, color: Color) {
        if start == end {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.draw_line(start, end, stroke_width, color);
        }
    }

    pub fn draw_solid_circle(&mut self, center: PointF, radius: f32, color: Color) {
        if let Some(surface) = self.surface.as_mut() {
            surface.fill_ellipse(center, radius, color);
        }
    }

    pub fn draw_hollow_circle(&mut self, center: PointF, radius: f32, stroke_width: f32, color: Color) {
        if let Some(surface) = self.surface.as_mut() {
            surface.draw_ellipse(center, radius, stroke_width, color);
        }
    }

    pub fn draw_hollow_diamond(&mut self, center: PointF, radius: f32, stroke_width: f32, color: Color) {
        if let Some(surface) = self.surface.as_mut() {
            for (start, end) in diamond_segments(center, radius) {
                surface.draw_line(start, end, stroke_width, color);
            }
        }
    }

    pub fn draw_solid_rectangle(&mut self, rect: RectF, color: Color) {
        if let Some(surface) = self.surface.as_mut() {
            surface.fill_rect(rect, color);
        }
    }

    pub fn draw_hollow_rectangle(&mut self, rect: RectF, stroke_width: f32, color: Color) {
        if let Some(surface) = self.surface.as_mut() {
            surface.draw_rect(rect, stroke_width, color);
        }
    }

    /// Text with a two-ring halo built from offset copies, see [`outline_layers`].
    pub fn draw_text_with_outline(&mut self, text: &str, origin: PointF, font_size: f32, color: Color) {
        if text.is_empty() || !self.backend.is_initialized() {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.draw_text_layers(text, font_size, &outline_layers(origin, color));
        }
    }

    pub fn draw_corner_box(
        &mut self,
        top_left: PointF,
        top_right: PointF,
        bottom_left: PointF,
        bottom_right: PointF,
        stroke_width: f32,
        color: Color,
    ) {
        for (start, end) in corner_box_segments(top_left, top_right, bottom_left, bottom_right) {
            self.draw_line(start, end, stroke_width, color);
        }
    }

    /// Layout size of `text` at `font_size`; zero when the text factory is gone.
    pub fn text_size(&self, text: &str, font_size: f32) -> SizeF {
        self.backend
            .measure_text(text, font_size)
            .unwrap_or_default()
    }

    /// Full-size horizontal and vertical lines through `center`.
    pub fn draw_crosshair(&mut self, center: PointF, width: i32, height: i32, stroke_width: f32, color: Color) {
        let (w, h) = (width as f32, height as f32);
        self.draw_line(PointF::new(0.0, center.y), PointF::new(w, center.y), stroke_width, color);
        self.draw_line(PointF::new(center.x, 0.0), PointF::new(center.x, h), stroke_width, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_has_two_rings_then_text() {
        let origin = PointF::new(10.0, 20.0);
        let layers = outline_layers(origin, colors::WHITE);

        assert_eq!(layers.len(), 17);
        assert!(layers[..8].iter().all(|l| l.color == colors::TEXT_OUTLINE));
        assert!(layers[8..16].iter().all(|l| l.color == colors::TEXT_OUTLINE_FAR));
        assert_eq!(layers[16], TextLayer { origin, color: colors::WHITE });

        for layer in &layers[..8] {
            let (dx, dy) = (layer.origin.x - origin.x, layer.origin.y - origin.y);
            assert!(dx.abs() <= 1.0 && dy.abs() <= 1.0);
            assert!(dx != 0.0 || dy != 0.0);
        }
        for layer in &layers[8..16] {
            let (dx, dy) = (layer.origin.x - origin.x, layer.origin.y - origin.y);
            assert!(dx.abs() == 2.0 || dy.abs() == 2.0);
            assert!(dx.abs() <= 2.0 && dy.abs() <= 2.0);
        }
    }

    #[test]
    fn outline_ring_offsets_are_distinct() {
        let layers = outline_layers(PointF::default(), colors::BLACK);
        for ring in [&layers[..8], &layers[8..16]] {
            for (i, a) in ring.iter().enumerate() {
                for b in &ring[i + 1..] {
                    assert_ne!(a.origin, b.origin);
                }
            }
        }
    }

    #[test]
    fn diamond_vertices_touch_the_radius() {
        let segments = diamond_segments(PointF::new(50.0, 50.0), 10.0);
        assert_eq!(segments[0].0, PointF::new(50.0, 40.0));
        assert_eq!(segments[0].1, PointF::new(60.0, 50.0));
        assert_eq!(segments[2].0, PointF::new(50.0, 60.0));
        assert_eq!(segments[3].1, PointF::new(50.0, 40.0));
    }

    #[test]
    fn corner_brackets_are_a_quarter_of_each_side() {
        let segments = corner_box_segments(
            PointF::new(0.0, 0.0),
            PointF::new(100.0, 0.0),
            PointF::new(0.0, 40.0),
            PointF::new(100.0, 40.0),
        );

        assert_eq!(segments[0], (PointF::new(0.0, 0.0), PointF::new(25.0, 0.0)));
        assert_eq!(segments[1], (PointF::new(75.0, 0.0), PointF::new(100.0, 0.0)));
        assert_eq!(segments[2], (PointF::new(100.0, 0.0), PointF::new(100.0, 10.0)));
        assert_eq!(segments[3], (PointF::new(100.0, 30.0), PointF::new(100.0, 40.0)));
        assert_eq!(segments[4], (PointF::new(0.0, 40.0), PointF::new(25.0, 40.0)));
        assert_eq!(segments[5], (PointF::new(75.0, 40.0), PointF::new(100.0, 40.0)));
        assert_eq!(segments[6], (PointF::new(0.0, 0.0), PointF::new(0.0, 10.0)));
        assert_eq!(segments[7], (PointF::new(0.0, 30.0), PointF::new(0.0, 40.0)));
    }
}
