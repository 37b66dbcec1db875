//! Screen-space draw list
//!
//! Games draw into a [`Canvas`] in their own logical pixels (origin top-left,
//! y down). The render pipeline maps those pixels into the viewport.

use glam::Vec2;

use super::shapes;
use super::vertex::Vertex;

#[derive(Debug, Clone)]
pub struct Canvas {
    /// Logical width in game pixels
    pub width: f32,
    /// Logical height in game pixels
    pub height: f32,
    /// Clear color
    pub background: [f32; 4],
    /// Offset applied to everything drawn (screen shake)
    offset: Vec2,
    vertices: Vec<Vertex>,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background: super::vertex::colors::BACKGROUND,
            offset: Vec2::ZERO,
            vertices: Vec::with_capacity(4096),
        }
    }

    /// Start a new frame with a different logical size
    pub fn reset(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.offset = Vec2::ZERO;
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Shift all subsequent drawing (used for screen shake)
    pub fn shake(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    fn extend(&mut self, verts: Vec<Vertex>) {
        if self.offset == Vec2::ZERO {
            self.vertices.extend(verts);
        } else {
            let o = self.offset;
            self.vertices.extend(verts.into_iter().map(|mut v| {
                v.position[0] += o.x;
                v.position[1] += o.y;
                v
            }));
        }
    }

    pub fn fill(&mut self, color: [f32; 4]) {
        self.background = color;
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        let segments = shapes::segments_for_radius(radius);
        self.extend(shapes::circle(center, radius, color, segments));
    }

    pub fn ring(&mut self, center: Vec2, radius: f32, stroke: f32, color: [f32; 4]) {
        let segments = shapes::segments_for_radius(radius);
        self.extend(shapes::ring(
            center,
            (radius - stroke).max(0.0),
            radius,
            color,
            segments,
        ));
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) {
        self.extend(shapes::rect(x, y, w, h, color));
    }

    pub fn rect_outline(&mut self, x: f32, y: f32, w: f32, h: f32, stroke: f32, color: [f32; 4]) {
        self.extend(shapes::rect_outline(x, y, w, h, stroke, color));
    }

    pub fn quad(&mut self, corners: [Vec2; 4], color: [f32; 4]) {
        self.extend(shapes::quad(corners, color));
    }

    pub fn polygon(&mut self, points: &[Vec2], color: [f32; 4]) {
        self.extend(shapes::polygon(points, color));
    }

    pub fn outline(&mut self, points: &[Vec2], width: f32, color: [f32; 4]) {
        self.extend(shapes::polyline_closed(points, width, color));
    }

    pub fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: [f32; 4]) {
        self.extend(shapes::line(a, b, width, color));
    }

    pub fn trail(&mut self, points: &[Vec2], width: f32, color: [f32; 4]) {
        self.extend(shapes::trail(points, width, color));
    }

    /// Horizontal bar filled to `fraction` (health bars, cooldowns)
    #[allow(clippy::too_many_arguments)]
    pub fn bar(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fraction: f32,
        fg: [f32; 4],
        bg: [f32; 4],
    ) {
        self.rect(x, y, w, h, bg);
        self.rect(x, y, w * fraction.clamp(0.0, 1.0), h, fg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shake_offsets_vertices() {
        let mut canvas = Canvas::new(100.0, 100.0);
        canvas.shake(Vec2::new(5.0, -5.0));
        canvas.rect(0.0, 0.0, 10.0, 10.0, [1.0; 4]);
        assert!(canvas.vertices().iter().any(|v| v.position == [5.0, -5.0]));
    }

    #[test]
    fn test_reset_clears() {
        let mut canvas = Canvas::new(100.0, 100.0);
        canvas.circle(Vec2::splat(50.0), 10.0, [1.0; 4]);
        canvas.reset(200.0, 100.0);
        assert!(canvas.vertices().is_empty());
        assert_eq!(canvas.width, 200.0);
    }
}
