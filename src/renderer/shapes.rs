//! Shape generation for 2D primitives
//!
//! Everything is tessellated into triangle lists in screen pixels.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::{Vertex, with_alpha};

fn push_quad(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) {
    // a-b-c-d in winding order
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));

    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(c.x, c.y, color));
    out.push(Vertex::new(d.x, d.y, color));
}

/// Segment count that keeps circles smooth without wasting vertices
pub fn segments_for_radius(radius: f32) -> u32 {
    ((radius * 0.75) as u32).clamp(8, 48)
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        let d1 = Vec2::new(theta1.cos(), theta1.sin());
        let d2 = Vec2::new(theta2.cos(), theta2.sin());

        push_quad(
            &mut vertices,
            center + d1 * inner_radius,
            center + d1 * outer_radius,
            center + d2 * outer_radius,
            center + d2 * inner_radius,
            color,
        );
    }

    vertices
}

/// Axis-aligned filled rectangle
pub fn rect(x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        Vec2::new(x, y),
        Vec2::new(x + w, y),
        Vec2::new(x + w, y + h),
        Vec2::new(x, y + h),
        color,
    );
    vertices
}

/// Rectangle outline with the given stroke width (stroke drawn inside)
pub fn rect_outline(x: f32, y: f32, w: f32, h: f32, stroke: f32, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(24);
    vertices.extend(rect(x, y, w, stroke, color));
    vertices.extend(rect(x, y + h - stroke, w, stroke, color));
    vertices.extend(rect(x, y + stroke, stroke, h - 2.0 * stroke, color));
    vertices.extend(rect(x + w - stroke, y + stroke, stroke, h - 2.0 * stroke, color));
    vertices
}

/// Filled quad from four corners (any rotation)
pub fn quad(corners: [Vec2; 4], color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    push_quad(&mut vertices, corners[0], corners[1], corners[2], corners[3], color);
    vertices
}

/// Filled convex or star-shaped polygon (triangle fan around its centroid)
pub fn polygon(points: &[Vec2], color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 3 {
        return Vec::new();
    }
    let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
    let mut vertices = Vec::with_capacity(points.len() * 3);
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        vertices.push(Vertex::new(centroid.x, centroid.y, color));
        vertices.push(Vertex::new(a.x, a.y, color));
        vertices.push(Vertex::new(b.x, b.y, color));
    }
    vertices
}

/// Thick line segment as a quad
pub fn line(a: Vec2, b: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);
    quad([a + perp, b + perp, b - perp, a - perp], color)
}

/// Closed outline through the given points
pub fn polyline_closed(points: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(points.len() * 6);
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        vertices.extend(line(a, b, width, color));
    }
    vertices
}

/// Fading trail through a list of points (newest first)
pub fn trail(points: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut vertices = Vec::with_capacity(points.len() * 6);
    let len = points.len() as f32;

    for i in 0..points.len() - 1 {
        let p1 = points[i];
        let p2 = points[i + 1];

        // Fade alpha and width along the trail
        let t1 = i as f32 / len;
        let t2 = (i + 1) as f32 / len;
        let c1 = with_alpha(color, color[3] * (1.0 - t1) * 0.8);
        let c2 = with_alpha(color, color[3] * (1.0 - t2) * 0.8);
        let w1 = width * (1.0 - t1 * 0.7);
        let w2 = width * (1.0 - t2 * 0.7);

        let dir = (p2 - p1).normalize_or_zero();
        let perp = Vec2::new(-dir.y, dir.x);

        let v1a = p1 + perp * w1;
        let v1b = p1 - perp * w1;
        let v2a = p2 + perp * w2;
        let v2b = p2 - perp * w2;

        vertices.push(Vertex::new(v1a.x, v1a.y, c1));
        vertices.push(Vertex::new(v1b.x, v1b.y, c1));
        vertices.push(Vertex::new(v2a.x, v2a.y, c2));

        vertices.push(Vertex::new(v2a.x, v2a.y, c2));
        vertices.push(Vertex::new(v1b.x, v1b.y, c1));
        vertices.push(Vertex::new(v2b.x, v2b.y, c2));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_vertex_count() {
        let v = circle(Vec2::ZERO, 10.0, [1.0; 4], 12);
        assert_eq!(v.len(), 36);
    }

    #[test]
    fn test_degenerate_shapes_are_empty() {
        assert!(line(Vec2::ONE, Vec2::ONE, 2.0, [1.0; 4]).is_empty());
        assert!(polygon(&[Vec2::ZERO, Vec2::ONE], [1.0; 4]).is_empty());
        assert!(trail(&[Vec2::ZERO], 2.0, [1.0; 4]).is_empty());
    }

    #[test]
    fn test_rect_covers_corners() {
        let v = rect(10.0, 20.0, 30.0, 40.0, [1.0; 4]);
        assert_eq!(v.len(), 6);
        assert!(v.iter().any(|p| p.position == [40.0, 60.0]));
        assert!(v.iter().any(|p| p.position == [10.0, 20.0]));
    }
}
