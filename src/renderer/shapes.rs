//! Shape generation for 2D primitives
//!
//! Turns recorded draw commands into screen-space triangle lists.

use glam::{Affine2, Vec2};
use std::f32::consts::FRAC_PI_2;

use super::scene::{DrawCommand, Glow, Rect, Shape};
use super::vertex::Vertex;

/// Segments per rounded corner
const CORNER_SEGMENTS: u32 = 6;

/// Tessellate a whole frame, preserving command order
pub fn tessellate(commands: &[DrawCommand]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(commands.len() * 12);
    for cmd in commands {
        tessellate_command(cmd, &mut vertices);
    }
    vertices
}

/// Append the triangles for one command (halo first, then the shape)
pub fn tessellate_command(cmd: &DrawCommand, out: &mut Vec<Vertex>) {
    if let Some(glow) = cmd.glow {
        glow_halo(cmd.transform, &cmd.shape, glow, out);
    }
    let xf = cmd.transform;
    match cmd.shape {
        Shape::FillRect(rect) => quad_rect(xf, rect, cmd.color, out),
        Shape::FillRoundedRect { rect, radius } => rounded_rect(xf, rect, radius, cmd.color, out),
        Shape::StrokeRect { rect, width } => stroke_rect(xf, rect, width, cmd.color, out),
        Shape::Line { from, to, width } => line(xf, from, to, width, cmd.color, out),
    }
}

fn push_tri(xf: Affine2, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4], out: &mut Vec<Vertex>) {
    for p in [a, b, c] {
        let p = xf.transform_point2(p);
        out.push(Vertex::new(p.x, p.y, color));
    }
}

/// Two triangles over four corners given in winding order
fn push_quad(xf: Affine2, corners: [Vec2; 4], color: [f32; 4], out: &mut Vec<Vertex>) {
    let [a, b, c, d] = corners;
    push_tri(xf, a, b, c, color, out);
    push_tri(xf, a, c, d, color, out);
}

fn quad_rect(xf: Affine2, rect: Rect, color: [f32; 4], out: &mut Vec<Vertex>) {
    if rect.size.x <= 0.0 || rect.size.y <= 0.0 {
        return;
    }
    let min = rect.min;
    let max = rect.max();
    push_quad(
        xf,
        [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)],
        color,
        out,
    );
}

/// Rounded rectangle: a cross of three rects plus a fan per corner
fn rounded_rect(xf: Affine2, rect: Rect, radius: f32, color: [f32; 4], out: &mut Vec<Vertex>) {
    let r = radius.clamp(0.0, rect.size.x.min(rect.size.y) / 2.0);
    if r == 0.0 {
        quad_rect(xf, rect, color, out);
        return;
    }
    let min = rect.min;
    let size = rect.size;

    // Center column, full height
    quad_rect(xf, Rect::new(min.x + r, min.y, size.x - 2.0 * r, size.y), color, out);
    // Side strips between the corners
    quad_rect(xf, Rect::new(min.x, min.y + r, r, size.y - 2.0 * r), color, out);
    quad_rect(xf, Rect::new(min.x + size.x - r, min.y + r, r, size.y - 2.0 * r), color, out);

    let max = rect.max();
    let corners = [
        (Vec2::new(max.x - r, max.y - r), 0.0),
        (Vec2::new(min.x + r, max.y - r), FRAC_PI_2),
        (Vec2::new(min.x + r, min.y + r), 2.0 * FRAC_PI_2),
        (Vec2::new(max.x - r, min.y + r), 3.0 * FRAC_PI_2),
    ];
    for (center, start) in corners {
        for i in 0..CORNER_SEGMENTS {
            let t1 = start + (i as f32 / CORNER_SEGMENTS as f32) * FRAC_PI_2;
            let t2 = start + ((i + 1) as f32 / CORNER_SEGMENTS as f32) * FRAC_PI_2;
            push_tri(
                xf,
                center,
                center + Vec2::new(t1.cos(), t1.sin()) * r,
                center + Vec2::new(t2.cos(), t2.sin()) * r,
                color,
                out,
            );
        }
    }
}

/// Outline centered on the edge, as four bands
fn stroke_rect(xf: Affine2, rect: Rect, width: f32, color: [f32; 4], out: &mut Vec<Vertex>) {
    let h = width / 2.0;
    let min = rect.min;
    let size = rect.size;
    // Top and bottom span the full outer width
    quad_rect(xf, Rect::new(min.x - h, min.y - h, size.x + width, width), color, out);
    quad_rect(xf, Rect::new(min.x - h, min.y + size.y - h, size.x + width, width), color, out);
    // Left and right fill the gap between them
    quad_rect(xf, Rect::new(min.x - h, min.y + h, width, size.y - width), color, out);
    quad_rect(xf, Rect::new(min.x + size.x - h, min.y + h, width, size.y - width), color, out);
}

fn line(xf: Affine2, from: Vec2, to: Vec2, width: f32, color: [f32; 4], out: &mut Vec<Vertex>) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let perp = dir.perp() * (width / 2.0);
    push_quad(xf, [from + perp, to + perp, to - perp, from - perp], color, out);
}

/// Soft halo: two expanded, fading copies of the shape's bounds
fn glow_halo(xf: Affine2, shape: &Shape, glow: Glow, out: &mut Vec<Vertex>) {
    let bounds = match *shape {
        Shape::FillRect(rect) | Shape::FillRoundedRect { rect, .. } | Shape::StrokeRect { rect, .. } => rect,
        Shape::Line { from, to, .. } => Rect {
            min: from.min(to),
            size: (to - from).abs(),
        },
    };
    for (spread, alpha) in [(1.0, 0.12), (0.5, 0.25)] {
        let mut color = glow.color;
        color[3] *= alpha;
        let r = glow.blur * spread;
        rounded_rect(xf, bounds.inflate(r), r, color, out);
    }
}
