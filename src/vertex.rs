use std::f32::consts::TAU;

use ab_glyph::{FontRef, PxScale};
use bytemuck::{Pod, Zeroable};

use crate::raster::OUTLINE;
use crate::scene::{Color, Primitive, Scene, Viewport};
use crate::text;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    position: [f32; 2],
    color: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x3];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        use std::mem;

        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }

    pub fn position(&self) -> [f32; 2] {
        self.position
    }
}

/// Segments used to approximate a circle.
const CIRCLE_SEGMENTS: usize = 48;
/// Glyph pixels at least this covered become a square.
const INK: f32 = 0.5;

/// Turn a scene into a triangle list in normalized device coordinates.
pub fn tessellate(scene: &Scene, viewport: &Viewport, font: &FontRef) -> Vec<Vertex> {
    let mut out = Vec::new();
    for primitive in &scene.primitives {
        match primitive {
            Primitive::Polyline {
                points,
                color,
                width,
            } => {
                let pixels: Vec<(f32, f32)> =
                    points.iter().map(|&p| viewport.to_pixel(p)).collect();
                let width = viewport.points(*width);
                for pair in pixels.windows(2) {
                    quad(&mut out, viewport, pair[0], pair[1], width, *color);
                }
            }
            Primitive::Circle {
                center,
                radius,
                color,
            } => {
                let c = viewport.to_pixel(*center);
                let r = viewport.scale_len(*radius);
                let ring = circle_points(c, r);
                let outline = viewport.points(OUTLINE);
                for pair in ring.windows(2) {
                    quad(&mut out, viewport, pair[0], pair[1], outline, *color);
                }
            }
            Primitive::Marker {
                center,
                radius,
                color,
            } => {
                let c = viewport.to_pixel(*center);
                let ring = circle_points(c, viewport.points(*radius));
                for pair in ring.windows(2) {
                    for p in [c, pair[0], pair[1]] {
                        out.push(vertex(viewport, p, *color));
                    }
                }
            }
            Primitive::Text {
                position,
                offset,
                text: label,
                size,
                color,
                anchor,
            } => {
                let scale = PxScale::from(viewport.points(*size));
                let (px, py) = viewport.to_pixel(*position);
                let at = (px + viewport.points(offset.0), py - viewport.points(offset.1));
                let origin = text::origin(font, scale, label, *anchor, at);
                text::coverage(font, scale, label, origin, |x, y, c| {
                    if c >= INK {
                        pixel(&mut out, viewport, x, y, *color);
                    }
                });
            }
        }
    }
    out
}

fn vertex(viewport: &Viewport, pixel: (f32, f32), color: Color) -> Vertex {
    Vertex {
        position: viewport.to_ndc(pixel),
        color: color.to_f32(),
    }
}

/// Two triangles filling the pixel whose top-left corner is `(x, y)`.
fn pixel(out: &mut Vec<Vertex>, viewport: &Viewport, x: i32, y: i32, color: Color) {
    let (x, y) = (x as f32, y as f32);
    let corners = [(x, y), (x + 1.0, y), (x, y + 1.0), (x + 1.0, y + 1.0)];
    for i in [0, 1, 2, 2, 1, 3] {
        out.push(vertex(viewport, corners[i], color));
    }
}

/// Closed ring, first point repeated at the end.
fn circle_points((cx, cy): (f32, f32), r: f32) -> Vec<(f32, f32)> {
    (0..=CIRCLE_SEGMENTS)
        .map(|i| {
            let a = TAU * i as f32 / CIRCLE_SEGMENTS as f32;
            (cx + r * a.cos(), cy + r * a.sin())
        })
        .collect()
}

/// Two triangles covering a `width` pixel wide segment.
fn quad(
    out: &mut Vec<Vertex>,
    viewport: &Viewport,
    a: (f32, f32),
    b: (f32, f32),
    width: f32,
    color: Color,
) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return;
    }
    let half = width.max(1.0) / 2.0;
    let (nx, ny) = (-dy / len * half, dx / len * half);
    let corners = [
        (a.0 + nx, a.1 + ny),
        (a.0 - nx, a.1 - ny),
        (b.0 + nx, b.1 + ny),
        (b.0 - nx, b.1 - ny),
    ];
    for i in [0, 1, 2, 2, 1, 3] {
        out.push(vertex(viewport, corners[i], color));
    }
}
