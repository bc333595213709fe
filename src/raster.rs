use ab_glyph::{FontRef, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut, draw_text_mut,
};

use crate::scene::{Primitive, Scene, Viewport};
use crate::text;

/// Circle outline thickness in points.
pub const OUTLINE: f32 = 1.5;

/// Draw `scene` into a fresh `width` x `height` RGBA image, sizing lines,
/// markers and labels for `dpi`.
pub fn rasterize(scene: &Scene, width: u32, height: u32, dpi: f32, font: &FontRef) -> RgbaImage {
    let viewport = Viewport::for_scene(scene, width, height, dpi);
    let mut image = RgbaImage::from_pixel(width, height, Rgba(scene.background.to_rgba()));

    for primitive in &scene.primitives {
        match primitive {
            Primitive::Polyline {
                points,
                color,
                width,
            } => {
                let color = Rgba(color.to_rgba());
                let pixels: Vec<(f32, f32)> =
                    points.iter().map(|&p| viewport.to_pixel(p)).collect();
                let width = viewport.points(*width);
                for pair in pixels.windows(2) {
                    thick_segment(&mut image, pair[0], pair[1], width, color);
                }
            }
            Primitive::Circle {
                center,
                radius,
                color,
            } => {
                let (cx, cy) = viewport.to_pixel(*center);
                let r = viewport.scale_len(*radius).round() as i32;
                let center = (cx.round() as i32, cy.round() as i32);
                let color = Rgba(color.to_rgba());
                let half = (viewport.points(OUTLINE).round() as i32 / 2).max(0);
                for dr in -half..=half {
                    draw_hollow_circle_mut(&mut image, center, (r + dr).max(0), color);
                }
            }
            Primitive::Marker {
                center,
                radius,
                color,
            } => {
                let (cx, cy) = viewport.to_pixel(*center);
                draw_filled_circle_mut(
                    &mut image,
                    (cx.round() as i32, cy.round() as i32),
                    viewport.points(*radius).round() as i32,
                    Rgba(color.to_rgba()),
                );
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
                let (x, y) = text::origin(font, scale, label, *anchor, at);
                draw_text_mut(
                    &mut image,
                    Rgba(color.to_rgba()),
                    x.round() as i32,
                    y.round() as i32,
                    scale,
                    font,
                    label,
                );
            }
        }
    }
    image
}

fn thick_segment(
    image: &mut RgbaImage,
    a: (f32, f32),
    b: (f32, f32),
    width: f32,
    color: Rgba<u8>,
) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = (dx * dx + dy * dy).sqrt();
    if width <= 1.0 || len == 0.0 {
        draw_line_segment_mut(image, a, b, color);
        return;
    }
    let (nx, ny) = (-dy / len, dx / len);
    let half = (width - 1.0) / 2.0;
    let mut offset = -half;
    while offset <= half + f32::EPSILON {
        let (ox, oy) = (nx * offset, ny * offset);
        draw_line_segment_mut(image, (a.0 + ox, a.1 + oy), (b.0 + ox, b.1 + oy), color);
        offset += 0.5;
    }
}
