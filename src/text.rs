//! Label layout shared by the rasterizer and the window tessellator.

use ab_glyph::{point, Font, FontRef, GlyphId, PxScale, ScaleFont};
use imageproc::drawing::text_size;

use crate::error::Result;
use crate::scene::Anchor;

/// DejaVu Sans, bundled so frames look the same on every machine.
static FONT_DATA: &[u8] = include_bytes!("DejaVuSans.ttf");

pub fn font() -> Result<FontRef<'static>> {
    Ok(FontRef::try_from_slice(FONT_DATA)?)
}

/// Top-left corner of the box of `text` when `anchor` sits at `at` pixels.
pub fn origin(
    font: &FontRef,
    scale: PxScale,
    text: &str,
    anchor: Anchor,
    at: (f32, f32),
) -> (f32, f32) {
    let (width, _) = text_size(scale, font, text);
    let width = width as f32;
    let height = font.as_scaled(scale).height();
    let (x, y) = at;
    match anchor {
        Anchor::TopCenter => (x - width / 2.0, y),
        Anchor::BottomCenter => (x - width / 2.0, y - height),
        Anchor::CenterRight => (x - width, y - height / 2.0),
    }
}

/// Visit every pixel covered by `text` laid out from `origin`, with its
/// coverage in `0..=1`.
pub fn coverage(
    font: &FontRef,
    scale: PxScale,
    text: &str,
    origin: (f32, f32),
    mut f: impl FnMut(i32, i32, f32),
) {
    let scaled = font.as_scaled(scale);
    let mut caret = origin.0;
    let mut last: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(last) = last {
            caret += scaled.kern(last, id);
        }
        last = Some(id);
        let glyph = id.with_scale_and_position(scale, point(caret, origin.1 + scaled.ascent()));
        caret += scaled.h_advance(id);
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let (x0, y0) = (bounds.min.x as i32, bounds.min.y as i32);
            outlined.draw(|x, y, c| f(x0 + x as i32, y0 + y as i32, c));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bundled_font_has_pi() {
        let font = font().unwrap();
        assert_ne!(font.glyph_id('π'), GlyphId(0));
    }

    #[test]
    fn anchors_place_the_box_around_the_point() {
        let font = font().unwrap();
        let scale = PxScale::from(20.0);
        let (x, y) = origin(&font, scale, "0", Anchor::TopCenter, (100.0, 50.0));
        assert!(x < 100.0 && x > 80.0);
        assert_eq!(y, 50.0);
        let (x, y) = origin(&font, scale, "-1", Anchor::CenterRight, (100.0, 50.0));
        assert!(x < 100.0 && y < 50.0);
        let (_, y) = origin(&font, scale, "title", Anchor::BottomCenter, (100.0, 50.0));
        assert!(y < 30.0);
    }

    #[test]
    fn coverage_stays_near_the_origin() {
        let font = font().unwrap();
        let mut covered = 0;
        coverage(&font, PxScale::from(20.0), "π/2", (10.0, 10.0), |x, y, c| {
            assert!((5..60).contains(&x) && (5..40).contains(&y), "{x},{y}");
            if c > 0.5 {
                covered += 1;
            }
        });
        assert!(covered > 20);
    }
}
