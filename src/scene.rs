//! Renderer-neutral description of a single animation frame.
//!
//! Everything in a [`Scene`] lives in data coordinates. A [`Viewport`] maps
//! those onto a pixel grid, so the window renderer and the video rasterizer
//! agree on where things land. Line widths, marker and font sizes are in
//! typographic points and scale with the output dpi.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);
    pub const GRID: Color = Color::rgb(0xb0, 0xb0, 0xb0);
    /// `xkcd:blue`
    pub const XKCD_BLUE: Color = Color::rgb(0x03, 0x43, 0xdf);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Axis limits, `[x_min, x_max, y_min, y_max]` like a plot's axis call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    pub const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    /// Stretch each axis to fill the frame.
    Fill,
    /// One data unit is the same number of pixels on both axes.
    Equal,
}

/// Fractions of the frame kept free around the axes box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Margins {
    pub const NONE: Margins = Margins {
        left: 0.0,
        right: 0.0,
        bottom: 0.0,
        top: 0.0,
    };
    /// Room for tick labels and a title, laid out like a default subplot.
    pub const PLOT: Margins = Margins {
        left: 0.125,
        right: 0.1,
        bottom: 0.11,
        top: 0.12,
    };
}

/// Which point of a label's box sits on its anchor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopCenter,
    BottomCenter,
    CenterRight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Connected line through `points`, `width` in points.
    Polyline {
        points: Vec<(f64, f64)>,
        color: Color,
        width: f32,
    },
    /// Unfilled circle with a radius in data units.
    Circle {
        center: (f64, f64),
        radius: f64,
        color: Color,
    },
    /// Filled dot with a radius in points, independent of zoom.
    Marker {
        center: (f64, f64),
        radius: f32,
        color: Color,
    },
    /// Single line of text at `position`, moved by `offset` points (y up).
    Text {
        position: (f64, f64),
        offset: (f32, f32),
        text: String,
        size: f32,
        color: Color,
        anchor: Anchor,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub bounds: Bounds,
    pub aspect: Aspect,
    pub background: Color,
    pub margins: Margins,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new(bounds: Bounds, aspect: Aspect) -> Self {
        Self {
            bounds,
            aspect,
            background: Color::WHITE,
            margins: Margins::NONE,
            primitives: Vec::new(),
        }
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }
}

/// Affine map from data coordinates to pixels, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    scale_x: f64,
    scale_y: f64,
    offset_x: f64,
    offset_y: f64,
    px_per_pt: f32,
}

impl Viewport {
    /// Points are pixels until [`Viewport::with_dpi`] says otherwise.
    pub const POINTS_PER_INCH: f32 = 72.0;

    pub fn fit(bounds: &Bounds, aspect: Aspect, width: u32, height: u32) -> Self {
        Self::fit_in(bounds, aspect, Margins::NONE, width, height)
    }

    /// Map `bounds` into the frame minus `margins`.
    pub fn fit_in(
        bounds: &Bounds,
        aspect: Aspect,
        margins: Margins,
        width: u32,
        height: u32,
    ) -> Self {
        let (w, h) = (width as f64, height as f64);
        let left = margins.left as f64 * w;
        let top = margins.top as f64 * h;
        let box_w = (w * (1.0 - margins.left as f64 - margins.right as f64)).max(0.0);
        let box_h = (h * (1.0 - margins.top as f64 - margins.bottom as f64)).max(0.0);
        let mut scale_x = box_w / bounds.width();
        let mut scale_y = box_h / bounds.height();
        if aspect == Aspect::Equal {
            let s = scale_x.min(scale_y);
            scale_x = s;
            scale_y = s;
        }
        // Center the data box inside the axes box.
        let offset_x = left + (box_w - bounds.width() * scale_x) / 2.0 - bounds.x_min * scale_x;
        let offset_y = top + (box_h - bounds.height() * scale_y) / 2.0 + bounds.y_max * scale_y;
        Self {
            width,
            height,
            scale_x,
            scale_y,
            offset_x,
            offset_y,
            px_per_pt: 1.0,
        }
    }

    /// Viewport for `scene` on a `width` x `height` frame at `dpi`.
    pub fn for_scene(scene: &Scene, width: u32, height: u32, dpi: f32) -> Self {
        Self::fit_in(&scene.bounds, scene.aspect, scene.margins, width, height).with_dpi(dpi)
    }

    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.px_per_pt = dpi / Self::POINTS_PER_INCH;
        self
    }

    /// Pixel length of `pt` points.
    pub fn points(&self, pt: f32) -> f32 {
        pt * self.px_per_pt
    }

    pub fn to_pixel(&self, (x, y): (f64, f64)) -> (f32, f32) {
        (
            (self.offset_x + x * self.scale_x) as f32,
            (self.offset_y - y * self.scale_y) as f32,
        )
    }

    /// Pixel length of a data-space distance along x.
    pub fn scale_len(&self, len: f64) -> f32 {
        (len * self.scale_x) as f32
    }

    /// Pixel position converted to normalized device coordinates.
    pub fn to_ndc(&self, (px, py): (f32, f32)) -> [f32; 2] {
        [
            px / self.width as f32 * 2.0 - 1.0,
            1.0 - py / self.height as f32 * 2.0,
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fill_maps_corners_to_frame_corners() {
        let bounds = Bounds::new(-1.0, 1.0, -2.0, 2.0);
        let vp = Viewport::fit(&bounds, Aspect::Fill, 200, 100);
        assert_eq!(vp.to_pixel((-1.0, 2.0)), (0.0, 0.0));
        assert_eq!(vp.to_pixel((1.0, -2.0)), (200.0, 100.0));
        assert_eq!(vp.to_ndc(vp.to_pixel((0.0, 0.0))), [0.0, 0.0]);
    }

    #[test]
    fn equal_aspect_keeps_circles_round() {
        let bounds = Bounds::new(0.0, 10.0, 0.0, 10.0);
        let vp = Viewport::fit(&bounds, Aspect::Equal, 300, 100);
        let (x0, y0) = vp.to_pixel((0.0, 0.0));
        let (x1, _) = vp.to_pixel((1.0, 0.0));
        let (_, y1) = vp.to_pixel((0.0, 1.0));
        assert!(((x1 - x0) - (y0 - y1)).abs() < 1e-4);
        // Data box centered horizontally.
        assert!((vp.to_pixel((5.0, 5.0)).0 - 150.0).abs() < 1e-4);
    }

    #[test]
    fn margins_shrink_the_axes_box() {
        let bounds = Bounds::new(0.0, 1.0, 0.0, 1.0);
        let margins = Margins {
            left: 0.1,
            right: 0.2,
            bottom: 0.25,
            top: 0.05,
        };
        let vp = Viewport::fit_in(&bounds, Aspect::Fill, margins, 1000, 200);
        let (x0, y0) = vp.to_pixel((0.0, 0.0));
        let (x1, y1) = vp.to_pixel((1.0, 1.0));
        assert!((x0 - 100.0).abs() < 1e-3 && (x1 - 800.0).abs() < 1e-3);
        assert!((y1 - 10.0).abs() < 1e-3 && (y0 - 150.0).abs() < 1e-3);
    }

    #[test]
    fn points_follow_the_dpi() {
        let bounds = Bounds::new(0.0, 1.0, 0.0, 1.0);
        let vp = Viewport::fit(&bounds, Aspect::Fill, 10, 10);
        assert_eq!(vp.points(10.0), 10.0);
        assert_eq!(vp.with_dpi(144.0).points(10.0), 20.0);
        assert!((vp.with_dpi(150.0).points(5.0) - 10.416667).abs() < 1e-4);
    }
}
