//! A small software 2D canvas for painting textures procedurally.
//!
//! The canvas keeps premultiplied RGBA in `f32` and composites with
//! source-over, like an HTML canvas with default settings. Shapes are
//! rasterised from signed distances evaluated at pixel centres, which gives
//! one pixel of antialiasing on every edge. A drawing call takes a list of
//! [`Shape`]s that are unioned into one coverage mask, so overlapping strokes
//! of the same call do not double up. Shadows blur that mask with
//! [`imageops::fast_blur`].

use image::{ImageBuffer, Luma, Rgba, RgbaImage, imageops};

use crate::data_structures::color::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

fn sample_stops(stops: &[GradientStop], t: f32) -> Color {
    let Some(first) = stops.first() else {
        return Color::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let local = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return a.color.lerp(b.color, local);
        }
    }
    stops.last().map_or(first.color, |last| last.color)
}

/// What a shape is filled with.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Gradient along the line `from -> to`, constant across it.
    Linear {
        from: (f32, f32),
        to: (f32, f32),
        stops: Vec<GradientStop>,
    },
    /// Concentric gradient between the radii `inner` and `outer`.
    Radial {
        centre: (f32, f32),
        inner: f32,
        outer: f32,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    fn color_at(&self, x: f32, y: f32) -> Color {
        match self {
            Paint::Solid(color) => *color,
            Paint::Linear { from, to, stops } => {
                let (dx, dy) = (to.0 - from.0, to.1 - from.1);
                let len2 = dx * dx + dy * dy;
                let t = if len2 > 0.0 {
                    ((x - from.0) * dx + (y - from.1) * dy) / len2
                } else {
                    0.0
                };
                sample_stops(stops, t.clamp(0.0, 1.0))
            }
            Paint::Radial {
                centre,
                inner,
                outer,
                stops,
            } => {
                let dist = ((x - centre.0).powi(2) + (y - centre.1).powi(2)).sqrt();
                let span = outer - inner;
                let t = if span > 0.0 { (dist - inner) / span } else { 1.0 };
                sample_stops(stops, t.clamp(0.0, 1.0))
            }
        }
    }
}

/// A blurred copy of everything drawn, composited underneath it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub blur: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Segment {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        cap: LineCap,
    },
    /// Stroke of the arc from `start` to `end` radians, clockwise on screen.
    Arc {
        centre: (f32, f32),
        radius: f32,
        start: f32,
        end: f32,
        width: f32,
        cap: LineCap,
    },
    Disc {
        centre: (f32, f32),
        radius: f32,
    },
}

fn coverage_from_distance(sd: f32) -> f32 {
    (0.5 - sd).clamp(0.0, 1.0)
}

fn overlap(a0: f32, a1: f32, b0: f32, b1: f32) -> f32 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

impl Shape {
    /// Bounding box `(x0, y0, x1, y1)` including antialiasing.
    fn bounds(&self) -> (f32, f32, f32, f32) {
        let (x0, y0, x1, y1) = match *self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => (x, y, x + width, y + height),
            Shape::Segment { from, to, width, .. } => {
                let h = width / 2.0;
                (
                    from.0.min(to.0) - h,
                    from.1.min(to.1) - h,
                    from.0.max(to.0) + h,
                    from.1.max(to.1) + h,
                )
            }
            Shape::Arc {
                centre,
                radius,
                width,
                ..
            } => {
                let r = radius + width / 2.0;
                (centre.0 - r, centre.1 - r, centre.0 + r, centre.1 + r)
            }
            Shape::Disc { centre, radius } => (
                centre.0 - radius,
                centre.1 - radius,
                centre.0 + radius,
                centre.1 + radius,
            ),
        };
        (x0 - 1.0, y0 - 1.0, x1 + 1.0, y1 + 1.0)
    }

    /// Fraction of the pixel at column `px`, row `py` that the shape covers.
    fn coverage(&self, px: u32, py: u32) -> f32 {
        let p = (px as f32 + 0.5, py as f32 + 0.5);
        match *self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => {
                let (fx, fy) = (px as f32, py as f32);
                overlap(fx, fx + 1.0, x, x + width) * overlap(fy, fy + 1.0, y, y + height)
            }
            Shape::Segment {
                from,
                to,
                width,
                cap,
            } => coverage_from_distance(segment_distance(p, from, to, width, cap)),
            Shape::Arc {
                centre,
                radius,
                start,
                end,
                width,
                cap,
            } => coverage_from_distance(arc_distance(p, centre, radius, start, end, width, cap)),
            Shape::Disc { centre, radius } => coverage_from_distance(distance(p, centre) - radius),
        }
    }
}

fn segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32), width: f32, cap: LineCap) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = (dx * dx + dy * dy).sqrt();
    let half = width / 2.0;
    if len < 1e-6 {
        return match cap {
            LineCap::Round => distance(p, a) - half,
            LineCap::Butt => f32::INFINITY,
        };
    }
    let (ux, uy) = (dx / len, dy / len);
    let (rx, ry) = (p.0 - a.0, p.1 - a.1);
    let along = rx * ux + ry * uy;
    let across = (rx * uy - ry * ux).abs();
    match cap {
        LineCap::Round => {
            let t = along.clamp(0.0, len);
            distance(p, (a.0 + ux * t, a.1 + uy * t)) - half
        }
        LineCap::Butt => (across - half).max((-along).max(along - len)),
    }
}

fn arc_distance(
    p: (f32, f32),
    centre: (f32, f32),
    radius: f32,
    start: f32,
    end: f32,
    width: f32,
    cap: LineCap,
) -> f32 {
    use std::f32::consts::TAU;

    let half = width / 2.0;
    let sweep = end - start;
    let dist = distance(p, centre);
    let angle = (p.1 - centre.1).atan2(p.0 - centre.0);
    let rel = (angle - start).rem_euclid(TAU);
    let mut sd = if sweep >= TAU || rel <= sweep {
        (dist - radius).abs() - half
    } else {
        f32::INFINITY
    };
    if cap == LineCap::Round && sweep < TAU {
        let tip = |a: f32| (centre.0 + radius * a.cos(), centre.1 + radius * a.sin());
        let caps = distance(p, tip(start)).min(distance(p, tip(end))) - half;
        sd = sd.min(caps);
    }
    sd
}

pub struct Canvas {
    width: u32,
    height: u32,
    /// Premultiplied RGBA, row major.
    pixels: Vec<[f32; 4]>,
    pub global_alpha: f32,
    pub shadow: Option<Shadow>,
}

impl Canvas {
    /// A fully transparent canvas. Zero dimensions are bumped to one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; (width * height) as usize],
            global_alpha: 1.0,
            shadow: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Straight-alpha colour of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let [r, g, b, a] = self.pixels[(y * self.width + x) as usize];
        if a <= 0.0 {
            return Color::TRANSPARENT;
        }
        Color { r: r / a, g: g / a, b: b / a, a }
    }

    fn pixel_range(&self, lo: f32, hi: f32, max: u32) -> std::ops::Range<u32> {
        let lo = lo.floor().max(0.0) as u32;
        let hi = (hi.ceil().max(0.0) as u32).min(max);
        lo.min(hi)..hi
    }

    /// Coverage of the union of `shapes`.
    fn mask(&self, shapes: &[Shape]) -> Vec<f32> {
        let mut mask = vec![0.0f32; self.pixels.len()];
        for shape in shapes {
            let (x0, y0, x1, y1) = shape.bounds();
            for y in self.pixel_range(y0, y1, self.height) {
                for x in self.pixel_range(x0, x1, self.width) {
                    let i = (y * self.width + x) as usize;
                    mask[i] = mask[i].max(shape.coverage(x, y));
                }
            }
        }
        mask
    }

    /// The shadow of `mask`: a gaussian blur with a standard deviation of half
    /// the blur length, like `shadowBlur` on an HTML canvas.
    fn shadow_mask(&self, mask: Vec<f32>, blur: f32) -> Vec<f32> {
        let sigma = blur / 2.0;
        let Some(layer) = ImageBuffer::<Luma<f32>, _>::from_raw(self.width, self.height, mask) else {
            return Vec::new();
        };
        if sigma < 0.5 {
            return layer.into_raw();
        }
        imageops::fast_blur(&layer, sigma).into_raw()
    }

    fn composite(&mut self, i: usize, color: Color, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let src = [color.r * alpha, color.g * alpha, color.b * alpha, alpha];
        let dst = &mut self.pixels[i];
        for c in 0..4 {
            dst[c] = src[c] + dst[c] * (1.0 - alpha);
        }
    }

    /// Paint the union of `shapes` with `paint`, shadow first when one is set.
    pub fn draw(&mut self, shapes: &[Shape], paint: &Paint) {
        let mask = self.mask(shapes);
        self.fill_mask(mask, paint);
    }

    /// Paint `paint` through a per-pixel coverage mask laid out like the
    /// canvas, shadow first when one is set.
    pub fn fill_mask(&mut self, mut mask: Vec<f32>, paint: &Paint) {
        mask.resize(self.pixels.len(), 0.0);
        let width = self.width as usize;
        let global_alpha = self.global_alpha.clamp(0.0, 1.0);

        let mut colors = Vec::with_capacity(mask.len());
        for (i, coverage) in mask.iter_mut().enumerate() {
            let (x, y) = ((i % width) as f32 + 0.5, (i / width) as f32 + 0.5);
            let color = if *coverage > 0.0 {
                paint.color_at(x, y)
            } else {
                Color::TRANSPARENT
            };
            *coverage = coverage.clamp(0.0, 1.0) * color.a * global_alpha;
            colors.push(color);
        }

        if let Some(shadow) = self.shadow.filter(|s| s.color.a > 0.0) {
            let blurred = self.shadow_mask(mask.clone(), shadow.blur);
            for (i, alpha) in blurred.into_iter().enumerate() {
                self.composite(i, shadow.color, alpha * shadow.color.a);
            }
        }

        for (i, (alpha, color)) in mask.into_iter().zip(colors).enumerate() {
            self.composite(i, color, alpha);
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &Paint) {
        self.draw(
            &[Shape::Rect {
                x,
                y,
                width,
                height,
            }],
            paint,
        );
    }

    pub fn into_image(self) -> RgbaImage {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = self.pixel(x, y);
            Rgba([to_u8(c.r), to_u8(c.g), to_u8(c.b), to_u8(c.a)])
        })
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    #[test]
    fn rect_fill_is_exact_inside() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill_rect(0.0, 0.0, 8.0, 8.0, &Paint::Solid(Color::rgba(13, 20, 33, 0.18)));
        let c = canvas.pixel(3, 3);
        assert!((c.a - 0.18).abs() < 1e-6);
        assert!((c.r - 13.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn one_pixel_line_on_half_pixel_covers_exactly_one_row() {
        let mut canvas = Canvas::new(16, 16);
        canvas.draw(
            &[Shape::Segment {
                from: (0.0, 4.5),
                to: (16.0, 4.5),
                width: 1.0,
                cap: LineCap::Butt,
            }],
            &Paint::Solid(Color::WHITE),
        );
        assert_eq!(canvas.pixel(8, 4).a, 1.0);
        assert_eq!(canvas.pixel(8, 3).a, 0.0);
        assert_eq!(canvas.pixel(8, 5).a, 0.0);
    }

    #[test]
    fn round_caps_reach_past_the_end() {
        let segment = |cap| Shape::Segment {
            from: (10.0, 10.0),
            to: (20.0, 10.0),
            width: 6.0,
            cap,
        };
        let mut butt = Canvas::new(32, 32);
        butt.draw(&[segment(LineCap::Butt)], &Paint::Solid(Color::WHITE));
        let mut round = Canvas::new(32, 32);
        round.draw(&[segment(LineCap::Round)], &Paint::Solid(Color::WHITE));
        assert_eq!(butt.pixel(21, 10).a, 0.0);
        assert_eq!(round.pixel(21, 10).a, 1.0);
    }

    #[test]
    fn open_arc_leaves_a_gap() {
        let mut canvas = Canvas::new(64, 64);
        canvas.draw(
            &[Shape::Arc {
                centre: (32.0, 32.0),
                radius: 20.0,
                start: PI * 0.15,
                end: PI * 1.8,
                width: 4.0,
                cap: LineCap::Butt,
            }],
            &Paint::Solid(Color::WHITE),
        );
        // angle 0 lies in the gap, angle pi on the stroke
        assert_eq!(canvas.pixel(52, 32).a, 0.0);
        assert_eq!(canvas.pixel(12, 32).a, 1.0);
    }

    #[test]
    fn linear_gradient_hits_its_stops() {
        let paint = Paint::Linear {
            from: (0.0, 0.0),
            to: (100.0, 0.0),
            stops: vec![
                GradientStop::new(0.0, Color::hex(0x00B3FF)),
                GradientStop::new(0.5, Color::hex(0xFF1BA6)),
                GradientStop::new(1.0, Color::hex(0x00FF87)),
            ],
        };
        assert!(paint.color_at(50.0, 7.0).approx_eq(&Color::hex(0xFF1BA6)));
        assert!(paint.color_at(-5.0, 0.0).approx_eq(&Color::hex(0x00B3FF)));
        assert!(paint.color_at(150.0, 0.0).approx_eq(&Color::hex(0x00FF87)));
    }

    #[test]
    fn shadow_spreads_beyond_the_shape() {
        let mut canvas = Canvas::new(64, 64);
        canvas.shadow = Some(Shadow {
            color: Color::hex(0x00E0FF),
            blur: 12.0,
        });
        canvas.fill_rect(28.0, 28.0, 8.0, 8.0, &Paint::Solid(Color::WHITE));
        assert!(canvas.pixel(24, 32).a > 0.01);
        assert!(canvas.pixel(2, 2).a < 1e-4);
        assert!(canvas.pixel(32, 32).approx_eq(&Color::WHITE));
    }

    #[test]
    fn global_alpha_scales_coverage() {
        let mut canvas = Canvas::new(4, 4);
        canvas.global_alpha = 0.5;
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0, &Paint::Solid(Color::WHITE));
        assert!((canvas.pixel(1, 1).a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn shadow_falls_off_with_distance_and_keeps_its_colour() {
        let mut canvas = Canvas::new(96, 96);
        canvas.shadow = Some(Shadow {
            color: Color::hex(0xFF1BA6),
            blur: 16.0,
        });
        canvas.fill_rect(40.0, 40.0, 16.0, 16.0, &Paint::Solid(Color::WHITE));
        let near = canvas.pixel(37, 48);
        let far = canvas.pixel(30, 48);
        assert!(near.a > far.a);
        assert!(far.a > 0.0);
        assert!(near.r > near.b);
        // symmetric on both sides of the square
        assert!((canvas.pixel(58, 48).a - near.a).abs() < 0.02);
    }

    #[test]
    fn fill_mask_uses_fractional_coverage() {
        let mut canvas = Canvas::new(2, 1);
        canvas.fill_mask(vec![1.0, 0.25], &Paint::Solid(Color::WHITE));
        assert_eq!(canvas.pixel(0, 0).a, 1.0);
        assert!((canvas.pixel(1, 0).a - 0.25).abs() < 1e-6);
    }
}
