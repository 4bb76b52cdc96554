//! Procedurally painted textures.
//!
//! Every raster the scene shows is painted here once per mount, on a
//! [`canvas::Canvas`], and then uploaded unchanged. All measurements are
//! authored for a 512 px canvas and scale linearly with the requested size.

use std::f32::consts::PI;

use image::RgbaImage;

use crate::{
    data_structures::color::Color,
    resources::canvas::{Canvas, GradientStop, LineCap, Paint, Shadow, Shape},
};

pub mod canvas;
pub mod text;

/// Canvas size every measurement below is authored for.
const REFERENCE_SIZE: f32 = 512.0;

/// Base colour of label text.
pub const LABEL_TEXT: Color = Color::hex(0xEFFFFF);

/// Diagonal three-colour accent shared by the labels and the emblem.
fn accent_gradient(size: f32) -> Paint {
    Paint::Linear {
        from: (0.0, 0.0),
        to: (size, size),
        stops: vec![
            GradientStop::new(0.0, Color::hex(0x00B3FF)),
            GradientStop::new(0.5, Color::hex(0xFF1BA6)),
            GradientStop::new(1.0, Color::hex(0x00FF87)),
        ],
    }
}

/// A square label: faint scanlines, glowing centred text and two accent streaks.
pub fn label_texture(text: &str, base: Color, glow: Color, size: u32) -> RgbaImage {
    let mut canvas = Canvas::new(size, size);
    let px = canvas.width() as f32;
    let s = px / REFERENCE_SIZE;

    canvas.fill_rect(0.0, 0.0, px, px, &Paint::Solid(Color::rgba(13, 20, 33, 0.18)));

    let spacing = (32.0 * s).max(1.0);
    let scanlines: Vec<Shape> = (0..)
        .map(|i| i as f32 * spacing)
        .take_while(|&y| y < px)
        .map(|y| Shape::Segment {
            from: (0.0, y + 0.5),
            to: (px, y + 0.5),
            width: 1.0,
            cap: LineCap::Butt,
        })
        .collect();
    canvas.draw(&scanlines, &Paint::Solid(Color::rgba(180, 240, 255, 0.1)));

    canvas.shadow = Some(Shadow {
        color: glow,
        blur: 40.0 * s,
    });
    text::fill_text(
        &mut canvas,
        text,
        (px / 2.0, px / 2.0),
        140.0 * s,
        px * 0.86,
        &Paint::Solid(base),
    );
    canvas.shadow = None;

    canvas.global_alpha = 0.5;
    let streak = |x0: f32, x1: f32, y: f32| Shape::Segment {
        from: (x0, y),
        to: (x1, y),
        width: 6.0 * s,
        cap: LineCap::Butt,
    };
    canvas.draw(
        &[
            streak(60.0 * s, px - 60.0 * s, px * 0.25),
            streak(100.0 * s, px - 100.0 * s, px * 0.75),
        ],
        &accent_gradient(px),
    );
    canvas.global_alpha = 1.0;

    canvas.into_image()
}

/// The top-face emblem: a soft radial glow behind an open ring with a notch.
pub fn emblem_texture(size: u32) -> RgbaImage {
    let mut canvas = Canvas::new(size, size);
    let px = canvas.width() as f32;
    let s = px / REFERENCE_SIZE;
    let centre = (px / 2.0, px / 2.0);

    canvas.draw(
        &[Shape::Disc {
            centre,
            radius: px * 0.45,
        }],
        &Paint::Radial {
            centre,
            inner: 10.0 * s,
            outer: px / 2.0,
            stops: vec![
                GradientStop::new(0.0, Color::rgba(0, 179, 255, 0.25)),
                GradientStop::new(1.0, Color::rgba(0, 179, 255, 0.0)),
            ],
        },
    );

    canvas.shadow = Some(Shadow {
        color: Color::hex(0x00E0FF),
        blur: 22.0 * s,
    });
    canvas.draw(
        &[Shape::Arc {
            centre,
            radius: px * 0.22,
            start: PI * 0.15,
            end: PI * 1.8,
            width: 46.0 * s,
            cap: LineCap::Round,
        }],
        &accent_gradient(px),
    );
    canvas.shadow = None;

    canvas.draw(
        &[Shape::Segment {
            from: (px * 0.64, px * 0.52),
            to: (px * 0.78, px * 0.52),
            width: 36.0 * s,
            cap: LineCap::Round,
        }],
        &accent_gradient(px),
    );

    canvas.into_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha(image: &RgbaImage, x: u32, y: u32) -> u8 {
        image.get_pixel(x, y).0[3]
    }

    #[test]
    fn label_has_scanlines_and_centred_ink() {
        let label = label_texture("Azure", LABEL_TEXT, Color::hex(0x00B3FF), 128);
        assert_eq!(label.dimensions(), (128, 128));
        // scanline rows are denser than the rows between them
        assert!(alpha(&label, 2, 0) > alpha(&label, 2, 3));
        // text sits in the middle and is almost opaque
        assert!(alpha(&label, 64, 64) > 200 || (50..78).any(|x| alpha(&label, x, 64) > 200));
    }

    /// Leftmost pixel of the label's text ink, away from the scanline rows.
    fn leftmost_ink(image: &RgbaImage) -> (u32, u32) {
        let is_ink = |x: u32, y: u32| image.get_pixel(x, y).0.iter().all(|&c| c > 215);
        let (w, h) = image.dimensions();
        (0..w)
            .flat_map(|x| (0..h).map(move |y| (x, y)))
            .find(|&(x, y)| y % 8 != 0 && is_ink(x, y))
            .unwrap()
    }

    #[test]
    fn label_glow_tints_the_surroundings() {
        let blue = label_texture("Azure", LABEL_TEXT, Color::hex(0x00B3FF), 128);
        let pink = label_texture("Azure", LABEL_TEXT, Color::hex(0xFF1BA6), 128);

        let (x, y) = leftmost_ink(&blue);
        assert_eq!(leftmost_ink(&pink), (x, y));
        assert!(x >= 3);
        let halo = (x - 3, y);

        let [r, _, b, a] = blue.get_pixel(halo.0, halo.1).0;
        assert!(a > 30);
        assert!(b > r);
        let [r, _, b, a] = pink.get_pixel(halo.0, halo.1).0;
        assert!(a > 30);
        assert!(r > b);
    }

    #[test]
    fn label_keeps_letter_case() {
        let mixed = label_texture("Azure", LABEL_TEXT, Color::hex(0x00B3FF), 128);
        let upper = label_texture("AZURE", LABEL_TEXT, Color::hex(0x00B3FF), 128);
        assert_ne!(mixed.as_raw(), upper.as_raw());
    }

    #[test]
    fn emblem_ring_is_open_on_the_right() {
        let size = 256;
        let emblem = emblem_texture(size);
        let r = (size as f32 * 0.22) as u32;
        let (cx, cy) = (size / 2, size / 2);
        // the notch bar sits inside the gap on the right
        assert!(alpha(&emblem, (size as f32 * 0.71) as u32, (size as f32 * 0.52) as u32) > 200);
        // left side of the ring is solid
        assert!(alpha(&emblem, cx - r, cy) > 200);
        // corners stay transparent
        assert_eq!(alpha(&emblem, 0, 0), 0);
    }

    #[test]
    fn textures_scale_with_size() {
        assert_eq!(emblem_texture(64).dimensions(), (64, 64));
        assert_eq!(label_texture("A", LABEL_TEXT, Color::WHITE, 0).dimensions(), (1, 1));
    }
}
