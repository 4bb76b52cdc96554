//! sRGB colours with straight (non-premultiplied) alpha.
//!
//! Colours are authored the way a designer writes them (`#00B3FF`,
//! `rgba(13, 20, 33, 0.18)`) and converted to linear space only when they are
//! packed into GPU uniforms.

/// An sRGB colour with straight alpha, every channel in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);
    pub const WHITE: Color = Color::hex(0xFFFFFF);

    /// Opaque colour from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as f32 / 255.0,
            g: ((rgb >> 8) & 0xFF) as f32 / 255.0,
            b: (rgb & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Colour from 8-bit channels and a fractional alpha, like CSS `rgba()`.
    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Channel-wise interpolation in sRGB space, as 2D canvas gradients do.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Linear-light RGB with alpha untouched, for shader uniforms.
    pub fn to_linear(self) -> [f32; 4] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            self.a,
        ]
    }

    pub fn approx_eq(&self, other: &Color) -> bool {
        const EPS: f32 = 1e-6;
        (self.r - other.r).abs() < EPS
            && (self.g - other.g).abs() < EPS
            && (self.b - other.b).abs() < EPS
            && (self.a - other.a).abs() < EPS
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_splits_channels() {
        let c = Color::hex(0x00B3FF);
        assert_eq!(c.r, 0.0);
        assert!((c.g - 179.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 1.0);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        let [r, g, b, a] = Color::rgba(0, 255, 0, 0.5).to_linear();
        assert_eq!(r, 0.0);
        assert!((g - 1.0).abs() < 1e-6);
        assert_eq!(b, 0.0);
        assert_eq!(a, 0.5);
    }

    #[test]
    fn lerp_clamps_parameter() {
        let a = Color::hex(0x000000);
        let b = Color::hex(0xFFFFFF);
        assert!(a.lerp(b, 2.0).approx_eq(&b));
        assert!(a.lerp(b, -1.0).approx_eq(&a));
    }
}
