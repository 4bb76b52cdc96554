//! Scene lighting and fog.
//!
//! The scene has no light geometry; lights only exist as uniform data that is
//! uploaded together with the camera once per frame.

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::color::Color;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Hemisphere sky colour, premultiplied by intensity. `w` is unused.
    pub sky: [f32; 4],
    /// Hemisphere ground colour, premultiplied by intensity.
    pub ground: [f32; 4],
    /// Directional key light colour, premultiplied by intensity.
    pub key_color: [f32; 4],
    /// Normalised direction *towards* the key light.
    pub key_direction: [f32; 4],
    /// Fog colour in `xyz`, exponential-squared density in `w`.
    pub fog: [f32; 4],
}

/// Sky/ground fill light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HemisphereLight {
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

/// Light arriving from a far away point, like the sun.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vector3<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub density: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lights {
    pub hemisphere: HemisphereLight,
    pub key: DirectionalLight,
    pub fog: Fog,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            hemisphere: HemisphereLight {
                sky: Color::hex(0xB4F0FF),
                ground: Color::hex(0xFFC6B7),
                intensity: 0.7,
            },
            key: DirectionalLight {
                color: Color::hex(0xFF1BA6),
                intensity: 1.0,
                position: Vector3::new(5.0, 6.0, 5.0),
            },
            fog: Fog {
                color: Color::hex(0x0B1120),
                density: 0.016,
            },
        }
    }
}

fn scaled(color: Color, intensity: f32) -> [f32; 4] {
    let [r, g, b, _] = color.to_linear();
    [r * intensity, g * intensity, b * intensity, 0.0]
}

impl LightUniform {
    pub fn new(lights: &Lights) -> Self {
        let direction = if lights.key.position.magnitude2() > 0.0 {
            lights.key.position.normalize()
        } else {
            Vector3::unit_y()
        };
        let [fr, fg, fb, _] = lights.fog.color.to_linear();
        Self {
            sky: scaled(lights.hemisphere.sky, lights.hemisphere.intensity),
            ground: scaled(lights.hemisphere.ground, lights.hemisphere.intensity),
            key_color: scaled(lights.key.color, lights.key.intensity),
            key_direction: direction.extend(0.0).into(),
            fog: [fr, fg, fb, lights.fog.density],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_direction_is_normalised() {
        let uniform = LightUniform::new(&Lights::default());
        let [x, y, z, w] = uniform.key_direction;
        assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-6);
        assert_eq!(w, 0.0);
    }

    #[test]
    fn fog_density_travels_in_w() {
        let uniform = LightUniform::new(&Lights::default());
        assert_eq!(uniform.fog[3], 0.016);
    }

    #[test]
    fn intensity_scales_colour() {
        let mut lights = Lights::default();
        lights.hemisphere.intensity = 0.0;
        let uniform = LightUniform::new(&lights);
        assert_eq!(uniform.sky, [0.0; 4]);
        assert_eq!(uniform.ground, [0.0; 4]);
    }
}
