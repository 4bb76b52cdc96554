//! Tunables of the scene.
//!
//! [`SceneConfig::default`] reproduces the look of the portfolio hero; hosts
//! normally only change the labels or the particle seed.

use std::time::Duration;

use crate::{data_structures::color::Color, pipelines::light::Lights};

/// Text and glow colour of one side label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelConfig {
    pub text: String,
    pub glow: Color,
}

impl LabelConfig {
    pub fn new(text: impl Into<String>, glow: Color) -> Self {
        Self {
            text: text.into(),
            glow,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Distance of the camera from the origin along +Z.
    pub camera_distance: f32,
    /// Upper bound for the device pixel ratio.
    pub max_pixel_ratio: f32,
    /// Edge length of every generated texture in pixels.
    pub texture_size: u32,
    pub left_label: LabelConfig,
    pub right_label: LabelConfig,
    /// Accent colours cycled through by the edges, the glow and the inner ring.
    pub palette: [Color; 3],
    /// Elapsed time between two palette steps.
    pub color_cycle_period: Duration,
    /// Nominal duration of one animation tick.
    pub tick_step: Duration,
    pub particle_count: usize,
    /// Edge length of the cube the particles are scattered in.
    pub particle_extent: f32,
    pub particle_seed: u64,
    pub lights: Lights,
}

pub const NEON_BLUE: Color = Color::hex(0x00B3FF);
pub const NEON_PINK: Color = Color::hex(0xFF1BA6);
pub const NEON_GREEN: Color = Color::hex(0x00FF87);

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov_y: 50.0,
            z_near: 0.1,
            z_far: 1000.0,
            camera_distance: 6.0,
            max_pixel_ratio: 2.0,
            texture_size: 512,
            left_label: LabelConfig::new("Azure", NEON_BLUE),
            right_label: LabelConfig::new("Gemini", NEON_PINK),
            palette: [NEON_BLUE, NEON_PINK, NEON_GREEN],
            color_cycle_period: Duration::from_millis(500),
            tick_step: Duration::from_nanos(16_666_667),
            particle_count: 400,
            particle_extent: 1.8,
            particle_seed: 0x6E65_6F6E,
            lights: Lights::default(),
        }
    }
}

/// What a host passes when mounting a scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MountOptions {
    /// Extra CSS class for the drawing surface.
    pub class_name: Option<String>,
    pub config: SceneConfig,
}
