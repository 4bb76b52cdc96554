//! The scene controller: one mounted cube, its camera and its animation.
//!
//! The controller is environment agnostic. It is told when a frame is due,
//! where the pointer is and what the viewport looks like, and it talks to the
//! GPU only through its [`RenderBackend`].

use cgmath::{Deg, Matrix4, SquareMatrix};
use rand::{SeedableRng, rngs::SmallRng};

use crate::{
    animation::{self, AnimationState, RING_SPINS},
    camera::{Camera, CameraUniform, Projection},
    config::SceneConfig,
    context::Viewport,
    cube::{self, CubeScene},
    data_structures::{color::Color, scene_graph::SceneNode},
    error::SceneError,
    input::{ContainerRect, PointerState},
    pipelines::light::LightUniform,
    render::{DrawCommand, Frame, FrameUniform, RenderBackend},
};

pub struct SceneController<B: RenderBackend> {
    backend: B,
    scene: CubeScene,
    camera: Camera,
    projection: Projection,
    light: LightUniform,
    animation: AnimationState,
    pointer: PointerState,
    viewport: Viewport,
    config: SceneConfig,
    draws: Vec<DrawCommand>,
}

impl<B: RenderBackend> SceneController<B> {
    /// Build the scene on `backend`. On failure the backend is disposed.
    pub fn new(mut backend: B, viewport: Viewport, config: SceneConfig) -> Result<Self, SceneError> {
        let mut rng = SmallRng::seed_from_u64(config.particle_seed);
        let mut scene = match cube::build(&mut backend, &config, &mut rng) {
            Ok(scene) => scene,
            Err(e) => {
                backend.dispose();
                return Err(SceneError::from_backend(e));
            }
        };
        scene.root.update_world_transforms(&Matrix4::identity());

        let camera = Camera::on_z_axis(config.camera_distance);
        let mut projection = Projection::new(1, 1, Deg(config.fov_y), config.z_near, config.z_far);
        projection.resize(viewport.width, viewport.height);
        let draws = Vec::with_capacity(scene.root.node_count());

        Ok(Self {
            backend,
            scene,
            camera,
            projection,
            light: LightUniform::new(&config.lights),
            animation: AnimationState::new(
                config.tick_step,
                config.color_cycle_period,
                config.palette.len(),
            ),
            pointer: PointerState::default(),
            viewport,
            config,
            draws,
        })
    }

    /// Advance the animation by one step and draw a frame.
    pub fn tick(&mut self) {
        let (dx, dy) = animation::root_rotation_delta(self.pointer);
        let rotation = &mut self.scene.root.get_local_transform_mut().rotation;
        rotation.x += dx;
        rotation.y += dy;

        if let Some(accent) = self.animation.advance() {
            let color = self.config.palette[accent];
            log::debug!("accent colour {} -> {:?}", accent, color);
            self.scene.apply_accent(&mut self.backend, color);
        }

        let offset = animation::particle_offset(self.animation.elapsed());
        if let Some(particles) = self.scene.particles_mut() {
            let transform = particles.get_local_transform_mut();
            transform.position.y = offset;
            transform.rotation.y += animation::PARTICLE_SPIN;
        }

        if let Some(rings) = self.scene.ring_group_mut() {
            for (i, spin) in RING_SPINS.into_iter().enumerate() {
                if let Some(ring) = rings.get_child_mut(i) {
                    ring.get_local_transform_mut().rotation.z += spin;
                }
            }
        }

        self.scene.root.update_world_transforms(&Matrix4::identity());
        self.render();
    }

    fn render(&mut self) {
        self.draws.clear();
        self.scene.root.collect_draws(&mut self.draws);
        let frame = Frame {
            uniform: FrameUniform {
                camera: CameraUniform::new(&self.camera, &self.projection),
                light: self.light,
            },
            draws: &self.draws,
        };
        if let Err(e) = self.backend.render(&frame) {
            log::error!("frame {} failed: {e:#}", self.animation.ticks());
        }
    }

    /// Record a pointer position given in client coordinates.
    pub fn pointer_move(&mut self, client: (f64, f64), rect: &ContainerRect) {
        self.pointer.update(client, rect);
    }

    /// Adopt `viewport`. Returns `false` when it equals the current one.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if viewport == self.viewport {
            return false;
        }
        log::debug!(
            "resize {}x{} @{} -> {}x{} @{}",
            self.viewport.width,
            self.viewport.height,
            self.viewport.pixel_ratio,
            viewport.width,
            viewport.height,
            viewport.pixel_ratio
        );
        self.viewport = viewport;
        self.backend.resize(&viewport);
        self.projection.resize(viewport.width, viewport.height);
        true
    }

    /// Release every resource and drop the backend.
    pub fn dispose(mut self) {
        self.scene.resources.release(&mut self.backend);
        self.backend.dispose();
    }

    pub fn root(&self) -> &dyn SceneNode {
        &self.scene.root
    }

    pub fn scene(&self) -> &CubeScene {
        &self.scene
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Colour currently shared by the edges, the glow and the inner ring.
    pub fn accent(&self) -> Color {
        self.config.palette[self.animation.palette_index()]
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
