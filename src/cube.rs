//! The neon cube composition.
//!
//! [`build`] paints the textures, uploads every geometry and material through
//! a [`RenderBackend`] and assembles the scene graph:
//!
//! ```text
//! root
//! ├── glass cube
//! ├── edge outline
//! ├── glow halo
//! ├── left label
//! ├── right label
//! ├── top emblem
//! ├── ring group (tilted)
//! │   ├── inner ring
//! │   ├── middle ring
//! │   └── outer ring
//! └── particle field
//! ```
//!
//! The positions of the children are fixed and exported as constants so the
//! animation code can address them without searching.

use std::f32::consts::FRAC_PI_2;

use rand::Rng;

use crate::{
    data_structures::{
        color::Color,
        geometry::Geometry,
        material::{GlassParams, Material},
        scene_graph::{ContainerNode, Drawable, MeshNode, SceneNode},
        transform::Transform,
    },
    config::SceneConfig,
    render::{GeometryId, MaterialId, RenderBackend, TextureId},
    resources::{LABEL_TEXT, emblem_texture, label_texture},
};

pub const CUBE: usize = 0;
pub const EDGES: usize = 1;
pub const GLOW: usize = 2;
pub const LEFT_LABEL: usize = 3;
pub const RIGHT_LABEL: usize = 4;
pub const EMBLEM: usize = 5;
pub const RING_GROUP: usize = 6;
pub const PARTICLES: usize = 7;
pub const ROOT_CHILD_COUNT: usize = 8;

pub const INNER_RING: usize = 0;
pub const MIDDLE_RING: usize = 1;
pub const OUTER_RING: usize = 2;
pub const RING_COUNT: usize = 3;

const CUBE_SIZE: f32 = 2.0;
const GLOW_SCALE: f32 = 1.05;
/// Labels float just outside the faces to avoid z-fighting.
const FACE_OFFSET: f32 = 1.01;
const LABEL_SIZE: f32 = 2.02;
const RING_TILT_DEG: (f32, f32) = (24.0, -10.0);
const RING_TUBE: f32 = 0.02;
const RING_SEGMENTS: (u32, u32) = (16, 256);
const RINGS: [(f32, f32); RING_COUNT] = [(1.35, 0.35), (1.55, 0.28), (1.75, 0.22)];
const PARTICLE_SIZE: f32 = 0.025;
const PARTICLE_COLOR: Color = Color::hex(0xB4F0FF);
const PARTICLE_OPACITY: f32 = 0.7;

/// Every GPU handle allocated for one mount, released together.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResourceLedger {
    pub geometries: Vec<GeometryId>,
    pub materials: Vec<MaterialId>,
    pub textures: Vec<TextureId>,
}

impl ResourceLedger {
    fn geometry<B: RenderBackend>(&mut self, backend: &mut B, geometry: &Geometry) -> anyhow::Result<GeometryId> {
        let id = backend.create_geometry(geometry)?;
        self.geometries.push(id);
        Ok(id)
    }

    fn material<B: RenderBackend>(&mut self, backend: &mut B, material: &Material) -> anyhow::Result<MaterialId> {
        let id = backend.create_material(material)?;
        self.materials.push(id);
        Ok(id)
    }

    fn texture<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        raster: &image::RgbaImage,
        label: &str,
    ) -> anyhow::Result<TextureId> {
        let id = backend.create_texture(raster, label)?;
        self.textures.push(id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.geometries.len() + self.materials.len() + self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release everything, materials before the textures they sample.
    pub fn release<B: RenderBackend>(&mut self, backend: &mut B) {
        for id in self.materials.drain(..) {
            backend.release_material(id);
        }
        for id in self.textures.drain(..) {
            backend.release_texture(id);
        }
        for id in self.geometries.drain(..) {
            backend.release_geometry(id);
        }
    }
}

/// A material whose colour follows the palette, with its current description.
#[derive(Clone, Debug)]
pub struct CyclingMaterial {
    pub id: MaterialId,
    pub material: Material,
}

pub struct CubeScene {
    pub root: ContainerNode,
    pub resources: ResourceLedger,
    /// Edge outline, glow halo and inner ring, in that order.
    pub cycling: [CyclingMaterial; 3],
}

impl CubeScene {
    /// Recolour the cycling materials in one go.
    pub fn apply_accent<B: RenderBackend>(&mut self, backend: &mut B, color: Color) {
        for cycling in self.cycling.iter_mut() {
            cycling.material.color = color;
            backend.update_material(cycling.id, &cycling.material);
        }
    }

    pub fn ring_group_mut(&mut self) -> Option<&mut Box<dyn SceneNode>> {
        self.root.get_child_mut(RING_GROUP)
    }

    pub fn particles_mut(&mut self) -> Option<&mut Box<dyn SceneNode>> {
        self.root.get_child_mut(PARTICLES)
    }
}

fn mesh(label: &'static str, geometry: GeometryId, material: MaterialId, local: Transform) -> Box<dyn SceneNode> {
    Box::new(MeshNode::new(label, Drawable { geometry, material }, local))
}

/// Paint, upload and assemble the composition.
///
/// If anything fails, whatever was already uploaded is released before the
/// error is returned.
pub fn build<B: RenderBackend, R: Rng>(
    backend: &mut B,
    config: &SceneConfig,
    rng: &mut R,
) -> anyhow::Result<CubeScene> {
    let mut resources = ResourceLedger::default();
    match assemble(backend, config, rng, &mut resources) {
        Ok((root, cycling)) => {
            log::debug!("cube scene uploaded {} resources", resources.len());
            Ok(CubeScene {
                root,
                resources,
                cycling,
            })
        }
        Err(e) => {
            log::warn!("releasing {} resources of a failed build", resources.len());
            resources.release(backend);
            Err(e)
        }
    }
}

fn assemble<B: RenderBackend, R: Rng>(
    backend: &mut B,
    config: &SceneConfig,
    rng: &mut R,
    ledger: &mut ResourceLedger,
) -> anyhow::Result<(ContainerNode, [CyclingMaterial; 3])> {
    let accent = config.palette[0];
    let mut root = ContainerNode::new("root", Transform::new());

    let cube_geometry = ledger.geometry(backend, &Geometry::cuboid("cube", CUBE_SIZE, CUBE_SIZE, CUBE_SIZE))?;
    let glass = Material::glass(
        "glass",
        Color::hex(0x0D1421),
        0.6,
        GlassParams {
            roughness: 0.05,
            transmission: 0.9,
            thickness: 0.4,
            ior: 1.2,
            reflectivity: 0.1,
        },
    );
    let glass = ledger.material(backend, &glass)?;
    root.add_child(mesh("glass cube", cube_geometry, glass, Transform::new()));

    let edge_geometry = ledger.geometry(
        backend,
        &Geometry::cuboid_edges("edges", CUBE_SIZE, CUBE_SIZE, CUBE_SIZE),
    )?;
    let edge_material = Material::line("edges", accent, 0.95);
    let edges = ledger.material(backend, &edge_material)?;
    root.add_child(mesh("edge outline", edge_geometry, edges, Transform::new()));

    let glow_size = CUBE_SIZE * GLOW_SCALE;
    let glow_geometry = ledger.geometry(backend, &Geometry::cuboid("glow", glow_size, glow_size, glow_size))?;
    let glow_material = Material::glow("glow", accent, 0.08);
    let glow = ledger.material(backend, &glow_material)?;
    root.add_child(mesh("glow halo", glow_geometry, glow, Transform::new()));

    let size = config.texture_size;
    let label_plane = ledger.geometry(backend, &Geometry::plane("label", LABEL_SIZE, LABEL_SIZE))?;
    let left = &config.left_label;
    let left_texture = ledger.texture(
        backend,
        &label_texture(&left.text, LABEL_TEXT, left.glow, size),
        "left label",
    )?;
    let left_material = ledger.material(backend, &Material::decal("left label", left_texture))?;
    root.add_child(mesh(
        "left label",
        label_plane,
        left_material,
        Transform::new()
            .with_position(-FACE_OFFSET, 0.0, 0.0)
            .with_rotation(0.0, FRAC_PI_2, 0.0),
    ));
    let right = &config.right_label;
    let right_texture = ledger.texture(
        backend,
        &label_texture(&right.text, LABEL_TEXT, right.glow, size),
        "right label",
    )?;
    let right_material = ledger.material(backend, &Material::decal("right label", right_texture))?;
    root.add_child(mesh(
        "right label",
        label_plane,
        right_material,
        Transform::new()
            .with_position(FACE_OFFSET, 0.0, 0.0)
            .with_rotation(0.0, -FRAC_PI_2, 0.0),
    ));

    let emblem_plane = ledger.geometry(backend, &Geometry::plane("emblem", LABEL_SIZE, LABEL_SIZE))?;
    let emblem_texture = ledger.texture(backend, &emblem_texture(size), "emblem")?;
    let emblem_material = ledger.material(backend, &Material::decal("emblem", emblem_texture))?;
    root.add_child(mesh(
        "top emblem",
        emblem_plane,
        emblem_material,
        Transform::new()
            .with_position(0.0, FACE_OFFSET, 0.0)
            .with_rotation(-FRAC_PI_2, 0.0, 0.0),
    ));

    let mut ring_group = ContainerNode::new(
        "ring group",
        Transform::new().with_rotation(
            RING_TILT_DEG.0.to_radians(),
            RING_TILT_DEG.1.to_radians(),
            0.0,
        ),
    );
    let ring_labels = ["inner ring", "middle ring", "outer ring"];
    let mut inner_ring = None;
    for (i, ((radius, opacity), label)) in RINGS.into_iter().zip(ring_labels).enumerate() {
        let geometry = ledger.geometry(
            backend,
            &Geometry::torus(label, radius, RING_TUBE, RING_SEGMENTS.0, RING_SEGMENTS.1),
        )?;
        let material = Material::glow(label, config.palette[i], opacity);
        let id = ledger.material(backend, &material)?;
        if i == INNER_RING {
            inner_ring = Some(CyclingMaterial { id, material });
        }
        ring_group.add_child(mesh(label, geometry, id, Transform::new()));
    }
    root.add_child(Box::new(ring_group));

    let half = config.particle_extent / 2.0;
    let positions = (0..config.particle_count).map(|_| {
        let mut coordinate = || (rng.random::<f32>() - 0.5) * 2.0 * half;
        [coordinate(), coordinate(), coordinate()]
    });
    let particle_geometry = ledger.geometry(backend, &Geometry::points("particles", positions))?;
    let particle_material = ledger.material(
        backend,
        &Material::points("particles", PARTICLE_COLOR, PARTICLE_SIZE, PARTICLE_OPACITY),
    )?;
    root.add_child(mesh("particle field", particle_geometry, particle_material, Transform::new()));

    let inner_ring = inner_ring.ok_or_else(|| anyhow::anyhow!("inner ring was not built"))?;
    let cycling = [
        CyclingMaterial {
            id: edges,
            material: edge_material,
        },
        CyclingMaterial {
            id: glow,
            material: glow_material,
        },
        inner_ring,
    ];
    Ok((root, cycling))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    #[test]
    fn ring_table_is_ordered_inside_out() {
        assert!(RINGS.windows(2).all(|pair| pair[0].0 < pair[1].0));
        assert!(RINGS.windows(2).all(|pair| pair[0].1 > pair[1].1));
    }

    #[test]
    fn seeded_particles_are_reproducible() {
        let sample = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            (0..4).map(|_| rng.random::<f32>()).collect::<Vec<_>>()
        };
        assert_eq!(sample(7), sample(7));
        assert_ne!(sample(7), sample(8));
    }
}
