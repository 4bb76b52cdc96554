//! Scene graph and hierarchical scene organization.
//!
//! A scene is a tree of boxed [`SceneNode`]s. Every node owns its children,
//! stores a local [`Transform`] and caches the world matrix computed by the
//! last [`update_world_transforms`](SceneNode::update_world_transforms) pass.
//! Only [`MeshNode`]s produce draw calls; [`ContainerNode`]s group children so
//! they can be moved together.

use cgmath::{Matrix4, SquareMatrix};

use crate::{
    data_structures::transform::Transform,
    render::{DrawCommand, GeometryId, MaterialId},
};

/// The GPU handles a mesh node draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Drawable {
    pub geometry: GeometryId,
    pub material: MaterialId,
}

pub trait SceneNode {
    fn label(&self) -> &'static str;

    fn get_local_transform(&self) -> &Transform;

    fn get_local_transform_mut(&mut self) -> &mut Transform;

    fn set_local_transform(&mut self, transform: Transform) {
        *self.get_local_transform_mut() = transform;
    }

    /// World matrix as of the last transform update.
    fn get_world_transform(&self) -> Matrix4<f32>;

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.get_children_mut().push(child);
    }

    fn get_child(&self, idx: usize) -> Option<&dyn SceneNode> {
        self.get_children().get(idx).map(|child| child.as_ref())
    }

    fn get_child_mut(&mut self, idx: usize) -> Option<&mut Box<dyn SceneNode>> {
        self.get_children_mut().get_mut(idx)
    }

    fn drawable(&self) -> Option<&Drawable> {
        None
    }

    /// Recompute this node's world matrix from its parent's and recurse.
    fn update_world_transforms(&mut self, parents_world_transform: &Matrix4<f32>);

    /// Append a draw command for every drawable in this subtree, depth first.
    fn collect_draws(&self, out: &mut Vec<DrawCommand>) {
        if let Some(drawable) = self.drawable() {
            out.push(DrawCommand {
                geometry: drawable.geometry,
                material: drawable.material,
                world: self.get_world_transform(),
            });
        }
        for child in self.get_children() {
            child.collect_draws(out);
        }
    }

    /// Number of nodes in this subtree, this node included.
    fn node_count(&self) -> usize {
        1 + self
            .get_children()
            .iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }
}

/// A group without geometry of its own.
pub struct ContainerNode {
    label: &'static str,
    pub children: Vec<Box<dyn SceneNode>>,
    local: Transform,
    world: Matrix4<f32>,
}

impl ContainerNode {
    pub fn new(label: &'static str, local: Transform) -> Self {
        Self {
            label,
            children: vec![],
            local,
            world: Matrix4::identity(),
        }
    }
}

impl SceneNode for ContainerNode {
    fn label(&self) -> &'static str {
        self.label
    }

    fn get_local_transform(&self) -> &Transform {
        &self.local
    }

    fn get_local_transform_mut(&mut self) -> &mut Transform {
        &mut self.local
    }

    fn get_world_transform(&self) -> Matrix4<f32> {
        self.world
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Matrix4<f32>) {
        self.world = parents_world_transform * self.local.to_matrix();
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }
}

/// A node that draws one geometry with one material.
pub struct MeshNode {
    label: &'static str,
    drawable: Drawable,
    pub children: Vec<Box<dyn SceneNode>>,
    local: Transform,
    world: Matrix4<f32>,
}

impl MeshNode {
    pub fn new(label: &'static str, drawable: Drawable, local: Transform) -> Self {
        Self {
            label,
            drawable,
            children: vec![],
            local,
            world: Matrix4::identity(),
        }
    }
}

impl SceneNode for MeshNode {
    fn label(&self) -> &'static str {
        self.label
    }

    fn get_local_transform(&self) -> &Transform {
        &self.local
    }

    fn get_local_transform_mut(&mut self) -> &mut Transform {
        &mut self.local
    }

    fn get_world_transform(&self) -> Matrix4<f32> {
        self.world
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn drawable(&self) -> Option<&Drawable> {
        Some(&self.drawable)
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Matrix4<f32>) {
        self.world = parents_world_transform * self.local.to_matrix();
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3, Vector4};

    use super::*;

    fn mesh(label: &'static str, id: u32, local: Transform) -> Box<dyn SceneNode> {
        Box::new(MeshNode::new(
            label,
            Drawable {
                geometry: GeometryId(id),
                material: MaterialId(id),
            },
            local,
        ))
    }

    #[test]
    fn world_transforms_compose_parent_first() {
        let mut root = ContainerNode::new("root", Transform::new().with_position(1.0, 0.0, 0.0));
        let mut group = ContainerNode::new("group", Transform::new().with_position(0.0, 2.0, 0.0));
        group.add_child(mesh("leaf", 1, Transform::new().with_position(0.0, 0.0, 3.0)));
        root.add_child(Box::new(group));

        root.update_world_transforms(&Matrix4::identity());

        let leaf = root
            .get_child(0)
            .and_then(|group| group.get_child(0))
            .map(|leaf| leaf.get_world_transform() * Vector4::new(0.0, 0.0, 0.0, 1.0));
        let leaf = leaf.map(|p| p.truncate());
        assert!(leaf.is_some_and(|p| (p - Vector3::new(1.0, 2.0, 3.0)).magnitude() < 1e-6));
    }

    #[test]
    fn draws_are_collected_depth_first() {
        let mut root = ContainerNode::new("root", Transform::new());
        let mut group = ContainerNode::new("group", Transform::new());
        root.add_child(mesh("a", 1, Transform::new()));
        group.add_child(mesh("b", 2, Transform::new()));
        root.add_child(Box::new(group));
        root.add_child(mesh("c", 3, Transform::new()));

        let mut draws = Vec::new();
        root.collect_draws(&mut draws);
        let order: Vec<u32> = draws.iter().map(|d| d.geometry.0).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(root.node_count(), 5);
    }

    #[test]
    fn local_transform_edits_show_up_after_update() {
        let mut root = ContainerNode::new("root", Transform::new());
        root.add_child(mesh("a", 1, Transform::new()));
        if let Some(child) = root.get_child_mut(0) {
            child.get_local_transform_mut().position.y = 0.5;
        }
        root.update_world_transforms(&Matrix4::identity());
        let y = root.get_child(0).map(|c| c.get_world_transform().w.y);
        assert_eq!(y, Some(0.5));
    }
}
