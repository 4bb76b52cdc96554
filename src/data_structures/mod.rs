//! Scene data structures.
//!
//! - `color` holds sRGB colours as authored by designers
//! - `geometry` generates the procedural meshes (boxes, planes, tori, points)
//! - `material` describes how a mesh is shaded and blended
//! - `scene_graph` enables hierarchical scene organization
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `transform` holds local position, rotation and scale of nodes

pub mod color;
pub mod geometry;
pub mod material;
pub mod scene_graph;
pub mod texture;
pub mod transform;
