//! Render pipelines and their uniform data.
//!
//! - `basic` builds a pipeline from a set of [`basic::PipelineParams`]
//! - `light` holds the scene lights and fog
//! - `scene` holds bind group layouts and the cached pipeline variants

pub mod basic;
pub mod light;
pub mod scene;
