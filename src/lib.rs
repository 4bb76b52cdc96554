//! neon-cube
//!
//! A decorative 3D scene for a portfolio hero section: a dark glass cube with
//! neon edges, two labelled side faces, an emblem on top, three orbiting rings
//! and a drifting particle field. The scene follows the pointer and cycles its
//! accent colour.
//!
//! In the browser the crate is loaded as a wasm module and the page calls
//! `mountCubeScene(container, className)`; the returned handle's `teardown()`
//! removes everything again. Natively, [`native::run_preview`] shows the same
//! scene in a window.
//!
//! High-level modules
//! - `animation`: per-tick motion and the colour cycle clock
//! - `camera`: fixed perspective camera and its uniform
//! - `config`: tunables of the scene and mount options
//! - `context`: viewport sizing and the wgpu render backend
//! - `controller`: one scene instance driven frame by frame
//! - `cube`: builds the object graph and owns its GPU resources
//! - `data_structures`: colours, transforms, geometry, materials, scene graph
//! - `host`: the environment a scene is mounted into
//! - `mount`: mounting, event wiring and teardown
//! - `pipelines`: shaders, uniforms and pipeline construction
//! - `render`: the backend trait and per-frame draw list
//! - `resources`: procedural label and emblem textures
//!

pub mod animation;
pub mod camera;
pub mod config;
pub mod context;
pub mod controller;
pub mod cube;
pub mod data_structures;
pub mod error;
pub mod host;
pub mod input;
pub mod mount;
pub mod pipelines;
pub mod render;
pub mod resources;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{LabelConfig, MountOptions, SceneConfig};
pub use controller::SceneController;
pub use error::SceneError;
pub use mount::{MountedScene, mount};
