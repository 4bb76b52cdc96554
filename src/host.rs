//! The environment a scene is mounted into.
//!
//! A [`Host`] owns the container element (or window): it knows its size, can
//! insert and remove the drawing surface, wires DOM-style event listeners and
//! schedules refresh-synchronised frame callbacks. The callbacks themselves
//! are delivered by the host to [`MountedScene`](crate::mount::MountedScene).

use crate::{context::Viewport, error::SceneError, input::ContainerRect};

/// Events a mounted scene subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// Pointer moves over the container.
    PointerMove,
    /// Size changes of the window the container lives in.
    Resize,
}

/// Registration of one listener, needed to remove it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);

/// A scheduled frame callback, needed to revoke it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

pub trait Host {
    /// What the drawing surface is handed to the renderer as.
    type Surface;

    /// Current container size in CSS pixels.
    fn container_size(&self) -> (u32, u32);

    /// Container bounds in client coordinates.
    fn container_rect(&self) -> ContainerRect;

    fn device_pixel_ratio(&self) -> f64;

    /// Insert exactly one drawing surface into the container.
    fn attach_surface(&mut self, class_name: Option<&str>) -> Result<Self::Surface, SceneError>;

    /// Resize the drawing buffer and its on-screen box.
    fn size_surface(&mut self, viewport: &Viewport);

    /// Remove the drawing surface again. Must tolerate being called when
    /// nothing is attached.
    fn detach_surface(&mut self);

    fn listen(&mut self, event: HostEvent) -> Result<ListenerId, SceneError>;

    fn unlisten(&mut self, id: ListenerId);

    fn request_frame(&mut self) -> Result<FrameHandle, SceneError>;

    fn cancel_frame(&mut self, handle: FrameHandle);
}
