//! Mounting and unmounting a scene in a [`Host`].

use crate::{
    config::MountOptions,
    context::viewport_for,
    controller::SceneController,
    error::SceneError,
    host::{FrameHandle, Host, HostEvent, ListenerId},
    render::RenderBackend,
};

/// A live scene inside its host.
///
/// The host forwards frame callbacks and events to [`on_frame`](Self::on_frame),
/// [`on_pointer_move`](Self::on_pointer_move) and [`on_resize`](Self::on_resize).
pub struct MountedScene<H, B>
where
    H: Host,
    B: RenderBackend<Surface = H::Surface>,
{
    host: H,
    controller: SceneController<B>,
    listeners: Vec<ListenerId>,
    frame: Option<FrameHandle>,
    max_pixel_ratio: f32,
}

/// Set up the renderer in `host`, build the scene, subscribe to pointer and
/// resize events and schedule the first frame.
///
/// Only acquiring the GPU device is asynchronous. If any step fails the
/// surface is removed from the container again before the error is returned.
pub async fn mount<H, B>(mut host: H, options: MountOptions) -> Result<MountedScene<H, B>, SceneError>
where
    H: Host,
    B: RenderBackend<Surface = H::Surface>,
{
    let MountOptions { class_name, config } = options;
    let viewport = viewport_for(
        host.container_size(),
        host.device_pixel_ratio(),
        config.max_pixel_ratio,
    );
    if viewport.is_degenerate() {
        log::warn!(
            "mounting into an empty {}x{} container",
            viewport.width,
            viewport.height
        );
    }

    let surface = host.attach_surface(class_name.as_deref())?;
    host.size_surface(&viewport);
    let backend = match B::create(surface, &viewport).await {
        Ok(backend) => backend,
        Err(e) => {
            host.detach_surface();
            return Err(SceneError::from_backend(e));
        }
    };
    let max_pixel_ratio = config.max_pixel_ratio;
    let controller = match SceneController::new(backend, viewport, config) {
        Ok(controller) => controller,
        Err(e) => {
            host.detach_surface();
            return Err(e);
        }
    };

    let mut scene = MountedScene {
        host,
        controller,
        listeners: Vec::with_capacity(2),
        frame: None,
        max_pixel_ratio,
    };
    if let Err(e) = scene.start() {
        scene.unmount();
        return Err(e);
    }
    log::info!(
        "cube scene mounted at {}x{} (pixel ratio {})",
        viewport.width,
        viewport.height,
        viewport.pixel_ratio
    );
    Ok(scene)
}

impl<H, B> MountedScene<H, B>
where
    H: Host,
    B: RenderBackend<Surface = H::Surface>,
{
    fn start(&mut self) -> Result<(), SceneError> {
        for event in [HostEvent::PointerMove, HostEvent::Resize] {
            let id = self.host.listen(event)?;
            self.listeners.push(id);
        }
        self.frame = Some(self.host.request_frame()?);
        Ok(())
    }

    /// A scheduled frame fired: animate, draw and schedule the next one.
    pub fn on_frame(&mut self) {
        self.frame = None;
        self.controller.tick();
        match self.host.request_frame() {
            Ok(handle) => self.frame = Some(handle),
            Err(e) => log::error!("could not schedule the next frame: {e}"),
        }
    }

    pub fn on_pointer_move(&mut self, client: (f64, f64)) {
        let rect = self.host.container_rect();
        self.controller.pointer_move(client, &rect);
    }

    /// Re-read the container size. Unchanged sizes are ignored.
    pub fn on_resize(&mut self) {
        let viewport = viewport_for(
            self.host.container_size(),
            self.host.device_pixel_ratio(),
            self.max_pixel_ratio,
        );
        if viewport == self.controller.viewport() {
            return;
        }
        self.host.size_surface(&viewport);
        self.controller.resize(viewport);
    }

    /// Stop the loop, remove listeners, release every resource and remove the
    /// surface. Hands the host back.
    pub fn unmount(self) -> H {
        let MountedScene {
            mut host,
            controller,
            listeners,
            frame,
            ..
        } = self;
        if let Some(frame) = frame {
            host.cancel_frame(frame);
        }
        for id in listeners {
            host.unlisten(id);
        }
        controller.dispose();
        host.detach_surface();
        log::info!("cube scene unmounted");
        host
    }

    pub fn controller(&self) -> &SceneController<B> {
        &self.controller
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Whether a frame callback is currently scheduled.
    pub fn frame_pending(&self) -> bool {
        self.frame.is_some()
    }
}
