//! Desktop preview: the scene in a winit window.
//!
//! The window plays the role of the container. Window events arrive at the
//! [`ApplicationHandler`] and are forwarded to the mounted scene only while it
//! listens for them, the same way the browser host delivers DOM events.

use std::{collections::HashMap, sync::Arc};

use tokio::runtime::Runtime;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    config::{MountOptions, SceneConfig},
    context::{Viewport, WgpuBackend},
    error::SceneError,
    host::{FrameHandle, Host, HostEvent, ListenerId},
    input::ContainerRect,
    mount::{MountedScene, mount},
};

const PREVIEW_SIZE: f64 = 420.0;

pub struct WindowHost {
    window: Arc<Window>,
    attached: bool,
    listeners: HashMap<ListenerId, HostEvent>,
    next_listener: u32,
    next_frame: i32,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            attached: false,
            listeners: HashMap::new(),
            next_listener: 0,
            next_frame: 0,
        }
    }

    pub fn listens_to(&self, event: HostEvent) -> bool {
        self.listeners.values().any(|e| *e == event)
    }

    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }
}

impl Host for WindowHost {
    type Surface = wgpu::SurfaceTarget<'static>;

    fn container_size(&self) -> (u32, u32) {
        let size: LogicalSize<u32> = self.window.inner_size().to_logical(self.window.scale_factor());
        (size.width, size.height)
    }

    fn container_rect(&self) -> ContainerRect {
        let (width, height) = self.container_size();
        ContainerRect {
            left: 0.0,
            top: 0.0,
            width: width as f64,
            height: height as f64,
        }
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.scale_factor()
    }

    fn attach_surface(&mut self, class_name: Option<&str>) -> Result<Self::Surface, SceneError> {
        if self.attached {
            return Err(SceneError::Host("window already has a surface".into()));
        }
        if let Some(class_name) = class_name {
            log::debug!("ignoring surface class {class_name:?} in a native window");
        }
        self.attached = true;
        Ok(self.window.clone().into())
    }

    fn size_surface(&mut self, _viewport: &Viewport) {
        // The window already has the size the viewport was derived from.
    }

    fn detach_surface(&mut self) {
        self.attached = false;
    }

    fn listen(&mut self, event: HostEvent) -> Result<ListenerId, SceneError> {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(id, event);
        Ok(id)
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn request_frame(&mut self) -> Result<FrameHandle, SceneError> {
        self.next_frame = self.next_frame.wrapping_add(1);
        self.window.request_redraw();
        Ok(FrameHandle(self.next_frame))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        // A requested redraw cannot be revoked; the scene ignores it instead.
        log::trace!("frame {} cancelled", handle.0);
    }
}

struct PreviewApp {
    async_runtime: Runtime,
    config: Option<SceneConfig>,
    scene: Option<MountedScene<WindowHost, WgpuBackend>>,
    error: Option<SceneError>,
}

impl PreviewApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SceneError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for PreviewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };
        let attributes = Window::default_attributes()
            .with_title("neon cube")
            .with_inner_size(LogicalSize::new(PREVIEW_SIZE, PREVIEW_SIZE));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, SceneError::Host(e.to_string())),
        };

        let options = MountOptions {
            class_name: None,
            config,
        };
        let mounted = self
            .async_runtime
            .block_on(mount::<_, WgpuBackend>(WindowHost::new(window), options));
        match mounted {
            Ok(scene) => self.scene = Some(scene),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if scene.host().listens_to(HostEvent::Resize) {
                    scene.on_resize();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if scene.host().listens_to(HostEvent::PointerMove) {
                    let logical = position.to_logical::<f64>(scene.host().scale_factor());
                    scene.on_pointer_move((logical.x, logical.y));
                }
            }
            WindowEvent::RedrawRequested => {
                if scene.frame_pending() {
                    scene.on_frame();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(scene) = self.scene.take() {
            scene.unmount();
        }
    }
}

/// Open a window showing the scene until it is closed.
pub fn run_preview(config: SceneConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }

    let event_loop = EventLoop::new()?;
    let mut app = PreviewApp {
        async_runtime: Runtime::new()?,
        config: Some(config),
        scene: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
