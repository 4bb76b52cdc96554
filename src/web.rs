//! Browser host: mounts the scene into a DOM element.
//!
//! The mounted scene lives in an `Rc<RefCell<Option<_>>>`. Every DOM callback
//! only holds a `Weak` reference to it, so taking the scene out of the cell at
//! teardown is enough to stop all further work.

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
};

use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{EventTarget, HtmlCanvasElement, HtmlElement};

use crate::{
    config::{MountOptions, SceneConfig},
    context::{Viewport, WgpuBackend},
    error::SceneError,
    host::{FrameHandle, Host, HostEvent, ListenerId},
    input::ContainerRect,
    mount::{MountedScene, mount},
};

type SharedScene = Rc<RefCell<Option<MountedScene<WebHost, WgpuBackend>>>>;
type WeakScene = Weak<RefCell<Option<MountedScene<WebHost, WgpuBackend>>>>;

fn js_error(context: &str, value: JsValue) -> SceneError {
    SceneError::Host(format!("{context}: {value:?}"))
}

/// Run `f` on the mounted scene if it is still alive and not already borrowed.
fn with_scene(scene: &WeakScene, f: impl FnOnce(&mut MountedScene<WebHost, WgpuBackend>)) {
    let Some(cell) = scene.upgrade() else {
        return;
    };
    let Ok(mut guard) = cell.try_borrow_mut() else {
        log::warn!("scene busy, dropping callback");
        return;
    };
    if let Some(scene) = guard.as_mut() {
        f(scene);
    }
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

pub struct WebHost {
    window: web_sys::Window,
    container: HtmlElement,
    canvas: Option<HtmlCanvasElement>,
    scene: WeakScene,
    frame_callback: Closure<dyn FnMut(f64)>,
    listeners: HashMap<ListenerId, Listener>,
    next_listener: u32,
}

impl WebHost {
    fn new(container: HtmlElement, scene: WeakScene) -> Result<Self, SceneError> {
        let window = web_sys::window().ok_or_else(|| SceneError::Host("no window".into()))?;
        let weak = scene.clone();
        let frame_callback = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            with_scene(&weak, |scene| scene.on_frame());
        });
        Ok(Self {
            window,
            container,
            canvas: None,
            scene,
            frame_callback,
            listeners: HashMap::new(),
            next_listener: 0,
        })
    }
}

impl Host for WebHost {
    type Surface = wgpu::SurfaceTarget<'static>;

    fn container_size(&self) -> (u32, u32) {
        (
            self.container.client_width().max(0) as u32,
            self.container.client_height().max(0) as u32,
        )
    }

    fn container_rect(&self) -> ContainerRect {
        let rect = self.container.get_bounding_client_rect();
        ContainerRect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn attach_surface(&mut self, class_name: Option<&str>) -> Result<Self::Surface, SceneError> {
        let document = self
            .window
            .document()
            .ok_or_else(|| SceneError::Host("no document".into()))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|e| js_error("creating canvas", e))?
            .dyn_into()
            .map_err(|_| SceneError::Host("canvas element has the wrong type".into()))?;
        if let Some(class_name) = class_name {
            canvas.set_class_name(class_name);
        }
        canvas
            .style()
            .set_property("display", "block")
            .map_err(|e| js_error("styling canvas", e))?;
        self.container
            .append_child(&canvas)
            .map_err(|e| js_error("inserting canvas", e))?;
        self.canvas = Some(canvas.clone());
        Ok(wgpu::SurfaceTarget::Canvas(canvas))
    }

    fn size_surface(&mut self, viewport: &Viewport) {
        let Some(canvas) = &self.canvas else {
            return;
        };
        canvas.set_width(viewport.physical_width);
        canvas.set_height(viewport.physical_height);
        let style = canvas.style();
        let sized = style
            .set_property("width", &format!("{}px", viewport.width))
            .and_then(|_| style.set_property("height", &format!("{}px", viewport.height)));
        if let Err(e) = sized {
            log::warn!("could not size canvas: {e:?}");
        }
    }

    fn detach_surface(&mut self) {
        if let Some(canvas) = self.canvas.take() {
            canvas.remove();
        }
    }

    fn listen(&mut self, event: HostEvent) -> Result<ListenerId, SceneError> {
        let weak = self.scene.clone();
        let (target, name, callback): (EventTarget, &'static str, Closure<dyn FnMut(web_sys::Event)>) =
            match event {
                HostEvent::PointerMove => (
                    self.container.clone().into(),
                    "pointermove",
                    Closure::new(move |event: web_sys::Event| {
                        if let Some(event) = event.dyn_ref::<web_sys::MouseEvent>() {
                            let client = (event.client_x() as f64, event.client_y() as f64);
                            with_scene(&weak, |scene| scene.on_pointer_move(client));
                        }
                    }),
                ),
                HostEvent::Resize => (
                    self.window.clone().into(),
                    "resize",
                    Closure::new(move |_event: web_sys::Event| {
                        with_scene(&weak, |scene| scene.on_resize());
                    }),
                ),
            };
        target
            .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
            .map_err(|e| js_error(name, e))?;

        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(
            id,
            Listener {
                target,
                event: name,
                callback,
            },
        );
        Ok(id)
    }

    fn unlisten(&mut self, id: ListenerId) {
        let Some(listener) = self.listeners.remove(&id) else {
            return;
        };
        if let Err(e) = listener
            .target
            .remove_event_listener_with_callback(listener.event, listener.callback.as_ref().unchecked_ref())
        {
            log::warn!("could not remove {} listener: {e:?}", listener.event);
        }
    }

    fn request_frame(&mut self) -> Result<FrameHandle, SceneError> {
        self.window
            .request_animation_frame(self.frame_callback.as_ref().unchecked_ref())
            .map(FrameHandle)
            .map_err(|e| js_error("requestAnimationFrame", e))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0) {
            log::warn!("could not cancel frame {}: {e:?}", handle.0);
        }
    }
}

/// Handle returned to JavaScript. Call `teardown()` when the container leaves
/// the page.
#[wasm_bindgen]
pub struct CubeSceneHandle {
    scene: SharedScene,
}

#[wasm_bindgen]
impl CubeSceneHandle {
    /// Unmount the scene. Further calls do nothing.
    pub fn teardown(&self) {
        let scene = self.scene.borrow_mut().take();
        if let Some(scene) = scene {
            scene.unmount();
        }
    }
}

/// Mount a neon cube scene into `container`.
#[wasm_bindgen(js_name = mountCubeScene)]
pub async fn mount_cube_scene(
    container: HtmlElement,
    class_name: Option<String>,
) -> Result<CubeSceneHandle, JsValue> {
    // A second mount finds the logger already installed.
    let _ = console_log::init_with_level(log::Level::Info);

    let shared: SharedScene = Rc::new(RefCell::new(None));
    let host = WebHost::new(container, Rc::downgrade(&shared)).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let config = SceneConfig {
        particle_seed: (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64,
        ..SceneConfig::default()
    };
    let scene = mount::<_, WgpuBackend>(host, MountOptions { class_name, config })
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    *shared.borrow_mut() = Some(scene);
    Ok(CubeSceneHandle { scene: shared })
}
