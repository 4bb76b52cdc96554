#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use neon_cube::{
    config::{MountOptions, SceneConfig},
    context::Viewport,
    data_structures::{color::Color, geometry::Geometry, material::Material},
    error::SceneError,
    host::{FrameHandle, Host, HostEvent, ListenerId},
    input::ContainerRect,
    mount::{MountedScene, mount},
    render::{Frame, GeometryId, MaterialId, RenderBackend, TextureId},
};

/// Everything the fake backend observed, shared with the test.
#[derive(Debug, Default)]
pub struct BackendLog {
    pub created: bool,
    pub disposed: bool,
    pub creations: usize,
    pub geometries: HashSet<GeometryId>,
    pub textures: HashSet<TextureId>,
    pub materials: HashMap<MaterialId, Material>,
    pub material_updates: Vec<(MaterialId, Color)>,
    pub texture_sizes: Vec<(u32, u32)>,
    pub resizes: Vec<Viewport>,
    pub frames: usize,
    pub last_draw_count: usize,
    /// Refuse to acquire a device.
    pub fail_create: bool,
    /// Fail the creation of the n-th resource (zero based).
    pub fail_at_creation: Option<usize>,
}

impl BackendLog {
    pub fn live_resources(&self) -> usize {
        self.geometries.len() + self.textures.len() + self.materials.len()
    }

    pub fn color_of(&self, id: MaterialId) -> Color {
        self.materials[&id].color
    }
}

#[derive(Clone)]
pub struct FakeSurface {
    pub log: Rc<RefCell<BackendLog>>,
}

pub struct FakeBackend {
    log: Rc<RefCell<BackendLog>>,
    next_id: u32,
}

impl FakeBackend {
    fn allocate(&mut self) -> anyhow::Result<u32> {
        let mut log = self.log.borrow_mut();
        if log.fail_at_creation == Some(log.creations) {
            anyhow::bail!("allocation {} refused", log.creations);
        }
        log.creations += 1;
        self.next_id += 1;
        Ok(self.next_id)
    }
}

impl RenderBackend for FakeBackend {
    type Surface = FakeSurface;

    async fn create(surface: FakeSurface, viewport: &Viewport) -> anyhow::Result<Self> {
        {
            let mut log = surface.log.borrow_mut();
            if log.fail_create {
                return Err(SceneError::NoAdapter.into());
            }
            log.created = true;
            log.resizes.push(*viewport);
        }
        Ok(Self {
            log: surface.log,
            next_id: 0,
        })
    }

    fn resize(&mut self, viewport: &Viewport) {
        self.log.borrow_mut().resizes.push(*viewport);
    }

    fn create_geometry(&mut self, _geometry: &Geometry) -> anyhow::Result<GeometryId> {
        let id = GeometryId(self.allocate()?);
        self.log.borrow_mut().geometries.insert(id);
        Ok(id)
    }

    fn create_texture(&mut self, raster: &image::RgbaImage, _label: &str) -> anyhow::Result<TextureId> {
        let id = TextureId(self.allocate()?);
        let mut log = self.log.borrow_mut();
        log.textures.insert(id);
        log.texture_sizes.push(raster.dimensions());
        Ok(id)
    }

    fn create_material(&mut self, material: &Material) -> anyhow::Result<MaterialId> {
        let id = MaterialId(self.allocate()?);
        self.log.borrow_mut().materials.insert(id, material.clone());
        Ok(id)
    }

    fn update_material(&mut self, id: MaterialId, material: &Material) {
        let mut log = self.log.borrow_mut();
        log.material_updates.push((id, material.color));
        log.materials.insert(id, material.clone());
    }

    fn render(&mut self, frame: &Frame<'_>) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        log.frames += 1;
        log.last_draw_count = frame.draws.len();
        Ok(())
    }

    fn release_geometry(&mut self, id: GeometryId) {
        self.log.borrow_mut().geometries.remove(&id);
    }

    fn release_material(&mut self, id: MaterialId) {
        self.log.borrow_mut().materials.remove(&id);
    }

    fn release_texture(&mut self, id: TextureId) {
        self.log.borrow_mut().textures.remove(&id);
    }

    fn dispose(self) {
        self.log.borrow_mut().disposed = true;
    }
}

/// Observable state of the fake container.
#[derive(Debug)]
pub struct HostLog {
    pub size: (u32, u32),
    pub rect: ContainerRect,
    pub pixel_ratio: f64,
    pub attached: usize,
    pub class_names: Vec<Option<String>>,
    pub surface_sizes: Vec<Viewport>,
    pub listeners: HashMap<ListenerId, HostEvent>,
    pub pending_frames: HashSet<i32>,
    pub frames_requested: usize,
    pub frames_cancelled: usize,
    next_id: i32,
}

impl HostLog {
    pub fn listens_to(&self, event: HostEvent) -> bool {
        self.listeners.values().any(|e| *e == event)
    }
}

pub struct FakeHost {
    pub log: Rc<RefCell<HostLog>>,
    pub backend: Rc<RefCell<BackendLog>>,
}

impl FakeHost {
    /// A container of `width` x `height` CSS pixels at (10, 20) on the page.
    pub fn new(width: u32, height: u32, pixel_ratio: f64) -> Self {
        Self {
            log: Rc::new(RefCell::new(HostLog {
                size: (width, height),
                rect: ContainerRect {
                    left: 10.0,
                    top: 20.0,
                    width: width as f64,
                    height: height as f64,
                },
                pixel_ratio,
                attached: 0,
                class_names: Vec::new(),
                surface_sizes: Vec::new(),
                listeners: HashMap::new(),
                pending_frames: HashSet::new(),
                frames_requested: 0,
                frames_cancelled: 0,
                next_id: 0,
            })),
            backend: Rc::new(RefCell::new(BackendLog::default())),
        }
    }

    pub fn set_size(&self, width: u32, height: u32) {
        let mut log = self.log.borrow_mut();
        log.size = (width, height);
        log.rect.width = width as f64;
        log.rect.height = height as f64;
    }
}

impl Host for FakeHost {
    type Surface = FakeSurface;

    fn container_size(&self) -> (u32, u32) {
        self.log.borrow().size
    }

    fn container_rect(&self) -> ContainerRect {
        self.log.borrow().rect
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.log.borrow().pixel_ratio
    }

    fn attach_surface(&mut self, class_name: Option<&str>) -> Result<FakeSurface, SceneError> {
        let mut log = self.log.borrow_mut();
        log.attached += 1;
        log.class_names.push(class_name.map(str::to_owned));
        Ok(FakeSurface {
            log: self.backend.clone(),
        })
    }

    fn size_surface(&mut self, viewport: &Viewport) {
        self.log.borrow_mut().surface_sizes.push(*viewport);
    }

    fn detach_surface(&mut self) {
        let mut log = self.log.borrow_mut();
        log.attached = log.attached.saturating_sub(1);
    }

    fn listen(&mut self, event: HostEvent) -> Result<ListenerId, SceneError> {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        let id = ListenerId(log.next_id as u32);
        log.listeners.insert(id, event);
        Ok(id)
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.log.borrow_mut().listeners.remove(&id);
    }

    fn request_frame(&mut self) -> Result<FrameHandle, SceneError> {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        let handle = log.next_id;
        log.pending_frames.insert(handle);
        log.frames_requested += 1;
        Ok(FrameHandle(handle))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut log = self.log.borrow_mut();
        if log.pending_frames.remove(&handle.0) {
            log.frames_cancelled += 1;
        }
    }
}

/// Small textures keep the painting fast.
pub fn test_config() -> SceneConfig {
    SceneConfig {
        texture_size: 64,
        particle_count: 50,
        ..SceneConfig::default()
    }
}

pub type TestScene = MountedScene<FakeHost, FakeBackend>;

pub fn mount_fake(host: FakeHost, class_name: Option<&str>) -> Result<TestScene, SceneError> {
    let options = MountOptions {
        class_name: class_name.map(str::to_owned),
        config: test_config(),
    };
    futures::executor::block_on(mount::<_, FakeBackend>(host, options))
}

/// Fire the pending frame callback, like the browser does once per refresh.
pub fn fire_frame(scene: &mut TestScene) {
    scene.host().log.borrow_mut().pending_frames.clear();
    scene.on_frame();
}

pub fn run_frames(scene: &mut TestScene, count: usize) {
    for _ in 0..count {
        fire_frame(scene);
    }
}
