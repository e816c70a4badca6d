use std::sync::Arc;

use winit::window::Window;

use crate::{
    camera::{Camera, CameraResources, OrbitController, Projection},
    config::GalaxyConfig,
    data_structures::texture,
    error::GalaxyError,
    pipelines::{
        Layouts, Pipelines,
        basic::{mk_background_pipeline, mk_nucleus_pipeline, mk_object_layout},
        light::{LightResources, LightUniform},
        sprite::{mk_sprite_layout, mk_sprite_pipeline},
    },
    resources::texture_layout,
};

/// GPU side of the renderer: surface, device, camera, light and pipelines.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub pipelines: Pipelines,
    pub layouts: Layouts,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, galaxy: &GalaxyConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| GalaxyError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| GalaxyError::Adapter(e.to_string()))?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders write linear colours and rely on an sRGB surface.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| GalaxyError::Surface("surface reports no formats".into()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = Camera::new((0.0, 0.0, galaxy.orbit.distance), (0.0, 0.0, 0.0));
        let projection = Projection::new(
            config.width,
            config.height,
            cgmath::Deg(galaxy.fov_degrees),
            galaxy.znear,
            galaxy.zfar,
        );
        let mut controller = OrbitController::new(&galaxy.orbit);
        controller.set_viewport_height(config.height);
        let camera = CameraResources::new(&device, camera, controller, &projection);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let light = LightResources::new(LightUniform::default(), &device);

        let layouts = Layouts {
            texture: texture_layout(&device),
            object: mk_object_layout(&device),
            sprite: mk_sprite_layout(&device),
        };
        let pipelines = Pipelines {
            nucleus: mk_nucleus_pipeline(
                &device,
                &config,
                &layouts.texture,
                &camera.bind_group_layout,
                &layouts.object,
                &light.bind_group_layout,
            ),
            background: mk_background_pipeline(
                &device,
                &config,
                &layouts.texture,
                &camera.bind_group_layout,
                &layouts.object,
            ),
            sprite: mk_sprite_pipeline(
                &device,
                &config,
                &layouts.texture,
                &camera.bind_group_layout,
                &layouts.sprite,
            ),
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            light,
            pipelines,
            layouts,
            window,
            depth_texture,
            clear_colour: galaxy.clear_colour,
        })
    }

    /// Matches surface, depth buffer, projection and orbit speed to a new size.
    /// Zero sized requests are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.projection.resize(width, height);
        self.camera.controller.set_viewport_height(height);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        true
    }
}
