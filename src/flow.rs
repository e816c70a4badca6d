//! Application event loop.
//!
//! # Lifecycle
//!
//! 1. `resumed` looks up the mount container. If it is missing the error is
//!    logged and nothing else happens: no window, no GPU context, no frames.
//! 2. The GPU [`Context`] and the [`GalaxyScene`] are built (blocking natively,
//!    via `spawn_local` plus a user event on the web).
//! 3. All textures are requested in the background. Each arrives as a
//!    [`FlowEvent::TextureLoaded`] and is decoded on the event loop thread;
//!    until then materials render white.
//! 4. Every `RedrawRequested` runs the render step: apply a settled resize (if
//!    any), advance the scene, update the orbit controller, draw, present and
//!    request the next frame.
//! 5. Closing the window drops the scene and context and leaves the loop.

use std::{iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::GalaxyConfig,
    context::Context,
    mount::mount_renderer,
    render,
    resize::ResizeDebouncer,
    resources::load_binary,
    scene::{GalaxyScene, TextureSlot},
};

pub(crate) enum FlowEvent {
    #[cfg(target_arch = "wasm32")]
    Initialized(AppState),
    TextureLoaded {
        slot: TextureSlot,
        name: String,
        bytes: anyhow::Result<Vec<u8>>,
    },
}

/// GPU context plus the scene drawn with it.
pub(crate) struct AppState {
    pub(crate) ctx: Context,
    scene: GalaxyScene,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &GalaxyConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config).await?;
        let scene = GalaxyScene::new(&ctx, config);
        Ok(Self {
            ctx,
            scene,
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            log::debug!("resized to {width}x{height}");
            self.is_surface_configured = true;
        }
    }

    /// One frame: simulate, update the camera, draw and present.
    fn render(&mut self, t_ms: f64) -> Result<(), wgpu::CurrentSurfaceTexture> {
        // keep the display-refresh loop going
        self.ctx.window.request_redraw();

        if !self.is_surface_configured {
            return Ok(());
        }

        self.scene.update(&self.ctx.queue, t_ms);
        self.ctx.camera.update(&self.ctx.queue, &self.ctx.projection);

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture)
            | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
            other => return Err(other),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            render::draw(&self.ctx, &mut render_pass, self.scene.render());
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    config: GalaxyConfig,
    state: Option<AppState>,
    resize: ResizeDebouncer,
    epoch: Instant,
    started: bool,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: GalaxyConfig) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            resize: ResizeDebouncer::new(config.resize_debounce),
            config,
            state: None,
            epoch: Instant::now(),
            started: false,
        })
    }

    fn elapsed_millis(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn on_initialized(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        state.ctx.window.request_redraw();
        self.state = Some(state);
        self.request_textures();
    }

    /// Fetches every texture in the background; results come back as user events.
    fn request_textures(&self) {
        let proxy = self.proxy.clone();
        let loads = self
            .config
            .textures()
            .into_iter()
            .map(|(slot, name)| async move {
                let bytes = load_binary(&name).await;
                FlowEvent::TextureLoaded { slot, name, bytes }
            });
        let fetch = async move {
            for event in futures::future::join_all(loads).await {
                if proxy.send_event(event).is_err() {
                    log::debug!("event loop closed before the textures arrived");
                    break;
                }
            }
        };
        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(fetch);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(fetch);
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        #[cfg(not(target_arch = "wasm32"))]
        let window_attributes = mount_renderer(
            &crate::mount::NativeMount {
                title: "Galaxy".to_string(),
            },
            &self.config.mount_id,
        );
        #[cfg(target_arch = "wasm32")]
        let window_attributes = match crate::mount::DocumentMount::current() {
            Some(document) => mount_renderer(&document, &self.config.mount_id),
            None => {
                log::error!("no document to mount the galaxy into");
                return;
            }
        };
        // Already logged; without a container there is nothing to render
        let Ok(window_attributes) = window_attributes else {
            return;
        };

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create the render window: {e}");
                return;
            }
        };

        let config = self.config.clone();
        let init_future = async move { AppState::new(window, &config).await };

        #[cfg(not(target_arch = "wasm32"))]
        match self.async_runtime.block_on(init_future) {
            Ok(state) => self.on_initialized(state),
            Err(e) => {
                log::error!("galaxy initialization failed: {e:#}");
                event_loop.exit();
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(state) => {
                        if proxy.send_event(FlowEvent::Initialized(state)).is_err() {
                            log::error!("event loop closed during initialization");
                        }
                    }
                    Err(e) => log::error!("galaxy initialization failed: {e:#}"),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            FlowEvent::Initialized(state) => self.on_initialized(state),
            FlowEvent::TextureLoaded { slot, name, bytes } => {
                let Some(state) = &mut self.state else {
                    return;
                };
                let applied = bytes.and_then(|bytes| {
                    state.scene.apply_texture(&state.ctx, slot, &bytes, &name)
                });
                match applied {
                    Ok(()) => log::info!("texture {name} loaded"),
                    Err(e) => log::warn!("keeping placeholder for {name}: {e:#}"),
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            self.resize.cancel();
            self.state = None;
            event_loop.exit();
            return;
        }

        let t_ms = self.elapsed_millis();
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.ctx.camera.controller.handle_window_events(&event);

        match event {
            WindowEvent::Resized(size) => self.resize.push(size, Instant::now()),
            WindowEvent::RedrawRequested => {
                if let Some(size) = self.resize.poll(Instant::now()) {
                    state.resize(size.width, size.height);
                }
                match state.render(t_ms) {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {:?}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Sets up logging and runs the galaxy until its window is closed.
///
/// On the web the event loop is handed to the browser and this returns right
/// away. If the mount container is missing the error is logged and no event
/// loop is created at all.
pub fn run(config: GalaxyConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        // A logger may already be installed by the embedding page
        console_log::init_with_level(log::Level::Info).ok();

        let Some(document) = crate::mount::DocumentMount::current() else {
            log::error!("no document to mount the galaxy into");
            return Ok(());
        };
        if crate::mount::locate_container(&document, &config.mount_id).is_err() {
            return Ok(());
        }
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    #[cfg(not(target_arch = "wasm32"))]
    {
        let mut app = App::new(&event_loop, config)?;
        event_loop.run_app(&mut app)?;
    }
    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        // run_app would throw to unwind the JS stack
        let app = App::new(&event_loop, config)?;
        event_loop.spawn_app(app);
    }

    Ok(())
}
