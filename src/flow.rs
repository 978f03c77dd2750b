//! Application event loop.
//!
//! [`App`] implements winit's [`ApplicationHandler`]. It owns the [`AppState`] (GPU context
//! plus every scene resource) once a window exists, and the async runtime that resolves the
//! black hole asset. Loads report back through the event loop proxy as [`FlowEvent`]s, so
//! all mutable state stays on the event loop thread.
//!
//! # Frame lifecycle
//!
//! 1. Recompose the scene if the viewport controller changed
//! 2. Advance the clock, the overlay uniform, the animations and the stars
//! 3. Apply the orbit controls and upload the camera
//! 4. Collect a [`Render`] per scene node and draw them in pipeline batches
//! 5. Draw the buttons on top and present

use std::{iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    black_hole::BlackHoleModel,
    config::SceneConfig,
    context::{Context, MouseButtonState},
    controller::ViewportController,
    data_structures::{geometry, texture::Texture},
    overlay::OverlayShape,
    pipelines::{gui::GuiResources, lines::LineBuffer, stars::StarsResources},
    render::{Batches, Flat, Render, Sprites},
    resources::{
        FileSource,
        cache::{AssetCache, LoadResult},
    },
    scene::{NodeContent, SceneGraphNode, compose},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Pixels per wheel step for touchpads reporting pixel deltas.
const PIXELS_PER_WHEEL_STEP: f64 = 100.0;

/// Frame timing: seconds since the previous frame and since the clock started.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    started: Instant,
    last_frame: Instant,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self {
            started: now,
            last_frame: now,
        }
    }

    /// Starts over at `now`. The next tick reports no elapsed time.
    pub fn restart(&mut self, now: Instant) {
        *self = Self::new(now);
    }

    /// Returns `(dt, elapsed)` in seconds and marks `now` as the latest frame.
    pub fn tick(&mut self, now: Instant) -> (f32, f32) {
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        let elapsed = now.duration_since(self.started).as_secs_f32();
        (dt, elapsed)
    }
}

pub struct AppState {
    pub(crate) ctx: Context,
    config: SceneConfig,
    controller: ViewportController,
    scene: SceneGraphNode,
    overlay: OverlayShape,
    black_hole: BlackHoleModel,
    stars: StarsResources,
    axes: LineBuffer,
    grid: LineBuffer,
    gui: GuiResources,
    #[cfg(feature = "ui")]
    labels: crate::pipelines::text::LabelRenderer,
    gui_dirty: bool,
    is_surface_configured: bool,
    clock: FrameClock,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("overlay", &self.controller.state())
            .field("black_hole_loaded", &self.black_hole.is_loaded())
            .finish()
    }
}

impl AppState {
    async fn new(window: Arc<Window>, config: SceneConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, &config).await?;
        let controller = ViewportController::new();
        let scene = compose(&controller.state(), &config);

        let overlay = OverlayShape::new(&ctx.device, &ctx.layouts.dot_pattern, config.shader);

        let star_config = &config.stars;
        let stars = StarsResources::new(
            &ctx.device,
            &ctx.layouts.stars,
            &geometry::starfield(
                star_config.count,
                star_config.radius,
                star_config.depth,
                star_config.factor,
                star_config.saturation,
                star_config.seed,
            ),
            star_config.fade,
            star_config.speed,
        );
        let helpers = &config.helpers;
        let axes = LineBuffer::new(
            &ctx.device,
            "Axes Helper",
            &geometry::axes_lines(helpers.axes_size),
        );
        let grid = LineBuffer::new(
            &ctx.device,
            "Grid Helper",
            &geometry::grid_lines(helpers.grid_size, helpers.grid_divisions),
        );
        let gui = GuiResources::new(
            &ctx.device,
            &controller.quads(ctx.surface_size(), ctx.scale_factor()),
            ctx.surface_size(),
        );
        #[cfg(feature = "ui")]
        let labels =
            crate::pipelines::text::LabelRenderer::new(&ctx.device, &ctx.queue, ctx.config.format);

        let now = Instant::now();
        Ok(Self {
            ctx,
            config,
            controller,
            scene,
            overlay,
            black_hole: BlackHoleModel::new(),
            stars,
            axes,
            grid,
            gui,
            #[cfg(feature = "ui")]
            labels,
            gui_dirty: true,
            is_surface_configured: false,
            clock: FrameClock::new(now),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            // Setup time before the first configure must not count as a frame
            if !self.is_surface_configured {
                self.clock.restart(Instant::now());
            }
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
            self.gui_dirty = true;
        }
    }

    fn on_asset_loaded(&mut self, path: &str, result: LoadResult) {
        match result {
            Ok(scene) => {
                if let Err(e) = self.black_hole.mount(
                    &self.ctx.device,
                    &self.ctx.queue,
                    &self.ctx.layouts.material,
                    &scene,
                ) {
                    log::error!("could not upload {path}: {e:#}");
                }
            }
            // Already logged by the cache
            Err(_) => log::info!("{path} stays blank"),
        }
    }

    /// Rebuilds the scene graph and everything derived from it.
    fn recompose(&mut self) {
        self.scene = compose(&self.controller.state(), &self.config);
        if let Some((kind, transform)) = self.scene.overlay() {
            self.overlay
                .prepare(&self.ctx.device, &self.ctx.queue, kind, transform);
        }
        let lights = self.scene.light_uniform(self.config.lights.color);
        self.ctx.light.update(&self.ctx.queue, lights);
        self.ctx.camera.controller.enabled = self.scene.has_orbit_controls();
        self.gui_dirty = true;
    }

    fn rebuild_gui(&mut self) {
        let surface = self.ctx.surface_size();
        let scale_factor = self.ctx.scale_factor();
        self.gui = GuiResources::new(
            &self.ctx.device,
            &self.controller.quads(surface, scale_factor),
            surface,
        );
        #[cfg(feature = "ui")]
        if let Err(e) = self.labels.prepare(
            &self.ctx.device,
            &self.ctx.queue,
            &self.controller.labels(surface, scale_factor),
            surface,
        ) {
            log::warn!("could not prepare button labels: {e}");
        }
        self.gui_dirty = false;
    }

    fn update(&mut self) {
        if self.controller.take_dirty() {
            self.recompose();
        }
        if self.gui_dirty {
            self.rebuild_gui();
        }

        let (dt, elapsed) = self.clock.tick(Instant::now());

        let queue = &self.ctx.queue;
        self.overlay.on_frame(queue, elapsed);
        if let Some((_, placement)) = self.scene.black_hole() {
            self.black_hole.update(queue, dt, &placement);
        }
        self.stars.update(queue, elapsed, self.ctx.surface_size());

        let camera = &mut self.ctx.camera;
        camera.controller.update(&mut camera.camera);
        camera
            .uniform
            .update_view_proj(&camera.camera, &self.ctx.projection);
        queue.write_buffer(&camera.buffer, 0, bytemuck::cast_slice(&[camera.uniform]));
    }

    fn get_render(&self) -> Render<'_> {
        let mut renders: Vec<Render<'_>> = self
            .scene
            .iter()
            .map(|node| match &node.content {
                NodeContent::BlackHole { .. } => self.black_hole.get_render(),
                NodeContent::Overlay { shape } => self.overlay.get_render(*shape),
                NodeContent::Starfield(_) => Render::Stars(Sprites {
                    instances: &self.stars.instances,
                    group: &self.stars.bind_group,
                    amount: self.stars.amount,
                }),
                NodeContent::AxesHelper { .. } => Render::Lines(Flat {
                    vertex: &self.axes.vertex,
                    index: None,
                    amount: self.axes.amount,
                }),
                NodeContent::GridHelper { .. } => Render::Lines(Flat {
                    vertex: &self.grid.vertex,
                    index: None,
                    amount: self.grid.amount,
                }),
                _ => Render::None,
            })
            .collect();
        renders.push(Render::GUI(Flat {
            vertex: &self.gui.vertex,
            index: Some(&self.gui.index),
            amount: self.gui.amount,
        }));
        Render::Composed(renders)
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        self.update();

        let output = self.ctx.surface.get_current_texture()?;
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
            });

            let batches = Batches::new(self.get_render());
            if !batches.is_empty() {
                batches.draw(&self.ctx, &mut render_pass);
            }
            #[cfg(feature = "ui")]
            self.labels.render(&mut render_pass);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        #[cfg(feature = "ui")]
        self.labels.trim();
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    assets: Arc<AssetCache>,
    config: SceneConfig,
    state: Option<AppState>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        let assets = Arc::new(AssetCache::new(Arc::new(FileSource::from_env())));
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        let app = Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            assets,
            config,
            state: None,
        };
        app.preload();
        Ok(app)
    }

    /// Starts fetching the black hole before the window exists.
    fn preload(&self) {
        #[cfg(not(target_arch = "wasm32"))]
        let _guard = self.async_runtime.enter();
        self.assets.preload(&self.config.black_hole.asset);
    }

    /// Awaits the black hole asset and hands the result to the event loop.
    fn request_black_hole(&self) {
        let assets = self.assets.clone();
        let proxy = self.proxy.clone();
        let path = self.config.black_hole.asset.clone();
        let load = async move {
            let result = assets.load(&path).await;
            if result.is_ok() {
                log::info!("resolved {path}");
            }
            if proxy
                .send_event(FlowEvent::AssetLoaded { path, result })
                .is_err()
            {
                log::warn!("event loop closed before the asset arrived");
            }
        };
        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(load);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(load);
    }
}

pub enum FlowEvent {
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<AppState>),
    AssetLoaded {
        path: String,
        result: LoadResult,
    },
}

impl std::fmt::Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::AssetLoaded { path, result } => f
                .debug_struct("AssetLoaded")
                .field("path", path)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Blackvision");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create a window: {e}");
                event_loop.exit();
                return;
            }
        };

        let init_future = AppState::new(window, self.config.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(state) => {
                    self.state = Some(state);
                    self.request_black_hole();
                }
                Err(e) => {
                    log::error!("could not initialize the renderer: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(state) => {
                        if proxy
                            .send_event(FlowEvent::Initialized(Box::new(state)))
                            .is_err()
                        {
                            log::error!("event loop closed during initialization");
                        }
                    }
                    Err(e) => log::error!("could not initialize the renderer: {e:#}"),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            FlowEvent::Initialized(state) => {
                // This is the message from our wasm `spawn_local`
                let mut state = *state;
                // Important: Trigger a resize and redraw now that we are initialized
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();
                self.state = Some(state);
                self.request_black_hole();
            }
            FlowEvent::AssetLoaded { path, result } => match &mut self.state {
                Some(state) => state.on_asset_loaded(&path, result),
                None => log::warn!("{path} resolved before the renderer was ready"),
            },
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            let height = state.ctx.config.height;
            let camera = &mut state.ctx.camera;
            match state.ctx.mouse.pressed {
                MouseButtonState::Left => camera.controller.rotate(dx, dy, height),
                MouseButtonState::Right => camera.controller.pan(
                    &camera.camera,
                    &state.ctx.projection,
                    dx,
                    dy,
                    height,
                ),
                MouseButtonState::None => (),
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::ScaleFactorChanged { .. } => state.gui_dirty = true,
            WindowEvent::CursorMoved { position, .. } => state.ctx.mouse.coords = position,
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_WHEEL_STEP) as f32,
                };
                state.ctx.camera.controller.zoom(steps);
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => match (button, button_state.is_pressed()) {
                (MouseButton::Left, true) => {
                    let hit = state.controller.hit_test(
                        state.ctx.mouse.coords,
                        state.ctx.surface_size(),
                        state.ctx.scale_factor(),
                    );
                    match hit {
                        // Presses on a button never start a drag
                        Some(id) => {
                            state.controller.click(id);
                        }
                        None => state.ctx.mouse.pressed = MouseButtonState::Left,
                    }
                }
                (MouseButton::Right, true) => state.ctx.mouse.pressed = MouseButtonState::Right,
                (_, false) => state.ctx.mouse.pressed = MouseButtonState::None,
                _ => (),
            },
            WindowEvent::RedrawRequested => match state.render() {
                Ok(()) => (),
                // Reconfigure the surface if it's lost or outdated
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("out of memory, exiting");
                    event_loop.exit();
                }
                Err(e) => log::error!("Unable to render {}", e),
            },
            _ => {}
        }
    }
}

/// Opens the window and runs the scene until it is closed.
pub fn run() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let config = SceneConfig::default();
    config.validate()?;

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
