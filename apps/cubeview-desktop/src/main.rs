use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cubeview_camera::FirstPersonCamera;
use cubeview_common::{AppConfig, FovSource, Key};
use cubeview_input::{Action, HeldKeys, KeyBindings, ScrollDelta, VirtualCursor, apply_movement};
use cubeview_render::{FrameView, Projection, Scene};
use cubeview_render_wgpu::WgpuRenderer;
use egui::Context as EguiContext;
use glam::DVec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

/// Longest frame step fed to the camera, so a stall does not teleport it.
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Parser)]
#[command(name = "cubeview-desktop", about = "Fly around a static cube scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Keep the projection at its fixed field of view; scrolling still updates the camera
    #[arg(long)]
    fixed_fov: bool,

    /// Number of cubes to draw from the configured positions
    #[arg(long)]
    cubes: Option<usize>,

    /// Show the camera HUD at startup
    #[arg(long)]
    hud: bool,
}

impl Cli {
    /// Load the config file (or defaults) and apply command-line overrides.
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AppConfig::default(),
        };
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        if self.fixed_fov {
            config.projection.fov_source = FovSource::Fixed;
        }
        if let Some(cubes) = self.cubes {
            config.scene.cube_count = cubes;
        }
        config.show_hud |= self.hud;
        config.validate()?;
        Ok(config)
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::KeyW,
        KeyCode::KeyA => Key::KeyA,
        KeyCode::KeyS => Key::KeyS,
        KeyCode::KeyD => Key::KeyD,
        KeyCode::KeyQ => Key::KeyQ,
        KeyCode::KeyE => Key::KeyE,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::Space => Key::Space,
        KeyCode::Escape => Key::Escape,
        KeyCode::F1 => Key::F1,
        _ => return None,
    })
}

/// Application state: the camera and everything that feeds it.
struct AppState {
    config: AppConfig,
    camera: FirstPersonCamera,
    projection: Projection,
    scene: Scene,
    bindings: KeyBindings,
    held: HeldKeys,
    cursor: VirtualCursor,
    cursor_captured: bool,
    show_hud: bool,
    quit_requested: bool,
    last_frame: Instant,
    frame_dt: f32,
}

impl AppState {
    fn new(config: AppConfig) -> Self {
        let center = DVec2::new(
            f64::from(config.window.width) / 2.0,
            f64::from(config.window.height) / 2.0,
        );
        Self {
            camera: FirstPersonCamera::from_settings(&config.camera),
            projection: Projection::from_config(&config),
            scene: Scene::from_settings(&config.scene),
            bindings: KeyBindings::from_settings(&config.controls),
            held: HeldKeys::new(),
            cursor: VirtualCursor::new(center),
            cursor_captured: false,
            show_hud: config.show_hud,
            quit_requested: false,
            last_frame: Instant::now(),
            frame_dt: 0.0,
            config,
        }
    }

    fn update(&mut self, dt: f32) {
        self.frame_dt = dt;
        apply_movement(&self.held, &self.bindings, &mut self.camera, dt);
    }

    fn handle_key(&mut self, key: Key, pressed: bool) {
        if !pressed {
            self.held.release(key);
            return;
        }
        if !self.held.press(key) {
            return;
        }

        match self.bindings.action(key) {
            Some(Action::Quit) => {
                tracing::info!("quit requested");
                self.quit_requested = true;
            }
            Some(Action::ToggleHud) => {
                self.show_hud = !self.show_hud;
                tracing::debug!(show_hud = self.show_hud, "HUD toggled");
            }
            Some(Action::Move(_)) | None => {}
        }
    }

    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        if !self.cursor_captured {
            return;
        }
        let p = self.cursor.accumulate(dx, dy).as_vec2();
        self.camera.on_pointer_move(p.x, p.y);
    }

    fn handle_scroll(&mut self, delta: ScrollDelta) {
        self.camera.on_scroll(delta.lines());
        tracing::debug!(fov = self.camera.field_of_view(), "zoom");
    }

    /// Focus changes: releases are not delivered while unfocused, so drop held keys.
    fn handle_focus(&mut self, focused: bool) {
        if focused {
            self.camera.reset_pointer();
        } else {
            self.held.clear();
        }
    }

    fn frame_view(&self) -> FrameView {
        FrameView::new(&self.camera, &self.projection)
    }

    fn draw_hud(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let cam = &self.camera;
        let frame = self.frame_view();
        egui::Window::new("Camera")
            .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
            .resizable(false)
            .collapsible(false)
            .interactable(false)
            .show(ctx, |ui| {
                let p = frame.eye;
                ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                let f = cam.front();
                ui.label(format!("Front: ({:.2}, {:.2}, {:.2})", f.x, f.y, f.z));
                ui.label(format!("Yaw: {:.1}°  Pitch: {:.1}°", cam.yaw(), cam.pitch()));
                ui.label(format!(
                    "FOV: {:.1}° (projection {:.1}°)",
                    cam.field_of_view(),
                    self.projection.effective_fov(cam.field_of_view())
                ));
                ui.label(format!("Speed: {:.1} units/s", cam.speed()));
                ui.label(format!("Frame: {:.2} ms", self.frame_dt * 1000.0));
                ui.separator();
                ui.small("WASD: Move | Mouse: Look | Wheel: Zoom | F1: HUD | Esc: Quit");
            });
    }
}

/// Window, GPU context and renderers; created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn init(event_loop: &ActiveEventLoop, state: &AppState, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(state.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                state.config.window.width,
                state.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubeview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            &state.scene,
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer =
            egui_wgpu::Renderer::new(&device, renderer.surface_format(), None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
        tracing::debug!(width = self.config.width, height = self.config.height, "resized");
    }

    /// Capture and hide the OS cursor, or release it.
    fn set_cursor_captured(&self, captured: bool) -> bool {
        let grabbed = if captured {
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grabbed {
            tracing::warn!("cursor grab failed: {e}");
        }
        self.window.set_cursor_visible(!captured);
        captured
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(MAX_FRAME_DT);
        self.state.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &self.state.frame_view());

        let state = &self.state;
        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_hud(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::init(event_loop, &self.state, &self.egui_ctx) {
            Ok(gpu) => {
                self.state.cursor_captured = gpu.set_cursor_captured(true);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::Focused(focused) => {
                self.state.handle_focus(focused);
                if let Some(gpu) = &self.gpu {
                    self.state.cursor_captured = gpu.set_cursor_captured(focused);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(code) {
                    self.state
                        .handle_key(key, key_state == ElementState::Pressed);
                }
                if self.state.quit_requested {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => ScrollDelta::Lines(y),
                    MouseScrollDelta::PixelDelta(pos) => ScrollDelta::Pixels(pos.y),
                };
                self.state.handle_scroll(delta);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.handle_mouse_motion(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.resolve_config()?;
    tracing::info!(
        "cubeview-desktop starting ({}x{}, fov source {:?})",
        config.window.width,
        config.window.height,
        config.projection.fov_source
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cubeview-desktop").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn cli_defaults_match_config_defaults() {
        let config = parse(&[]).resolve_config().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn cli_overrides_config() {
        let config = parse(&["--width", "1024", "--fixed-fov", "--cubes", "10", "--hud"])
            .resolve_config()
            .unwrap();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.projection.fov_source, FovSource::Fixed);
        assert_eq!(config.scene.cube_count, 10);
        assert!(config.show_hud);
    }

    #[test]
    fn cli_rejects_zero_size() {
        assert!(parse(&["--height", "0"]).resolve_config().is_err());
    }

    #[test]
    fn cli_rejects_degenerate_fixed_fov() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), r#"{ "projection": { "fixed_fov_degrees": 0.0 } }"#).unwrap();
        let path = tmp.path().to_str().unwrap();
        assert!(parse(&["--config", path, "--fixed-fov"]).resolve_config().is_err());
    }

    #[test]
    fn cli_loads_config_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), r#"{ "camera": { "speed": 3.0 } }"#).unwrap();
        let path = tmp.path().to_str().unwrap();
        let config = parse(&["--config", path, "--cubes", "2"])
            .resolve_config()
            .unwrap();
        assert_eq!(config.camera.speed, 3.0);
        assert_eq!(config.scene.cube_count, 2);
    }

    #[test]
    fn maps_movement_keys() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::KeyW));
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::KeyZ), None);
    }

    #[test]
    fn escape_requests_quit() {
        let mut state = AppState::new(AppConfig::default());
        state.handle_key(Key::Escape, true);
        assert!(state.quit_requested);
    }

    #[test]
    fn hud_toggle_ignores_key_repeat() {
        let mut state = AppState::new(AppConfig::default());
        assert!(!state.show_hud);
        state.handle_key(Key::F1, true);
        state.handle_key(Key::F1, true);
        assert!(state.show_hud);
        state.handle_key(Key::F1, false);
        state.handle_key(Key::F1, true);
        assert!(!state.show_hud);
    }

    #[test]
    fn held_key_moves_on_update() {
        let mut state = AppState::new(AppConfig::default());
        let start = state.camera.position();
        state.handle_key(Key::KeyW, true);
        state.update(0.1);
        assert!(state.camera.position().z < start.z);

        let mid = state.camera.position();
        state.handle_key(Key::KeyW, false);
        state.update(0.1);
        assert_eq!(state.camera.position(), mid);
    }

    #[test]
    fn losing_focus_stops_movement() {
        let mut state = AppState::new(AppConfig::default());
        state.handle_key(Key::KeyD, true);
        state.handle_focus(false);
        let start = state.camera.position();
        state.update(0.1);
        assert_eq!(state.camera.position(), start);
    }

    #[test]
    fn mouse_motion_needs_capture() {
        let mut state = AppState::new(AppConfig::default());
        state.handle_mouse_motion(50.0, 0.0);
        state.handle_mouse_motion(50.0, 0.0);
        assert_eq!(state.camera.yaw(), -90.0);

        state.cursor_captured = true;
        state.handle_mouse_motion(50.0, 0.0);
        assert_eq!(state.camera.yaw(), -90.0);
        state.handle_mouse_motion(50.0, -20.0);
        assert!((state.camera.yaw() - -85.0).abs() < 1e-4);
        assert!((state.camera.pitch() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn scroll_zooms_projection() {
        let mut state = AppState::new(AppConfig::default());
        let before = state.frame_view().projection;
        state.handle_scroll(ScrollDelta::Lines(5.0));
        assert_eq!(state.camera.field_of_view(), 40.0);
        assert_ne!(state.frame_view().projection, before);
    }
}
