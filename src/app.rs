//! Window and event-loop driver.
//!
//! [`Simulator`] is the entry point for interactive use: it owns the winit
//! event loop, acquires the GPU, and feeds frames to a [`ParticleRenderer`].
//! Startup failures surface as [`SimulatorError`] from [`Simulator::run`];
//! once the loop is running, lost surfaces are reconfigured and other frame
//! errors are logged and skipped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::controls::ParamPanel;
use crate::error::{GpuError, SimulatorError};
use crate::renderer::ParticleRenderer;
use crate::settings::SimSettings;
use crate::sprite::SpriteConfig;
use crate::targets::POSITION_FORMAT;
use crate::time::Time;

/// Builder for an interactive particle simulator window.
///
/// ```ignore
/// use curlfield::{SimSettings, Simulator};
///
/// fn main() -> Result<(), curlfield::SimulatorError> {
///     env_logger::init();
///     Simulator::new()
///         .with_settings(SimSettings::new().with_resolution(256))
///         .run()
/// }
/// ```
pub struct Simulator {
    settings: SimSettings,
    sprite: SpriteConfig,
    title: String,
    width: u32,
    height: u32,
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            settings: SimSettings::default(),
            sprite: SpriteConfig::default(),
            title: "curlfield".to_string(),
            width: 1280,
            height: 720,
        }
    }

    /// Set the simulation parameters.
    pub fn with_settings(mut self, settings: SimSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the default soft-disc point sprite.
    pub fn with_sprite(mut self, sprite: SpriteConfig) -> Self {
        self.sprite = sprite;
        self
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Open the window and run until closed.
    pub fn run(self) -> Result<(), SimulatorError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.startup_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        // Particle state lives in float textures that are both rendered to
        // and sampled, so the adapter must allow those usages up front.
        let float_usages =
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        if !adapter
            .get_texture_format_features(POSITION_FORMAT)
            .allowed_usages
            .contains(float_usages)
        {
            return Err(GpuError::FloatTargetUnsupported);
        }

        let info = adapter.get_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "surface: {:?} {}x{}",
            config.format,
            config.width,
            config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

struct App {
    config: Simulator,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    renderer: Option<ParticleRenderer>,
    panel: ParamPanel,
    time: Time,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    fps_log: Instant,
    startup_error: Option<SimulatorError>,
}

impl App {
    fn new(config: Simulator) -> Self {
        Self {
            config,
            window: None,
            gpu: None,
            renderer: None,
            panel: ParamPanel::new(),
            time: Time::new(),
            mouse_pressed: false,
            last_mouse_pos: None,
            fps_log: Instant::now(),
            startup_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulatorError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.width,
                self.config.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        let renderer = ParticleRenderer::new(
            &gpu.device,
            &gpu.queue,
            &self.config.settings,
            &self.config.sprite,
            gpu.config.format,
            gpu.config.width,
            gpu.config.height,
        )?;

        log::info!(
            "simulating {} particles on a {}x{} grid",
            renderer.particle_count(),
            self.config.settings.resolution,
            self.config.settings.resolution
        );

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.renderer = Some(renderer);
        self.time.reset();
        Ok(())
    }

    /// Keep the frame clock's pause state in step with the panel, so the
    /// elapsed time handed to the integrator freezes while paused instead of
    /// jumping when advection resumes.
    fn sync_pause(&mut self) {
        if self.panel.paused != self.time.is_paused() {
            self.time.toggle_pause();
        }
    }

    fn draw_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let (Some(gpu), Some(renderer)) = (self.gpu.as_ref(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let (elapsed, _delta) = self.time.update();

        self.panel.apply(renderer);
        if self.panel.take_reset() {
            renderer.reset_particles(&gpu.device, &gpu.queue);
        }

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        renderer.render(&gpu.device, &gpu.queue, &mut encoder, &view, elapsed);
        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if self.fps_log.elapsed() >= Duration::from_secs(1) {
            log::debug!("fps: {:.1}", self.time.fps());
            self.fps_log = Instant::now();
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("Startup failed: {}", e);
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
                if physical_size.width > 0 && physical_size.height > 0 {
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(physical_size.width, physical_size.height);
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        if code == KeyCode::Escape {
                            event_loop.exit();
                        } else if self.panel.handle_key(code) {
                            self.sync_pause();
                        }
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        if let Some(renderer) = &mut self.renderer {
                            let camera = renderer.camera_mut();
                            camera.yaw -= dx * 0.005;
                            camera.pitch = (camera.pitch + dy * 0.005).clamp(-1.5, 1.5);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(renderer) = &mut self.renderer {
                    let camera = renderer.camera_mut();
                    camera.distance = (camera.distance - scroll * 1.5).clamp(2.0, 80.0);
                }
            }
            WindowEvent::RedrawRequested => {
                match self.draw_frame() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        if let Some(gpu) = &mut self.gpu {
                            let size = winit::dpi::PhysicalSize {
                                width: gpu.config.width,
                                height: gpu.config.height,
                            };
                            gpu.resize(size);
                        }
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Surface out of memory, shutting down");
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("Frame error: {:?}", e),
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_defaults() {
        let sim = Simulator::new();
        assert_eq!(sim.title, "curlfield");
        assert_eq!((sim.width, sim.height), (1280, 720));
        assert_eq!(sim.settings.resolution, 512);
    }

    #[test]
    fn test_pause_reaches_frame_clock() {
        let mut app = App::new(Simulator::new());
        assert!(!app.time.is_paused());

        app.panel.handle_key(KeyCode::Space);
        app.sync_pause();
        assert!(app.time.is_paused());

        app.panel.handle_key(KeyCode::Space);
        app.sync_pause();
        assert!(!app.time.is_paused());
    }

    #[test]
    fn test_simulator_builder() {
        let sim = Simulator::new()
            .with_title("drift")
            .with_window_size(640, 480)
            .with_settings(SimSettings::new().with_resolution(128));
        assert_eq!(sim.title, "drift");
        assert_eq!((sim.width, sim.height), (640, 480));
        assert_eq!(sim.settings.resolution, 128);
    }
}
