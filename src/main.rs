//! Interactive GPU N-body gravity simulation
//!
//! Right-drag orbits, wheel zooms, Space pauses, R reseeds, Esc quits.

mod config;
mod gui;
mod simulator;

use anyhow::{Context as _, Result};
use clap::Parser;
use config::{load_options, Args};
use gui::{Gui, UiState};
use nbody_physics::WorldStateOptions;
use nbody_simulation::GpuCapabilities;
use simulator::Simulator;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Statistics need a blocking readback, so refresh them sparingly
const STATS_INTERVAL: Duration = Duration::from_millis(500);

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    simulator: Simulator,
    gui: Gui,
    ui_state: UiState,
    last_frame_time: Instant,
    frame_times: VecDeque<f32>,
    last_stats: Option<Instant>,
}

impl GpuState {
    async fn new(window: Arc<Window>, options: WorldStateOptions, paused: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        // Request the adapter's texture limits so large worlds fit
        let adapter_limits = adapter.limits();
        let required_limits = wgpu::Limits {
            max_texture_dimension_2d: adapter_limits.max_texture_dimension_2d,
            ..wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits,
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create device")?;

        let capabilities = GpuCapabilities::from_device(&adapter, &device);
        log::info!(
            "✓ Max texture {}px, {} storage textures per stage",
            capabilities.max_texture_dimension_2d,
            capabilities.max_storage_textures_per_shader_stage
        );

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
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
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let simulator = Simulator::new(&device, &queue, &config, capabilities, options, paused);
        log::info!("✓ Simulator initialized");

        let gui = Gui::new(&device, config.format, &window);
        log::info!("✓ GUI initialized");

        let ui_state = UiState {
            options: simulator.options().clone(),
            paused,
            ..Default::default()
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            simulator,
            gui,
            ui_state,
            last_frame_time: Instant::now(),
            frame_times: VecDeque::with_capacity(100),
            last_stats: None,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.simulator.set_size(&self.config);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        if self.simulator.handle_key(key) {
            self.ui_state.paused = self.simulator.is_paused();
            self.last_stats = None;
        }
    }

    fn update_ui_state(&mut self, fps: f32, avg_frame_time: f32) {
        self.ui_state.fps = fps;
        self.ui_state.frame_time = avg_frame_time;

        let world = self.simulator.world();
        self.ui_state.n_particles = world.n_particles();
        self.ui_state.tex_size = world.tex_size();
        self.ui_state.ticks = world.ticks();

        let stale = self
            .last_stats
            .is_none_or(|at| at.elapsed() >= STATS_INTERVAL);
        if stale {
            self.ui_state.stats = self.simulator.stats();
            self.last_stats = Some(Instant::now());
        }
    }

    fn render(&mut self, window: &Window) -> Result<(f32, f32), wgpu::SurfaceError> {
        // Track frame time
        let now = Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }
        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        let fps = 1000.0 / avg_frame_time;

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.simulator.render(&view);
        self.update_ui_state(fps, avg_frame_time);

        // Render GUI
        let changed = {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("GUI Encoder"),
                });

            let changed = self.gui.render(
                &self.device,
                &self.queue,
                &mut encoder,
                window,
                &view,
                &mut self.ui_state,
            );

            self.queue.submit(std::iter::once(encoder.finish()));
            changed
        };

        output.present();

        if changed {
            self.simulator.set_options(self.ui_state.options.clone());
            self.last_stats = None;
        }

        Ok((fps, avg_frame_time))
    }
}

struct App {
    options: WorldStateOptions,
    paused: bool,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("N-body Gravity Simulation")
            .with_inner_size(winit::dpi::LogicalSize::new(1920, 1080));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("failed to create window")?,
        );
        let gpu_state = pollster::block_on(GpuState::new(
            window.clone(),
            self.options.clone(),
            self.paused,
        ))?;

        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                log::error!("Startup failed: {err:#}");
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
        // Handle GUI events
        if let (Some(gpu_state), Some(window)) = (&mut self.gpu_state, &self.window) {
            if gpu_state.gui.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.handle_key(key_code);
                }
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Right {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some(last_pos) = self.last_mouse_pos {
                        let delta_x = (position.x - last_pos.0) as f32;
                        let delta_y = (position.y - last_pos.1) as f32;

                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state
                                .simulator
                                .camera
                                .rotate(-delta_x * 0.005, delta_y * 0.005);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_x, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };

                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.simulator.camera.zoom(scroll);
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    match gpu_state.render(window) {
                        Ok((fps, frame_time)) => {
                            window.set_title(&format!(
                                "N-body - {:.0} FPS ({:.2}ms) - {} particles",
                                fps,
                                frame_time,
                                gpu_state.ui_state.n_particles
                            ));
                        }
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(window.inner_size())
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => log::warn!("Render error: {e:?}"),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = load_options(args.scenario.as_deref())?;

    log::info!("Starting N-body gravity simulation...");

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        options,
        paused: args.paused,
        window: None,
        gpu_state: None,
        mouse_pressed: false,
        last_mouse_pos: None,
    };

    event_loop.run_app(&mut app)?;
    Ok(())
}
