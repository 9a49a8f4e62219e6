//! Ties the world state, renderers and camera together

use nbody_physics::{SpaceTopology, WorldStateOptions, WorldStats};
use nbody_renderer::{BoundsRenderer, Camera, ParticleDraw, ParticleRenderer};
use nbody_simulation::{GpuCapabilities, WorldState};
use winit::keyboard::KeyCode;

pub struct Simulator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    world: WorldState,
    renderer: ParticleRenderer,
    bounds: BoundsRenderer,
    pub camera: Camera,
    options: WorldStateOptions,
    paused: bool,
}

impl Simulator {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        config: &wgpu::SurfaceConfiguration,
        capabilities: GpuCapabilities,
        options: WorldStateOptions,
        paused: bool,
    ) -> Self {
        let world = WorldState::new(device, queue, capabilities);
        let renderer = ParticleRenderer::new(device, queue, config);
        let bounds = BoundsRenderer::new(device, config.format);
        let camera = Camera::new(config.width, config.height);

        let mut simulator = Self {
            device: device.clone(),
            queue: queue.clone(),
            world,
            renderer,
            bounds,
            camera,
            options,
            paused,
        };
        simulator.on_options_updated();
        simulator
    }

    pub fn options(&self) -> &WorldStateOptions {
        &self.options
    }

    /// Replace the options and reseed
    pub fn set_options(&mut self, options: WorldStateOptions) {
        self.options = options;
        self.on_options_updated();
    }

    /// Reframe the camera and reseed from the current options.
    ///
    /// A failed restart leaves an empty world; frames keep rendering without
    /// particles.
    pub fn on_options_updated(&mut self) {
        self.camera.frame_space(self.options.space_radius);

        if let Err(err) = self.world.restart(&self.options) {
            log::error!("Restart failed: {err}");
        }
        self.world.update_camera_scale(self.camera.camera_scale());
        self.world.tick();
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!("Simulation {}", if self.paused { "paused" } else { "running" });
    }

    /// Simulator key bindings; returns whether `key` was handled
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Space => {
                self.toggle_pause();
                true
            }
            KeyCode::KeyR => {
                self.on_options_updated();
                true
            }
            _ => false,
        }
    }

    pub fn set_size(&mut self, config: &wgpu::SurfaceConfiguration) {
        self.camera.resize(config.width, config.height);
        self.renderer.resize(&self.device, config);
        self.world.update_camera_scale(self.camera.camera_scale());
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Blocking readback of the latest state; `None` while empty or on failure
    pub fn stats(&self) -> Option<WorldStats> {
        if !self.world.is_ready() {
            return None;
        }
        match self.world.read_back() {
            Ok(grid) => Some(grid.stats()),
            Err(err) => {
                log::warn!("Statistics readback failed: {err}");
                None
            }
        }
    }

    /// Advance one tick unless paused, then draw the particles and, for a
    /// torus, the space bounds
    pub fn render(&mut self, view: &wgpu::TextureView) {
        if !self.paused {
            self.world.tick();
        }

        let draw = self.world.latest().map(|textures| ParticleDraw {
            position: &textures.position_view,
            velocity: &textures.velocity_view,
            tex_size: self.world.tex_size(),
            n_particles: self.world.n_particles(),
            density: self.world.density(),
            camera_scale: self.world.camera_scale(),
        });
        self.renderer
            .render(&self.device, &self.queue, view, &self.camera, draw.as_ref());

        if self.options.space_topology != SpaceTopology::Torus {
            return;
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Bounds Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Bounds Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.renderer.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.bounds.render(
                &self.device,
                &self.queue,
                &mut render_pass,
                &self.renderer.camera_buffer,
                self.options.space_radius,
            );
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}
