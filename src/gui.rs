use egui::Context;
use egui_wgpu::Renderer;
use egui_winit::State;
use nbody_physics::{GravityLaw, InitialDistribution, SpaceTopology, WorldStateOptions, WorldStats};
use wgpu::{Device, TextureFormat};
use winit::{event::WindowEvent, window::Window};

#[derive(Default)]
pub struct UiState {
    pub fps: f32,
    pub frame_time: f32,
    /// Edited in place; any change triggers a reseed
    pub options: WorldStateOptions,
    pub stats: Option<WorldStats>,
    pub n_particles: u32,
    pub tex_size: u32,
    pub ticks: u64,
    pub paused: bool,
}

pub struct Gui {
    context: Context,
    state: State,
    renderer: Renderer,
}

impl Gui {
    pub fn new(device: &Device, output_color_format: TextureFormat, window: &Window) -> Self {
        let context = Context::default();
        let id = context.viewport_id();

        let state = State::new(
            context.clone(),
            id,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );

        let renderer = Renderer::new(
            device,
            output_color_format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            context,
            state,
            renderer,
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    /// Draw the panels over `view`. Returns whether the options were edited.
    pub fn render(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        view: &wgpu::TextureView,
        ui_state: &mut UiState,
    ) -> bool {
        let raw_input = self.state.take_egui_input(window);

        let mut changed = false;
        let full_output = self.context.run(raw_input, |ctx| {
            changed |= Self::ui(ctx, ui_state);
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = window.inner_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.renderer
                .render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        changed
    }

    fn ui(ctx: &Context, state: &mut UiState) -> bool {
        // Diagnostics Panel (Top Left)
        egui::Window::new("Diagnostics")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.1}", state.fps));
                ui.label(format!("Frame Time: {:.2} ms", state.frame_time));
                ui.label(format!("Ticks: {}", state.ticks));
                if state.paused {
                    ui.label("Paused (Space)");
                }
            });

        // Statistics Panel (Top Right)
        egui::Window::new("Statistics")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!("Particles: {}", state.n_particles));
                ui.label(format!("Texture: {0}x{0}", state.tex_size));
                ui.separator();
                match &state.stats {
                    Some(stats) => {
                        ui.label(format!("Alive: {}", stats.alive));
                        ui.label(format!("Total Mass: {:.1}", stats.total_mass));
                        ui.label(format!("Momentum: {:.3e}", stats.momentum.length()));
                    }
                    None => {
                        ui.label("No particles");
                    }
                }
            });

        // Scenario files may hold values outside the slider ranges
        let options = &mut state.options;
        let mut changed = false;

        // Parameters (Bottom Left)
        egui::Window::new("Parameters")
            .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.heading("Physics");
                changed |= ui
                    .add(
                        egui::Slider::new(&mut options.space_radius, 1000.0..=10000.0)
                            .step_by(100.0)
                            .clamping(egui::SliderClamping::Edits)
                            .text("Universe Size"),
                    )
                    .changed();
                changed |= egui::ComboBox::from_label("Topology")
                    .selected_text(options.space_topology.label())
                    .show_ui(ui, |ui| {
                        SpaceTopology::ALL.iter().fold(false, |acc, &topology| {
                            ui.selectable_value(
                                &mut options.space_topology,
                                topology,
                                topology.label(),
                            )
                            .changed()
                                || acc
                        })
                    })
                    .inner
                    .unwrap_or(false);
                changed |= ui.checkbox(&mut options.collisions, "Collisions").changed();
                changed |= egui::ComboBox::from_label("Gravity Law")
                    .selected_text(options.gravity_law.label())
                    .show_ui(ui, |ui| {
                        GravityLaw::ALL.iter().fold(false, |acc, &law| {
                            ui.selectable_value(&mut options.gravity_law, law, law.label())
                                .changed()
                                || acc
                        })
                    })
                    .inner
                    .unwrap_or(false);
                if options.gravity_law.uses_strength() {
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut options.gravity, -100.0..=100.0)
                                .step_by(1.0)
                                .clamping(egui::SliderClamping::Edits)
                                .text("Strength"),
                        )
                        .changed();
                }
                if options.gravity_law.uses_mond_a0() {
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut options.gravity_mond_a0, 1.0..=1000.0)
                                .step_by(1.0)
                                .clamping(egui::SliderClamping::Edits)
                                .text("MOND a0"),
                        )
                        .changed();
                }
                changed |= ui
                    .add(
                        egui::Slider::new(&mut options.density, 0.01..=100.0)
                            .logarithmic(true)
                            .clamping(egui::SliderClamping::Edits)
                            .text("Density"),
                    )
                    .changed();

                ui.separator();
                ui.heading("Initial Condition");
                changed |= ui
                    .add(
                        egui::Slider::new(&mut options.n_particles, 10..=20000)
                            .step_by(10.0)
                            .clamping(egui::SliderClamping::Edits)
                            .text("Particles"),
                    )
                    .changed();
                changed |= egui::ComboBox::from_label("Distribution")
                    .selected_text(options.initial_distribution.label())
                    .show_ui(ui, |ui| {
                        InitialDistribution::ALL.iter().fold(false, |acc, &distribution| {
                            ui.selectable_value(
                                &mut options.initial_distribution,
                                distribution,
                                distribution.label(),
                            )
                            .changed()
                                || acc
                        })
                    })
                    .inner
                    .unwrap_or(false);
                changed |= ui
                    .add(
                        egui::Slider::new(&mut options.initial_mass, 0.0..=1000.0)
                            .step_by(1.0)
                            .clamping(egui::SliderClamping::Edits)
                            .text("Initial Mass"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut options.initial_velocity, 0.0..=5000.0)
                            .step_by(10.0)
                            .clamping(egui::SliderClamping::Edits)
                            .text("Initial Velocity"),
                    )
                    .changed();
            });

        changed
    }
}
