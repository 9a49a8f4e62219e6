//! World state manager
//!
//! Owns the compute step and everything derived from the current options.
//! Any parameter change goes through [`WorldState::restart`]; live state is
//! never re-parameterized in place.

use crate::compute::{extent, ComputeStep, StateTextures};
use crate::{GpuCapabilities, SimParams, WorldStateError};
use nbody_physics::{seed_grid, texture_size_for, KernelParams, ParticleGrid, WorldStateOptions};

pub struct WorldState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    capabilities: GpuCapabilities,

    step: Option<ComputeStep>,
    params: Option<KernelParams>,
    camera_scale: f32,
    ticks: u64,
}

impl WorldState {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, capabilities: GpuCapabilities) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            capabilities,
            step: None,
            params: None,
            camera_scale: 1.0,
            ticks: 0,
        }
    }

    /// Dispose current state, seed `options.n_particles` bodies and prime the buffers.
    ///
    /// On error nothing is initialised and the world stays empty.
    pub fn restart(&mut self, options: &WorldStateOptions) -> Result<(), WorldStateError> {
        self.dispose();
        self.capabilities.check()?;

        let tex_size = texture_size_for(
            options.n_particles,
            self.capabilities.max_texture_dimension_2d,
        );
        let grid = seed_grid(options, tex_size, &mut rand::rng());
        self.restart_with_grid(KernelParams::from_options(options), &grid)
    }

    /// Like [`restart`](Self::restart) but with an explicit initial snapshot
    pub fn restart_with_grid(
        &mut self,
        params: KernelParams,
        grid: &ParticleGrid,
    ) -> Result<(), WorldStateError> {
        self.dispose();
        self.capabilities.check()?;

        let tex_size = grid.tex_size();
        log::info!(
            "Restarting world: {} particles in a {}x{} grid, {:?} gravity, {:?} space",
            params.n_particles,
            tex_size,
            tex_size,
            params.gravity_law,
            params.topology
        );

        let sim_params = SimParams::new(&params, tex_size);
        let mut step = ComputeStep::new(&self.device, &self.queue, &sim_params, grid);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Prime Encoder"),
            });
        step.prime(&mut encoder);
        self.queue.submit(std::iter::once(encoder.finish()));

        self.step = Some(step);
        self.params = Some(params);
        self.ticks = 0;
        Ok(())
    }

    /// Advance one step. No-op while empty.
    pub fn tick(&mut self) {
        let Some(step) = self.step.as_mut() else {
            return;
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Physics Encoder"),
            });
        step.step(&mut encoder);
        self.queue.submit(std::iter::once(encoder.finish()));
        self.ticks += 1;
    }

    /// Only feeds sprite sizing
    pub fn update_camera_scale(&mut self, value: f32) {
        self.camera_scale = value;
    }

    /// Release textures and pipelines. Safe to call when empty.
    pub fn dispose(&mut self) {
        if let Some(step) = self.step.take() {
            step.destroy();
        }
        self.params = None;
        self.ticks = 0;
    }

    pub fn is_ready(&self) -> bool {
        self.step.is_some()
    }

    /// Textures holding the latest state
    pub fn latest(&self) -> Option<&StateTextures> {
        self.step.as_ref().map(ComputeStep::current)
    }

    pub fn capabilities(&self) -> &GpuCapabilities {
        &self.capabilities
    }

    pub fn tex_size(&self) -> u32 {
        self.step.as_ref().map_or(0, ComputeStep::tex_size)
    }

    pub fn n_particles(&self) -> u32 {
        self.params.map_or(0, |p| p.n_particles)
    }

    pub fn density(&self) -> f32 {
        self.params.map_or(1.0, |p| p.density)
    }

    pub fn camera_scale(&self) -> f32 {
        self.camera_scale
    }

    /// Ticks since the last restart
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Blocking copy of the latest state back to the CPU
    pub fn read_back(&self) -> Result<ParticleGrid, WorldStateError> {
        let latest = self.latest().ok_or(WorldStateError::Empty)?;
        let tex_size = self.tex_size();

        let unpadded_row = tex_size * 16;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row = unpadded_row.div_ceil(align) * align;
        let channel_size = padded_row as u64 * tex_size as u64;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("State Readback Buffer"),
            size: channel_size * 2,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        for (texture, offset) in [(&latest.position, 0), (&latest.velocity, channel_size)] {
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &staging,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset,
                        bytes_per_row: Some(padded_row),
                        rows_per_image: Some(tex_size),
                    },
                },
                extent(tex_size),
            );
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })?;
        rx.recv().unwrap_or(Err(wgpu::BufferAsyncError))?;

        let (positions, velocities) = {
            let data = slice.get_mapped_range();
            let unpad = |bytes: &[u8]| -> Vec<[f32; 4]> {
                bytes
                    .chunks(padded_row as usize)
                    .flat_map(|row| {
                        bytemuck::cast_slice::<u8, [f32; 4]>(&row[..unpadded_row as usize]).to_vec()
                    })
                    .collect()
            };
            let split = channel_size as usize;
            (unpad(&data[..split]), unpad(&data[split..]))
        };
        staging.unmap();

        Ok(ParticleGrid::from_channels(tex_size, positions, velocities))
    }
}

impl Drop for WorldState {
    fn drop(&mut self) {
        self.dispose();
    }
}
