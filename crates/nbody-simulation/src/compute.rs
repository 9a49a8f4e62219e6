//! Ping-pong compute step over two texture sets
//!
//! Set `current` holds the latest state. A step binds it as sampled input and
//! the other set as storage output, then flips `current`. The freshly seeded
//! textures live in a third, upload-only set that `prime` copies into set 0.

use crate::SimParams;
use nbody_physics::ParticleGrid;
use wgpu::util::DeviceExt;

pub const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
const WORKGROUP_SIZE: u32 = 8;

/// Position and velocity textures of one snapshot
pub struct StateTextures {
    pub position: wgpu::Texture,
    pub velocity: wgpu::Texture,
    pub position_view: wgpu::TextureView,
    pub velocity_view: wgpu::TextureView,
}

impl StateTextures {
    fn new(device: &wgpu::Device, tex_size: u32, label: &str, usage: wgpu::TextureUsages) -> Self {
        let create = |name: &str| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&format!("{label} {name} Texture")),
                size: extent(tex_size),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: STATE_FORMAT,
                usage,
                view_formats: &[],
            })
        };
        let position = create("Position");
        let velocity = create("Velocity");
        let position_view = position.create_view(&wgpu::TextureViewDescriptor::default());
        let velocity_view = velocity.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            position,
            velocity,
            position_view,
            velocity_view,
        }
    }

    fn destroy(&self) {
        self.position.destroy();
        self.velocity.destroy();
    }
}

pub(crate) fn extent(tex_size: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: tex_size,
        height: tex_size,
        depth_or_array_layers: 1,
    }
}

pub struct ComputeStep {
    tex_size: u32,
    states: [StateTextures; 2],
    seed: StateTextures,
    params_buffer: wgpu::Buffer,

    step_pipeline: wgpu::ComputePipeline,
    prime_pipeline: wgpu::ComputePipeline,

    // [0]: read set 0, write set 1. [1]: read set 1, write set 0.
    step_bind_groups: [wgpu::BindGroup; 2],
    prime_bind_group: wgpu::BindGroup,

    current: usize,
}

impl ComputeStep {
    /// Upload `grid` and build everything needed to step it. Call [`prime`](Self::prime)
    /// before the first [`step`](Self::step).
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        params: &SimParams,
        grid: &ParticleGrid,
    ) -> Self {
        let tex_size = grid.tex_size();
        log::debug!("Creating {tex_size}x{tex_size} state textures...");

        let state_usage = wgpu::TextureUsages::STORAGE_BINDING
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST;
        let states = [
            StateTextures::new(device, tex_size, "State A", state_usage),
            StateTextures::new(device, tex_size, "State B", state_usage),
        ];
        let seed = StateTextures::new(
            device,
            tex_size,
            "Seed",
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        write_channel(queue, &seed.position, tex_size, &grid.positions);
        write_channel(queue, &seed.velocity, tex_size, &grid.velocities);

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sim Params Buffer"),
            contents: bytemuck::cast_slice(&[*params]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Physics Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/physics.wgsl").into()),
        });

        let sampled = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Texture {
                // Rgba32Float is not filterable without an extra feature
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let storage = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format: STATE_FORMAT,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Physics Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                sampled(1),
                sampled(2),
                storage(3),
                storage(4),
            ],
        });

        let bind = |label: &str, input: &StateTextures, output: &StateTextures| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&input.position_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&input.velocity_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(&output.position_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: wgpu::BindingResource::TextureView(&output.velocity_view),
                    },
                ],
            })
        };
        let step_bind_groups = [
            bind("Physics Bind Group A->B", &states[0], &states[1]),
            bind("Physics Bind Group B->A", &states[1], &states[0]),
        ];
        let prime_bind_group = bind("Prime Bind Group", &seed, &states[0]);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Physics Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let step_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Physics Step Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let prime_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Physics Prime Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("prime"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            tex_size,
            states,
            seed,
            params_buffer,
            step_pipeline,
            prime_pipeline,
            step_bind_groups,
            prime_bind_group,
            current: 0,
        }
    }

    fn workgroups(&self) -> u32 {
        self.tex_size.div_ceil(WORKGROUP_SIZE)
    }

    /// Copy the seeded textures into set 0 and make it current
    pub fn prime(&mut self, encoder: &mut wgpu::CommandEncoder) {
        let workgroups = self.workgroups();
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Physics Prime Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.prime_pipeline);
        pass.set_bind_group(0, &self.prime_bind_group, &[]);
        pass.dispatch_workgroups(workgroups, workgroups, 1);
        self.current = 0;
    }

    /// Record one physics step and swap
    pub fn step(&mut self, encoder: &mut wgpu::CommandEncoder) {
        let workgroups = self.workgroups();
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Physics Step Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.step_pipeline);
            pass.set_bind_group(0, &self.step_bind_groups[self.current], &[]);
            pass.dispatch_workgroups(workgroups, workgroups, 1);
        }
        self.current = 1 - self.current;
    }

    pub fn tex_size(&self) -> u32 {
        self.tex_size
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Textures holding the latest state
    pub fn current(&self) -> &StateTextures {
        &self.states[self.current]
    }

    /// Free GPU memory now instead of on drop
    pub fn destroy(&self) {
        for state in &self.states {
            state.destroy();
        }
        self.seed.destroy();
        self.params_buffer.destroy();
    }
}

fn write_channel(queue: &wgpu::Queue, texture: &wgpu::Texture, tex_size: u32, data: &[[f32; 4]]) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(data),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(tex_size * 16),
            rows_per_image: Some(tex_size),
        },
        extent(tex_size),
    );
}
