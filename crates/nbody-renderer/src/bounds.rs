//! Dashed outline of the simulation cube `[-R, R]^3`

use crate::renderer::DEPTH_FORMAT;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

/// #2f2f2f in linear at 40% opacity
const BOUNDS_COLOR: [f32; 4] = [0.02842, 0.02842, 0.02842, 0.4];

/// Dashes per cube edge
const DASHES_PER_EDGE: f32 = 20.0;

/// Corner pairs of the unit cube, corners indexed by bits (x=1, y=2, z=4)
const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BoundsVertex {
    /// Corner of the unit cube, scaled by the space radius in the shader
    pub position: [f32; 3],
    /// Distance along the edge in unit-cube lengths (0 or 2)
    pub along: f32,
}

impl BoundsVertex {
    pub const fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: &[wgpu::VertexAttribute] = &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32,
            },
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BoundsVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: ATTRIBUTES,
        }
    }
}

fn cube_corner(index: usize) -> Vec3 {
    let axis = |bit: usize| if index & bit != 0 { 1.0 } else { -1.0 };
    Vec3::new(axis(1), axis(2), axis(4))
}

/// Line list of the twelve unit cube edges
pub fn cube_edges() -> Vec<BoundsVertex> {
    EDGES
        .iter()
        .flat_map(|&(a, b)| {
            let start = cube_corner(a);
            let end = cube_corner(b);
            [
                BoundsVertex {
                    position: start.to_array(),
                    along: 0.0,
                },
                BoundsVertex {
                    position: end.to_array(),
                    along: start.distance(end),
                },
            ]
        })
        .collect()
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct BoundsUniform {
    color: [f32; 4],
    space_radius: f32,
    dash_length: f32,
    _padding: [f32; 2],
}

pub struct BoundsRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    bounds_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl BoundsRenderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bounds Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/bounds.wgsl").into()),
        });

        let vertices = cube_edges();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Bounds Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let bounds_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Bounds Uniform Buffer"),
            size: std::mem::size_of::<BoundsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform = |binding, visibility| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bounds Bind Group Layout"),
            entries: &[
                // Camera - Binding 0
                uniform(0, wgpu::ShaderStages::VERTEX),
                // Bounds - Binding 1
                uniform(1, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bounds Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Bounds Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vertex"),
                buffers: &[BoundsVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fragment"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            // Drawn over everything, no depth test
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            bounds_buffer,
            bind_group_layout,
        }
    }

    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        render_pass: &mut wgpu::RenderPass,
        camera_buffer: &wgpu::Buffer,
        space_radius: f32,
    ) {
        let edge_length = 2.0 * space_radius;
        queue.write_buffer(
            &self.bounds_buffer,
            0,
            bytemuck::cast_slice(&[BoundsUniform {
                color: BOUNDS_COLOR,
                space_radius,
                dash_length: edge_length / DASHES_PER_EDGE,
                _padding: [0.0; 2],
            }]),
        );

        // Create bind group for this frame
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bounds Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.bounds_buffer.as_entire_binding(),
                },
            ],
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_has_twelve_axis_aligned_edges() {
        let vertices = cube_edges();
        assert_eq!(vertices.len(), 24);

        for pair in vertices.chunks(2) {
            let a = Vec3::from_array(pair[0].position);
            let b = Vec3::from_array(pair[1].position);
            let diff = (b - a).abs();
            let changed = [diff.x, diff.y, diff.z].iter().filter(|&&d| d > 0.0).count();

            assert_eq!(changed, 1, "edge {a} -> {b} is not axis aligned");
            assert_eq!(pair[0].along, 0.0);
            assert_eq!(pair[1].along, 2.0);
        }
    }

    #[test]
    fn test_edges_are_unique() {
        let vertices = cube_edges();
        let mut edges: Vec<_> = vertices
            .chunks(2)
            .map(|pair| {
                let key = |v: &BoundsVertex| v.position.map(|c| c as i32);
                let (a, b) = (key(&pair[0]), key(&pair[1]));
                if a < b { (a, b) } else { (b, a) }
            })
            .collect();
        edges.sort();
        edges.dedup();
        assert_eq!(edges.len(), 12);
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<BoundsVertex>(), 16);
        assert_eq!(std::mem::size_of::<BoundsUniform>(), 32);
    }
}
