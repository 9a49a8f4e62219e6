//! Uniform block read by the physics compute shader

use bytemuck::{Pod, Zeroable};
use nbody_physics::KernelParams;

/// Mirrors `SimParams` in `shaders/physics.wgsl`. Field order is load-bearing.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SimParams {
    // Group 1: Layout and modes
    pub n_particles: u32,
    pub tex_size: u32,
    pub space_topology: u32,
    pub gravity_law: u32,

    // Group 2: Space and bodies
    pub space_radius: f32,
    /// 0 or 1
    pub collisions: u32,
    pub density: f32,
    pub g: f32,

    // Group 3: MOND and integration
    pub mond_a0: f32,
    pub dt: f32,
    pub _padding: [f32; 2],
}

impl SimParams {
    pub fn new(params: &KernelParams, tex_size: u32) -> Self {
        Self {
            n_particles: params.n_particles,
            tex_size,
            space_topology: params.topology.code(),
            gravity_law: params.gravity_law.code(),
            space_radius: params.space_radius,
            collisions: params.collisions as u32,
            density: params.density,
            g: params.g,
            mond_a0: params.mond_a0,
            dt: params.dt,
            _padding: [0.0; 2],
        }
    }
}
