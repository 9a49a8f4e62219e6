//! # N-Body Physics
//!
//! Particle state layout, parameters, seeding and the per-texel gravity kernel
//! shared by the GPU simulation and the CPU reference world.

pub mod constants;
pub mod cpu;
pub mod kernel;
pub mod params;
pub mod particle;
pub mod seeding;

pub use constants::*;
pub use cpu::*;
pub use kernel::*;
pub use params::*;
pub use particle::*;
pub use seeding::*;
