//! # N-Body Simulation Engine
//!
//! GPU-resident particle state in `Rgba32Float` textures, advanced by a
//! ping-pong compute pass.

pub mod capabilities;
pub mod compute;
pub mod params;
pub mod world;

pub use capabilities::*;
pub use compute::*;
pub use params::*;
pub use world::*;
