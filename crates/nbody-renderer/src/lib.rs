//! # N-body Renderer
//!
//! Point-sprite view of the world state plus the dashed space bounds.

pub mod bounds;
pub mod camera;
pub mod color_lookup;
pub mod renderer;

pub use bounds::*;
pub use camera::*;
pub use color_lookup::*;
pub use renderer::*;
