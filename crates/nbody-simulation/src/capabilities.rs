//! Device capability checks
//!
//! The compute step samples two textures and writes two storage textures per
//! invocation, so an adapter without compute shaders or with fewer than two
//! storage textures per stage cannot run the simulation.

use thiserror::Error;

/// Storage textures bound by the physics pass (position + velocity out)
pub const REQUIRED_STORAGE_TEXTURES: u32 = 2;

#[derive(Debug, Error)]
pub enum WorldStateError {
    #[error("adapter does not support compute shaders")]
    ComputeUnsupported,

    #[error("adapter allows {available} storage textures per shader stage, {required} required")]
    StorageTexturesUnsupported { available: u32, required: u32 },

    #[error("no particle state to read back")]
    Empty,

    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("readback buffer could not be mapped: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
}

/// What the device can do, reduced to what the simulation cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuCapabilities {
    pub max_texture_dimension_2d: u32,
    pub max_storage_textures_per_shader_stage: u32,
    pub compute_shaders: bool,
}

impl GpuCapabilities {
    pub fn new(downlevel: &wgpu::DownlevelCapabilities, limits: &wgpu::Limits) -> Self {
        Self {
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
            max_storage_textures_per_shader_stage: limits.max_storage_textures_per_shader_stage,
            compute_shaders: downlevel.flags.contains(wgpu::DownlevelFlags::COMPUTE_SHADERS),
        }
    }

    /// Capabilities of an opened device, using its adapter's downlevel flags
    pub fn from_device(adapter: &wgpu::Adapter, device: &wgpu::Device) -> Self {
        Self::new(&adapter.get_downlevel_capabilities(), &device.limits())
    }

    pub fn check(&self) -> Result<(), WorldStateError> {
        if !self.compute_shaders {
            return Err(WorldStateError::ComputeUnsupported);
        }
        if self.max_storage_textures_per_shader_stage < REQUIRED_STORAGE_TEXTURES {
            return Err(WorldStateError::StorageTexturesUnsupported {
                available: self.max_storage_textures_per_shader_stage,
                required: REQUIRED_STORAGE_TEXTURES,
            });
        }
        Ok(())
    }
}
