//! Temperature gradient used to colour particles by mass
//!
//! Light bodies sit at the cold (blue) end, the heaviest at the hot (red) end.
//! The shader samples it at `clamp(log(mass / 100) / 30, 0, 1)`.

use catppuccin::PALETTE;
use nbody_physics::{COLOR_LOG_RANGE, COLOR_MASS_REFERENCE};

pub const LOOKUP_WIDTH: u32 = 256;

/// Gradient stops, cold to hot
fn stops() -> [[u8; 3]; 7] {
    let c = &PALETTE.mocha.colors;
    [
        &c.blue, &c.sapphire, &c.teal, &c.green, &c.yellow, &c.peach, &c.red,
    ]
    .map(|color| {
        let rgb = &color.rgb;
        [rgb.r, rgb.g, rgb.b]
    })
}

/// Gradient position of a body of `mass`
pub fn lookup_coordinate(mass: f32) -> f32 {
    ((mass / COLOR_MASS_REFERENCE).ln() / COLOR_LOG_RANGE).clamp(0.0, 1.0)
}

/// Linear interpolation between stops at `t` in `[0, 1]`
pub fn sample(t: f32) -> [u8; 4] {
    let stops = stops();
    let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
    let index = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - index as f32;

    let (a, b) = (stops[index], stops[index + 1]);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * frac).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]), 255]
}

/// 256x1 sRGB texture of the gradient plus its clamping sampler
pub struct ColorLookup {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl ColorLookup {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texels: Vec<[u8; 4]> = (0..LOOKUP_WIDTH)
            .map(|i| sample(i as f32 / (LOOKUP_WIDTH - 1) as f32))
            .collect();

        let size = wgpu::Extent3d {
            width: LOOKUP_WIDTH,
            height: 1,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Color Lookup Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(LOOKUP_WIDTH * 4),
                rows_per_image: Some(1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Color Lookup Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            _texture: texture,
            view,
            sampler,
        }
    }
}
