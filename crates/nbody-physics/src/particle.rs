//! Texel-grid particle state
//!
//! N particles are stored in a square grid of side `tex_size`. Texel `(x, y)`
//! holds particle `y * tex_size + x` in two channels:
//! - position: `[x, y, z, radius]`
//! - velocity: `[vx, vy, vz, mass]`
//!
//! A negative mass marks a dead (merged-away or unused) texel.

use glam::Vec3;

use crate::constants::{DEAD_MASS, TEXTURE_SIZES};

/// Radius of a body of `mass` at uniform `density`
pub fn radius_for_mass(mass: f32, density: f32) -> f32 {
    (mass * 3.0 / (4.0 * std::f32::consts::PI) / density).cbrt()
}

/// Smallest ladder size whose square holds `n_particles`, capped by the device.
///
/// Ladder entries above `max_dimension` are never chosen; when nothing fits
/// the device maximum is returned even if it is too small.
pub fn texture_size_for(n_particles: u32, max_dimension: u32) -> u32 {
    let n = n_particles as u64;
    for size in TEXTURE_SIZES {
        if size > max_dimension {
            break;
        }
        if n <= size as u64 * size as u64 {
            return size;
        }
    }
    max_dimension
}

/// Texel coordinates of a linear particle id
pub fn texel_coords(id: u32, tex_size: u32) -> (u32, u32) {
    (id % tex_size, id / tex_size)
}

/// Read-only view of one texel with liveness made explicit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Particle {
    Alive {
        position: Vec3,
        velocity: Vec3,
        mass: f32,
        radius: f32,
    },
    Dead,
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        matches!(self, Particle::Alive { .. })
    }

    pub fn mass(&self) -> Option<f32> {
        match self {
            Particle::Alive { mass, .. } => Some(*mass),
            Particle::Dead => None,
        }
    }
}

/// One complete snapshot of the particle state, laid out like the textures
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleGrid {
    tex_size: u32,
    /// `[x, y, z, radius]` per texel
    pub positions: Vec<[f32; 4]>,
    /// `[vx, vy, vz, mass]` per texel
    pub velocities: Vec<[f32; 4]>,
}

impl ParticleGrid {
    /// Grid with every texel dead and parked at the origin
    pub fn dead(tex_size: u32) -> Self {
        let texels = (tex_size * tex_size) as usize;
        Self {
            tex_size,
            positions: vec![[0.0; 4]; texels],
            velocities: vec![[0.0, 0.0, 0.0, DEAD_MASS]; texels],
        }
    }

    /// Rebuild a grid from raw channel data (e.g. a GPU readback)
    pub fn from_channels(
        tex_size: u32,
        positions: Vec<[f32; 4]>,
        velocities: Vec<[f32; 4]>,
    ) -> Self {
        debug_assert_eq!(positions.len(), (tex_size * tex_size) as usize);
        debug_assert_eq!(velocities.len(), positions.len());
        Self {
            tex_size,
            positions,
            velocities,
        }
    }

    pub fn tex_size(&self) -> u32 {
        self.tex_size
    }

    pub fn texel_count(&self) -> usize {
        self.positions.len()
    }

    /// Overwrite texel `id` with a live body
    pub fn set(&mut self, id: usize, position: Vec3, velocity: Vec3, mass: f32, radius: f32) {
        self.positions[id] = [position.x, position.y, position.z, radius];
        self.velocities[id] = [velocity.x, velocity.y, velocity.z, mass];
    }

    pub fn particle(&self, id: usize) -> Particle {
        let p = self.positions[id];
        let v = self.velocities[id];
        if v[3] < 0.0 {
            Particle::Dead
        } else {
            Particle::Alive {
                position: Vec3::new(p[0], p[1], p[2]),
                velocity: Vec3::new(v[0], v[1], v[2]),
                mass: v[3],
                radius: p[3],
            }
        }
    }

    pub fn particles(&self) -> impl Iterator<Item = Particle> + '_ {
        (0..self.texel_count()).map(|id| self.particle(id))
    }

    /// Aggregate statistics over the live particles
    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats::default();
        for particle in self.particles() {
            if let Particle::Alive { velocity, mass, .. } = particle {
                stats.alive += 1;
                stats.total_mass += mass as f64;
                stats.momentum += velocity.as_dvec3() * mass as f64;
            }
        }
        stats
    }
}

/// Summary of a [`ParticleGrid`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldStats {
    pub alive: u32,
    pub total_mass: f64,
    pub momentum: glam::DVec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_size_ladder() {
        assert_eq!(texture_size_for(1, 16384), 128);
        assert_eq!(texture_size_for(10000, 16384), 128);
        assert_eq!(texture_size_for(16384, 16384), 128);
        assert_eq!(texture_size_for(16385, 16384), 256);
        assert_eq!(texture_size_for(20000, 16384), 256);
        assert_eq!(texture_size_for(1_000_000, 16384), 1024);
    }

    #[test]
    fn test_texture_size_capped_by_device() {
        // 300k needs 1024 but the device tops out at 512
        assert_eq!(texture_size_for(300_000, 512), 512);
        // Device smaller than the first ladder entry
        assert_eq!(texture_size_for(10, 64), 64);
    }

    #[test]
    fn test_radius_for_mass_matches_volume() {
        let radius = radius_for_mass(4.0 / 3.0 * std::f32::consts::PI, 1.0);
        assert!((radius - 1.0).abs() < 1e-6);

        // Eight times the mass doubles the radius
        let r1 = radius_for_mass(100.0, 2.0);
        let r8 = radius_for_mass(800.0, 2.0);
        assert!((r8 / r1 - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_dead_grid_is_inert() {
        let grid = ParticleGrid::dead(128);
        assert_eq!(grid.texel_count(), 128 * 128);
        assert!(grid.particles().all(|p| p == Particle::Dead));
        assert_eq!(grid.stats().alive, 0);
    }

    #[test]
    fn test_stats_sum_live_particles() {
        let mut grid = ParticleGrid::dead(128);
        grid.set(0, Vec3::ZERO, Vec3::X, 2.0, 1.0);
        grid.set(5, Vec3::ONE, Vec3::NEG_X * 2.0, 1.0, 1.0);

        let stats = grid.stats();
        assert_eq!(stats.alive, 2);
        assert_eq!(stats.total_mass, 3.0);
        assert!(stats.momentum.length() < 1e-12);
        assert_eq!(texel_coords(130, 128), (2, 1));
    }
}
