//! Initial conditions for a fresh world

use glam::Vec3;
use rand::Rng;

use crate::constants::{CUBICAL_JITTER, INITIAL_VELOCITY_SCALE};
use crate::params::{InitialDistribution, WorldStateOptions};
use crate::particle::{radius_for_mass, ParticleGrid};

/// Vector of `length` in a direction uniformly distributed on the unit sphere
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R, length: f32) -> Vec3 {
    let theta = (rng.random::<f32>() * 2.0 - 1.0).acos();
    let phi = rng.random::<f32>() * std::f32::consts::TAU;
    let sin_theta = theta.sin();
    Vec3::new(
        length * sin_theta * phi.cos(),
        length * sin_theta * phi.sin(),
        length * theta.cos(),
    )
}

/// Largest `k` with `k³ <= n`
fn cube_root_floor(n: usize) -> usize {
    let mut k = (n as f64).cbrt() as usize;
    while (k + 1).pow(3) <= n {
        k += 1;
    }
    while k > 0 && k.pow(3) > n {
        k -= 1;
    }
    k
}

/// Seed `options.n_particles` bodies into a grid of side `tex_size`.
///
/// Texels past the particle count stay dead. Every body starts with the same
/// mass, so every radius is the same too.
pub fn seed_grid<R: Rng + ?Sized>(
    options: &WorldStateOptions,
    tex_size: u32,
    rng: &mut R,
) -> ParticleGrid {
    let mut grid = ParticleGrid::dead(tex_size);
    let count = (options.n_particles as usize).min(grid.texel_count());
    if count < options.n_particles as usize {
        log::warn!(
            "{} particles requested but a {}x{} grid only holds {}",
            options.n_particles,
            tex_size,
            tex_size,
            count
        );
    }

    let mass = options.initial_mass;
    let radius = radius_for_mass(mass, options.density);

    let per_axis = cube_root_floor(options.n_particles as usize).max(1);
    let per_axis2 = per_axis * per_axis;
    let separation = options.space_radius * 2.0 / per_axis as f32;

    for i in 0..count {
        let position = match options.initial_distribution {
            // cbrt keeps density uniform per unit volume
            InitialDistribution::Spherical => {
                let length = rng.random::<f32>().cbrt() * options.space_radius;
                random_direction(rng, length)
            }
            // Indices past per_axis³ wrap back onto the lattice
            InitialDistribution::Cubical => {
                let cell = Vec3::new(
                    (i % per_axis) as f32,
                    ((i / per_axis) % per_axis) as f32,
                    ((i / per_axis2) % per_axis) as f32,
                );
                let mut jitter = || rng.random::<f32>() * 2.0 * CUBICAL_JITTER - CUBICAL_JITTER;
                let offset = Vec3::new(jitter(), jitter(), jitter());
                Vec3::splat(-options.space_radius) + (cell + offset) * separation
            }
        };

        let speed = rng.random::<f32>() * options.initial_velocity * INITIAL_VELOCITY_SCALE;
        let velocity = random_direction(rng, speed);

        grid.set(i, position, velocity, mass, radius);
    }

    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn options(n_particles: u32, distribution: InitialDistribution) -> WorldStateOptions {
        WorldStateOptions {
            n_particles,
            initial_distribution: distribution,
            space_radius: 50.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_cube_root_floor_is_exact() {
        assert_eq!(cube_root_floor(0), 0);
        assert_eq!(cube_root_floor(26), 2);
        assert_eq!(cube_root_floor(27), 3);
        assert_eq!(cube_root_floor(10000), 21);
        assert_eq!(cube_root_floor(1_000_000), 100);
    }

    #[test]
    fn test_random_direction_has_requested_length() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let v = random_direction(&mut rng, 3.5);
            assert!((v.length() - 3.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_spherical_seed_stays_inside_sphere() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = seed_grid(&options(1000, InitialDistribution::Spherical), 128, &mut rng);

        let radius = radius_for_mass(100.0, 1.0);
        for id in 0..1000 {
            match grid.particle(id) {
                Particle::Alive {
                    position,
                    velocity,
                    mass,
                    radius: r,
                } => {
                    assert!(position.length() <= 50.0 + 1e-3);
                    assert!(velocity.length() <= 100.0 * 0.01 + 1e-5);
                    assert_eq!(mass, 100.0);
                    assert_eq!(r, radius);
                }
                Particle::Dead => panic!("particle {id} should be alive"),
            }
        }
    }

    #[test]
    fn test_unused_texels_are_dead_and_zeroed() {
        let mut rng = StdRng::seed_from_u64(2);
        let grid = seed_grid(&options(10, InitialDistribution::Spherical), 128, &mut rng);

        assert_eq!(grid.stats().alive, 10);
        for id in 10..grid.texel_count() {
            assert_eq!(grid.positions[id], [0.0; 4]);
            assert_eq!(grid.velocities[id], [0.0, 0.0, 0.0, -1.0]);
        }
    }

    #[test]
    fn test_cubical_seed_places_lattice_with_jitter() {
        let mut rng = StdRng::seed_from_u64(3);
        // 27 = 3³, separation = 100 / 3
        let grid = seed_grid(&options(27, InitialDistribution::Cubical), 128, &mut rng);
        let separation = 100.0 / 3.0;

        for id in 0..27 {
            let p = grid.positions[id];
            let cell = [id % 3, (id / 3) % 3, id / 9];
            for axis in 0..3 {
                let expected = -50.0 + cell[axis] as f32 * separation;
                assert!((p[axis] - expected).abs() <= 0.1 * separation + 1e-3);
            }
        }
    }

    #[test]
    fn test_cubical_overflow_wraps_onto_lattice() {
        let mut rng = StdRng::seed_from_u64(4);
        // floor(cbrt(10)) = 2, so ids 8 and 9 reuse cells 0 and 1
        let grid = seed_grid(&options(10, InitialDistribution::Cubical), 128, &mut rng);
        let separation = 50.0;

        let p8 = grid.positions[8];
        let p0 = grid.positions[0];
        for axis in 0..3 {
            assert!((p8[axis] - p0[axis]).abs() <= 0.2 * separation + 1e-3);
        }
        assert_eq!(grid.stats().alive, 10);
    }
}
