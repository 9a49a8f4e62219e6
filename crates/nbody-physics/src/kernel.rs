//! Per-texel physics kernel
//!
//! NOTE: This is the CPU reference of the compute shader in `nbody-simulation`
//! (`shaders/physics.wgsl`). Both must stay in lockstep: same scan order, same
//! collision rule, same wrap. The GPU path is what the application runs; this
//! one backs tests and headless use.

use glam::Vec3;

use crate::constants::{COLLISION_DISTANCE_FACTOR, DEAD_MASS};
use crate::params::{GravityLaw, KernelParams, SpaceTopology};
use crate::particle::{radius_for_mass, ParticleGrid};

/// Wrap one coordinate into `[-radius, radius)` (GLSL-style `mod`).
///
/// Rounding can land exactly on `+radius`; that point is folded onto `-radius`.
pub fn wrap_coordinate(x: f32, radius: f32) -> f32 {
    let span = 2.0 * radius;
    let shifted = x + radius;
    let w = shifted - span * (shifted / span).floor() - radius;
    if w >= radius || w < -radius {
        -radius
    } else {
        w
    }
}

/// Wrap every axis of `v` into the periodic cube
pub fn wrap_torus(v: Vec3, radius: f32) -> Vec3 {
    Vec3::new(
        wrap_coordinate(v.x, radius),
        wrap_coordinate(v.y, radius),
        wrap_coordinate(v.z, radius),
    )
}

/// Next state of texel `id`, computed from the complete previous snapshot.
///
/// Returns `(position, velocity)` in the texture channel layout. Dead texels
/// come back untouched. The scan covers `params.n_particles` ids, not the
/// whole grid.
pub fn step_texel(id: usize, grid: &ParticleGrid, params: &KernelParams) -> ([f32; 4], [f32; 4]) {
    let pos_in = grid.positions[id];
    let vel_in = grid.velocities[id];

    let mut mass = vel_in[3];
    if mass < 0.0 {
        return (pos_in, vel_in);
    }

    let position = Vec3::new(pos_in[0], pos_in[1], pos_in[2]);
    let mut velocity = Vec3::new(vel_in[0], vel_in[1], vel_in[2]);
    let mut radius = pos_in[3];
    let torus = params.topology == SpaceTopology::Torus;

    let mut accel = Vec3::ZERO;
    let count = (params.n_particles as usize).min(grid.texel_count());

    for j in 0..count {
        if j == id {
            continue;
        }
        let other_vel = grid.velocities[j];
        let other_mass = other_vel[3];
        if other_mass <= 0.0 {
            continue;
        }
        let other_pos = grid.positions[j];
        let other_radius = other_pos[3];

        let mut r = Vec3::new(other_pos[0], other_pos[1], other_pos[2]) - position;
        if torus {
            r = wrap_torus(r, params.space_radius);
        }
        let r2 = r.length_squared();

        if params.collisions {
            // Uses the radius grown by earlier merges in this scan
            let reach = COLLISION_DISTANCE_FACTOR * (radius + other_radius);
            if r2 <= reach * reach {
                if id < j {
                    let other_velocity = Vec3::new(other_vel[0], other_vel[1], other_vel[2]);
                    velocity = (velocity * mass + other_velocity * other_mass) / (mass + other_mass);
                    mass += other_mass;
                    radius = radius_for_mass(mass, params.density);
                    continue;
                }
                return (pos_in, [0.0, 0.0, 0.0, DEAD_MASS]);
            }
        }

        match params.gravity_law {
            GravityLaw::None => {}
            GravityLaw::Newton => {
                accel += r * (other_mass / (r2 * r2.sqrt()));
            }
            GravityLaw::Mond => {
                let distance = r2.sqrt();
                let a_newton = params.g * other_mass / r2;
                let a_mond = (params.g * other_mass * params.mond_a0).sqrt() / distance;
                let magnitude = if a_newton >= params.mond_a0 {
                    a_newton
                } else {
                    a_mond
                };
                accel += r * (magnitude / distance);
            }
        }
    }

    if params.gravity_law == GravityLaw::Newton {
        accel *= params.g;
    }

    let dt = params.dt;
    velocity += accel * dt;
    let mut next = position + velocity * dt + 0.5 * accel * dt * dt;
    if torus {
        next = wrap_torus(next, params.space_radius);
    }

    (
        [next.x, next.y, next.z, radius],
        [velocity.x, velocity.y, velocity.z, mass],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::WorldStateOptions;

    fn params(options: WorldStateOptions) -> KernelParams {
        KernelParams::from_options(&options)
    }

    fn two_body(distance: f32, m1: f32, m2: f32) -> ParticleGrid {
        let mut grid = ParticleGrid::dead(128);
        grid.set(0, Vec3::new(-distance / 2.0, 0.0, 0.0), Vec3::ZERO, m1, 1.0);
        grid.set(1, Vec3::new(distance / 2.0, 0.0, 0.0), Vec3::ZERO, m2, 1.0);
        grid
    }

    #[test]
    fn test_wrap_coordinate_range() {
        assert_eq!(wrap_coordinate(0.0, 10.0), 0.0);
        assert_eq!(wrap_coordinate(10.0, 10.0), -10.0);
        assert_eq!(wrap_coordinate(-10.0, 10.0), -10.0);
        assert!((wrap_coordinate(12.5, 10.0) - -7.5).abs() < 1e-5);
        assert!((wrap_coordinate(-12.5, 10.0) - 7.5).abs() < 1e-5);
        assert!((wrap_coordinate(45.0, 10.0) - 5.0).abs() < 1e-4);
        assert!(wrap_coordinate(f32::NAN, 10.0).is_nan());
    }

    #[test]
    fn test_dead_texel_passes_through() {
        let mut grid = two_body(10.0, 5.0, 5.0);
        grid.positions[1] = [3.0, 4.0, 5.0, 0.5];
        grid.velocities[1] = [1.0, 2.0, 3.0, -1.0];

        let out = step_texel(1, &grid, &params(WorldStateOptions {
            n_particles: 2,
            ..Default::default()
        }));
        assert_eq!(out, (grid.positions[1], grid.velocities[1]));
    }

    #[test]
    fn test_newton_pulls_toward_other_body() {
        let grid = two_body(10.0, 1000.0, 1000.0);
        let p = params(WorldStateOptions {
            n_particles: 2,
            collisions: false,
            ..Default::default()
        });

        let (_, vel) = step_texel(0, &grid, &p);
        let expected = p.g * 1000.0 / 100.0;
        assert!(vel[0] > 0.0);
        assert!((vel[0] - expected).abs() < expected * 1e-4);
        assert_eq!(vel[1], 0.0);
    }

    #[test]
    fn test_gravity_none_keeps_velocity() {
        let mut grid = two_body(10.0, 1000.0, 1000.0);
        grid.velocities[0] = [1.0, 0.0, 0.0, 1000.0];
        let (pos, vel) = step_texel(0, &grid, &params(WorldStateOptions {
            n_particles: 2,
            collisions: false,
            gravity_law: GravityLaw::None,
            ..Default::default()
        }));

        assert_eq!(vel, [1.0, 0.0, 0.0, 1000.0]);
        assert_eq!(pos, [-4.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_mond_switches_regime_at_a0() {
        let p = params(WorldStateOptions {
            n_particles: 2,
            collisions: false,
            gravity_law: GravityLaw::Mond,
            ..Default::default()
        });

        // Close and heavy: Newtonian regime
        let near = two_body(10.0, 1000.0, 1000.0);
        let (_, vel) = step_texel(0, &near, &p);
        let newton = p.g * 1000.0 / 100.0;
        assert!((vel[0] - newton).abs() < newton * 1e-4);

        // Far and light: deep-MOND regime, a = sqrt(G m a0) / r
        let far = two_body(1.0e6, 1.0, 1.0);
        let (_, vel) = step_texel(0, &far, &p);
        let mond = (p.g * p.mond_a0).sqrt() / 1.0e6;
        assert!(p.g / 1.0e12 < p.mond_a0);
        assert!((vel[0] - mond).abs() < mond * 1e-3);
    }

    #[test]
    fn test_collision_merges_into_lower_index() {
        let mut grid = two_body(1.0, 300.0, 100.0);
        grid.velocities[0] = [1.0, 0.0, 0.0, 300.0];
        grid.velocities[1] = [-1.0, 0.0, 0.0, 100.0];
        let p = params(WorldStateOptions {
            n_particles: 2,
            ..Default::default()
        });

        let (pos0, vel0) = step_texel(0, &grid, &p);
        let (pos1, vel1) = step_texel(1, &grid, &p);

        assert_eq!(vel0[3], 400.0);
        assert!((vel0[0] - 0.5).abs() < 1e-6);
        assert!((pos0[3] - radius_for_mass(400.0, 1.0)).abs() < 1e-5);
        assert_eq!(vel1, [0.0, 0.0, 0.0, -1.0]);
        assert_eq!(pos1, grid.positions[1]);
    }

    #[test]
    fn test_collision_radius_adds_volume() {
        let r1 = radius_for_mass(200.0, 1.0);
        let r2 = radius_for_mass(300.0, 1.0);
        let mut grid = ParticleGrid::dead(128);
        grid.set(0, Vec3::ZERO, Vec3::ZERO, 200.0, r1);
        grid.set(1, Vec3::new(r1, 0.0, 0.0), Vec3::ZERO, 300.0, r2);

        let (pos, vel) = step_texel(0, &grid, &params(WorldStateOptions {
            n_particles: 2,
            ..Default::default()
        }));
        assert_eq!(vel[3], 500.0);
        // Volumes add: r³ = r1³ + r2³
        let summed = (r1.powi(3) + r2.powi(3)).cbrt();
        assert!((pos[3] - summed).abs() < 1e-4);
    }

    #[test]
    fn test_torus_uses_shortest_image() {
        // 19 apart directly, 1 apart through the boundary
        let mut grid = ParticleGrid::dead(128);
        grid.set(0, Vec3::new(-9.5, 0.0, 0.0), Vec3::ZERO, 1000.0, 0.01);
        grid.set(1, Vec3::new(9.5, 0.0, 0.0), Vec3::ZERO, 1000.0, 0.01);
        let p = params(WorldStateOptions {
            n_particles: 2,
            collisions: false,
            space_topology: SpaceTopology::Torus,
            space_radius: 10.0,
            ..Default::default()
        });

        let (_, vel) = step_texel(0, &grid, &p);
        // Pulled toward -x, across the boundary
        assert!(vel[0] < 0.0);
        let expected = p.g * 1000.0;
        assert!((vel[0].abs() - expected).abs() < expected * 1e-3);
    }

    #[test]
    fn test_scan_ignores_texels_past_particle_count() {
        let mut grid = two_body(10.0, 1000.0, 1000.0);
        // Live-looking texel beyond n_particles must not attract
        grid.set(2, Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, 1.0e9, 1.0);
        let (_, vel) = step_texel(0, &grid, &params(WorldStateOptions {
            n_particles: 2,
            collisions: false,
            ..Default::default()
        }));
        assert_eq!(vel[1], 0.0);
    }
}
